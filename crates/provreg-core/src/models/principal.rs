//! Principal domain model.
//!
//! Principals share one table with a `type` discriminator and nullable
//! variant columns; the domain layer only ever sees the sum type. The
//! row-to-variant projection lives with the storage code, which must
//! report a missing required field as a data-integrity error.

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};
use crate::models::Audit;
use crate::uid::PrincipalUid;

/// Discriminator tag stored alongside every principal row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrincipalType {
    ApplicationDeployment,
    User,
}

impl PrincipalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalType::ApplicationDeployment => "ApplicationDeployment",
            PrincipalType::User => "User",
        }
    }
}

/// An application deployment: an application instance running in a
/// given environment/cluster on behalf of a business group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDeployment {
    pub id: PrincipalUid,
    pub name: String,
    pub environment_name: String,
    pub cluster: String,
    pub business_group: String,
    pub application_name: Option<String>,
    pub audit: Audit,
}

/// A human (or service) identity known by an external id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: PrincipalUid,
    pub user_id: String,
    pub name: String,
    pub audit: Audit,
}

/// A stored principal, projected into its variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    ApplicationDeployment(ApplicationDeployment),
    User(User),
}

impl Principal {
    pub fn id(&self) -> &PrincipalUid {
        match self {
            Principal::ApplicationDeployment(ad) => &ad.id,
            Principal::User(user) => &user.id,
        }
    }

    pub fn principal_type(&self) -> PrincipalType {
        match self {
            Principal::ApplicationDeployment(_) => PrincipalType::ApplicationDeployment,
            Principal::User(_) => PrincipalType::User,
        }
    }

    /// Unwrap the ApplicationDeployment variant. A User row behind an
    /// ApplicationDeployment id is corrupted data, not a user error.
    pub fn into_application_deployment(self) -> RegistryResult<ApplicationDeployment> {
        match self {
            Principal::ApplicationDeployment(ad) => Ok(ad),
            Principal::User(user) => Err(RegistryError::DataIntegrity(format!(
                "principal with id={} is not an ApplicationDeployment",
                user.id
            ))),
        }
    }

    /// Unwrap the User variant; see [`Self::into_application_deployment`].
    pub fn into_user(self) -> RegistryResult<User> {
        match self {
            Principal::User(user) => Ok(user),
            Principal::ApplicationDeployment(ad) => Err(RegistryError::DataIntegrity(format!(
                "principal with id={} is not a User",
                ad.id
            ))),
        }
    }
}

/// Insert/update shape for an ApplicationDeployment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplicationDeployment {
    pub id: PrincipalUid,
    pub name: String,
    pub environment_name: String,
    pub cluster: String,
    pub business_group: String,
    pub application_name: Option<String>,
}

/// Insert/update shape for a User row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: PrincipalUid,
    pub user_id: String,
    pub name: String,
}

/// A principal about to be written. Audit columns are assigned by the
/// store on insert and refreshed on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewPrincipal {
    ApplicationDeployment(NewApplicationDeployment),
    User(NewUser),
}

impl NewPrincipal {
    pub fn id(&self) -> &PrincipalUid {
        match self {
            NewPrincipal::ApplicationDeployment(ad) => &ad.id,
            NewPrincipal::User(user) => &user.id,
        }
    }
}

/// Natural key used for the idempotent-create lookup of an
/// ApplicationDeployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdNaturalKey {
    pub name: String,
    pub environment_name: String,
    pub cluster: String,
    pub business_group: String,
    pub application_name: Option<String>,
}
