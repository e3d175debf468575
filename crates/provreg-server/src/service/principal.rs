//! Principal business logic.

use provreg_core::error::{RegistryError, RegistryResult};
use provreg_core::models::principal::{
    AdNaturalKey, ApplicationDeployment, NewApplicationDeployment, NewPrincipal, NewUser,
    Principal, PrincipalType, User,
};
use provreg_core::repository::{InsertOutcome, PrincipalRepository};
use provreg_core::uid::{PrincipalUid, generate_unique_uid};

/// Caller-supplied fields of an ApplicationDeployment.
#[derive(Debug, Clone)]
pub struct AdSpec {
    pub name: String,
    pub environment_name: String,
    pub cluster: String,
    pub business_group: String,
    pub application_name: Option<String>,
}

impl AdSpec {
    fn natural_key(&self) -> AdNaturalKey {
        AdNaturalKey {
            name: self.name.clone(),
            environment_name: self.environment_name.clone(),
            cluster: self.cluster.clone(),
            business_group: self.business_group.clone(),
            application_name: self.application_name.clone(),
        }
    }

    fn into_new(self, id: PrincipalUid) -> NewPrincipal {
        NewPrincipal::ApplicationDeployment(NewApplicationDeployment {
            id,
            name: self.name,
            environment_name: self.environment_name,
            cluster: self.cluster,
            business_group: self.business_group,
            application_name: self.application_name,
        })
    }
}

/// Caller-supplied fields of a User.
#[derive(Debug, Clone)]
pub struct UserSpec {
    pub user_id: String,
    pub name: String,
}

impl UserSpec {
    fn into_new(self, id: PrincipalUid) -> NewPrincipal {
        NewPrincipal::User(NewUser {
            id,
            user_id: self.user_id,
            name: self.name,
        })
    }
}

#[derive(Clone)]
pub struct PrincipalService<R> {
    repo: R,
}

impl<R: PrincipalRepository> PrincipalService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Idempotent create. A natural-key conflict means a concurrent or
    /// earlier identical request already created the row; return it.
    pub async fn create_application_deployment(
        &self,
        spec: AdSpec,
    ) -> RegistryResult<ApplicationDeployment> {
        let key = spec.natural_key();
        let id = generate_unique_uid(&self.repo).await?;
        match self.repo.insert(spec.into_new(id)).await? {
            InsertOutcome::Created(principal) => principal.into_application_deployment(),
            InsertOutcome::Conflict => self
                .repo
                .find_ad_by_natural_key(&key)
                .await?
                .ok_or_else(|| {
                    RegistryError::Database(
                        "application deployment insert conflicted but no row matches its key"
                            .into(),
                    )
                })?
                .into_application_deployment(),
        }
    }

    /// Idempotent create on (name, user_id).
    pub async fn create_user(&self, spec: UserSpec) -> RegistryResult<User> {
        let (name, user_id) = (spec.name.clone(), spec.user_id.clone());
        let id = generate_unique_uid(&self.repo).await?;
        match self.repo.insert(spec.into_new(id)).await? {
            InsertOutcome::Created(principal) => principal.into_user(),
            InsertOutcome::Conflict => self
                .repo
                .find_user_by_natural_key(&name, &user_id)
                .await?
                .ok_or_else(|| {
                    RegistryError::Database(
                        "user insert conflicted but no row matches its key".into(),
                    )
                })?
                .into_user(),
        }
    }

    pub async fn find_application_deployment(
        &self,
        id: &PrincipalUid,
    ) -> RegistryResult<Option<ApplicationDeployment>> {
        match self.repo.find_by_id(id).await? {
            Some(principal) => principal.into_application_deployment().map(Some),
            None => Ok(None),
        }
    }

    pub async fn find_user(&self, id: &PrincipalUid) -> RegistryResult<Option<User>> {
        match self.repo.find_by_id(id).await? {
            Some(principal) => principal.into_user().map(Some),
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&self, id: &PrincipalUid) -> RegistryResult<Option<Principal>> {
        self.repo.find_by_id(id).await
    }

    pub async fn find_all_application_deployments(
        &self,
    ) -> RegistryResult<Vec<ApplicationDeployment>> {
        self.repo
            .find_all_by_type(PrincipalType::ApplicationDeployment)
            .await?
            .into_iter()
            .map(Principal::into_application_deployment)
            .collect()
    }

    pub async fn find_all_users(&self) -> RegistryResult<Vec<User>> {
        self.repo
            .find_all_by_type(PrincipalType::User)
            .await?
            .into_iter()
            .map(Principal::into_user)
            .collect()
    }

    /// Full replace; `None` when the id does not exist.
    pub async fn update_application_deployment(
        &self,
        id: PrincipalUid,
        spec: AdSpec,
    ) -> RegistryResult<Option<ApplicationDeployment>> {
        match self.repo.update(spec.into_new(id)).await? {
            Some(principal) => principal.into_application_deployment().map(Some),
            None => Ok(None),
        }
    }

    /// Full replace; `None` when the id does not exist.
    pub async fn update_user(
        &self,
        id: PrincipalUid,
        spec: UserSpec,
    ) -> RegistryResult<Option<User>> {
        match self.repo.update(spec.into_new(id)).await? {
            Some(principal) => principal.into_user().map(Some),
            None => Ok(None),
        }
    }

    /// No-op when the id does not exist.
    pub async fn delete(&self, id: &PrincipalUid) -> RegistryResult<()> {
        self.repo.delete_by_id(id).await
    }

    pub async fn exists(&self, id: &PrincipalUid) -> RegistryResult<bool> {
        self.repo.exists(id).await
    }
}
