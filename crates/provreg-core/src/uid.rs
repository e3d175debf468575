//! Principal identifier scheme.
//!
//! Principals carry a compact, opaque 10-character identifier derived
//! from a random UUID. Resources and claims use plain store-assigned
//! integers and need no logic here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RegistryError, RegistryResult};

/// Fixed length of every [`PrincipalUid`].
pub const UID_LENGTH: usize = 10;

/// Upper bound on collision-probe attempts in [`generate_unique_uid`].
pub const MAX_UID_ATTEMPTS: usize = 10;

/// Opaque unique identifier for a principal.
///
/// Serializes as a bare string; deserialization applies the length
/// check, so malformed identifiers are rejected at the wire boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrincipalUid(String);

impl PrincipalUid {
    /// Produce a random candidate: a UUID with separators stripped,
    /// truncated to [`UID_LENGTH`]. Uniqueness is not guaranteed here;
    /// callers go through [`generate_unique_uid`].
    pub fn generate() -> Self {
        let mut hex = Uuid::new_v4().simple().to_string();
        hex.truncate(UID_LENGTH);
        Self(hex)
    }

    /// Validate and wrap an externally supplied identifier.
    pub fn parse(s: &str) -> RegistryResult<Self> {
        if s.len() != UID_LENGTH {
            return Err(RegistryError::Validation(format!(
                "principal id must have length {UID_LENGTH}, got {:?}",
                s
            )));
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PrincipalUid {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PrincipalUid {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PrincipalUid> for String {
    fn from(uid: PrincipalUid) -> Self {
        uid.0
    }
}

/// Existence probe injected into [`generate_unique_uid`].
///
/// Implemented by the principal repository; kept as its own trait so
/// the generation loop stays testable without a store.
pub trait UidProbe: Send + Sync {
    fn uid_exists(&self, uid: &PrincipalUid) -> impl Future<Output = RegistryResult<bool>> + Send;
}

/// Generate a [`PrincipalUid`] that the probe does not know about yet.
///
/// Retries up to [`MAX_UID_ATTEMPTS`] candidates. Exhausting the
/// budget is a hard error; a possibly-colliding id is never returned.
pub async fn generate_unique_uid<P>(probe: &P) -> RegistryResult<PrincipalUid>
where
    P: UidProbe + ?Sized,
{
    for _ in 0..MAX_UID_ATTEMPTS {
        let candidate = PrincipalUid::generate();
        if !probe.uid_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    Err(RegistryError::Internal(format!(
        "no unused principal id found after {MAX_UID_ATTEMPTS} attempts"
    )))
}
