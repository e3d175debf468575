//! Domain models for PROVREG.
//!
//! These are the core types shared across all crates.

pub mod claim;
pub mod principal;
pub mod resource;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actor recorded in audit columns when no caller identity is known.
pub const DEFAULT_ACTOR: &str = "provreg";

/// Audit columns shared by every stored entity. Timestamps are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub created_by: String,
    pub modified_by: String,
}
