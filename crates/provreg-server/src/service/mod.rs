//! Business rules on top of the repository traits.
//!
//! Services own the idempotent-create choreography: insert, and on a
//! natural-key conflict fetch the pre-existing row instead of failing.

pub mod principal;
pub mod resource;

pub use principal::{AdSpec, PrincipalService, UserSpec};
pub use resource::{FindParams, ResourceService};
