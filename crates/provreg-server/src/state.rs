//! Shared application state handed to every request handler.

use provreg_db::repository::{
    SurrealPrincipalRepository, SurrealResourceClaimRepository, SurrealResourceRepository,
};
use surrealdb::{Connection, Surreal};

use crate::service::{PrincipalService, ResourceService};

/// Services wired over one SurrealDB client. Cloned per request.
pub struct AppState<C: Connection> {
    pub principals: PrincipalService<SurrealPrincipalRepository<C>>,
    pub resources:
        ResourceService<SurrealResourceRepository<C>, SurrealResourceClaimRepository<C>>,
    /// Shared secret for bearer authentication; `None` disables it.
    pub auth_token: Option<String>,
}

impl<C: Connection> AppState<C> {
    pub fn new(db: Surreal<C>, auth_token: Option<String>) -> Self {
        Self {
            principals: PrincipalService::new(SurrealPrincipalRepository::new(db.clone())),
            resources: ResourceService::new(
                SurrealResourceRepository::new(db.clone()),
                SurrealResourceClaimRepository::new(db),
            ),
            auth_token,
        }
    }
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            principals: self.principals.clone(),
            resources: self.resources.clone(),
            auth_token: self.auth_token.clone(),
        }
    }
}
