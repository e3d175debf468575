//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! Principal ids are stored as record ids (10-char strings); resource
//! and claim record ids are integers drawn from the `counter` table.
//! Enums are stored as strings with ASSERT constraints.
//!
//! Natural-key idempotence is enforced with UNIQUE indexes. The
//! principal table carries a single index spanning both variants'
//! key columns: the columns of the other variant are always NONE, so
//! the one index yields exactly the per-variant natural keys.

use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, serde::Deserialize)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Principals (one table, `type` discriminator, nullable variant columns)
-- =======================================================================
DEFINE TABLE principal SCHEMAFULL;
DEFINE FIELD type ON TABLE principal TYPE string \
    ASSERT $value IN ['ApplicationDeployment', 'User'];
DEFINE FIELD name ON TABLE principal TYPE string;
DEFINE FIELD environment_name ON TABLE principal TYPE option<string>;
DEFINE FIELD cluster ON TABLE principal TYPE option<string>;
DEFINE FIELD business_group ON TABLE principal TYPE option<string>;
DEFINE FIELD application_name ON TABLE principal TYPE option<string>;
DEFINE FIELD user_id ON TABLE principal TYPE option<string>;
DEFINE FIELD created_date ON TABLE principal TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD modified_date ON TABLE principal TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD created_by ON TABLE principal TYPE string DEFAULT 'provreg';
DEFINE FIELD modified_by ON TABLE principal TYPE string DEFAULT 'provreg';
DEFINE INDEX idx_principal_natural_key ON TABLE principal \
    COLUMNS type, name, environment_name, cluster, business_group, \
    application_name, user_id UNIQUE;

-- =======================================================================
-- Resources
-- =======================================================================
DEFINE TABLE resource SCHEMAFULL;
DEFINE FIELD kind ON TABLE resource TYPE string \
    ASSERT $value IN ['MinioPolicy', 'MinioObjectArea', \
    'ManagedPostgresDatabase', 'ManagedOracleSchema', 'ExternalSchema', \
    'PostgresDatabaseInstance', 'OracleDatabaseInstance', \
    'StorageGridTenant', 'StorageGridObjectArea'];
DEFINE FIELD name ON TABLE resource TYPE string;
DEFINE FIELD owner_id ON TABLE resource TYPE string;
DEFINE FIELD parent_id ON TABLE resource TYPE option<int>;
DEFINE FIELD active ON TABLE resource TYPE bool DEFAULT true;
DEFINE FIELD set_to_cooldown_at ON TABLE resource TYPE option<datetime>;
DEFINE FIELD created_date ON TABLE resource TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD modified_date ON TABLE resource TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD created_by ON TABLE resource TYPE string DEFAULT 'provreg';
DEFINE FIELD modified_by ON TABLE resource TYPE string DEFAULT 'provreg';
DEFINE INDEX idx_resource_natural_key ON TABLE resource \
    COLUMNS kind, name, owner_id, parent_id UNIQUE;

-- =======================================================================
-- Resource claims
-- =======================================================================
DEFINE TABLE resource_claim SCHEMAFULL;
DEFINE FIELD owner_id ON TABLE resource_claim TYPE string;
DEFINE FIELD resource_id ON TABLE resource_claim TYPE int;
DEFINE FIELD name ON TABLE resource_claim TYPE string;
DEFINE FIELD credentials ON TABLE resource_claim FLEXIBLE TYPE object;
DEFINE FIELD created_date ON TABLE resource_claim TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD modified_date ON TABLE resource_claim TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD created_by ON TABLE resource_claim TYPE string \
    DEFAULT 'provreg';
DEFINE FIELD modified_by ON TABLE resource_claim TYPE string \
    DEFAULT 'provreg';
DEFINE INDEX idx_resource_claim_natural_key ON TABLE resource_claim \
    COLUMNS owner_id, resource_id, name, credentials UNIQUE;

-- =======================================================================
-- Integer id sequences for resources and claims
-- =======================================================================
DEFINE TABLE counter SCHEMAFULL;
DEFINE FIELD next ON TABLE counter TYPE int DEFAULT 0;
";

/// Apply all pending migrations.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL).await?.check().map_err(|e| {
        DbError::Migration(format!("Failed to create migration table: {e}"))
    })?;

    let mut applied = db
        .query("SELECT version, name FROM _migration ORDER BY version")
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;
    let applied: Vec<MigrationRecord> = applied.take(0)?;
    let latest = applied.iter().map(|m| m.version).max().unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= latest {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        // Record the applied migration.
        db.query(
            "CREATE _migration SET version = $version, \
             name = $name",
        )
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "Failed to record migration v{}: {}",
                migration.version, e,
            ))
        })?;

        info!(
            version = migration.version,
            "Migration applied successfully"
        );
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn schema_covers_all_tables() {
        for table in ["principal", "resource", "resource_claim", "counter"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table definition: {table}"
            );
        }
    }
}
