//! Schema migrations for the three logical stores of the authority.
//!
//! Every store has its own migrator and its own tracking table so the
//! identity, configuration and operational schemas can live in one database
//! and still be versioned independently.

pub use sea_orm_migration::prelude::*;

mod m20260901_000001_create_identity_tables;
mod m20260901_000002_create_configuration_tables;
mod m20260901_000003_create_operational_tables;
mod m20260915_000000_add_grant_expiration_index;

/// Users, roles and user/role links.
pub struct IdentityMigrator;

#[async_trait::async_trait]
impl MigratorTrait for IdentityMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260901_000001_create_identity_tables::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_identity").into_iden()
    }
}

/// Clients, identity resources, API resources and API scopes.
pub struct ConfigurationMigrator;

#[async_trait::async_trait]
impl MigratorTrait for ConfigurationMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(
            m20260901_000002_create_configuration_tables::Migration,
        )]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_configuration").into_iden()
    }
}

/// Persisted grants and device codes.
pub struct OperationalMigrator;

#[async_trait::async_trait]
impl MigratorTrait for OperationalMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000003_create_operational_tables::Migration),
            Box::new(m20260915_000000_add_grant_expiration_index::Migration),
        ]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_operational").into_iden()
    }
}
