//! Schema migration for every logical store, run before anything touches data.

use migration::{ConfigurationMigrator, IdentityMigrator, MigratorTrait, OperationalMigrator};
use sea_orm::{DatabaseConnection, DbErr};
use std::fmt;
use thiserror::Error;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalStore {
    /// Users and roles.
    Identity,
    /// Clients, resources and scopes.
    Configuration,
    /// Grants and device codes.
    Operational,
}

impl LogicalStore {
    /// Migration order: identity, configuration, operational.
    pub const ALL: [LogicalStore; 3] = [
        LogicalStore::Identity,
        LogicalStore::Configuration,
        LogicalStore::Operational,
    ];
}

impl fmt::Display for LogicalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalStore::Identity => write!(f, "identity"),
            LogicalStore::Configuration => write!(f, "configuration"),
            LogicalStore::Operational => write!(f, "operational"),
        }
    }
}

#[derive(Debug, Error)]
#[error("migrating the {store} store failed: {source}")]
pub struct MigrationError {
    pub store: LogicalStore,
    #[source]
    pub source: DbErr,
}

/// Apply all pending migrations of one store. A current store is a no-op.
#[tracing::instrument(skip(db))]
pub async fn migrate(db: &DatabaseConnection, store: LogicalStore) -> Result<usize, MigrationError> {
    let wrap = |source| MigrationError { store, source };
    let applied = match store {
        LogicalStore::Identity => apply::<IdentityMigrator>(db).await,
        LogicalStore::Configuration => apply::<ConfigurationMigrator>(db).await,
        LogicalStore::Operational => apply::<OperationalMigrator>(db).await,
    }
    .map_err(wrap)?;
    info!(%store, applied, "store schema is current");
    Ok(applied)
}

/// Migrate every store in order, stopping at the first failure.
pub async fn migrate_all(db: &DatabaseConnection) -> Result<(), MigrationError> {
    for store in LogicalStore::ALL {
        migrate(db, store).await?;
    }
    Ok(())
}

async fn apply<M: MigratorTrait>(db: &DatabaseConnection) -> Result<usize, DbErr> {
    let pending = M::get_pending_migrations(db).await?.len();
    if pending > 0 {
        M::up(db, None).await?;
    }
    Ok(pending)
}
