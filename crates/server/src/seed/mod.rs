//! Idempotent seeding of the catalog into the store.
//!
//! The policy is deliberately coarse: a category whose collection already
//! holds at least one row is left untouched, even if the catalog has grown
//! since. Nothing is ever updated or deleted.
//!
//! Roles are written first through [`RoleManager`], one awaited insert at a
//! time. The configuration categories (clients, identity resources, API
//! resources, API scopes) share a single transaction committed once at the
//! end.

mod mapping;
pub mod roles;

pub use roles::{RoleError, RoleManager};

use crate::catalog::{Catalog, CatalogError};
use crate::entity::{api_resource, api_scope, client, identity_resource};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, TransactionTrait,
};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("catalog is inconsistent: {0}")]
    InvalidCatalog(#[from] CatalogError),
    #[error("creating role '{name}' failed: {source}")]
    Role {
        name: String,
        #[source]
        source: RoleError,
    },
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The collection was empty and this many entries were written.
    Inserted(usize),
    /// The collection already had rows; nothing was written.
    Skipped { existing: u64 },
}

impl SeedOutcome {
    pub fn inserted(&self) -> usize {
        match self {
            SeedOutcome::Inserted(n) => *n,
            SeedOutcome::Skipped { .. } => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedReport {
    pub roles: SeedOutcome,
    pub clients: SeedOutcome,
    pub identity_resources: SeedOutcome,
    pub api_resources: SeedOutcome,
    pub api_scopes: SeedOutcome,
}

impl SeedReport {
    pub fn total_inserted(&self) -> usize {
        [
            self.roles,
            self.clients,
            self.identity_resources,
            self.api_resources,
            self.api_scopes,
        ]
        .iter()
        .map(SeedOutcome::inserted)
        .sum()
    }
}

pub struct Seeder<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> Seeder<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Materialize every empty category of `catalog` into the store.
    ///
    /// The catalog is validated before anything is written. A failing role
    /// insert stops role creation; roles created before it stay.
    #[tracing::instrument(skip_all)]
    pub async fn seed(&self, catalog: &Catalog) -> Result<SeedReport, SeedError> {
        catalog.validate()?;

        let roles = self.seed_roles(catalog).await?;

        let txn = self.db.begin().await?;
        let clients = seed_category::<client::Entity, client::ActiveModel, _>(
            &txn,
            "clients",
            &catalog.clients,
        )
        .await?;
        let identity_resources = seed_category::<
            identity_resource::Entity,
            identity_resource::ActiveModel,
            _,
        >(&txn, "identity_resources", &catalog.identity_resources)
        .await?;
        let api_resources = seed_category::<api_resource::Entity, api_resource::ActiveModel, _>(
            &txn,
            "api_resources",
            &catalog.api_resources,
        )
        .await?;
        let api_scopes = seed_category::<api_scope::Entity, api_scope::ActiveModel, _>(
            &txn,
            "api_scopes",
            &catalog.api_scopes,
        )
        .await?;
        txn.commit().await?;

        let report = SeedReport {
            roles,
            clients,
            identity_resources,
            api_resources,
            api_scopes,
        };
        info!(inserted = report.total_inserted(), ?report, "seeding finished");
        Ok(report)
    }

    async fn seed_roles(&self, catalog: &Catalog) -> Result<SeedOutcome, SeedError> {
        let manager = RoleManager::new(self.db);
        let existing = manager.count().await?;
        if existing > 0 {
            info!(category = "roles", existing, "collection not empty, skipping");
            return Ok(SeedOutcome::Skipped { existing });
        }

        let mut created = 0;
        for role in &catalog.roles {
            if let Err(source) = manager.create(role).await {
                warn!(role = %role.name, created, "role seeding stopped");
                return Err(SeedError::Role {
                    name: role.name.clone(),
                    source,
                });
            }
            created += 1;
        }
        info!(category = "roles", created, "seeded");
        Ok(SeedOutcome::Inserted(created))
    }
}

async fn seed_category<E, A, T>(
    txn: &DatabaseTransaction,
    category: &'static str,
    entries: &[T],
) -> Result<SeedOutcome, DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    A: ActiveModelTrait<Entity = E> + for<'t> From<&'t T> + Send + 'static,
{
    let existing = E::find().count(txn).await?;
    if existing > 0 {
        info!(category, existing, "collection not empty, skipping");
        return Ok(SeedOutcome::Skipped { existing });
    }
    if entries.is_empty() {
        return Ok(SeedOutcome::Inserted(0));
    }

    let models: Vec<A> = entries.iter().map(A::from).collect();
    E::insert_many(models).exec(txn).await?;
    info!(category, inserted = entries.len(), "seeded");
    Ok(SeedOutcome::Inserted(entries.len()))
}
