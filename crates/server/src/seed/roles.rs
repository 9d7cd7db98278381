//! Role management on the identity store.

use crate::catalog;
use crate::entity::role;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoleError {
    #[error("role name must not be empty")]
    EmptyName,
    #[error("role name '{0}' is already taken")]
    DuplicateName(String),
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

/// Creates roles one at a time, each committed on its own.
pub struct RoleManager<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RoleManager<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn normalize(name: &str) -> String {
        name.trim().to_uppercase()
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        role::Entity::find().count(self.db).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<role::Model>, DbErr> {
        role::Entity::find()
            .filter(role::Column::NormalizedName.eq(Self::normalize(name)))
            .one(self.db)
            .await
    }

    /// Validate and insert one role. An explicit id is kept, otherwise the
    /// store assigns one.
    #[tracing::instrument(skip(self), fields(role = %role.name))]
    pub async fn create(&self, role: &catalog::Role) -> Result<role::Model, RoleError> {
        let name = role.name.trim();
        if name.is_empty() {
            return Err(RoleError::EmptyName);
        }
        if self.find_by_name(name).await?.is_some() {
            return Err(RoleError::DuplicateName(name.to_string()));
        }

        let model = role::ActiveModel {
            id: role.id.map(Set).unwrap_or(NotSet),
            name: Set(name.to_string()),
            normalized_name: Set(Self::normalize(name)),
            concurrency_stamp: Set(Some(uuid::Uuid::new_v4().to_string())),
        };
        let created = model.insert(self.db).await?;
        tracing::debug!(id = created.id, "role created");
        Ok(created)
    }
}
