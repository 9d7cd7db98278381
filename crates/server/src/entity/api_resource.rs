//! API resource entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub display_name: Option<String>,
    /// Space-separated list of user claim types
    pub user_claims: String,
    /// Space-separated list of API scope names this resource protects
    pub scopes: String,
    pub enabled: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn scopes_list(&self) -> Vec<String> {
        super::split_list(&self.scopes)
    }

    /// Whether a token carrying `scope` should name this resource as audience.
    pub fn protects(&self, scope: &str) -> bool {
        self.scopes.split_whitespace().any(|s| s == scope)
    }
}
