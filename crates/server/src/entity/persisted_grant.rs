//! Persisted grant entity (operational store).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "persisted_grants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub grant_type: String,
    pub subject_id: Option<String>,
    pub client_id: String,
    /// Serialized grant payload
    pub data: String,
    pub creation_time: OffsetDateTime,
    pub expiration: Option<OffsetDateTime>,
    pub consumed_time: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_expired(&self) -> bool {
        self.expiration
            .is_some_and(|exp| exp < OffsetDateTime::now_utc())
    }
}
