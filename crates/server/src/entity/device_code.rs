//! Device code entity (operational store).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "device_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_code: String,
    #[sea_orm(unique)]
    pub device_code: String,
    pub subject_id: Option<String>,
    pub client_id: String,
    pub data: String,
    pub creation_time: OffsetDateTime,
    pub expiration: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
