use sea_orm_migration::prelude::*;

use crate::m20260901_000003_create_operational_tables::{DeviceCodes, PersistedGrants};

#[derive(DeriveMigrationName)]
pub struct Migration;

// Token cleanup scans both tables by expiration on every pass.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_persisted_grants_expiration")
                    .table(PersistedGrants::Table)
                    .col(PersistedGrants::Expiration)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_device_codes_expiration")
                    .table(DeviceCodes::Table)
                    .col(DeviceCodes::Expiration)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_device_codes_expiration")
                    .table(DeviceCodes::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_persisted_grants_expiration")
                    .table(PersistedGrants::Table)
                    .to_owned(),
            )
            .await
    }
}
