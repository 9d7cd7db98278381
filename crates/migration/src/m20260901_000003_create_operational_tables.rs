//! Operational store: grants and device codes written at request time.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PersistedGrants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PersistedGrants::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PersistedGrants::GrantType).string().not_null())
                    .col(ColumnDef::new(PersistedGrants::SubjectId).string().null())
                    .col(ColumnDef::new(PersistedGrants::ClientId).string().not_null())
                    .col(ColumnDef::new(PersistedGrants::Data).text().not_null())
                    .col(
                        ColumnDef::new(PersistedGrants::CreationTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersistedGrants::Expiration)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PersistedGrants::ConsumedTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_persisted_grants_subject_client_type")
                    .table(PersistedGrants::Table)
                    .col(PersistedGrants::SubjectId)
                    .col(PersistedGrants::ClientId)
                    .col(PersistedGrants::GrantType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DeviceCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeviceCodes::UserCode)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeviceCodes::DeviceCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(DeviceCodes::SubjectId).string().null())
                    .col(ColumnDef::new(DeviceCodes::ClientId).string().not_null())
                    .col(ColumnDef::new(DeviceCodes::Data).text().not_null())
                    .col(
                        ColumnDef::new(DeviceCodes::CreationTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeviceCodes::Expiration)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeviceCodes::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_persisted_grants_subject_client_type")
                    .table(PersistedGrants::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(PersistedGrants::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum PersistedGrants {
    Table,
    Key,
    GrantType,
    SubjectId,
    ClientId,
    Data,
    CreationTime,
    Expiration,
    ConsumedTime,
}

#[derive(Iden)]
pub enum DeviceCodes {
    Table,
    UserCode,
    DeviceCode,
    SubjectId,
    ClientId,
    Data,
    CreationTime,
    Expiration,
}
