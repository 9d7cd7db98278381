//! Configuration store: the tables the catalog is seeded into.
//!
//! List-valued properties are flattened into text columns:
//! - claim types, scopes and grant types are space-separated
//! - URIs, origins and secret hashes are JSON arrays

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Identity resources
        manager
            .create_table(
                Table::create()
                    .table(IdentityResources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IdentityResources::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IdentityResources::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(IdentityResources::DisplayName).string().null())
                    .col(
                        ColumnDef::new(IdentityResources::UserClaims)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(IdentityResources::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(IdentityResources::ShowInDiscoveryDocument)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(IdentityResources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 2. API scopes
        manager
            .create_table(
                Table::create()
                    .table(ApiScopes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApiScopes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ApiScopes::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ApiScopes::DisplayName).string().null())
                    .col(
                        ColumnDef::new(ApiScopes::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ApiScopes::ShowInDiscoveryDocument)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // 3. API resources
        manager
            .create_table(
                Table::create()
                    .table(ApiResources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApiResources::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ApiResources::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ApiResources::DisplayName).string().null())
                    .col(
                        ColumnDef::new(ApiResources::UserClaims)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ApiResources::Scopes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ApiResources::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ApiResources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 4. Clients
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clients::ClientId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clients::ClientName).string().null())
                    .col(
                        ColumnDef::new(Clients::ClientSecrets)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Clients::RequireClientSecret)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Clients::AllowedGrantTypes)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Clients::RedirectUris)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Clients::PostLogoutRedirectUris)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Clients::AllowedCorsOrigins)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Clients::AllowedScopes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Clients::RequirePkce)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Clients::RefreshTokenUsage)
                            .string()
                            .not_null()
                            .default("OneTimeOnly"),
                    )
                    .col(
                        ColumnDef::new(Clients::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Clients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ApiResources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ApiScopes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IdentityResources::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum IdentityResources {
    Table,
    Id,
    Name,
    DisplayName,
    UserClaims,
    Enabled,
    ShowInDiscoveryDocument,
    CreatedAt,
}

#[derive(Iden)]
enum ApiScopes {
    Table,
    Id,
    Name,
    DisplayName,
    Enabled,
    ShowInDiscoveryDocument,
}

#[derive(Iden)]
enum ApiResources {
    Table,
    Id,
    Name,
    DisplayName,
    UserClaims,
    Scopes,
    Enabled,
    CreatedAt,
}

#[derive(Iden)]
enum Clients {
    Table,
    ClientId,
    ClientName,
    ClientSecrets,
    RequireClientSecret,
    AllowedGrantTypes,
    RedirectUris,
    PostLogoutRedirectUris,
    AllowedCorsOrigins,
    AllowedScopes,
    RequirePkce,
    RefreshTokenUsage,
    Enabled,
    CreatedAt,
}
