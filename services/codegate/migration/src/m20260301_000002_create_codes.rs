use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Codes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Codes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Codes::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Codes::Code).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Codes::Status)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Codes::IsDisabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Codes::ExpiresAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Codes::VerifiedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Codes::VerifiedBy).string_len(100))
                    .col(
                        ColumnDef::new(Codes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Codes::Table, Codes::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Codes::Table)
                    .col(Codes::ProjectId)
                    .col(Codes::Code)
                    .unique()
                    .name("uq_codes_project_id_code")
                    .to_owned(),
            )
            .await?;

        // Serves the batch-disable predicate and the list filters.
        manager
            .create_index(
                Index::create()
                    .table(Codes::Table)
                    .col(Codes::ProjectId)
                    .col(Codes::Status)
                    .col(Codes::IsDisabled)
                    .name("idx_codes_project_id_status_disabled")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Codes::Table)
                    .col(Codes::ProjectId)
                    .col(Codes::CreatedAt)
                    .name("idx_codes_project_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Codes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Codes {
    Table,
    Id,
    ProjectId,
    Code,
    Status,
    IsDisabled,
    ExpiresAt,
    VerifiedAt,
    VerifiedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
}
