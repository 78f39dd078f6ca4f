use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerificationLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerificationLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VerificationLogs::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(VerificationLogs::CodeId).uuid())
                    .col(
                        ColumnDef::new(VerificationLogs::Code)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationLogs::VerifiedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VerificationLogs::VerifiedBy).string_len(100))
                    .col(
                        ColumnDef::new(VerificationLogs::Result)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(VerificationLogs::Reason).string_len(255))
                    .foreign_key(
                        ForeignKey::create()
                            .from(VerificationLogs::Table, VerificationLogs::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(VerificationLogs::Table)
                    .col(VerificationLogs::ProjectId)
                    .col(VerificationLogs::VerifiedAt)
                    .name("idx_verification_logs_project_id_verified_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerificationLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VerificationLogs {
    Table,
    Id,
    ProjectId,
    CodeId,
    Code,
    VerifiedAt,
    VerifiedBy,
    Result,
    Reason,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
}
