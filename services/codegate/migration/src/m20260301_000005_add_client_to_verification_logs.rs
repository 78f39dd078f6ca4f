use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(VerificationLogs::Table)
                    .add_column(ColumnDef::new(VerificationLogs::IpAddress).string_len(45))
                    .add_column(ColumnDef::new(VerificationLogs::UserAgent).text())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(VerificationLogs::Table)
                    .drop_column(VerificationLogs::IpAddress)
                    .drop_column(VerificationLogs::UserAgent)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum VerificationLogs {
    Table,
    IpAddress,
    UserAgent,
}
