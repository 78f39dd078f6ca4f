use sea_orm_migration::prelude::*;

mod m20260301_000001_create_projects;
mod m20260301_000002_create_codes;
mod m20260301_000003_create_api_keys;
mod m20260301_000004_create_verification_logs;
mod m20260301_000005_add_client_to_verification_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_projects::Migration),
            Box::new(m20260301_000002_create_codes::Migration),
            Box::new(m20260301_000003_create_api_keys::Migration),
            Box::new(m20260301_000004_create_verification_logs::Migration),
            Box::new(m20260301_000005_add_client_to_verification_logs::Migration),
        ]
    }
}
