use sea_orm::entity::prelude::*;

/// Tenant grouping of codes. Deleting a project cascades to its codes, key and logs.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    /// `true` = enabled.
    pub status: bool,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::codes::Entity")]
    Codes,
    #[sea_orm(has_one = "super::api_keys::Entity")]
    ApiKey,
    #[sea_orm(has_many = "super::verification_logs::Entity")]
    VerificationLogs,
}

impl Related<super::codes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Codes.def()
    }
}

impl Related<super::api_keys::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApiKey.def()
    }
}

impl Related<super::verification_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VerificationLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
