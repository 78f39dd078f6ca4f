use sea_orm::entity::prelude::*;

/// Append-only record of a verify (or reactivate) attempt.
///
/// `code_id` carries no foreign key: the history of a deleted code is kept, and attempts
/// on unknown code strings have no code at all.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "verification_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub code_id: Option<Uuid>,
    /// The code string as presented by the caller.
    pub code: String,
    pub verified_at: chrono::DateTime<chrono::Utc>,
    pub verified_by: Option<String>,
    /// `success`, `failed` or `reactivated`.
    pub result: String,
    pub reason: Option<String>,
    /// Peer address of the caller, IPv4 or IPv6 text form.
    pub ip_address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
