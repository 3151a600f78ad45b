use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::domain::{ApprovalStatus, Role};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Same value as the owning account id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub email: String,

    pub role: Role,

    pub status: ApprovalStatus,

    #[sea_orm(nullable)]
    pub facility_id: Option<i32>,

    #[sea_orm(nullable)]
    pub nickname: Option<String>,

    #[sea_orm(nullable)]
    pub phone: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::Id",
        to = "super::accounts::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::facilities::Entity",
        from = "Column::FacilityId",
        to = "super::facilities::Column::Id",
        on_delete = "SetNull"
    )]
    Facility,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::facilities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Facility.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
