//! Pomodoro settings entity (1:1 with user).
//!
//! All durations are minutes. Bounds are enforced at the service layer
//! before any write: work 1–120, break 1–30, long break 1–60, sessions
//! until long break 1–10.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pomodoro_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub user_id: String,

    #[sea_orm(default_value = 25)]
    pub work_duration: i32,

    #[sea_orm(default_value = 5)]
    pub break_duration: i32,

    #[sea_orm(default_value = 15)]
    pub long_break_duration: i32,

    #[sea_orm(default_value = 4)]
    pub sessions_until_long_break: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
