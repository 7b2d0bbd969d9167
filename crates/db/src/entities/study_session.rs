//! Study session entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "study_session")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub user_id: String,

    /// Subject being studied (optional at start)
    #[sea_orm(nullable, indexed)]
    pub subject_id: Option<String>,

    pub start_time: DateTimeWithTimeZone,

    /// NULL while the session is active
    #[sea_orm(nullable)]
    pub end_time: Option<DateTimeWithTimeZone>,

    /// Total duration, persisted together with `end_time`
    #[sea_orm(nullable)]
    pub duration_seconds: Option<i64>,

    /// Free-form comments about the session
    #[sea_orm(column_type = "Text", default_value = "")]
    pub notes: String,
}

impl Model {
    /// A session is active while it has no end time.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.end_time.is_none()
    }
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

    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id",
        on_delete = "Cascade"
    )]
    Subject,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
