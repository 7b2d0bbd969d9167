//! Subject entity (study topic tags for posts and study sessions).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subject")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub name: String,

    /// URL-safe identifier derived from the name
    #[sea_orm(unique)]
    pub slug: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_subject::Entity")]
    PostSubjects,

    #[sea_orm(has_many = "super::study_session::Entity")]
    StudySessions,
}

impl Related<super::study_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudySessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
