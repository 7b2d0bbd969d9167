//! Friendship entity (undirected friendship edges between profiles).
//!
//! A single row represents mutual friendship. Rows are stored in canonical
//! order (`profile_a_id` < `profile_b_id`) so each pair exists at most once;
//! readers must check both orientations or canonicalize first.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friendship")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Lower profile ID of the pair
    pub profile_a_id: String,

    /// Higher profile ID of the pair
    pub profile_b_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::ProfileAId",
        to = "super::user_profile::Column::Id",
        on_delete = "Cascade"
    )]
    ProfileA,

    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::ProfileBId",
        to = "super::user_profile::Column::Id",
        on_delete = "Cascade"
    )]
    ProfileB,
}

impl ActiveModelBehavior for ActiveModel {}
