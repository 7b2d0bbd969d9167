//! Friend request entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Friend request status.
///
/// `Pending` is the only non-terminal state: a request may move to
/// `Accepted` or `Rejected` exactly once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum FriendRequestStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friend_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The profile that sent the request
    pub from_profile_id: String,

    /// The profile that received the request
    pub to_profile_id: String,

    pub status: FriendRequestStatus,

    pub created_at: DateTimeWithTimeZone,

    /// Set when the request reaches a terminal state
    #[sea_orm(nullable)]
    pub responded_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether this request can still be accepted or rejected.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::FromProfileId",
        to = "super::user_profile::Column::Id",
        on_delete = "Cascade"
    )]
    FromProfile,

    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::ToProfileId",
        to = "super::user_profile::Column::Id",
        on_delete = "Cascade"
    )]
    ToProfile,
}

impl ActiveModelBehavior for ActiveModel {}
