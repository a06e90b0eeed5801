//! Social ledger records: pairwise connections, friends, and quest history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::quest::InstanceId;
use crate::domain::user::UserId;

/// Directed connection edge created when two users complete a quest together.
///
/// Edges are created pairwise (both directions) and deduplicated per ordered
/// pair, so repeat quests with the same partner never create repeat edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    #[schema(value_type = String)]
    pub user_id: UserId,
    #[schema(value_type = String)]
    pub connected_user_id: UserId,
    /// Display name snapshot taken at connection time.
    pub connected_user_name: String,
    #[schema(value_type = String, format = "date-time")]
    pub at: DateTime<Utc>,
}

impl Connection {
    pub fn new(
        user_id: UserId,
        connected_user_id: UserId,
        connected_user_name: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("conn_{}", &raw[..8]),
            user_id,
            connected_user_id,
            connected_user_name: connected_user_name.into(),
            at,
        }
    }
}

/// Friends-list entry mirrored from the connection graph for contact
/// discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    #[schema(value_type = String)]
    pub id: UserId,
    pub name: String,
}

/// Terminal state of a quest history row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Completed,
}

/// Append-only record of a completed quest for one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestHistoryEntry {
    #[schema(value_type = String)]
    pub user_id: UserId,
    #[schema(value_type = String)]
    pub quest_id: InstanceId,
    pub quest_kind: String,
    pub status: CompletionStatus,
    pub group_size: u32,
    pub duration_minutes: u32,
    #[schema(value_type = String, format = "date-time")]
    pub completed_at: DateTime<Utc>,
}
