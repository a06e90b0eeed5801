//! Quest instance aggregate: live occurrences of a template, their
//! memberships, and the consensus round bookkeeping that gates completion.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::catalog::{QuestTemplate, TemplateId};
use crate::domain::hub::{Hub, HubId};
use crate::domain::user::UserId;

/// Identifier for a quest instance, e.g. `inst_9f2c41aa`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id with the `inst_` prefix.
    pub fn generate() -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        Self(format!("inst_{}", &raw[..8]))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live, joinable occurrence of a template at a hub.
///
/// ## Invariants
/// - `current_participants` always equals the number of committed instance
///   membership rows; the store recomputes it inside every mutating commit.
/// - An inactive instance accepts no new joins and no further completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestInstance {
    #[schema(value_type = String)]
    pub id: InstanceId,
    #[schema(value_type = String)]
    pub template_id: TemplateId,
    #[schema(value_type = String)]
    pub hub_id: HubId,
    /// `None` for seeded instances with no owning user.
    #[schema(value_type = Option<String>)]
    pub creator: Option<UserId>,
    pub current_participants: u32,
    pub is_active: bool,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub start_time: Option<DateTime<Utc>>,
    pub location: String,
    /// Absolute expiry: creation time plus the template duration.
    #[schema(value_type = String, format = "date-time")]
    pub deadline: DateTime<Utc>,
}

impl QuestInstance {
    /// Create a fresh instance for `template` at `hub`, expiring after the
    /// template duration. The creator is counted as the first participant.
    pub fn open(
        template: &QuestTemplate,
        hub_id: HubId,
        creator: UserId,
        location: String,
        start_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InstanceId::generate(),
            template_id: template.id.clone(),
            hub_id,
            creator: Some(creator),
            current_participants: 1,
            is_active: true,
            start_time,
            location,
            deadline: now + Duration::minutes(i64::from(template.duration)),
        }
    }

    /// Starter instance with no owning user, placed on the board at startup.
    pub fn seeded(template: &QuestTemplate, hub: &Hub, now: DateTime<Utc>) -> Self {
        Self {
            id: InstanceId::generate(),
            template_id: template.id.clone(),
            hub_id: hub.id.clone(),
            creator: None,
            current_participants: 0,
            is_active: true,
            start_time: None,
            location: hub.location.clone(),
            deadline: now + Duration::minutes(i64::from(template.duration)),
        }
    }

    /// Whether the deadline has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }

    /// Whether the instance is a no-show: the scheduled start has passed and
    /// nobody holds a membership row.
    pub fn is_no_show(&self, now: DateTime<Utc>) -> bool {
        self.current_participants == 0
            && self.start_time.is_some_and(|start| now > start)
    }
}

/// How many templates get a starter instance at each hub.
const SEEDED_PER_HUB: usize = 3;

/// Starter board for a fresh deployment: a handful of instances of the
/// leading templates at every hub, so newcomers have quests to join before
/// anyone has earned the right to create one.
pub fn seed_instances(
    templates: &[QuestTemplate],
    hubs: &[Hub],
    now: DateTime<Utc>,
) -> Vec<QuestInstance> {
    hubs.iter()
        .flat_map(|hub| {
            templates
                .iter()
                .take(SEEDED_PER_HUB)
                .map(move |template| QuestInstance::seeded(template, hub, now))
        })
        .collect()
}

/// Lobby membership row carrying readiness state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyMember {
    pub user_id: UserId,
    pub is_ready: bool,
    pub is_host: bool,
}

impl LobbyMember {
    pub fn host(user_id: UserId) -> Self {
        Self {
            user_id,
            is_ready: false,
            is_host: true,
        }
    }

    pub fn guest(user_id: UserId) -> Self {
        Self {
            user_id,
            is_ready: false,
            is_host: false,
        }
    }
}

/// A word submitted for the word-selection round. Word rounds have no attempt
/// counter; resubmission replaces the previous word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordChoice {
    pub user_id: UserId,
    pub word: String,
    pub at: DateTime<Utc>,
}

/// A reaction submitted for a specific attempt of the reaction round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionChoice {
    pub user_id: UserId,
    pub reaction: String,
    pub attempt: u32,
    pub at: DateTime<Utc>,
}

/// Resolution state of one consensus round.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundStatus {
    /// True iff the lobby is non-empty and every member has submitted.
    pub all_selected: bool,
    /// True iff `all_selected` and the distinct-token set has exactly one
    /// member.
    pub matched: bool,
    /// The agreed token, present only when matched.
    pub chosen: Option<String>,
    pub submissions: usize,
    pub lobby_size: usize,
}

impl RoundStatus {
    /// Evaluate a round from the submitted tokens and the lobby size.
    ///
    /// An empty lobby is never "all selected": the distinct-token count over
    /// an empty set is undefined, so the round can never be treated as
    /// matched.
    pub fn evaluate(tokens: &[String], lobby_size: usize) -> Self {
        let submissions = tokens.len();
        let all_selected = lobby_size > 0 && submissions == lobby_size;
        let distinct: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        let matched = all_selected && distinct.len() == 1;
        let chosen = if matched {
            tokens.first().cloned()
        } else {
            None
        };
        Self {
            all_selected,
            matched,
            chosen,
            submissions,
            lobby_size,
        }
    }
}

/// Seconds a check-in code stays valid after issuance.
pub const CHECKIN_CODE_TTL_SECS: i64 = 600;

/// A short-lived code proving physical presence at the activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckinCode {
    pub code: String,
    #[schema(value_type = String)]
    pub quest_id: InstanceId,
    #[schema(value_type = String)]
    pub user_id: UserId,
    #[schema(value_type = String, format = "date-time")]
    pub issued_at: DateTime<Utc>,
}

impl CheckinCode {
    /// Issue a new code for `quest_id` on behalf of `user_id`.
    pub fn issue(quest_id: InstanceId, user_id: UserId, now: DateTime<Utc>) -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        Self {
            code: format!("GATHER_{}_{}", quest_id.as_str(), &raw[..12]),
            quest_id,
            user_id,
            issued_at: now,
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at <= Duration::seconds(CHECKIN_CODE_TTL_SECS)
    }
}

/// Reference to a photo taken during a quest. Upload and storage live with an
/// external provider; only the reference cascades with the instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestPhoto {
    pub id: String,
    #[schema(value_type = String)]
    pub quest_id: InstanceId,
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub url: String,
    #[schema(value_type = String, format = "date-time")]
    pub at: DateTime<Utc>,
}

/// Read model combining an instance with its template and membership.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSnapshot {
    pub instance: QuestInstance,
    pub template: QuestTemplate,
    #[schema(value_type = Vec<String>)]
    pub participants: Vec<UserId>,
    pub creator_name: Option<String>,
}
