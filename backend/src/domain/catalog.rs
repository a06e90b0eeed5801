//! Quest template catalog: immutable-per-version definitions of quest kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier for a quest template, e.g. `coffee_chat`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse difficulty rating shown on the quest board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = TemplateValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(TemplateValidationError::InvalidDifficulty),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        };
        f.write_str(label)
    }
}

/// Validation errors raised when constructing a [`QuestTemplate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateValidationError {
    #[error("template id must not be empty")]
    EmptyId,
    #[error("template title must not be empty")]
    EmptyTitle,
    #[error("duration must be at least one minute")]
    ZeroDuration,
    #[error("difficulty must be 'easy', 'medium', or 'hard'")]
    InvalidDifficulty,
    #[error("participant range must satisfy 1 <= min <= max")]
    InvalidParticipantRange,
}

/// A reusable quest definition. Immutable once published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestTemplate {
    #[schema(value_type = String, example = "coffee_chat")]
    pub id: TemplateId,
    pub title: String,
    pub description: String,
    /// Activity duration in minutes; also the join window for an instance.
    pub duration: u32,
    pub min_participants: u32,
    pub max_participants: u32,
    pub difficulty: Difficulty,
    /// Base crystal reward credited per participant on the confirm path.
    pub crystals: i64,
    pub icon: Option<String>,
    /// Type tag used for trait scoring and history tallies.
    #[serde(rename = "type")]
    pub kind: String,
    pub tags: Vec<String>,
}

impl QuestTemplate {
    /// Validate the template invariants; called on catalog insertion.
    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(TemplateValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(TemplateValidationError::EmptyTitle);
        }
        if self.duration == 0 {
            return Err(TemplateValidationError::ZeroDuration);
        }
        if self.min_participants < 1 || self.max_participants < self.min_participants {
            return Err(TemplateValidationError::InvalidParticipantRange);
        }
        Ok(())
    }
}

/// Starter catalog seeded at process start and injected into the registry.
pub fn seed_templates() -> Vec<QuestTemplate> {
    fn template(
        id: &str,
        title: &str,
        description: &str,
        duration: u32,
        min: u32,
        max: u32,
        difficulty: Difficulty,
        crystals: i64,
        icon: &str,
        kind: &str,
        tags: &[&str],
    ) -> QuestTemplate {
        QuestTemplate {
            id: TemplateId::new(id),
            title: title.to_owned(),
            description: description.to_owned(),
            duration,
            min_participants: min,
            max_participants: max,
            difficulty,
            crystals,
            icon: Some(icon.to_owned()),
            kind: kind.to_owned(),
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
        }
    }

    vec![
        template(
            "coffee_chat",
            "Coffee Chat",
            "Grab a coffee with someone new and swap one good story.",
            30,
            2,
            3,
            Difficulty::Easy,
            50,
            "☕",
            "coffee_chat",
            &["social", "chill"],
        ),
        template(
            "study_jam",
            "Study Jam",
            "Co-work for an hour; phones down, timers on.",
            60,
            2,
            4,
            Difficulty::Medium,
            80,
            "📚",
            "study_jam",
            &["focus", "learning"],
        ),
        template(
            "sunset_walk",
            "Sunset Walk",
            "A slow loop around the park before the light goes.",
            45,
            2,
            6,
            Difficulty::Easy,
            60,
            "🌇",
            "sunset_walk",
            &["outdoors", "chill"],
        ),
        template(
            "lunch_crew",
            "Lunch Crew",
            "Assemble a table, order widely, share everything.",
            45,
            3,
            6,
            Difficulty::Easy,
            60,
            "🍜",
            "lunch_crew",
            &["food", "social"],
        ),
        template(
            "board_game",
            "Board Game Hour",
            "One box, one table, no alliances that last.",
            90,
            3,
            5,
            Difficulty::Medium,
            90,
            "🎲",
            "board_game",
            &["games", "social"],
        ),
        template(
            "photo_walk",
            "Photo Walk",
            "Wander with cameras; three keepers each by the end.",
            60,
            2,
            4,
            Difficulty::Medium,
            80,
            "📷",
            "photo_walk",
            &["creative", "outdoors"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn seed_templates_are_valid() {
        for template in seed_templates() {
            template.validate().expect("seed template validates");
        }
    }

    #[rstest]
    #[case(0, 2, TemplateValidationError::InvalidParticipantRange)]
    #[case(3, 2, TemplateValidationError::InvalidParticipantRange)]
    fn rejects_bad_participant_ranges(
        #[case] min: u32,
        #[case] max: u32,
        #[case] expected: TemplateValidationError,
    ) {
        let mut template = seed_templates().remove(0);
        template.min_participants = min;
        template.max_participants = max;
        assert_eq!(template.validate().expect_err("invalid"), expected);
    }

    #[test]
    fn difficulty_parses_from_lowercase_labels() {
        assert_eq!("hard".parse::<Difficulty>().expect("parses"), Difficulty::Hard);
        assert!("brutal".parse::<Difficulty>().is_err());
    }
}
