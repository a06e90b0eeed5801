//! Trait vectors and the quest-type profile table used for matching.
//!
//! Each quest type is scored 1-10 across five personality dimensions. The
//! matcher ranks open instances by Euclidean distance between the user's
//! vector and the type profile; types without a profile are excluded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation error for out-of-range trait scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("trait scores must be between 1 and 10")]
pub struct TraitScoreOutOfRange;

/// A 5-dimensional personality profile, each dimension scored 1-10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TraitVector {
    pub curious: u8,
    pub social: u8,
    pub creative: u8,
    pub adventurous: u8,
    pub calm: u8,
}

impl TraitVector {
    /// Fallible constructor enforcing the 1-10 range on every dimension.
    pub fn new(
        curious: u8,
        social: u8,
        creative: u8,
        adventurous: u8,
        calm: u8,
    ) -> Result<Self, TraitScoreOutOfRange> {
        let vector = Self {
            curious,
            social,
            creative,
            adventurous,
            calm,
        };
        if vector.dimensions().iter().all(|score| (1..=10).contains(score)) {
            Ok(vector)
        } else {
            Err(TraitScoreOutOfRange)
        }
    }

    fn dimensions(&self) -> [u8; 5] {
        [
            self.curious,
            self.social,
            self.creative,
            self.adventurous,
            self.calm,
        ]
    }

    /// Euclidean distance to another vector.
    pub fn distance(&self, other: &Self) -> f64 {
        self.dimensions()
            .iter()
            .zip(other.dimensions())
            .map(|(a, b)| {
                let delta = f64::from(*a) - f64::from(b);
                delta * delta
            })
            .sum::<f64>()
            .sqrt()
    }
}

/// Immutable lookup table of quest-type trait profiles.
///
/// Constructed once at startup and passed by reference into the matcher, so
/// the table never lives in ambient global state.
#[derive(Debug, Clone)]
pub struct TraitProfiles {
    profiles: HashMap<String, TraitVector>,
}

impl TraitProfiles {
    /// The standard profile table covering the shipped quest types.
    pub fn standard() -> Self {
        let entries: &[(&str, [u8; 5])] = &[
            ("coffee_chat", [2, 8, 3, 2, 10]),
            ("study_jam", [9, 5, 4, 2, 7]),
            ("sunset_walk", [5, 6, 4, 5, 9]),
            ("help_neighbor", [3, 7, 3, 4, 6]),
            ("lunch_crew", [3, 9, 2, 3, 8]),
            ("game_night", [5, 8, 4, 5, 6]),
            ("morning_workout", [3, 6, 2, 7, 4]),
            ("art_cafe", [6, 5, 10, 3, 7]),
            ("board_game", [5, 8, 4, 4, 6]),
            ("cooking", [7, 6, 8, 5, 6]),
            ("photo_walk", [8, 5, 9, 7, 5]),
            ("karaoke", [4, 9, 7, 6, 3]),
            ("hiking", [7, 5, 2, 10, 5]),
            ("book_club", [9, 6, 5, 2, 8]),
            ("movie", [5, 7, 4, 2, 9]),
            ("volunteer", [5, 7, 3, 5, 5]),
            ("fitness", [3, 5, 2, 5, 9]),
            ("trivia", [9, 7, 4, 4, 5]),
            ("poetry", [7, 6, 10, 3, 6]),
            ("biking", [6, 6, 2, 8, 4]),
            ("picnic", [4, 8, 3, 4, 9]),
            ("learning", [9, 6, 7, 5, 5]),
            ("exploration", [8, 6, 4, 7, 6]),
            ("wellness", [5, 4, 3, 2, 10]),
            ("dance", [5, 7, 8, 7, 3]),
            ("stargazing", [9, 5, 5, 6, 8]),
            ("pottery", [7, 5, 10, 3, 7]),
        ];
        let profiles = entries
            .iter()
            .map(|(kind, [curious, social, creative, adventurous, calm])| {
                (
                    (*kind).to_owned(),
                    TraitVector {
                        curious: *curious,
                        social: *social,
                        creative: *creative,
                        adventurous: *adventurous,
                        calm: *calm,
                    },
                )
            })
            .collect();
        Self { profiles }
    }

    /// Distance between a user vector and a quest type's profile.
    ///
    /// Returns `None` when the type has no profile, which excludes the quest
    /// from scoring entirely.
    pub fn distance_to(&self, kind: &str, user: &TraitVector) -> Option<f64> {
        self.profiles.get(kind).map(|profile| user.distance(profile))
    }
}
