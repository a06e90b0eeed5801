//! Hub directory entries: the places where quest instances happen.
//!
//! Hubs are a read-only external collaborator; the registry only needs to
//! confirm a hub exists and borrow its human-readable location.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier for a hub, e.g. `hub_library`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HubId(String);

impl HubId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for HubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gathering place that hosts quest instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hub {
    #[schema(value_type = String, example = "hub_library")]
    pub id: HubId,
    pub name: String,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
}

/// Seed hubs used until a real hub directory is wired in.
pub fn seed_hubs() -> Vec<Hub> {
    vec![
        Hub {
            id: HubId::new("hub_library"),
            name: "Central Library".to_owned(),
            location: "Main Street 1".to_owned(),
            lat: 52.3702,
            lng: 4.8952,
        },
        Hub {
            id: HubId::new("hub_commons"),
            name: "Student Commons".to_owned(),
            location: "Campus Square".to_owned(),
            lat: 52.3667,
            lng: 4.8945,
        },
        Hub {
            id: HubId::new("hub_park"),
            name: "Riverside Park".to_owned(),
            location: "Riverside Walk 12".to_owned(),
            lat: 52.3599,
            lng: 4.8852,
        },
    ]
}
