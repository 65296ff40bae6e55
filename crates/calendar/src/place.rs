use serde::{Deserialize, Serialize};

use eventdesk_core::Entity;

eventdesk_core::typed_id!(
    /// Place identifier.
    PlaceId
);

/// Where an event happens: a physical address, a URL, or both.
///
/// A place can be shared by many events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub description: String,

    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,

    /// Online location.
    pub url: String,
}

impl Place {
    pub fn new(id: PlaceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// The non-empty of city and state, in that order.
    pub fn city_state(&self) -> Vec<&str> {
        [self.city.as_str(), self.state.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn is_online(&self) -> bool {
        !self.url.is_empty()
    }
}

impl core::fmt::Display for Place {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let line = format!(
            "{} {} {} {} {}",
            self.name,
            self.address,
            self.city_state().join(", "),
            self.zip,
            self.country
        );
        f.write_str(line.trim())
    }
}

impl Entity for Place {
    type Id = PlaceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
