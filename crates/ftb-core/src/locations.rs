//! Venue registry: named locations with a map link and parking difficulty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::formatting::escape_html;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParkingDifficulty {
    #[serde(rename = "Fácil")]
    Easy,
    #[serde(rename = "Difícil")]
    Hard,
    #[serde(rename = "Desconocida")]
    Unknown,
}

impl ParkingDifficulty {
    pub fn label(self) -> &'static str {
        match self {
            ParkingDifficulty::Easy => "Fácil",
            ParkingDifficulty::Hard => "Difícil",
            ParkingDifficulty::Unknown => "Desconocida",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub map_link: Option<String>,
    #[serde(default = "default_difficulty")]
    pub parking_difficulty: ParkingDifficulty,
}

fn default_difficulty() -> ParkingDifficulty {
    ParkingDifficulty::Unknown
}

impl Location {
    pub fn render_html(&self, name: &str) -> String {
        let title = match self.map_link.as_deref() {
            Some(link) => format!("<a href='{link}'>{}</a>", escape_html(name)),
            None => escape_html(name),
        };
        format!(
            "🏟 {title}\n🚗 Dificultad de aparcamiento: {}\n",
            self.parking_difficulty.label()
        )
    }
}

#[derive(Debug, Default)]
pub struct LocationRegistry {
    locations: BTreeMap<String, Location>,
}

impl LocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, name: &str, location: Location) {
        self.locations.insert(name.to_string(), location);
    }

    pub fn get(&self, name: &str) -> Option<&Location> {
        self.locations.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Location> {
        self.locations.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Location)> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
