//! Scraped player and lineup row data structures.

use serde::{Deserialize, Serialize};

/// A player as listed on the fan-site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ScrapedPlayer {
    /// Name as displayed in the profile link
    pub display_name: String,

    /// Competing option for the same lineup slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_name: Option<String>,

    /// Site identifier, e.g. `nikola-vasilj_13866`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug_id: Option<String>,

    /// Profile photo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ScrapedPlayer {
    pub fn new(display_name: impl Into<String>, slug_id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            alternative_name: None,
            slug_id: Some(slug_id.into()),
            image_url: None,
        }
    }

    pub fn with_image(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    pub fn with_alternative(mut self, alternative_name: Option<String>) -> Self {
        self.alternative_name = alternative_name;
        self
    }

    /// Identity key: the slug when known, otherwise the display name.
    pub fn id(&self) -> &str {
        self.slug_id.as_deref().unwrap_or(&self.display_name)
    }

    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }
}

/// One tactical line of a predicted formation, in page order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineupRow {
    pub players: Vec<ScrapedPlayer>,
}

impl LineupRow {
    pub fn new(players: Vec<ScrapedPlayer>) -> Self {
        Self { players }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
