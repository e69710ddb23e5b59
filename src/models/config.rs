//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Fan-site layout: URLs, markers and scan limits
    #[serde(default)]
    pub site: SiteConfig,

    /// Snapshot persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        Url::parse(&self.site.base_url)
            .map_err(|e| AppError::validation(format!("site.base_url is invalid: {e}")))?;
        if self.site.lineup_headers.iter().all(|m| m.trim().is_empty()) {
            return Err(AppError::validation("site.lineup_headers has no usable marker"));
        }
        if self.site.row_marker.is_empty() || self.site.column_marker.is_empty() {
            return Err(AppError::validation(
                "site.row_marker and site.column_marker must be set",
            ));
        }
        if self.site.scan_limit == 0 {
            return Err(AppError::validation("site.scan_limit must be > 0"));
        }
        if self.site.max_name_length == 0 {
            return Err(AppError::validation("site.max_name_length must be > 0"));
        }
        if self.storage.snapshot_file.trim().is_empty() {
            return Err(AppError::validation("storage.snapshot_file is empty"));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent page fetches per stage
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Pause after each completed page fetch (ms)
    #[serde(default)]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            request_delay_ms: 0,
        }
    }
}

/// Fan-site layout description.
///
/// The site has no API and its markup changes often, so every anchor the
/// parsers rely on is configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host all relative paths resolve against
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Path of the matchday overview page
    #[serde(default = "defaults::overview_path")]
    pub overview_path: String,

    /// Substring every team link on the overview contains
    #[serde(default = "defaults::team_marker")]
    pub team_marker: String,

    /// Second substring every team link on the overview contains
    #[serde(default = "defaults::season_marker")]
    pub season_marker: String,

    /// Last path segment of a team's roster page
    #[serde(default = "defaults::squad_segment")]
    pub squad_segment: String,

    /// Host substring images must contain to be trusted
    #[serde(default = "defaults::image_host")]
    pub image_host: String,

    /// Path substring of player photos
    #[serde(default = "defaults::photo_path")]
    pub photo_path: String,

    /// Substrings identifying a team crest
    #[serde(default = "defaults::crest_hints")]
    pub crest_hints: Vec<String>,

    /// Substrings of host images that are never player photos (flags, crests)
    #[serde(default = "defaults::ignored_image_hints")]
    pub ignored_image_hints: Vec<String>,

    /// Predicted lineup section headers, tried in order
    #[serde(default = "defaults::lineup_headers")]
    pub lineup_headers: Vec<String>,

    /// Legend text that ends the lineup section
    #[serde(default = "defaults::legend_marker")]
    pub legend_marker: String,

    #[serde(default = "defaults::row_marker")]
    pub row_marker: String,

    #[serde(default = "defaults::column_marker")]
    pub column_marker: String,

    /// Max characters scanned after the lineup header
    #[serde(default = "defaults::scan_limit")]
    pub scan_limit: usize,

    /// Max bytes scanned backwards from an anchor for its photo
    #[serde(default = "defaults::image_lookbehind")]
    pub image_lookbehind: usize,

    /// Longer link texts are not player names
    #[serde(default = "defaults::max_name_length")]
    pub max_name_length: usize,

    /// Team name used when the page has neither header nor title
    #[serde(default = "defaults::default_team_name")]
    pub default_team_name: String,

    /// Roster pages fetched by the all-squads refresh
    #[serde(default = "defaults::squads")]
    pub squads: Vec<SquadPath>,
}

impl SiteConfig {
    /// Absolute URL of the overview page.
    pub fn overview_url(&self) -> Result<String> {
        self.absolute_url(&self.overview_path)
    }

    /// Resolve a site path (or pass through an absolute URL).
    pub fn absolute_url(&self, path: &str) -> Result<String> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(path)?.to_string())
    }

    /// True when `url` points at the image host.
    pub fn is_host_image(&self, url: &str) -> bool {
        url.contains(&self.image_host)
    }

    /// True for host images that are flags or crests.
    pub fn is_ignored_image(&self, url: &str) -> bool {
        self.ignored_image_hints.iter().any(|hint| url.contains(hint))
    }

    /// True for host images under the player photo path.
    pub fn is_player_photo(&self, url: &str) -> bool {
        self.is_host_image(url) && url.contains(&self.photo_path)
    }

    /// True for host images that look like a team crest.
    pub fn is_crest(&self, url: &str) -> bool {
        self.is_host_image(url) && self.crest_hints.iter().any(|hint| url.contains(hint))
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            overview_path: defaults::overview_path(),
            team_marker: defaults::team_marker(),
            season_marker: defaults::season_marker(),
            squad_segment: defaults::squad_segment(),
            image_host: defaults::image_host(),
            photo_path: defaults::photo_path(),
            crest_hints: defaults::crest_hints(),
            ignored_image_hints: defaults::ignored_image_hints(),
            lineup_headers: defaults::lineup_headers(),
            legend_marker: defaults::legend_marker(),
            row_marker: defaults::row_marker(),
            column_marker: defaults::column_marker(),
            scan_limit: defaults::scan_limit(),
            image_lookbehind: defaults::image_lookbehind(),
            max_name_length: defaults::max_name_length(),
            default_team_name: defaults::default_team_name(),
            squads: defaults::squads(),
        }
    }
}

/// A team's roster page path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SquadPath {
    pub team: String,
    pub path: String,
}

/// Snapshot persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot file name inside the storage directory
    #[serde(default = "defaults::snapshot_file")]
    pub snapshot_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_file: defaults::snapshot_file(),
        }
    }
}

mod defaults {
    use super::SquadPath;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; lineup-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn max_concurrent() -> usize {
        10
    }

    // Site defaults
    pub fn base_url() -> String {
        "https://www.ligainsider.de".into()
    }
    pub fn overview_path() -> String {
        "/bundesliga/spieltage/".into()
    }
    pub fn team_marker() -> String {
        "/bundesliga/team/".into()
    }
    pub fn season_marker() -> String {
        "/saison-".into()
    }
    pub fn squad_segment() -> String {
        "kader".into()
    }
    pub fn image_host() -> String {
        "ligainsider.de".into()
    }
    pub fn photo_path() -> String {
        "/player/team/".into()
    }
    pub fn crest_hints() -> Vec<String> {
        vec!["wappen".into(), "images/teams".into()]
    }
    pub fn ignored_image_hints() -> Vec<String> {
        vec!["/nations/".into(), "wappen".into(), "images/teams".into()]
    }
    pub fn lineup_headers() -> Vec<String> {
        vec![
            "VORAUSSICHTLICHE AUFSTELLUNG".into(),
            "Voraussichtliche Aufstellung".into(),
        ]
    }
    pub fn legend_marker() -> String {
        "Spieler stand in der Startelf".into()
    }
    pub fn row_marker() -> String {
        "player_position_row".into()
    }
    pub fn column_marker() -> String {
        "player_position_column".into()
    }
    pub fn scan_limit() -> usize {
        100_000
    }
    pub fn image_lookbehind() -> usize {
        1_500
    }
    pub fn max_name_length() -> usize {
        50
    }
    pub fn default_team_name() -> String {
        "Team".into()
    }

    // Storage defaults
    pub fn snapshot_file() -> String {
        "lineups_snapshot.json".into()
    }

    pub fn squads() -> Vec<SquadPath> {
        [
            ("FC Bayern München", "/fc-bayern-muenchen/1/kader/"),
            ("Borussia Dortmund", "/borussia-dortmund/14/kader/"),
            ("RB Leipzig", "/rb-leipzig/43/kader/"),
            ("Bayer 04 Leverkusen", "/bayer-04-leverkusen/4/kader/"),
            ("VfB Stuttgart", "/vfb-stuttgart/11/kader/"),
            ("Eintracht Frankfurt", "/eintracht-frankfurt/5/kader/"),
            ("VfL Wolfsburg", "/vfl-wolfsburg/24/kader/"),
            ("SC Freiburg", "/sc-freiburg/8/kader/"),
            ("1. FC Heidenheim", "/1-fc-heidenheim-1846/1376/kader/"),
            ("Werder Bremen", "/werder-bremen/6/kader/"),
            ("FC Augsburg", "/fc-augsburg/80/kader/"),
            ("TSG Hoffenheim", "/tsg-hoffenheim/30/kader/"),
            ("1. FSV Mainz 05", "/1-fsv-mainz-05/16/kader/"),
            ("Borussia M'gladbach", "/borussia-moenchengladbach/13/kader/"),
            ("1. FC Union Berlin", "/1-fc-union-berlin/62/kader/"),
            ("VfL Bochum", "/vfl-bochum/29/kader/"),
            ("FC St. Pauli", "/fc-st-pauli/20/kader/"),
            ("Holstein Kiel", "/holstein-kiel/321/kader/"),
        ]
        .into_iter()
        .map(|(team, path)| SquadPath {
            team: team.to_string(),
            path: path.to_string(),
        })
        .collect()
    }
}
