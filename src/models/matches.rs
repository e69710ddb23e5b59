//! Match, team page and cycle data structures.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{LineupRow, ScrapedPlayer};

/// Home and away team page URLs for one fixture, in overview order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPair {
    pub home_url: String,
    pub away_url: String,
}

/// Parsed content of one team detail page merged with its squad page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamPageResult {
    pub team_name: String,
    pub team_logo_url: Option<String>,
    pub lineup_rows: Vec<LineupRow>,
    pub squad: Vec<ScrapedPlayer>,
}

/// One fixture with both predicted lineups and squads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchRecord {
    pub home_team: String,
    pub away_team: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_logo: Option<String>,

    #[serde(default)]
    pub home_lineup: Vec<LineupRow>,
    #[serde(default)]
    pub away_lineup: Vec<LineupRow>,

    #[serde(default)]
    pub home_squad: Vec<ScrapedPlayer>,
    #[serde(default)]
    pub away_squad: Vec<ScrapedPlayer>,

    /// Home team page the record was built from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl MatchRecord {
    /// Assemble a record from the two team pages of a pair.
    pub fn from_pages(home: TeamPageResult, away: TeamPageResult, source_url: &str) -> Self {
        Self {
            home_team: home.team_name,
            away_team: away.team_name,
            home_logo: home.team_logo_url,
            away_logo: away.team_logo_url,
            home_lineup: home.lineup_rows,
            away_lineup: away.lineup_rows,
            home_squad: home.squad,
            away_squad: away.squad,
            source_url: Some(source_url.to_string()),
        }
    }

    /// Identity: home team plus source URL, or a fresh token without a URL.
    pub fn id(&self) -> String {
        match &self.source_url {
            Some(url) => format!("{}{}", self.home_team, url),
            None => format!("{}{}", self.home_team, fallback_token()),
        }
    }

    /// All lineup rows of both teams, home first.
    pub fn lineup_rows(&self) -> impl Iterator<Item = &LineupRow> {
        self.home_lineup.iter().chain(self.away_lineup.iter())
    }

    /// All squad members of both teams, home first.
    pub fn squad_players(&self) -> impl Iterator<Item = &ScrapedPlayer> {
        self.home_squad.iter().chain(self.away_squad.iter())
    }
}

/// A unique hex token; not derived from the record content.
fn fallback_token() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{:x}{:04x}", nanos, seq)
}

/// Phase of a scrape cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CycleState {
    #[default]
    Idle,
    FetchingOverview,
    FetchingDetails,
    Merging,
    Ready,
    Failed,
}

/// Counters reported after a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub pair_total: usize,
    pub match_count: usize,
    pub pair_failures: usize,
    pub squad_total: usize,
    pub squad_failures: usize,
    pub only_flags: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: Option<&str>) -> MatchRecord {
        MatchRecord {
            home_team: "FC St. Pauli".into(),
            away_team: "Werder Bremen".into(),
            home_logo: None,
            away_logo: None,
            home_lineup: vec![],
            away_lineup: vec![],
            home_squad: vec![],
            away_squad: vec![],
            source_url: url.map(str::to_string),
        }
    }

    #[test]
    fn test_id_uses_source_url() {
        let m = record(Some("https://example.com/team/a"));
        assert_eq!(m.id(), "FC St. Paulihttps://example.com/team/a");
        assert_eq!(m.id(), m.id());
    }

    #[test]
    fn test_id_without_url_is_unique() {
        let m = record(None);
        let (a, b) = (m.id(), m.id());
        assert!(a.starts_with("FC St. Pauli"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_pages_keeps_both_sides() {
        let home = TeamPageResult {
            team_name: "Home".into(),
            team_logo_url: Some("h.png".into()),
            lineup_rows: vec![LineupRow::new(vec![ScrapedPlayer::new("A", "a_1")])],
            squad: vec![],
        };
        let away = TeamPageResult {
            team_name: "Away".into(),
            ..TeamPageResult::default()
        };
        let m = MatchRecord::from_pages(home, away, "https://example.com/h");
        assert_eq!(m.home_team, "Home");
        assert_eq!(m.away_team, "Away");
        assert_eq!(m.home_logo.as_deref(), Some("h.png"));
        assert_eq!(m.lineup_rows().count(), 1);
    }
}
