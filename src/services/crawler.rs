// src/services/crawler.rs

//! Lineup crawler service.
//!
//! Turns the matchday overview into match records: every team detail page is
//! parsed for its header and predicted lineup, every team's roster page for
//! its squad, with bounded concurrency and per-page failure isolation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;

use crate::error::Result;
use crate::models::{
    Config, CycleStats, MatchPair, MatchRecord, ScrapedPlayer, SquadPath, TeamPageResult,
};
use crate::services::lineup::{ParsedLineup, parse_lineup};
use crate::services::overview::parse_overview;
use crate::services::source::PageSource;
use crate::services::squad::{SquadFetcher, SquadPage};
use crate::services::team::{TeamHeader, parse_team_header};
use crate::utils::path_segments;

/// Summary of a crawl run.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub matches: Vec<MatchRecord>,
    pub stats: CycleStats,
}

/// Players collected by an all-squads refresh.
#[derive(Debug, Default)]
pub struct SquadRefresh {
    pub players: Vec<ScrapedPlayer>,
    pub team_total: usize,
    pub team_failures: usize,
    pub only_flags: usize,
}

/// Header and lineup of one team detail page.
type TeamPage = (TeamHeader, ParsedLineup);

/// Service for crawling predicted lineups and squads.
pub struct LineupCrawler {
    config: Arc<Config>,
    source: Arc<dyn PageSource>,
    squads: SquadFetcher,
}

impl LineupCrawler {
    /// Create a new lineup crawler reading pages from `source`.
    pub fn new(config: Arc<Config>, source: Arc<dyn PageSource>) -> Self {
        let squads = SquadFetcher::new(Arc::clone(&source), Arc::new(config.site.clone()));
        Self {
            config,
            source,
            squads,
        }
    }

    /// Fetch the overview page and pair its team links.
    pub async fn fetch_match_pairs(&self) -> Result<Vec<MatchPair>> {
        let url = self.config.site.overview_url()?;
        let html = self.source.fetch(&url).await?;
        let pairs = parse_overview(&html, &self.config.site);
        log::info!("Overview {}: {} match pairs", url, pairs.len());
        Ok(pairs)
    }

    /// Fetch every team page and squad of `pairs` concurrently.
    ///
    /// A failed team page drops its pair; a failed squad page leaves that team
    /// with an empty squad.
    pub async fn fetch_matches(&self, pairs: &[MatchPair]) -> CrawlOutcome {
        let concurrency = self.config.crawler.max_concurrent.max(1);

        let mut team_urls: Vec<&str> = Vec::new();
        for pair in pairs {
            for url in [pair.home_url.as_str(), pair.away_url.as_str()] {
                if !team_urls.contains(&url) {
                    team_urls.push(url);
                }
            }
        }

        let mut stats = CycleStats {
            pair_total: pairs.len(),
            squad_total: team_urls.len(),
            ..CycleStats::default()
        };

        let pair_stage = async {
            let mut pages = Vec::new();
            let mut pair_stream = stream::iter(pairs)
                .map(|pair| async move {
                    let (home, away) = tokio::join!(
                        self.fetch_team(&pair.home_url),
                        self.fetch_team(&pair.away_url)
                    );
                    (pair, home.and_then(|home| away.map(|away| (home, away))))
                })
                .buffer_unordered(concurrency);

            while let Some((pair, result)) = pair_stream.next().await {
                pages.push((pair, result));
                self.pause().await;
            }
            pages
        };

        let squad_stage = async {
            let mut squads = HashMap::new();
            let mut squad_stream = stream::iter(team_urls)
                .map(|team_url| async move {
                    let squad_url = self.squad_url_for(team_url);
                    (team_url, self.squads.fetch(&squad_url).await)
                })
                .buffer_unordered(concurrency);

            while let Some((team_url, result)) = squad_stream.next().await {
                squads.insert(team_url, result);
                self.pause().await;
            }
            squads
        };

        let (pages, squad_results) = tokio::join!(pair_stage, squad_stage);

        let mut squads: HashMap<&str, SquadPage> = HashMap::new();
        for (team_url, result) in squad_results {
            let squad = match result {
                Ok(squad) => squad,
                Err(error) => {
                    stats.squad_failures += 1;
                    log::warn!("Failed to fetch squad for {}: {}", team_url, error);
                    SquadPage::default()
                }
            };
            stats.only_flags += squad.only_flags;
            squads.insert(team_url, squad);
        }

        let mut matches = Vec::with_capacity(pages.len());
        for (pair, result) in pages {
            match result {
                Ok((home, away)) => {
                    let home = team_result(home, squads.get(pair.home_url.as_str()));
                    let away = team_result(away, squads.get(pair.away_url.as_str()));
                    matches.push(MatchRecord::from_pages(home, away, &pair.home_url));
                }
                Err(error) => {
                    stats.pair_failures += 1;
                    log::warn!(
                        "Failed to fetch match {} vs {}: {}",
                        pair.home_url,
                        pair.away_url,
                        error
                    );
                }
            }
        }

        stats.match_count = matches.len();
        log::info!(
            "Crawled {}/{} matches ({} squad failures)",
            stats.match_count,
            stats.pair_total,
            stats.squad_failures
        );
        CrawlOutcome { matches, stats }
    }

    /// Fetch every configured roster page.
    pub async fn fetch_all_squads(&self) -> SquadRefresh {
        let concurrency = self.config.crawler.max_concurrent.max(1);
        let targets: &[SquadPath] = &self.config.site.squads;

        let mut refresh = SquadRefresh {
            team_total: targets.len(),
            ..SquadRefresh::default()
        };

        let mut squad_stream = stream::iter(targets)
            .map(|target| async move {
                let result = match self.config.site.absolute_url(&target.path) {
                    Ok(url) => self.squads.fetch(&url).await,
                    Err(e) => Err(e),
                };
                (target, result)
            })
            .buffer_unordered(concurrency);

        while let Some((target, result)) = squad_stream.next().await {
            match result {
                Ok(squad) => {
                    log::info!("Squad {}: {} players", target.team, squad.len());
                    refresh.only_flags += squad.only_flags;
                    refresh.players.extend(squad.players);
                }
                Err(error) => {
                    refresh.team_failures += 1;
                    log::warn!("Failed to fetch squad for {}: {}", target.team, error);
                }
            }
            self.pause().await;
        }
        refresh
    }

    /// Roster page of a team: `<base>/<name>/<id>/kader/` for
    /// `…/team/<name>/<id>/…` links, otherwise the team page itself.
    pub fn squad_url_for(&self, team_url: &str) -> String {
        let site = &self.config.site;
        let segments = path_segments(team_url);

        let derived = segments
            .iter()
            .position(|segment| segment == "team")
            .and_then(|idx| Some((segments.get(idx + 1)?, segments.get(idx + 2)?)))
            .filter(|(_, id)| id.chars().all(|c| c.is_ascii_digit()))
            .and_then(|(name, id)| {
                site.absolute_url(&format!("/{}/{}/{}/", name, id, site.squad_segment))
                    .ok()
            });

        derived.unwrap_or_else(|| team_url.to_string())
    }

    /// Fetch and parse one team detail page.
    async fn fetch_team(&self, url: &str) -> Result<TeamPage> {
        let html = self.source.fetch(url).await?;
        let header = parse_team_header(&html, &self.config.site);
        let lineup = parse_lineup(&html, &self.config.site);
        log::debug!(
            "Team {} ({}): {} lineup rows",
            header.name,
            url,
            lineup.rows.len()
        );
        Ok((header, lineup))
    }

    async fn pause(&self) {
        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Combine a team page with its squad.
fn team_result((header, lineup): TeamPage, squad: Option<&SquadPage>) -> TeamPageResult {
    let squad_players = squad.map(|s| s.players.as_slice()).unwrap_or_default();
    let squad = merge_team_squad(squad_players, &lineup.players);
    TeamPageResult {
        team_name: header.name,
        team_logo_url: header.logo_url,
        lineup_rows: lineup.rows,
        squad,
    }
}

/// Roster players keyed by id; lineup players are added when new and
/// replace a roster entry when they carry a photo.
pub fn merge_team_squad(squad: &[ScrapedPlayer], lineup: &[ScrapedPlayer]) -> Vec<ScrapedPlayer> {
    let mut merged: IndexMap<String, ScrapedPlayer> = squad
        .iter()
        .map(|player| (player.id().to_string(), player.clone()))
        .collect();

    for player in lineup {
        if player.has_image() || !merged.contains_key(player.id()) {
            merged.insert(player.id().to_string(), player.clone());
        }
    }
    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::source::fake::MemorySource;

    const BASE: &str = "https://www.ligainsider.de";

    fn team_url(name: &str, id: u32) -> String {
        format!("{BASE}/bundesliga/team/{name}/{id}/saison-2025-2026/")
    }

    fn overview(teams: &[(&str, u32)]) -> String {
        teams
            .iter()
            .map(|(name, id)| {
                format!(r#"<a href="/bundesliga/team/{name}/{id}/saison-2025-2026/">{name}</a>"#)
            })
            .collect()
    }

    fn team_page(name: &str, starter: (&str, &str)) -> String {
        format!(
            concat!(
                r#"<h2 itemprop="name">{}</h2>"#,
                "<h3>VORAUSSICHTLICHE AUFSTELLUNG</h3>",
                r#"<div class="player_position_row"><div class="player_position_column">"#,
                r#"<img src="https://www.ligainsider.de/player/team/{}.jpg">"#,
                r#"<a href="/{}/">{}</a></div></div>"#,
                "Spieler stand in der Startelf",
            ),
            name, starter.0, starter.0, starter.1
        )
    }

    fn crawler(source: MemorySource) -> LineupCrawler {
        LineupCrawler::new(Arc::new(Config::default()), Arc::new(source))
    }

    #[test]
    fn test_squad_url_for() {
        let crawler = crawler(MemorySource::new());
        assert_eq!(
            crawler.squad_url_for(&team_url("fc-st-pauli", 20)),
            "https://www.ligainsider.de/fc-st-pauli/20/kader/"
        );
        assert_eq!(
            crawler.squad_url_for("https://www.ligainsider.de/some/page/"),
            "https://www.ligainsider.de/some/page/"
        );
    }

    #[test]
    fn test_merge_team_squad() {
        let squad = vec![
            ScrapedPlayer::new("A", "a_1").with_image(Some("squad-a.jpg".into())),
            ScrapedPlayer::new("B", "b_2").with_image(Some("squad-b.jpg".into())),
        ];
        let lineup = vec![
            ScrapedPlayer::new("A", "a_1").with_image(Some("lineup-a.jpg".into())),
            ScrapedPlayer::new("B", "b_2"),
            ScrapedPlayer::new("C", "c_3"),
        ];
        let merged = merge_team_squad(&squad, &lineup);
        let images: Vec<_> = merged.iter().map(|p| p.image_url.as_deref()).collect();
        assert_eq!(images, vec![Some("lineup-a.jpg"), Some("squad-b.jpg"), None]);
    }

    #[tokio::test]
    async fn test_fetch_match_pairs_drops_trailing_link() {
        let source = MemorySource::new().with_page(
            &format!("{BASE}/bundesliga/spieltage/"),
            &overview(&[("fc-st-pauli", 20), ("werder-bremen", 6), ("vfl-bochum", 29)]),
        );
        let pairs = crawler(source).fetch_match_pairs().await.unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].home_url, team_url("fc-st-pauli", 20));
    }

    #[tokio::test]
    async fn test_fetch_matches_isolates_failures() {
        let source = MemorySource::new()
            .with_page(
                &team_url("fc-st-pauli", 20),
                &team_page("FC St. Pauli", ("lars-ritzka_25807", "Lars Ritzka")),
            )
            .with_page(
                &team_url("werder-bremen", 6),
                &team_page("Werder Bremen", ("marco-friedl_9", "Marco Friedl")),
            )
            .with_page(&team_url("vfl-bochum", 29), &team_page("VfL Bochum", ("a_1", "A")))
            .with_page(
                &format!("{BASE}/fc-st-pauli/20/kader/"),
                r#"<a href="/eric-smith_2/">Eric Smith</a>"#,
            );
        let pairs = vec![
            MatchPair {
                home_url: team_url("fc-st-pauli", 20),
                away_url: team_url("werder-bremen", 6),
            },
            MatchPair {
                home_url: team_url("vfl-bochum", 29),
                away_url: team_url("holstein-kiel", 321),
            },
        ];

        let outcome = crawler(source).fetch_matches(&pairs).await;

        assert_eq!(outcome.stats.pair_total, 2);
        assert_eq!(outcome.stats.pair_failures, 1);
        assert_eq!(outcome.stats.squad_total, 4);
        assert_eq!(outcome.stats.squad_failures, 3);
        assert_eq!(outcome.matches.len(), 1);

        let record = &outcome.matches[0];
        assert_eq!(record.home_team, "FC St. Pauli");
        assert_eq!(record.away_team, "Werder Bremen");
        let home_squad: Vec<_> = record.home_squad.iter().map(|p| p.id()).collect();
        assert_eq!(home_squad, vec!["eric-smith_2", "lars-ritzka_25807"]);
        assert_eq!(record.away_squad.len(), 1);
        assert_eq!(record.source_url.as_deref(), Some(team_url("fc-st-pauli", 20).as_str()));
    }

    #[tokio::test]
    async fn test_fetch_matches_requests_roster_pages() {
        let source = Arc::new(
            MemorySource::new()
                .with_page(
                    &team_url("fc-st-pauli", 20),
                    &team_page("FC St. Pauli", ("lars-ritzka_25807", "Lars Ritzka")),
                )
                .with_page(
                    &team_url("werder-bremen", 6),
                    &team_page("Werder Bremen", ("marco-friedl_9", "Marco Friedl")),
                ),
        );
        let crawler = LineupCrawler::new(Arc::new(Config::default()), source.clone());
        let pairs = vec![MatchPair {
            home_url: team_url("fc-st-pauli", 20),
            away_url: team_url("werder-bremen", 6),
        }];

        let outcome = crawler.fetch_matches(&pairs).await;
        assert_eq!(outcome.matches.len(), 1);

        let mut requests = source.requests();
        requests.sort();
        assert_eq!(
            requests,
            vec![
                format!("{BASE}/bundesliga/team/fc-st-pauli/20/saison-2025-2026/"),
                format!("{BASE}/bundesliga/team/werder-bremen/6/saison-2025-2026/"),
                format!("{BASE}/fc-st-pauli/20/kader/"),
                format!("{BASE}/werder-bremen/6/kader/"),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_all_squads() {
        let mut config = Config::default();
        config.site.squads = vec![
            SquadPath {
                team: "FC St. Pauli".into(),
                path: "/fc-st-pauli/20/kader/".into(),
            },
            SquadPath {
                team: "Holstein Kiel".into(),
                path: "/holstein-kiel/321/kader/".into(),
            },
        ];
        let source = MemorySource::new().with_page(
            &format!("{BASE}/fc-st-pauli/20/kader/"),
            r#"<a href="/eric-smith_2/">Eric Smith</a><a href="/hauke-wahl_1/">Hauke Wahl</a>"#,
        );
        let crawler = LineupCrawler::new(Arc::new(config), Arc::new(source));

        let refresh = crawler.fetch_all_squads().await;
        assert_eq!(refresh.team_total, 2);
        assert_eq!(refresh.team_failures, 1);
        assert_eq!(refresh.players.len(), 2);
    }
}
