// src/services/squad.rs

//! Squad roster pages.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{ScrapedPlayer, SiteConfig};
use crate::services::extract::AnchorScanner;
use crate::services::source::PageSource;

/// Players listed on one roster page, unique by slug.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SquadPage {
    pub players: Vec<ScrapedPlayer>,
    /// Players that only had flag or crest images next to them
    pub only_flags: usize,
}

impl SquadPage {
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Every valid player anchor on the page; the first occurrence of a slug wins.
pub fn parse_squad(html: &str, site: &SiteConfig) -> SquadPage {
    let mut seen = HashSet::new();
    let mut page = SquadPage::default();

    for anchor in AnchorScanner::new(html, site) {
        if !seen.insert(anchor.slug.clone()) {
            continue;
        }
        if anchor.only_flags {
            page.only_flags += 1;
        }
        page.players.push(anchor.into_player());
    }
    page
}

/// Fetches and parses roster pages.
#[derive(Clone)]
pub struct SquadFetcher {
    source: Arc<dyn PageSource>,
    site: Arc<SiteConfig>,
}

impl SquadFetcher {
    pub fn new(source: Arc<dyn PageSource>, site: Arc<SiteConfig>) -> Self {
        Self { source, site }
    }

    /// Fetch and parse, propagating transport and decode errors.
    ///
    /// Callers decide whether a failure becomes an empty squad.
    pub async fn fetch(&self, url: &str) -> Result<SquadPage> {
        let html = self.source.fetch(url).await?;
        let page = parse_squad(&html, &self.site);
        log::debug!("Squad {}: {} players", url, page.len());
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::source::fake::MemorySource;

    const SQUAD: &str = concat!(
        r#"<a href="/fc-st-pauli/20/">FC St. Pauli</a>"#,
        r#"<img src="https://www.ligainsider.de/player/team/vasilj.jpg">"#,
        r#"<a href="/nikola-vasilj_13866/">Nikola Vasilj</a>"#,
        r#"<a href="/nikola-vasilj_13866/?tab=stats">Statistik</a>"#,
        r#"<img src="https://www.ligainsider.de/images/nations/de.png">"#,
        r#"<a href="/lars-ritzka_25807/">Lars Ritzka</a>"#,
    );

    #[test]
    fn test_parse_squad_dedups_by_slug() {
        let page = parse_squad(SQUAD, &SiteConfig::default());
        let slugs: Vec<_> = page.players.iter().map(|p| p.id()).collect();
        assert_eq!(slugs, vec!["nikola-vasilj_13866", "lars-ritzka_25807"]);
        assert_eq!(page.players[0].display_name, "Nikola Vasilj");
        assert!(page.players[0].has_image());
    }

    #[test]
    fn test_parse_squad_counts_flag_only_players() {
        let page = parse_squad(SQUAD, &SiteConfig::default());
        // Vasilj's photo sits before his own link, out of Ritzka's reach.
        assert_eq!(page.players[1].id(), "lars-ritzka_25807");
        assert_eq!(page.players[1].image_url, None);
        assert_eq!(page.only_flags, 1);

        let flags_only = r#"<img src="https://www.ligainsider.de/images/nations/de.png"><a href="/a_1/">A</a>"#;
        let page = parse_squad(flags_only, &SiteConfig::default());
        assert_eq!(page.only_flags, 1);
        assert!(!page.players[0].has_image());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let url = "https://www.ligainsider.de/fc-st-pauli/20/kader/";
        let fetcher = SquadFetcher::new(
            Arc::new(MemorySource::new()),
            Arc::new(SiteConfig::default()),
        );
        assert!(fetcher.fetch(url).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_parses_page() {
        let url = "https://www.ligainsider.de/fc-st-pauli/20/kader/";
        let source = MemorySource::new().with_page(url, SQUAD);
        let fetcher = SquadFetcher::new(Arc::new(source), Arc::new(SiteConfig::default()));
        assert_eq!(fetcher.fetch(url).await.unwrap().len(), 2);
    }
}
