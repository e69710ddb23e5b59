// src/services/overview.rs

//! Match pairs from the matchday overview page.

use std::collections::HashSet;

use crate::models::{MatchPair, SiteConfig};
use crate::services::extract::attribute_values;

/// Team links in page order, paired consecutively as home and away.
///
/// Duplicates are dropped before pairing; an odd trailing link is ignored.
pub fn parse_overview(html: &str, site: &SiteConfig) -> Vec<MatchPair> {
    let mut seen = HashSet::new();
    let links: Vec<String> = attribute_values(html, "href=\"")
        .filter(|path| path.contains(&site.team_marker) && path.contains(&site.season_marker))
        .filter_map(|path| match site.absolute_url(path) {
            Ok(url) => Some(url),
            Err(e) => {
                log::debug!("Skipping team link {}: {}", path, e);
                None
            }
        })
        .filter(|url| seen.insert(url.clone()))
        .collect();

    if links.len() % 2 == 1 {
        log::debug!("Dropping unpaired team link {:?}", links.last());
    }

    links
        .chunks_exact(2)
        .map(|pair| MatchPair {
            home_url: pair[0].clone(),
            away_url: pair[1].clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(team: &str) -> String {
        format!(r#"<a href="/bundesliga/team/{team}/saison-2025-2026/">{team}</a>"#)
    }

    #[test]
    fn test_pairs_in_page_order() {
        let html = [
            link("fc-st-pauli/20"),
            r#"<a href="/bundesliga/team/ohne-saison/1/">x</a>"#.to_string(),
            link("werder-bremen/6"),
            link("fc-st-pauli/20"),
            link("vfl-bochum/29"),
            link("holstein-kiel/321"),
            link("fc-augsburg/80"),
        ]
        .concat();

        let pairs = parse_overview(&html, &SiteConfig::default());
        assert_eq!(pairs.len(), 2);
        assert_eq!(
            pairs[0].home_url,
            "https://www.ligainsider.de/bundesliga/team/fc-st-pauli/20/saison-2025-2026/"
        );
        assert!(pairs[0].away_url.contains("werder-bremen"));
        assert!(pairs[1].home_url.contains("vfl-bochum"));
        assert!(pairs[1].away_url.contains("holstein-kiel"));
    }

    #[test]
    fn test_empty_page() {
        assert!(parse_overview("<html></html>", &SiteConfig::default()).is_empty());
    }
}
