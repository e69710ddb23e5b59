// src/services/lineup.rs

//! Predicted lineup parser.
//!
//! The lineup section starts at a header marker and ends at the legend. Inside
//! it, each `player_position_row` is one tactical line and each
//! `player_position_column` one slot. A slot holds the predicted starter and,
//! optionally, a second name competing for the same position.

use std::collections::HashSet;

use crate::models::{LineupRow, ScrapedPlayer, SiteConfig};
use crate::services::extract::{Anchor, AnchorScanner, attribute_values};
use crate::utils::text::{before, char_prefix, normalize};

/// Lineup rows plus every slot occupant as a flat list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLineup {
    pub rows: Vec<LineupRow>,
    pub players: Vec<ScrapedPlayer>,
}

impl ParsedLineup {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse the predicted lineup of a team detail page.
///
/// Pages without a lineup header yield an empty result.
pub fn parse_lineup(html: &str, site: &SiteConfig) -> ParsedLineup {
    let Some(section) = lineup_section(html, site) else {
        log::debug!("No lineup header found");
        return ParsedLineup::default();
    };

    let mut parsed = ParsedLineup::default();
    for row_html in section.split(site.row_marker.as_str()).skip(1) {
        let mut row = Vec::new();
        for column_html in row_html.split(site.column_marker.as_str()).skip(1) {
            let Some((starter, alternative)) = parse_column(column_html, site) else {
                continue;
            };
            let starter = starter
                .with_alternative(alternative.as_ref().map(|alt| alt.display_name.clone()));
            parsed.players.push(starter.clone());
            parsed.players.extend(alternative);
            row.push(starter);
        }
        if !row.is_empty() {
            parsed.rows.push(LineupRow::new(row));
        }
    }
    parsed
}

/// Text between the first matching header and the legend, capped in length.
fn lineup_section<'h>(html: &'h str, site: &SiteConfig) -> Option<&'h str> {
    let start = site
        .lineup_headers
        .iter()
        .filter(|marker| !marker.is_empty())
        .find_map(|marker| html.find(marker.as_str()).map(|idx| idx + marker.len()))?;
    let window = char_prefix(&html[start..], site.scan_limit);
    Some(before(window, &site.legend_marker).unwrap_or(window))
}

/// Starter and optional alternative of one slot.
fn parse_column(
    column_html: &str,
    site: &SiteConfig,
) -> Option<(ScrapedPlayer, Option<ScrapedPlayer>)> {
    let images: Vec<&str> = attribute_values(column_html, "src=\"")
        .filter(|url| site.is_player_photo(url))
        .collect();

    let mut seen = HashSet::new();
    let anchors: Vec<Anchor> = AnchorScanner::new(column_html, site)
        .filter(|anchor| seen.insert(anchor.name.to_lowercase()))
        .take(2)
        .collect();

    let assigned = assign_images(&anchors, &images);
    let mut occupants = anchors
        .into_iter()
        .zip(assigned)
        .map(|(anchor, image)| ScrapedPlayer::new(anchor.name, anchor.slug).with_image(image));

    let starter = occupants.next()?;
    Some((starter, occupants.next()))
}

/// Give each anchor at most one photo; a photo is claimed at most once.
///
/// A photo whose URL mentions the player's slug name wins; otherwise the
/// first unclaimed photo is used.
fn assign_images(anchors: &[Anchor], images: &[&str]) -> Vec<Option<String>> {
    let normalized: Vec<String> = images.iter().map(|url| normalize(url)).collect();
    let mut claimed = vec![false; images.len()];

    anchors
        .iter()
        .map(|anchor| {
            let name_part = normalize(anchor.slug_name());
            let by_name = (0..images.len())
                .find(|&idx| !claimed[idx] && normalized[idx].contains(&name_part));
            let pick = by_name.or_else(|| (0..images.len()).find(|&idx| !claimed[idx]))?;
            claimed[pick] = true;
            Some(images[pick].to_string())
        })
        .collect()
}
