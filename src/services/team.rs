// src/services/team.rs

//! Team name and crest from a team detail page.

use crate::models::SiteConfig;
use crate::services::extract::attribute_values;
use crate::utils::text::{before, between, decode_entities, strip_tags};

const NAME_MARKER: &str = "itemprop=\"name\"";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamHeader {
    pub name: String,
    pub logo_url: Option<String>,
}

/// Read the team header; falls back to the page title, then to the default name.
pub fn parse_team_header(html: &str, site: &SiteConfig) -> TeamHeader {
    let Some(marker) = html.find(NAME_MARKER) else {
        return TeamHeader {
            name: title_name(html).unwrap_or_else(|| site.default_team_name.clone()),
            logo_url: None,
        };
    };

    let logo_url = attribute_values(&html[..marker], "src=\"")
        .filter(|url| site.is_crest(url))
        .last()
        .map(str::to_string);

    let name = between(&html[marker..], ">", "</h2>")
        .map(|raw| clean(&strip_tags(raw)))
        .filter(|name| !name.is_empty())
        .or_else(|| title_name(html))
        .unwrap_or_else(|| site.default_team_name.clone());

    TeamHeader { name, logo_url }
}

fn title_name(html: &str) -> Option<String> {
    let title = between(html, "<title>", "</title>")?;
    let first = before(title, "|").unwrap_or(title);
    Some(clean(first)).filter(|name| !name.is_empty())
}

fn clean(text: &str) -> String {
    decode_entities(text).trim().to_string()
}
