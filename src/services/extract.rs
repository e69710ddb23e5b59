// src/services/extract.rs

//! Player anchor extraction from raw page text.
//!
//! The fan-site marks every player profile link as `href="/<slug>_<id>/"`.
//! [`AnchorScanner`] walks those links with plain substring scans; no DOM is
//! ever built.

use crate::models::{ScrapedPlayer, SiteConfig};
use crate::utils::text::{decode_entities, grapheme_len, strip_tags, tail_window};

const PROFILE_LINK: &str = "href=\"/";
const SRC_ATTR: &str = "src=\"";

/// One player profile link found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub slug: String,
    pub name: String,
    pub image_url: Option<String>,
    /// No photo, but flag or crest images were seen next to the link
    pub only_flags: bool,
}

impl Anchor {
    /// The slug without its numeric id, e.g. `lars-ritzka`.
    pub fn slug_name(&self) -> &str {
        slug_name(&self.slug)
    }

    pub fn into_player(self) -> ScrapedPlayer {
        ScrapedPlayer::new(self.name, self.slug).with_image(self.image_url)
    }
}

/// Lazy iterator over the valid player anchors of a page.
pub struct AnchorScanner<'a> {
    page: &'a str,
    site: &'a SiteConfig,
    /// Byte offset just past the next unvisited `href="/`
    cursor: Option<usize>,
    /// Start of the previous link fragment; the image lookbehind never crosses it
    floor: usize,
}

impl<'a> AnchorScanner<'a> {
    pub fn new(page: &'a str, site: &'a SiteConfig) -> Self {
        let cursor = page.find(PROFILE_LINK).map(|idx| idx + PROFILE_LINK.len());
        Self {
            page,
            site,
            cursor,
            floor: 0,
        }
    }

    fn parse(&self, fragment: &str, preceding: &str) -> Option<Anchor> {
        let quote = fragment.find('"')?;
        let slug = clean_slug(&fragment[..quote]);
        if !is_valid_slug(slug) {
            return None;
        }

        let rest = &fragment[quote..];
        let open = rest.find('>')?;
        let close = rest[open..].find("</a>")? + open;
        let markup = &rest[..close];
        let inner = &rest[open + 1..close];

        let name = link_text(inner).or_else(|| attribute_fallback(markup))?;
        if grapheme_len(&name) > self.site.max_name_length {
            return None;
        }

        let (image_url, saw_flags) = match self.pick_image(attribute_values(inner, SRC_ATTR)) {
            (Some(url), flags) => (Some(url), flags),
            (None, inner_flags) => {
                let window = tail_window(preceding, self.site.image_lookbehind);
                let values: Vec<&str> = attribute_values(window, SRC_ATTR).collect();
                let (url, flags) = self.pick_image(values.into_iter().rev());
                (url, inner_flags || flags)
            }
        };

        Some(Anchor {
            slug: slug.to_string(),
            name,
            only_flags: image_url.is_none() && saw_flags,
            image_url,
        })
    }

    /// First host image that is not a flag or crest, and whether any were skipped.
    fn pick_image<'s>(&self, urls: impl Iterator<Item = &'s str>) -> (Option<String>, bool) {
        let mut saw_ignored = false;
        for url in urls.filter(|url| self.site.is_host_image(url)) {
            if self.site.is_ignored_image(url) {
                saw_ignored = true;
                continue;
            }
            return (Some(url.to_string()), saw_ignored);
        }
        (None, saw_ignored)
    }
}

impl Iterator for AnchorScanner<'_> {
    type Item = Anchor;

    fn next(&mut self) -> Option<Anchor> {
        loop {
            let start = self.cursor?;
            let end = self.page[start..]
                .find(PROFILE_LINK)
                .map(|idx| start + idx);
            self.cursor = end.map(|idx| idx + PROFILE_LINK.len());

            let fragment = &self.page[start..end.unwrap_or(self.page.len())];
            let preceding = &self.page[self.floor..start - PROFILE_LINK.len()];
            self.floor = start;
            if let Some(anchor) = self.parse(fragment, preceding) {
                return Some(anchor);
            }
        }
    }
}

/// Drop the query string and surrounding slashes from a raw link target.
fn clean_slug(raw: &str) -> &str {
    raw.split('?').next().unwrap_or(raw).trim_matches('/')
}

/// `<name>_<id>`: exactly one underscore, no path separator, ends in a digit.
pub fn is_valid_slug(slug: &str) -> bool {
    slug.matches('_').count() == 1
        && !slug.contains('/')
        && slug.chars().last().is_some_and(|c| c.is_ascii_digit())
}

/// The part of a slug before the underscore.
pub fn slug_name(slug: &str) -> &str {
    slug.split('_').next().unwrap_or(slug)
}

/// Values of every `<attr>"…"` occurrence, in page order.
///
/// `src="` also matches `data-src="`.
pub fn attribute_values<'t>(text: &'t str, attr: &'t str) -> impl Iterator<Item = &'t str> {
    text.split(attr)
        .skip(1)
        .filter_map(|piece| piece.find('"').map(|end| &piece[..end]))
}

fn link_text(inner: &str) -> Option<String> {
    let stripped = decode_entities(&strip_tags(inner));
    let name = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}

fn attribute_fallback(markup: &str) -> Option<String> {
    ["title=\"", "alt=\""].into_iter().find_map(|attr| {
        attribute_values(markup, attr)
            .map(|value| decode_entities(value).trim().to_string())
            .find(|value| !value.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(page: &str) -> Vec<Anchor> {
        let site = SiteConfig::default();
        AnchorScanner::new(page, &site).collect()
    }

    #[test]
    fn test_valid_profile_link() {
        let anchors = scan(r#"<a href="/lars-ritzka_25807/">Lars Ritzka</a>"#);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].slug, "lars-ritzka_25807");
        assert_eq!(anchors[0].name, "Lars Ritzka");
        assert_eq!(anchors[0].slug_name(), "lars-ritzka");
    }

    #[test]
    fn test_rejects_non_profile_links() {
        let page = concat!(
            r#"<a href="/fc-st-pauli/20/kader/">Kader</a>"#,
            r#"<a href="/lars-ritzka/">Lars Ritzka</a>"#,
            r#"<a href="/a_b_1/">Two underscores</a>"#,
            r#"<a href="/lars-ritzka_x/">No digit</a>"#,
            r#"<a href="/lars-ritzka_25807/"></a>"#,
        );
        assert!(scan(page).is_empty());
    }

    #[test]
    fn test_rejects_long_names() {
        let long = "x".repeat(51);
        let page = format!(r#"<a href="/x_1/">{long}</a><a href="/y_2/">{}</a>"#, &long[..50]);
        let anchors = scan(&page);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].slug, "y_2");
    }

    #[test]
    fn test_strips_query_tags_and_entities() {
        let page = r#"<a href="/jean-luc-dompe_1234/?ref=kader"><span>Jean-Luc</span>
            <b>Domp&#233;</b> &amp; Co</a>"#;
        let anchors = scan(page);
        assert_eq!(anchors[0].slug, "jean-luc-dompe_1234");
        assert_eq!(anchors[0].name, "Jean-Luc Dompé & Co");
    }

    #[test]
    fn test_title_then_alt_fallback() {
        let page = concat!(
            r#"<a href="/harry-kane_1/" title="Harry Kane"><img src="x.jpg"></a>"#,
            r#"<a href="/jamal-musiala_2/"><img alt="Jamal Musiala" src="y.jpg"></a>"#,
        );
        let names: Vec<_> = scan(page).into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Harry Kane", "Jamal Musiala"]);
    }

    #[test]
    fn test_image_inside_link() {
        let page = r#"<a href="/harry-kane_1/"><img src="https://www.ligainsider.de/player/team/kane.jpg">Harry Kane</a>"#;
        let anchors = scan(page);
        assert_eq!(
            anchors[0].image_url.as_deref(),
            Some("https://www.ligainsider.de/player/team/kane.jpg")
        );
    }

    #[test]
    fn test_image_lookbehind_prefers_photo_over_flag() {
        let page = concat!(
            r#"<img data-src="https://www.ligainsider.de/player/team/kane.jpg">"#,
            r#"<img src="https://www.ligainsider.de/images/nations/en.png">"#,
            r#"<a href="/harry-kane_1/">Harry Kane</a>"#,
        );
        let anchors = scan(page);
        assert_eq!(
            anchors[0].image_url.as_deref(),
            Some("https://www.ligainsider.de/player/team/kane.jpg")
        );
        assert!(!anchors[0].only_flags);
    }

    #[test]
    fn test_only_flags() {
        let page = concat!(
            r#"<img src="https://cdn.example.com/kane.jpg">"#,
            r#"<img src="https://www.ligainsider.de/images/nations/en.png">"#,
            r#"<img src="https://www.ligainsider.de/images/teams/wappen_fcb.png">"#,
            r#"<a href="/harry-kane_1/">Harry Kane</a>"#,
        );
        let anchors = scan(page);
        assert_eq!(anchors[0].image_url, None);
        assert!(anchors[0].only_flags);
    }

    #[test]
    fn test_lookbehind_is_bounded() {
        let padding = " ".repeat(2_000);
        let page = format!(
            r#"<img src="https://www.ligainsider.de/player/team/kane.jpg">{padding}<a href="/harry-kane_1/">Harry Kane</a>"#
        );
        assert_eq!(scan(&page)[0].image_url, None);
    }

    #[test]
    fn test_lookbehind_stops_at_previous_link() {
        let page = concat!(
            r#"<img src="https://www.ligainsider.de/player/team/vasilj.jpg">"#,
            r#"<a href="/nikola-vasilj_13866/">Nikola Vasilj</a><div></div>"#,
            r#"<a href="/lars-ritzka_25807/">Lars Ritzka</a>"#,
        );
        let anchors = scan(page);
        assert_eq!(
            anchors[0].image_url.as_deref(),
            Some("https://www.ligainsider.de/player/team/vasilj.jpg")
        );
        assert_eq!(anchors[1].image_url, None);
        assert!(!anchors[1].only_flags);
    }

    #[test]
    fn test_lookbehind_does_not_skip_flags_into_previous_player() {
        let page = concat!(
            r#"<img src="https://www.ligainsider.de/player/team/vasilj.jpg">"#,
            r#"<a href="/nikola-vasilj_13866/">Nikola Vasilj</a>"#,
            r#"<img src="https://www.ligainsider.de/images/nations/de.png">"#,
            r#"<a href="/lars-ritzka_25807/">Lars Ritzka</a>"#,
        );
        let anchors = scan(page);
        assert_eq!(anchors[1].image_url, None);
        assert!(anchors[1].only_flags);
    }

    #[test]
    fn test_scanner_is_lazy_and_finite() {
        let site = SiteConfig::default();
        let page = r#"<a href="/a_1/">A</a><a href="/b_2/">B</a><a href="/c_3/">C</a>"#;
        let mut scanner = AnchorScanner::new(page, &site);
        assert_eq!(scanner.next().map(|a| a.slug), Some("a_1".to_string()));
        assert_eq!(scanner.count(), 2);
    }
}
