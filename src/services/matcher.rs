// src/services/matcher.rs

//! Name-based lookup of fan-site players for fantasy roster entries.
//!
//! Both datasets spell names differently and share no identifier, so every
//! comparison runs on normalized text. Ties always resolve to the earliest
//! inserted player.

use crate::models::{PlayerStatus, ScrapedPlayer};
use crate::services::index::PlayerIndex;
use crate::utils::text::{normalize, tokens};

/// Find the fan-site player for a roster name.
///
/// Tiers, most to least strict:
/// 1. the last name is a whole token of the slug;
/// 2. among several, the first name is a token as well;
/// 3. still ambiguous: the slug starts with the last or first name, else the
///    first tier 1 candidate;
/// 4. no tier 1 candidate: the last name is a substring of the slug, unique or
///    narrowed by the first name.
pub fn find_player<'i>(
    index: &'i PlayerIndex,
    first: &str,
    last: &str,
) -> Option<&'i ScrapedPlayer> {
    let first = normalize(first);
    let last = normalize(last);
    if index.is_empty() || last.is_empty() {
        return None;
    }

    let entries: Vec<(String, &ScrapedPlayer)> = index
        .iter()
        .map(|(id, player)| (normalize(id), player))
        .collect();
    let has_token = |slug: &str, name: &str| !name.is_empty() && tokens(slug).any(|t| t == name);

    let exact: Vec<&(String, &ScrapedPlayer)> = entries
        .iter()
        .filter(|(slug, _)| has_token(slug, &last))
        .collect();

    match exact.as_slice() {
        [] => {}
        [(_, player)] => return Some(*player),
        several => {
            if let Some((_, player)) = several.iter().find(|(slug, _)| has_token(slug, &first)) {
                return Some(*player);
            }
            let prefixed = several.iter().find(|(slug, _)| {
                slug.starts_with(&last) || (!first.is_empty() && slug.starts_with(&first))
            });
            return prefixed.or(several.first()).map(|(_, player)| *player);
        }
    }

    let loose: Vec<&(String, &ScrapedPlayer)> = entries
        .iter()
        .filter(|(slug, _)| slug.contains(&last))
        .collect();

    match loose.as_slice() {
        [] => None,
        [(_, player)] => Some(*player),
        several => several
            .iter()
            .find(|(slug, _)| !first.is_empty() && slug.contains(&first))
            .map(|(_, player)| *player),
    }
}

/// Classify a roster player against the current lineups.
///
/// `has_matches` is false before the first successful cycle.
pub fn classify_status(
    index: &PlayerIndex,
    has_matches: bool,
    first: &str,
    last: &str,
) -> PlayerStatus {
    if !has_matches {
        return PlayerStatus::Out;
    }

    let first = normalize(first);
    let last = normalize(last);
    if last.is_empty() {
        return PlayerStatus::Out;
    }

    if index
        .alternative_names()
        .any(|alternative| alternative == last || alternative.contains(&last))
    {
        return PlayerStatus::IsAlternative;
    }

    let candidates: Vec<(&str, &ScrapedPlayer)> = index
        .iter()
        .filter(|(id, _)| normalize(id).contains(&last))
        .collect();

    let found = match candidates.as_slice() {
        [] => None,
        [only] => Some(*only),
        several => several
            .iter()
            .find(|(id, _)| !first.is_empty() && normalize(id).contains(&first))
            .or(several.first())
            .copied(),
    };

    match found {
        Some((id, player)) if index.is_starting(id) => {
            if player.alternative_name.is_some() {
                PlayerStatus::StartWithAlternative
            } else {
                PlayerStatus::LikelyStart
            }
        }
        Some(_) => PlayerStatus::Bench,
        None => PlayerStatus::Out,
    }
}
