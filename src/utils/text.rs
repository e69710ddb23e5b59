// src/utils/text.rs

//! Text normalization and substring-scanning helpers.
//!
//! Everything in this module is pure and total: no function here returns an
//! error or panics on arbitrary input.

use unicode_segmentation::UnicodeSegmentation;

/// Fixed transliteration table applied after lowercasing.
///
/// German digraphs first, then the Central-European letters that show up in
/// Bundesliga rosters.
const TRANSLITERATIONS: &[(char, &str)] = &[
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
    ('ß', "ss"),
    ('á', "a"),
    ('à', "a"),
    ('â', "a"),
    ('ã', "a"),
    ('å', "a"),
    ('ą', "a"),
    ('ć', "c"),
    ('č', "c"),
    ('ç', "c"),
    ('ď', "d"),
    ('đ', "d"),
    ('é', "e"),
    ('è', "e"),
    ('ê', "e"),
    ('ë', "e"),
    ('ě', "e"),
    ('ę', "e"),
    ('í', "i"),
    ('ì', "i"),
    ('î', "i"),
    ('ï', "i"),
    ('ł', "l"),
    ('ń', "n"),
    ('ň', "n"),
    ('ñ', "n"),
    ('ó', "o"),
    ('ò', "o"),
    ('ô', "o"),
    ('õ', "o"),
    ('ø', "o"),
    ('ř', "r"),
    ('š', "s"),
    ('ś', "s"),
    ('ş', "s"),
    ('ť', "t"),
    ('ú', "u"),
    ('ù', "u"),
    ('û', "u"),
    ('ů', "u"),
    ('ý', "y"),
    ('ÿ', "y"),
    ('ž', "z"),
    ('ź', "z"),
    ('ż', "z"),
];

fn transliterate(ch: char) -> Option<&'static str> {
    TRANSLITERATIONS
        .iter()
        .find(|(from, _)| *from == ch)
        .map(|(_, to)| *to)
}

/// Normalize a name, slug or URL for comparison.
///
/// Lowercases, transliterates umlauts and diacritics to ASCII, turns hyphens
/// into spaces and trims. Idempotent.
///
/// # Examples
/// ```
/// use lineup_crawler::utils::text::normalize;
///
/// assert_eq!(normalize("Müller-Fährmann"), "mueller faehrmann");
/// ```
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());

    for ch in lowered.chars() {
        match transliterate(ch) {
            Some(ascii) => out.push_str(ascii),
            None if ch == '-' => out.push(' '),
            None => out.push(ch),
        }
    }

    out.trim().to_string()
}

/// Split a normalized string into name tokens on space, underscore and hyphen.
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split([' ', '_', '-'])
}

/// Remove markup tags with a single linear scan.
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut inside_tag = false;

    for ch in text.chars() {
        match ch {
            '<' => inside_tag = true,
            '>' => inside_tag = false,
            _ if !inside_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Decode the character references the site emits in player names.
///
/// Unknown entities are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];

        let decoded = candidate
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&candidate[1..semi]).map(|ch| (ch, semi)));

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "nbsp" => Some(' '),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Number of user-perceived characters.
pub fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// The first `max_chars` characters of `text`.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Roughly the last `max_bytes` bytes of `text`, moved forward to a char boundary.
pub fn tail_window(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

/// Text between the first `open` and the next `close` after it.
pub fn between<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = text.find(open)? + open.len();
    let len = text[start..].find(close)?;
    Some(&text[start..start + len])
}

/// Text before the first `pattern`.
pub fn before<'a>(text: &'a str, pattern: &str) -> Option<&'a str> {
    text.find(pattern).map(|idx| &text[..idx])
}
