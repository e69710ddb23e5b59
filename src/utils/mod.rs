//! Utility functions and helpers.

pub mod http;
pub mod text;

use url::Url;

/// Path segments of a URL, empty segments skipped.
pub fn path_segments(url_str: &str) -> Vec<String> {
    Url::parse(url_str)
        .ok()
        .map(|u| {
            u.path()
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
