// src/services/source.rs

//! Page sources the crawler reads from.

use async_trait::async_trait;

use crate::error::Result;
use crate::utils::http;

/// Anything that can turn a URL into page text.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Live source backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);
        http::fetch_text(&self.client, url).await
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::error::AppError;

    /// In-memory pages keyed by absolute URL; unknown URLs fail like a 404.
    #[derive(Default)]
    pub struct MemorySource {
        pages: Mutex<HashMap<String, String>>,
        requests: Mutex<Vec<String>>,
    }

    impl MemorySource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(self, url: &str, html: &str) -> Self {
            self.set_page(url, html);
            self
        }

        pub fn set_page(&self, url: &str, html: &str) {
            let mut pages = self.pages.lock().unwrap();
            pages.insert(url.to_string(), html.to_string());
        }

        pub fn remove_page(&self, url: &str) {
            self.pages.lock().unwrap().remove(url);
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for MemorySource {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::fetch(url, "404 Not Found"))
        }
    }
}
