// src/services/lineups.rs

//! Lineup service: the API the rest of the application talks to.
//!
//! Owns the player index and the exposed match list, runs scrape cycles and
//! answers player lookups. Lookups never wait for a running cycle; they see
//! the state of the last completed merge.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{AppError, Result};
use crate::models::{Config, CycleState, CycleStats, MatchRecord, PlayerStatus, ScrapedPlayer};
use crate::services::crawler::LineupCrawler;
use crate::services::index::IndexStore;
use crate::services::matcher::{classify_status, find_player};
use crate::services::source::{HttpSource, PageSource};
use crate::storage::{NoopStorage, Snapshot, SnapshotStorage};
use crate::utils::http;

pub struct LineupService {
    crawler: LineupCrawler,
    storage: Arc<dyn SnapshotStorage>,
    index: IndexStore,
    matches: RwLock<Arc<Vec<MatchRecord>>>,
    state: RwLock<CycleState>,
    error: RwLock<Option<String>>,
    only_flags: AtomicUsize,
}

impl LineupService {
    pub fn new(
        config: Arc<Config>,
        source: Arc<dyn PageSource>,
        storage: Arc<dyn SnapshotStorage>,
    ) -> Self {
        Self {
            crawler: LineupCrawler::new(config, source),
            storage,
            index: IndexStore::new(),
            matches: RwLock::new(Arc::new(Vec::new())),
            state: RwLock::new(CycleState::Idle),
            error: RwLock::new(None),
            only_flags: AtomicUsize::new(0),
        }
    }

    /// Service reading the live site, without snapshot persistence.
    pub fn with_http(config: Arc<Config>) -> Result<Self> {
        let client = http::create_client(&config.crawler)?;
        Ok(Self::new(
            config,
            Arc::new(HttpSource::new(client)),
            Arc::new(NoopStorage),
        ))
    }

    /// Replace the snapshot backend.
    pub fn with_storage(mut self, storage: Arc<dyn SnapshotStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Run one full scrape cycle and merge it into the index.
    ///
    /// When the overview cannot be fetched the cycle fails: the error message
    /// is kept, the last snapshot is loaded and the error is returned.
    pub async fn fetch_lineups(&self) -> Result<CycleStats> {
        self.set_state(CycleState::FetchingOverview);
        *write(&self.error) = None;

        let pairs = match self.crawler.fetch_match_pairs().await {
            Ok(pairs) => pairs,
            Err(error) => {
                let kind = if error.is_transport() { "site unreachable" } else { "setup" };
                log::error!("Lineup cycle failed ({}): {}", kind, error);
                self.set_state(CycleState::Failed);
                *write(&self.error) = Some(error.to_string());
                self.recover_from_snapshot().await;
                return Err(error);
            }
        };

        self.set_state(CycleState::FetchingDetails);
        let outcome = self.crawler.fetch_matches(&pairs).await;

        self.set_state(CycleState::Merging);
        let matches = self.publish(outcome.matches);
        self.only_flags.store(outcome.stats.only_flags, Ordering::Relaxed);
        self.set_state(CycleState::Ready);

        log::info!(
            "Lineups ready: {} matches, {} players indexed",
            matches.len(),
            self.player_cache_count()
        );

        if let Err(e) = self.storage.save_snapshot(&Snapshot::new(matches.to_vec())).await {
            log::warn!("Failed to save snapshot: {}", e);
        }

        Ok(outcome.stats)
    }

    /// Refresh every configured squad; returns the number of new players.
    pub async fn fetch_all_squads(&self) -> Result<usize> {
        let refresh = self.crawler.fetch_all_squads().await;
        if refresh.team_total > 0 && refresh.team_failures == refresh.team_total {
            return Err(AppError::fetch(
                "fetch_all_squads",
                format!("all {} squad pages failed", refresh.team_total),
            ));
        }

        self.only_flags.fetch_add(refresh.only_flags, Ordering::Relaxed);
        let added = self.index.update(|index| index.merge_squad(refresh.players));
        log::info!(
            "Squad refresh: {} new players ({} indexed)",
            added,
            self.player_cache_count()
        );
        Ok(added)
    }

    /// Fan-site player for a roster name.
    pub fn get_player(&self, first: &str, last: &str) -> Option<ScrapedPlayer> {
        let index = self.index.snapshot();
        find_player(&index, first, last).cloned()
    }

    /// Lineup status for a roster name.
    pub fn get_player_status(&self, first: &str, last: &str) -> PlayerStatus {
        let has_matches = !self.matches().is_empty();
        classify_status(&self.index.snapshot(), has_matches, first, last)
    }

    pub fn icon(&self, status: PlayerStatus) -> &'static str {
        status.icon()
    }

    pub fn color(&self, status: PlayerStatus) -> &'static str {
        status.color()
    }

    pub fn player_cache_count(&self) -> usize {
        self.index.snapshot().len()
    }

    /// Matches of the last completed cycle.
    pub fn matches(&self) -> Arc<Vec<MatchRecord>> {
        Arc::clone(&read(&self.matches))
    }

    pub fn state(&self) -> CycleState {
        *read(&self.state)
    }

    pub fn is_ready(&self) -> bool {
        self.state() == CycleState::Ready
    }

    /// Message of the last failed cycle.
    pub fn error_message(&self) -> Option<String> {
        read(&self.error).clone()
    }

    /// Players of the last cycle that only had flag or crest images.
    pub fn only_flags_count(&self) -> usize {
        self.only_flags.load(Ordering::Relaxed)
    }

    /// Merge `matches` into the index and expose them, as one update.
    fn publish(&self, matches: Vec<MatchRecord>) -> Arc<Vec<MatchRecord>> {
        let matches = Arc::new(matches);
        self.index.update(|index| {
            index.merge_matches(&matches);
            *write(&self.matches) = Arc::clone(&matches);
        });
        matches
    }

    async fn recover_from_snapshot(&self) {
        match self.storage.load_snapshot().await {
            Ok(Some(snapshot)) => {
                log::info!(
                    "Loaded snapshot from {} with {} matches",
                    snapshot.saved_at,
                    snapshot.count
                );
                self.publish(snapshot.matches);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Failed to load snapshot: {}", e),
        }
    }

    fn set_state(&self, state: CycleState) {
        log::debug!("Cycle state: {:?}", state);
        *write(&self.state) = state;
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
