// src/services/index.rs

//! Process-wide player index.
//!
//! The index only ever grows: every completed cycle merges its players into
//! the existing entries. Readers take an `Arc` snapshot; writers clone the
//! current index, merge into the copy and swap it in.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use indexmap::{IndexMap, IndexSet};

use crate::models::{MatchRecord, ScrapedPlayer};
use crate::utils::text::normalize;

/// Slug-keyed players plus lineup membership, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PlayerIndex {
    players: IndexMap<String, ScrapedPlayer>,
    starting_ids: HashSet<String>,
    alternative_names: IndexSet<String>,
}

impl PlayerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ScrapedPlayer> {
        self.players.get(id)
    }

    /// `(id, player)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScrapedPlayer)> {
        self.players.iter().map(|(id, player)| (id.as_str(), player))
    }

    pub fn is_starting(&self, id: &str) -> bool {
        self.starting_ids.contains(id)
    }

    pub fn starting_count(&self) -> usize {
        self.starting_ids.len()
    }

    /// Normalized names listed as a second option for some lineup slot.
    pub fn alternative_names(&self) -> impl Iterator<Item = &str> {
        self.alternative_names.iter().map(String::as_str)
    }

    /// Insert or replace by id, never dropping a known image.
    pub fn insert(&mut self, mut player: ScrapedPlayer) {
        let id = player.id().to_string();
        if let Some(existing) = self.players.get(&id) {
            if player.image_url.is_none() && existing.image_url.is_some() {
                player.image_url = existing.image_url.clone();
            }
        }
        self.players.insert(id, player);
    }

    /// Merge one completed cycle: squads first, then lineup rows.
    pub fn merge_matches(&mut self, matches: &[MatchRecord]) {
        for record in matches {
            for player in record.squad_players() {
                self.insert(player.clone());
            }
        }

        for record in matches {
            for player in record.lineup_rows().flat_map(|row| row.players.iter()) {
                self.starting_ids.insert(player.id().to_string());
                if let Some(alternative) = &player.alternative_name {
                    self.alternative_names.insert(normalize(alternative));
                }
                self.insert(player.clone());
            }
        }
    }

    /// Merge a roster-only refresh.
    ///
    /// Unknown players are added; known players only gain a missing image.
    /// Returns the number of new entries.
    pub fn merge_squad(&mut self, players: impl IntoIterator<Item = ScrapedPlayer>) -> usize {
        let mut added = 0;
        for player in players {
            match self.players.get_mut(player.id()) {
                Some(existing) => {
                    if existing.image_url.is_none() {
                        existing.image_url = player.image_url;
                    }
                }
                None => {
                    self.players.insert(player.id().to_string(), player);
                    added += 1;
                }
            }
        }
        added
    }
}

/// Shared handle to the current index with a single-writer update path.
#[derive(Debug, Default)]
pub struct IndexStore {
    current: RwLock<Arc<PlayerIndex>>,
    writer: Mutex<()>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The index as of the last completed merge.
    pub fn snapshot(&self) -> Arc<PlayerIndex> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Apply `merge` to a copy of the index and publish the result.
    pub fn update<R>(&self, merge: impl FnOnce(&mut PlayerIndex) -> R) -> R {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = PlayerIndex::clone(&self.snapshot());
        let result = merge(&mut next);

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(next);
        result
    }
}
