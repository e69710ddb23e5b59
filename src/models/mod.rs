// src/models/mod.rs

//! Domain models for the lineup crawler.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod matches;
mod player;
mod status;

// Re-export all public types
pub use config::{Config, CrawlerConfig, SiteConfig, SquadPath, StorageConfig};
pub use matches::{CycleState, CycleStats, MatchPair, MatchRecord, TeamPageResult};
pub use player::{LineupRow, ScrapedPlayer};
pub use status::PlayerStatus;
