//! Service layer for the lineup crawler.
//!
//! This module contains the business logic for:
//! - Page extraction (`extract`, `overview`, `team`, `lineup`, `squad`)
//! - Concurrent fetching (`LineupCrawler`)
//! - The player index and name matching (`index`, `matcher`)
//! - The public lookup API (`LineupService`)

pub mod crawler;
pub mod extract;
pub mod index;
pub mod lineup;
mod lineups;
pub mod matcher;
pub mod overview;
pub mod source;
pub mod squad;
pub mod team;

pub use crawler::{CrawlOutcome, LineupCrawler, SquadRefresh};
pub use index::{IndexStore, PlayerIndex};
pub use lineups::LineupService;
pub use source::{HttpSource, PageSource};
pub use squad::SquadFetcher;
