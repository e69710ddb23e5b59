// src/lib.rs

//! Lineup Crawler Library
//!
//! Scrapes predicted lineups and squads from a markup-only football fan-site
//! and matches them to fantasy roster players by name.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::{PlayerStatus, ScrapedPlayer};
pub use services::LineupService;
