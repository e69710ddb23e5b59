//! Pipeline entry points for crawler operations.
//!
//! - `run_lineups`: One scrape cycle: overview, team pages, squads, merge
//! - `run_squads`: Refresh every configured squad into the player index

pub mod cycle;

pub use cycle::{CycleReport, run_lineups, run_squads};
