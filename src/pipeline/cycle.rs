// src/pipeline/cycle.rs

//! Scrape cycle pipeline.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::CycleStats;
use crate::services::LineupService;

/// Timing and counters of one pipeline run.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub stats: CycleStats,
}

impl CycleReport {
    /// Share of match pairs that produced a record.
    pub fn success_rate(&self) -> f64 {
        if self.stats.pair_total == 0 {
            return 1.0;
        }
        self.stats.match_count as f64 / self.stats.pair_total as f64
    }
}

/// Run one lineup cycle and log its summary.
pub async fn run_lineups(service: &LineupService) -> Result<CycleReport> {
    let start_time = Utc::now();
    log::info!("Lineup cycle starting...");

    let stats = service.fetch_lineups().await?;

    let report = CycleReport {
        start_time,
        end_time: Utc::now(),
        stats,
    };

    log::info!(
        "Matches: {}/{} ({:.0}%)",
        report.stats.match_count,
        report.stats.pair_total,
        report.success_rate() * 100.0
    );
    log::info!(
        "Squads: {} fetched, {} failed",
        report.stats.squad_total - report.stats.squad_failures,
        report.stats.squad_failures
    );
    if report.stats.only_flags > 0 {
        log::info!("Players without photo: {}", report.stats.only_flags);
    }
    log::info!(
        "Lineup cycle complete in {}s, {} players indexed",
        (report.end_time - report.start_time).num_seconds(),
        service.player_cache_count()
    );

    Ok(report)
}

/// Refresh all configured squads into the index.
pub async fn run_squads(service: &LineupService) -> Result<usize> {
    log::info!("Squad refresh starting...");
    let added = service.fetch_all_squads().await?;
    log::info!(
        "Squad refresh complete: {} new, {} indexed",
        added,
        service.player_cache_count()
    );
    Ok(added)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::Config;
    use crate::services::source::fake::MemorySource;
    use crate::storage::NoopStorage;

    #[test]
    fn test_success_rate() {
        let now = Utc::now();
        let report = CycleReport {
            start_time: now,
            end_time: now,
            stats: CycleStats {
                pair_total: 4,
                match_count: 3,
                ..CycleStats::default()
            },
        };
        assert!((report.success_rate() - 0.75).abs() < f64::EPSILON);

        let empty = CycleReport {
            stats: CycleStats::default(),
            ..report
        };
        assert!((empty.success_rate() - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_run_lineups_with_empty_overview() {
        let source = MemorySource::new().with_page(
            "https://www.ligainsider.de/bundesliga/spieltage/",
            "<html>Kein Spieltag</html>",
        );
        let service =
            LineupService::new(Arc::new(Config::default()), Arc::new(source), Arc::new(NoopStorage));

        let report = run_lineups(&service).await.unwrap();
        assert_eq!(report.stats.pair_total, 0);
        assert!(service.is_ready());
    }

    #[tokio::test]
    async fn test_run_lineups_propagates_overview_failure() {
        let service = LineupService::new(
            Arc::new(Config::default()),
            Arc::new(MemorySource::new()),
            Arc::new(NoopStorage),
        );
        assert!(run_lineups(&service).await.is_err());
    }
}
