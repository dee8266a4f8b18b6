//! Live feeds: shared state plus the periodic task that mutates it.
//!
//! Readers take a cheap snapshot through the read lock. Dropping a feed stops
//! its timer.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::distribution::{DistributionGrid, GridTotals, Zone};
use crate::ledger::{ChainTransaction, Ledger, NetworkStats, DEFAULT_LEDGER_CAPACITY};
use crate::sensor::{SensorReading, SensorSummary};
use crate::ticker::PeriodicTask;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub sensor_count: usize,
    pub sensor_interval_ms: u64,
    pub distribution_interval_ms: u64,
    pub ledger_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sensor_count: 4,
            sensor_interval_ms: 3_000,
            distribution_interval_ms: 5_000,
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
        }
    }
}

impl FeedConfig {
    pub fn sensor_interval(&self) -> Duration {
        Duration::from_millis(self.sensor_interval_ms)
    }

    pub fn distribution_interval(&self) -> Duration {
        Duration::from_millis(self.distribution_interval_ms)
    }
}

/// Sensor readings and the ledger that anchors them.
pub struct SensorFeed {
    readings: Arc<RwLock<Vec<SensorReading>>>,
    ledger: Arc<RwLock<Ledger>>,
    task: Option<PeriodicTask>,
}

impl SensorFeed {
    /// Generates the initial readings without starting the timer.
    pub fn new<R: Rng + ?Sized>(config: &FeedConfig, rng: &mut R) -> Self {
        let readings: Vec<_> = (0..config.sensor_count)
            .map(|_| SensorReading::generate(rng))
            .collect();
        Self {
            readings: Arc::new(RwLock::new(readings)),
            ledger: Arc::new(RwLock::new(Ledger::new(config.ledger_capacity))),
            task: None,
        }
    }

    /// Generates readings and starts drifting them every sensor interval.
    pub fn start(config: &FeedConfig) -> Self {
        Self::start_with_rng(config, StdRng::from_entropy())
    }

    pub fn start_with_rng(config: &FeedConfig, mut rng: StdRng) -> Self {
        let mut feed = Self::new(config, &mut rng);
        let readings = Arc::clone(&feed.readings);
        let ledger = Arc::clone(&feed.ledger);
        feed.task = Some(PeriodicTask::spawn("sensor-feed", config.sensor_interval(), move || {
            let batch = {
                let mut readings = readings.write();
                for reading in readings.iter_mut() {
                    reading.drift(&mut rng);
                }
                readings.clone()
            };
            ledger.write().record(&batch, &mut rng);
            debug!(sensors = batch.len(), "sensor readings updated");
        }));
        info!(sensors = config.sensor_count, interval_ms = config.sensor_interval_ms, "sensor feed started");
        feed
    }

    pub fn readings(&self) -> Vec<SensorReading> {
        self.readings.read().clone()
    }

    pub fn summary(&self) -> SensorSummary {
        SensorSummary::from_readings(&self.readings.read())
    }

    pub fn transactions(&self) -> Vec<ChainTransaction> {
        self.ledger.read().snapshot()
    }

    pub fn network_stats(&self) -> NetworkStats {
        self.ledger.read().stats()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(PeriodicTask::is_running)
    }

    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.stop().await;
            info!("sensor feed stopped");
        }
    }
}

/// Distribution zones drifting on their own timer while auto mode is on.
pub struct DistributionFeed {
    grid: Arc<RwLock<DistributionGrid>>,
    task: Option<PeriodicTask>,
}

impl DistributionFeed {
    pub fn new(grid: DistributionGrid) -> Self {
        Self {
            grid: Arc::new(RwLock::new(grid)),
            task: None,
        }
    }

    pub fn start(config: &FeedConfig) -> Self {
        Self::start_with_rng(config, StdRng::from_entropy())
    }

    pub fn start_with_rng(config: &FeedConfig, mut rng: StdRng) -> Self {
        let mut feed = Self::new(DistributionGrid::default());
        let grid = Arc::clone(&feed.grid);
        feed.task = Some(PeriodicTask::spawn(
            "distribution-feed",
            config.distribution_interval(),
            move || {
                let mut grid = grid.write();
                if grid.auto_mode() {
                    grid.tick(&mut rng);
                }
            },
        ));
        info!(interval_ms = config.distribution_interval_ms, "distribution feed started");
        feed
    }

    pub fn zones(&self) -> Vec<Zone> {
        self.grid.read().zones().to_vec()
    }

    pub fn totals(&self) -> GridTotals {
        self.grid.read().totals()
    }

    pub fn set_auto_mode(&self, enabled: bool) {
        self.grid.write().set_auto_mode(enabled);
    }

    pub fn set_flow(&self, zone_id: &str, flow: f64) -> bool {
        self.grid.write().set_flow(zone_id, flow)
    }

    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.stop().await;
            info!("distribution feed stopped");
        }
    }
}
