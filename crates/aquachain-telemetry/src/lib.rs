//! Simulated telemetry behind the AquaChain dashboard: IoT sensors, the
//! sensor-data ledger, billing, distribution zones and AI insights.
//!
//! Everything here is mock data. Timers run on tokio and stop when their
//! feed is dropped.

pub mod billing;
pub mod distribution;
pub mod feed;
pub mod insights;
pub mod ledger;
pub mod mock;
pub mod sensor;
pub mod ticker;

pub use billing::{
    follow_session, submit_payment, BillBook, BillStatus, BillingSummary, PaymentTransaction, PublicBillingStats, SharedBillBook,
    WaterBill, DEFAULT_PAYMENT_DELAY, PUBLIC_BILLING_STATS, RATE_PER_LITER,
};
pub use distribution::{DistributionGrid, GridTotals, Zone, ZonePriority, ZoneStatus};
pub use feed::{DistributionFeed, FeedConfig, SensorFeed};
pub use insights::{
    analyze, run_analysis, AnalysisReport, Impact, Insight, InsightKind, DEFAULT_ANALYSIS_DELAY,
    INITIAL_MODEL_ACCURACY,
};
pub use ledger::{ChainTransaction, Ledger, NetworkStats, TxStatus};
pub use sensor::{QualityStatus, SensorReading, SensorSummary};
pub use ticker::PeriodicTask;
