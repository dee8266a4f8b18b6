//! MOCK SENSOR-DATA LEDGER
//!
//! Every sensor update is "anchored" as one transaction per reading. Nothing
//! is validated; the numbers only have to look like a busy chain.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::mock::{random_hash, random_id};
use crate::sensor::SensorReading;

/// Transactions kept for display.
pub const DEFAULT_LEDGER_CAPACITY: usize = 20;
pub const BASE_BLOCK_HEIGHT: u64 = 1_000_000;
pub const BASE_GAS: u64 = 21_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Confirmed,
    Pending,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTransaction {
    pub id: String,
    pub block_number: u64,
    pub hash: String,
    pub sensor_id: String,
    pub location: String,
    pub data_hash: String,
    pub timestamp: DateTime<Utc>,
    pub gas_used: u64,
    pub status: TxStatus,
    pub validator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub total_blocks: u64,
    pub total_transactions: u64,
    pub average_gas: f64,
    /// Percent.
    pub network_health: f64,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    capacity: usize,
    transactions: VecDeque<ChainTransaction>,
    stats: NetworkStats,
}

impl Ledger {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            transactions: VecDeque::new(),
            stats: NetworkStats::default(),
        }
    }

    /// Anchors one batch of readings. Newest transactions come first; the
    /// oldest fall off past capacity.
    pub fn record<R: Rng + ?Sized>(&mut self, readings: &[SensorReading], rng: &mut R) {
        let batch: Vec<ChainTransaction> = readings
            .iter()
            .enumerate()
            .map(|(index, reading)| anchor(index, reading, rng))
            .collect();

        let average_gas = if batch.is_empty() {
            0.0
        } else {
            batch.iter().map(|tx| tx.gas_used as f64).sum::<f64>() / batch.len() as f64
        };
        self.stats = NetworkStats {
            total_blocks: BASE_BLOCK_HEIGHT + rng.gen_range(0..1000),
            total_transactions: batch.len() as u64 + rng.gen_range(0..1000),
            average_gas,
            network_health: 95.0 + rng.gen::<f64>() * 5.0,
        };

        for tx in batch.into_iter().rev() {
            self.transactions.push_front(tx);
        }
        self.transactions.truncate(self.capacity);
    }

    pub fn transactions(&self) -> impl Iterator<Item = &ChainTransaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn stats(&self) -> NetworkStats {
        self.stats
    }

    pub fn snapshot(&self) -> Vec<ChainTransaction> {
        self.transactions.iter().cloned().collect()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_CAPACITY)
    }
}

fn anchor<R: Rng + ?Sized>(index: usize, reading: &SensorReading, rng: &mut R) -> ChainTransaction {
    let status = if reading.verified || !rng.gen_bool(0.2) {
        TxStatus::Confirmed
    } else {
        TxStatus::Pending
    };
    ChainTransaction {
        id: random_id("tx", rng),
        block_number: BASE_BLOCK_HEIGHT + index as u64 + rng.gen_range(0..1000),
        hash: reading.block_hash.clone(),
        sensor_id: reading.id.clone(),
        location: reading.location.clone(),
        data_hash: random_hash(rng),
        timestamp: reading.timestamp,
        gas_used: BASE_GAS + rng.gen_range(0..50_000),
        status,
        validator: format!("Validator-{}", rng.gen_range(1..=10)),
    }
}
