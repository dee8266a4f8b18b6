//! SIMULATED IoT SENSORS
//!
//! Readings are generated once at mount and then drift on every tick. Every
//! bound below is a clamp, never a rejection.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::mock::{jitter, random_hash, random_id};

pub const SENSOR_LOCATIONS: [&str; 4] = [
    "North Reservoir",
    "South Well",
    "Central Treatment",
    "East Distribution",
];

/// Probability that a freshly generated sensor is verified on-chain.
pub const VERIFIED_PROBABILITY: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub id: String,
    pub location: String,
    /// Percent, 0-100.
    pub water_level: f64,
    /// Percent, 0-100.
    pub quality: f64,
    /// Celsius, 0-40.
    pub temperature: f64,
    pub ph: f64,
    /// NTU.
    pub turbidity: f64,
    pub timestamp: DateTime<Utc>,
    pub block_hash: String,
    pub verified: bool,
}

impl SensorReading {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        SensorReading {
            id: random_id("sensor", rng),
            location: SENSOR_LOCATIONS[rng.gen_range(0..SENSOR_LOCATIONS.len())].to_string(),
            water_level: rng.gen_range(0..100) as f64,
            quality: rng.gen_range(0..100) as f64,
            temperature: 15.0 + rng.gen::<f64>() * 20.0,
            ph: 6.5 + rng.gen::<f64>() * 2.0,
            turbidity: rng.gen::<f64>() * 10.0,
            timestamp: Utc::now(),
            block_hash: random_hash(rng),
            verified: rng.gen_bool(VERIFIED_PROBABILITY),
        }
    }

    /// One tick of drift. pH, turbidity and verification are left alone.
    pub fn drift<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.water_level = (self.water_level + jitter(rng, 10.0)).clamp(0.0, 100.0);
        self.quality = (self.quality + jitter(rng, 5.0)).clamp(0.0, 100.0);
        self.temperature = (self.temperature + jitter(rng, 2.0)).clamp(0.0, 40.0);
        self.timestamp = Utc::now();
        self.block_hash = random_hash(rng);
    }

    pub fn quality_status(&self) -> QualityStatus {
        QualityStatus::classify(self.quality)
    }

    /// Last eight characters of the id, as shown on the sensor card.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().rev().nth(7) {
            Some((start, _)) => &self.id[start..],
            None => &self.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityStatus {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityStatus {
    pub fn classify(quality: f64) -> Self {
        if quality >= 80.0 {
            QualityStatus::Excellent
        } else if quality >= 60.0 {
            QualityStatus::Good
        } else if quality >= 40.0 {
            QualityStatus::Fair
        } else {
            QualityStatus::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityStatus::Excellent => "Excellent",
            QualityStatus::Good => "Good",
            QualityStatus::Fair => "Fair",
            QualityStatus::Poor => "Poor",
        }
    }
}

/// Headline numbers shown above the tabs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorSummary {
    pub sensor_count: usize,
    /// Sum of water levels across sensors.
    pub total_reserves: f64,
    pub average_quality: f64,
    pub verified: usize,
}

impl SensorSummary {
    pub fn from_readings(readings: &[SensorReading]) -> Self {
        if readings.is_empty() {
            return SensorSummary::default();
        }
        let total_quality: f64 = readings.iter().map(|r| r.quality).sum();
        SensorSummary {
            sensor_count: readings.len(),
            total_reserves: readings.iter().map(|r| r.water_level).sum(),
            average_quality: total_quality / readings.len() as f64,
            verified: readings.iter().filter(|r| r.verified).count(),
        }
    }

    /// Verified share in percent; 0 with no sensors.
    pub fn verified_percent(&self) -> f64 {
        if self.sensor_count == 0 {
            0.0
        } else {
            self.verified as f64 / self.sensor_count as f64 * 100.0
        }
    }
}
