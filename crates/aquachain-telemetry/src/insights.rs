//! Canned "AI" insights. The analysis is a fixed delay followed by the same
//! four findings; only the reported model accuracy moves.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ANALYSIS_DELAY: Duration = Duration::from_secs(2);
pub const INITIAL_MODEL_ACCURACY: f64 = 94.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Prediction,
    Anomaly,
    Optimization,
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    /// Percent.
    pub confidence: u8,
    pub impact: Impact,
    pub location: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub insights: Vec<Insight>,
    pub model_accuracy: f64,
}

impl AnalysisReport {
    pub fn high_impact(&self) -> impl Iterator<Item = &Insight> {
        self.insights.iter().filter(|i| i.impact == Impact::High)
    }

    pub fn average_confidence(&self) -> f64 {
        if self.insights.is_empty() {
            return 0.0;
        }
        self.insights.iter().map(|i| i.confidence as f64).sum::<f64>() / self.insights.len() as f64
    }
}

const FINDINGS: [(InsightKind, &str, &str, u8, Impact, &str); 4] = [
    (
        InsightKind::Prediction,
        "Water Level Decline Predicted",
        "North Reservoir water level expected to drop by 15% in next 48 hours based on consumption patterns.",
        87,
        Impact::High,
        "North Reservoir",
    ),
    (
        InsightKind::Anomaly,
        "pH Level Anomaly Detected",
        "Unusual pH fluctuations detected in South Well. Recommend immediate inspection.",
        92,
        Impact::Medium,
        "South Well",
    ),
    (
        InsightKind::Optimization,
        "Distribution Optimization",
        "Redistributing 20% of flow from Central Treatment to East Distribution is expected to improve efficiency.",
        78,
        Impact::Medium,
        "Central Treatment",
    ),
    (
        InsightKind::Alert,
        "Quality Threshold Alert",
        "Water quality in East Distribution approaching minimum threshold. Immediate action required.",
        95,
        Impact::High,
        "East Distribution",
    ),
];

/// Produces the report immediately.
pub fn analyze<R: Rng + ?Sized>(rng: &mut R) -> AnalysisReport {
    let now = Utc::now();
    let insights = FINDINGS
        .iter()
        .enumerate()
        .map(|(i, (kind, title, description, confidence, impact, location))| Insight {
            id: (i + 1).to_string(),
            kind: *kind,
            title: title.to_string(),
            description: description.to_string(),
            confidence: *confidence,
            impact: *impact,
            location: location.to_string(),
            timestamp: now,
        })
        .collect();
    AnalysisReport {
        insights,
        model_accuracy: 93.5 + rng.gen::<f64>() * 2.0,
    }
}

/// The "Run New Analysis" button: sleeps `delay`, then analyzes.
pub async fn run_analysis(delay: Duration) -> AnalysisReport {
    tokio::time::sleep(delay).await;
    let mut rng = rand::thread_rng();
    analyze(&mut rng)
}
