//! MOCK DISTRIBUTION GRID
//!
//! Four supply zones whose flow and demand wander on a timer. Administrators
//! can pin a zone's flow by hand.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::mock::jitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZonePriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    Optimal,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub population: u32,
    /// Litres per minute.
    pub current_flow: f64,
    pub max_capacity: f64,
    pub demand: f64,
    pub priority: ZonePriority,
    pub status: ZoneStatus,
}

impl Zone {
    fn drift<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.current_flow = (self.current_flow + jitter(rng, 20.0)).clamp(0.0, self.max_capacity);
        self.demand = (self.demand + jitter(rng, 30.0)).max(0.0);
    }

    /// Percent of capacity in use.
    pub fn utilization(&self) -> f64 {
        if self.max_capacity <= 0.0 {
            0.0
        } else {
            self.current_flow / self.max_capacity * 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GridTotals {
    pub flow: f64,
    pub capacity: f64,
    pub demand: f64,
    pub population: u64,
    /// Flow as a percent of demand; 0 when nothing is demanded.
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionGrid {
    zones: Vec<Zone>,
    auto_mode: bool,
}

impl DistributionGrid {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones, auto_mode: true }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    pub fn set_auto_mode(&mut self, enabled: bool) {
        self.auto_mode = enabled;
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for zone in &mut self.zones {
            zone.drift(rng);
        }
    }

    /// Manual override, clamped to the zone's capacity. Returns false for an
    /// unknown zone.
    pub fn set_flow(&mut self, zone_id: &str, flow: f64) -> bool {
        match self.zones.iter_mut().find(|z| z.id == zone_id) {
            Some(zone) => {
                zone.current_flow = flow.clamp(0.0, zone.max_capacity);
                true
            }
            None => false,
        }
    }

    pub fn totals(&self) -> GridTotals {
        let flow: f64 = self.zones.iter().map(|z| z.current_flow).sum();
        let demand: f64 = self.zones.iter().map(|z| z.demand).sum();
        GridTotals {
            flow,
            capacity: self.zones.iter().map(|z| z.max_capacity).sum(),
            demand,
            population: self.zones.iter().map(|z| z.population as u64).sum(),
            efficiency: if demand > 0.0 { flow / demand * 100.0 } else { 0.0 },
        }
    }
}

impl Default for DistributionGrid {
    fn default() -> Self {
        let zone = |id: &str, name: &str, population, current_flow, max_capacity, demand, priority, status| Zone {
            id: id.to_string(),
            name: name.to_string(),
            population,
            current_flow,
            max_capacity,
            demand,
            priority,
            status,
        };
        Self::new(vec![
            zone("zone-1", "Residential District A", 15_000, 450.0, 600.0, 520.0, ZonePriority::High, ZoneStatus::Optimal),
            zone("zone-2", "Commercial Center", 8_000, 280.0, 400.0, 320.0, ZonePriority::Medium, ZoneStatus::Warning),
            zone("zone-3", "Industrial Zone", 3_000, 180.0, 300.0, 250.0, ZonePriority::Low, ZoneStatus::Critical),
            zone("zone-4", "Residential District B", 12_000, 380.0, 500.0, 420.0, ZonePriority::High, ZoneStatus::Optimal),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initial_totals() {
        let grid = DistributionGrid::default();
        let totals = grid.totals();
        assert_eq!(totals.flow, 1290.0);
        assert_eq!(totals.capacity, 1800.0);
        assert_eq!(totals.demand, 1510.0);
        assert_eq!(totals.population, 38_000);
        assert!((totals.efficiency - 1290.0 / 1510.0 * 100.0).abs() < 1e-9);
        assert!(grid.auto_mode());
    }

    #[test]
    fn test_tick_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(51);
        let mut grid = DistributionGrid::default();
        for _ in 0..1000 {
            grid.tick(&mut rng);
            for zone in grid.zones() {
                assert!(zone.current_flow >= 0.0 && zone.current_flow <= zone.max_capacity);
                assert!(zone.demand >= 0.0);
            }
        }
    }

    #[test]
    fn test_set_flow_clamps() {
        let mut grid = DistributionGrid::default();
        assert!(grid.set_flow("zone-3", 10_000.0));
        assert_eq!(grid.zones()[2].current_flow, 300.0);
        assert_eq!(grid.zones()[2].utilization(), 100.0);
        assert!(grid.set_flow("zone-3", -5.0));
        assert_eq!(grid.zones()[2].current_flow, 0.0);
        assert!(!grid.set_flow("zone-9", 1.0));
    }

    #[test]
    fn test_zero_demand_efficiency() {
        let grid = DistributionGrid::new(vec![]);
        assert_eq!(grid.totals(), GridTotals::default());
    }
}
