//! Role-gated dashboard rendering.
//!
//! Which panels a viewer gets is decided in one place, [`Panel::access`];
//! the renderer only follows that answer.

use std::fmt;
use std::sync::Arc;

use aquachain_telemetry::{
    BillBook, ChainTransaction, GridTotals, NetworkStats, SensorReading, SensorSummary, TxStatus, Zone,
    PUBLIC_BILLING_STATS,
};
use aquachain_wallet::{Identity, ViewerRole};
use console::style;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Overview,
    Sensors,
    Blockchain,
    Analytics,
    Distribution,
    Billing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelAccess {
    Visible,
    /// Listed, but the body is replaced by a notice.
    Restricted,
    Hidden,
}

impl Panel {
    pub const ALL: [Panel; 6] = [
        Panel::Overview,
        Panel::Sensors,
        Panel::Blockchain,
        Panel::Analytics,
        Panel::Distribution,
        Panel::Billing,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Panel::Overview => "Public Overview",
            Panel::Sensors => "IoT Sensors",
            Panel::Blockchain => "Blockchain",
            Panel::Analytics => "AI Analytics",
            Panel::Distribution => "Distribution",
            Panel::Billing => "Billing",
        }
    }

    pub fn access(self, role: ViewerRole) -> PanelAccess {
        use PanelAccess::*;
        match (role, self) {
            (ViewerRole::Public, Panel::Overview | Panel::Billing) => Visible,
            (ViewerRole::Public, _) => Hidden,
            // Connected viewers get the tabs instead of the landing page.
            (_, Panel::Overview) => Hidden,
            (ViewerRole::User, Panel::Analytics | Panel::Distribution) => Restricted,
            (ViewerRole::User | ViewerRole::Admin, _) => Visible,
        }
    }
}

/// Everything one render needs, captured at a single instant.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub role: ViewerRole,
    pub identity: Option<Arc<Identity>>,
    pub balance: f64,
    pub readings: Vec<SensorReading>,
    pub transactions: Vec<ChainTransaction>,
    pub network: NetworkStats,
    pub zones: Vec<Zone>,
    pub grid: GridTotals,
    pub bills: BillBook,
    pub model_accuracy: f64,
}

impl DashboardView {
    pub fn panels(&self) -> impl Iterator<Item = (Panel, PanelAccess)> + '_ {
        Panel::ALL
            .into_iter()
            .map(|panel| (panel, panel.access(self.role)))
            .filter(|(_, access)| *access != PanelAccess::Hidden)
    }

    fn header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", style("AquaChain").cyan().bold())?;
        match &self.identity {
            Some(identity) => writeln!(
                f,
                "{} {} ({}) | {} | {:.4} ETH",
                identity.avatar_glyph,
                style(&identity.display_name).bold(),
                self.role.label(),
                identity.short_address(),
                self.balance
            )?,
            None => writeln!(f, "Viewing as {}", style(self.role.label()).dim())?,
        }

        let summary = SensorSummary::from_readings(&self.readings);
        writeln!(
            f,
            "Sensors {} | Reserves {:.0}% | Avg quality {:.1}% | Verified {:.0}%",
            summary.sensor_count,
            summary.total_reserves,
            summary.average_quality,
            summary.verified_percent()
        )
    }

    fn panel(&self, f: &mut fmt::Formatter<'_>, panel: Panel) -> fmt::Result {
        match panel {
            Panel::Overview => self.overview(f),
            Panel::Sensors => self.sensors(f),
            Panel::Blockchain => self.blockchain(f),
            Panel::Analytics => writeln!(f, "  Model accuracy {:.1}%", self.model_accuracy),
            Panel::Distribution => self.distribution(f),
            Panel::Billing => self.billing(f),
        }
    }

    fn overview(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Connect a wallet to see live sensors, the ledger and your bills.")?;
        let online = self.readings.iter().filter(|r| r.verified).count();
        writeln!(f, "  {} of {} monitoring stations verified on-chain", online, self.readings.len())
    }

    fn sensors(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.readings {
            let verified = if r.verified {
                style("verified").green()
            } else {
                style("unverified").yellow()
            };
            writeln!(
                f,
                "  {:<18} {:>5.1}% level  {:>5.1}% {:<9} {:>4.1}C  pH {:.2}  {} [{}]",
                r.location,
                r.water_level,
                r.quality,
                r.quality_status().label(),
                r.temperature,
                r.ph,
                verified,
                r.short_id()
            )?;
        }
        Ok(())
    }

    fn blockchain(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  Blocks {} | Transactions {} | Avg gas {:.0} | Health {:.1}%",
            self.network.total_blocks,
            self.network.total_transactions,
            self.network.average_gas,
            self.network.network_health
        )?;
        if self.transactions.is_empty() {
            return writeln!(f, "  No sensor data anchored yet");
        }
        for tx in self.transactions.iter().take(5) {
            let status = match tx.status {
                TxStatus::Confirmed => style("confirmed").green(),
                TxStatus::Pending => style("pending").yellow(),
                TxStatus::Failed => style("failed").red(),
            };
            writeln!(f, "  #{} {} {:<18} {}", tx.block_number, tx.hash.get(..10).unwrap_or(&tx.hash), tx.location, status)?;
        }
        Ok(())
    }

    fn distribution(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for zone in &self.zones {
            writeln!(
                f,
                "  {:<24} {:>6.0}/{:<4.0} L/min  demand {:>4.0}  ({:.0}%)",
                zone.name,
                zone.current_flow,
                zone.max_capacity,
                zone.demand,
                zone.utilization()
            )?;
        }
        writeln!(
            f,
            "  Total flow {:.0} L/min | Efficiency {:.1}% | Population {}",
            self.grid.flow, self.grid.efficiency, self.grid.population
        )
    }

    fn billing(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.role.is_public() {
            let stats = PUBLIC_BILLING_STATS;
            return writeln!(
                f,
                "  Rate {} ETH/L | On-time payments {}% | Billing {}",
                stats.rate_per_liter, stats.payment_rate, stats.availability
            );
        }
        for bill in self.bills.bills() {
            writeln!(
                f,
                "  {:<18} {:<20} {:<14} {:>8.4} ETH  {:?}",
                bill.id, bill.user_name, bill.month, bill.amount, bill.status
            )?;
        }
        let summary = self.bills.summary();
        writeln!(
            f,
            "  {} bills, {} paid, {:.4} ETH outstanding",
            self.bills.bills().len(),
            summary.paid,
            summary.pending_amount
        )
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.header(f)?;
        for (panel, access) in self.panels() {
            writeln!(f)?;
            writeln!(f, "{}", style(panel.title()).bold().underlined())?;
            match access {
                PanelAccess::Visible => self.panel(f, panel)?,
                PanelAccess::Restricted => {
                    writeln!(f, "  {}", style(format!("{} restricted to administrators", panel.title())).dim())?
                }
                PanelAccess::Hidden => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquachain_telemetry::DistributionGrid;
    use aquachain_wallet::Roster;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn view(role: ViewerRole, identity: Option<Arc<Identity>>) -> DashboardView {
        let roster = Roster::builtin();
        let mut rng = StdRng::seed_from_u64(71);
        let readings: Vec<_> = (0..4).map(|_| SensorReading::generate(&mut rng)).collect();
        let grid = DistributionGrid::default();
        DashboardView {
            role,
            bills: BillBook::for_viewer(role, identity.as_deref(), &roster, &mut rng),
            identity,
            balance: 5.0,
            readings,
            transactions: Vec::new(),
            network: NetworkStats::default(),
            zones: grid.zones().to_vec(),
            grid: grid.totals(),
            model_accuracy: 94.2,
        }
    }

    #[test]
    fn test_access_matrix() {
        use PanelAccess::*;
        let expected = [
            (ViewerRole::Public, [Visible, Hidden, Hidden, Hidden, Hidden, Visible]),
            (ViewerRole::User, [Hidden, Visible, Visible, Restricted, Restricted, Visible]),
            (ViewerRole::Admin, [Hidden, Visible, Visible, Visible, Visible, Visible]),
        ];
        for (role, row) in expected {
            for (panel, access) in Panel::ALL.into_iter().zip(row) {
                assert_eq!(panel.access(role), access, "{role} / {panel:?}");
            }
        }
    }

    #[test]
    fn test_public_render() {
        console::set_colors_enabled(false);
        let out = view(ViewerRole::Public, None).to_string();
        assert!(out.contains("Viewing as Public"));
        assert!(out.contains("Public Overview"));
        assert!(out.contains("Rate 0.003 ETH/L"));
        assert!(!out.contains("IoT Sensors"));
        assert!(!out.contains("AI Analytics"));
    }

    #[test]
    fn test_resident_render_restricts_admin_panels() {
        console::set_colors_enabled(false);
        let roster = Roster::builtin();
        let john = Arc::clone(roster.find("user-001").unwrap());
        let out = view(ViewerRole::User, Some(john)).to_string();
        assert!(out.contains("John Smith (User)"));
        assert!(out.contains("AI Analytics restricted to administrators"));
        assert!(out.contains("Distribution restricted to administrators"));
        assert!(out.contains("bill-user-001-001"));
        assert!(out.contains("No sensor data anchored yet"));
        assert!(!out.contains("Public Overview"));
    }

    #[test]
    fn test_admin_render_shows_everything() {
        console::set_colors_enabled(false);
        let roster = Roster::builtin();
        let admin = Arc::clone(roster.admin());
        let view = view(ViewerRole::Admin, Some(admin));
        assert_eq!(view.panels().count(), 5);

        let out = view.to_string();
        assert!(out.contains("Administrator"));
        assert!(out.contains("Model accuracy 94.2%"));
        assert!(out.contains("Residential District A"));
        assert!(out.contains("30 bills"));
        assert!(!out.contains("restricted"));
    }
}
