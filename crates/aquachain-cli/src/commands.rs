use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use aquachain_telemetry::{
    run_analysis, submit_payment, BillBook, DistributionFeed, SensorFeed, SharedBillBook, INITIAL_MODEL_ACCURACY,
    PUBLIC_BILLING_STATS,
};
use aquachain_wallet::{FileStore, Identity, SessionStore};
use console::style;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tracing::{debug, info};

use crate::cli::{BillsCommand, Commands, SessionCommand};
use crate::dashboard::DashboardView;
use crate::settings::Settings;

/// One CLI invocation: settings plus the session store they point at.
pub struct App {
    settings: Settings,
    store: SessionStore<FileStore>,
    json: bool,
}

impl App {
    pub fn open(settings: Settings, json: bool) -> Self {
        let storage = FileStore::new(&settings.storage_path);
        let store = SessionStore::with_config(storage, settings.wallet.clone());
        debug!(path = %settings.storage_path.display(), role = %store.viewer_role(), "session opened");
        Self { settings, store, json }
    }

    pub fn store(&self) -> &SessionStore<FileStore> {
        &self.store
    }

    pub async fn run<W: Write>(&mut self, command: Commands, out: &mut W) -> Result<()> {
        match command {
            Commands::Session { action } => self.session(action, out),
            Commands::Dashboard { ticks } => self.dashboard(ticks, out).await,
            Commands::Bills { action } => match action {
                BillsCommand::List => self.list_bills(out),
                BillsCommand::Pay { bill_id } => self.pay_bill(&bill_id, out).await,
            },
            Commands::Insights => self.insights(out).await,
        }
    }

    fn session<W: Write>(&mut self, action: SessionCommand, out: &mut W) -> Result<()> {
        match action {
            SessionCommand::Status => {}
            SessionCommand::Users => return self.list_users(out),
            SessionCommand::Connect => {
                self.store.connect_default()?;
            }
            SessionCommand::Switch { id } => {
                self.store
                    .switch_identity(&id)
                    .with_context(|| format!("cannot switch to `{id}`"))?;
            }
            SessionCommand::Public => self.store.switch_to_public(),
            SessionCommand::Disconnect => self.store.disconnect(),
        }
        self.print_status(out)
    }

    fn print_status<W: Write>(&self, out: &mut W) -> Result<()> {
        let identity = self.store.active_identity().map(Arc::as_ref);
        if self.json {
            let status = json!({
                "connected": self.store.connected(),
                "role": self.store.viewer_role(),
                "identity": identity,
                "balance": self.store.balance(),
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&status)?)?;
            return Ok(());
        }
        match identity {
            Some(identity) => writeln!(
                out,
                "{} {} as {} ({}), balance {:.4} ETH",
                style("Connected").green().bold(),
                identity.display_name,
                self.store.viewer_role().label(),
                identity.short_address(),
                self.store.balance()
            )?,
            None => writeln!(out, "{} viewing as Public", style("Not connected").yellow())?,
        }
        Ok(())
    }

    fn list_users<W: Write>(&self, out: &mut W) -> Result<()> {
        let identities = self.store.all_identities();
        if self.json {
            let records: Vec<&Identity> = identities.iter().map(Arc::as_ref).collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
            return Ok(());
        }
        let active = self.store.active_identity().map(|i| i.id.as_str());
        for identity in identities {
            let marker = if Some(identity.id.as_str()) == active { "*" } else { " " };
            writeln!(
                out,
                "{marker} {:<10} {} {:<16} {:<6} {:<24} {}",
                identity.id,
                identity.avatar_glyph,
                identity.display_name,
                identity.role,
                identity.location_label,
                identity.short_address()
            )?;
        }
        Ok(())
    }

    fn bill_book(&self) -> BillBook {
        let identity = self.store.active_identity().map(Arc::as_ref);
        BillBook::for_viewer(
            self.store.viewer_role(),
            identity,
            self.store.roster(),
            &mut StdRng::from_entropy(),
        )
    }

    fn list_bills<W: Write>(&self, out: &mut W) -> Result<()> {
        let role = self.store.viewer_role();
        if role.is_public() {
            let stats = PUBLIC_BILLING_STATS;
            if self.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
            } else {
                writeln!(
                    out,
                    "Public tariff: {} ETH per litre, {}% paid on time, billing {}",
                    stats.rate_per_liter, stats.payment_rate, stats.availability
                )?;
            }
            return Ok(());
        }

        let book = self.bill_book();
        if self.json {
            let body = json!({ "bills": book.bills(), "payments": book.payments(), "summary": book.summary() });
            writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
            return Ok(());
        }
        for bill in book.bills() {
            writeln!(
                out,
                "{:<18} {:<16} {:<14} {:>7.0} L {:>8.4} ETH  due {}  {:?}",
                bill.id, bill.user_name, bill.month, bill.usage, bill.amount, bill.due_date, bill.status
            )?;
        }
        let summary = book.summary();
        writeln!(
            out,
            "Total {:.4} ETH, {} paid, {:.4} ETH pending",
            summary.total_amount, summary.paid, summary.pending_amount
        )?;
        Ok(())
    }

    async fn pay_bill<W: Write>(&self, bill_id: &str, out: &mut W) -> Result<()> {
        if self.store.viewer_role().is_public() {
            bail!("connect a wallet to pay bills");
        }
        let book: SharedBillBook = Arc::new(Mutex::new(self.bill_book()));
        writeln!(out, "Submitting payment for {bill_id}...")?;
        out.flush()?;

        let payment = submit_payment(book, bill_id, self.settings.payment_delay())
            .await
            .context("payment task failed")?;
        let Some(tx) = payment else {
            bail!("bill `{bill_id}` is unknown or already paid");
        };
        info!(bill = %bill_id, hash = %tx.hash, "payment confirmed");

        if self.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&tx)?)?;
        } else {
            writeln!(
                out,
                "{} {:.4} ETH, tx {} (gas {})",
                style("Paid").green().bold(),
                tx.amount,
                tx.hash,
                tx.gas_used
            )?;
        }
        Ok(())
    }

    async fn insights<W: Write>(&self, out: &mut W) -> Result<()> {
        if !self.store.viewer_role().is_admin() {
            bail!("AI analytics are restricted to administrators");
        }
        writeln!(out, "Running analysis...")?;
        out.flush()?;
        let report = run_analysis(self.settings.analysis_delay()).await;

        if self.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            return Ok(());
        }
        writeln!(out, "Model accuracy {:.1}%", report.model_accuracy)?;
        for insight in &report.insights {
            writeln!(
                out,
                "[{:?}/{:?}] {} ({}%, {})\n    {}",
                insight.kind, insight.impact, insight.title, insight.confidence, insight.location, insight.description
            )?;
        }
        Ok(())
    }

    async fn dashboard<W: Write>(&self, ticks: u32, out: &mut W) -> Result<()> {
        let feed_config = &self.settings.feed;
        let mut sensors = SensorFeed::start(feed_config);
        let mut zones = DistributionFeed::start(feed_config);
        let bills = self.bill_book();
        let identity: Option<Arc<Identity>> = self.store.active_identity().cloned();

        for tick in 0..ticks.max(1) {
            if tick > 0 {
                tokio::time::sleep(feed_config.sensor_interval()).await;
            }
            let view = DashboardView {
                role: self.store.viewer_role(),
                identity: identity.clone(),
                balance: self.store.balance(),
                readings: sensors.readings(),
                transactions: sensors.transactions(),
                network: sensors.network_stats(),
                zones: zones.zones(),
                grid: zones.totals(),
                bills: bills.clone(),
                model_accuracy: INITIAL_MODEL_ACCURACY,
            };
            if self.json {
                let body = json!({
                    "role": view.role,
                    "panels": view.panels().collect::<Vec<_>>(),
                    "sensors": view.readings,
                    "summary": sensors.summary(),
                    "transactions": view.transactions,
                });
                writeln!(out, "{}", serde_json::to_string(&body)?)?;
            } else {
                writeln!(out, "{view}")?;
            }
            out.flush()?;
        }

        sensors.stop().await;
        zones.stop().await;
        Ok(())
    }
}
