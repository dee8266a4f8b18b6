//! MOCK WATER BILLING
//!
//! Bills are regenerated whenever the viewer changes. Administrators see every
//! resident's bills, residents see their own, the public sees only the
//! published tariff figures.

use std::sync::Arc;
use std::time::Duration;

use aquachain_wallet::{Identity, Roster, Session, ViewerRole};
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::ledger::{TxStatus, BASE_BLOCK_HEIGHT, BASE_GAS};
use crate::mock::{random_hash, random_id};

/// ETH per litre.
pub const RATE_PER_LITER: f64 = 0.003;
/// Billing month and due date, newest first.
pub const BILLING_PERIODS: [(&str, &str); 3] = [
    ("December 2024", "2024-12-31"),
    ("November 2024", "2024-11-30"),
    ("October 2024", "2024-10-31"),
];
/// Chance that an older bill is still open.
pub const PENDING_PROBABILITY: f64 = 0.3;
/// Simulated confirmation time for a payment.
pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Paid,
    Pending,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterBill {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub month: String,
    /// Litres.
    pub usage: f64,
    pub rate: f64,
    pub amount: f64,
    pub due_date: String,
    pub status: BillStatus,
    pub transaction_hash: Option<String>,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTransaction {
    pub id: String,
    pub bill_id: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub hash: String,
    pub status: TxStatus,
    pub gas_used: u64,
}

/// Figures published to viewers who are not connected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PublicBillingStats {
    pub rate_per_liter: f64,
    /// Percent of bills paid on time.
    pub payment_rate: f64,
    pub availability: &'static str,
}

pub const PUBLIC_BILLING_STATS: PublicBillingStats = PublicBillingStats {
    rate_per_liter: RATE_PER_LITER,
    payment_rate: 98.5,
    availability: "24/7",
};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BillingSummary {
    pub total_usage: f64,
    pub total_amount: f64,
    pub paid: usize,
    pub pending_amount: f64,
}

#[derive(Debug, Clone, Default)]
pub struct BillBook {
    bills: Vec<WaterBill>,
    payments: Vec<PaymentTransaction>,
}

pub type SharedBillBook = Arc<Mutex<BillBook>>;

impl BillBook {
    /// Bills visible to `role`. A resident role without an identity sees
    /// nothing, same as the public.
    pub fn for_viewer<R: Rng + ?Sized>(
        role: ViewerRole,
        identity: Option<&Identity>,
        roster: &Roster,
        rng: &mut R,
    ) -> Self {
        let bills = match (role, identity) {
            (ViewerRole::Admin, _) => roster
                .residents()
                .flat_map(|resident| bills_for(resident, false, rng))
                .collect(),
            (ViewerRole::User, Some(identity)) => bills_for(identity, true, rng),
            _ => Vec::new(),
        };
        debug!(%role, bills = bills.len(), "bill book generated");
        Self {
            bills,
            payments: seeded_payments(),
        }
    }

    pub fn bills(&self) -> &[WaterBill] {
        &self.bills
    }

    /// Newest first.
    pub fn payments(&self) -> &[PaymentTransaction] {
        &self.payments
    }

    pub fn find(&self, bill_id: &str) -> Option<&WaterBill> {
        self.bills.iter().find(|b| b.id == bill_id)
    }

    pub fn summary(&self) -> BillingSummary {
        BillingSummary {
            total_usage: self.bills.iter().map(|b| b.usage).sum(),
            total_amount: self.bills.iter().map(|b| b.amount).sum(),
            paid: self.bills.iter().filter(|b| b.status == BillStatus::Paid).count(),
            pending_amount: self
                .bills
                .iter()
                .filter(|b| b.status == BillStatus::Pending)
                .map(|b| b.amount)
                .sum(),
        }
    }

    /// Settles an open bill immediately. Unknown or already-paid bills are
    /// ignored.
    pub fn pay<R: Rng + ?Sized>(&mut self, bill_id: &str, rng: &mut R) -> Option<PaymentTransaction> {
        let bill = self
            .bills
            .iter_mut()
            .find(|b| b.id == bill_id && b.status != BillStatus::Paid)?;

        let payment = PaymentTransaction {
            id: random_id("tx", rng),
            bill_id: bill.id.clone(),
            amount: bill.amount,
            timestamp: Utc::now(),
            hash: random_hash(rng),
            status: TxStatus::Confirmed,
            gas_used: BASE_GAS + rng.gen_range(0..10_000),
        };
        bill.status = BillStatus::Paid;
        bill.transaction_hash = Some(payment.hash.clone());
        bill.block_number = Some(BASE_BLOCK_HEIGHT + rng.gen_range(0..1000));

        self.payments.insert(0, payment.clone());
        Some(payment)
    }
}

/// Fire-and-forget payment: waits `delay`, then settles the bill.
///
/// There is no cancellation and no retry; the handle only reports what
/// happened.
pub fn submit_payment(
    book: SharedBillBook,
    bill_id: impl Into<String>,
    delay: Duration,
) -> JoinHandle<Option<PaymentTransaction>> {
    let bill_id = bill_id.into();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let mut rng = StdRng::from_entropy();
        let payment = book.lock().pay(&bill_id, &mut rng);
        match &payment {
            Some(tx) => info!(bill = %bill_id, hash = %tx.hash, amount = tx.amount, "bill paid"),
            None => debug!(bill = %bill_id, "payment ignored, bill unknown or already paid"),
        }
        payment
    })
}

/// Keeps a bill book in step with a session: every announced change
/// regenerates it for the new viewer. The task ends when the session store
/// is dropped.
pub fn follow_session(
    mut updates: watch::Receiver<Session>,
    roster: Arc<Roster>,
) -> (SharedBillBook, JoinHandle<()>) {
    let initial = updates.borrow_and_update().clone();
    let book = Arc::new(Mutex::new(book_for_session(&initial, &roster)));
    let shared = Arc::clone(&book);
    let handle = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let session = updates.borrow_and_update().clone();
            *shared.lock() = book_for_session(&session, &roster);
        }
        debug!("session closed, bill follower stopped");
    });
    (book, handle)
}

fn book_for_session(session: &Session, roster: &Roster) -> BillBook {
    BillBook::for_viewer(
        session.viewer_role(),
        session.active_identity().map(Arc::as_ref),
        roster,
        &mut StdRng::from_entropy(),
    )
}

fn bills_for<R: Rng + ?Sized>(identity: &Identity, own_view: bool, rng: &mut R) -> Vec<WaterBill> {
    BILLING_PERIODS
        .iter()
        .enumerate()
        .map(|(i, (month, due))| {
            // A resident's current month is always open.
            let pending = (own_view && i == 0) || rng.gen_bool(PENDING_PROBABILITY);
            WaterBill {
                id: format!("bill-{}-{:03}", identity.id, i + 1),
                user_id: identity.id.clone(),
                user_name: identity.display_name.clone(),
                month: month.to_string(),
                usage: identity.monthly_usage,
                rate: RATE_PER_LITER,
                amount: identity.monthly_usage * RATE_PER_LITER,
                due_date: due.to_string(),
                status: if pending { BillStatus::Pending } else { BillStatus::Paid },
                transaction_hash: None,
                block_number: None,
            }
        })
        .collect()
}

fn seeded_payments() -> Vec<PaymentTransaction> {
    let at = |y, mo, d, h, mi| Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).single().unwrap_or_default();
    vec![
        PaymentTransaction {
            id: "tx-001".into(),
            bill_id: "bill-002".into(),
            amount: 3.54,
            timestamp: at(2024, 11, 25, 10, 30),
            hash: "0x1234567890abcdef".into(),
            status: TxStatus::Confirmed,
            gas_used: BASE_GAS,
        },
        PaymentTransaction {
            id: "tx-002".into(),
            bill_id: "bill-003".into(),
            amount: 3.96,
            timestamp: at(2024, 10, 28, 14, 15),
            hash: "0xabcdef1234567890".into(),
            status: TxStatus::Confirmed,
            gas_used: BASE_GAS,
        },
    ]
}
