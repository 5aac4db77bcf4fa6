use chrono::{DateTime, Utc};

use super::Rejection;
use crate::model::{Cash, EconomyState, RedemptionId, RedemptionRecord, RedemptionStatus};

// ── Tier table ──────────────────────────────────────────────────────

/// A fixed coins-for-cash offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionTier {
    pub coins_required: u64,
    pub cash: Cash,
    pub label: &'static str,
}

/// Every offer, cheapest first.
pub static REDEMPTION_TIERS: [RedemptionTier; 6] = [
    RedemptionTier {
        coins_required: 5_000,
        cash: Cash::from_dollars(1),
        label: "$1",
    },
    RedemptionTier {
        coins_required: 10_000,
        cash: Cash::from_dollars(5),
        label: "$5",
    },
    RedemptionTier {
        coins_required: 20_000,
        cash: Cash::from_dollars(10),
        label: "$10",
    },
    RedemptionTier {
        coins_required: 50_000,
        cash: Cash::from_dollars(20),
        label: "$20",
    },
    RedemptionTier {
        coins_required: 100_000,
        cash: Cash::from_dollars(50),
        label: "$50",
    },
    RedemptionTier {
        coins_required: 250_000,
        cash: Cash::from_dollars(100),
        label: "$100",
    },
];

/// Looks a tier up by its label. The leading `$` is optional.
pub fn tier_by_label(label: &str) -> Option<&'static RedemptionTier> {
    let wanted = label.trim().trim_start_matches('$');
    REDEMPTION_TIERS
        .iter()
        .find(|t| t.label.trim_start_matches('$') == wanted)
}

pub fn tier_by_index(index: usize) -> Option<&'static RedemptionTier> {
    REDEMPTION_TIERS.get(index)
}

/// Tiers the current balance covers, cheapest first.
pub fn affordable_tiers(economy: &EconomyState) -> impl Iterator<Item = &'static RedemptionTier> {
    let coins = economy.coins;
    REDEMPTION_TIERS
        .iter()
        .filter(move |t| coins >= t.coins_required)
}

// ── Email ───────────────────────────────────────────────────────────

/// Trims the payee email and applies the only check we make: it must
/// contain an `@`.
fn check_email(raw: &str) -> Result<&str, Rejection> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(Rejection::MissingEmail);
    }
    if !email.contains('@') {
        return Err(Rejection::InvalidEmail);
    }
    Ok(email)
}

// ── Redeem ──────────────────────────────────────────────────────────

/// Result of a successful redemption: the debited economy and the new
/// pending record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub economy: EconomyState,
    pub record: RedemptionRecord,
}

/// Converts coins into a pending cash payout for `tier`.
///
/// `now` becomes the record's creation time; the caller owns the clock.
///
/// # Errors
///
/// The email is checked first ([`Rejection::MissingEmail`],
/// [`Rejection::InvalidEmail`]), then the balance
/// ([`Rejection::InsufficientCoins`]). Nothing is created on rejection.
pub fn redeem(
    economy: &EconomyState,
    tier: &RedemptionTier,
    payee_email: &str,
    now: DateTime<Utc>,
) -> Result<Redemption, Rejection> {
    let email = check_email(payee_email)?;

    if economy.coins < tier.coins_required {
        return Err(Rejection::InsufficientCoins {
            required: tier.coins_required,
            available: economy.coins,
        });
    }

    let record = RedemptionRecord {
        id: RedemptionId::generate(),
        coins_spent: tier.coins_required,
        cash: tier.cash,
        payee_email: email.to_string(),
        status: RedemptionStatus::Pending,
        created_at: now,
    };

    Ok(Redemption {
        economy: EconomyState {
            coins: economy.coins - tier.coins_required,
            ..*economy
        },
        record,
    })
}
