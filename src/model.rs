use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ── Core constants ─────────────────────────────────────────────────

/// Per-click yield of a freshly created account. Upgrades only ever add to it.
pub const BASE_COINS_PER_CLICK: u64 = 100;

// ── Account identity ───────────────────────────────────────────────

/// Opaque player identity handed to us by the auth provider.
///
/// Restricted to `[A-Za-z0-9_-]{1,128}` so it can double as a storage key
/// and a file name without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid account id {0:?}: expected 1-128 characters of [A-Za-z0-9_-]")]
pub struct InvalidAccountId(pub String);

impl AccountId {
    pub const MAX_LEN: usize = 128;

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = InvalidAccountId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.len() <= Self::MAX_LEN
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidAccountId(s.to_string()))
        }
    }
}

impl TryFrom<String> for AccountId {
    type Error = InvalidAccountId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Economy ────────────────────────────────────────────────────────

/// Coin balance and click yield of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyState {
    pub coins: u64,
    pub coins_per_click: u64,
    pub total_clicks: u64,
}

impl Default for EconomyState {
    fn default() -> Self {
        Self {
            coins: 0,
            coins_per_click: BASE_COINS_PER_CLICK,
            total_clicks: 0,
        }
    }
}

/// Upgrade ladder progress of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpgradeState {
    pub level: u64,
    pub total_spent: u64,
}

// ── Cash ───────────────────────────────────────────────────────────

/// A real-world cash amount, kept in whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cash(u64);

impl Cash {
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn from_dollars(dollars: u64) -> Self {
        Self(dollars * 100)
    }

    pub fn cents(self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, other: Cash) -> Cash {
        Cash(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Cash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ── Redemptions ────────────────────────────────────────────────────

/// Identifier of a redemption record: 16 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedemptionId(String);

impl RedemptionId {
    pub fn generate() -> Self {
        let raw: u64 = rand::thread_rng().gen();
        Self(format!("{:016x}", raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RedemptionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RedemptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    Pending,
    Completed,
    Failed,
}

impl RedemptionStatus {
    /// Only the payout side moves a record, and only out of `Pending`.
    pub fn can_transition_to(self, next: RedemptionStatus) -> bool {
        matches!(
            (self, next),
            (RedemptionStatus::Pending, RedemptionStatus::Completed)
                | (RedemptionStatus::Pending, RedemptionStatus::Failed)
        )
    }

    pub fn is_settled(self) -> bool {
        self != RedemptionStatus::Pending
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Completed => "completed",
            RedemptionStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One coins-for-cash request. Immutable after creation apart from `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRecord {
    pub id: RedemptionId,
    pub coins_spent: u64,
    #[serde(rename = "cash_cents")]
    pub cash: Cash,
    pub payee_email: String,
    pub status: RedemptionStatus,
    pub created_at: DateTime<Utc>,
}

// ── Player snapshot ────────────────────────────────────────────────

/// Everything the gateway knows about one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerData {
    pub account: AccountId,
    pub economy: EconomyState,
    pub upgrades: UpgradeState,
    /// Newest first.
    pub redemptions: Vec<RedemptionRecord>,
}

impl PlayerData {
    /// Defaults for an account seen for the first time.
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            economy: EconomyState::default(),
            upgrades: UpgradeState::default(),
            redemptions: Vec::new(),
        }
    }

    /// Restores newest-first ordering after records were appended.
    pub fn sort_redemptions(&mut self) {
        self.redemptions
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}
