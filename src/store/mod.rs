//! Persistence gateway: where account state lives between sessions.
//!
//! The engine never talks to a store directly. Sessions read a snapshot
//! through [`Gateway::load_or_create`], run engine transitions against it and
//! write the outcome back with one of the `save_*` calls.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use tracing::warn;

use crate::game::upgrades::ladder_total;
use crate::model::{
    AccountId, EconomyState, PlayerData, RedemptionId, RedemptionRecord, RedemptionStatus,
    UpgradeState, BASE_COINS_PER_CLICK,
};

pub use file::FileGateway;
pub use memory::MemoryGateway;

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("save format version {found} is older than the oldest supported ({min_supported})")]
    IncompatibleVersion { found: u32, min_supported: u32 },

    #[error("stored state for {account} is inconsistent: {reason}")]
    Corrupt { account: AccountId, reason: String },

    #[error("no stored state for account {0}")]
    AccountNotFound(AccountId),

    #[error("no redemption {id} for account {account}")]
    RedemptionNotFound { account: AccountId, id: RedemptionId },

    #[error("redemption {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: RedemptionId,
        from: RedemptionStatus,
        to: RedemptionStatus,
    },

    /// For gateways implemented outside this crate whose failures fit none
    /// of the variants above.
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// Interface to the record store holding each player's economy.
///
/// Implementations do not serialize writers per account; callers that may
/// race on one account go through [`crate::service::AccountService`].
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Returns the account's state, creating defaults on first access.
    /// Redemptions come back newest first.
    async fn load_or_create(&self, account: &AccountId) -> Result<PlayerData>;

    /// Replaces the economy state (after clicks).
    async fn save_economy(&self, account: &AccountId, economy: &EconomyState) -> Result<()>;

    /// Replaces economy and upgrade state together (after an upgrade purchase).
    async fn save_upgrade(
        &self,
        account: &AccountId,
        economy: &EconomyState,
        upgrades: &UpgradeState,
    ) -> Result<()>;

    /// Stores a new redemption record along with the debited economy state.
    async fn save_redemption(
        &self,
        account: &AccountId,
        economy: &EconomyState,
        record: &RedemptionRecord,
    ) -> Result<()>;

    /// All redemption records of the account, newest first.
    async fn redemptions(&self, account: &AccountId) -> Result<Vec<RedemptionRecord>>;

    /// Settles a pending record. Used by the payout side only; the engine
    /// never calls this.
    async fn update_redemption_status(
        &self,
        account: &AccountId,
        id: &RedemptionId,
        status: RedemptionStatus,
    ) -> Result<RedemptionRecord>;
}

// ── Shared helpers ──────────────────────────────────────────────────

/// Rejects persisted state that no sequence of engine transitions could
/// have produced.
pub(crate) fn check_integrity(data: &PlayerData) -> Result<()> {
    let corrupt = |reason: String| {
        warn!("Refusing stored state for {}: {}", data.account, reason);
        Err(StoreError::Corrupt {
            account: data.account.clone(),
            reason,
        })
    };

    if data.economy.coins_per_click < BASE_COINS_PER_CLICK {
        return corrupt(format!(
            "coins_per_click {} is below the base of {}",
            data.economy.coins_per_click, BASE_COINS_PER_CLICK
        ));
    }

    let expected = ladder_total(data.upgrades.level);
    if expected != Some(data.upgrades.total_spent) {
        return corrupt(format!(
            "total_spent {} does not match level {}",
            data.upgrades.total_spent, data.upgrades.level
        ));
    }

    Ok(())
}

/// Moves one record to `status`, enforcing the pending -> settled rule.
pub(crate) fn apply_status(
    account: &AccountId,
    records: &mut [RedemptionRecord],
    id: &RedemptionId,
    status: RedemptionStatus,
) -> Result<RedemptionRecord> {
    let record = records
        .iter_mut()
        .find(|r| &r.id == id)
        .ok_or_else(|| StoreError::RedemptionNotFound {
            account: account.clone(),
            id: id.clone(),
        })?;

    if !record.status.can_transition_to(status) {
        return Err(StoreError::InvalidTransition {
            id: id.clone(),
            from: record.status,
            to: status,
        });
    }

    record.status = status;
    Ok(record.clone())
}
