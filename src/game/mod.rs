//! The economy engine: pure state transitions over values supplied by the
//! caller. Nothing in here performs I/O, reads the clock or keeps state.

pub mod clicks;
pub mod history;
pub mod redemption;
pub mod upgrades;

pub use clicks::{register_click, register_clicks};
pub use history::{summarize, HistorySummary};
pub use redemption::{redeem, Redemption, RedemptionTier, REDEMPTION_TIERS};
pub use upgrades::{purchase_upgrade, upgrade_quote, UpgradePurchase, UpgradeQuote};

/// Why the engine refused a transition. These are ordinary outcomes, not
/// faults; the `Display` text is meant to be shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("not enough coins (need {required}, have {available})")]
    InsufficientCoins { required: u64, available: u64 },

    #[error("please enter your payout email address")]
    MissingEmail,

    #[error("please enter a valid email address")]
    InvalidEmail,
}
