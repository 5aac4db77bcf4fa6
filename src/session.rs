use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error, info, warn};

use crate::game::{
    self, HistorySummary, Rejection, RedemptionTier, UpgradePurchase, UpgradeQuote,
};
use crate::model::{AccountId, EconomyState, PlayerData, RedemptionRecord, UpgradeState};
use crate::store::{Gateway, StoreError};

/// Who is playing. Built once the auth provider has identified the user and
/// handed to the loader when the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub account: AccountId,
}

impl SessionContext {
    pub fn new(account: AccountId) -> Self {
        Self { account }
    }
}

/// Failure of a player action: either the engine said no, or the store
/// did not confirm the write.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ActionError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ActionError::Rejected(r) => Some(r),
            ActionError::Store(_) => None,
        }
    }

    pub fn is_rejection(&self) -> bool {
        self.rejection().is_some()
    }
}

/// A loaded player plus the gateway to write through.
///
/// Every action runs the engine against the session's snapshot, writes the
/// result, and only adopts it once the gateway has confirmed. A failed write
/// leaves the snapshot as it was.
pub struct Session {
    context: SessionContext,
    gateway: Arc<dyn Gateway>,
    data: PlayerData,
    /// Held for the session's lifetime when opened through the account service.
    _lease: Option<OwnedMutexGuard<()>>,
}

/// Loads (or creates) the account named by `context` and starts a session.
///
/// This does not take the per-account lease; use
/// [`crate::service::AccountService::open_session`] when other writers may
/// touch the same account.
pub async fn load_session(
    gateway: Arc<dyn Gateway>,
    context: SessionContext,
) -> Result<Session, StoreError> {
    let data = gateway.load_or_create(&context.account).await.map_err(|e| {
        error!("Failed to load game data for {}: {}", context.account, e);
        e
    })?;

    info!(
        "Session started for {}: {} coins, {} per click, level {}, {} redemptions",
        context.account,
        data.economy.coins,
        data.economy.coins_per_click,
        data.upgrades.level,
        data.redemptions.len()
    );

    Ok(Session {
        context,
        gateway,
        data,
        _lease: None,
    })
}

impl Session {
    pub(crate) fn with_lease(mut self, lease: OwnedMutexGuard<()>) -> Self {
        self._lease = Some(lease);
        self
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn account(&self) -> &AccountId {
        &self.context.account
    }

    pub fn data(&self) -> &PlayerData {
        &self.data
    }

    pub fn economy(&self) -> &EconomyState {
        &self.data.economy
    }

    pub fn upgrades(&self) -> &UpgradeState {
        &self.data.upgrades
    }

    /// Newest first.
    pub fn redemptions(&self) -> &[RedemptionRecord] {
        &self.data.redemptions
    }

    pub fn upgrade_quote(&self) -> UpgradeQuote {
        game::upgrade_quote(&self.data.economy, &self.data.upgrades)
    }

    pub fn history(&self) -> HistorySummary {
        game::summarize(&self.data.redemptions)
    }

    // ── Actions ─────────────────────────────────────────────────────

    pub async fn click(&mut self) -> Result<EconomyState, StoreError> {
        self.click_many(1).await
    }

    /// Applies `count` clicks and persists them in one write.
    pub async fn click_many(&mut self, count: u64) -> Result<EconomyState, StoreError> {
        let next = game::register_clicks(&self.data.economy, count);
        self.gateway
            .save_economy(&self.context.account, &next)
            .await
            .map_err(|e| self.store_failed(e))?;

        debug!(
            "{} clicked x{}: {} coins, {} clicks",
            self.context.account, count, next.coins, next.total_clicks
        );
        self.data.economy = next;
        Ok(next)
    }

    pub async fn purchase_upgrade(&mut self) -> Result<UpgradePurchase, ActionError> {
        let bought = game::purchase_upgrade(&self.data.economy, &self.data.upgrades)
            .map_err(|r| self.rejected("upgrade", r))?;

        self.gateway
            .save_upgrade(&self.context.account, &bought.economy, &bought.upgrades)
            .await
            .map_err(|e| self.store_failed(e))?;

        info!(
            "{} bought upgrade level {} for {} coins (+{} per click)",
            self.context.account, bought.upgrades.level, bought.cost, bought.bonus
        );
        self.data.economy = bought.economy;
        self.data.upgrades = bought.upgrades;
        Ok(bought)
    }

    pub async fn redeem(
        &mut self,
        tier: &RedemptionTier,
        payee_email: &str,
    ) -> Result<RedemptionRecord, ActionError> {
        let done = game::redeem(&self.data.economy, tier, payee_email, Utc::now())
            .map_err(|r| self.rejected("redemption", r))?;

        self.gateway
            .save_redemption(&self.context.account, &done.economy, &done.record)
            .await
            .map_err(|e| self.store_failed(e))?;

        let record = done.record;
        info!(
            "{} redeemed {} coins for {} (redemption {}, pending)",
            self.context.account, record.coins_spent, record.cash, record.id
        );
        self.data.economy = done.economy;
        self.data.redemptions.insert(0, record.clone());
        Ok(record)
    }

    /// Re-reads the account, picking up status changes made by the payout side.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.data = self.gateway.load_or_create(&self.context.account).await?;
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn rejected(&self, action: &str, rejection: Rejection) -> Rejection {
        warn!("{} {} rejected: {}", self.context.account, action, rejection);
        rejection
    }

    fn store_failed(&self, e: StoreError) -> StoreError {
        error!("Failed to save game data for {}: {}", self.context.account, e);
        e
    }
}
