use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{apply_status, check_integrity, Gateway, Result, StoreError};
use crate::model::{
    AccountId, EconomyState, PlayerData, RedemptionId, RedemptionRecord, RedemptionStatus,
    UpgradeState,
};

/// Gateway that keeps every account in process memory. Nothing survives a
/// restart; used for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryGateway {
    accounts: RwLock<HashMap<AccountId, PlayerData>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account with arbitrary state, replacing whatever was there.
    pub async fn insert(&self, data: PlayerData) {
        self.accounts.write().await.insert(data.account.clone(), data);
    }

    pub async fn get_stored(&self, account: &AccountId) -> Option<PlayerData> {
        self.accounts.read().await.get(account).cloned()
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    async fn with_account<T>(
        &self,
        account: &AccountId,
        f: impl FnOnce(&mut PlayerData) -> Result<T> + Send,
    ) -> Result<T> {
        let mut accounts = self.accounts.write().await;
        let data = accounts
            .get_mut(account)
            .ok_or_else(|| StoreError::AccountNotFound(account.clone()))?;
        f(data)
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn load_or_create(&self, account: &AccountId) -> Result<PlayerData> {
        let mut accounts = self.accounts.write().await;
        let data = accounts.entry(account.clone()).or_insert_with(|| {
            info!("Creating initial state for {}", account);
            PlayerData::new(account.clone())
        });
        check_integrity(data)?;
        Ok(data.clone())
    }

    async fn save_economy(&self, account: &AccountId, economy: &EconomyState) -> Result<()> {
        self.with_account(account, |data| {
            data.economy = *economy;
            Ok(())
        })
        .await
    }

    async fn save_upgrade(
        &self,
        account: &AccountId,
        economy: &EconomyState,
        upgrades: &UpgradeState,
    ) -> Result<()> {
        self.with_account(account, |data| {
            data.economy = *economy;
            data.upgrades = *upgrades;
            Ok(())
        })
        .await
    }

    async fn save_redemption(
        &self,
        account: &AccountId,
        economy: &EconomyState,
        record: &RedemptionRecord,
    ) -> Result<()> {
        self.with_account(account, |data| {
            data.economy = *economy;
            data.redemptions.push(record.clone());
            data.sort_redemptions();
            Ok(())
        })
        .await?;
        debug!("Stored redemption {} for {}", record.id, account);
        Ok(())
    }

    async fn redemptions(&self, account: &AccountId) -> Result<Vec<RedemptionRecord>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(account)
            .map(|d| d.redemptions.clone())
            .unwrap_or_default())
    }

    async fn update_redemption_status(
        &self,
        account: &AccountId,
        id: &RedemptionId,
        status: RedemptionStatus,
    ) -> Result<RedemptionRecord> {
        self.with_account(account, |data| {
            apply_status(account, &mut data.redemptions, id, status)
        })
        .await
    }
}
