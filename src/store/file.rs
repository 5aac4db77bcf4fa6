//! JSON-file gateway: one document per account under a data directory.
//!
//! ## Format versioning
//!
//! - `SAVE_VERSION`: version written by this build. Bump it when fields are
//!   added.
//! - `MIN_COMPATIBLE_VERSION`: oldest version we can still read. Only raise it
//!   when a field changes meaning or disappears. Files below it are refused
//!   rather than silently reset, since they hold a player's coin balance.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{apply_status, check_integrity, Gateway, Result, StoreError};
use crate::model::{
    AccountId, EconomyState, PlayerData, RedemptionId, RedemptionRecord, RedemptionStatus,
    UpgradeState,
};

const SAVE_VERSION: u32 = 1;

const MIN_COMPATIBLE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    account: AccountId,
    economy: EconomyState,
    #[serde(default)]
    upgrades: UpgradeState,
    #[serde(default)]
    redemptions: Vec<RedemptionRecord>,
}

impl SaveFile {
    fn from_data(data: &PlayerData) -> Self {
        Self {
            version: SAVE_VERSION,
            account: data.account.clone(),
            economy: data.economy,
            upgrades: data.upgrades,
            redemptions: data.redemptions.clone(),
        }
    }

    fn into_data(self) -> PlayerData {
        let mut data = PlayerData {
            account: self.account,
            economy: self.economy,
            upgrades: self.upgrades,
            redemptions: self.redemptions,
        };
        data.sort_redemptions();
        data
    }
}

pub struct FileGateway {
    dir: PathBuf,
    /// Serializes read-modify-write cycles so two writers never interleave
    /// on the temp file.
    write_lock: Mutex<()>,
}

impl FileGateway {
    /// Opens (and creates if needed) the data directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        info!("File store at {}", dir.display());
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, account: &AccountId) -> PathBuf {
        self.dir.join(format!("{}.json", account))
    }

    async fn read(&self, account: &AccountId) -> Result<Option<PlayerData>> {
        let path = self.path_for(account);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let save: SaveFile = serde_json::from_str(&json).map_err(|e| {
            warn!("Failed to parse save file {}: {}", path.display(), e);
            e
        })?;

        if save.version < MIN_COMPATIBLE_VERSION {
            warn!(
                "Save file {} has version {} (min compatible {})",
                path.display(),
                save.version,
                MIN_COMPATIBLE_VERSION
            );
            return Err(StoreError::IncompatibleVersion {
                found: save.version,
                min_supported: MIN_COMPATIBLE_VERSION,
            });
        }
        if save.version < SAVE_VERSION {
            info!(
                "Migrating save file {} (saved={}, current={})",
                path.display(),
                save.version,
                SAVE_VERSION
            );
        }

        if &save.account != account {
            return Err(StoreError::Corrupt {
                account: account.clone(),
                reason: format!("file belongs to {}", save.account),
            });
        }

        let data = save.into_data();
        check_integrity(&data)?;
        Ok(Some(data))
    }

    async fn write(&self, data: &PlayerData) -> Result<()> {
        let path = self.path_for(&data.account);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(&SaveFile::from_data(data))?;

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    async fn modify<T>(
        &self,
        account: &AccountId,
        f: impl FnOnce(&mut PlayerData) -> Result<T> + Send,
    ) -> Result<T> {
        let _guard = self.write_lock.lock().await;
        let mut data = self
            .read(account)
            .await?
            .ok_or_else(|| StoreError::AccountNotFound(account.clone()))?;
        let out = f(&mut data)?;
        self.write(&data).await?;
        Ok(out)
    }
}

#[async_trait]
impl Gateway for FileGateway {
    async fn load_or_create(&self, account: &AccountId) -> Result<PlayerData> {
        let _guard = self.write_lock.lock().await;
        if let Some(data) = self.read(account).await? {
            return Ok(data);
        }

        info!("Creating initial state for {}", account);
        let data = PlayerData::new(account.clone());
        self.write(&data).await?;
        Ok(data)
    }

    async fn save_economy(&self, account: &AccountId, economy: &EconomyState) -> Result<()> {
        self.modify(account, |data| {
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
        self.modify(account, |data| {
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
        self.modify(account, |data| {
            data.economy = *economy;
            data.redemptions.push(record.clone());
            data.sort_redemptions();
            Ok(())
        })
        .await
    }

    async fn redemptions(&self, account: &AccountId) -> Result<Vec<RedemptionRecord>> {
        Ok(self
            .read(account)
            .await?
            .map(|d| d.redemptions)
            .unwrap_or_default())
    }

    async fn update_redemption_status(
        &self,
        account: &AccountId,
        id: &RedemptionId,
        status: RedemptionStatus,
    ) -> Result<RedemptionRecord> {
        self.modify(account, |data| {
            apply_status(account, &mut data.redemptions, id, status)
        })
        .await
    }
}
