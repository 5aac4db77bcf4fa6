use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::model::{AccountId, RedemptionId, RedemptionRecord, RedemptionStatus};
use crate::session::{load_session, Session, SessionContext};
use crate::store::{Gateway, StoreError};

/// Hands out sessions over a shared gateway, at most one per account at a
/// time.
///
/// The engine assumes nobody else mutates an account between the read that
/// fed it and the write of its result. Each account therefore has a lease;
/// a session holds it from load until it is dropped, and a second
/// `open_session` for the same account waits for it.
pub struct AccountService {
    gateway: Arc<dyn Gateway>,
    leases: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl AccountService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            leases: Mutex::new(HashMap::new()),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// Returns the account's lease, dropping entries nobody holds or waits on.
    async fn lease_for(&self, account: &AccountId) -> Arc<Mutex<()>> {
        let mut leases = self.leases.lock().await;
        // Sessions and waiters each keep a clone; a count of one is the map's own.
        leases.retain(|_, lease| Arc::strong_count(lease) > 1);
        leases
            .entry(account.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Waits for the account's lease, then loads it.
    pub async fn open_session(&self, context: SessionContext) -> Result<Session, StoreError> {
        let lease = self.lease_for(&context.account).await;
        debug!("Waiting for lease on {}", context.account);
        let guard = lease.lock_owned().await;

        let session = load_session(self.gateway.clone(), context).await?;
        Ok(session.with_lease(guard))
    }

    /// Like [`open_session`](Self::open_session) but gives up instead of
    /// waiting when another session holds the account.
    pub async fn try_open_session(
        &self,
        context: SessionContext,
    ) -> Result<Option<Session>, StoreError> {
        let lease = self.lease_for(&context.account).await;
        let guard = match lease.try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Account {} is busy", context.account);
                return Ok(None);
            }
        };

        let session = load_session(self.gateway.clone(), context).await?;
        Ok(Some(session.with_lease(guard)))
    }

    /// Entry point for the payout side to settle a pending record.
    ///
    /// Does not take the account lease: status is the one field sessions never
    /// write, so an open session only needs a refresh to see the change.
    pub async fn settle_redemption(
        &self,
        account: &AccountId,
        id: &RedemptionId,
        status: RedemptionStatus,
    ) -> Result<RedemptionRecord, StoreError> {
        let record = self
            .gateway
            .update_redemption_status(account, id, status)
            .await?;
        info!("Redemption {} for {} is now {}", id, account, status);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::REDEMPTION_TIERS;
    use crate::store::MemoryGateway;
    use std::time::Duration;

    fn context(name: &str) -> SessionContext {
        SessionContext::new(name.parse().unwrap())
    }

    fn service() -> AccountService {
        AccountService::new(Arc::new(MemoryGateway::new()))
    }

    #[tokio::test]
    async fn second_session_waits_for_first() {
        let service = Arc::new(service());
        let first = service.open_session(context("solo")).await.unwrap();

        let contender = {
            let service = service.clone();
            tokio::spawn(async move { service.open_session(context("solo")).await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(first);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("second session should open once the first is dropped")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn try_open_reports_busy_account() {
        let service = service();
        let held = service.open_session(context("busy")).await.unwrap();

        assert!(service
            .try_open_session(context("busy"))
            .await
            .unwrap()
            .is_none());

        drop(held);
        assert!(service
            .try_open_session(context("busy"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn different_accounts_do_not_block() {
        let service = service();
        let _a = service.open_session(context("a")).await.unwrap();
        let b = tokio::time::timeout(Duration::from_secs(1), service.open_session(context("b")))
            .await
            .expect("other accounts must not wait");
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn sequential_sessions_see_each_others_writes() {
        let service = service();
        {
            let mut session = service.open_session(context("relay")).await.unwrap();
            session.click_many(10).await.unwrap();
        }
        {
            let mut session = service.open_session(context("relay")).await.unwrap();
            assert_eq!(session.economy().coins, 1000);
            session.purchase_upgrade().await.unwrap();
        }
        let session = service.open_session(context("relay")).await.unwrap();
        assert_eq!(session.economy().coins, 0);
        assert_eq!(session.economy().coins_per_click, 150);
    }

    #[tokio::test]
    async fn settle_while_session_open() {
        let service = service();
        let mut session = service.open_session(context("cashout")).await.unwrap();
        session.click_many(50).await.unwrap();
        let record = session
            .redeem(&REDEMPTION_TIERS[0], "cashout@example.com")
            .await
            .unwrap();

        let settled = service
            .settle_redemption(session.account(), &record.id, RedemptionStatus::Completed)
            .await
            .unwrap();
        assert_eq!(settled.status, RedemptionStatus::Completed);

        let err = service
            .settle_redemption(session.account(), &record.id, RedemptionStatus::Failed)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));

        session.refresh().await.unwrap();
        assert_eq!(session.history().total_cash_redeemed.cents(), 100);
    }

    #[tokio::test]
    async fn closed_sessions_release_their_lease_entries() {
        let service = service();
        for i in 0..1000 {
            let session = service
                .open_session(context(&format!("visitor-{}", i)))
                .await
                .unwrap();
            drop(session);
        }
        assert!(service.leases.lock().await.len() <= 1);

        let held = service.open_session(context("stays")).await.unwrap();
        let _ = service.try_open_session(context("passing")).await.unwrap();
        service.open_session(context("another")).await.unwrap();
        let leases = service.leases.lock().await;
        assert!(leases.contains_key(held.account()));
        assert!(leases.len() <= 2);
    }
}
