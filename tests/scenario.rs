use std::sync::Arc;

use coin_clicker::game::{self, Rejection, REDEMPTION_TIERS};
use coin_clicker::model::{EconomyState, RedemptionStatus, UpgradeState};
use coin_clicker::service::AccountService;
use coin_clicker::session::{ActionError, SessionContext};
use coin_clicker::store::{FileGateway, Gateway};

#[test]
fn engine_walkthrough_from_fresh_account() {
    let mut economy = EconomyState::default();
    let upgrades = UpgradeState::default();

    for _ in 0..10 {
        economy = game::register_click(&economy);
    }
    assert_eq!(economy.coins, 1000);
    assert_eq!(economy.total_clicks, 10);

    let bought = game::purchase_upgrade(&economy, &upgrades).unwrap();
    assert_eq!(bought.economy.coins, 0);
    assert_eq!(bought.economy.coins_per_click, 150);
    assert_eq!(bought.upgrades.level, 1);
    assert_eq!(bought.upgrades.total_spent, 1000);

    let refused = game::redeem(
        &bought.economy,
        &REDEMPTION_TIERS[0],
        "player@example.com",
        chrono::Utc::now(),
    );
    assert_eq!(
        refused,
        Err(Rejection::InsufficientCoins {
            required: 5000,
            available: 0
        })
    );
}

#[tokio::test]
async fn progress_and_payouts_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let context = SessionContext::new("restart-player".parse().unwrap());

    let record_id = {
        let gateway: Arc<dyn Gateway> = Arc::new(FileGateway::open(dir.path()).await.unwrap());
        let service = AccountService::new(gateway);
        let mut session = service.open_session(context.clone()).await.unwrap();

        session.click_many(10).await.unwrap();
        session.purchase_upgrade().await.unwrap();

        // 150 per click now; 34 clicks cover the $1 tier.
        session.click_many(34).await.unwrap();
        assert_eq!(session.economy().coins, 5100);

        let err = session
            .redeem(&REDEMPTION_TIERS[0], "no-at-sign")
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Rejected(Rejection::InvalidEmail)));

        let record = session
            .redeem(&REDEMPTION_TIERS[0], "player@example.com")
            .await
            .unwrap();
        assert_eq!(session.economy().coins, 100);
        record.id
    };

    let gateway: Arc<dyn Gateway> = Arc::new(FileGateway::open(dir.path()).await.unwrap());
    let service = AccountService::new(gateway);
    service
        .settle_redemption(&context.account, &record_id, RedemptionStatus::Completed)
        .await
        .unwrap();

    let session = service.open_session(context).await.unwrap();
    assert_eq!(session.economy().coins, 100);
    assert_eq!(session.economy().coins_per_click, 150);
    assert_eq!(session.economy().total_clicks, 44);
    assert_eq!(session.upgrades().level, 1);
    assert_eq!(session.upgrades().total_spent, 1000);
    assert_eq!(session.redemptions().len(), 1);
    assert_eq!(session.redemptions()[0].status, RedemptionStatus::Completed);
    assert_eq!(session.history().total_cash_redeemed.to_string(), "$1.00");
}
