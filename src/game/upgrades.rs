use serde::{Deserialize, Serialize};

use super::Rejection;
use crate::model::{EconomyState, UpgradeState};

// ── Upgrade ladder ──────────────────────────────────────────────────

/// Coins charged per rung. Buying level L -> L+1 costs `(L + 1) * UPGRADE_COST_STEP`.
pub const UPGRADE_COST_STEP: u64 = 1000;

/// Per-click bonus per rung. Buying level L -> L+1 adds `(L + 1) * UPGRADE_BONUS_STEP`.
pub const UPGRADE_BONUS_STEP: u64 = 50;

/// Cost of buying the next level when the player currently sits at `level`.
pub fn upgrade_cost(level: u64) -> u64 {
    level.saturating_add(1).saturating_mul(UPGRADE_COST_STEP)
}

/// Per-click bonus granted by buying the next level from `level`.
pub fn upgrade_bonus(level: u64) -> u64 {
    level.saturating_add(1).saturating_mul(UPGRADE_BONUS_STEP)
}

/// Total coins spent to climb from level 0 to `level`.
///
/// Returns `None` when the sum does not fit in a `u64`.
pub fn ladder_total(level: u64) -> Option<u64> {
    let rungs = (level as u128) * (level as u128 + 1) / 2;
    u64::try_from(rungs * UPGRADE_COST_STEP as u128).ok()
}

// ── Purchase ────────────────────────────────────────────────────────

/// Result of a successful upgrade purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradePurchase {
    pub economy: EconomyState,
    pub upgrades: UpgradeState,
    pub cost: u64,
    pub bonus: u64,
}

/// What the next upgrade would cost and give, and whether the balance covers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeQuote {
    pub level: u64,
    pub cost: u64,
    pub bonus: u64,
    pub affordable: bool,
}

pub fn upgrade_quote(economy: &EconomyState, upgrades: &UpgradeState) -> UpgradeQuote {
    let cost = upgrade_cost(upgrades.level);
    UpgradeQuote {
        level: upgrades.level,
        cost,
        bonus: upgrade_bonus(upgrades.level),
        affordable: economy.coins >= cost,
    }
}

/// Buys one level of the click upgrade.
///
/// Validates only against the values passed in, so replaying a stale
/// snapshot can never spend coins that snapshot does not hold.
///
/// # Errors
///
/// Returns [`Rejection::InsufficientCoins`] if the balance is below the
/// cost of the next level; nothing is changed in that case.
pub fn purchase_upgrade(
    economy: &EconomyState,
    upgrades: &UpgradeState,
) -> Result<UpgradePurchase, Rejection> {
    let cost = upgrade_cost(upgrades.level);
    let bonus = upgrade_bonus(upgrades.level);

    if economy.coins < cost {
        return Err(Rejection::InsufficientCoins {
            required: cost,
            available: economy.coins,
        });
    }

    Ok(UpgradePurchase {
        economy: EconomyState {
            coins: economy.coins - cost,
            coins_per_click: economy.coins_per_click.saturating_add(bonus),
            total_clicks: economy.total_clicks,
        },
        upgrades: UpgradeState {
            level: upgrades.level.saturating_add(1),
            total_spent: upgrades.total_spent.saturating_add(cost),
        },
        cost,
        bonus,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn economy_with(coins: u64) -> EconomyState {
        EconomyState {
            coins,
            ..EconomyState::default()
        }
    }

    #[test]
    fn ladder_is_linear() {
        assert_eq!(upgrade_cost(0), 1000);
        assert_eq!(upgrade_cost(1), 2000);
        assert_eq!(upgrade_cost(9), 10_000);
        assert_eq!(upgrade_bonus(0), 50);
        assert_eq!(upgrade_bonus(1), 100);
        assert_eq!(upgrade_bonus(9), 500);
    }

    #[test]
    fn first_purchase_from_exact_balance() {
        let result = purchase_upgrade(&economy_with(1000), &UpgradeState::default()).unwrap();
        assert_eq!(result.economy.coins, 0);
        assert_eq!(result.economy.coins_per_click, 150);
        assert_eq!(result.upgrades.level, 1);
        assert_eq!(result.upgrades.total_spent, 1000);
        assert_eq!(result.cost, 1000);
        assert_eq!(result.bonus, 50);
    }

    #[test]
    fn purchase_rejected_one_coin_short() {
        let err = purchase_upgrade(&economy_with(999), &UpgradeState::default()).unwrap_err();
        assert_eq!(
            err,
            Rejection::InsufficientCoins {
                required: 1000,
                available: 999
            }
        );
    }

    #[test]
    fn total_clicks_untouched_by_purchase() {
        let economy = EconomyState {
            coins: 5000,
            coins_per_click: 100,
            total_clicks: 42,
        };
        let result = purchase_upgrade(&economy, &UpgradeState::default()).unwrap();
        assert_eq!(result.economy.total_clicks, 42);
    }

    #[test]
    fn climbing_three_levels_spends_ladder_total() {
        let mut economy = economy_with(6000);
        let mut upgrades = UpgradeState::default();
        for _ in 0..3 {
            let bought = purchase_upgrade(&economy, &upgrades).unwrap();
            economy = bought.economy;
            upgrades = bought.upgrades;
        }
        assert_eq!(economy.coins, 0);
        assert_eq!(economy.coins_per_click, 100 + 50 + 100 + 150);
        assert_eq!(upgrades.level, 3);
        assert_eq!(Some(upgrades.total_spent), ladder_total(3));
    }

    #[test]
    fn ladder_total_overflow_is_none() {
        assert_eq!(ladder_total(0), Some(0));
        assert_eq!(ladder_total(4), Some(10_000));
        assert_eq!(ladder_total(u64::MAX), None);
    }

    #[test]
    fn quote_reports_affordability() {
        let upgrades = UpgradeState {
            level: 2,
            total_spent: 3000,
        };
        let quote = upgrade_quote(&economy_with(2999), &upgrades);
        assert_eq!(quote.cost, 3000);
        assert_eq!(quote.bonus, 150);
        assert!(!quote.affordable);
        assert!(upgrade_quote(&economy_with(3000), &upgrades).affordable);
    }

    #[test]
    fn stale_snapshot_replay_cannot_overspend() {
        // Both purchases were computed from the same captured snapshot; the
        // second is validated again against the balance left by the first.
        let captured = economy_with(1500);
        let upgrades = UpgradeState::default();

        let first = purchase_upgrade(&captured, &upgrades).unwrap();
        assert_eq!(first.economy.coins, 500);

        let second = purchase_upgrade(&first.economy, &first.upgrades);
        assert!(second.is_err());
    }

    #[test]
    fn purchase_at_top_level_saturates() {
        let upgrades = UpgradeState {
            level: u64::MAX,
            total_spent: u64::MAX,
        };
        let bought = purchase_upgrade(&economy_with(u64::MAX), &upgrades).unwrap();
        assert_eq!(bought.cost, u64::MAX);
        assert_eq!(bought.economy.coins, 0);
        assert_eq!(bought.upgrades.level, u64::MAX);
        assert_eq!(bought.upgrades.total_spent, u64::MAX);
    }
}
