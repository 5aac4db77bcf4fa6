use crate::model::EconomyState;

/// Applies one click: the balance grows by the current per-click yield.
///
/// Always succeeds. Counters saturate rather than wrap.
pub fn register_click(economy: &EconomyState) -> EconomyState {
    register_clicks(economy, 1)
}

/// Applies `count` clicks in one step, equivalent to calling
/// [`register_click`] `count` times.
pub fn register_clicks(economy: &EconomyState, count: u64) -> EconomyState {
    EconomyState {
        coins: economy
            .coins
            .saturating_add(economy.coins_per_click.saturating_mul(count)),
        coins_per_click: economy.coins_per_click,
        total_clicks: economy.total_clicks.saturating_add(count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_adds_yield_and_counts() {
        let economy = EconomyState::default();
        let next = register_click(&economy);
        assert_eq!(next.coins, 100);
        assert_eq!(next.total_clicks, 1);
        assert_eq!(next.coins_per_click, 100);
    }

    #[test]
    fn ten_clicks_on_fresh_account_yield_one_thousand() {
        let mut economy = EconomyState::default();
        for _ in 0..10 {
            economy = register_click(&economy);
        }
        assert_eq!(economy.coins, 1000);
        assert_eq!(economy.total_clicks, 10);
    }

    #[test]
    fn batched_clicks_match_sequential() {
        let start = EconomyState {
            coins: 37,
            coins_per_click: 250,
            total_clicks: 4,
        };
        let mut sequential = start;
        for _ in 0..7 {
            sequential = register_click(&sequential);
        }
        assert_eq!(register_clicks(&start, 7), sequential);
    }

    #[test]
    fn zero_clicks_is_identity() {
        let start = EconomyState {
            coins: 12,
            coins_per_click: 150,
            total_clicks: 3,
        };
        assert_eq!(register_clicks(&start, 0), start);
    }

    #[test]
    fn click_saturates_at_max() {
        let economy = EconomyState {
            coins: u64::MAX - 10,
            coins_per_click: 100,
            total_clicks: 0,
        };
        assert_eq!(register_click(&economy).coins, u64::MAX);
    }
}
