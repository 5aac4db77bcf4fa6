use serde::{Deserialize, Serialize};

use crate::model::{Cash, RedemptionRecord, RedemptionStatus};

/// Totals shown above the redemption history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistorySummary {
    /// Cash actually paid out (completed records only).
    pub total_cash_redeemed: Cash,
    /// Coins behind completed payouts.
    pub total_coins_redeemed: u64,
    pub pending_count: usize,
    pub record_count: usize,
}

pub fn summarize(records: &[RedemptionRecord]) -> HistorySummary {
    records
        .iter()
        .fold(HistorySummary::default(), |mut summary, record| {
            summary.record_count += 1;
            match record.status {
                RedemptionStatus::Completed => {
                    summary.total_cash_redeemed = summary.total_cash_redeemed.saturating_add(record.cash);
                    summary.total_coins_redeemed =
                        summary.total_coins_redeemed.saturating_add(record.coins_spent);
                }
                RedemptionStatus::Pending => summary.pending_count += 1,
                RedemptionStatus::Failed => {}
            }
            summary
        })
}
