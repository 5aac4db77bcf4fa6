//! Line commands read by the binary, and the text it prints back.

use crate::game::redemption::{affordable_tiers, tier_by_label};
use crate::game::{RedemptionTier, REDEMPTION_TIERS};
use crate::session::Session;

// ── Input ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Click(u64),
    Upgrade,
    Redeem {
        tier: &'static RedemptionTier,
        email: String,
    },
    Status,
    Tiers,
    History,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command {0:?}, try \"help\"")]
    Unknown(String),

    #[error("click count must be a positive number, got {0:?}")]
    BadCount(String),

    #[error("usage: redeem <tier> <email>, e.g. redeem $5 me@example.com")]
    RedeemUsage,

    #[error("no redemption tier {0:?}, try \"tiers\"")]
    UnknownTier(String),
}

pub const HELP: &str = "\
commands:
  click [n]              click once, or n times
  upgrade                buy the next per-click upgrade
  redeem <tier> <email>  trade coins for cash, e.g. redeem $5 me@example.com
  status                 balance, yield and next upgrade
  tiers                  redemption offers
  history                past redemptions
  quit";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "click" | "c" => match words.next() {
            None => Command::Click(1),
            Some(n) => match n.parse::<u64>() {
                Ok(count) if count > 0 => Command::Click(count),
                _ => return Err(ParseError::BadCount(n.to_string())),
            },
        },
        "upgrade" | "u" => Command::Upgrade,
        "redeem" | "r" => {
            let (Some(label), Some(email)) = (words.next(), words.next()) else {
                return Err(ParseError::RedeemUsage);
            };
            let tier =
                tier_by_label(label).ok_or_else(|| ParseError::UnknownTier(label.to_string()))?;
            Command::Redeem {
                tier,
                email: email.to_string(),
            }
        }
        "status" | "s" => Command::Status,
        "tiers" => Command::Tiers,
        "history" | "h" => Command::History,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

// ── Output ──────────────────────────────────────────────────────────

pub fn render_status(session: &Session) -> String {
    let economy = session.economy();
    let quote = session.upgrade_quote();
    format!(
        "{} coins | {} per click | {} clicks | level {}\nnext upgrade: +{} per click for {} coins{}",
        economy.coins,
        economy.coins_per_click,
        economy.total_clicks,
        quote.level,
        quote.bonus,
        quote.cost,
        if quote.affordable { "" } else { " (not enough coins)" }
    )
}

pub fn render_tiers(session: &Session) -> String {
    let affordable: Vec<&str> = affordable_tiers(session.economy()).map(|t| t.label).collect();
    REDEMPTION_TIERS
        .iter()
        .map(|t| {
            let mark = if affordable.contains(&t.label) { "*" } else { " " };
            format!("{} {:>5} for {:>7} coins", mark, t.label, t.coins_required)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_history(session: &Session) -> String {
    let summary = session.history();
    let mut lines = vec![format!(
        "{} redemptions, {} pending, {} paid out for {} coins",
        summary.record_count,
        summary.pending_count,
        summary.total_cash_redeemed,
        summary.total_coins_redeemed
    )];
    for record in session.redemptions() {
        lines.push(format!(
            "{}  {}  {:>8} coins -> {:<8} {:<9} {}",
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.id,
            record.coins_spent,
            record.cash.to_string(),
            record.status.to_string(),
            record.payee_email
        ));
    }
    lines.join("\n")
}
