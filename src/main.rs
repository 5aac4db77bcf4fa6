use std::sync::Arc;

use coin_clicker::config::{Config, StoreKind};
use coin_clicker::console::{self, Command};
use coin_clicker::service::AccountService;
use coin_clicker::session::SessionContext;
use coin_clicker::store::{FileGateway, Gateway, MemoryGateway};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let gateway: Arc<dyn Gateway> = match config.store {
        StoreKind::Memory => {
            info!("Using in-memory store; progress is lost on exit");
            Arc::new(MemoryGateway::new())
        }
        StoreKind::File => Arc::new(FileGateway::open(&config.data_dir).await?),
    };

    let service = AccountService::new(gateway);
    let mut session = service
        .open_session(SessionContext::new(config.account.clone()))
        .await?;

    println!("{}", console::render_status(&session));
    println!("type \"help\" for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match console::parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::Click(count) => match session.click_many(count).await {
                Ok(economy) => println!("{} coins", economy.coins),
                Err(e) => println!("could not save your clicks: {}", e),
            },
            Command::Upgrade => match session.purchase_upgrade().await {
                Ok(bought) => println!(
                    "upgraded to level {}: now {} per click",
                    bought.upgrades.level, bought.economy.coins_per_click
                ),
                Err(e) => println!("upgrade failed: {}", e),
            },
            Command::Redeem { tier, email } => match session.redeem(tier, &email).await {
                Ok(record) => println!(
                    "your {} payout to {} is being processed ({})",
                    record.cash, record.payee_email, record.id
                ),
                Err(e) => println!("redemption failed: {}", e),
            },
            Command::Status => println!("{}", console::render_status(&session)),
            Command::Tiers => println!("{}", console::render_tiers(&session)),
            Command::History => {
                if let Err(e) = session.refresh().await {
                    println!("could not reload history: {}", e);
                }
                println!("{}", console::render_history(&session));
            }
            Command::Help => println!("{}", console::HELP),
            Command::Quit => break,
        }
    }

    info!("Session for {} closed", session.account());
    Ok(())
}
