//! Coin clicker economy: click for coins, buy per-click upgrades, redeem
//! coins for fixed cash payouts.
//!
//! [`game`] holds the pure engine, [`store`] the persistence gateway,
//! [`session`] and [`service`] tie the two together per player.

pub mod config;
pub mod console;
pub mod game;
pub mod model;
pub mod service;
pub mod session;
pub mod store;
