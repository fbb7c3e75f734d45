//! Duel Arena - combat simulation core for a two-player fighting game
//!
//! - `catalog`: validated per-character state tables and their JSON loader
//! - `game`: combatants, combos, hit resolution and the battle loop
//! - `input`: per-tick input facts and key bindings
//! - `runner`: headless bot-vs-bot battles on a tokio interval

pub mod catalog;
pub mod config;
pub mod game;
pub mod input;
pub mod runner;
pub mod util;
