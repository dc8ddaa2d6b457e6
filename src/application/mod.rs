//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot.
//! This includes announcement parsing, the auction store, participation tracking,
//! status displays, closure scheduling, resolution and command routing.

pub mod dispatcher;
pub mod engine;
pub mod parsing;
pub mod participation;
pub mod router;
pub mod scheduler;
pub mod status;
pub mod store;

#[cfg(test)]
pub mod testing;
