//! # Domain Layer
//!
//! Core definitions, types, and traits that define the auction domain.
//! Independent of the chat transport, serving as the contract for other layers.

pub mod config;
pub mod traits;
pub mod types;
