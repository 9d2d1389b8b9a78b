//! Core types for callreach
//!
//! This crate contains domain types shared across all other crates:
//! call records, the provider status mapper, and the typed patch model
//! used for atomic record merges.

mod call_record;
mod contact;
mod env_config;
mod patch;
mod status;
mod webhook;

pub use call_record::*;
pub use contact::*;
pub use env_config::*;
pub use patch::*;
pub use status::*;
pub use webhook::*;
