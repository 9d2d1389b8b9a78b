//! Telephony provider integration for callreach.
//!
//! REST client for placing calls and sending SMS, a minimal TwiML
//! document builder, the file-backed contact directory, and the two-phase
//! voicemail delivery protocol.

mod client;
mod config;
mod contacts;
mod error;
mod twiml;
mod voicemail;

pub use client::{CallOptions, ProviderClient};
pub use config::TelephonyConfig;
pub use contacts::FileContactDirectory;
pub use error::TelephonyError;
pub use twiml::{spell_out, SayOptions, Twiml};
pub use voicemail::VoicemailDelivery;
