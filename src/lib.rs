//! Call Monitor: flags live and long Twilio calls and emails an alert.

pub mod calls;
pub mod config;
pub mod detect;
pub mod error;
pub mod monitor;
pub mod notify;
