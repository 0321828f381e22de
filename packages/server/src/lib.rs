// Rollcall - roll number + phone OTP authentication API
//
// Issues one-time codes to the phone numbers recorded against a roll number,
// exchanges a correct code for a short-lived signed token, and serves the
// caller's own record to token holders.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
