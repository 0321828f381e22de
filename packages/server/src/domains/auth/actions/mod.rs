//! Auth domain actions - business logic functions
//!
//! Actions are async functions called directly from HTTP handlers with the
//! shared `ServerDeps`.

mod fetch_record;
mod request_challenge;
mod verify_challenge;

pub use fetch_record::{authenticate, fetch_record};
pub use request_challenge::{request_challenge, ChallengeRequest};
pub use verify_challenge::{verify_challenge, ChallengeResponse};
