pub mod correlation_key;
pub mod phone;

pub use correlation_key::CorrelationKey;
pub use phone::{digits_only, format_destination, mask_phone, MIN_PHONE_DIGITS};
