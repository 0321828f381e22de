pub mod record;

pub use record::{value_text, Record};
