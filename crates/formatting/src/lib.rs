//! # Wiggle Formatting
//!
//! Stateless helpers that turn backend numbers and timestamps into the short
//! strings shown on dashboard cards and tables.

pub mod dates;
pub mod numbers;

pub use dates::{format_date, format_date_short, format_time_ago};
pub use numbers::{
    NOT_AVAILABLE, Tone, format_bytes, format_currency, format_decimal, format_duration,
    format_number, format_percentage, percentage_tone,
};
