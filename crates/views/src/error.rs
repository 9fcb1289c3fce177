use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Unsupported analytics time range: {0} days (expected 7, 30 or 90)")]
    InvalidTimeRange(u32),
}
