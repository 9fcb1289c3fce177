//! # Wiggle Views
//!
//! One module per dashboard page. Each page has an async `load` that runs its
//! queries concurrently through the shared cache, and a pure `render` that
//! turns the resulting query states into terminal text.

pub mod analytics;
pub mod context;
pub mod dashboard;
pub mod detail;
pub mod error;
pub mod exchanges;
pub mod opportunities;
pub mod render;
pub mod state;
pub mod status;
pub mod tokens;

// Re-export the core types to provide a clean public API.
pub use analytics::AnalyticsWindow;
pub use context::ViewContext;
pub use error::ViewError;
pub use state::ListState;
pub use status::PageStatus;
