use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// What a view sees of one query.
#[derive(Debug)]
pub struct QueryState<T> {
    /// The last successfully fetched value, kept across failed refetches.
    pub data: Option<Arc<T>>,
    /// Message of the most recent failure, cleared by the next success.
    pub error: Option<String>,
    /// No data yet and a request is in flight.
    pub is_loading: bool,
    /// A request is in flight (with or without data to show meanwhile).
    pub is_fetching: bool,
    /// `data` belongs to a different key and is shown until this one loads.
    pub is_previous_data: bool,
    pub updated_at: Option<Instant>,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            is_previous_data: self.is_previous_data,
            updated_at: self.updated_at,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_fetching: false,
            is_previous_data: false,
            updated_at: None,
        }
    }
}

impl<T> QueryState<T> {
    pub fn loaded(data: T) -> Self {
        Self {
            data: Some(Arc::new(data)),
            updated_at: Some(Instant::now()),
            ..Self::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Time since the data was last refreshed.
    pub fn age(&self) -> Option<Duration> {
        self.updated_at.map(|at| at.elapsed())
    }

    /// Falls back to `previous` data while this query has none of its own,
    /// so a paged list keeps showing the old page until the new one arrives.
    pub fn or_previous(mut self, previous: &QueryState<T>) -> Self {
        if self.data.is_none() && previous.data.is_some() {
            self.data = previous.data.clone();
            self.updated_at = previous.updated_at;
            self.is_previous_data = true;
        }
        self
    }
}
