use query_cache::QueryState;

/// Loading/error summary of a page built from several queries.
///
/// A page is loading while any of its queries is, and reports every query
/// that failed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStatus {
    pub is_loading: bool,
    pub errors: Vec<(&'static str, String)>,
}

impl PageStatus {
    pub fn track<T>(mut self, what: &'static str, state: &QueryState<T>) -> Self {
        self.is_loading |= state.is_loading;
        if let Some(message) = &state.error {
            self.errors.push((what, message.clone()));
        }
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.errors
            .iter()
            .map(|(what, message)| crate::render::error_line(what, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_is_the_or_of_all_queries() {
        let done = QueryState::loaded(1u8);
        let pending = QueryState::<u8> {
            is_loading: true,
            ..QueryState::default()
        };
        let status = PageStatus::default().track("a", &done).track("b", &pending);
        assert!(status.is_loading);

        let status = PageStatus::default().track("a", &done).track("b", &done);
        assert!(!status.is_loading);
    }

    #[test]
    fn every_failure_is_listed() {
        let status = PageStatus::default()
            .track("tokens", &QueryState::<u8>::failed("Server error"))
            .track("exchanges", &QueryState::loaded(2u8))
            .track("health", &QueryState::<u8>::failed("timeout"));
        let lines: Vec<String> = status.error_lines().collect();
        assert_eq!(
            lines,
            vec![
                "Error loading tokens: Server error".to_string(),
                "Error loading health: timeout".to_string()
            ]
        );
    }
}
