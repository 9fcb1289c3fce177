/// Local paging state of a list page: the current page number and the
/// filters sent with every request.
///
/// Any filter change sends the user back to page 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<F> {
    page: u32,
    page_size: u32,
    filters: F,
}

impl<F> ListState<F> {
    pub fn new(page_size: u32, filters: F) -> Self {
        Self {
            page: 1,
            page_size,
            filters,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn filters(&self) -> &F {
        &self.filters
    }

    /// Moves to `page`; page numbers below 1 are clamped to 1.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.set_page(page);
        self
    }

    /// Edits the filters in place and resets to the first page.
    pub fn update_filters(&mut self, edit: impl FnOnce(&mut F)) {
        edit(&mut self.filters);
        self.page = 1;
    }

    pub fn set_filters(&mut self, filters: F) {
        self.update_filters(|current| *current = filters);
    }
}

impl<F: Default> Default for ListState<F> {
    fn default() -> Self {
        Self::new(20, F::default())
    }
}
