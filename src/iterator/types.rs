//! Iterator options

/// Number of objects buffered ahead of the consumer by default
pub const DEFAULT_BUFFER_SIZE: usize = 50;

/// Options for iterating over a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IteratorOptions {
    /// Maximum number of objects returned (0 = unbounded)
    pub limit: usize,
    /// Objects requested per page (0 = server default)
    pub batch_size: usize,
    /// Continuation cursor; when set, `batch_size` and `filter` are ignored
    pub cursor: String,
    /// Filter expression, format depends on the collection
    pub filter: String,
    /// Objects fetched ahead of the consumer
    pub buffer_size: usize,
}

impl Default for IteratorOptions {
    fn default() -> Self {
        Self {
            limit: 0,
            batch_size: 0,
            cursor: String::new(),
            filter: String::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl IteratorOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of objects
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the page size
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Resume from a cursor
    #[must_use]
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    /// Set the filter
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Set the read-ahead buffer size
    #[must_use]
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}

/// Options for Intelligence searches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Iteration options
    pub iterator: IteratorOptions,
    /// Return object descriptors (id and type) only
    pub descriptors_only: bool,
}

impl SearchOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration options
    #[must_use]
    pub fn iterator(mut self, options: IteratorOptions) -> Self {
        self.iterator = options;
        self
    }

    /// Return descriptors only
    #[must_use]
    pub fn descriptors_only(mut self, descriptors_only: bool) -> Self {
        self.descriptors_only = descriptors_only;
        self
    }
}
