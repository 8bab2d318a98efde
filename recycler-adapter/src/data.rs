use alloc::sync::Arc;

pub type RowChangedFn = Arc<dyn Fn(usize) -> bool + Send + Sync>;

/// Item count of a list plus the index layout must be recomputed from.
///
/// The data itself stays with the caller. Derive a provider for new data with
/// [`DataProvider::clone_with_rows`], which finds the first row that needs relayout.
#[derive(Clone)]
pub struct DataProvider {
    has_row_changed: RowChangedFn,
    len: usize,
    first_index_to_process: usize,
}

impl DataProvider {
    /// Creates an empty provider. `has_row_changed(i)` reports whether row `i` differs between
    /// the current data and the next data passed to [`DataProvider::clone_with_rows`].
    pub fn new(has_row_changed: impl Fn(usize) -> bool + Send + Sync + 'static) -> Self {
        Self {
            has_row_changed: Arc::new(has_row_changed),
            len: 0,
            first_index_to_process: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_row_changed(&self, index: usize) -> bool {
        (self.has_row_changed)(index)
    }

    /// First index whose layout may differ from the previous provider's.
    pub fn first_index_to_process(&self) -> usize {
        self.first_index_to_process
    }

    /// Returns a provider for `new_len` rows sharing this provider's change predicate.
    ///
    /// With `first_modified_index`, the scan is skipped and the index (capped at the current
    /// length) is used directly. Otherwise rows common to both lengths are scanned for the first
    /// one that changed; if none did, processing starts after the common prefix.
    pub fn clone_with_rows(&self, new_len: usize, first_modified_index: Option<usize>) -> Self {
        let first_index_to_process = match first_modified_index {
            Some(index) => index.min(self.len),
            None => {
                let common = self.len.min(new_len);
                (0..common)
                    .find(|&i| self.has_row_changed(i))
                    .unwrap_or(common)
            }
        };
        Self {
            has_row_changed: Arc::clone(&self.has_row_changed),
            len: new_len,
            first_index_to_process,
        }
    }
}

impl core::fmt::Debug for DataProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DataProvider")
            .field("len", &self.len)
            .field("first_index_to_process", &self.first_index_to_process)
            .finish_non_exhaustive()
    }
}
