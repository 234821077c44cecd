//! Fixed-size batch splitting.

use scriptorium_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Maximum number of rows sent to a backend in one call.
///
/// Always greater than zero; defaults to 20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct BatchSize(NonZeroUsize);

impl BatchSize {
    /// Rows per batch when nothing else is configured.
    pub const DEFAULT: usize = 20;

    /// Validate a batch size.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `size` is zero.
    #[track_caller]
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(size)
            .map(Self)
            .ok_or_else(|| ConfigError::new("batch_size must be greater than zero"))
    }

    /// The size as a plain integer.
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self(NonZeroUsize::new(Self::DEFAULT).unwrap_or(NonZeroUsize::MIN))
    }
}

impl TryFrom<usize> for BatchSize {
    type Error = ConfigError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl From<BatchSize> for usize {
    fn from(size: BatchSize) -> Self {
        size.get()
    }
}

/// Split items into contiguous chunks of at most `size` items.
///
/// Produces `ceil(len / size)` chunks; every chunk but the last has exactly
/// `size` items, and concatenating the chunks reproduces `items`.
///
/// # Examples
///
/// ```
/// use scriptorium_core::{BatchSize, split_batches};
///
/// let items: Vec<u32> = (0..45).collect();
/// let batches = split_batches(&items, BatchSize::new(20).unwrap());
/// assert_eq!(batches.len(), 3);
/// assert_eq!(batches[2].len(), 5);
/// assert_eq!(batches.concat(), items);
/// ```
pub fn split_batches<T>(items: &[T], size: BatchSize) -> Vec<&[T]> {
    items.chunks(size.get()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert!(BatchSize::new(0).is_err());
        assert!(serde_json::from_str::<BatchSize>("0").is_err());
        assert_eq!(serde_json::from_str::<BatchSize>("50").map(BatchSize::get).ok(), Some(50));
    }

    #[test]
    fn chunks_are_size_exact_and_ordered() {
        for len in 0..70usize {
            for size in [1usize, 7, 20, 50] {
                let items: Vec<usize> = (0..len).collect();
                let batches = split_batches(&items, BatchSize::new(size).unwrap());
                assert_eq!(batches.len(), len.div_ceil(size));
                if let Some((last, full)) = batches.split_last() {
                    assert!(full.iter().all(|b| b.len() == size));
                    assert!(!last.is_empty() && last.len() <= size);
                }
                assert_eq!(batches.concat(), items);
            }
        }
    }
}
