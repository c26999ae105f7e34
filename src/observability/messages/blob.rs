// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for blob access.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A stage asked a blob for a key it does not hold.
///
/// # Log Level
/// `error!` - The access fails right after this message
///
/// # Example
/// ```
/// use the_sluice::observability::messages::blob::BlobKeyMissing;
///
/// let available = vec!["a".to_string(), "b".to_string()];
/// let msg = BlobKeyMissing { key: "c", available: &available };
/// assert_eq!(
///     msg.to_string(),
///     "No key named 'c' found in Blob. Available keys: a, b"
/// );
/// ```
pub struct BlobKeyMissing<'a> {
    pub key: &'a str,
    pub available: &'a [String],
}

impl Display for BlobKeyMissing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No key named '{}' found in Blob. Available keys: {}",
            self.key,
            self.available.join(", ")
        )
    }
}

impl StructuredLog for BlobKeyMissing<'_> {
    fn log(&self) {
        tracing::error!(
            target: "the_sluice::blob",
            key = self.key,
            available = %self.available.join(", "),
            "{}", self
        );
    }
}
