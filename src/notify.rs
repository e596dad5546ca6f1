//! Completion notifications
//!
//! Every store operation returns its `Result`. The `*_with` variants also
//! hand the same outcome to an error-first callback before returning it.

use crate::error::{Result, StoreError};

/// Completion callback, called once with the operation's outcome
pub type Notify<T> = Box<dyn FnOnce(std::result::Result<&T, &StoreError>) + Send>;

/// Hand `result` to `on_done` and pass it through unchanged
pub fn deliver<T>(result: Result<T>, on_done: Notify<T>) -> Result<T> {
    on_done(result.as_ref());
    result
}
