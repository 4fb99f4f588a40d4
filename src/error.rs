use thiserror::Error;

/// Errors reported by lookups that must produce a value.
///
/// Read-only accessors never create entries as a side effect; when the
/// requested key is absent they surface [`Error::KeyNotFound`] instead.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The requested key is not present in the container.
    #[error("key not found")]
    KeyNotFound,
}
