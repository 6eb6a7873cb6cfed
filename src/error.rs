use thiserror::Error;

use crate::catalog::QueryKind;

/// Failures that stop a reconciliation before the record is touched.
/// A lookup that simply finds no acceptable album is not an error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no catalog API token configured")]
    MissingApiToken,

    #[error("catalog lookup by {kind} failed: {message}")]
    Catalog { kind: QueryKind, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
