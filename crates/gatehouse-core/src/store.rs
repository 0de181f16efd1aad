//! Persistence capability consumed by handlers.
//!
//! The pipeline never talks to storage. Domain handlers hold a [`Store`] and
//! convert its [`StoreError`] into an [`ApiError`] with `?`.

use std::future::Future;
use thiserror::Error;

use crate::ApiError;

/// Errors returned by a [`Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the requested ID exists.
    #[error("{entity} not found")]
    NotFound {
        /// Human-readable entity name, e.g. `address`.
        entity: &'static str,
    },

    /// The backend failed.
    #[error("store backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::not_found(err.to_string()),
            StoreError::Backend(source) => Self::Internal(source),
        }
    }
}

/// CRUD access to one kind of record.
///
/// # Example
///
/// ```rust,ignore
/// async fn show<S: Store<Id = i64>>(store: &S, id: i64) -> Result<S::Record, ApiError> {
///     Ok(store.get(id).await?)
/// }
/// ```
pub trait Store: Send + Sync + 'static {
    /// The stored record.
    type Record: Send;
    /// Input for creating or replacing a record.
    type Draft: Send;
    /// Criteria accepted by [`Store::list`].
    type Filter: Send;
    /// Record identifier.
    type Id: Send + Copy;

    /// Persists a new record and returns it with its assigned ID.
    fn create(
        &self,
        draft: Self::Draft,
    ) -> impl Future<Output = Result<Self::Record, StoreError>> + Send;

    /// Fetches one record.
    fn get(&self, id: Self::Id) -> impl Future<Output = Result<Self::Record, StoreError>> + Send;

    /// Lists records matching `filter`.
    fn list(
        &self,
        filter: Self::Filter,
    ) -> impl Future<Output = Result<Vec<Self::Record>, StoreError>> + Send;

    /// Replaces the mutable fields of an existing record.
    fn update(
        &self,
        id: Self::Id,
        draft: Self::Draft,
    ) -> impl Future<Output = Result<Self::Record, StoreError>> + Send;

    /// Removes a record.
    fn delete(&self, id: Self::Id) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err: ApiError = StoreError::NotFound { entity: "address" }.into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "not found: address not found");
    }

    #[test]
    fn test_backend_maps_to_internal() {
        let err: ApiError = StoreError::Backend(anyhow::anyhow!("disk full")).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
