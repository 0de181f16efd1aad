//! Address persistence.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use gatehouse_core::{Store, StoreError};
use parking_lot::RwLock;

use crate::model::{Address, AddressDraft, AddressFilter};

const ENTITY: &str = "address";

/// A [`Store`] of addresses keyed by `i64`.
///
/// Blanket-implemented for every matching store so handlers can be generic
/// over the backend.
pub trait AddressStore:
    Store<Record = Address, Draft = AddressDraft, Filter = AddressFilter, Id = i64>
{
}

impl<S> AddressStore for S where
    S: Store<Record = Address, Draft = AddressDraft, Filter = AddressFilter, Id = i64>
{
}

/// Process-local address store.
///
/// Records live in an ordered map so listing returns ascending IDs. IDs start
/// at 1 and are never reused.
///
/// # Example
///
/// ```rust
/// use gatehouse_address::{AddressDraft, InMemoryAddressStore};
/// use gatehouse_core::Store;
///
/// # tokio_test::block_on(async {
/// let store = InMemoryAddressStore::new();
/// let draft = AddressDraft {
///     client_id: 1,
///     title: "Home".into(),
///     city: "Turin".into(),
///     street: None,
///     phone: None,
///     zip: None,
///     lat: None,
///     long: None,
/// };
/// let created = store.create(draft).await.unwrap();
/// assert_eq!(created.id, 1);
/// # });
/// ```
#[derive(Debug)]
pub struct InMemoryAddressStore {
    records: RwLock<BTreeMap<i64, Address>>,
    next_id: AtomicI64,
}

impl InMemoryAddressStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for InMemoryAddressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for InMemoryAddressStore {
    type Record = Address;
    type Draft = AddressDraft;
    type Filter = AddressFilter;
    type Id = i64;

    async fn create(&self, draft: AddressDraft) -> Result<Address, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let address = Address {
            id,
            client_id: draft.client_id,
            title: draft.title,
            city: draft.city,
            street: draft.street,
            phone: draft.phone,
            zip: draft.zip,
            lat: draft.lat,
            long: draft.long,
            created_at: now,
            updated_at: now,
        };
        self.records.write().insert(id, address.clone());
        Ok(address)
    }

    async fn get(&self, id: i64) -> Result<Address, StoreError> {
        self.records
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { entity: ENTITY })
    }

    async fn list(&self, filter: AddressFilter) -> Result<Vec<Address>, StoreError> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|address| address.client_id == filter.client_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, draft: AddressDraft) -> Result<Address, StoreError> {
        let mut records = self.records.write();
        let address = records
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: ENTITY })?;

        address.client_id = draft.client_id;
        address.title = draft.title;
        address.city = draft.city;
        address.street = draft.street;
        address.phone = draft.phone;
        address.zip = draft.zip;
        address.lat = draft.lat;
        address.long = draft.long;
        address.updated_at = Utc::now().max(address.created_at);

        Ok(address.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.records
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { entity: ENTITY })
    }
}
