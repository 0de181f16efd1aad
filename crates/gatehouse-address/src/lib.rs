//! The address resource protected by the Gatehouse pipeline.
//!
//! - [`Address`] records with server-assigned IDs and timestamps
//! - [`InMemoryAddressStore`], a process-local [`Store`](gatehouse_core::Store)
//! - CRUD handlers and their admin-tier routes via [`address_routes`]

#![forbid(unsafe_code)]

pub mod handlers;
pub mod model;
pub mod routes;
pub mod store;
pub mod validation;

pub use model::{Address, AddressDraft, AddressFilter, CreateAddress, UpdateAddress};
pub use routes::address_routes;
pub use store::{AddressStore, InMemoryAddressStore};
