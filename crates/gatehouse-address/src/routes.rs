//! Route registration for the address resource.

use std::sync::Arc;

use gatehouse_core::{FnHandler, Identity, Request, RequestContext, RoleSet};
use gatehouse_middleware::RouteTable;
use http::Method;

use crate::handlers;
use crate::store::AddressStore;

/// Collection path.
pub const COLLECTION: &str = "/addresses";
/// Single-record path.
pub const MEMBER: &str = "/addresses/{id}";

/// Builds the address routes over `store`. Every route requires the admin tier.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use gatehouse_address::{address_routes, InMemoryAddressStore};
///
/// let routes = address_routes(Arc::new(InMemoryAddressStore::new()));
/// assert_eq!(routes.len(), 5);
/// ```
pub fn address_routes<S: AddressStore>(store: Arc<S>) -> RouteTable {
    let create = Arc::clone(&store);
    let get = Arc::clone(&store);
    let list = Arc::clone(&store);
    let update = Arc::clone(&store);
    let delete = store;

    RouteTable::new()
        .route(
            Method::POST,
            COLLECTION,
            RoleSet::ADMIN_TIER,
            FnHandler::new(move |_ctx: RequestContext, identity: Identity, request: Request| {
                let store = Arc::clone(&create);
                async move { handlers::create(store.as_ref(), &identity, &request).await }
            }),
        )
        .route(
            Method::GET,
            MEMBER,
            RoleSet::ADMIN_TIER,
            FnHandler::new(move |ctx: RequestContext, _identity: Identity, _request: Request| {
                let store = Arc::clone(&get);
                async move { handlers::get(store.as_ref(), &ctx).await }
            }),
        )
        .route(
            Method::GET,
            COLLECTION,
            RoleSet::ADMIN_TIER,
            FnHandler::new(move |ctx: RequestContext, _identity: Identity, _request: Request| {
                let store = Arc::clone(&list);
                async move { handlers::list(store.as_ref(), &ctx).await }
            }),
        )
        .route(
            Method::PUT,
            MEMBER,
            RoleSet::ADMIN_TIER,
            FnHandler::new(move |ctx: RequestContext, identity: Identity, request: Request| {
                let store = Arc::clone(&update);
                async move { handlers::update(store.as_ref(), &ctx, &identity, &request).await }
            }),
        )
        .route(
            Method::DELETE,
            MEMBER,
            RoleSet::ADMIN_TIER,
            FnHandler::new(move |ctx: RequestContext, identity: Identity, _request: Request| {
                let store = Arc::clone(&delete);
                async move { handlers::delete(store.as_ref(), &ctx, &identity).await }
            }),
        )
}
