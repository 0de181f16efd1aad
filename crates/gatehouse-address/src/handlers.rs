//! Address request handlers.
//!
//! Each handler decodes its input, talks to the store and serializes the
//! result. Every failure is an [`ApiError`]; the pipeline turns it into the
//! wire body.

use gatehouse_core::extract::{path_param, validated_json};
use gatehouse_core::{ApiError, Identity, Request, RequestContext, Response, ResponseExt};
use http::StatusCode;

use crate::model::{AddressFilter, CreateAddress, UpdateAddress};
use crate::store::AddressStore;

/// Message for a non-integer `{id}`.
pub const INVALID_ID: &str = "invalid id";
/// Message for a list request without `client_id`.
pub const CLIENT_ID_REQUIRED: &str = "client_id is required";
/// Message for a non-integer `client_id`.
pub const INVALID_CLIENT_ID: &str = "invalid client_id";

/// `POST /addresses`
pub async fn create<S: AddressStore>(
    store: &S,
    identity: &Identity,
    request: &Request,
) -> Result<Response, ApiError> {
    let input = validated_json::<CreateAddress>(request)?.into_inner();
    let address = store.create(input.into()).await?;

    tracing::info!(
        address_id = address.id,
        client_id = address.client_id,
        caller = %identity.log_id(),
        "Address created"
    );
    Response::json(StatusCode::CREATED, &address)
}

/// `GET /addresses/{id}`
pub async fn get<S: AddressStore>(store: &S, ctx: &RequestContext) -> Result<Response, ApiError> {
    let id: i64 = path_param(ctx, "id", INVALID_ID)?;
    let address = store.get(id).await?;
    Response::json(StatusCode::OK, &address)
}

/// `GET /addresses?client_id=N`
pub async fn list<S: AddressStore>(store: &S, ctx: &RequestContext) -> Result<Response, ApiError> {
    let raw = ctx
        .query("client_id")
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request(CLIENT_ID_REQUIRED))?;
    let client_id: i64 = raw
        .parse()
        .map_err(|_| ApiError::bad_request(INVALID_CLIENT_ID))?;

    let addresses = store.list(AddressFilter { client_id }).await?;
    Response::json(StatusCode::OK, &addresses)
}

/// `PUT /addresses/{id}`
pub async fn update<S: AddressStore>(
    store: &S,
    ctx: &RequestContext,
    identity: &Identity,
    request: &Request,
) -> Result<Response, ApiError> {
    let id: i64 = path_param(ctx, "id", INVALID_ID)?;
    let changes = validated_json::<UpdateAddress>(request)?.into_inner();

    let existing = store.get(id).await?;
    let address = store.update(id, changes.merge_into(&existing)).await?;

    tracing::info!(address_id = id, caller = %identity.log_id(), "Address updated");
    Response::json(StatusCode::OK, &address)
}

/// `DELETE /addresses/{id}`
pub async fn delete<S: AddressStore>(
    store: &S,
    ctx: &RequestContext,
    identity: &Identity,
) -> Result<Response, ApiError> {
    let id: i64 = path_param(ctx, "id", INVALID_ID)?;
    store.delete(id).await?;

    tracing::info!(address_id = id, caller = %identity.log_id(), "Address deleted");
    Ok(Response::empty(StatusCode::NO_CONTENT))
}
