//! # Gatehouse Test
//!
//! In-process testing for services built on the Gatehouse pipeline. Requests
//! go through every stage without a socket.
//!
//! - [`TestClient`] - Sends requests through a [`gatehouse_middleware::Pipeline`]
//! - [`TestResponse`] - Fully read response with assertion helpers
//! - [`TokenFactory`] - Issues credentials per role under a test key
//!
//! ## Example
//!
//! ```rust
//! use gatehouse_core::Role;
//! use gatehouse_middleware::{Pipeline, RouteTable};
//! use gatehouse_test::{TestClient, TokenFactory};
//! use http::StatusCode;
//!
//! # tokio_test::block_on(async {
//! let tokens = TokenFactory::new(&[1u8; 32]).unwrap();
//! let client = TestClient::new(Pipeline::builder(tokens.verifier()).routes(RouteTable::new()).build());
//!
//! client
//!     .get("/anything")
//!     .bearer_token(tokens.expired(Role::Admin).unwrap())
//!     .send()
//!     .await
//!     .assert_status(StatusCode::UNAUTHORIZED);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/gatehouse-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;
mod tokens;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
pub use tokens::{TokenFactory, TEST_TOKEN_TTL};
