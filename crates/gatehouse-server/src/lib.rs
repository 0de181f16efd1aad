//! # Gatehouse Server
//!
//! HTTP/1.1 server for the Gatehouse pipeline, built on Hyper and Tokio.
//!
//! - One task per connection, tracked for the shutdown drain
//! - Request bodies collected under a size cap
//! - `GET /health` answered before the pipeline
//! - Bounded drain with forced abort once the window elapses
//!
//! ## Example
//!
//! ```rust,ignore
//! use gatehouse_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::builder().http_addr("0.0.0.0:8080").build();
//!     let outcome = Server::new(config, pipeline).run().await?;
//!     println!("drain finished: {outcome:?}");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod health;
mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::ServerError;
pub use server::Server;
pub use shutdown::{ConnectionToken, ConnectionTracker, DrainOutcome};
