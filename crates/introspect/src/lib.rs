//! GraphQL schema introspection.
//!
//! Fetches a schema from a live endpoint with the introspection query, or
//! reads a saved introspection result, and renders it as SDL.
//!
//! ```no_run
//! use graphql_introspect::{introspect_url_to_sdl, IntrospectionClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = IntrospectionClient::new().with_retries(2);
//! let sdl = introspect_url_to_sdl(&client, "https://api.example.com/graphql").await?;
//! println!("{sdl}");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod query;
mod sdl;
mod types;

pub use client::IntrospectionClient;
pub use error::{IntrospectionError, Result};
pub use query::INTROSPECTION_QUERY;
pub use sdl::introspection_to_sdl;
pub use types::*;

/// Introspects `url` with `client` and converts the result to SDL.
///
/// # Errors
///
/// Any [`IntrospectionError`] from [`IntrospectionClient::execute`].
#[tracing::instrument(skip(client))]
pub async fn introspect_url_to_sdl(client: &IntrospectionClient, url: &str) -> Result<String> {
    let schema = client.execute(url).await?;
    let sdl = introspection_to_sdl(&schema);
    tracing::info!(sdl_length = sdl.len(), "Introspection complete");
    Ok(sdl)
}

/// Converts a saved introspection JSON document to SDL.
///
/// # Errors
///
/// See [`parse_introspection_json`].
pub fn introspection_json_to_sdl(json: &str) -> Result<String> {
    parse_introspection_json(json).map(|schema| introspection_to_sdl(&schema))
}
