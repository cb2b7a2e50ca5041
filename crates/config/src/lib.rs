//! Discovery and parsing of `graphql-opgen` configuration files.
//!
//! ```yaml
//! # .opgenrc.yml
//! output: src/graphql
//! schema:
//!   url: https://api.example.com/graphql
//!   headers:
//!     Authorization: Bearer my-token
//! generate:
//!   depthLimit: 32
//!   index:
//!     extension: js
//! ```

mod config;
mod error;
mod loader;

pub use config::{
    is_url, GenerateConfig, IndexConfig, IntrospectionSchemaConfig, OpgenConfig, SchemaConfig,
};
pub use error::{ConfigError, Result};
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILES};
