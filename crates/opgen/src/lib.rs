//! Operation document generation for GraphQL schemas.
//!
//! For every field of the Query, Mutation, and Subscription root types this
//! crate synthesizes a complete operation (every reachable field selected down
//! to leaf types, one variable per argument), renders it as canonical GraphQL
//! text, and writes it next to a barrel module exporting each document under
//! an upper-snake-case constant.
//!
//! # Example
//!
//! ```
//! use apollo_compiler::Schema;
//! use graphql_opgen::{format, synthesize, OperationKind};
//!
//! let schema = Schema::parse_and_validate(
//!     "type Query { user(id: ID!): User } type User { id: ID! name: String }",
//!     "schema.graphql",
//! )
//! .unwrap();
//!
//! let operation = synthesize(&schema, OperationKind::Query, "user").unwrap();
//! assert_eq!(
//!     format(&operation),
//!     "query user_query($id: ID!) {\n  user(id: $id) {\n    id\n    name\n  }\n}"
//! );
//! ```

mod document;
mod enumerate;
mod error;
mod format;
mod generate;
mod identifier;
mod index;
mod synthesize;

pub use document::{
    ArgumentBinding, OperationKind, OperationNode, SelectionNode, VariableDefinition,
};
pub use enumerate::{enumerate, root_field_map, root_type_name, RootFieldMap, RootFields};
pub use error::{GenerateError, Result, SynthesisError};
pub use format::{format, normalize_variable_name};
pub use generate::{
    generate, FailurePolicy, FieldFailure, GenerateOptions, GenerationReport, KindReport,
};
pub use identifier::derive_identifier;
pub use index::{document_file_name, index_file_name, render_index, IndexEntry, IndexStyle};
pub use synthesize::{
    synthesize, SynthesisOptions, Synthesizer, DEFAULT_DEPTH_LIMIT, DEFAULT_TYPE_REVISITS,
};
