//! Exit codes for the `graphql-opgen` binary.
//!
//! Each stage of a run fails with its own code so scripts and CI can tell a
//! bad schema from a bad flag or a full disk.

use graphql_opgen::GenerateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// A field could not be synthesized, or two fields share an identifier
    GenerationError = 1,
    /// Bad flags or config file
    ConfigError = 2,
    /// Schema could not be fetched, read, or validated
    SchemaError = 3,
    /// Output directory could not be prepared or written
    IoError = 4,
}

impl ExitCode {
    pub fn exit(self) -> ! {
        std::process::exit(self as i32)
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Exit code for a failed generation run.
    #[must_use]
    pub const fn for_generate_error(error: &GenerateError) -> Self {
        match error {
            GenerateError::Synthesis { .. } | GenerateError::IdentifierCollision { .. } => {
                Self::GenerationError
            }
            GenerateError::Io { .. } | GenerateError::Task(_) => Self::IoError,
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::GenerationError => write!(f, "generation error"),
            Self::ConfigError => write!(f, "configuration error"),
            Self::SchemaError => write!(f, "schema load error"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
