//! Writes every operation document and barrel for a schema.

use crate::document::OperationKind;
use crate::enumerate::{enumerate, RootFieldMap};
use crate::error::{GenerateError, Result};
use crate::format::format;
use crate::identifier::derive_identifier;
use crate::index::{document_file_name, index_file_name, render_index, IndexEntry, IndexStyle};
use crate::synthesize::{SynthesisOptions, Synthesizer};
use apollo_compiler::Schema;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::task::JoinSet;

/// What happens when one field cannot be generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// The first failure ends the run.
    #[default]
    Abort,
    /// Failed fields are reported and skipped; the rest are still written.
    Isolate,
}

/// Everything a generation run needs besides the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Root of the output tree. Expected to exist and be empty.
    pub output_path: PathBuf,
    pub synthesis: SynthesisOptions,
    pub index: IndexStyle,
    pub failure_policy: FailurePolicy,
}

impl GenerateOptions {
    #[must_use]
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            synthesis: SynthesisOptions::default(),
            index: IndexStyle::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// A field skipped under [`FailurePolicy::Isolate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFailure {
    pub field: String,
    pub message: String,
}

/// Outcome for one operation kind.
#[derive(Debug, Clone, Serialize)]
pub struct KindReport {
    pub kind: OperationKind,
    pub directory: PathBuf,
    pub index_file: PathBuf,
    /// Written documents in enumeration order.
    pub documents: Vec<IndexEntry>,
    pub failures: Vec<FieldFailure>,
}

/// Outcome of a whole run. Kinds without fields are absent.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub output_path: PathBuf,
    pub kinds: Vec<KindReport>,
}

impl GenerationReport {
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.kinds.iter().map(|k| k.documents.len()).sum()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.kinds.iter().map(|k| k.failures.len()).sum()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    #[must_use]
    pub fn kind(&self, kind: OperationKind) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.kind == kind)
    }
}

/// Generates the documents and barrels of all three kinds concurrently.
///
/// # Errors
///
/// Returns the first file-system error, and under [`FailurePolicy::Abort`]
/// also the first synthesis failure or identifier collision.
#[tracing::instrument(skip_all, fields(output = %options.output_path.display()))]
pub async fn generate(schema: &Schema, options: &GenerateOptions) -> Result<GenerationReport> {
    let roots = enumerate(schema);
    let synthesizer = Synthesizer::new(schema, options.synthesis);

    let (queries, mutations, subscriptions) = tokio::try_join!(
        generate_kind(synthesizer, roots.query, options),
        generate_kind(synthesizer, roots.mutation, options),
        generate_kind(synthesizer, roots.subscription, options),
    )?;

    let report = GenerationReport {
        output_path: options.output_path.clone(),
        kinds: [queries, mutations, subscriptions]
            .into_iter()
            .flatten()
            .collect(),
    };
    tracing::info!(
        documents = report.document_count(),
        failures = report.failure_count(),
        "Generation complete"
    );
    Ok(report)
}

/// A formatted document waiting to be written.
struct Pending {
    entry: IndexEntry,
    source: String,
}

async fn generate_kind(
    synthesizer: Synthesizer<'_>,
    root: Option<RootFieldMap<'_>>,
    options: &GenerateOptions,
) -> Result<Option<KindReport>> {
    let Some(root) = root.filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    write_kind(synthesizer, root, options).await.map(Some)
}

#[tracing::instrument(skip_all, fields(kind = %root.kind()))]
async fn write_kind(
    synthesizer: Synthesizer<'_>,
    root: RootFieldMap<'_>,
    options: &GenerateOptions,
) -> Result<KindReport> {
    let kind = root.kind();
    let (pending, failures) = prepare_documents(synthesizer, root, options.failure_policy)?;

    let directory = options.output_path.join(kind.dir_name());
    tokio::fs::create_dir_all(&directory)
        .await
        .map_err(|e| GenerateError::io(&directory, e))?;

    let mut documents = Vec::with_capacity(pending.len());
    let mut tasks = JoinSet::new();
    for Pending { entry, source } in pending {
        let path = directory.join(document_file_name(&entry.field));
        tasks.spawn(write_file(path, source));
        documents.push(entry);
    }
    while let Some(written) = tasks.join_next().await {
        let path = written??;
        tracing::debug!(path = %path.display(), "Wrote document");
    }

    let index_file = directory.join(index_file_name(&options.index));
    let barrel = render_index(&options.index, &documents);
    write_file(index_file.clone(), barrel).await?;

    tracing::info!(
        documents = documents.len(),
        failures = failures.len(),
        "Generated {}",
        kind.dir_name()
    );

    Ok(KindReport {
        kind,
        directory,
        index_file,
        documents,
        failures,
    })
}

/// Synthesizes and formats every field of `root` in enumeration order.
fn prepare_documents(
    synthesizer: Synthesizer<'_>,
    root: RootFieldMap<'_>,
    policy: FailurePolicy,
) -> Result<(Vec<Pending>, Vec<FieldFailure>)> {
    let kind = root.kind();
    let mut pending = Vec::with_capacity(root.len());
    let mut failures = Vec::new();
    let mut identifiers: HashMap<String, String> = HashMap::new();

    for field in root.field_names() {
        match prepare_document(synthesizer, kind, field, &mut identifiers) {
            Ok(document) => pending.push(document),
            Err(err) if policy == FailurePolicy::Isolate && err.is_field_local() => {
                tracing::warn!(%kind, field, error = %err, "Skipping field");
                failures.push(FieldFailure {
                    field: field.to_string(),
                    message: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok((pending, failures))
}

fn prepare_document(
    synthesizer: Synthesizer<'_>,
    kind: OperationKind,
    field: &str,
    identifiers: &mut HashMap<String, String>,
) -> Result<Pending> {
    let identifier = derive_identifier(field);
    if let Some(first) = identifiers.get(&identifier) {
        return Err(GenerateError::IdentifierCollision {
            kind,
            identifier,
            first: first.clone(),
            second: field.to_string(),
        });
    }

    let operation = synthesizer
        .synthesize(kind, field)
        .map_err(|source| GenerateError::Synthesis {
            kind,
            field: field.to_string(),
            source,
        })?;
    let source = format(&operation);
    tracing::debug!(field, identifier, bytes = source.len(), "Formatted document");

    identifiers.insert(identifier.clone(), field.to_string());
    Ok(Pending {
        entry: IndexEntry::new(identifier, field),
        source,
    })
}

async fn write_file(path: PathBuf, contents: String) -> Result<PathBuf> {
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| GenerateError::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(sdl: &str) -> apollo_compiler::validation::Valid<Schema> {
        Schema::parse_and_validate(sdl, "schema.graphql").unwrap()
    }

    #[test]
    fn test_collision_aborts_by_default() {
        let schema = schema("type Query { userId: ID, userID: ID }");
        let root = enumerate(&schema).query.unwrap();
        let synthesizer = Synthesizer::new(&schema, SynthesisOptions::default());

        let Err(err) = prepare_documents(synthesizer, root, FailurePolicy::Abort) else {
            panic!("expected a collision");
        };
        assert!(matches!(
            &err,
            GenerateError::IdentifierCollision { identifier, first, second, .. }
                if identifier == "USER_ID" && first == "userId" && second == "userID"
        ));
    }

    #[test]
    fn test_collision_isolated() {
        let schema = schema("type Query { userId: ID, userID: ID, other: Int }");
        let root = enumerate(&schema).query.unwrap();
        let synthesizer = Synthesizer::new(&schema, SynthesisOptions::default());

        let (pending, failures) =
            prepare_documents(synthesizer, root, FailurePolicy::Isolate).unwrap();
        let fields: Vec<_> = pending.iter().map(|p| p.entry.field.as_str()).collect();
        assert_eq!(fields, vec!["userId", "other"]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "userID");
        assert!(failures[0].message.contains("USER_ID"));
    }

    #[test]
    fn test_depth_failure_isolated() {
        let schema = schema(
            r"
            type Query { deep: A, flat: Int }
            type A { b: B }
            type B { value: Int }
            ",
        );
        let root = enumerate(&schema).query.unwrap();
        let synthesizer = Synthesizer::new(
            &schema,
            SynthesisOptions {
                depth_limit: 2,
                ..SynthesisOptions::default()
            },
        );

        let (pending, failures) =
            prepare_documents(synthesizer, root, FailurePolicy::Isolate).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(failures[0].field, "deep");
        assert!(failures[0].message.contains("depth limit of 2"));

        assert!(prepare_documents(synthesizer, root, FailurePolicy::Abort).is_err());
    }
}
