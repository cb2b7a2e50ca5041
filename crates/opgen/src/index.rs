//! The per-kind barrel module re-exporting every generated document.

use serde::{Deserialize, Serialize};

const LINE_BREAK: &str = "\r\n";

/// How the barrel file is named and which loader it imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStyle {
    /// Extension of the barrel file, without the dot.
    pub extension: String,
    /// Module the loader function is imported from.
    pub loader_module: String,
    pub loader_function: String,
}

impl Default for IndexStyle {
    fn default() -> Self {
        Self {
            extension: "ts".to_string(),
            loader_module: "graphql.macro".to_string(),
            loader_function: "loader".to_string(),
        }
    }
}

/// One exported binding of a barrel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub identifier: String,
    pub field: String,
    /// Path of the document relative to the barrel, e.g. `./user.graphql`.
    pub relative_path: String,
}

impl IndexEntry {
    #[must_use]
    pub fn new(identifier: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            identifier: identifier.into(),
            relative_path: format!("./{}", document_file_name(&field)),
            field,
        }
    }
}

/// File name of the document generated for `field`.
#[must_use]
pub fn document_file_name(field: &str) -> String {
    format!("{field}.graphql")
}

#[must_use]
pub fn index_file_name(style: &IndexStyle) -> String {
    format!("index.{}", style.extension)
}

/// Renders the barrel: the loader import, then one export per entry in the
/// order given. Lines are joined by CRLF with no trailing line break.
#[must_use]
pub fn render_index(style: &IndexStyle, entries: &[IndexEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(format!(
        "import {{ {} }} from '{}'",
        style.loader_function, style.loader_module
    ));
    lines.extend(entries.iter().map(|entry| {
        format!(
            "export const {} = {}('{}')",
            entry.identifier, style.loader_function, entry.relative_path
        )
    }));
    lines.join(LINE_BREAK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_default_style() {
        let entries = vec![
            IndexEntry::new("USER_BY_ID", "userById"),
            IndexEntry::new("WIDGET", "widget"),
        ];
        let rendered = render_index(&IndexStyle::default(), &entries);

        insta::assert_snapshot!(rendered.replace(LINE_BREAK, "\n"), @r"
        import { loader } from 'graphql.macro'
        export const USER_BY_ID = loader('./userById.graphql')
        export const WIDGET = loader('./widget.graphql')
        ");
        assert_eq!(rendered.matches(LINE_BREAK).count(), 2);
        assert!(!rendered.ends_with('\n'));
    }

    #[test]
    fn test_render_without_entries() {
        assert_eq!(
            render_index(&IndexStyle::default(), &[]),
            "import { loader } from 'graphql.macro'"
        );
    }

    #[test]
    fn test_custom_style() {
        let style = IndexStyle {
            extension: "js".to_string(),
            loader_module: "@acme/gql-loader".to_string(),
            loader_function: "load".to_string(),
        };
        let rendered = render_index(&style, &[IndexEntry::new("ME", "me")]);

        assert_eq!(index_file_name(&style), "index.js");
        assert_eq!(
            rendered,
            "import { load } from '@acme/gql-loader'\r\nexport const ME = load('./me.graphql')"
        );
    }

    #[test]
    fn test_entry_paths() {
        let entry = IndexEntry::new("CREATE_USER", "createUser");
        assert_eq!(entry.relative_path, "./createUser.graphql");
        assert_eq!(index_file_name(&IndexStyle::default()), "index.ts");
    }
}
