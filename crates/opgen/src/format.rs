//! Canonical text rendering of synthesized operations.
//!
//! Both normalizations happen while printing rather than as edits on the
//! printed text:
//!
//! - variable declarations are printed as bare `$name: Type`, and selections
//!   never carry a label before a colon;
//! - every variable, declared or referenced, goes through
//!   [`normalize_variable_name`], so the two spellings always agree.

use crate::document::{ArgumentBinding, OperationNode, SelectionNode, VariableDefinition};

const INDENT: &str = "  ";

/// Lowercases the first character of a variable name when it is an ASCII
/// alphanumeric. The rest of the name is left alone.
#[must_use]
pub fn normalize_variable_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {
            let mut out = String::with_capacity(name.len());
            out.push(first.to_ascii_lowercase());
            out.push_str(chars.as_str());
            out
        }
        _ => name.to_string(),
    }
}

/// Renders an operation as GraphQL source text without a trailing newline.
#[must_use]
pub fn format(operation: &OperationNode) -> String {
    let mut out = String::new();

    out.push_str(operation.kind.keyword());
    out.push(' ');
    out.push_str(&operation.name);
    write_variable_definitions(&mut out, &operation.variables);
    out.push_str(" {\n");
    write_selection(&mut out, &operation.selection, 1);
    out.push('}');

    out
}

fn write_variable_definitions(out: &mut String, variables: &[VariableDefinition]) {
    if variables.is_empty() {
        return;
    }
    out.push('(');
    for (i, variable) in variables.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_variable(out, &variable.name);
        out.push_str(": ");
        out.push_str(&variable.ty);
    }
    out.push(')');
}

fn write_arguments(out: &mut String, arguments: &[ArgumentBinding]) {
    if arguments.is_empty() {
        return;
    }
    out.push('(');
    for (i, binding) in arguments.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&binding.argument);
        out.push_str(": ");
        write_variable(out, &binding.variable);
    }
    out.push(')');
}

fn write_variable(out: &mut String, name: &str) {
    out.push('$');
    out.push_str(&normalize_variable_name(name));
}

fn write_selection(out: &mut String, selection: &SelectionNode, depth: usize) {
    push_indent(out, depth);
    match selection {
        SelectionNode::Field {
            name,
            arguments,
            selections,
        } => {
            out.push_str(name);
            write_arguments(out, arguments);
            write_selection_set(out, selections, depth);
        }
        SelectionNode::InlineFragment {
            type_condition,
            selections,
        } => {
            out.push_str("... on ");
            out.push_str(type_condition);
            write_selection_set(out, selections, depth);
        }
    }
}

fn write_selection_set(out: &mut String, selections: &[SelectionNode], depth: usize) {
    if selections.is_empty() {
        out.push('\n');
        return;
    }
    out.push_str(" {\n");
    for child in selections {
        write_selection(out, child, depth + 1);
    }
    push_indent(out, depth);
    out.push_str("}\n");
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::OperationKind;

    fn binding(argument: &str, variable: &str) -> ArgumentBinding {
        ArgumentBinding {
            argument: argument.to_string(),
            variable: variable.to_string(),
        }
    }

    fn variable(name: &str, ty: &str) -> VariableDefinition {
        VariableDefinition {
            name: name.to_string(),
            ty: ty.to_string(),
        }
    }

    #[test]
    fn test_normalize_variable_name() {
        assert_eq!(normalize_variable_name("Id"), "id");
        assert_eq!(normalize_variable_name("id"), "id");
        assert_eq!(normalize_variable_name("UserInput"), "userInput");
        assert_eq!(normalize_variable_name("_Private"), "_Private");
        assert_eq!(normalize_variable_name("9Lives"), "9Lives");
        assert_eq!(normalize_variable_name(""), "");
    }

    #[test]
    fn test_format_without_variables() {
        let op = OperationNode {
            kind: OperationKind::Query,
            name: "version_query".to_string(),
            root_field: "version".to_string(),
            variables: vec![],
            selection: SelectionNode::leaf("version"),
        };
        assert_eq!(format(&op), "query version_query {\n  version\n}");
    }

    #[test]
    fn test_format_nested_with_fragment() {
        let op = OperationNode {
            kind: OperationKind::Query,
            name: "search_query".to_string(),
            root_field: "search".to_string(),
            variables: vec![variable("Term", "String!"), variable("first", "Int")],
            selection: SelectionNode::Field {
                name: "search".to_string(),
                arguments: vec![binding("Term", "Term"), binding("first", "first")],
                selections: vec![
                    SelectionNode::leaf("id"),
                    SelectionNode::InlineFragment {
                        type_condition: "User".to_string(),
                        selections: vec![SelectionNode::leaf("name")],
                    },
                ],
            },
        };

        insta::assert_snapshot!(format(&op), @r"
        query search_query($term: String!, $first: Int) {
          search(Term: $term, first: $first) {
            id
            ... on User {
              name
            }
          }
        }
        ");
    }

    #[test]
    fn test_declared_and_referenced_variables_agree() {
        let op = OperationNode {
            kind: OperationKind::Mutation,
            name: "createUser_mutation".to_string(),
            root_field: "createUser".to_string(),
            variables: vec![variable("Input", "CreateUserInput!")],
            selection: SelectionNode::Field {
                name: "createUser".to_string(),
                arguments: vec![binding("Input", "Input")],
                selections: vec![SelectionNode::leaf("id")],
            },
        };
        let text = format(&op);
        assert_eq!(text.matches("$input").count(), 2);
        assert!(!text.contains("$Input"));
    }

    #[test]
    fn test_no_line_has_label_before_colon() {
        let op = OperationNode {
            kind: OperationKind::Query,
            name: "user_query".to_string(),
            root_field: "user".to_string(),
            variables: vec![variable("id", "ID!")],
            selection: SelectionNode::Field {
                name: "user".to_string(),
                arguments: vec![binding("id", "id")],
                selections: vec![SelectionNode::leaf("name")],
            },
        };
        for line in format(&op).lines() {
            if let Some(colon) = line.find(':') {
                let paren = line.find('(');
                assert!(
                    paren.is_some_and(|p| p < colon),
                    "colon outside an argument list in {line:?}"
                );
            }
        }
    }
}
