//! Operation AST produced by the synthesizer and consumed by the formatter.
//!
//! The tree is deliberately smaller than a full executable-document AST: a
//! generated operation never carries aliases, directives, literal argument
//! values, or fragment definitions.

use serde::Serialize;
use std::fmt;

/// The three root operation kinds of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// All kinds, in the order they are enumerated and reported.
    pub const ALL: [Self; 3] = [Self::Query, Self::Mutation, Self::Subscription];

    /// The keyword that opens an operation of this kind.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }

    /// Name of the output subdirectory holding this kind's documents.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Query => "queries",
            Self::Mutation => "mutations",
            Self::Subscription => "subscriptions",
        }
    }

    /// Conventional name of the root type when the schema does not rename it.
    #[must_use]
    pub const fn default_root_type(self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Mutation => "Mutation",
            Self::Subscription => "Subscription",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A complete single-root-field operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationNode {
    pub kind: OperationKind,
    /// Operation name, e.g. `userById_query`.
    pub name: String,
    /// Name of the root field this operation invokes.
    pub root_field: String,
    /// Declared variables, in order of first binding.
    pub variables: Vec<VariableDefinition>,
    /// The root field selection. Always a [`SelectionNode::Field`].
    pub selection: SelectionNode,
}

impl OperationNode {
    /// Iterates over every argument binding in the selection tree, depth-first.
    pub fn bindings(&self) -> impl Iterator<Item = &ArgumentBinding> {
        let mut stack = vec![&self.selection];
        let mut out = Vec::new();
        while let Some(node) = stack.pop() {
            if let SelectionNode::Field { arguments, .. } = node {
                out.extend(arguments.iter());
            }
            stack.extend(node.selections().iter().rev());
        }
        out.into_iter()
    }
}

/// `$name: Type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: String,
    /// The argument's declared type, printed verbatim (e.g. `[ID!]!`).
    pub ty: String,
}

/// `argument: $variable`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentBinding {
    pub argument: String,
    pub variable: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionNode {
    Field {
        name: String,
        arguments: Vec<ArgumentBinding>,
        /// Empty iff the field resolves to a leaf type.
        selections: Vec<SelectionNode>,
    },
    InlineFragment {
        type_condition: String,
        selections: Vec<SelectionNode>,
    },
}

impl SelectionNode {
    /// Field selection without arguments or children.
    #[must_use]
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::Field {
            name: name.into(),
            arguments: Vec::new(),
            selections: Vec::new(),
        }
    }

    #[must_use]
    pub fn selections(&self) -> &[SelectionNode] {
        match self {
            Self::Field { selections, .. } | Self::InlineFragment { selections, .. } => {
                selections
            }
        }
    }

    /// The field name, or `None` for an inline fragment.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Field { name, .. } => Some(name),
            Self::InlineFragment { .. } => None,
        }
    }

    /// Finds a direct child field by name.
    #[must_use]
    pub fn child_field(&self, name: &str) -> Option<&SelectionNode> {
        self.selections()
            .iter()
            .find(|child| child.field_name() == Some(name))
    }

    /// Finds a direct child inline fragment by its type condition.
    #[must_use]
    pub fn child_fragment(&self, type_condition: &str) -> Option<&SelectionNode> {
        self.selections().iter().find(|child| {
            matches!(child, Self::InlineFragment { type_condition: t, .. } if t == type_condition)
        })
    }

    /// Depth of the subtree rooted here; a leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .selections()
            .iter()
            .map(Self::depth)
            .max()
            .unwrap_or(0)
    }
}
