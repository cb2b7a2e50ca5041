//! Builds the full operation for one root field.
//!
//! Every field of every composite type reachable from the root field is
//! selected, down to leaf types. Each argument met on the way is bound to a
//! freshly declared variable.
//!
//! Object types may reference each other, or themselves, so the walk keeps the
//! path of composite types from the root to the current selection. A field
//! whose type already occurs on that path [`SynthesisOptions::type_revisits`]
//! times is a cycle edge: it selects only the type's `id` leaf, or is left out
//! when the type has none.

use crate::document::{
    ArgumentBinding, OperationKind, OperationNode, SelectionNode, VariableDefinition,
};
use crate::enumerate::root_field_map;
use crate::error::SynthesisError;
use crate::format::normalize_variable_name;
use apollo_compiler::schema::{Component, ExtendedType, FieldDefinition};
use apollo_compiler::Schema;
use std::collections::HashSet;

/// Default for [`SynthesisOptions::type_revisits`]: a type is never expanded
/// twice on the same path.
pub const DEFAULT_TYPE_REVISITS: usize = 1;

/// Default for [`SynthesisOptions::depth_limit`].
pub const DEFAULT_DEPTH_LIMIT: usize = 64;

/// Meta-field selected when a composite selection would otherwise be empty.
const TYPENAME_FIELD: &str = "__typename";

/// Field selected on a cycle edge.
const IDENTIFYING_FIELD: &str = "id";

/// Minimum Jaro-Winkler similarity for an unknown-field suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// How many times a type may occur on the active path before a field
    /// returning it is treated as a cycle edge. Must be at least 1.
    pub type_revisits: usize,
    /// Maximum selection depth; the root field has depth 1. Exceeding it is a
    /// [`SynthesisError::DepthLimitExceeded`].
    pub depth_limit: usize,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            type_revisits: DEFAULT_TYPE_REVISITS,
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }
}

/// Synthesizes operations against one schema.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a> {
    schema: &'a Schema,
    options: SynthesisOptions,
}

impl<'a> Synthesizer<'a> {
    #[must_use]
    pub const fn new(schema: &'a Schema, options: SynthesisOptions) -> Self {
        Self { schema, options }
    }

    #[must_use]
    pub const fn options(&self) -> SynthesisOptions {
        self.options
    }

    /// Builds the operation invoking `field_name` on the root type of `kind`.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn synthesize(
        &self,
        kind: OperationKind,
        field_name: &str,
    ) -> Result<OperationNode, SynthesisError> {
        let root = root_field_map(self.schema, kind)
            .ok_or(SynthesisError::MissingRootType { kind })?;

        let field = root
            .get(field_name)
            .ok_or_else(|| SynthesisError::UnknownField {
                kind,
                field: field_name.to_string(),
                suggestion: closest_name(field_name, root.field_names()),
            })?;

        let mut walk = Walk {
            schema: self.schema,
            options: self.options,
            path: vec![root.type_name()],
            variables: Vec::new(),
            used_names: HashSet::new(),
        };
        let selection = walk.root_field(field)?;

        tracing::debug!(
            variables = walk.variables.len(),
            depth = selection.depth(),
            "Synthesized operation"
        );

        Ok(OperationNode {
            kind,
            name: format!("{field_name}_{}", kind.keyword()),
            root_field: field_name.to_string(),
            variables: walk.variables,
            selection,
        })
    }
}

/// Builds the operation for `field_name` with default [`SynthesisOptions`].
pub fn synthesize(
    schema: &Schema,
    kind: OperationKind,
    field_name: &str,
) -> Result<OperationNode, SynthesisError> {
    Synthesizer::new(schema, SynthesisOptions::default()).synthesize(kind, field_name)
}

/// State of one synthesis: the active type path and the variables declared
/// so far.
struct Walk<'a> {
    schema: &'a Schema,
    options: SynthesisOptions,
    path: Vec<&'a str>,
    variables: Vec<VariableDefinition>,
    used_names: HashSet<String>,
}

impl<'a> Walk<'a> {
    fn root_field(&mut self, field: &'a FieldDefinition) -> Result<SelectionNode, SynthesisError> {
        if let Some(selection) = self.field(field, 1)? {
            return Ok(selection);
        }
        // The root field itself is a cycle edge without an `id` to fall back on.
        Ok(SelectionNode::Field {
            name: field.name.to_string(),
            arguments: self.bind_arguments(field),
            selections: vec![SelectionNode::leaf(TYPENAME_FIELD)],
        })
    }

    /// Selection for `field` at `depth`, or `None` when the field is a cycle
    /// edge that has nothing to select.
    fn field(
        &mut self,
        field: &'a FieldDefinition,
        depth: usize,
    ) -> Result<Option<SelectionNode>, SynthesisError> {
        if depth > self.options.depth_limit {
            return Err(SynthesisError::DepthLimitExceeded {
                field: field.name.to_string(),
                limit: self.options.depth_limit,
            });
        }

        let type_name = field.ty.inner_named_type().as_str();
        let Some(ty) = self.composite_type(type_name) else {
            return Ok(Some(SelectionNode::Field {
                name: field.name.to_string(),
                arguments: self.bind_arguments(field),
                selections: Vec::new(),
            }));
        };

        let (arguments, selections) = if self.is_cycle_edge(type_name) {
            let identifying = self.identifying_fields(ty);
            if identifying.is_empty() {
                tracing::trace!(field = %field.name, type_name, "Omitting cycle edge");
                return Ok(None);
            }
            let arguments = self.bind_arguments(field);
            (arguments, self.fields(identifying, depth + 1)?)
        } else {
            let arguments = self.bind_arguments(field);
            self.path.push(type_name);
            let expanded = self.expand(ty, depth + 1);
            self.path.pop();
            (arguments, non_empty(expanded?))
        };

        Ok(Some(SelectionNode::Field {
            name: field.name.to_string(),
            arguments,
            selections,
        }))
    }

    fn fields<I>(&mut self, fields: I, depth: usize) -> Result<Vec<SelectionNode>, SynthesisError>
    where
        I: IntoIterator<Item = &'a FieldDefinition>,
    {
        let mut selections = Vec::new();
        for field in fields {
            if let Some(selection) = self.field(field, depth)? {
                selections.push(selection);
            }
        }
        Ok(selections)
    }

    /// Child selections of a composite type entered at `depth`.
    fn expand(
        &mut self,
        ty: &'a ExtendedType,
        depth: usize,
    ) -> Result<Vec<SelectionNode>, SynthesisError> {
        let schema = self.schema;
        match ty {
            ExtendedType::Object(object) => {
                self.fields(object.fields.values().map(definition), depth)
            }
            ExtendedType::Interface(interface) => {
                let mut selections = self.fields(
                    interface.fields.values().map(definition),
                    depth,
                )?;
                for (name, candidate) in &schema.types {
                    let ExtendedType::Object(object) = candidate else {
                        continue;
                    };
                    if !object
                        .implements_interfaces
                        .iter()
                        .any(|implemented| implemented.name == interface.name)
                    {
                        continue;
                    }
                    let extra: Vec<&'a FieldDefinition> = object
                        .fields
                        .iter()
                        .filter(|(field_name, _)| !interface.fields.contains_key(*field_name))
                        .map(|(_, f)| definition(f))
                        .collect();
                    if extra.is_empty() {
                        continue;
                    }
                    if let Some(fragment) = self.fragment(name.as_str(), candidate, extra, depth)? {
                        selections.push(fragment);
                    }
                }
                Ok(selections)
            }
            ExtendedType::Union(union) => {
                let mut selections = Vec::new();
                for member in &union.members {
                    let member_name = member.name.as_str();
                    let Some(candidate) = schema.types.get(member_name) else {
                        continue;
                    };
                    let ExtendedType::Object(object) = candidate else {
                        continue;
                    };
                    let fields: Vec<&'a FieldDefinition> = object
                        .fields
                        .values()
                        .map(definition)
                        .collect();
                    if let Some(fragment) = self.fragment(member_name, candidate, fields, depth)? {
                        selections.push(fragment);
                    }
                }
                Ok(selections)
            }
            ExtendedType::Scalar(_) | ExtendedType::Enum(_) | ExtendedType::InputObject(_) => {
                Ok(Vec::new())
            }
        }
    }

    /// `... on TypeCondition { fields }`, or `None` if nothing is selected.
    fn fragment(
        &mut self,
        type_condition: &'a str,
        ty: &'a ExtendedType,
        fields: Vec<&'a FieldDefinition>,
        depth: usize,
    ) -> Result<Option<SelectionNode>, SynthesisError> {
        let selections = if self.is_cycle_edge(type_condition) {
            // Only fields the fragment would add; an inherited `id` is already selected
            let mut identifying = self.identifying_fields(ty);
            identifying.retain(|id| fields.iter().any(|f| f.name == id.name));
            self.fields(identifying, depth)?
        } else {
            self.path.push(type_condition);
            let expanded = self.fields(fields, depth);
            self.path.pop();
            expanded?
        };

        if selections.is_empty() {
            return Ok(None);
        }
        Ok(Some(SelectionNode::InlineFragment {
            type_condition: type_condition.to_string(),
            selections,
        }))
    }

    /// The `id` field of an object or interface type, when it is a leaf.
    fn identifying_fields(&self, ty: &'a ExtendedType) -> Vec<&'a FieldDefinition> {
        let fields = match ty {
            ExtendedType::Object(object) => &object.fields,
            ExtendedType::Interface(interface) => &interface.fields,
            _ => return Vec::new(),
        };
        fields
            .get(IDENTIFYING_FIELD)
            .map(definition)
            .filter(|f| {
                self.composite_type(f.ty.inner_named_type().as_str())
                    .is_none()
            })
            .into_iter()
            .collect()
    }

    fn composite_type(&self, type_name: &str) -> Option<&'a ExtendedType> {
        let schema = self.schema;
        schema.types.get(type_name).filter(|ty| {
            matches!(
                ty,
                ExtendedType::Object(_) | ExtendedType::Interface(_) | ExtendedType::Union(_)
            )
        })
    }

    fn is_cycle_edge(&self, type_name: &str) -> bool {
        let visits = self.path.iter().filter(|name| **name == type_name).count();
        visits >= self.options.type_revisits
    }

    fn bind_arguments(&mut self, field: &'a FieldDefinition) -> Vec<ArgumentBinding> {
        let mut bindings = Vec::with_capacity(field.arguments.len());
        for argument in &field.arguments {
            let variable = self.allocate_variable(field.name.as_str(), argument.name.as_str());
            self.variables.push(VariableDefinition {
                name: variable.clone(),
                ty: argument.ty.to_string(),
            });
            bindings.push(ArgumentBinding {
                argument: argument.name.to_string(),
                variable,
            });
        }
        bindings
    }

    /// Picks the first unused name among `arg`, `owner_arg`, `owner_arg_2`, ...
    fn allocate_variable(&mut self, owner: &str, argument: &str) -> String {
        let plain = normalize_variable_name(argument);
        if self.used_names.insert(plain.clone()) {
            return plain;
        }

        let qualified = normalize_variable_name(&format!("{owner}_{argument}"));
        if self.used_names.insert(qualified.clone()) {
            return qualified;
        }

        let mut n = 2;
        loop {
            let candidate = format!("{qualified}_{n}");
            if self.used_names.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn definition(component: &Component<FieldDefinition>) -> &FieldDefinition {
    component
}

fn non_empty(mut selections: Vec<SelectionNode>) -> Vec<SelectionNode> {
    if selections.is_empty() {
        selections.push(SelectionNode::leaf(TYPENAME_FIELD));
    }
    selections
}

fn closest_name<'n>(name: &str, candidates: impl Iterator<Item = &'n str>) -> Option<String> {
    candidates
        .map(|candidate| (candidate, strsim::jaro_winkler(name, candidate)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::format;
    use apollo_compiler::validation::Valid;

    fn schema(sdl: &str) -> Valid<Schema> {
        Schema::parse_and_validate(sdl, "schema.graphql").unwrap()
    }

    fn render(sdl: &str, kind: OperationKind, field: &str) -> String {
        let schema = schema(sdl);
        format(&synthesize(&schema, kind, field).unwrap())
    }

    const BLOG: &str = r"
        type Query {
          user(id: ID!): User
          version: String
        }
        type User {
          id: ID!
          name: String
          posts(first: Int): [Post!]!
        }
        type Post {
          id: ID!
          title: String
          author: User
        }
    ";

    #[test]
    fn test_nested_selection_with_cycle_edge() {
        insta::assert_snapshot!(render(BLOG, OperationKind::Query, "user"), @r"
        query user_query($id: ID!, $first: Int) {
          user(id: $id) {
            id
            name
            posts(first: $first) {
              id
              title
              author {
                id
              }
            }
          }
        }
        ");
    }

    #[test]
    fn test_leaf_root_field() {
        assert_eq!(
            render(BLOG, OperationKind::Query, "version"),
            "query version_query {\n  version\n}"
        );
    }

    #[test]
    fn test_enum_is_leaf() {
        let sdl = "type Query { status: Status } enum Status { ACTIVE INACTIVE }";
        assert_eq!(
            render(sdl, OperationKind::Query, "status"),
            "query status_query {\n  status\n}"
        );
    }

    #[test]
    fn test_self_referential_type_terminates() {
        let sdl = r"
            type Query { node: Node }
            type Node { id: ID!, parent: Node, children: [Node!]! }
        ";
        insta::assert_snapshot!(render(sdl, OperationKind::Query, "node"), @r"
        query node_query {
          node {
            id
            parent {
              id
            }
            children {
              id
            }
          }
        }
        ");
    }

    #[test]
    fn test_cycle_edge_without_id_is_omitted() {
        let sdl = r"
            type Query { a: A }
            type A { name: String, b: B }
            type B { a: A }
        ";
        insta::assert_snapshot!(render(sdl, OperationKind::Query, "a"), @r"
        query a_query {
          a {
            name
            b {
              __typename
            }
          }
        }
        ");
    }

    #[test]
    fn test_root_field_returning_root_type() {
        let sdl = "type Query { viewer: Query, hello: String }";
        assert_eq!(
            render(sdl, OperationKind::Query, "viewer"),
            "query viewer_query {\n  viewer {\n    __typename\n  }\n}"
        );
    }

    #[test]
    fn test_colliding_arguments_are_qualified() {
        let sdl = r"
            type Query { user(id: ID!): User }
            type User { id: ID!, friend(id: ID): User, post(id: ID!): Post }
            type Post { id: ID!, comment(id: ID!): Comment }
            type Comment { id: ID!, text: String, post(id: ID!): Post }
        ";
        insta::assert_snapshot!(render(sdl, OperationKind::Query, "user"), @r"
        query user_query($id: ID!, $friend_id: ID, $post_id: ID!, $comment_id: ID!, $post_id_2: ID!) {
          user(id: $id) {
            id
            friend(id: $friend_id) {
              id
            }
            post(id: $post_id) {
              id
              comment(id: $comment_id) {
                id
                text
                post(id: $post_id_2) {
                  id
                }
              }
            }
          }
        }
        ");
    }

    #[test]
    fn test_uppercase_argument_is_normalized() {
        let sdl = "type Query { item(Key: String!): String }";
        assert_eq!(
            render(sdl, OperationKind::Query, "item"),
            "query item_query($key: String!) {\n  item(Key: $key)\n}"
        );
    }

    #[test]
    fn test_union_members_become_fragments() {
        let sdl = r"
            type Query { search(term: String!): [SearchResult!]! }
            union SearchResult = User | Post
            type User { id: ID!, name: String }
            type Post { id: ID!, title: String }
        ";
        insta::assert_snapshot!(render(sdl, OperationKind::Query, "search"), @r"
        query search_query($term: String!) {
          search(term: $term) {
            ... on User {
              id
              name
            }
            ... on Post {
              id
              title
            }
          }
        }
        ");
    }

    #[test]
    fn test_interface_fields_then_implementation_extensions() {
        let sdl = r"
            type Query { node(id: ID!): Node }
            interface Node { id: ID! }
            type User implements Node { id: ID!, name: String }
            type Team implements Node { id: ID! }
        ";
        insta::assert_snapshot!(render(sdl, OperationKind::Query, "node"), @r"
        query node_query($id: ID!) {
          node(id: $id) {
            id
            ... on User {
              name
            }
          }
        }
        ");
    }

    #[test]
    fn test_implementation_on_path_adds_no_fragment() {
        let sdl = r"
            type Query { user: User }
            interface Node { id: ID! }
            type User implements Node { id: ID!, best: Node }
            type Post implements Node { id: ID!, title: String }
        ";
        insta::assert_snapshot!(render(sdl, OperationKind::Query, "user"), @r"
        query user_query {
          user {
            id
            best {
              id
              ... on Post {
                title
              }
            }
          }
        }
        ");
    }

    #[test]
    fn test_operation_name_joins_field_and_keyword() {
        let sdl = "type Query { userById(id: ID!): String }";
        let op = synthesize(&schema(sdl), OperationKind::Query, "userById").unwrap();
        assert_eq!(op.name, "userById_query");
        assert!(format(&op).starts_with("query userById_query($id: ID!) {"));
    }

    #[test]
    fn test_mutation_and_subscription_names() {
        let sdl = r"
            type Query { ok: Boolean }
            type Mutation { createUser(input: CreateUserInput!): Boolean }
            type Subscription { userAdded: Boolean }
            input CreateUserInput { name: String! }
        ";
        assert_eq!(
            render(sdl, OperationKind::Mutation, "createUser"),
            "mutation createUser_mutation($input: CreateUserInput!) {\n  createUser(input: $input)\n}"
        );
        assert_eq!(
            render(sdl, OperationKind::Subscription, "userAdded"),
            "subscription userAdded_subscription {\n  userAdded\n}"
        );
    }

    #[test]
    fn test_unknown_field_suggests_closest() {
        let schema = schema(BLOG);
        let err = synthesize(&schema, OperationKind::Query, "usr").unwrap_err();
        assert_eq!(
            err,
            SynthesisError::UnknownField {
                kind: OperationKind::Query,
                field: "usr".to_string(),
                suggestion: Some("user".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_root_type() {
        let schema = schema(BLOG);
        let err = synthesize(&schema, OperationKind::Mutation, "createUser").unwrap_err();
        assert_eq!(
            err,
            SynthesisError::MissingRootType {
                kind: OperationKind::Mutation
            }
        );
    }

    #[test]
    fn test_depth_limit() {
        let schema = schema(BLOG);
        let synthesizer = Synthesizer::new(
            &schema,
            SynthesisOptions {
                depth_limit: 2,
                ..SynthesisOptions::default()
            },
        );
        let err = synthesizer
            .synthesize(OperationKind::Query, "user")
            .unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::DepthLimitExceeded { limit: 2, .. }
        ));
    }

    #[test]
    fn test_type_revisits_deepens_cycles() {
        let sdl = r"
            type Query { node: Node }
            type Node { id: ID!, parent: Node }
        ";
        let schema = schema(sdl);
        let shallow = synthesize(&schema, OperationKind::Query, "node").unwrap();
        let deep = Synthesizer::new(
            &schema,
            SynthesisOptions {
                type_revisits: 3,
                ..SynthesisOptions::default()
            },
        )
        .synthesize(OperationKind::Query, "node")
        .unwrap();

        assert_eq!(shallow.selection.depth(), 3);
        assert_eq!(deep.selection.depth(), 5);
    }

    #[test]
    fn test_every_binding_has_one_declaration() {
        let sdl = r"
            type Query { user(id: ID!, filter: String): User }
            type User { id: ID!, posts(first: Int, filter: String): [Post] }
            type Post { id: ID!, comments(first: Int, filter: String): [String] }
        ";
        let schema = schema(sdl);
        let op = synthesize(&schema, OperationKind::Query, "user").unwrap();

        let declared: Vec<_> = op.variables.iter().map(|v| v.name.clone()).collect();
        let unique: HashSet<_> = declared.iter().collect();
        assert_eq!(declared.len(), unique.len());

        let bound: Vec<_> = op.bindings().map(|b| b.variable.clone()).collect();
        assert_eq!(bound, declared);
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let schema = schema(BLOG);
        let first = synthesize(&schema, OperationKind::Query, "user").unwrap();
        let second = synthesize(&schema, OperationKind::Query, "user").unwrap();
        assert_eq!(first, second);
    }
}
