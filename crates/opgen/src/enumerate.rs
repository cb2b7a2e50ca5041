use crate::OperationKind;
use apollo_compiler::schema::{FieldDefinition, ObjectType};
use apollo_compiler::{Name, Schema};

/// The fields of one root operation type, in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct RootFieldMap<'a> {
    kind: OperationKind,
    type_name: &'a str,
    object: &'a ObjectType,
}

impl<'a> RootFieldMap<'a> {
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Name of the root type, e.g. `Query` or a renamed `RootQuery`.
    #[must_use]
    pub const fn type_name(&self) -> &'a str {
        self.type_name
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.object.fields.keys().map(Name::as_str)
    }

    #[must_use]
    pub fn get(&self, field_name: &str) -> Option<&'a FieldDefinition> {
        let field: &'a FieldDefinition = self.object.fields.get(field_name)?;
        Some(field)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.object.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.object.fields.is_empty()
    }
}

/// Field maps of the root types a schema declares.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootFields<'a> {
    pub query: Option<RootFieldMap<'a>>,
    pub mutation: Option<RootFieldMap<'a>>,
    pub subscription: Option<RootFieldMap<'a>>,
}

impl<'a> RootFields<'a> {
    #[must_use]
    pub const fn get(&self, kind: OperationKind) -> Option<RootFieldMap<'a>> {
        match kind {
            OperationKind::Query => self.query,
            OperationKind::Mutation => self.mutation,
            OperationKind::Subscription => self.subscription,
        }
    }

    /// Declared root field maps, as query, mutation, subscription.
    pub fn iter(&self) -> impl Iterator<Item = RootFieldMap<'a>> {
        [self.query, self.mutation, self.subscription]
            .into_iter()
            .flatten()
    }
}

/// Name of the root type the schema declares for `kind`, if any.
#[must_use]
pub fn root_type_name(schema: &Schema, kind: OperationKind) -> Option<&str> {
    let definition = &schema.schema_definition;
    let root = match kind {
        OperationKind::Query => definition.query.as_ref(),
        OperationKind::Mutation => definition.mutation.as_ref(),
        OperationKind::Subscription => definition.subscription.as_ref(),
    }?;
    Some(root.name.as_str())
}

/// Looks up the root field map for a single kind.
#[must_use]
pub fn root_field_map(schema: &Schema, kind: OperationKind) -> Option<RootFieldMap<'_>> {
    let type_name = root_type_name(schema, kind)?;
    let Some(object) = schema.get_object(type_name) else {
        tracing::warn!(%kind, type_name, "Root type is not an object type; skipping");
        return None;
    };
    let object: &ObjectType = object;
    Some(RootFieldMap {
        kind,
        type_name,
        object,
    })
}

/// Extracts the field maps of the Query, Mutation, and Subscription root
/// types. A root type the schema does not declare is simply absent.
#[must_use]
#[tracing::instrument(skip(schema))]
pub fn enumerate(schema: &Schema) -> RootFields<'_> {
    let fields = RootFields {
        query: root_field_map(schema, OperationKind::Query),
        mutation: root_field_map(schema, OperationKind::Mutation),
        subscription: root_field_map(schema, OperationKind::Subscription),
    };
    tracing::debug!(
        queries = fields.query.map_or(0, |m| m.len()),
        mutations = fields.mutation.map_or(0, |m| m.len()),
        subscriptions = fields.subscription.map_or(0, |m| m.len()),
        "Enumerated root fields"
    );
    fields
}
