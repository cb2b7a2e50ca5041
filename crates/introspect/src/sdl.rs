//! SDL rendering of an introspection result.

use crate::types::{
    EnumValue, Field, InputValue, IntrospectionSchema, IntrospectionType, NamedTypeRef,
};
use std::fmt::{self, Display, Formatter, Write};

const BUILTIN_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean", "ID"];

/// Converts an introspection result to SDL.
///
/// Introspection types (`__*`) and built-in scalars are left out. A
/// `schema { ... }` block is written only when the default root names would
/// not reproduce the declared roots: a root is renamed, or a type named like a
/// missing root exists. Argument and input field defaults and `@deprecated` are kept.
///
/// ```
/// use graphql_introspect::{introspection_to_sdl, parse_introspection_json};
///
/// let schema = parse_introspection_json(r#"{"__schema": {
///     "queryType": {"name": "Query"},
///     "mutationType": null,
///     "subscriptionType": null,
///     "types": [{
///         "kind": "OBJECT", "name": "Query", "interfaces": [],
///         "fields": [{"name": "hello", "args": [], "isDeprecated": false,
///             "deprecationReason": null,
///             "type": {"kind": "SCALAR", "name": "String", "ofType": null}}]
///     }]
/// }}"#).unwrap();
///
/// assert_eq!(introspection_to_sdl(&schema), "type Query {\n  hello: String\n}");
/// ```
#[must_use]
#[tracing::instrument(skip(schema), fields(types = schema.types.len()))]
pub fn introspection_to_sdl(schema: &IntrospectionSchema) -> String {
    let sdl = Printer { schema }.to_string();
    tracing::debug!(sdl_length = sdl.len(), "SDL generation complete");
    sdl
}

struct Printer<'a> {
    schema: &'a IntrospectionSchema,
}

impl Display for Printer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut separate = |f: &mut Formatter<'_>| {
            if first {
                first = false;
                Ok(())
            } else {
                f.write_str("\n\n")
            }
        };

        if needs_schema_block(self.schema) {
            separate(f)?;
            write_schema_block(f, self.schema)?;
        }

        for ty in &self.schema.types {
            let name = ty.name();
            if name.starts_with("__") || BUILTIN_SCALARS.contains(&name) {
                continue;
            }
            separate(f)?;
            write_type(f, ty)?;
        }
        Ok(())
    }
}

fn needs_schema_block(schema: &IntrospectionSchema) -> bool {
    let roots: [(Option<&NamedTypeRef>, &str); 3] = [
        (schema.query_type.as_ref(), "Query"),
        (schema.mutation_type.as_ref(), "Mutation"),
        (schema.subscription_type.as_ref(), "Subscription"),
    ];
    roots.into_iter().any(|(root, default)| match root {
        Some(root) => root.name != default,
        // Without a schema block a type with the default name becomes a root
        None => schema.types.iter().any(|ty| ty.name() == default),
    })
}

fn write_schema_block(f: &mut Formatter<'_>, schema: &IntrospectionSchema) -> fmt::Result {
    f.write_str("schema {\n")?;
    let roots = [
        ("query", &schema.query_type),
        ("mutation", &schema.mutation_type),
        ("subscription", &schema.subscription_type),
    ];
    for (operation, root) in roots {
        if let Some(root) = root {
            writeln!(f, "  {operation}: {}", root.name)?;
        }
    }
    f.write_char('}')
}

fn write_type(f: &mut Formatter<'_>, ty: &IntrospectionType) -> fmt::Result {
    match ty {
        IntrospectionType::Scalar(t) => write!(f, "scalar {}", t.name),
        IntrospectionType::Object(t) => {
            write!(f, "type {}", t.name)?;
            write_implements(f, &t.interfaces)?;
            write_fields(f, &t.fields)
        }
        IntrospectionType::Interface(t) => {
            write!(f, "interface {}", t.name)?;
            write_implements(f, &t.interfaces)?;
            write_fields(f, &t.fields)
        }
        IntrospectionType::Union(t) => {
            write!(f, "union {}", t.name)?;
            for (i, member) in t.possible_types.iter().enumerate() {
                f.write_str(if i == 0 { " = " } else { " | " })?;
                f.write_str(&member.name)?;
            }
            Ok(())
        }
        IntrospectionType::Enum(t) => {
            writeln!(f, "enum {} {{", t.name)?;
            for value in &t.enum_values {
                write_enum_value(f, value)?;
            }
            f.write_char('}')
        }
        IntrospectionType::InputObject(t) => {
            writeln!(f, "input {} {{", t.name)?;
            for field in &t.input_fields {
                f.write_str("  ")?;
                write_input_value(f, field)?;
                f.write_char('\n')?;
            }
            f.write_char('}')
        }
    }
}

fn write_implements(f: &mut Formatter<'_>, interfaces: &[NamedTypeRef]) -> fmt::Result {
    for (i, interface) in interfaces.iter().enumerate() {
        f.write_str(if i == 0 { " implements " } else { " & " })?;
        f.write_str(&interface.name)?;
    }
    Ok(())
}

fn write_fields(f: &mut Formatter<'_>, fields: &[Field]) -> fmt::Result {
    // `type X {}` is not valid SDL.
    if fields.is_empty() {
        return Ok(());
    }
    f.write_str(" {\n")?;
    for field in fields {
        write!(f, "  {}", field.name)?;
        if !field.args.is_empty() {
            f.write_char('(')?;
            for (i, arg) in field.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_input_value(f, arg)?;
            }
            f.write_char(')')?;
        }
        write!(f, ": {}", field.type_ref)?;
        write_deprecation(f, field.is_deprecated, field.deprecation_reason.as_deref())?;
        f.write_char('\n')?;
    }
    f.write_char('}')
}

fn write_input_value(f: &mut Formatter<'_>, value: &InputValue) -> fmt::Result {
    write!(f, "{}: {}", value.name, value.type_ref)?;
    if let Some(default) = &value.default_value {
        write!(f, " = {default}")?;
    }
    Ok(())
}

fn write_enum_value(f: &mut Formatter<'_>, value: &EnumValue) -> fmt::Result {
    write!(f, "  {}", value.name)?;
    write_deprecation(f, value.is_deprecated, value.deprecation_reason.as_deref())?;
    f.write_char('\n')
}

fn write_deprecation(f: &mut Formatter<'_>, deprecated: bool, reason: Option<&str>) -> fmt::Result {
    match (deprecated, reason) {
        (false, _) => Ok(()),
        (true, Some(reason)) => write!(f, " @deprecated(reason: \"{}\")", escape_string(reason)),
        (true, None) => f.write_str(" @deprecated"),
    }
}

fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
