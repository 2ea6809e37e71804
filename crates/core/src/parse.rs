//! Raw document -> schema IR.
//!
//! Every schema node in the document is converted into a [`SchemaNode`].
//! Constructs with no target mapping are rejected here, with the JSON pointer
//! of the offending node, so later stages only ever see supported shapes.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::document::{AdditionalProperties, ExclusiveBound, Items, RawDocument, RawSchema, SchemaType};
use crate::error::{Error, Result};
use crate::ir::api::OperationNode;
use crate::ir::schema::{
    AdditionalPolicy, ArrayShape, ComponentTable, Constraints, Modifiers, ObjectShape, Primitive,
    PrimitiveKind, Property, SchemaKind, SchemaNode,
};
use crate::operations::build_operations;

pub(crate) const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Everything the compiler needs from one input document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Normalized `components.schemas`, in document order.
    pub components: ComponentTable,
    /// Operations in document path order.
    pub operations: Vec<OperationNode>,
}

/// Build the component table and the operation list.
pub fn parse(doc: &RawDocument) -> Result<ParsedDocument> {
    let components = parse_components(doc)?;
    let operations = build_operations(doc, &components)?;
    Ok(ParsedDocument {
        components,
        operations,
    })
}

/// Parse `#/components/schemas` into a table, in document order.
pub fn parse_components(doc: &RawDocument) -> Result<ComponentTable> {
    let mut components = IndexMap::new();
    if let Some(raw) = &doc.components {
        for (name, schema) in &raw.schemas {
            let path = format!("{SCHEMA_REF_PREFIX}{}", escape_pointer(name));
            let node = parse_schema(schema, &path)?;
            debug!(component = %name, "parsed component schema");
            components.insert(name.clone(), node);
        }
    }
    Ok(ComponentTable::new(components))
}

/// Parse one schema located at `path` (a JSON pointer used in diagnostics).
pub fn parse_schema(raw: &RawSchema, path: &str) -> Result<SchemaNode> {
    if raw.not.is_some() {
        return Err(Error::unsupported(format!("{path}/not"), "not"));
    }
    if raw.if_schema.is_some() {
        return Err(Error::unsupported(format!("{path}/if"), "if/then/else"));
    }

    let outer = Modifiers {
        optional: false,
        nullable: raw.declares_null(),
        default: raw.default.clone(),
        read_only: raw.read_only.unwrap_or(false),
        write_only: raw.write_only.unwrap_or(false),
        description: raw.description.clone(),
    };
    let node = parse_shape(raw, path)?;
    Ok(merge_modifiers(node, outer))
}

/// Outer modifiers override or extend those of a collapsed inner node.
fn merge_modifiers(mut node: SchemaNode, outer: Modifiers) -> SchemaNode {
    let inner = &mut node.modifiers;
    inner.nullable |= outer.nullable;
    inner.read_only |= outer.read_only;
    inner.write_only |= outer.write_only;
    if outer.default.is_some() {
        inner.default = outer.default;
    }
    if outer.description.is_some() {
        inner.description = outer.description;
    }
    // A lone `null` type is already the null primitive.
    if matches!(
        node.kind,
        SchemaKind::Primitive(Primitive {
            kind: PrimitiveKind::Null,
            ..
        })
    ) {
        node.modifiers.nullable = false;
    }
    node
}

fn parse_shape(raw: &RawSchema, path: &str) -> Result<SchemaNode> {
    if let Some(reference) = &raw.ref_path {
        return Ok(SchemaNode::reference(component_name(reference, path)?));
    }
    if let Some(value) = &raw.const_value {
        return Ok(SchemaNode::new(SchemaKind::Literal(value.clone())));
    }
    if let Some(values) = &raw.enum_values {
        return Ok(parse_enum(values));
    }
    if let Some(branches) = &raw.all_of {
        return parse_all_of(raw, branches, path);
    }
    if let Some(branches) = &raw.one_of {
        return parse_union(raw, branches, &format!("{path}/oneOf"));
    }
    if let Some(branches) = &raw.any_of {
        return parse_union(raw, branches, &format!("{path}/anyOf"));
    }
    parse_typed(raw, path)
}

/// Resolve `#/components/schemas/<name>` to the component name.
pub(crate) fn component_name(reference: &str, from: &str) -> Result<String> {
    match reference.strip_prefix(SCHEMA_REF_PREFIX) {
        Some(name) if !name.is_empty() && !name.contains('/') => Ok(unescape_pointer(name)),
        _ => Err(Error::UnresolvedReference {
            reference: reference.to_string(),
            from: from.to_string(),
        }),
    }
}

fn parse_enum(values: &[Value]) -> SchemaNode {
    let kept: Vec<Value> = values.iter().filter(|v| !v.is_null()).cloned().collect();
    let has_null = kept.len() != values.len();
    if kept.is_empty() {
        return SchemaNode::primitive(PrimitiveKind::Null);
    }
    let mut node = SchemaNode::new(SchemaKind::EnumOf(kept));
    node.modifiers.nullable = has_null;
    node
}

fn parse_all_of(raw: &RawSchema, branches: &[RawSchema], path: &str) -> Result<SchemaNode> {
    let mut nodes = branches
        .iter()
        .enumerate()
        .map(|(i, branch)| parse_schema(branch, &format!("{path}/allOf/{i}")))
        .collect::<Result<Vec<_>>>()?;
    // Properties declared next to `allOf` act as one more branch.
    if raw.properties.as_ref().is_some_and(|p| !p.is_empty()) {
        nodes.push(parse_object(raw, path)?);
    }
    Ok(match nodes.len() {
        0 => SchemaNode::new(SchemaKind::Any),
        1 => nodes.remove(0),
        _ => SchemaNode::new(SchemaKind::Intersection(nodes)),
    })
}

fn parse_union(raw: &RawSchema, branches: &[RawSchema], path: &str) -> Result<SchemaNode> {
    let mut has_null = false;
    let mut nodes = Vec::with_capacity(branches.len());
    for (i, branch) in branches.iter().enumerate() {
        if branch.ref_path.is_none() && branch.is_null_type() {
            has_null = true;
            continue;
        }
        nodes.push(parse_schema(branch, &format!("{path}/{i}"))?);
    }

    let mut node = match nodes.len() {
        0 if has_null => return Ok(SchemaNode::primitive(PrimitiveKind::Null)),
        1 => nodes.remove(0),
        _ => SchemaNode::new(SchemaKind::Union {
            branches: nodes,
            discriminator: raw.discriminator.as_ref().map(|d| d.property_name.clone()),
        }),
    };
    node.modifiers.nullable |= has_null;
    Ok(node)
}

fn parse_typed(raw: &RawSchema, path: &str) -> Result<SchemaNode> {
    let types: Vec<&str> = match &raw.schema_type {
        Some(SchemaType::Single(t)) => vec![t.as_str()],
        Some(SchemaType::Multiple(types)) => types
            .iter()
            .map(String::as_str)
            .filter(|t| *t != "null")
            .collect(),
        None => Vec::new(),
    };

    match types.as_slice() {
        // `type: ["null"]`
        [] if raw.schema_type.is_some() => Ok(SchemaNode::primitive(PrimitiveKind::Null)),
        [] => {
            if raw.properties.is_some()
                || raw.additional_properties.is_some()
                || raw.property_names.is_some()
            {
                parse_object(raw, path)
            } else if raw.items.is_some() || raw.prefix_items.is_some() {
                parse_array(raw, path)
            } else {
                Ok(SchemaNode::new(SchemaKind::Any))
            }
        }
        [single] => parse_single(single, raw, path),
        many => {
            let branches = many
                .iter()
                .map(|t| parse_single(t, raw, path))
                .collect::<Result<Vec<_>>>()?;
            Ok(SchemaNode::new(SchemaKind::Union {
                branches,
                discriminator: None,
            }))
        }
    }
}

fn parse_single(type_name: &str, raw: &RawSchema, path: &str) -> Result<SchemaNode> {
    let primitive = |kind: PrimitiveKind, constraints: Constraints| {
        SchemaNode::new(SchemaKind::Primitive(Primitive {
            kind,
            format: raw.format.clone(),
            constraints,
        }))
    };

    match type_name {
        "string" => Ok(primitive(
            PrimitiveKind::String,
            Constraints {
                min_length: raw.min_length,
                max_length: raw.max_length,
                pattern: raw.pattern.clone(),
                ..Constraints::default()
            },
        )),
        "number" => Ok(primitive(PrimitiveKind::Number, numeric_constraints(raw))),
        "integer" => Ok(primitive(PrimitiveKind::Integer, numeric_constraints(raw))),
        "boolean" => Ok(primitive(PrimitiveKind::Boolean, Constraints::default())),
        "null" => Ok(primitive(PrimitiveKind::Null, Constraints::default())),
        "object" => parse_object(raw, path),
        "array" => parse_array(raw, path),
        other => Err(Error::unsupported(format!("{path}/type"), format!("type '{other}'"))),
    }
}

/// Normalize 3.0 boolean and 3.1 numeric exclusive bounds into one shape.
fn numeric_constraints(raw: &RawSchema) -> Constraints {
    let mut constraints = Constraints {
        minimum: raw.minimum,
        maximum: raw.maximum,
        multiple_of: raw.multiple_of,
        ..Constraints::default()
    };
    match raw.exclusive_minimum {
        Some(ExclusiveBound::Flag(true)) => constraints.exclusive_minimum = constraints.minimum.take(),
        Some(ExclusiveBound::Value(v)) => constraints.exclusive_minimum = Some(v),
        _ => {}
    }
    match raw.exclusive_maximum {
        Some(ExclusiveBound::Flag(true)) => constraints.exclusive_maximum = constraints.maximum.take(),
        Some(ExclusiveBound::Value(v)) => constraints.exclusive_maximum = Some(v),
        _ => {}
    }
    constraints
}

fn parse_object(raw: &RawSchema, path: &str) -> Result<SchemaNode> {
    let has_properties = raw.properties.as_ref().is_some_and(|p| !p.is_empty());

    // A map type: no declared properties, only a value (and maybe key) schema.
    if !has_properties {
        let value = match &raw.additional_properties {
            Some(AdditionalProperties::Schema(schema)) => {
                Some(parse_schema(schema, &format!("{path}/additionalProperties"))?)
            }
            Some(AdditionalProperties::Bool(true)) | None if raw.property_names.is_some() => {
                Some(SchemaNode::new(SchemaKind::Any))
            }
            _ => None,
        };
        if let Some(value) = value {
            let key = match &raw.property_names {
                Some(key) => parse_schema(key, &format!("{path}/propertyNames"))?,
                None => SchemaNode::primitive(PrimitiveKind::String),
            };
            return Ok(SchemaNode::new(SchemaKind::Record {
                key: Box::new(key),
                value: Box::new(value),
            }));
        }
    }

    let required: HashSet<&str> = raw.required.iter().flatten().map(String::as_str).collect();
    let mut properties = IndexMap::new();
    for (name, schema) in raw.properties.iter().flatten() {
        let mut node = parse_schema(
            schema,
            &format!("{path}/properties/{}", escape_pointer(name)),
        )?;
        let is_required = required.contains(name.as_str());
        node.modifiers.optional = !is_required;
        properties.insert(
            name.clone(),
            Property {
                node,
                required: is_required,
            },
        );
    }

    let additional = match &raw.additional_properties {
        None => AdditionalPolicy::Unspecified,
        Some(AdditionalProperties::Bool(true)) => AdditionalPolicy::Allow,
        Some(AdditionalProperties::Bool(false)) => AdditionalPolicy::Deny,
        Some(AdditionalProperties::Schema(schema)) => AdditionalPolicy::Schema(Box::new(
            parse_schema(schema, &format!("{path}/additionalProperties"))?,
        )),
    };

    Ok(SchemaNode::new(SchemaKind::Object(ObjectShape {
        properties,
        additional,
    })))
}

fn parse_array(raw: &RawSchema, path: &str) -> Result<SchemaNode> {
    if let Some(prefix) = &raw.prefix_items {
        return parse_tuple(prefix, &format!("{path}/prefixItems"));
    }
    let element = match &raw.items {
        Some(Items::Tuple(items)) => return parse_tuple(items, &format!("{path}/items")),
        Some(Items::Schema(item)) => parse_schema(item, &format!("{path}/items"))?,
        Some(Items::Bool(_)) | None => SchemaNode::new(SchemaKind::Any),
    };
    Ok(SchemaNode::new(SchemaKind::Array(ArrayShape {
        element: Box::new(element),
        min_items: raw.min_items,
        max_items: raw.max_items,
        unique: raw.unique_items.unwrap_or(false),
    })))
}

fn parse_tuple(items: &[RawSchema], path: &str) -> Result<SchemaNode> {
    let elements = items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_schema(item, &format!("{path}/{i}")))
        .collect::<Result<Vec<_>>>()?;
    Ok(SchemaNode::new(SchemaKind::Tuple(elements)))
}

/// Escape a key for use as one JSON pointer segment.
pub(crate) fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

pub(crate) fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(json: &str) -> SchemaNode {
        let raw: RawSchema = serde_json::from_str(json).unwrap();
        parse_schema(&raw, "#/components/schemas/T").unwrap()
    }

    fn parse_err(json: &str) -> Error {
        let raw: RawSchema = serde_json::from_str(json).unwrap();
        parse_schema(&raw, "#/components/schemas/T").unwrap_err()
    }

    #[test]
    fn test_object_required_and_optional() {
        let node = schema(
            r#"{ "type": "object", "required": ["id"], "properties": { "id": { "type": "string" }, "tag": { "type": "string" } } }"#,
        );
        let SchemaKind::Object(shape) = node.kind else {
            panic!("expected object");
        };
        let names: Vec<_> = shape.properties.keys().cloned().collect();
        assert_eq!(names, vec!["id", "tag"]);
        assert!(shape.properties["id"].required);
        assert!(!shape.properties["id"].node.modifiers.optional);
        assert!(shape.properties["tag"].node.modifiers.optional);
        assert_eq!(shape.additional, AdditionalPolicy::Unspecified);
    }

    #[test]
    fn test_nullable_forms() {
        let node = schema(r#"{ "type": "string", "nullable": true }"#);
        assert!(node.modifiers.nullable);
        let node = schema(r#"{ "type": ["integer", "null"] }"#);
        assert!(node.modifiers.nullable);
        assert!(matches!(
            node.kind,
            SchemaKind::Primitive(Primitive { kind: PrimitiveKind::Integer, .. })
        ));
        let node = schema(r#"{ "type": "null" }"#);
        assert!(!node.modifiers.nullable);
    }

    #[test]
    fn test_any_of_with_null_collapses() {
        let node = schema(
            r##"{ "anyOf": [{ "$ref": "#/components/schemas/Item" }, { "type": "null" }], "description": "maybe" }"##,
        );
        assert_eq!(node.kind, SchemaNode::reference("Item").kind);
        assert!(node.modifiers.nullable);
        assert_eq!(node.modifiers.description.as_deref(), Some("maybe"));
    }

    #[test]
    fn test_one_of_with_discriminator() {
        let node = schema(
            r##"{ "oneOf": [{ "$ref": "#/components/schemas/Cat" }, { "$ref": "#/components/schemas/Dog" }], "discriminator": { "propertyName": "kind" } }"##,
        );
        let SchemaKind::Union {
            branches,
            discriminator,
        } = node.kind
        else {
            panic!("expected union");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(discriminator.as_deref(), Some("kind"));
    }

    #[test]
    fn test_enum_with_null() {
        let node = schema(r#"{ "type": "string", "enum": ["a", "b", null] }"#);
        assert_eq!(node.kind, SchemaKind::EnumOf(vec![json!("a"), json!("b")]));
        assert!(node.modifiers.nullable);
    }

    #[test]
    fn test_all_of_with_sibling_properties() {
        let node = schema(
            r##"{ "allOf": [{ "$ref": "#/components/schemas/Base" }], "properties": { "extra": { "type": "boolean" } } }"##,
        );
        let SchemaKind::Intersection(branches) = node.kind else {
            panic!("expected intersection");
        };
        assert_eq!(branches.len(), 2);
        assert!(matches!(branches[1].kind, SchemaKind::Object(_)));
    }

    #[test]
    fn test_single_all_of_keeps_ref() {
        let node = schema(r##"{ "allOf": [{ "$ref": "#/components/schemas/Base" }], "nullable": true }"##);
        assert_eq!(node.kind, SchemaNode::reference("Base").kind);
        assert!(node.modifiers.nullable);
    }

    #[test]
    fn test_exclusive_bounds() {
        let node = schema(r#"{ "type": "number", "minimum": 1, "exclusiveMinimum": true, "maximum": 5 }"#);
        let SchemaKind::Primitive(p) = node.kind else {
            panic!("expected primitive");
        };
        assert_eq!(p.constraints.minimum, None);
        assert_eq!(p.constraints.exclusive_minimum, Some(1.0));
        assert_eq!(p.constraints.maximum, Some(5.0));

        let node = schema(r#"{ "type": "integer", "exclusiveMaximum": 10 }"#);
        let SchemaKind::Primitive(p) = node.kind else {
            panic!("expected primitive");
        };
        assert_eq!(p.constraints.exclusive_maximum, Some(10.0));
    }

    #[test]
    fn test_record_from_additional_properties() {
        let node = schema(r#"{ "type": "object", "additionalProperties": { "type": "integer" } }"#);
        let SchemaKind::Record { key, value } = node.kind else {
            panic!("expected record");
        };
        assert!(matches!(key.kind, SchemaKind::Primitive(Primitive { kind: PrimitiveKind::String, .. })));
        assert!(matches!(value.kind, SchemaKind::Primitive(Primitive { kind: PrimitiveKind::Integer, .. })));
    }

    #[test]
    fn test_catchall_alongside_properties() {
        let node = schema(
            r#"{ "type": "object", "properties": { "a": { "type": "string" } }, "additionalProperties": { "type": "number" } }"#,
        );
        let SchemaKind::Object(shape) = node.kind else {
            panic!("expected object");
        };
        assert!(matches!(shape.additional, AdditionalPolicy::Schema(_)));
    }

    #[test]
    fn test_tuples() {
        let node = schema(r#"{ "type": "array", "prefixItems": [{ "type": "string" }, { "type": "number" }], "items": false }"#);
        assert!(matches!(node.kind, SchemaKind::Tuple(ref items) if items.len() == 2));
        let node = schema(r#"{ "type": "array", "items": [{ "type": "string" }] }"#);
        assert!(matches!(node.kind, SchemaKind::Tuple(ref items) if items.len() == 1));
    }

    #[test]
    fn test_array_constraints() {
        let node = schema(r#"{ "type": "array", "items": { "type": "string" }, "minItems": 1, "uniqueItems": true }"#);
        let SchemaKind::Array(shape) = node.kind else {
            panic!("expected array");
        };
        assert_eq!(shape.min_items, Some(1));
        assert!(shape.unique);
    }

    #[test]
    fn test_type_array_becomes_union() {
        let node = schema(r#"{ "type": ["string", "number"] }"#);
        assert!(matches!(node.kind, SchemaKind::Union { ref branches, .. } if branches.len() == 2));
    }

    #[test]
    fn test_const_literal() {
        let node = schema(r#"{ "const": "circle" }"#);
        assert_eq!(node.kind, SchemaKind::Literal(json!("circle")));
    }

    #[test]
    fn test_not_rejected_with_path() {
        let err = parse_err(
            r#"{ "type": "object", "properties": { "a": { "not": { "type": "string" } } } }"#,
        );
        match err {
            Error::UnsupportedConstruct { path, construct } => {
                assert_eq!(path, "#/components/schemas/T/properties/a/not");
                assert_eq!(construct, "not");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = parse_err(r#"{ "type": "file" }"#);
        assert!(matches!(err, Error::UnsupportedConstruct { .. }));
    }

    #[test]
    fn test_non_component_ref_rejected() {
        let err = parse_err(r##"{ "$ref": "other.yaml#/Pet" }"##);
        assert!(matches!(err, Error::UnresolvedReference { .. }));
    }

    #[test]
    fn test_pointer_escaping() {
        assert_eq!(escape_pointer("a/b~c"), "a~1b~0c");
        assert_eq!(unescape_pointer("a~1b~0c"), "a/b~c");
        assert_eq!(
            component_name("#/components/schemas/a~1b", "x").unwrap(),
            "a/b"
        );
    }

    #[test]
    fn test_parse_components_in_order() {
        let doc = RawDocument::from_json(
            r#"{ "openapi": "3.1.0", "components": { "schemas": { "B": { "type": "string" }, "A": { "type": "number" } } } }"#,
        )
        .unwrap();
        let table = parse_components(&doc).unwrap();
        let names: Vec<_> = table.names().cloned().collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
