//! Schema IR -> Zod expressions.

use std::collections::{BTreeSet, HashSet};

use serde_json::{Map, Value, json};
use tracing::debug;

use super::expr::ValidatorExpr;
use crate::config::IntersectionPolicy;
use crate::error::{Error, Result};
use crate::ir::api::ParameterNode;
use crate::ir::schema::{
    AdditionalPolicy, ArrayShape, ComponentTable, Modifiers, ObjectShape, Primitive, PrimitiveKind,
    RefTarget, SchemaKind, SchemaNode,
};
use crate::ir::utils::js_string;
use crate::naming::NamingContext;
use crate::parse::escape_pointer;

/// String formats with a Zod refinement. Anything else is accepted as a plain string.
const STRING_FORMATS: &[(&str, &str)] = &[
    ("email", "email"),
    ("uri", "url"),
    ("url", "url"),
    ("uuid", "uuid"),
    ("date-time", "datetime"),
    ("date", "date"),
    ("time", "time"),
    ("duration", "duration"),
    ("cuid", "cuid"),
    ("cuid2", "cuid2"),
    ("ulid", "ulid"),
    ("emoji", "emoji"),
    ("nanoid", "nanoid"),
    ("base64", "base64"),
];

/// How primitive values reach the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// JSON bodies: values arrive typed.
    Strict,
    /// Path, query, header and cookie values arrive as strings.
    Coerce,
}

/// Compiles schema nodes against one resolved component table.
#[derive(Debug)]
pub struct ValidatorCompiler<'a> {
    components: &'a ComponentTable,
    recursive: &'a BTreeSet<String>,
    names: &'a NamingContext,
    intersection: IntersectionPolicy,
}

impl<'a> ValidatorCompiler<'a> {
    /// A compiler over the resolved components and assigned names.
    pub fn new(
        components: &'a ComponentTable,
        recursive: &'a BTreeSet<String>,
        names: &'a NamingContext,
        intersection: IntersectionPolicy,
    ) -> Self {
        Self {
            components,
            recursive,
            names,
            intersection,
        }
    }

    /// Compile a schema node located at `path`.
    pub fn compile(&self, node: &SchemaNode, path: &str) -> Result<ValidatorExpr> {
        self.node(node, path, Mode::Strict)
    }

    /// Compile a parameter's schema in coercing mode, with its `param` metadata.
    pub fn compile_parameter(&self, param: &ParameterNode, path: &str) -> Result<ValidatorExpr> {
        let mut node = param.schema.clone();
        node.modifiers.optional = !param.required;
        if node.modifiers.description.is_none() {
            node.modifiers.description.clone_from(&param.description);
        }
        let expr = self.node(&node, &format!("{path}/schema"), Mode::Coerce)?;

        let mut meta = Map::new();
        meta.insert("name".into(), Value::String(param.name.clone()));
        meta.insert("in".into(), Value::String(param.location.as_str().to_string()));
        let default_style = param.location.default_style();
        if param.style != default_style || param.explode != param.style.default_explode() {
            meta.insert("style".into(), Value::String(param.style.as_str().to_string()));
            meta.insert("explode".into(), Value::Bool(param.explode));
        }
        Ok(expr.chain(
            "openapi",
            vec![ValidatorExpr::Json(json!({ "param": Value::Object(meta) }))],
        ))
    }

    fn node(&self, node: &SchemaNode, path: &str, mode: Mode) -> Result<ValidatorExpr> {
        let base = self.kind(node, path, mode)?;
        Ok(self.modifiers(base, node, mode))
    }

    fn kind(&self, node: &SchemaNode, path: &str, mode: Mode) -> Result<ValidatorExpr> {
        match &node.kind {
            SchemaKind::Object(shape) => self.object(shape, path, mode),
            SchemaKind::Array(shape) => self.array(shape, path, mode),
            SchemaKind::Tuple(elements) => {
                let items = elements
                    .iter()
                    .enumerate()
                    .map(|(i, el)| self.node(el, &format!("{path}/prefixItems/{i}"), mode))
                    .collect::<Result<Vec<_>>>()?;
                Ok(ValidatorExpr::z("tuple", vec![ValidatorExpr::Array(items)]))
            }
            SchemaKind::Record { key, value } => {
                let key_expr = self.record_key(key, &format!("{path}/propertyNames"))?;
                let value_expr = self.node(value, &format!("{path}/additionalProperties"), mode)?;
                Ok(ValidatorExpr::z("record", vec![key_expr, value_expr]))
            }
            SchemaKind::Primitive(primitive) => Ok(self.primitive(primitive, path, mode)),
            SchemaKind::Literal(value) => literal(value, &format!("{path}/const")),
            SchemaKind::EnumOf(values) => enumeration(values, &format!("{path}/enum")),
            SchemaKind::Union {
                branches,
                discriminator,
            } => self.union(branches, discriminator.as_deref(), path, mode),
            SchemaKind::Intersection(branches) => self.intersection(branches, path, mode),
            SchemaKind::Ref(target) => self.reference(target, path, mode),
            SchemaKind::Any => Ok(ValidatorExpr::z("unknown", vec![])),
        }
    }

    /// Metadata, nullability, optionality and description, in that order.
    fn modifiers(&self, mut expr: ValidatorExpr, node: &SchemaNode, mode: Mode) -> ValidatorExpr {
        let Modifiers {
            optional,
            nullable,
            default,
            read_only,
            write_only,
            description,
        } = &node.modifiers;

        if *read_only || *write_only {
            let mut meta = Map::new();
            if *read_only {
                meta.insert("readOnly".into(), Value::Bool(true));
            }
            if *write_only {
                meta.insert("writeOnly".into(), Value::Bool(true));
            }
            expr = expr.chain("openapi", vec![ValidatorExpr::Json(Value::Object(meta))]);
        }
        if *nullable {
            expr = expr.chain("nullable", vec![]);
        }
        if let Some(value) = default {
            let value = match (mode, value) {
                // The coercing boolean validator parses "true"/"false".
                (Mode::Coerce, Value::Bool(b)) if self.is_boolean(node) => Value::String(b.to_string()),
                _ => value.clone(),
            };
            expr = expr.chain("default", vec![ValidatorExpr::Json(value)]);
        } else if *optional {
            expr = expr.chain("optional", vec![]);
        }
        if let Some(text) = description {
            expr = expr.chain("describe", vec![ValidatorExpr::string(text.as_str())]);
        }
        expr
    }

    fn is_boolean(&self, node: &SchemaNode) -> bool {
        matches!(
            self.components.deref(node).map(|n| &n.kind),
            Some(SchemaKind::Primitive(Primitive {
                kind: PrimitiveKind::Boolean,
                ..
            }))
        )
    }

    fn object(&self, shape: &ObjectShape, path: &str, mode: Mode) -> Result<ValidatorExpr> {
        let entries = shape
            .properties
            .iter()
            .map(|(name, prop)| {
                let prop_path = format!("{path}/properties/{}", escape_pointer(name));
                Ok((name.clone(), self.node(&prop.node, &prop_path, mode)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let expr = ValidatorExpr::z("object", vec![ValidatorExpr::Shape(entries)]);
        Ok(match &shape.additional {
            AdditionalPolicy::Unspecified => expr,
            AdditionalPolicy::Deny => expr.chain("strict", vec![]),
            AdditionalPolicy::Allow => expr.chain("passthrough", vec![]),
            AdditionalPolicy::Schema(extra) => {
                let extra = self.node(extra, &format!("{path}/additionalProperties"), mode)?;
                expr.chain("catchall", vec![extra])
            }
        })
    }

    fn array(&self, shape: &ArrayShape, path: &str, mode: Mode) -> Result<ValidatorExpr> {
        let element = self.node(&shape.element, &format!("{path}/items"), mode)?;
        let mut expr = ValidatorExpr::z("array", vec![element]);
        if let Some(min) = shape.min_items {
            expr = expr.chain("min", vec![ValidatorExpr::Raw(min.to_string())]);
        }
        if let Some(max) = shape.max_items {
            expr = expr.chain("max", vec![ValidatorExpr::Raw(max.to_string())]);
        }
        if shape.unique {
            expr = expr.chain(
                "refine",
                vec![
                    ValidatorExpr::Raw("(items) => new Set(items).size === items.length".into()),
                    ValidatorExpr::Json(json!({ "message": "Items must be unique" })),
                ],
            );
        }
        Ok(expr)
    }

    /// Record keys must be strings; Zod has no other key domain for JSON objects.
    fn record_key(&self, key: &SchemaNode, path: &str) -> Result<ValidatorExpr> {
        let resolved = self.components.deref(key).map(|n| &n.kind);
        let string_like = match resolved {
            Some(SchemaKind::Primitive(p)) => p.kind == PrimitiveKind::String,
            Some(SchemaKind::EnumOf(values)) => values.iter().all(Value::is_string),
            Some(SchemaKind::Literal(value)) => value.is_string(),
            _ => false,
        };
        if !string_like {
            return Err(Error::unsupported(path, "non-string record key"));
        }
        self.node(key, path, Mode::Strict)
    }

    fn primitive(&self, primitive: &Primitive, path: &str, mode: Mode) -> ValidatorExpr {
        match primitive.kind {
            PrimitiveKind::String => string(primitive, path),
            PrimitiveKind::Number | PrimitiveKind::Integer => {
                let mut expr = match mode {
                    Mode::Strict => ValidatorExpr::z("number", vec![]),
                    Mode::Coerce => ValidatorExpr::Call {
                        callee: "z.coerce.number".into(),
                        args: vec![],
                    },
                };
                if primitive.kind == PrimitiveKind::Integer {
                    expr = expr.chain("int", vec![]);
                }
                let c = &primitive.constraints;
                let bounds = [
                    ("min", c.minimum),
                    ("max", c.maximum),
                    ("gt", c.exclusive_minimum),
                    ("lt", c.exclusive_maximum),
                    ("multipleOf", c.multiple_of),
                ];
                for (method, bound) in bounds {
                    if let Some(n) = bound {
                        expr = expr.chain(method, vec![ValidatorExpr::number(n)]);
                    }
                }
                expr
            }
            PrimitiveKind::Boolean => match mode {
                Mode::Strict => ValidatorExpr::z("boolean", vec![]),
                Mode::Coerce => ValidatorExpr::z(
                    "enum",
                    vec![ValidatorExpr::Json(json!(["true", "false"]))],
                )
                .chain("transform", vec![ValidatorExpr::Raw("(v) => v === \"true\"".into())]),
            },
            PrimitiveKind::Null => ValidatorExpr::z("null", vec![]),
        }
    }

    fn union(
        &self,
        branches: &[SchemaNode],
        discriminator: Option<&str>,
        path: &str,
        mode: Mode,
    ) -> Result<ValidatorExpr> {
        match branches {
            [] => return Ok(ValidatorExpr::z("never", vec![])),
            [single] => return self.node(single, path, mode),
            _ => {}
        }
        let compiled = branches
            .iter()
            .enumerate()
            .map(|(i, b)| self.node(b, &format!("{path}/{i}"), mode))
            .collect::<Result<Vec<_>>>()?;

        if let Some(key) = discriminator {
            if self.is_discriminable(branches, key) {
                return Ok(ValidatorExpr::z(
                    "discriminatedUnion",
                    vec![ValidatorExpr::string(key), ValidatorExpr::Array(compiled)],
                ));
            }
            debug!(path, discriminator = key, "discriminator not usable, emitting plain union");
        }
        Ok(ValidatorExpr::z("union", vec![ValidatorExpr::Array(compiled)]))
    }

    /// Every branch is an object with a required literal-valued `key`, and no
    /// value appears in two branches.
    fn is_discriminable(&self, branches: &[SchemaNode], key: &str) -> bool {
        let mut seen = HashSet::new();
        for branch in branches {
            let Some(shape) = self.object_like(branch) else {
                return false;
            };
            let Some(prop) = shape.properties.get(key) else {
                return false;
            };
            let m = &prop.node.modifiers;
            if !prop.required || m.optional || m.nullable || m.default.is_some() {
                return false;
            }
            let values: Vec<&Value> = match &prop.node.kind {
                SchemaKind::Literal(value) if !value.is_null() => vec![value],
                SchemaKind::EnumOf(values) if values.len() == 1 || values.iter().all(Value::is_string) => {
                    values.iter().collect()
                }
                _ => return false,
            };
            for value in values {
                if !seen.insert(value.to_string()) {
                    return false;
                }
            }
        }
        true
    }

    /// The object shape behind a node whose compiled form stays a `ZodObject`.
    fn object_like<'n>(&'n self, node: &'n SchemaNode) -> Option<&'n ObjectShape> {
        let m = &node.modifiers;
        if m.optional || m.nullable || m.default.is_some() {
            return None;
        }
        match &node.kind {
            SchemaKind::Object(shape) => Some(shape),
            SchemaKind::Ref(target) if !target.lazy && !self.recursive.contains(&target.name) => {
                self.components
                    .get(&target.name)
                    .and_then(|component| self.object_like(component))
            }
            _ => None,
        }
    }

    fn intersection(&self, branches: &[SchemaNode], path: &str, mode: Mode) -> Result<ValidatorExpr> {
        match branches {
            [] => return Ok(ValidatorExpr::z("unknown", vec![])),
            [single] => return self.node(single, path, mode),
            _ => {}
        }
        let mut compiled = branches
            .iter()
            .enumerate()
            .map(|(i, b)| self.node(b, &format!("{path}/allOf/{i}"), mode))
            .collect::<Result<Vec<_>>>()?
            .into_iter();

        let mergeable = self.intersection == IntersectionPolicy::LaterWins
            && branches.iter().all(|b| self.object_like(b).is_some());

        let Some(first) = compiled.next() else {
            return Ok(ValidatorExpr::z("unknown", vec![]));
        };
        Ok(compiled.fold(first, |acc, next| {
            if mergeable {
                acc.chain("merge", vec![next])
            } else {
                ValidatorExpr::z("intersection", vec![acc, next])
            }
        }))
    }

    fn reference(&self, target: &RefTarget, path: &str, mode: Mode) -> Result<ValidatorExpr> {
        if mode == Mode::Coerce
            && let Some(component) = self.components.get(&target.name)
            && let Some(resolved) = self.components.deref(component)
            && let SchemaKind::Primitive(p) = &resolved.kind
            && matches!(
                p.kind,
                PrimitiveKind::Number | PrimitiveKind::Integer | PrimitiveKind::Boolean
            )
        {
            return self.node(resolved, path, mode);
        }
        let ident = ValidatorExpr::ident(self.names.schema_ident(&target.name)?);
        Ok(if target.lazy {
            ValidatorExpr::Lazy(Box::new(ident))
        } else {
            ident
        })
    }
}

fn string(primitive: &Primitive, path: &str) -> ValidatorExpr {
    let mut expr = ValidatorExpr::z("string", vec![]);
    if let Some(format) = primitive.format.as_deref() {
        match format {
            "ipv4" | "ipv6" => {
                let version = if format == "ipv4" { "v4" } else { "v6" };
                expr = expr.chain("ip", vec![ValidatorExpr::Json(json!({ "version": version }))]);
            }
            _ => match STRING_FORMATS.iter().find(|(name, _)| *name == format) {
                Some((_, method)) => expr = expr.chain(method, vec![]),
                None => debug!(path, format, "no refinement for string format"),
            },
        }
    }
    let c = &primitive.constraints;
    if let Some(min) = c.min_length {
        expr = expr.chain("min", vec![ValidatorExpr::Raw(min.to_string())]);
    }
    if let Some(max) = c.max_length {
        expr = expr.chain("max", vec![ValidatorExpr::Raw(max.to_string())]);
    }
    if let Some(pattern) = &c.pattern {
        expr = expr.chain(
            "regex",
            vec![ValidatorExpr::Raw(format!("new RegExp({})", js_string(pattern)))],
        );
    }
    expr
}

fn literal(value: &Value, path: &str) -> Result<ValidatorExpr> {
    match value {
        Value::Null => Ok(ValidatorExpr::z("null", vec![])),
        Value::Array(_) | Value::Object(_) => Err(Error::unsupported(path, "array or object literal")),
        scalar => Ok(ValidatorExpr::z("literal", vec![ValidatorExpr::Json(scalar.clone())])),
    }
}

fn enumeration(values: &[Value], path: &str) -> Result<ValidatorExpr> {
    match values {
        [] => Ok(ValidatorExpr::z("never", vec![])),
        [single] => literal(single, path),
        _ if values.iter().all(Value::is_string) => Ok(ValidatorExpr::z(
            "enum",
            vec![ValidatorExpr::Json(Value::Array(values.to_vec()))],
        )),
        _ => {
            let literals = values
                .iter()
                .map(|v| literal(v, path))
                .collect::<Result<Vec<_>>>()?;
            Ok(ValidatorExpr::z("union", vec![ValidatorExpr::Array(literals)]))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::CompileOptions;
    use crate::document::RawSchema;
    use crate::ir::Emit;
    use crate::ir::api::{ParamLocation, ParamStyle, SerializationStrategy, ValueShape};
    use crate::parse::parse_schema;
    use crate::resolve::{Resolution, resolve};
    use indexmap::IndexMap;

    struct Fixture {
        resolution: Resolution,
        names: NamingContext,
        intersection: IntersectionPolicy,
    }

    impl Fixture {
        fn new(components: Value) -> Self {
            Self::with_policy(components, IntersectionPolicy::LaterWins)
        }

        fn with_policy(components: Value, intersection: IntersectionPolicy) -> Self {
            let raw: IndexMap<String, RawSchema> = serde_json::from_value(components).unwrap();
            let table = raw
                .iter()
                .map(|(name, schema)| {
                    (name.clone(), parse_schema(schema, &format!("#/components/schemas/{name}")).unwrap())
                })
                .collect::<IndexMap<_, _>>();
            let resolution = resolve(ComponentTable::new(table)).unwrap();
            let mut names = NamingContext::new(&CompileOptions::default());
            names
                .register(&resolution.components, &resolution.recursive, &[])
                .unwrap();
            Self {
                resolution,
                names,
                intersection,
            }
        }

        fn compiler(&self) -> ValidatorCompiler<'_> {
            ValidatorCompiler::new(
                &self.resolution.components,
                &self.resolution.recursive,
                &self.names,
                self.intersection,
            )
        }

        fn compile(&self, schema: Value) -> Result<String> {
            let raw: RawSchema = serde_json::from_value(schema).unwrap();
            let node = parse_schema(&raw, "#/inline").unwrap();
            self.compiler().compile(&node, "#/inline").map(|e| e.emit())
        }

        fn component(&self, name: &str) -> String {
            let node = self.resolution.components.get(name).unwrap();
            self.compiler()
                .compile(node, &format!("#/components/schemas/{name}"))
                .unwrap()
                .emit()
        }
    }

    fn empty() -> Fixture {
        Fixture::new(json!({}))
    }

    #[test]
    fn test_object_with_required_and_optional() {
        let out = empty()
            .compile(json!({
                "type": "object",
                "required": ["test"],
                "properties": {
                    "test": { "type": "string" },
                    "count": { "type": "integer", "minimum": 0 }
                }
            }))
            .unwrap();
        assert_eq!(
            out,
            "z.object({\n  test: z.string(),\n  count: z.number().int().min(0).optional(),\n})"
        );
    }

    #[test]
    fn test_string_formats_and_constraints() {
        let f = empty();
        assert_eq!(
            f.compile(json!({ "type": "string", "format": "email", "minLength": 3 })).unwrap(),
            "z.string().email().min(3)"
        );
        assert_eq!(
            f.compile(json!({ "type": "string", "format": "ipv6" })).unwrap(),
            "z.string().ip({ version: \"v6\" })"
        );
        assert_eq!(
            f.compile(json!({ "type": "string", "format": "date-time" })).unwrap(),
            "z.string().datetime()"
        );
        assert_eq!(
            f.compile(json!({ "type": "string", "format": "hostname" })).unwrap(),
            "z.string()"
        );
        assert_eq!(
            f.compile(json!({ "type": "string", "pattern": "^a\\d+$" })).unwrap(),
            "z.string().regex(new RegExp(\"^a\\\\d+$\"))"
        );
    }

    #[test]
    fn test_numeric_bounds() {
        let out = empty()
            .compile(json!({
                "type": "number",
                "exclusiveMinimum": 0,
                "maximum": 10.5,
                "multipleOf": 0.5
            }))
            .unwrap();
        assert_eq!(out, "z.number().max(10.5).gt(0).multipleOf(0.5)");
    }

    #[test]
    fn test_modifier_order() {
        let out = empty()
            .compile(json!({
                "type": ["string", "null"],
                "readOnly": true,
                "default": "x",
                "description": "A value"
            }))
            .unwrap();
        assert_eq!(
            out,
            "z.string().openapi({ readOnly: true }).nullable().default(\"x\").describe(\"A value\")"
        );
    }

    #[test]
    fn test_enums_and_literals() {
        let f = empty();
        assert_eq!(
            f.compile(json!({ "enum": ["a", "b"] })).unwrap(),
            "z.enum([\"a\", \"b\"])"
        );
        assert_eq!(
            f.compile(json!({ "enum": [1, "b"] })).unwrap(),
            "z.union([z.literal(1), z.literal(\"b\")])"
        );
        assert_eq!(
            f.compile(json!({ "enum": ["only", null] })).unwrap(),
            "z.literal(\"only\").nullable()"
        );
        assert_eq!(f.compile(json!({ "const": 3 })).unwrap(), "z.literal(3)");
        assert!(matches!(
            f.compile(json!({ "const": { "a": 1 } })),
            Err(Error::UnsupportedConstruct { .. })
        ));
    }

    #[test]
    fn test_array_constraints() {
        let out = empty()
            .compile(json!({
                "type": "array",
                "items": { "type": "string" },
                "minItems": 1,
                "maxItems": 3,
                "uniqueItems": true
            }))
            .unwrap();
        assert_eq!(
            out,
            "z.array(z.string()).min(1).max(3).refine((items) => new Set(items).size === items.length, { message: \"Items must be unique\" })"
        );
    }

    #[test]
    fn test_tuple_and_record() {
        let f = empty();
        assert_eq!(
            f.compile(json!({ "type": "array", "prefixItems": [{ "type": "string" }, { "type": "number" }] }))
                .unwrap(),
            "z.tuple([z.string(), z.number()])"
        );
        assert_eq!(
            f.compile(json!({ "type": "object", "additionalProperties": { "type": "integer" } }))
                .unwrap(),
            "z.record(z.string(), z.number().int())"
        );
        assert!(matches!(
            f.compile(json!({
                "type": "object",
                "propertyNames": { "type": "integer" },
                "additionalProperties": { "type": "string" }
            })),
            Err(Error::UnsupportedConstruct { .. })
        ));
    }

    #[test]
    fn test_additional_properties_policies() {
        let f = empty();
        let strict = f
            .compile(json!({ "type": "object", "properties": { "a": { "type": "string" } }, "additionalProperties": false }))
            .unwrap();
        assert!(strict.ends_with("}).strict()"), "{strict}");
        let loose = f
            .compile(json!({ "type": "object", "properties": { "a": { "type": "string" } }, "additionalProperties": true }))
            .unwrap();
        assert!(loose.ends_with("}).passthrough()"), "{loose}");
        let catchall = f
            .compile(json!({
                "type": "object",
                "properties": { "a": { "type": "string" } },
                "additionalProperties": { "type": "number" }
            }))
            .unwrap();
        assert!(catchall.ends_with("}).catchall(z.number())"), "{catchall}");
    }

    #[test]
    fn test_discriminated_union() {
        let f = Fixture::new(json!({
            "Cat": {
                "type": "object",
                "required": ["kind"],
                "properties": { "kind": { "const": "cat" }, "lives": { "type": "integer" } }
            },
            "Dog": {
                "type": "object",
                "required": ["kind"],
                "properties": { "kind": { "enum": ["dog"] } }
            }
        }));
        let out = f
            .compile(json!({
                "oneOf": [
                    { "$ref": "#/components/schemas/Cat" },
                    { "$ref": "#/components/schemas/Dog" }
                ],
                "discriminator": { "propertyName": "kind" }
            }))
            .unwrap();
        assert_eq!(out, "z.discriminatedUnion(\"kind\", [CatSchema, DogSchema])");
    }

    #[test]
    fn test_discriminator_fallback_to_union() {
        let f = Fixture::new(json!({
            "Cat": {
                "type": "object",
                "properties": { "kind": { "const": "cat" } }
            },
            "Dog": {
                "type": "object",
                "required": ["kind"],
                "properties": { "kind": { "const": "dog" } }
            }
        }));
        // `kind` is optional on Cat, so a tagged union is not possible.
        let out = f
            .compile(json!({
                "oneOf": [
                    { "$ref": "#/components/schemas/Cat" },
                    { "$ref": "#/components/schemas/Dog" }
                ],
                "discriminator": { "propertyName": "kind" }
            }))
            .unwrap();
        assert_eq!(out, "z.union([CatSchema, DogSchema])");
    }

    #[test]
    fn test_intersection_policies() {
        let components = json!({
            "Base": { "type": "object", "properties": { "id": { "type": "string" } } },
            "Extra": { "type": "object", "properties": { "id": { "type": "number" } } }
        });
        let schema = json!({
            "allOf": [
                { "$ref": "#/components/schemas/Base" },
                { "$ref": "#/components/schemas/Extra" }
            ]
        });
        let later_wins = Fixture::new(components.clone());
        assert_eq!(later_wins.compile(schema.clone()).unwrap(), "BaseSchema.merge(ExtraSchema)");

        let all_hold = Fixture::with_policy(components, IntersectionPolicy::AllMustHold);
        assert_eq!(
            all_hold.compile(schema).unwrap(),
            "z.intersection(BaseSchema, ExtraSchema)"
        );
    }

    #[test]
    fn test_intersection_with_non_object_branch() {
        let f = Fixture::new(json!({
            "Named": { "type": "object", "properties": { "name": { "type": "string" } } },
            "Tags": { "type": "array", "items": { "type": "string" } }
        }));
        let out = f
            .compile(json!({
                "allOf": [
                    { "$ref": "#/components/schemas/Named" },
                    { "$ref": "#/components/schemas/Tags" }
                ]
            }))
            .unwrap();
        assert_eq!(out, "z.intersection(NamedSchema, TagsSchema)");
    }

    #[test]
    fn test_lazy_self_reference() {
        let f = Fixture::new(json!({
            "Node": {
                "type": "object",
                "required": ["children"],
                "properties": {
                    "children": { "type": "array", "items": { "$ref": "#/components/schemas/Node" } }
                }
            }
        }));
        assert_eq!(
            f.component("Node"),
            "z.object({\n  children: z.array(z.lazy(() => NodeSchema)),\n})"
        );
    }

    #[test]
    fn test_nullable_union_collapses() {
        let out = empty()
            .compile(json!({ "anyOf": [{ "type": "string" }, { "type": "null" }] }))
            .unwrap();
        assert_eq!(out, "z.string().nullable()");
    }

    #[test]
    fn test_parameter_coercion_and_metadata() {
        let f = Fixture::new(json!({ "Limit": { "type": "integer", "maximum": 100 } }));
        let compiler = f.compiler();
        let param = |name: &str, location, required, schema: SchemaNode, style, explode| ParameterNode {
            name: name.into(),
            location,
            required,
            description: None,
            style,
            explode,
            strategy: SerializationStrategy::RepeatedKey,
            shape: ValueShape::Scalar,
            schema,
        };

        let limit = param(
            "limit",
            ParamLocation::Query,
            false,
            SchemaNode::reference("Limit"),
            ParamStyle::Form,
            true,
        );
        assert_eq!(
            compiler.compile_parameter(&limit, "#/p").unwrap().emit(),
            "z.coerce.number().int().max(100).optional().openapi({ param: { name: \"limit\", in: \"query\" } })"
        );

        let raw: RawSchema = serde_json::from_value(json!({ "type": "boolean", "default": false })).unwrap();
        let verbose = param(
            "verbose",
            ParamLocation::Query,
            false,
            parse_schema(&raw, "#/p").unwrap(),
            ParamStyle::Form,
            false,
        );
        assert_eq!(
            compiler.compile_parameter(&verbose, "#/p").unwrap().emit(),
            "z.enum([\"true\", \"false\"]).transform((v) => v === \"true\").default(\"false\").openapi({ param: { name: \"verbose\", in: \"query\", style: \"form\", explode: false } })"
        );
    }

    #[test]
    fn test_missing_identifier_is_an_error() {
        let f = empty();
        let err = f
            .compiler()
            .compile(&SchemaNode::reference("Ghost"), "#/inline")
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { .. }));
    }
}
