//! Schema IR -> TypeScript types.
//!
//! Used for the structural helper types of recursive components in route
//! output, and for every type in client-hook output.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::Result;
use crate::ir::schema::{AdditionalPolicy, PrimitiveKind, SchemaKind, SchemaNode};
use crate::ir::types::{TsLiteral, TsPrimitive, TsProp, TsType};
use crate::naming::{ArtifactKind, NamingContext};

/// How component references are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefStyle {
    /// The component's type alias identifier (`Pet`).
    Alias,
    /// Route output: recursive components by their helper type (`NodeType`),
    /// everything else as `z.infer<typeof PetSchema>`. Properties with a
    /// default are required, matching the validator's output type.
    Inferred,
}

/// Schema IR to TypeScript types, for one reference style.
#[derive(Debug)]
pub struct TypeRenderer<'a> {
    recursive: &'a BTreeSet<String>,
    names: &'a NamingContext,
    style: RefStyle,
}

impl<'a> TypeRenderer<'a> {
    /// A renderer over the recursive component set and assigned names.
    pub fn new(recursive: &'a BTreeSet<String>, names: &'a NamingContext, style: RefStyle) -> Self {
        Self {
            recursive,
            names,
            style,
        }
    }

    /// The TypeScript type a node's validator accepts, nullability included.
    pub fn render(&self, node: &SchemaNode) -> Result<TsType> {
        let ty = self.kind(node)?;
        Ok(if node.modifiers.nullable { ty.nullable() } else { ty })
    }

    fn kind(&self, node: &SchemaNode) -> Result<TsType> {
        Ok(match &node.kind {
            SchemaKind::Object(shape) => {
                let props = shape
                    .properties
                    .iter()
                    .map(|(name, prop)| {
                        let has_default = prop.node.modifiers.default.is_some();
                        let optional = match self.style {
                            RefStyle::Alias => !prop.required,
                            RefStyle::Inferred => !prop.required && !has_default,
                        };
                        Ok(TsProp {
                            name: name.clone(),
                            ty: self.render(&prop.node)?,
                            optional,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                let object = TsType::Object(props);
                match shape.additional {
                    AdditionalPolicy::Allow | AdditionalPolicy::Schema(_) => TsType::Intersection(vec![
                        object,
                        TsType::Record {
                            key: Box::new(TsType::string()),
                            value: Box::new(TsType::unknown()),
                        },
                    ]),
                    AdditionalPolicy::Unspecified | AdditionalPolicy::Deny => object,
                }
            }
            SchemaKind::Array(shape) => TsType::Array(Box::new(self.render(&shape.element)?)),
            SchemaKind::Tuple(elements) => TsType::Tuple(
                elements
                    .iter()
                    .map(|el| self.render(el))
                    .collect::<Result<Vec<_>>>()?,
            ),
            SchemaKind::Record { key, value } => TsType::Record {
                key: Box::new(self.render(key)?),
                value: Box::new(self.render(value)?),
            },
            SchemaKind::Primitive(p) => TsType::Primitive(match p.kind {
                PrimitiveKind::String => TsPrimitive::String,
                PrimitiveKind::Number | PrimitiveKind::Integer => TsPrimitive::Number,
                PrimitiveKind::Boolean => TsPrimitive::Boolean,
                PrimitiveKind::Null => TsPrimitive::Null,
            }),
            SchemaKind::Literal(value) => literal(value),
            SchemaKind::EnumOf(values) => match values.as_slice() {
                [] => TsType::Ref("never".into()),
                [single] => literal(single),
                many => TsType::Union(many.iter().map(literal).collect()),
            },
            SchemaKind::Union { branches, .. } => match branches.as_slice() {
                [] => TsType::Ref("never".into()),
                [single] => self.render(single)?,
                many => TsType::Union(many.iter().map(|b| self.render(b)).collect::<Result<Vec<_>>>()?),
            },
            SchemaKind::Intersection(branches) => match branches.as_slice() {
                [] => TsType::unknown(),
                [single] => self.render(single)?,
                many => TsType::Intersection(
                    many.iter().map(|b| self.render(b)).collect::<Result<Vec<_>>>()?,
                ),
            },
            SchemaKind::Ref(target) => match self.style {
                RefStyle::Alias => TsType::Ref(self.names.type_ident(&target.name)?.to_string()),
                RefStyle::Inferred if self.recursive.contains(&target.name) => TsType::Ref(
                    self.names
                        .ident(&target.name, ArtifactKind::RecursiveType)?
                        .name
                        .clone(),
                ),
                RefStyle::Inferred => TsType::Ref(format!(
                    "z.infer<typeof {}>",
                    self.names.schema_ident(&target.name)?
                )),
            },
            SchemaKind::Any => TsType::unknown(),
        })
    }
}

fn literal(value: &Value) -> TsType {
    match value {
        Value::String(s) => TsType::Literal(TsLiteral::String(s.clone())),
        Value::Bool(b) => TsType::Literal(TsLiteral::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => TsType::Literal(TsLiteral::Int(i)),
            None => TsType::Literal(TsLiteral::Number(n.as_f64().unwrap_or_default())),
        },
        Value::Null => TsType::Primitive(TsPrimitive::Null),
        Value::Array(_) | Value::Object(_) => TsType::unknown(),
    }
}
