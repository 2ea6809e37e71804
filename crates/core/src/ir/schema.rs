//! Schema-level IR.
//!
//! Every supported JSON-Schema/OpenAPI construct is normalized into a
//! [`SchemaNode`]: a [`SchemaKind`] tagged variant plus the [`Modifiers`] that
//! can decorate any node. Circularity is only reachable through
//! [`SchemaKind::Ref`] edges; structural nesting is always finite.

use indexmap::IndexMap;
use serde_json::Value;

/// A normalized schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Structural shape.
    pub kind: SchemaKind,
    /// Decorations.
    pub modifiers: Modifiers,
}

/// Decorations that apply to any node kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modifiers {
    /// Absent values are accepted (non-required property or parameter).
    pub optional: bool,
    /// `null` is accepted.
    pub nullable: bool,
    /// Value substituted when absent.
    pub default: Option<Value>,
    /// `readOnly: true`
    pub read_only: bool,
    /// `writeOnly: true`
    pub write_only: bool,
    /// Description.
    pub description: Option<String>,
}

/// The structural shape of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// `type: object` with declared properties.
    Object(ObjectShape),
    /// `type: array` with one element schema.
    Array(ArrayShape),
    /// `prefixItems` or a pre-3.1 `items` list.
    Tuple(Vec<SchemaNode>),
    /// Object with no declared properties and an `additionalProperties` or `propertyNames` schema.
    Record {
        /// Key schema, from `propertyNames` or `string`.
        key: Box<SchemaNode>,
        /// Value schema.
        value: Box<SchemaNode>,
    },
    /// A scalar.
    Primitive(Primitive),
    /// `const` value.
    Literal(Value),
    /// `enum` values, `null` already split out into the nullable modifier.
    EnumOf(Vec<Value>),
    /// `anyOf` or `oneOf`.
    Union {
        /// Branches in document order.
        branches: Vec<SchemaNode>,
        /// Tag property shared by every branch.
        discriminator: Option<String>,
    },
    /// `allOf` branches, plus sibling properties as one more branch.
    Intersection(Vec<SchemaNode>),
    /// A component reference.
    Ref(RefTarget),
    /// A schema with no constraints at all (`{}`).
    Any,
}

/// A named reference into the component table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefTarget {
    /// Component name.
    pub name: String,
    /// Set by the resolver on edges that close a cycle.
    pub lazy: bool,
}

/// Object properties in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectShape {
    /// Declared properties.
    pub properties: IndexMap<String, Property>,
    /// Undeclared keys.
    pub additional: AdditionalPolicy,
}

/// A single object property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property schema.
    pub node: SchemaNode,
    /// Listed in `required`.
    pub required: bool,
}

/// What an object does with keys it does not declare.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdditionalPolicy {
    /// Not stated: unknown keys are stripped.
    #[default]
    Unspecified,
    /// `additionalProperties: true`
    Allow,
    /// `additionalProperties: false`
    Deny,
    /// `additionalProperties: {schema}` alongside declared properties.
    Schema(Box<SchemaNode>),
}

/// Array element and item-count constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayShape {
    /// Element schema.
    pub element: Box<SchemaNode>,
    /// Minimum length.
    pub min_items: Option<u64>,
    /// Maximum length.
    pub max_items: Option<u64>,
    /// `uniqueItems: true`
    pub unique: bool,
}

/// A scalar type with its format and constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    /// JSON type.
    pub kind: PrimitiveKind,
    /// `format` hint.
    pub format: Option<String>,
    /// Range, length and pattern constraints.
    pub constraints: Constraints,
}

/// Scalar JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
}

/// Range, length and pattern constraints for scalars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    /// Minimum string length.
    pub min_length: Option<u64>,
    /// Maximum string length.
    pub max_length: Option<u64>,
    /// String pattern.
    pub pattern: Option<String>,
    /// Inclusive lower bound.
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    pub maximum: Option<f64>,
    /// Exclusive lower bound, normalized from both 3.0 and 3.1 forms.
    pub exclusive_minimum: Option<f64>,
    /// Exclusive upper bound, normalized from both 3.0 and 3.1 forms.
    pub exclusive_maximum: Option<f64>,
    /// Value must be a multiple of this.
    pub multiple_of: Option<f64>,
}

/// Immutable map from declared component name to its normalized node.
///
/// Built once from `#/components/schemas`; the single source of truth for
/// [`SchemaKind::Ref`] resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentTable {
    components: IndexMap<String, SchemaNode>,
}

impl SchemaNode {
    /// A node with no modifiers.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            modifiers: Modifiers::default(),
        }
    }

    /// An unconstrained scalar.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(SchemaKind::Primitive(Primitive {
            kind,
            format: None,
            constraints: Constraints::default(),
        }))
    }

    /// A non-lazy reference to a component.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(SchemaKind::Ref(RefTarget {
            name: name.into(),
            lazy: false,
        }))
    }

    /// Visit every `Ref` edge reachable without crossing into other components.
    pub fn for_each_ref<'a>(&'a self, f: &mut impl FnMut(&'a RefTarget)) {
        match &self.kind {
            SchemaKind::Ref(target) => f(target),
            SchemaKind::Object(shape) => {
                for prop in shape.properties.values() {
                    prop.node.for_each_ref(f);
                }
                if let AdditionalPolicy::Schema(extra) = &shape.additional {
                    extra.for_each_ref(f);
                }
            }
            SchemaKind::Array(shape) => shape.element.for_each_ref(f),
            SchemaKind::Tuple(items)
            | SchemaKind::Intersection(items)
            | SchemaKind::Union {
                branches: items, ..
            } => {
                for item in items {
                    item.for_each_ref(f);
                }
            }
            SchemaKind::Record { key, value } => {
                key.for_each_ref(f);
                value.for_each_ref(f);
            }
            SchemaKind::Primitive(_)
            | SchemaKind::Literal(_)
            | SchemaKind::EnumOf(_)
            | SchemaKind::Any => {}
        }
    }

    /// Mutable counterpart of [`SchemaNode::for_each_ref`].
    pub fn for_each_ref_mut(&mut self, f: &mut impl FnMut(&mut RefTarget)) {
        match &mut self.kind {
            SchemaKind::Ref(target) => f(target),
            SchemaKind::Object(shape) => {
                for prop in shape.properties.values_mut() {
                    prop.node.for_each_ref_mut(f);
                }
                if let AdditionalPolicy::Schema(extra) = &mut shape.additional {
                    extra.for_each_ref_mut(f);
                }
            }
            SchemaKind::Array(shape) => shape.element.for_each_ref_mut(f),
            SchemaKind::Tuple(items)
            | SchemaKind::Intersection(items)
            | SchemaKind::Union {
                branches: items, ..
            } => {
                for item in items {
                    item.for_each_ref_mut(f);
                }
            }
            SchemaKind::Record { key, value } => {
                key.for_each_ref_mut(f);
                value.for_each_ref_mut(f);
            }
            SchemaKind::Primitive(_)
            | SchemaKind::Literal(_)
            | SchemaKind::EnumOf(_)
            | SchemaKind::Any => {}
        }
    }

    /// Names of all components this node references, in first-seen order.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        self.for_each_ref(&mut |target| {
            if !names.contains(&target.name.as_str()) {
                names.push(&target.name);
            }
        });
        names
    }
}

impl ComponentTable {
    /// Wrap normalized components, keeping their order.
    pub fn new(components: IndexMap<String, SchemaNode>) -> Self {
        Self { components }
    }

    /// Look up a component by declared name.
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.components.get(name)
    }

    /// Whether `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Components in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.components.iter()
    }

    /// Component names in document order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.components.keys()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the document declares no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Follow `Ref` chains to the first non-reference node.
    ///
    /// Stops after visiting every component once, so a pure alias cycle
    /// (`A = B`, `B = A`) returns `None` instead of looping.
    pub fn deref<'a>(&'a self, node: &'a SchemaNode) -> Option<&'a SchemaNode> {
        let mut current = node;
        for _ in 0..=self.components.len() {
            match &current.kind {
                SchemaKind::Ref(target) => current = self.components.get(&target.name)?,
                _ => return Some(current),
            }
        }
        None
    }

    pub(crate) fn into_inner(self) -> IndexMap<String, SchemaNode> {
        self.components
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn object(props: Vec<(&str, SchemaNode, bool)>) -> SchemaNode {
        SchemaNode::new(SchemaKind::Object(ObjectShape {
            properties: props
                .into_iter()
                .map(|(name, node, required)| (name.to_string(), Property { node, required }))
                .collect(),
            additional: AdditionalPolicy::Unspecified,
        }))
    }

    #[test]
    fn test_referenced_names_dedup_in_order() {
        let node = object(vec![
            ("b", SchemaNode::reference("B"), true),
            ("a", SchemaNode::reference("A"), true),
            ("b2", SchemaNode::reference("B"), false),
        ]);
        assert_eq!(node.referenced_names(), vec!["B", "A"]);
    }

    #[test]
    fn test_for_each_ref_mut_marks_nested() {
        let mut node = SchemaNode::new(SchemaKind::Array(ArrayShape {
            element: Box::new(SchemaNode::reference("Node")),
            min_items: None,
            max_items: None,
            unique: false,
        }));
        node.for_each_ref_mut(&mut |target| target.lazy = true);
        let SchemaKind::Array(shape) = &node.kind else {
            panic!("expected array");
        };
        assert!(matches!(&shape.element.kind, SchemaKind::Ref(t) if t.lazy));
    }

    #[test]
    fn test_deref_follows_aliases_and_stops_on_cycles() {
        let mut components = IndexMap::new();
        components.insert("Alias".to_string(), SchemaNode::reference("Target"));
        components.insert(
            "Target".to_string(),
            SchemaNode::primitive(PrimitiveKind::String),
        );
        components.insert("Loop1".to_string(), SchemaNode::reference("Loop2"));
        components.insert("Loop2".to_string(), SchemaNode::reference("Loop1"));
        let table = ComponentTable::new(components);

        let alias = SchemaNode::reference("Alias");
        let resolved = table.deref(&alias).unwrap();
        assert!(matches!(resolved.kind, SchemaKind::Primitive(_)));

        let looped = SchemaNode::reference("Loop1");
        assert!(table.deref(&looped).is_none());
    }
}
