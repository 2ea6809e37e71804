//! OpenAPI document structs for serde deserialization.
//!
//! This module defines the subset of OpenAPI 3.0/3.1 the compiler consumes.
//! Maps are `IndexMap`s so that document order survives deserialization;
//! emission order (and therefore byte-for-byte reproducibility) depends on it.

use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Root OpenAPI document.
#[derive(Debug, Deserialize)]
pub struct RawDocument {
    /// Declared OpenAPI version (`3.0.x` or `3.1.x`).
    pub openapi: Option<String>,
    /// Swagger 2.0 marker, only read to produce a useful error.
    pub swagger: Option<String>,
    /// `paths`, keyed by path template.
    #[serde(default)]
    pub paths: IndexMap<String, RawPathItem>,
    /// Reusable definitions.
    pub components: Option<RawComponents>,
    /// Document-level security requirements.
    pub security: Option<Vec<SecurityRequirement>>,
}

/// One security requirement: scheme name -> required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// Either an inline object or a `$ref` to a reusable component.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// `{ "$ref": "#/components/..." }`
    Ref {
        /// Target pointer.
        #[serde(rename = "$ref")]
        reference: String,
    },
    /// Inline definition.
    Item(T),
}

/// Components section containing reusable definitions.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComponents {
    /// `components.schemas`
    #[serde(default)]
    pub schemas: IndexMap<String, RawSchema>,
    /// `components.parameters`
    #[serde(default)]
    pub parameters: IndexMap<String, RefOr<RawParameter>>,
    /// `components.requestBodies`
    #[serde(default)]
    pub request_bodies: IndexMap<String, RefOr<RawRequestBody>>,
    /// `components.responses`
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<RawResponse>>,
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Default, Deserialize)]
pub struct RawPathItem {
    /// `GET`
    pub get: Option<RawOperation>,
    /// `PUT`
    pub put: Option<RawOperation>,
    /// `POST`
    pub post: Option<RawOperation>,
    /// `DELETE`
    pub delete: Option<RawOperation>,
    /// `OPTIONS`
    pub options: Option<RawOperation>,
    /// `HEAD`
    pub head: Option<RawOperation>,
    /// `PATCH`
    pub patch: Option<RawOperation>,
    /// `TRACE`
    pub trace: Option<RawOperation>,
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<RefOr<RawParameter>>,
}

/// An API operation (endpoint).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    /// Stable name; derived from method and path when absent.
    pub operation_id: Option<String>,
    /// One-line summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Marks the operation as deprecated.
    #[serde(default)]
    pub deprecated: bool,
    /// Operation parameters; these override path-level ones by name and location.
    #[serde(default)]
    pub parameters: Vec<RefOr<RawParameter>>,
    /// Request body.
    pub request_body: Option<RefOr<RawRequestBody>>,
    /// Responses keyed by status code or `default`.
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<RawResponse>>,
    /// `None` inherits document security; `Some(vec![])` opts out.
    pub security: Option<Vec<SecurityRequirement>>,
}

/// A parameter (path, query, header or cookie).
#[derive(Debug, Clone, Deserialize)]
pub struct RawParameter {
    /// Parameter name.
    pub name: String,
    /// `in`: path, query, header or cookie.
    #[serde(rename = "in")]
    pub location: String,
    /// Path parameters must set this.
    #[serde(default)]
    pub required: bool,
    /// Description.
    pub description: Option<String>,
    /// Serialization style; defaults per location.
    pub style: Option<String>,
    /// Defaults to `true` for the `form` style only.
    pub explode: Option<bool>,
    /// Value schema.
    pub schema: Option<RawSchema>,
}

/// A request body definition.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRequestBody {
    /// Whether the body must be sent.
    #[serde(default)]
    pub required: bool,
    /// Description.
    pub description: Option<String>,
    /// Body schemas keyed by media type.
    #[serde(default)]
    pub content: IndexMap<String, RawMediaType>,
}

/// A response definition.
#[derive(Debug, Clone, Deserialize)]
pub struct RawResponse {
    /// Description.
    pub description: Option<String>,
    /// Response schemas keyed by media type.
    #[serde(default)]
    pub content: IndexMap<String, RawMediaType>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Deserialize)]
pub struct RawMediaType {
    /// Payload schema.
    pub schema: Option<RawSchema>,
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchema {
    /// The type of the schema (string, number, integer, boolean, object, array, null).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Title.
    pub title: Option<String>,
    /// Description, carried into `.describe()`.
    pub description: Option<String>,

    /// Properties for object types.
    pub properties: Option<IndexMap<String, RawSchema>>,

    /// Required property names for object types.
    pub required: Option<Vec<String>>,

    /// Additional properties for object types (for Record/dict types).
    pub additional_properties: Option<AdditionalProperties>,

    /// Key schema for record types.
    pub property_names: Option<Box<RawSchema>>,

    /// Item schema for array types (a list here is the pre-3.1 tuple form).
    pub items: Option<Items>,

    /// Tuple element schemas (3.1).
    pub prefix_items: Option<Vec<RawSchema>>,

    /// Allowed values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,

    /// The single allowed value.
    #[serde(rename = "const")]
    pub const_value: Option<Value>,

    /// Union branches.
    pub any_of: Option<Vec<RawSchema>>,
    /// Exclusive union branches.
    pub one_of: Option<Vec<RawSchema>>,
    /// Intersected branches.
    pub all_of: Option<Vec<RawSchema>>,

    /// Negation has no target mapping; kept only to be rejected.
    pub not: Option<Value>,
    /// Conditional schemas have no target mapping; kept only to be rejected.
    #[serde(rename = "if")]
    pub if_schema: Option<Value>,

    /// Tag property for `oneOf`/`anyOf`.
    pub discriminator: Option<Discriminator>,

    /// Format hint (e.g., date-time, uuid).
    pub format: Option<String>,

    /// Default applied when the value is absent.
    pub default: Option<Value>,
    /// Example value.
    pub example: Option<Value>,

    /// OpenAPI 3.0 nullable flag (3.1 uses type arrays instead).
    pub nullable: Option<bool>,
    /// Only appears in responses.
    pub read_only: Option<bool>,
    /// Only appears in requests.
    pub write_only: Option<bool>,

    /// ECMA-262 regular expression.
    pub pattern: Option<String>,
    /// Minimum string length.
    pub min_length: Option<u64>,
    /// Maximum string length.
    pub max_length: Option<u64>,
    /// Inclusive lower bound.
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    pub maximum: Option<f64>,
    /// Exclusive lower bound.
    pub exclusive_minimum: Option<ExclusiveBound>,
    /// Exclusive upper bound.
    pub exclusive_maximum: Option<ExclusiveBound>,
    /// Value must be a multiple of this.
    pub multiple_of: Option<f64>,
    /// Minimum array length.
    pub min_items: Option<u64>,
    /// Maximum array length.
    pub max_items: Option<u64>,
    /// Array elements must be distinct.
    pub unique_items: Option<bool>,
}

/// Discriminator for polymorphic schemas (oneOf/anyOf).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    /// The property name that contains the discriminator value.
    pub property_name: String,
    /// Optional mapping from discriminator values to schema refs.
    pub mapping: Option<IndexMap<String, String>>,
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `"string"`
    Single(String),
    /// `["string", "null"]`
    Multiple(Vec<String>),
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` or `false`
    Bool(bool),
    /// Schema for every extra value.
    Schema(Box<RawSchema>),
}

/// `items` is a schema, a legacy tuple list, or `false` after `prefixItems`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Items {
    /// `false` closes the tuple after `prefixItems`.
    Bool(bool),
    /// Pre-3.1 tuple form.
    Tuple(Vec<RawSchema>),
    /// Element schema.
    Schema(Box<RawSchema>),
}

/// 3.0 uses a boolean flag next to `minimum`; 3.1 carries the bound itself.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    /// 3.0: applies to `minimum`/`maximum`.
    Flag(bool),
    /// 3.1: the bound itself.
    Value(f64),
}

impl RawDocument {
    /// Parse a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let de = &mut serde_json::Deserializer::from_str(json);
        let doc: Self = deserialize_with_path(de)?;
        doc.check_version()
    }

    /// Parse a document from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let de = serde_yaml::Deserializer::from_str(yaml);
        let doc: Self = deserialize_with_path(de)?;
        doc.check_version()
    }

    fn check_version(self) -> Result<Self> {
        match (&self.openapi, &self.swagger) {
            (Some(version), _) if version.starts_with("3.") => Ok(self),
            (Some(version), _) => Err(Error::DocumentParse(format!(
                "OpenAPI version {version} not supported (expected 3.x)"
            ))),
            (None, Some(version)) => Err(Error::DocumentParse(format!(
                "Swagger {version} documents are not supported (expected OpenAPI 3.x)"
            ))),
            (None, None) => Err(Error::DocumentParse(
                "missing 'openapi' version field".to_string(),
            )),
        }
    }
}

/// Deserialize with the document path of the failing field in the error.
fn deserialize_with_path<'de, D, T>(de: D) -> Result<T>
where
    D: serde::Deserializer<'de>,
    T: DeserializeOwned,
{
    serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        Error::DocumentParse(format!("at {path}: {}", err.into_inner()))
    })
}

impl RawSchema {
    /// True when the schema admits `null` via the 3.0 flag or a 3.1 type array.
    pub fn declares_null(&self) -> bool {
        if self.nullable == Some(true) {
            return true;
        }
        matches!(&self.schema_type, Some(SchemaType::Multiple(types)) if types.iter().any(|t| t == "null"))
    }

    /// True for `{ "type": "null" }` branches used to express nullability in unions.
    pub fn is_null_type(&self) -> bool {
        match &self.schema_type {
            Some(SchemaType::Single(t)) => t == "null",
            Some(SchemaType::Multiple(types)) => types.iter().all(|t| t == "null"),
            None => false,
        }
    }
}
