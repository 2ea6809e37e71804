//! Operation-level IR.
//!
//! One [`OperationNode`] per path/method pair. Nothing here knows about Zod,
//! Hono or any client library; the emitters in `render` consume it read-only.

use indexmap::IndexMap;

use super::schema::SchemaNode;
use crate::document::SecurityRequirement;

/// A schema reference: either a `Ref` node naming a component or an inline node.
pub type SchemaRef = SchemaNode;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
    /// `TRACE`
    Trace,
}

impl HttpMethod {
    /// Path item field order.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Uppercase form used in log fields and error labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lowercase form used by `createRoute` and derived operation ids.
    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }

    /// Only GET operations can be cached queries.
    pub fn is_query(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }
}

/// Normalized API operation
#[derive(Debug, Clone)]
pub struct OperationNode {
    /// `operationId`, or derived from method and path
    pub id: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// URL path as written in the document (e.g., "/items/{itemId}")
    pub path: String,
    /// Parsed path template
    pub path_template: Vec<PathPart>,
    /// One-line summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Marks the operation as deprecated.
    pub deprecated: bool,
    /// Grouping tags.
    pub tags: Vec<String>,
    /// Path-item and operation parameters, merged
    pub parameters: Vec<ParameterNode>,
    /// Request body, if any.
    pub request_body: Option<RequestBodyNode>,
    /// Status code -> response, in document order
    pub responses: IndexMap<String, ResponseNode>,
    /// Effective security requirements (document-level fallback applied)
    pub security: Vec<SecurityRequirement>,
}

/// Path template part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPart {
    /// Static string
    Static(String),
    /// `{name}` placeholder
    Param(String),
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    /// `in: path`
    Path,
    /// `in: query`
    Query,
    /// `in: header`
    Header,
    /// `in: cookie`
    Cookie,
}

impl ParamLocation {
    /// The `in` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        }
    }

    /// Parse an `in` value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            "cookie" => Some(ParamLocation::Cookie),
            _ => None,
        }
    }

    /// Style used when the document does not state one.
    pub fn default_style(&self) -> ParamStyle {
        match self {
            ParamLocation::Query | ParamLocation::Cookie => ParamStyle::Form,
            ParamLocation::Path | ParamLocation::Header => ParamStyle::Simple,
        }
    }
}

/// OpenAPI parameter `style`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `form`
    Form,
    /// `simple`
    Simple,
    /// `label`
    Label,
    /// `matrix`
    Matrix,
    /// `spaceDelimited`
    SpaceDelimited,
    /// `pipeDelimited`
    PipeDelimited,
    /// `deepObject`
    DeepObject,
}

impl ParamStyle {
    /// Parse a `style` value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "form" => Some(ParamStyle::Form),
            "simple" => Some(ParamStyle::Simple),
            "label" => Some(ParamStyle::Label),
            "matrix" => Some(ParamStyle::Matrix),
            "spaceDelimited" => Some(ParamStyle::SpaceDelimited),
            "pipeDelimited" => Some(ParamStyle::PipeDelimited),
            "deepObject" => Some(ParamStyle::DeepObject),
            _ => None,
        }
    }

    /// The `style` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamStyle::Form => "form",
            ParamStyle::Simple => "simple",
            ParamStyle::Label => "label",
            ParamStyle::Matrix => "matrix",
            ParamStyle::SpaceDelimited => "spaceDelimited",
            ParamStyle::PipeDelimited => "pipeDelimited",
            ParamStyle::DeepObject => "deepObject",
        }
    }

    /// `explode` when the document does not state it.
    pub fn default_explode(&self) -> bool {
        matches!(self, ParamStyle::Form)
    }
}

/// How a parameter value is written onto the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationStrategy {
    /// `ids=1&ids=2`
    RepeatedKey,
    /// `ids=1,2`
    CommaJoined,
    /// `ids=1|2`
    PipeJoined,
    /// `ids=1%202`
    SpaceJoined,
    /// `filter[status]=open`
    DeepObject,
    /// One key per property: `status=open&limit=2`
    ExplodedProperties,
    /// Keys and values flattened into one list: `status,open,limit,2`
    PairsJoined,
    /// `status=open,limit=2`
    AssignmentsJoined,
}

/// Coarse shape of a parameter value, after following references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Anything that is not an array or an object.
    Scalar,
    /// An array or a tuple.
    Array,
    /// An object, a record or an intersection.
    Object,
}

/// Single parameter definition
#[derive(Debug, Clone)]
pub struct ParameterNode {
    /// Name as written in the document (used on the wire)
    pub name: String,
    /// Where the parameter is sent.
    pub location: ParamLocation,
    /// Whether the parameter must be present.
    pub required: bool,
    /// Description.
    pub description: Option<String>,
    /// Effective style.
    pub style: ParamStyle,
    /// Effective `explode`.
    pub explode: bool,
    /// Wire encoding derived from style, explode and shape.
    pub strategy: SerializationStrategy,
    /// Value shape.
    pub shape: ValueShape,
    /// Value schema.
    pub schema: SchemaRef,
}

/// Request body with one schema per content type
#[derive(Debug, Clone)]
pub struct RequestBodyNode {
    /// Whether the body must be sent.
    pub required: bool,
    /// Description.
    pub description: Option<String>,
    /// Schemas keyed by media type, in document order.
    pub content: IndexMap<String, SchemaRef>,
}

/// One response with one schema per content type
#[derive(Debug, Clone)]
pub struct ResponseNode {
    /// Description; empty when the document has none.
    pub description: String,
    /// Schemas keyed by media type, in document order.
    pub content: IndexMap<String, SchemaRef>,
}

/// Response content type determines how to parse the response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseContentType {
    /// JSON response - use res.json()
    Json,
    /// Plain text response - use res.text()
    Text,
    /// Binary/blob response - use res.blob()
    Blob,
}

impl ResponseContentType {
    /// Classify a media type; parameters after `;` are ignored.
    pub fn from_media_type(media_type: &str) -> Self {
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        if essence == "application/json" || essence.ends_with("+json") {
            ResponseContentType::Json
        } else if essence.starts_with("text/") {
            ResponseContentType::Text
        } else {
            ResponseContentType::Blob
        }
    }

    /// `Response` method that reads the body.
    pub fn decode_method(&self) -> &'static str {
        match self {
            ResponseContentType::Json => "json",
            ResponseContentType::Text => "text",
            ResponseContentType::Blob => "blob",
        }
    }
}

/// Request body content type determines how to serialize the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyContentType {
    /// JSON body - use JSON.stringify()
    Json,
    /// multipart/form-data - pass FormData directly
    FormData,
    /// application/x-www-form-urlencoded - use URLSearchParams
    UrlEncoded,
}

impl BodyContentType {
    /// Classify a media type; `None` when it cannot be encoded.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        match essence {
            "multipart/form-data" => Some(BodyContentType::FormData),
            "application/x-www-form-urlencoded" => Some(BodyContentType::UrlEncoded),
            e if e == "application/json" || e.ends_with("+json") => Some(BodyContentType::Json),
            _ => None,
        }
    }
}

/// Statuses whose content becomes a client hook's data, in priority order.
pub const SUCCESS_STATUS_PRIORITY: [&str; 8] =
    ["200", "201", "202", "203", "206", "207", "default", "2XX"];

/// The response a client hook decodes.
#[derive(Debug, Clone)]
pub struct ResponseSelection<'a> {
    /// `None` when the operation returns no content.
    pub schema: Option<&'a SchemaRef>,
    /// How the body is decoded.
    pub content_type: ResponseContentType,
    /// A 204 exists alongside a content response.
    pub has_void_status: bool,
}

impl OperationNode {
    /// GET without a request body: a cached query in client hooks.
    pub fn is_query(&self) -> bool {
        self.method.is_query() && self.request_body.is_none()
    }

    /// Pick the success response a client decodes.
    pub fn select_response(&self) -> ResponseSelection<'_> {
        let has_204 = self.responses.contains_key("204");
        for status in SUCCESS_STATUS_PRIORITY {
            let Some(response) = self.responses.get(status) else {
                continue;
            };
            if let Some((media_type, schema)) = response.content.first() {
                return ResponseSelection {
                    schema: Some(schema),
                    content_type: ResponseContentType::from_media_type(media_type),
                    has_void_status: has_204,
                };
            }
        }
        ResponseSelection {
            schema: None,
            content_type: ResponseContentType::Json,
            has_void_status: false,
        }
    }

    /// Pick the request body encoding a client sends, preferring JSON.
    pub fn select_body(&self) -> Option<(BodyContentType, &SchemaRef)> {
        let body = self.request_body.as_ref()?;
        let mut fallback = None;
        for (media_type, schema) in &body.content {
            match BodyContentType::from_media_type(media_type) {
                Some(BodyContentType::Json) => return Some((BodyContentType::Json, schema)),
                Some(kind) if fallback.is_none() => fallback = Some((kind, schema)),
                _ => {}
            }
        }
        fallback.or_else(|| {
            body.content
                .first()
                .map(|(_, schema)| (BodyContentType::Json, schema))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ir::schema::PrimitiveKind;

    fn response(content: &[(&str, SchemaNode)]) -> ResponseNode {
        ResponseNode {
            description: String::new(),
            content: content
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    fn operation(responses: Vec<(&str, ResponseNode)>) -> OperationNode {
        OperationNode {
            id: "op".into(),
            method: HttpMethod::Get,
            path: "/".into(),
            path_template: vec![PathPart::Static("/".into())],
            summary: None,
            description: None,
            deprecated: false,
            tags: vec![],
            parameters: vec![],
            request_body: None,
            responses: responses
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            security: vec![],
        }
    }

    #[test]
    fn test_select_response_priority() {
        let op = operation(vec![
            ("default", response(&[("text/plain", SchemaNode::primitive(PrimitiveKind::String))])),
            ("201", response(&[("application/json", SchemaNode::reference("Item"))])),
            ("204", response(&[])),
        ]);
        let selection = op.select_response();
        assert_eq!(selection.content_type, ResponseContentType::Json);
        assert!(selection.has_void_status);
        assert_eq!(selection.schema, Some(&SchemaNode::reference("Item")));
    }

    #[test]
    fn test_select_response_void() {
        let op = operation(vec![("204", response(&[]))]);
        assert!(op.select_response().schema.is_none());
    }

    #[test]
    fn test_content_type_classification() {
        assert_eq!(
            ResponseContentType::from_media_type("application/problem+json"),
            ResponseContentType::Json
        );
        assert_eq!(
            ResponseContentType::from_media_type("text/csv; charset=utf-8"),
            ResponseContentType::Text
        );
        assert_eq!(
            ResponseContentType::from_media_type("application/octet-stream"),
            ResponseContentType::Blob
        );
        assert_eq!(
            BodyContentType::from_media_type("multipart/form-data"),
            Some(BodyContentType::FormData)
        );
        assert_eq!(BodyContentType::from_media_type("image/png"), None);
    }

    #[test]
    fn test_default_styles() {
        assert_eq!(ParamLocation::Query.default_style(), ParamStyle::Form);
        assert_eq!(ParamLocation::Path.default_style(), ParamStyle::Simple);
        assert!(ParamStyle::Form.default_explode());
        assert!(!ParamStyle::Simple.default_explode());
    }
}
