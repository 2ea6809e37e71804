//! Raw paths -> operation IR.
//!
//! One [`OperationNode`] per path/method pair, in document order. Parameter,
//! request body and response references into `#/components` are followed here,
//! so the emitters only ever see inline definitions and schema `Ref`s.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::document::{
    RawComponents, RawDocument, RawOperation, RawParameter, RawPathItem, RawRequestBody,
    RawResponse, RawSchema, RefOr,
};
use crate::error::{Error, Result};
use crate::ir::api::{
    HttpMethod, OperationNode, ParamLocation, ParamStyle, ParameterNode, PathPart,
    RequestBodyNode, ResponseNode, SerializationStrategy, ValueShape,
};
use crate::ir::schema::{ComponentTable, PrimitiveKind, SchemaKind, SchemaNode};
use crate::ir::utils::capitalize_first;
use crate::parse::{SCHEMA_REF_PREFIX, escape_pointer, parse_schema, unescape_pointer};

const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";
const REQUEST_BODY_REF_PREFIX: &str = "#/components/requestBodies/";
const RESPONSE_REF_PREFIX: &str = "#/components/responses/";

/// Build every operation of the document.
pub fn build_operations(doc: &RawDocument, components: &ComponentTable) -> Result<Vec<OperationNode>> {
    let raw_components = doc.components.as_ref();
    let mut operations = Vec::new();
    let mut ids: HashMap<String, String> = HashMap::new();

    for (path, item) in &doc.paths {
        let item_pointer = format!("#/paths/{}", escape_pointer(path));
        for (method, raw) in path_operations(item) {
            let ctx = OperationContext {
                doc,
                raw_components,
                components,
                path,
                method,
                label: format!("{} {path}", method.as_str()),
                pointer: format!("{item_pointer}/{}", method.as_lower()),
                item_pointer: &item_pointer,
            };
            let operation = ctx.build(item, raw)?;
            if let Some(previous) = ids.insert(operation.id.clone(), ctx.label.clone()) {
                return Err(Error::operation(
                    &ctx.label,
                    format!(
                        "operation id '{}' is already used by {previous}",
                        operation.id
                    ),
                ));
            }
            debug!(
                operation = %operation.id,
                method = method.as_str(),
                path = %path,
                parameters = operation.parameters.len(),
                "built operation"
            );
            operations.push(operation);
        }
    }

    Ok(operations)
}

fn path_operations(item: &RawPathItem) -> impl Iterator<Item = (HttpMethod, &RawOperation)> {
    HttpMethod::ALL.into_iter().filter_map(move |method| {
        let operation = match method {
            HttpMethod::Get => item.get.as_ref(),
            HttpMethod::Put => item.put.as_ref(),
            HttpMethod::Post => item.post.as_ref(),
            HttpMethod::Delete => item.delete.as_ref(),
            HttpMethod::Options => item.options.as_ref(),
            HttpMethod::Head => item.head.as_ref(),
            HttpMethod::Patch => item.patch.as_ref(),
            HttpMethod::Trace => item.trace.as_ref(),
        };
        operation.map(|op| (method, op))
    })
}

/// `POST /users/{id}` -> `postUsersId`
pub fn derive_operation_id(method: HttpMethod, path: &str) -> String {
    let suffix: String = path
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect();
    format!("{}{suffix}", method.as_lower())
}

struct OperationContext<'a> {
    doc: &'a RawDocument,
    raw_components: Option<&'a RawComponents>,
    components: &'a ComponentTable,
    path: &'a str,
    method: HttpMethod,
    /// `POST /test`, used in error messages
    label: String,
    /// JSON pointer of the operation object
    pointer: String,
    item_pointer: &'a str,
}

impl OperationContext<'_> {
    fn build(&self, item: &RawPathItem, raw: &RawOperation) -> Result<OperationNode> {
        let id = raw
            .operation_id
            .clone()
            .unwrap_or_else(|| derive_operation_id(self.method, self.path));

        let path_template = parse_path_template(self.path, &self.label)?;

        let inherited = self.collect_parameters(&item.parameters, self.item_pointer)?;
        let own = self.collect_parameters(&raw.parameters, &self.pointer)?;
        let mut merged: IndexMap<(String, ParamLocation), ParameterNode> = IndexMap::new();
        for param in inherited.into_iter().chain(own) {
            merged.insert((param.name.clone(), param.location), param);
        }
        let parameters: Vec<ParameterNode> = merged.into_values().collect();
        self.check_path_parameters(&path_template, &parameters)?;

        let request_body = raw
            .request_body
            .as_ref()
            .map(|body| self.build_request_body(body))
            .transpose()?;

        let mut responses = IndexMap::new();
        for (status, response) in &raw.responses {
            let pointer = format!("{}/responses/{}", self.pointer, escape_pointer(status));
            responses.insert(status.clone(), self.build_response(response, &pointer)?);
        }

        let security = raw
            .security
            .clone()
            .or_else(|| self.doc.security.clone())
            .unwrap_or_default();

        Ok(OperationNode {
            id,
            method: self.method,
            path: self.path.to_string(),
            path_template,
            summary: raw.summary.clone(),
            description: raw.description.clone(),
            deprecated: raw.deprecated,
            tags: raw.tags.clone(),
            parameters,
            request_body,
            responses,
            security,
        })
    }

    /// Build one parameter list, rejecting repeated `(name, in)` pairs.
    fn collect_parameters(
        &self,
        list: &[RefOr<RawParameter>],
        owner_pointer: &str,
    ) -> Result<Vec<ParameterNode>> {
        let mut seen = HashSet::new();
        let mut parameters = Vec::with_capacity(list.len());
        for (index, entry) in list.iter().enumerate() {
            let pointer = format!("{owner_pointer}/parameters/{index}");
            let raw = follow(
                entry,
                PARAMETER_REF_PREFIX,
                self.raw_components.map(|c| &c.parameters),
                &pointer,
            )?;
            let param = self.build_parameter(raw, &pointer)?;
            if !seen.insert((param.name.clone(), param.location)) {
                return Err(Error::operation(
                    &self.label,
                    format!(
                        "duplicate {} parameter '{}'",
                        param.location.as_str(),
                        param.name
                    ),
                ));
            }
            parameters.push(param);
        }
        Ok(parameters)
    }

    fn build_parameter(&self, raw: &RawParameter, pointer: &str) -> Result<ParameterNode> {
        let location = ParamLocation::parse(&raw.location).ok_or_else(|| {
            Error::unsupported(
                format!("{pointer}/in"),
                format!("parameter location '{}'", raw.location),
            )
        })?;

        let schema = match &raw.schema {
            Some(schema) => parse_schema(schema, &format!("{pointer}/schema"))?,
            None => SchemaNode::primitive(PrimitiveKind::String),
        };
        self.check_schema_refs(&schema, pointer)?;

        let required = if location == ParamLocation::Path && !raw.required {
            warn!(
                operation = %self.label,
                parameter = %raw.name,
                "path parameter not marked required, treating as required"
            );
            true
        } else {
            raw.required
        };

        let style = match &raw.style {
            Some(style) => ParamStyle::parse(style).ok_or_else(|| {
                Error::unsupported(format!("{pointer}/style"), format!("parameter style '{style}'"))
            })?,
            None => location.default_style(),
        };
        let explode = raw.explode.unwrap_or_else(|| style.default_explode());
        let shape = value_shape(&schema, self.components);
        let strategy = serialization_strategy(location, style, explode, shape).ok_or_else(|| {
            Error::unsupported(
                pointer,
                format!(
                    "style '{}' (explode: {explode}) for {shape:?} {} parameter '{}'",
                    style.as_str(),
                    location.as_str(),
                    raw.name
                ),
            )
        })?;

        Ok(ParameterNode {
            name: raw.name.clone(),
            location,
            required,
            description: raw.description.clone(),
            style,
            explode,
            strategy,
            shape,
            schema,
        })
    }

    /// Template placeholders and path parameters must match one to one.
    fn check_path_parameters(&self, template: &[PathPart], parameters: &[ParameterNode]) -> Result<()> {
        let mut placeholders = HashSet::new();
        for part in template {
            if let PathPart::Param(name) = part
                && !placeholders.insert(name.as_str())
            {
                return Err(Error::operation(
                    &self.label,
                    format!("placeholder '{{{name}}}' appears more than once in the path"),
                ));
            }
        }

        let declared: HashSet<&str> = parameters
            .iter()
            .filter(|p| p.location == ParamLocation::Path)
            .map(|p| p.name.as_str())
            .collect();

        for part in template {
            if let PathPart::Param(name) = part
                && !declared.contains(name.as_str())
            {
                return Err(Error::operation(
                    &self.label,
                    format!("path placeholder '{{{name}}}' has no matching path parameter"),
                ));
            }
        }
        for param in parameters.iter().filter(|p| p.location == ParamLocation::Path) {
            if !placeholders.contains(param.name.as_str()) {
                return Err(Error::operation(
                    &self.label,
                    format!("path parameter '{}' does not appear in the path template", param.name),
                ));
            }
        }
        Ok(())
    }

    fn build_request_body(&self, entry: &RefOr<RawRequestBody>) -> Result<RequestBodyNode> {
        let pointer = format!("{}/requestBody", self.pointer);
        let raw = follow(
            entry,
            REQUEST_BODY_REF_PREFIX,
            self.raw_components.map(|c| &c.request_bodies),
            &pointer,
        )?;
        let mut content = IndexMap::new();
        for (media_type, media) in &raw.content {
            let media_pointer = format!("{pointer}/content/{}", escape_pointer(media_type));
            content.insert(media_type.clone(), self.media_schema(media.schema.as_ref(), &media_pointer)?);
        }
        Ok(RequestBodyNode {
            required: raw.required,
            description: raw.description.clone(),
            content,
        })
    }

    fn build_response(&self, entry: &RefOr<RawResponse>, pointer: &str) -> Result<ResponseNode> {
        let raw = follow(
            entry,
            RESPONSE_REF_PREFIX,
            self.raw_components.map(|c| &c.responses),
            pointer,
        )?;
        let mut content = IndexMap::new();
        for (media_type, media) in &raw.content {
            let media_pointer = format!("{pointer}/content/{}", escape_pointer(media_type));
            content.insert(media_type.clone(), self.media_schema(media.schema.as_ref(), &media_pointer)?);
        }
        Ok(ResponseNode {
            description: raw.description.clone().unwrap_or_default(),
            content,
        })
    }

    fn media_schema(&self, schema: Option<&RawSchema>, pointer: &str) -> Result<SchemaNode> {
        let node = match schema {
            Some(schema) => parse_schema(schema, &format!("{pointer}/schema"))?,
            None => SchemaNode::new(SchemaKind::Any),
        };
        self.check_schema_refs(&node, pointer)?;
        Ok(node)
    }

    fn check_schema_refs(&self, node: &SchemaNode, pointer: &str) -> Result<()> {
        for name in node.referenced_names() {
            if !self.components.contains(name) {
                return Err(Error::UnresolvedReference {
                    reference: format!("{SCHEMA_REF_PREFIX}{}", escape_pointer(name)),
                    from: pointer.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Follow a `$ref` chain within one components section.
fn follow<'a, T>(
    entry: &'a RefOr<T>,
    prefix: &str,
    section: Option<&'a IndexMap<String, RefOr<T>>>,
    from: &str,
) -> Result<&'a T> {
    let limit = section.map_or(0, IndexMap::len) + 1;
    let mut current = entry;
    for _ in 0..limit {
        match current {
            RefOr::Item(item) => return Ok(item),
            RefOr::Ref { reference } => {
                current = reference
                    .strip_prefix(prefix)
                    .map(unescape_pointer)
                    .and_then(|name| section.and_then(|s| s.get(&name)))
                    .ok_or_else(|| Error::UnresolvedReference {
                        reference: reference.clone(),
                        from: from.to_string(),
                    })?;
            }
        }
    }
    Err(Error::UnresolvedReference {
        reference: match current {
            RefOr::Ref { reference } => reference.clone(),
            RefOr::Item(_) => prefix.to_string(),
        },
        from: format!("{from} (reference cycle)"),
    })
}

/// Split a path into static and `{param}` parts.
pub fn parse_path_template(path: &str, label: &str) -> Result<Vec<PathPart>> {
    let malformed = |detail: &str| Error::operation(label, format!("malformed path template '{path}': {detail}"));

    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') => return Err(malformed("nested '{'")),
                        None => return Err(malformed("unclosed '{'")),
                        Some(c) => name.push(c),
                    }
                }
                if name.is_empty() {
                    return Err(malformed("empty placeholder"));
                }
                if !literal.is_empty() {
                    parts.push(PathPart::Static(std::mem::take(&mut literal)));
                }
                parts.push(PathPart::Param(name));
            }
            '}' => return Err(malformed("unmatched '}'")),
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        parts.push(PathPart::Static(literal));
    }
    Ok(parts)
}

fn value_shape(schema: &SchemaNode, components: &ComponentTable) -> ValueShape {
    match components.deref(schema).map(|node| &node.kind) {
        Some(SchemaKind::Array(_) | SchemaKind::Tuple(_)) => ValueShape::Array,
        Some(SchemaKind::Object(_) | SchemaKind::Record { .. } | SchemaKind::Intersection(_)) => {
            ValueShape::Object
        }
        _ => ValueShape::Scalar,
    }
}

/// Normalize a style/explode/shape combination into a wire strategy.
fn serialization_strategy(
    location: ParamLocation,
    style: ParamStyle,
    explode: bool,
    shape: ValueShape,
) -> Option<SerializationStrategy> {
    use ParamLocation::{Cookie, Header, Path, Query};
    use ParamStyle::{DeepObject, Form, PipeDelimited, Simple, SpaceDelimited};

    match (location, style, shape) {
        (Path | Header, Simple, ValueShape::Scalar | ValueShape::Array) => {
            Some(SerializationStrategy::CommaJoined)
        }
        (Path | Header, Simple, ValueShape::Object) if explode => {
            Some(SerializationStrategy::AssignmentsJoined)
        }
        (Path | Header, Simple, ValueShape::Object) => Some(SerializationStrategy::PairsJoined),
        (Query | Cookie, Form, ValueShape::Object) if explode => {
            Some(SerializationStrategy::ExplodedProperties)
        }
        (Query | Cookie, Form, ValueShape::Object) => Some(SerializationStrategy::PairsJoined),
        (Query | Cookie, Form, ValueShape::Scalar) => Some(SerializationStrategy::RepeatedKey),
        (Query | Cookie, Form, ValueShape::Array) if explode => Some(SerializationStrategy::RepeatedKey),
        (Query | Cookie, Form, ValueShape::Array) => Some(SerializationStrategy::CommaJoined),
        (Query, SpaceDelimited, ValueShape::Array) => Some(SerializationStrategy::SpaceJoined),
        (Query, PipeDelimited, ValueShape::Array) => Some(SerializationStrategy::PipeJoined),
        (Query, DeepObject, ValueShape::Object) => Some(SerializationStrategy::DeepObject),
        _ => None,
    }
}
