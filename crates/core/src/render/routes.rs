//! Route/type emitter: Zod validators and Hono `createRoute` descriptors.
//!
//! Output layout:
//! 1. the `@hono/zod-openapi` import
//! 2. structural helper types for recursive components
//! 3. one validator per component, in declaration order, each followed by its
//!    type alias when type aliases are exported
//! 4. one route descriptor per operation, in document order

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use super::typing::{RefStyle, TypeRenderer};
use crate::error::Result;
use crate::generate::Compilation;
use crate::ir::Emit;
use crate::ir::api::{OperationNode, ParamLocation, SchemaRef};
use crate::ir::types::{TsImport, TsModule, TsTypeDef, TypeDefKind};
use crate::naming::ArtifactKind;
use crate::parse::escape_pointer;
use crate::validator::{ValidatorCompiler, ValidatorExpr};

const ZOD_OPENAPI: &str = "@hono/zod-openapi";

/// `request` keys for each parameter location, in emission order.
const REQUEST_PARAM_KEYS: [(ParamLocation, &str); 4] = [
    (ParamLocation::Path, "params"),
    (ParamLocation::Query, "query"),
    (ParamLocation::Header, "headers"),
    (ParamLocation::Cookie, "cookies"),
];

/// Component validators in declaration order, then one route descriptor per operation.
pub fn render_routes(compilation: &Compilation) -> Result<String> {
    let resolution = &compilation.resolution;
    let names = &compilation.names;
    let compiler = ValidatorCompiler::new(
        &resolution.components,
        &resolution.recursive,
        names,
        compilation.options.intersection,
    );

    let mut module = TsModule {
        imports: vec![TsImport {
            default: None,
            items: vec!["createRoute".into(), "z".into()],
            from: ZOD_OPENAPI.into(),
            type_only: false,
        }],
        ..TsModule::default()
    };

    let typing = TypeRenderer::new(&resolution.recursive, names, RefStyle::Inferred);
    for name in resolution.components.names() {
        if !resolution.is_recursive(name) {
            continue;
        }
        let Some(node) = resolution.components.get(name) else {
            continue;
        };
        let helper = TsTypeDef {
            name: names.ident(name, ArtifactKind::RecursiveType)?.name.clone(),
            kind: TypeDefKind::TypeAlias {
                ty: typing.render(node)?,
            },
            exported: false,
        };
        module.preamble.push(helper.emit());
    }

    let export_types = names.is_exported(ArtifactKind::Type);
    for name in &resolution.order {
        let Some(node) = resolution.components.get(name) else {
            continue;
        };
        let schema = names.ident(name, ArtifactKind::Schema)?;
        let path = format!("#/components/schemas/{}", escape_pointer(name));
        let expr = compiler
            .compile(node, &path)?
            .chain("openapi", vec![ValidatorExpr::string(name.clone())]);

        let export = if schema.exported { "export " } else { "" };
        let annotation = if resolution.is_recursive(name) {
            let helper = names.ident(name, ArtifactKind::RecursiveType)?;
            format!(": z.ZodType<{}, z.ZodTypeDef, unknown>", helper.name)
        } else {
            String::new()
        };
        let mut block = format!("{export}const {}{annotation} = {};", schema.name, expr.emit());
        if export_types {
            block.push_str(&format!(
                "\n\nexport type {} = z.infer<typeof {}>;",
                names.type_ident(name)?,
                schema.name
            ));
        }
        debug!(component = %name, identifier = %schema.name, "emitted validator");
        module.preamble.push(block);
    }

    for op in &compilation.operations {
        let ident = names.ident(&op.id, ArtifactKind::Route)?;
        let descriptor = route_descriptor(op, &compiler)?;
        module.preamble.push(format!(
            "export const {} = {};",
            ident.name,
            descriptor.emit()
        ));
        debug!(operation = %op.id, "emitted route");
    }

    Ok(module.emit())
}

fn operation_pointer(op: &OperationNode) -> String {
    format!("#/paths/{}/{}", escape_pointer(&op.path), op.method.as_lower())
}

/// `createRoute({ ... })` for one operation.
fn route_descriptor(op: &OperationNode, compiler: &ValidatorCompiler<'_>) -> Result<ValidatorExpr> {
    let pointer = operation_pointer(op);
    let mut entries = vec![
        ("method".to_string(), ValidatorExpr::string(op.method.as_lower())),
        ("path".to_string(), ValidatorExpr::string(op.path.clone())),
    ];
    if !op.tags.is_empty() {
        let tags = op.tags.iter().cloned().map(Value::String).collect();
        entries.push(("tags".into(), ValidatorExpr::Json(Value::Array(tags))));
    }
    if let Some(summary) = &op.summary {
        entries.push(("summary".into(), ValidatorExpr::string(summary.clone())));
    }
    if let Some(description) = &op.description {
        entries.push(("description".into(), ValidatorExpr::string(description.clone())));
    }
    if op.deprecated {
        entries.push(("deprecated".into(), ValidatorExpr::Json(Value::Bool(true))));
    }
    if !op.security.is_empty() {
        let requirements = op
            .security
            .iter()
            .map(|requirement| {
                let schemes = requirement
                    .iter()
                    .map(|(scheme, scopes)| {
                        let scopes = scopes.iter().cloned().map(Value::String).collect();
                        (scheme.clone(), Value::Array(scopes))
                    })
                    .collect::<Map<_, _>>();
                Value::Object(schemes)
            })
            .collect();
        entries.push(("security".into(), ValidatorExpr::Json(Value::Array(requirements))));
    }

    let request = request_entries(op, compiler, &pointer)?;
    if !request.is_empty() {
        entries.push(("request".into(), ValidatorExpr::Shape(request)));
    }

    let mut responses = Vec::new();
    for (status, response) in &op.responses {
        let mut fields = vec![(
            "description".to_string(),
            ValidatorExpr::string(response.description.clone()),
        )];
        if !response.content.is_empty() {
            let response_pointer = format!("{pointer}/responses/{}", escape_pointer(status));
            fields.push(("content".into(), content_shape(&response.content, compiler, &response_pointer)?));
        }
        responses.push((status.clone(), ValidatorExpr::Shape(fields)));
    }
    entries.push(("responses".into(), ValidatorExpr::Shape(responses)));

    Ok(ValidatorExpr::Call {
        callee: "createRoute".into(),
        args: vec![ValidatorExpr::Shape(entries)],
    })
}

fn request_entries(
    op: &OperationNode,
    compiler: &ValidatorCompiler<'_>,
    pointer: &str,
) -> Result<Vec<(String, ValidatorExpr)>> {
    let mut request = Vec::new();
    for (location, key) in REQUEST_PARAM_KEYS {
        let mut shape = Vec::new();
        for (index, param) in op.parameters.iter().enumerate() {
            if param.location != location {
                continue;
            }
            let param_pointer = format!("{pointer}/parameters/{index}");
            shape.push((param.name.clone(), compiler.compile_parameter(param, &param_pointer)?));
        }
        if !shape.is_empty() {
            request.push((
                key.to_string(),
                ValidatorExpr::z("object", vec![ValidatorExpr::Shape(shape)]),
            ));
        }
    }

    if let Some(body) = &op.request_body {
        let body_pointer = format!("{pointer}/requestBody");
        let mut fields = Vec::new();
        if let Some(description) = &body.description {
            fields.push(("description".to_string(), ValidatorExpr::string(description.clone())));
        }
        fields.push(("content".into(), content_shape(&body.content, compiler, &body_pointer)?));
        fields.push(("required".into(), ValidatorExpr::Json(Value::Bool(body.required))));
        request.push(("body".into(), ValidatorExpr::Shape(fields)));
    }
    Ok(request)
}

/// `{ "application/json": { schema: X } }`
fn content_shape(
    content: &IndexMap<String, SchemaRef>,
    compiler: &ValidatorCompiler<'_>,
    pointer: &str,
) -> Result<ValidatorExpr> {
    let mut media = Vec::new();
    for (media_type, schema) in content {
        let schema_pointer = format!("{pointer}/content/{}/schema", escape_pointer(media_type));
        let expr = compiler.compile(schema, &schema_pointer)?;
        media.push((
            media_type.clone(),
            ValidatorExpr::Shape(vec![("schema".into(), expr)]),
        ));
    }
    Ok(ValidatorExpr::Shape(media))
}
