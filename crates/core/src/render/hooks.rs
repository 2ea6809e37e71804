//! Client-hook emitter.
//!
//! One generic renderer for every [`EmitterProfile`]: the profile only
//! supplies primitive names, option types, cache-key shape and signal
//! convention. Which operations get a fetch wrapper, a key and a hook is
//! decided here once, the same way for every profile.

use tracing::debug;

use super::profile::{CallShape, EmitterProfile, KeyArgs, KeyPrefix, SignalConvention};
use super::typing::{RefStyle, TypeRenderer};
use crate::error::Result;
use crate::generate::Compilation;
use crate::ir::Emit;
use crate::ir::api::{
    BodyContentType, OperationNode, ParamLocation, ParameterNode, PathPart, ResponseContentType,
    SerializationStrategy, ValueShape,
};
use crate::ir::types::{
    BinOp, TsExpr, TsFunction, TsImport, TsLiteral, TsModule, TsParam, TsProp, TsStmt, TsType, TsTypeDef,
    TypeDefKind,
};
use crate::ir::utils::{format_param_access, js_string};
use crate::naming::{ArtifactKind, NamingContext};

const API_ERROR_CLASS: &str = r#"export class ApiError extends Error {
  status: number;
  statusText: string;
  body: unknown;

  constructor(status: number, statusText: string, body: unknown) {
    super(`HTTP ${status}: ${statusText}`);
    this.name = "ApiError";
    this.status = status;
    this.statusText = statusText;
    this.body = body;
  }
}"#;

const ERROR_CHECK: &str = r#"if (!res.ok) {
  const body = await res.text();
  let parsed: unknown;
  try { parsed = JSON.parse(body); } catch { parsed = body; }
  throw new ApiError(res.status, res.statusText, parsed);
}"#;

/// Everything the renderer needs to know about one operation.
struct HookOperation<'a> {
    op: &'a OperationNode,
    /// Fetch wrapper name
    name: String,
    /// Cache-key constructor name, for queries
    key_name: Option<String>,
    hook_name: String,
    /// Path, query and header parameters (cookies are left to the browser)
    params: Vec<&'a ParameterNode>,
    params_type: Option<String>,
    params_optional: bool,
    body: Option<Body>,
    /// Resolved data type, `| void` included
    data: String,
    response: Response,
}

struct Body {
    content: BodyContentType,
    ty: String,
    required: bool,
}

enum Response {
    Void,
    Decode {
        content: ResponseContentType,
        allows_no_content: bool,
    },
}

impl HookOperation<'_> {
    fn is_query(&self) -> bool {
        self.key_name.is_some()
    }

    /// Mutation input type, `None` when the mutation takes nothing.
    fn vars_type(&self) -> Option<String> {
        match (&self.params_type, &self.body) {
            (Some(params), Some(body)) => Some(format!("{{ params: {params}; data: {} }}", body.ty)),
            (Some(params), None) => Some(params.clone()),
            (None, Some(body)) => Some(body.ty.clone()),
            (None, None) => None,
        }
    }

    /// Fetch wrapper arguments given the mutation input bound to `input`.
    fn fetch_args_from(&self, input: &str) -> String {
        match (&self.params_type, &self.body) {
            (Some(_), Some(_)) => format!("{input}.params, {input}.data"),
            (Some(_), None) | (None, Some(_)) => input.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// Fetch wrappers, cache keys and hooks for every operation, in one module.
pub fn render_hooks(compilation: &Compilation, profile: &EmitterProfile) -> Result<String> {
    let resolution = &compilation.resolution;
    let mut names = compilation.names.clone();
    names.register_hooks(&compilation.operations, profile)?;
    let names = &names;
    let typing = TypeRenderer::new(&resolution.recursive, names, RefStyle::Alias);

    let mut types = Vec::new();
    for (name, node) in resolution.components.iter() {
        types.push(TsTypeDef {
            name: names.type_ident(name)?.to_string(),
            kind: TypeDefKind::TypeAlias {
                ty: typing.render(node)?,
            },
            exported: true,
        });
    }

    let mut operations = Vec::new();
    for op in &compilation.operations {
        let hook_op = plan_operation(names, &typing, op, profile)?;
        if let Some(name) = &hook_op.params_type {
            types.push(params_interface(name, &hook_op.params, &typing)?);
        }
        operations.push(hook_op);
    }

    let mut functions = Vec::new();
    for hook_op in &operations {
        functions.push(fetch_function(hook_op));
        match &hook_op.key_name {
            Some(key_name) => {
                functions.push(key_function(hook_op, key_name, profile));
                functions.push(query_hook(hook_op, key_name, profile));
            }
            None => functions.push(mutation_hook(hook_op, profile)),
        }
        debug!(operation = %hook_op.op.id, profile = profile.name, "emitted hook");
    }

    let has_queries = operations.iter().any(HookOperation::is_query);
    let has_mutations = operations.iter().any(|op| !op.is_query());
    let preamble = if operations.is_empty() {
        vec![]
    } else {
        vec![API_ERROR_CLASS.to_string()]
    };

    Ok(TsModule {
        imports: imports(profile, has_queries, has_mutations),
        preamble,
        types,
        functions,
    }
    .emit())
}

fn plan_operation<'a>(
    names: &NamingContext,
    typing: &TypeRenderer<'_>,
    op: &'a OperationNode,
    profile: &EmitterProfile,
) -> Result<HookOperation<'a>> {
    let name = names.ident(&op.id, ArtifactKind::Operation)?.name.clone();
    let key_name = if op.is_query() {
        Some(names.ident(&op.id, ArtifactKind::QueryKey)?.name.clone())
    } else {
        None
    };
    let hook_name = names
        .ident(&op.id, ArtifactKind::Hook(profile.hook_prefix))?
        .name
        .clone();

    let params: Vec<&ParameterNode> = op
        .parameters
        .iter()
        .filter(|p| p.location != ParamLocation::Cookie)
        .collect();
    let params_type = if params.is_empty() {
        None
    } else {
        Some(names.ident(&op.id, ArtifactKind::Params)?.name.clone())
    };

    let body = match op.select_body() {
        Some((content, schema)) => {
            let ty = match content {
                BodyContentType::FormData => "FormData".to_string(),
                BodyContentType::Json | BodyContentType::UrlEncoded => typing.render(schema)?.emit(),
            };
            let required = op.request_body.as_ref().is_some_and(|b| b.required);
            Some(Body { content, ty, required })
        }
        None => None,
    };

    // A required body after optional params is not a valid signature.
    let params_optional =
        !params.iter().any(|p| p.required) && body.as_ref().is_none_or(|b| !b.required);

    let selection = op.select_response();
    let (data, response) = match selection.schema {
        None => ("void".to_string(), Response::Void),
        Some(schema) => {
            let ty = match selection.content_type {
                ResponseContentType::Json => typing.render(schema)?.emit(),
                ResponseContentType::Text => "string".to_string(),
                ResponseContentType::Blob => "Blob".to_string(),
            };
            let data = if selection.has_void_status {
                format!("{ty} | void")
            } else {
                ty
            };
            (
                data,
                Response::Decode {
                    content: selection.content_type,
                    allows_no_content: selection.has_void_status,
                },
            )
        }
    };

    Ok(HookOperation {
        op,
        name,
        key_name,
        hook_name,
        params,
        params_type,
        params_optional,
        body,
        data,
        response,
    })
}

fn params_interface(name: &str, params: &[&ParameterNode], typing: &TypeRenderer<'_>) -> Result<TsTypeDef> {
    let properties = params
        .iter()
        .map(|param| {
            Ok(TsProp {
                name: param.name.clone(),
                ty: typing.render(&param.schema)?,
                optional: !param.required,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TsTypeDef {
        name: name.to_string(),
        kind: TypeDefKind::Interface { properties },
        exported: true,
    })
}

/// Runtime and type-only imports, grouped by module in first-use order.
fn imports(profile: &EmitterProfile, has_queries: bool, has_mutations: bool) -> Vec<TsImport> {
    struct Group {
        from: &'static str,
        default: Option<String>,
        items: Vec<String>,
        types: Vec<String>,
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut wanted = Vec::new();
    if has_queries {
        wanted.push((profile.query_module, profile.query_primitive, profile.query_type_imports));
    }
    if has_mutations {
        wanted.push((
            profile.mutation_module,
            profile.mutation_primitive,
            profile.mutation_type_imports,
        ));
    }

    for (from, primitive, type_items) in wanted {
        let index = match groups.iter().position(|g| g.from == from) {
            Some(index) => index,
            None => {
                groups.push(Group {
                    from,
                    default: None,
                    items: vec![],
                    types: vec![],
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        if profile.default_exports {
            group.default = Some(primitive.to_string());
        } else {
            group.items.push(primitive.to_string());
        }
        group.types.extend(type_items.iter().map(|t| (*t).to_string()));
    }

    let mut imports = Vec::new();
    for group in groups {
        if group.default.is_some() || !group.items.is_empty() {
            imports.push(TsImport {
                default: group.default,
                items: group.items,
                from: group.from.to_string(),
                type_only: false,
            });
        }
        if !group.types.is_empty() {
            imports.push(TsImport {
                default: None,
                items: group.types,
                from: group.from.to_string(),
                type_only: true,
            });
        }
    }
    imports
}

/// `async (params, data, options?: RequestInit): Promise<T> => { ... }`
fn fetch_function(hook_op: &HookOperation<'_>) -> TsFunction {
    let mut params = Vec::new();
    if let Some(params_type) = &hook_op.params_type {
        params.push(TsParam {
            name: "params".into(),
            ty: Some(TsType::Ref(params_type.clone())),
            optional: hook_op.params_optional,
        });
    }
    if let Some(body) = &hook_op.body {
        params.push(TsParam {
            name: "data".into(),
            ty: Some(TsType::Ref(body.ty.clone())),
            optional: !body.required,
        });
    }
    params.push(TsParam {
        name: "options".into(),
        ty: Some(TsType::Ref("RequestInit".into())),
        optional: true,
    });

    TsFunction {
        name: hook_op.name.clone(),
        params,
        return_type: Some(TsType::Ref(format!("Promise<{}>", hook_op.data))),
        body: fetch_body(hook_op),
        is_async: true,
        is_export: true,
        is_arrow: true,
    }
}

fn fetch_body(hook_op: &HookOperation<'_>) -> Vec<TsStmt> {
    let mut stmts = Vec::new();
    let op = hook_op.op;
    let query: Vec<&ParameterNode> = hook_op
        .params
        .iter()
        .copied()
        .filter(|p| p.location == ParamLocation::Query)
        .collect();
    let has_path_params = op
        .path_template
        .iter()
        .any(|part| matches!(part, PathPart::Param(_)));

    let url = if query.is_empty() {
        if has_path_params {
            format!("`{}`", path_template(&op.path_template, &hook_op.params))
        } else {
            js_string(&op.path)
        }
    } else {
        stmts.push(TsStmt::Const {
            name: "searchParams".into(),
            ty: None,
            init: TsExpr::New {
                callee: Box::new(TsExpr::ident("URLSearchParams")),
                args: vec![],
            },
        });
        for param in &query {
            stmts.push(TsStmt::Raw(query_statement(param)));
        }
        stmts.push(TsStmt::Const {
            name: "queryString".into(),
            ty: None,
            init: TsExpr::ident("searchParams").method("toString", vec![]),
        });
        let template = path_template(&op.path_template, &hook_op.params);
        stmts.push(TsStmt::Const {
            name: "url".into(),
            ty: None,
            init: TsExpr::Ternary {
                cond: Box::new(TsExpr::ident("queryString")),
                then_expr: Box::new(TsExpr::Raw(format!("`{template}?${{queryString}}`"))),
                else_expr: Box::new(TsExpr::Raw(format!("`{template}`"))),
            },
        });
        "url".to_string()
    };

    stmts.push(TsStmt::Const {
        name: "res".into(),
        ty: None,
        init: TsExpr::Await(Box::new(TsExpr::Raw(format!(
            "fetch({url}, {{ {} }})",
            fetch_options(hook_op)
        )))),
    });

    stmts.push(TsStmt::Raw(ERROR_CHECK.into()));

    match &hook_op.response {
        Response::Void => stmts.push(TsStmt::Return(None)),
        Response::Decode {
            content,
            allows_no_content,
        } => {
            if *allows_no_content {
                stmts.push(TsStmt::If {
                    cond: TsExpr::BinOp {
                        left: Box::new(TsExpr::Member {
                            object: Box::new(TsExpr::ident("res")),
                            prop: "status".into(),
                        }),
                        op: BinOp::StrictEqual,
                        right: Box::new(TsExpr::Literal(TsLiteral::Int(204))),
                    },
                    then_body: vec![TsStmt::Return(None)],
                });
            }
            stmts.push(TsStmt::Return(Some(
                TsExpr::ident("res").method(content.decode_method(), vec![]),
            )));
        }
    }

    stmts
}

/// Path template with every placeholder URI-encoded.
fn path_template(template: &[PathPart], params: &[&ParameterNode]) -> String {
    template
        .iter()
        .map(|part| match part {
            PathPart::Static(s) => s.replace('`', "\\`").replace("${", "\\${"),
            PathPart::Param(name) => {
                let access = format_param_access("params", name, true);
                let value = params
                    .iter()
                    .find(|p| p.location == ParamLocation::Path && &p.name == name)
                    .map_or_else(|| format!("String({access})"), |p| wire_value(p, &access));
                format!("${{encodeURIComponent({value})}}")
            }
        })
        .collect()
}

/// A parameter value as the single string its strategy puts on the wire.
fn wire_value(param: &ParameterNode, access: &str) -> String {
    let separator = match param.strategy {
        SerializationStrategy::PipeJoined => "|",
        SerializationStrategy::SpaceJoined => " ",
        _ => ",",
    };
    match (param.strategy, param.shape) {
        (SerializationStrategy::PairsJoined, _) => format!(
            "Object.entries({access}).filter(([, v]) => v != null).flatMap(([k, v]) => [k, String(v)]).join(\",\")"
        ),
        (SerializationStrategy::AssignmentsJoined, _) => format!(
            "Object.entries({access}).filter(([, v]) => v != null).map(([k, v]) => `${{k}}=${{String(v)}}`).join(\",\")"
        ),
        (_, ValueShape::Array) => format!("{access}.join({})", js_string(separator)),
        _ => format!("String({access})"),
    }
}

/// One `searchParams` statement, following the parameter's wire strategy.
fn query_statement(param: &ParameterNode) -> String {
    let access = format_param_access("params", &param.name, param.required);
    let key = js_string(&param.name);
    match param.strategy {
        SerializationStrategy::RepeatedKey if param.shape == ValueShape::Array => format!(
            "if ({access} != null) {access}.forEach((v) => searchParams.append({key}, String(v)));"
        ),
        SerializationStrategy::ExplodedProperties => format!(
            "if ({access} != null) Object.entries({access}).forEach(([k, v]) => {{ if (v != null) searchParams.append(k, String(v)); }});"
        ),
        SerializationStrategy::DeepObject => {
            let prefix = param.name.replace('`', "\\`").replace("${", "\\${");
            format!(
                "if ({access} != null) Object.entries({access}).forEach(([k, v]) => {{ if (v != null) searchParams.append(`{prefix}[${{k}}]`, String(v)); }});"
            )
        }
        SerializationStrategy::RepeatedKey
        | SerializationStrategy::CommaJoined
        | SerializationStrategy::PipeJoined
        | SerializationStrategy::SpaceJoined
        | SerializationStrategy::PairsJoined
        | SerializationStrategy::AssignmentsJoined => format!(
            "if ({access} != null) searchParams.set({key}, {});",
            wire_value(param, &access)
        ),
    }
}

/// The `fetch` init object: method, headers and body.
fn fetch_options(hook_op: &HookOperation<'_>) -> String {
    let mut options = format!("...options, method: \"{}\"", hook_op.op.method.as_str());

    let headers: Vec<&ParameterNode> = hook_op
        .params
        .iter()
        .copied()
        .filter(|p| p.location == ParamLocation::Header)
        .collect();

    if hook_op.body.is_none() && headers.is_empty() {
        return options;
    }

    options.push_str(", headers: { ");
    match hook_op.body.as_ref().map(|b| b.content) {
        Some(BodyContentType::Json) => options.push_str("\"Content-Type\": \"application/json\", "),
        Some(BodyContentType::UrlEncoded) => {
            options.push_str("\"Content-Type\": \"application/x-www-form-urlencoded\", ");
        }
        // The browser sets the multipart boundary.
        Some(BodyContentType::FormData) | None => {}
    }
    for header in headers {
        let key = js_string(&header.name);
        let direct = format_param_access("params", &header.name, true);
        if header.required {
            options.push_str(&format!("{key}: {}, ", wire_value(header, &direct)));
        } else {
            let access = format_param_access("params", &header.name, false);
            options.push_str(&format!(
                "...({access} != null && {{ {key}: {} }}), ",
                wire_value(header, &direct)
            ));
        }
    }
    options.push_str("...options?.headers }");

    match hook_op.body.as_ref().map(|b| b.content) {
        Some(BodyContentType::Json) => options.push_str(", body: JSON.stringify(data)"),
        Some(BodyContentType::UrlEncoded) => {
            options.push_str(", body: new URLSearchParams(data as Record<string, string>)");
        }
        Some(BodyContentType::FormData) => options.push_str(", body: data"),
        None => {}
    }
    options
}

/// `export const getPetKey = (params?: GetPetParams) => ["/pets/{petId}", params] as const;`
fn key_function(hook_op: &HookOperation<'_>, key_name: &str, profile: &EmitterProfile) -> TsFunction {
    let prefix = match profile.cache_key.prefix {
        KeyPrefix::OperationId => js_string(&hook_op.op.id),
        KeyPrefix::PathTemplate => js_string(&hook_op.op.path),
    };
    let (params, key) = match &hook_op.params_type {
        Some(params_type) => {
            let args = match profile.cache_key.args {
                KeyArgs::Object => "params".to_string(),
                KeyArgs::Serialized => "JSON.stringify(params ?? {})".to_string(),
            };
            (
                vec![TsParam {
                    name: "params".into(),
                    ty: Some(TsType::Ref(params_type.clone())),
                    optional: true,
                }],
                format!("[{prefix}, {args}] as const"),
            )
        }
        None => (vec![], format!("[{prefix}] as const")),
    };
    TsFunction {
        name: key_name.to_string(),
        params,
        return_type: None,
        body: vec![TsStmt::Return(Some(TsExpr::Raw(key)))],
        is_async: false,
        is_export: true,
        is_arrow: true,
    }
}

fn hook_params(hook_op: &HookOperation<'_>, options_type: String) -> Vec<TsParam> {
    let mut params = Vec::new();
    if let Some(params_type) = &hook_op.params_type {
        params.push(TsParam {
            name: "params".into(),
            ty: Some(TsType::Ref(params_type.clone())),
            optional: hook_op.params_optional,
        });
    }
    params.push(TsParam {
        name: "options".into(),
        ty: Some(TsType::Ref(options_type)),
        optional: true,
    });
    params
}

fn query_hook(hook_op: &HookOperation<'_>, key_name: &str, profile: &EmitterProfile) -> TsFunction {
    let has_params = hook_op.params_type.is_some();
    let key_args = if has_params { "params" } else { "" };
    let fetch = &hook_op.name;

    let call = match profile.call_shape {
        CallShape::OptionsObject => {
            let query_fn = match (profile.signal, has_params) {
                (SignalConvention::QueryContext, true) => {
                    format!("({{ signal }}) => {fetch}(params, {{ signal }})")
                }
                (SignalConvention::QueryContext, false) => {
                    format!("({{ signal }}) => {fetch}({{ signal }})")
                }
                (SignalConvention::None, _) => format!("() => {fetch}({key_args})"),
            };
            format!(
                "{}({{ queryKey: {key_name}({key_args}), queryFn: {query_fn}, ...options }})",
                profile.query_primitive
            )
        }
        CallShape::KeyThenFetcher => format!(
            "{}({key_name}({key_args}), () => {fetch}({key_args}), options)",
            profile.query_primitive
        ),
    };

    TsFunction {
        name: hook_op.hook_name.clone(),
        params: hook_params(hook_op, profile.query_options(&hook_op.data)),
        return_type: None,
        body: vec![TsStmt::Return(Some(TsExpr::Raw(call)))],
        is_async: false,
        is_export: true,
        is_arrow: false,
    }
}

fn mutation_hook(hook_op: &HookOperation<'_>, profile: &EmitterProfile) -> TsFunction {
    let vars = hook_op.vars_type();
    let fetch = &hook_op.name;

    let call = match profile.call_shape {
        CallShape::OptionsObject => {
            let mutation_fn = match &vars {
                Some(vars) => {
                    let binding = match (&hook_op.params_type, &hook_op.body) {
                        (Some(_), Some(_)) => "vars",
                        (Some(_), None) => "params",
                        _ => "data",
                    };
                    format!(
                        "({binding}: {vars}) => {fetch}({})",
                        hook_op.fetch_args_from(binding)
                    )
                }
                None => format!("() => {fetch}()"),
            };
            format!("{}({{ mutationFn: {mutation_fn}, ...options }})", profile.mutation_primitive)
        }
        CallShape::KeyThenFetcher => {
            let fetcher = match &vars {
                Some(vars) => format!(
                    "(_key: string, {{ arg }}: {{ arg: {vars} }}) => {fetch}({})",
                    hook_op.fetch_args_from("arg")
                ),
                None => format!("() => {fetch}()"),
            };
            format!(
                "{}({}, {fetcher}, options)",
                profile.mutation_primitive,
                js_string(&hook_op.op.path)
            )
        }
    };
    // SWR triggers without an argument are typed `never`.
    let no_vars = match profile.call_shape {
        CallShape::OptionsObject => "void",
        CallShape::KeyThenFetcher => "never",
    };
    let options_type = profile.mutation_options(&hook_op.data, vars.as_deref().unwrap_or(no_vars));

    TsFunction {
        name: hook_op.hook_name.clone(),
        params: vec![TsParam {
            name: "options".into(),
            ty: Some(TsType::Ref(options_type)),
            optional: true,
        }],
        return_type: None,
        body: vec![TsStmt::Return(Some(TsExpr::Raw(call)))],
        is_async: false,
        is_export: true,
        is_arrow: false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::CompileOptions;
    use crate::document::RawDocument;
    use crate::generate::compile_document;
    use crate::render::profile::{PROFILES, SVELTE_QUERY, SWR, TANSTACK, VUE_QUERY};
    use serde_json::json;

    fn pets_doc() -> serde_json::Value {
        json!({
            "openapi": "3.1.0",
            "paths": {
                "/pets": {
                    "get": {
                        "operationId": "listPets",
                        "parameters": [
                            { "name": "limit", "in": "query", "schema": { "type": "integer" } },
                            {
                                "name": "tags",
                                "in": "query",
                                "schema": { "type": "array", "items": { "type": "string" } }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "operationId": "createPet",
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
                        },
                        "responses": {
                            "201": {
                                "description": "Created",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
                            }
                        }
                    }
                },
                "/pets/{petId}": {
                    "parameters": [
                        { "name": "petId", "in": "path", "required": true, "schema": { "type": "integer" } }
                    ],
                    "get": {
                        "operationId": "getPet",
                        "parameters": [
                            { "name": "X-Request-Id", "in": "header", "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
                            },
                            "204": { "description": "Gone" }
                        }
                    },
                    "delete": {
                        "operationId": "deletePet",
                        "responses": { "204": { "description": "Deleted" } }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "name": { "type": "string" },
                            "tag": { "type": "string" }
                        }
                    }
                }
            }
        })
    }

    fn hooks(doc: serde_json::Value, profile: &EmitterProfile) -> String {
        let doc = RawDocument::from_json(&doc.to_string()).unwrap();
        compile_document(&doc, &CompileOptions::default())
            .unwrap()
            .hooks(profile)
            .unwrap()
    }

    #[test]
    fn test_tanstack_module() {
        let out = hooks(pets_doc(), &TANSTACK);
        assert!(out.starts_with(
            "import { useQuery, useMutation } from \"@tanstack/react-query\";\nimport type { UseQueryOptions, UseMutationOptions } from \"@tanstack/react-query\";\n\nexport class ApiError extends Error {"
        ));
        assert!(out.contains("export type Pet = { name: string; tag?: string };\n"));
        assert!(out.contains("export interface ListPetsParams {\n  limit?: number;\n  tags?: string[];\n}\n"));
        assert!(out.contains("export interface GetPetParams {\n  petId: number;\n  \"X-Request-Id\"?: string;\n}\n"));
        assert!(out.contains(
            "export const listPetsKey = (params?: ListPetsParams) => [\"/pets\", params] as const;\n"
        ));
        assert!(out.contains(
            "export function useListPets(params?: ListPetsParams, options?: Omit<UseQueryOptions<Pet[], ApiError>, \"queryKey\" | \"queryFn\">) {\n  return useQuery({ queryKey: listPetsKey(params), queryFn: ({ signal }) => listPets(params, { signal }), ...options });\n}\n"
        ));
        assert!(out.contains(
            "export function useCreatePet(options?: Omit<UseMutationOptions<Pet, ApiError, Pet>, \"mutationFn\">) {\n  return useMutation({ mutationFn: (data: Pet) => createPet(data), ...options });\n}\n"
        ));
    }

    #[test]
    fn test_fetch_wrapper_with_query_and_headers() {
        let out = hooks(pets_doc(), &TANSTACK);
        assert!(out.contains(
            "export const listPets = async (params?: ListPetsParams, options?: RequestInit): Promise<Pet[]> => {\n  const searchParams = new URLSearchParams();\n  if (params?.limit != null) searchParams.set(\"limit\", String(params?.limit));\n  if (params?.tags != null) params?.tags.forEach((v) => searchParams.append(\"tags\", String(v)));\n  const queryString = searchParams.toString();\n  const url = queryString ? `/pets?${queryString}` : `/pets`;\n  const res = await fetch(url, { ...options, method: \"GET\" });\n"
        ));
        assert!(out.contains(
            "  const res = await fetch(`/pets/${encodeURIComponent(String(params.petId))}`, { ...options, method: \"GET\", headers: { ...(params?.[\"X-Request-Id\"] != null && { \"X-Request-Id\": String(params[\"X-Request-Id\"]) }), ...options?.headers } });\n"
        ));
        assert!(out.contains("): Promise<Pet | void> => {"));
        assert!(out.contains("  if (res.status === 204) {\n    return;\n  }\n  return res.json();\n"));
    }

    #[test]
    fn test_mutation_with_body_and_void_response() {
        let out = hooks(pets_doc(), &TANSTACK);
        assert!(out.contains(
            "export const createPet = async (data: Pet, options?: RequestInit): Promise<Pet> => {\n  const res = await fetch(\"/pets\", { ...options, method: \"POST\", headers: { \"Content-Type\": \"application/json\", ...options?.headers }, body: JSON.stringify(data) });\n"
        ));
        assert!(out.contains(
            "export const deletePet = async (params: DeletePetParams, options?: RequestInit): Promise<void> => {"
        ));
        assert!(out.contains(
            "  return useMutation({ mutationFn: (params: DeletePetParams) => deletePet(params), ...options });"
        ));
    }

    #[test]
    fn test_swr_profile() {
        let out = hooks(pets_doc(), &SWR);
        assert!(out.starts_with(
            "import useSWR from \"swr\";\nimport type { SWRConfiguration } from \"swr\";\nimport useSWRMutation from \"swr/mutation\";\nimport type { SWRMutationConfiguration } from \"swr/mutation\";\n"
        ));
        assert!(out.contains(
            "export const listPetsKey = (params?: ListPetsParams) => [\"/pets\", JSON.stringify(params ?? {})] as const;"
        ));
        assert!(out.contains(
            "  return useSWR(listPetsKey(params), () => listPets(params), options);"
        ));
        assert!(out.contains(
            "export function useCreatePet(options?: SWRMutationConfiguration<Pet, ApiError, string, Pet>) {\n  return useSWRMutation(\"/pets\", (_key: string, { arg }: { arg: Pet }) => createPet(arg), options);\n}"
        ));
    }

    #[test]
    fn test_operation_id_keys_and_svelte_prefix() {
        let vue = hooks(pets_doc(), &VUE_QUERY);
        assert!(vue.contains("export const getPetKey = (params?: GetPetParams) => [\"getPet\", params] as const;"));
        assert!(vue.contains("from \"@tanstack/vue-query\";"));

        let svelte = hooks(pets_doc(), &SVELTE_QUERY);
        assert!(svelte.contains("export function createGetPet(params: GetPetParams, options?: Omit<CreateQueryOptions<Pet | void, ApiError>"));
        assert!(svelte.contains("  return createQuery({ queryKey: getPetKey(params), queryFn: ({ signal }) => getPet(params, { signal }), ...options });"));
    }

    #[test]
    fn test_profiles_cover_the_same_operations() {
        let exported = |out: &str| {
            out.lines()
                .filter_map(|line| line.strip_prefix("export const "))
                .map(|rest| rest.split(' ').next().unwrap_or_default().to_string())
                .collect::<Vec<_>>()
        };
        let baseline = exported(&hooks(pets_doc(), &TANSTACK));
        assert_eq!(
            baseline,
            ["listPets", "listPetsKey", "createPet", "getPet", "getPetKey", "deletePet"]
        );
        for profile in PROFILES {
            assert_eq!(exported(&hooks(pets_doc(), &profile)), baseline, "{}", profile.name);
        }
    }

    #[test]
    fn test_key_and_hook_names_are_unique() {
        let ok = json!({ "200": { "description": "OK" } });
        let doc = json!({
            "openapi": "3.1.0",
            "paths": {
                "/pets": { "get": { "operationId": "listPets", "responses": ok } },
                "/pets/keys": { "get": { "operationId": "listPetsKey", "responses": ok } },
                "/query": { "post": { "operationId": "query", "responses": ok } }
            }
        });
        let out = hooks(doc, &TANSTACK);
        let declarations = |name: &str| {
            out.lines()
                .filter(|line| {
                    line.strip_prefix("export const ")
                        .or_else(|| line.strip_prefix("export function "))
                        .is_some_and(|rest| rest.starts_with(&format!("{name} ")) || rest.starts_with(&format!("{name}(")))
                })
                .count()
        };
        assert_eq!(declarations("listPetsKey"), 1);
        assert!(out.contains("export const listPets2Key = () => [\"/pets\"] as const;"));
        assert!(out.contains("  return useQuery({ queryKey: listPets2Key(), queryFn: ({ signal }) => listPets({ signal }), ...options });"));
        assert!(out.contains("export const listPetsKeyKey = () => [\"/pets/keys\"] as const;"));
        // `useQuery` is imported, so the hook for `query` is escaped.
        assert!(out.contains("export function _useQuery(options?: "));
        assert_eq!(declarations("useQuery"), 0);
    }

    #[test]
    fn test_query_serialization_strategies() {
        let doc = json!({
            "openapi": "3.1.0",
            "paths": {
                "/search": {
                    "get": {
                        "parameters": [
                            {
                                "name": "ids", "in": "query", "required": true, "explode": false,
                                "schema": { "type": "array", "items": { "type": "integer" } }
                            },
                            {
                                "name": "kinds", "in": "query", "style": "pipeDelimited",
                                "schema": { "type": "array", "items": { "type": "string" } }
                            },
                            {
                                "name": "filter", "in": "query", "style": "deepObject",
                                "schema": { "type": "object", "properties": { "status": { "type": "string" } } }
                            },
                            { "name": "session", "in": "cookie", "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": { "description": "OK", "content": { "text/csv": { "schema": { "type": "string" } } } }
                        }
                    }
                }
            }
        });
        let out = hooks(doc, &TANSTACK);
        assert!(out.contains("  if (params.ids != null) searchParams.set(\"ids\", params.ids.join(\",\"));\n"));
        assert!(out.contains("  if (params?.kinds != null) searchParams.set(\"kinds\", params?.kinds.join(\"|\"));\n"));
        assert!(out.contains(
            "  if (params?.filter != null) Object.entries(params?.filter).forEach(([k, v]) => { if (v != null) searchParams.append(`filter[${k}]`, String(v)); });\n"
        ));
        assert!(!out.contains("session"));
        assert!(out.contains("): Promise<string> => {"));
        assert!(out.contains("  return res.text();\n"));
    }

    #[test]
    fn test_object_parameters_are_serialized() {
        let filter = json!({ "type": "object", "properties": { "status": { "type": "string" } } });
        let doc = json!({
            "openapi": "3.1.0",
            "paths": {
                "/reports/{range}": {
                    "get": {
                        "operationId": "listReports",
                        "parameters": [
                            { "name": "range", "in": "path", "required": true, "explode": true, "schema": filter },
                            { "name": "filter", "in": "query", "schema": filter },
                            { "name": "packed", "in": "query", "explode": false, "schema": filter },
                            { "name": "X-Scope", "in": "header", "required": true, "schema": filter }
                        ],
                        "responses": { "204": { "description": "Empty" } }
                    }
                }
            }
        });
        let out = hooks(doc, &TANSTACK);
        assert!(out.contains(
            "  if (params?.filter != null) Object.entries(params?.filter).forEach(([k, v]) => { if (v != null) searchParams.append(k, String(v)); });\n"
        ));
        assert!(out.contains(
            "  if (params?.packed != null) searchParams.set(\"packed\", Object.entries(params?.packed).filter(([, v]) => v != null).flatMap(([k, v]) => [k, String(v)]).join(\",\"));\n"
        ));
        assert!(out.contains(
            "`/reports/${encodeURIComponent(Object.entries(params.range).filter(([, v]) => v != null).map(([k, v]) => `${k}=${String(v)}`).join(\",\"))}"
        ));
        assert!(out.contains(
            "\"X-Scope\": Object.entries(params[\"X-Scope\"]).filter(([, v]) => v != null).flatMap(([k, v]) => [k, String(v)]).join(\",\"), "
        ));
    }

    #[test]
    fn test_no_operations() {
        let doc = json!({
            "openapi": "3.1.0",
            "paths": {},
            "components": { "schemas": { "Id": { "type": "string" } } }
        });
        assert_eq!(hooks(doc, &TANSTACK), "export type Id = string;\n");
    }
}
