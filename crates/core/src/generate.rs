//! Compilation pipeline entry points.
//!
//! `parse -> resolve -> name` runs once per document into an immutable
//! [`Compilation`]; every emitter then reads it without mutating anything, so
//! route output and any number of hook profiles can be rendered from the same
//! compilation.

use tracing::{debug, info};

use crate::config::CompileOptions;
use crate::document::RawDocument;
use crate::error::Result;
use crate::ir::api::OperationNode;
use crate::naming::NamingContext;
use crate::parse::parse;
use crate::render::hooks::render_hooks;
use crate::render::profile::EmitterProfile;
use crate::render::routes::render_routes;
use crate::resolve::{Resolution, resolve};

/// A fully resolved and named document.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Components with lazy edges marked and their declaration order.
    pub resolution: Resolution,
    /// Operations in emission order.
    pub operations: Vec<OperationNode>,
    /// Identifiers for schemas, types, params and routes.
    pub names: NamingContext,
    /// Options the document was compiled with.
    pub options: CompileOptions,
}

impl Compilation {
    /// Hono route descriptors and Zod validators.
    pub fn routes(&self) -> Result<String> {
        render_routes(self)
    }

    /// Client hooks for one profile.
    pub fn hooks(&self, profile: &EmitterProfile) -> Result<String> {
        render_hooks(self, profile)
    }
}

/// Build the IR and naming context for a document.
pub fn compile_document(doc: &RawDocument, options: &CompileOptions) -> Result<Compilation> {
    let parsed = parse(doc)?;
    debug!(
        components = parsed.components.len(),
        operations = parsed.operations.len(),
        "parsed document"
    );

    let resolution = resolve(parsed.components)?;
    debug!(
        lazy_edges = resolution.cycles.len(),
        recursive = resolution.recursive.len(),
        "resolved references"
    );

    let mut names = NamingContext::new(options);
    names.register(&resolution.components, &resolution.recursive, &parsed.operations)?;

    Ok(Compilation {
        resolution,
        operations: parsed.operations,
        names,
        options: *options,
    })
}

/// Compile a document into route/validator source.
pub fn generate_routes(doc: &RawDocument, options: &CompileOptions) -> Result<String> {
    let compilation = compile_document(doc, options)?;
    let source = compilation.routes()?;
    info!(
        operations = compilation.operations.len(),
        bytes = source.len(),
        "generated routes"
    );
    Ok(source)
}

/// Compile a document into client-hook source for `profile`.
pub fn generate_hooks(
    doc: &RawDocument,
    profile: &EmitterProfile,
    options: &CompileOptions,
) -> Result<String> {
    let compilation = compile_document(doc, options)?;
    let source = compilation.hooks(profile)?;
    info!(
        profile = profile.name,
        operations = compilation.operations.len(),
        bytes = source.len(),
        "generated hooks"
    );
    Ok(source)
}
