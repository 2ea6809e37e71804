//! OpenAPI/JSON-Schema compiler for Hono routes and client hooks
//!
//! The pipeline is:
//! 1. [`document`]: deserialize a JSON or YAML OpenAPI 3.x document
//! 2. [`parse`]: normalize schemas into the schema IR and operations into the
//!    operation IR ([`operations`])
//! 3. [`resolve`]: check references, mark lazy edges, order declarations
//! 4. [`naming`]: assign every identifier for the run
//! 5. [`render`]: emit validators and route descriptors, or client hooks for
//!    one [`EmitterProfile`]
//!
//! [`generate_routes`] and [`generate_hooks`] run the whole pipeline.

pub mod config;
pub mod document;
pub mod error;
pub mod generate;
pub mod ir;
pub mod naming;
pub mod operations;
pub mod parse;
pub mod render;
pub mod resolve;
pub mod validator;

pub use config::{ArtifactNaming, CaseConvention, CompileOptions, IntersectionPolicy};
pub use document::RawDocument;
pub use error::{Error, Result};
pub use generate::{Compilation, compile_document, generate_hooks, generate_routes};
pub use parse::parse;
pub use render::EmitterProfile;
pub use render::profile::PROFILES;
pub use resolve::resolve;
