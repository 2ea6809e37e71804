//! Intermediate representations.
//!
//! This module defines the layers every emitter consumes:
//! 1. Schema IR: normalized schema nodes and the component table
//! 2. API-level IR: normalized operations, parameters, bodies and responses
//! 3. TypeScript AST: types, expressions, statements, functions
//! 4. Emission: AST to TypeScript code strings via the `Emit` trait
//!
//! ## Module Structure
//!
//! - `schema`: SchemaNode, ComponentTable
//! - `api`: OperationNode, ParameterNode, RequestBodyNode, ResponseNode
//! - `types`: TypeScript AST (TsType, TsExpr, TsStmt, TsFunction, TsModule)
//! - `emit`: TypeScript AST -> code strings (via Emit trait)
//! - `utils`: Common utilities shared across modules

pub mod api;
pub mod emit;
pub mod schema;
pub mod types;
pub mod utils;

pub use emit::Emit;
