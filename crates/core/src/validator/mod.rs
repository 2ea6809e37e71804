//! Validator-expression compiler.
//!
//! - `expr`: the Zod expression tree and its printer
//! - `compile`: schema IR -> expression tree

pub mod compile;
pub mod expr;

pub use compile::ValidatorCompiler;
pub use expr::ValidatorExpr;
