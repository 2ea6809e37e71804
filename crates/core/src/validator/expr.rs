//! Validator expression tree.
//!
//! A small AST for Zod expressions. It is kept apart from the TypeScript AST
//! in `ir::types` because validator chains are built fluently
//! (`z.string().min(1).optional()`) and object shapes print across lines.

use serde_json::Value;

use crate::ir::Emit;
use crate::ir::utils::{js_number, js_value, quote_if_needed};

/// A Zod expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatorExpr {
    /// `callee(args)` where callee is a dotted path (`z.object`, `z.coerce.number`)
    Call {
        /// Dotted path of the function.
        callee: String,
        /// Call arguments.
        args: Vec<ValidatorExpr>,
    },
    /// `receiver.method(args)`
    Method {
        /// Expression the method is called on.
        receiver: Box<ValidatorExpr>,
        /// Method name.
        method: String,
        /// Call arguments.
        args: Vec<ValidatorExpr>,
    },
    /// Reference to a declared validator
    Ident(String),
    /// `z.lazy(() => inner)`
    Lazy(Box<ValidatorExpr>),
    /// Object shape `{ key: expr }`, one entry per line
    Shape(Vec<(String, ValidatorExpr)>),
    /// `[a, b]`
    Array(Vec<ValidatorExpr>),
    /// JSON value rendered as a JavaScript literal
    Json(Value),
    /// Verbatim code (arrow functions, `new RegExp(...)`)
    Raw(String),
}

impl ValidatorExpr {
    /// `z.<name>(args)`
    pub fn z(name: &str, args: Vec<ValidatorExpr>) -> Self {
        ValidatorExpr::Call {
            callee: format!("z.{name}"),
            args,
        }
    }

    /// Reference to a declared validator.
    pub fn ident(name: impl Into<String>) -> Self {
        ValidatorExpr::Ident(name.into())
    }

    /// String literal.
    pub fn string(value: impl Into<String>) -> Self {
        ValidatorExpr::Json(Value::String(value.into()))
    }

    /// Number literal, without a trailing `.0`.
    pub fn number(value: f64) -> Self {
        ValidatorExpr::Raw(js_number(value))
    }

    /// Chain a method call onto this expression.
    #[must_use]
    pub fn chain(self, method: &str, args: Vec<ValidatorExpr>) -> Self {
        ValidatorExpr::Method {
            receiver: Box::new(self),
            method: method.to_string(),
            args,
        }
    }

    /// Emit with continuation lines indented at `indent` levels of two spaces.
    pub fn emit_indented(&self, indent: usize) -> String {
        match self {
            ValidatorExpr::Call { callee, args } => {
                format!("{callee}({})", emit_args(args, indent))
            }
            ValidatorExpr::Method {
                receiver,
                method,
                args,
            } => format!(
                "{}.{method}({})",
                receiver.emit_indented(indent),
                emit_args(args, indent)
            ),
            ValidatorExpr::Ident(name) => name.clone(),
            ValidatorExpr::Lazy(inner) => {
                format!("z.lazy(() => {})", inner.emit_indented(indent))
            }
            ValidatorExpr::Shape(entries) if entries.is_empty() => "{}".to_string(),
            ValidatorExpr::Shape(entries) => {
                let pad = "  ".repeat(indent + 1);
                let mut out = String::from("{\n");
                for (key, value) in entries {
                    out.push_str(&format!(
                        "{pad}{}: {},\n",
                        quote_if_needed(key),
                        value.emit_indented(indent + 1)
                    ));
                }
                out.push_str(&"  ".repeat(indent));
                out.push('}');
                out
            }
            ValidatorExpr::Array(items) => {
                let emitted: Vec<String> = items.iter().map(|i| i.emit_indented(indent + 1)).collect();
                if emitted.iter().any(|item| item.contains('\n')) {
                    let pad = "  ".repeat(indent + 1);
                    let mut out = String::from("[\n");
                    for item in &emitted {
                        out.push_str(&format!("{pad}{item},\n"));
                    }
                    out.push_str(&"  ".repeat(indent));
                    out.push(']');
                    out
                } else {
                    format!("[{}]", emitted.join(", "))
                }
            }
            ValidatorExpr::Json(value) => js_value(value),
            ValidatorExpr::Raw(code) => code.clone(),
        }
    }
}

fn emit_args(args: &[ValidatorExpr], indent: usize) -> String {
    args.iter()
        .map(|arg| arg.emit_indented(indent))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Emit for ValidatorExpr {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}
