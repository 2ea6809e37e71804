//! TypeScript text from the syntax tree in `types`.
//!
//! Emission is plain string building with two-space indentation, so equal
//! trees always print equal text.

use super::types::{
    BinOp, TsExpr, TsFunction, TsImport, TsLiteral, TsModule, TsParam, TsPrimitive, TsProp,
    TsStmt, TsType, TsTypeDef, TypeDefKind,
};
use super::utils::{js_number, js_string, quote_if_needed};

/// Render a node as TypeScript source.
pub trait Emit {
    /// TypeScript source for this node.
    fn emit(&self) -> String;
}

fn join<T: Emit>(items: &[T], sep: &str) -> String {
    items.iter().map(Emit::emit).collect::<Vec<_>>().join(sep)
}

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        let keyword = match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Unknown => "unknown",
        };
        keyword.to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => js_string(s),
            TsLiteral::Number(n) => js_number(*n),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => match **inner {
                TsType::Union(_) | TsType::Intersection(_) => format!("({})[]", inner.emit()),
                _ => format!("{}[]", inner.emit()),
            },
            TsType::Tuple(items) => format!("[{}]", join(items, ", ")),
            TsType::Union(types) => join(types, " | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| match t {
                    TsType::Union(_) => format!("({})", t.emit()),
                    _ => t.emit(),
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(props) if props.is_empty() => "{}".to_string(),
            TsType::Object(props) => format!("{{ {} }}", join(props, "; ")),
            // Index signatures and mapped types may refer back to their own alias; `Record<K, V>` may not.
            TsType::Record { key, value } => match **key {
                TsType::Primitive(TsPrimitive::String) => format!("{{ [key: string]: {} }}", value.emit()),
                _ => format!("{{ [K in {}]?: {} }}", key.emit(), value.emit()),
            },
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let marker = if self.optional { "?" } else { "" };
        format!("{}{marker}: {}", quote_if_needed(&self.name), self.ty.emit())
    }
}

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let export = if self.exported { "export " } else { "" };
        match &self.kind {
            TypeDefKind::Interface { properties } => {
                let body: String = properties
                    .iter()
                    .map(|prop| format!("  {};\n", prop.emit()))
                    .collect();
                format!("{export}interface {} {{\n{body}}}\n", self.name)
            }
            TypeDefKind::TypeAlias { ty } => format!("{export}type {} = {};\n", self.name, ty.emit()),
        }
    }
}

impl Emit for BinOp {
    fn emit(&self) -> String {
        match self {
            BinOp::NotEqual => "!=",
            BinOp::StrictEqual => "===",
        }
        .to_string()
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) | TsExpr::Raw(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call { callee, args } => format!("{}({})", callee.emit(), join(args, ", ")),
            TsExpr::Member { object, prop } => format!("{}.{prop}", object.emit()),
            TsExpr::Await(inner) => format!("await {}", inner.emit()),
            TsExpr::BinOp { left, op, right } => {
                format!("{} {} {}", left.emit(), op.emit(), right.emit())
            }
            TsExpr::New { callee, args } => format!("new {}({})", callee.emit(), join(args, ", ")),
            TsExpr::Ternary {
                cond,
                then_expr,
                else_expr,
            } => format!("{} ? {} : {}", cond.emit(), then_expr.emit(), else_expr.emit()),
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let marker = if self.optional { "?" } else { "" };
        match &self.ty {
            Some(ty) => format!("{}{marker}: {}", self.name, ty.emit()),
            None => format!("{}{marker}", self.name),
        }
    }
}

impl TsStmt {
    /// Emit at `indent` levels of two spaces; nested blocks go one deeper.
    pub fn emit_indented(&self, indent: usize) -> String {
        let pad = "  ".repeat(indent);
        match self {
            TsStmt::Const { name, ty, init } => {
                let annotation = ty.as_ref().map(|t| format!(": {}", t.emit())).unwrap_or_default();
                format!("{pad}const {name}{annotation} = {};\n", init.emit())
            }
            TsStmt::Return(Some(expr)) => format!("{pad}return {};\n", expr.emit()),
            TsStmt::Return(None) => format!("{pad}return;\n"),
            TsStmt::If { cond, then_body } => {
                let body: String = then_body.iter().map(|s| s.emit_indented(indent + 1)).collect();
                format!("{pad}if ({}) {{\n{body}{pad}}}\n", cond.emit())
            }
            TsStmt::Raw(code) => code
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        "\n".to_string()
                    } else {
                        format!("{pad}{line}\n")
                    }
                })
                .collect(),
        }
    }
}

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl Emit for TsFunction {
    fn emit(&self) -> String {
        let export = if self.is_export { "export " } else { "" };
        let asyncness = if self.is_async { "async " } else { "" };
        let params = join(&self.params, ", ");
        let returns = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        let body: String = self.body.iter().map(|s| s.emit_indented(1)).collect();

        if self.is_arrow {
            let head = format!("{export}const {} = {asyncness}({params}){returns} =>", self.name);
            // Single-return arrows collapse onto one line.
            match self.body.as_slice() {
                [TsStmt::Return(Some(expr))] => format!("{head} {};\n", expr.emit()),
                _ => format!("{head} {{\n{body}}};\n"),
            }
        } else {
            let head = format!("{export}{asyncness}function {}({params}){returns}", self.name);
            if body.is_empty() {
                format!("{head} {{}}\n")
            } else {
                format!("{head} {{\n{body}}}\n")
            }
        }
    }
}

impl Emit for TsImport {
    fn emit(&self) -> String {
        let type_keyword = if self.type_only { "type " } else { "" };
        let named = (!self.items.is_empty()).then(|| format!("{{ {} }}", self.items.join(", ")));
        let bindings = [self.default.clone(), named]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        format!("import {type_keyword}{bindings} from \"{}\";\n", self.from)
    }
}

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut out: String = self.imports.iter().map(Emit::emit).collect();
        if !self.imports.is_empty() {
            out.push('\n');
        }
        for block in &self.preamble {
            out.push_str(block.trim_end());
            out.push_str("\n\n");
        }
        for def in &self.types {
            out.push_str(&def.emit());
            out.push('\n');
        }
        for func in &self.functions {
            out.push_str(&func.emit());
            out.push('\n');
        }

        // Exactly one trailing newline.
        out.truncate(out.trim_end().len());
        out.push('\n');
        out
    }
}
