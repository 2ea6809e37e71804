//! TypeScript syntax tree for the client-hook module and structural types.
//!
//! Only the constructs the emitters produce are modelled. Fetch bodies that
//! would need a full statement grammar go through `Raw`.

/// A type position.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// Built-in keyword type
    Primitive(TsPrimitive),
    /// `T[]`, parenthesized when `T` is a union or intersection
    Array(Box<TsType>),
    /// `[A, B]`
    Tuple(Vec<TsType>),
    /// `A | B`
    Union(Vec<TsType>),
    /// `A & B`
    Intersection(Vec<TsType>),
    /// Inline object type `{ id: number; tag?: string }`
    Object(Vec<TsProp>),
    /// String-keyed map: `{ [key: string]: V }`, or `{ [K in Keys]?: V }` for literal keys
    Record {
        /// `string`, or a union of string literals
        key: Box<TsType>,
        /// Value type
        value: Box<TsType>,
    },
    /// Singleton type from a `const` or enum member
    Literal(TsLiteral),
    /// Named type reference, emitted verbatim
    Ref(String),
}

impl TsType {
    /// `string`
    pub fn string() -> Self {
        TsType::Primitive(TsPrimitive::String)
    }

    /// `unknown`
    pub fn unknown() -> Self {
        TsType::Primitive(TsPrimitive::Unknown)
    }

    /// `T | null`, flattening an existing union.
    pub fn nullable(self) -> Self {
        match self {
            TsType::Union(mut types) => {
                if !types.contains(&TsType::Primitive(TsPrimitive::Null)) {
                    types.push(TsType::Primitive(TsPrimitive::Null));
                }
                TsType::Union(types)
            }
            TsType::Primitive(TsPrimitive::Null | TsPrimitive::Unknown) => self,
            other => TsType::Union(vec![other, TsType::Primitive(TsPrimitive::Null)]),
        }
    }
}

/// Keyword types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// `unknown`
    Unknown,
}

/// One member of an object type or interface.
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    /// Key, quoted on emission when it is not an identifier
    pub name: String,
    /// Member type
    pub ty: TsType,
    /// Emitted as `name?:`
    pub optional: bool,
}

/// Literal values, usable as types and as expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    /// Double-quoted string
    String(String),
    /// Float, printed without a trailing `.0`
    Number(f64),
    /// Integer
    Int(i64),
    /// `true` or `false`
    Bool(bool),
    /// `null`
    Null,
}

/// An expression position.
#[derive(Debug, Clone)]
pub enum TsExpr {
    /// Bare identifier
    Ident(String),
    /// Literal value
    Literal(TsLiteral),
    /// `callee(args)`
    Call {
        /// Called expression
        callee: Box<TsExpr>,
        /// Arguments
        args: Vec<TsExpr>,
    },
    /// `object.prop`
    Member {
        /// Receiver
        object: Box<TsExpr>,
        /// Property name
        prop: String,
    },
    /// `await inner`
    Await(Box<TsExpr>),
    /// `left op right`
    BinOp {
        /// Left operand
        left: Box<TsExpr>,
        /// Operator
        op: BinOp,
        /// Right operand
        right: Box<TsExpr>,
    },
    /// `new callee(args)`
    New {
        /// Constructor
        callee: Box<TsExpr>,
        /// Arguments
        args: Vec<TsExpr>,
    },
    /// `cond ? then_expr : else_expr`
    Ternary {
        /// Condition
        cond: Box<TsExpr>,
        /// Value when `cond` holds
        then_expr: Box<TsExpr>,
        /// Value otherwise
        else_expr: Box<TsExpr>,
    },
    /// Code emitted verbatim (template literals, object spreads)
    Raw(String),
}

impl TsExpr {
    /// Bare identifier.
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    /// String literal.
    pub fn string(value: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(value.into()))
    }

    /// `self.method(args)`
    pub fn method(self, method: impl Into<String>, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(TsExpr::Member {
                object: Box::new(self),
                prop: method.into(),
            }),
            args,
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy)]
pub enum BinOp {
    /// `!=`
    NotEqual,
    /// `===`
    StrictEqual,
}

/// `name?: ty` in a parameter list.
#[derive(Debug, Clone)]
pub struct TsParam {
    /// Binding name
    pub name: String,
    /// Annotation, omitted when `None`
    pub ty: Option<TsType>,
    /// Emitted as `name?:`
    pub optional: bool,
}

/// `import [type] [default, ]{ items } from "from";`
#[derive(Debug, Clone)]
pub struct TsImport {
    /// Default export binding, as in `import useSWR from "swr"`
    pub default: Option<String>,
    /// Named bindings
    pub items: Vec<String>,
    /// Module specifier
    pub from: String,
    /// `import type`
    pub type_only: bool,
}

/// Body of a top-level type declaration.
#[derive(Debug, Clone)]
pub enum TypeDefKind {
    /// `interface Name { ... }`
    Interface {
        /// Members in declaration order
        properties: Vec<TsProp>,
    },
    /// `type Name = ty;`
    TypeAlias {
        /// Aliased type
        ty: TsType,
    },
}

/// A top-level `interface` or `type` declaration.
#[derive(Debug, Clone)]
pub struct TsTypeDef {
    /// Declared name
    pub name: String,
    /// Interface or alias body
    pub kind: TypeDefKind,
    /// Prefixed with `export`
    pub exported: bool,
}

/// Statements inside a function body.
#[derive(Debug, Clone)]
pub enum TsStmt {
    /// `const name[: ty] = init;`
    Const {
        /// Binding name
        name: String,
        /// Annotation, omitted when `None`
        ty: Option<TsType>,
        /// Initializer
        init: TsExpr,
    },
    /// `return [value];`
    Return(Option<TsExpr>),
    /// `if (cond) { then_body }`
    If {
        /// Condition
        cond: TsExpr,
        /// Statements run when `cond` holds
        then_body: Vec<TsStmt>,
    },
    /// Verbatim lines, re-indented to the enclosing block
    Raw(String),
}

/// A top-level function, either `function name()` or `const name = () =>`.
#[derive(Debug, Clone)]
pub struct TsFunction {
    /// Function name
    pub name: String,
    /// Parameter list
    pub params: Vec<TsParam>,
    /// Return annotation, omitted when `None`
    pub return_type: Option<TsType>,
    /// Statements
    pub body: Vec<TsStmt>,
    /// `async`
    pub is_async: bool,
    /// `export`
    pub is_export: bool,
    /// Emitted as `const name = () => {}`
    pub is_arrow: bool,
}

/// One generated file.
#[derive(Debug, Clone, Default)]
pub struct TsModule {
    /// Import declarations, in order
    pub imports: Vec<TsImport>,
    /// Verbatim blocks emitted after the imports (the `ApiError` class)
    pub preamble: Vec<String>,
    /// Type declarations
    pub types: Vec<TsTypeDef>,
    /// Functions, emitted after the types
    pub functions: Vec<TsFunction>,
}
