//! Identifier assignment.
//!
//! A [`NamingContext`] is scoped to one compilation run. Every identifier the
//! emitters declare is registered up front, in document order, by
//! [`NamingContext::register`]; emitters then only look names up, so every
//! emitter sees the same identifiers regardless of which ones run.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::config::{ArtifactNaming, CaseConvention, CompileOptions};
use crate::error::{Error, Result};
use crate::ir::api::OperationNode;
use crate::ir::schema::ComponentTable;
use crate::ir::utils::{RESERVED_WORDS, capitalize_first, lowercase_first};
use crate::render::profile::EmitterProfile;

/// Names the generated modules bind themselves.
const MODULE_BINDINGS: [&str; 3] = ["z", "createRoute", "ApiError"];

/// What a generated identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Validator declaration: `TestSchema`
    Schema,
    /// Derived type alias: `Test`
    Type,
    /// Structural helper type of a recursive component: `NodeType`
    RecursiveType,
    /// Operation fetch wrapper: `createTest`
    Operation,
    /// Parameters interface of an operation: `CreateTestParams`
    Params,
    /// Route descriptor: `createTestRoute`
    Route,
    /// Cache-key constructor of a query operation: `listTestsKey`
    QueryKey,
    /// Client hook, with the profile's prefix: `useListTests`
    Hook(&'static str),
}

impl ArtifactKind {
    fn prefix(self) -> &'static str {
        match self {
            ArtifactKind::Hook(prefix) => prefix,
            _ => "",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::Schema => "Schema",
            ArtifactKind::Type | ArtifactKind::Operation | ArtifactKind::Hook(_) => "",
            ArtifactKind::RecursiveType => "Type",
            ArtifactKind::Params => "Params",
            ArtifactKind::Route => "Route",
            ArtifactKind::QueryKey => "Key",
        }
    }
}

/// An assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// Folded, disambiguated name without the kind prefix or suffix (`Test2`)
    pub stem: String,
    /// Full identifier (`Test2Schema`)
    pub name: String,
    /// Whether the declaration carries `export`.
    pub exported: bool,
}

/// Run-scoped naming state.
#[derive(Debug, Clone)]
pub struct NamingContext {
    schema: ArtifactNaming,
    type_alias: ArtifactNaming,
    disambiguate: bool,
    reserved: HashSet<String>,
    /// identifier -> candidate that claimed it
    used: HashMap<String, String>,
    assigned: HashMap<(ArtifactKind, String), Identifier>,
}

impl NamingContext {
    /// An empty context with the reserved words and module bindings claimed.
    pub fn new(options: &CompileOptions) -> Self {
        let reserved = RESERVED_WORDS
            .iter()
            .chain(MODULE_BINDINGS.iter())
            .map(|word| (*word).to_string())
            .collect();
        Self {
            schema: options.schema,
            type_alias: options.type_alias,
            disambiguate: options.disambiguate,
            reserved,
            used: HashMap::new(),
            assigned: HashMap::new(),
        }
    }

    /// Register every identifier a compilation declares.
    ///
    /// Order is fixed: schema declarations, type aliases, recursive helper
    /// types, then operations with their parameter interfaces and route
    /// descriptors. Within each group, document order. First-seen keeps the
    /// plain name.
    pub fn register(
        &mut self,
        components: &ComponentTable,
        recursive: &BTreeSet<String>,
        operations: &[OperationNode],
    ) -> Result<()> {
        for name in components.names() {
            self.assign(name, ArtifactKind::Schema)?;
        }
        for name in components.names() {
            self.assign(name, ArtifactKind::Type)?;
        }
        for name in components.names().filter(|n| recursive.contains(n.as_str())) {
            self.assign(name, ArtifactKind::RecursiveType)?;
        }
        for op in operations {
            self.assign(&op.id, ArtifactKind::Operation)?;
            if !op.parameters.is_empty() {
                self.assign(&op.id, ArtifactKind::Params)?;
            }
            self.assign(&op.id, ArtifactKind::Route)?;
        }
        Ok(())
    }

    /// Register the identifiers only a client-hook module declares: cache-key
    /// constructors of query operations, then one hook per operation.
    ///
    /// Runs after [`NamingContext::register`], on a copy owned by the hook
    /// renderer, so the names a profile imports are reserved for that module
    /// only.
    pub fn register_hooks(&mut self, operations: &[OperationNode], profile: &EmitterProfile) -> Result<()> {
        self.reserved
            .extend([profile.query_primitive, profile.mutation_primitive].map(str::to_string));
        for op in operations.iter().filter(|op| op.is_query()) {
            self.assign(&op.id, ArtifactKind::QueryKey)?;
        }
        for op in operations {
            self.assign(&op.id, ArtifactKind::Hook(profile.hook_prefix))?;
        }
        Ok(())
    }

    /// Assign (or recall) the identifier for `candidate` as `kind`.
    pub fn assign(&mut self, candidate: &str, kind: ArtifactKind) -> Result<Identifier> {
        let key = (kind, candidate.to_string());
        if let Some(existing) = self.assigned.get(&key) {
            return Ok(existing.clone());
        }

        let base = fold(candidate, self.case(kind));
        let mut attempt = 1usize;
        let identifier = loop {
            let mut stem = if attempt == 1 {
                base.clone()
            } else {
                format!("{base}{attempt}")
            };
            let mut name = format!("{}{stem}{}", kind.prefix(), kind.suffix());
            if self.reserved.contains(&name) {
                stem.insert(0, '_');
                name.insert(0, '_');
            }
            match self.used.get(&name) {
                None => {
                    break Identifier {
                        stem,
                        name,
                        exported: self.is_exported(kind),
                    };
                }
                Some(owner) if !self.disambiguate => {
                    return Err(Error::NamingCollision {
                        candidate: candidate.to_string(),
                        existing: owner.clone(),
                        identifier: name,
                    });
                }
                Some(_) => attempt += 1,
            }
        };

        if attempt > 1 {
            debug!(candidate, identifier = %identifier.name, "disambiguated identifier");
        }
        self.used.insert(identifier.name.clone(), candidate.to_string());
        self.assigned.insert(key, identifier.clone());
        Ok(identifier)
    }

    /// Look up a registered identifier.
    pub fn lookup(&self, candidate: &str, kind: ArtifactKind) -> Option<&Identifier> {
        self.assigned.get(&(kind, candidate.to_string()))
    }

    /// Like [`NamingContext::lookup`], failing for names nobody registered.
    pub fn ident(&self, candidate: &str, kind: ArtifactKind) -> Result<&Identifier> {
        self.lookup(candidate, kind)
            .ok_or_else(|| Error::UnresolvedReference {
                reference: candidate.to_string(),
                from: format!("{kind:?} identifier lookup"),
            })
    }

    /// Validator constant for a component.
    pub fn schema_ident(&self, component: &str) -> Result<&str> {
        self.ident(component, ArtifactKind::Schema)
            .map(|id| id.name.as_str())
    }

    /// Type alias for a component.
    pub fn type_ident(&self, component: &str) -> Result<&str> {
        self.ident(component, ArtifactKind::Type)
            .map(|id| id.name.as_str())
    }

    /// Whether declarations of `kind` are exported.
    pub fn is_exported(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Schema => self.schema.export,
            ArtifactKind::Type => self.type_alias.export,
            ArtifactKind::RecursiveType => false,
            ArtifactKind::Operation
            | ArtifactKind::Params
            | ArtifactKind::Route
            | ArtifactKind::QueryKey
            | ArtifactKind::Hook(_) => true,
        }
    }

    fn case(&self, kind: ArtifactKind) -> CaseConvention {
        match kind {
            ArtifactKind::Schema => self.schema.case,
            ArtifactKind::Type | ArtifactKind::RecursiveType => self.type_alias.case,
            ArtifactKind::Operation | ArtifactKind::Route | ArtifactKind::QueryKey => CaseConvention::CamelCase,
            ArtifactKind::Params | ArtifactKind::Hook(_) => CaseConvention::PascalCase,
        }
    }
}

/// Fold a candidate name into an identifier under `case`.
///
/// Non-alphanumeric characters separate words; each word gets a leading
/// capital and the words are joined. The first letter then follows `case`.
pub fn fold(candidate: &str, case: CaseConvention) -> String {
    let joined: String = candidate
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect();
    if joined.is_empty() {
        return "_".to_string();
    }
    let mut folded = match case {
        CaseConvention::PascalCase => joined,
        CaseConvention::CamelCase => lowercase_first(&joined),
    };
    if folded.starts_with(|c: char| c.is_ascii_digit()) {
        folded.insert(0, '_');
    }
    folded
}
