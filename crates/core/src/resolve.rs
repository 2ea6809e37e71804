//! Reference resolution and cycle breaking.
//!
//! A depth-first walk over the component graph, in document order, marks every
//! back edge as lazy. Removing the lazy edges leaves an acyclic graph whose DFS
//! postorder is the declaration order used by the emitters.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::error::{Error, Result};
use crate::ir::schema::ComponentTable;
use crate::parse::{SCHEMA_REF_PREFIX, escape_pointer};

/// A reference from one component to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefEdge {
    /// Component holding the reference.
    pub from: String,
    /// Component the reference points at.
    pub to: String,
}

/// The set of edges deferred at emission time.
///
/// Every cycle in the component graph contains at least one of these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSet {
    edges: BTreeSet<RefEdge>,
}

impl CycleSet {
    /// Whether `from -> to` is emitted lazily.
    pub fn contains(&self, from: &str, to: &str) -> bool {
        self.edges.contains(&RefEdge {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Deferred edges in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &RefEdge> {
        self.edges.iter()
    }

    /// Number of deferred edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph is acyclic.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Output of [`resolve`].
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The input table with lazy `Ref` edges marked.
    pub components: ComponentTable,
    /// Edges emitted behind `z.lazy`.
    pub cycles: CycleSet,
    /// Declaration order: each component follows the targets of its non-lazy edges.
    pub order: Vec<String>,
    /// Components that lie on a reference cycle (including self references).
    pub recursive: BTreeSet<String>,
}

impl Resolution {
    /// Whether `name` lies on a reference cycle.
    pub fn is_recursive(&self, name: &str) -> bool {
        self.recursive.contains(name)
    }
}

/// Resolve references, break cycles and compute the declaration order.
pub fn resolve(table: ComponentTable) -> Result<Resolution> {
    check_references(&table)?;

    let (order, lazy) = {
        let mut walker = Walker {
            table: &table,
            in_progress: HashSet::new(),
            done: HashSet::new(),
            order: Vec::with_capacity(table.len()),
            lazy: BTreeSet::new(),
        };
        for name in table.names() {
            if !walker.done.contains(name.as_str()) {
                walker.visit(name);
            }
        }
        (walker.order, walker.lazy)
    };
    let recursive = recursive_components(&table);

    let mut components = table.into_inner();
    for edge in &lazy {
        if let Some(node) = components.get_mut(&edge.from) {
            node.for_each_ref_mut(&mut |target| {
                if target.name == edge.to {
                    target.lazy = true;
                }
            });
        }
    }

    debug!(
        components = components.len(),
        lazy_edges = lazy.len(),
        recursive = recursive.len(),
        "resolved component graph"
    );

    Ok(Resolution {
        components: ComponentTable::new(components),
        cycles: CycleSet { edges: lazy },
        order,
        recursive,
    })
}

fn check_references(table: &ComponentTable) -> Result<()> {
    for (name, node) in table.iter() {
        for target in node.referenced_names() {
            if !table.contains(target) {
                return Err(Error::UnresolvedReference {
                    reference: format!("{SCHEMA_REF_PREFIX}{}", escape_pointer(target)),
                    from: format!("{SCHEMA_REF_PREFIX}{}", escape_pointer(name)),
                });
            }
        }
    }
    Ok(())
}

struct Walker<'a> {
    table: &'a ComponentTable,
    in_progress: HashSet<&'a str>,
    done: HashSet<&'a str>,
    order: Vec<String>,
    lazy: BTreeSet<RefEdge>,
}

impl<'a> Walker<'a> {
    fn visit(&mut self, name: &'a str) {
        let table = self.table;
        self.in_progress.insert(name);
        if let Some(node) = table.get(name) {
            for target in node.referenced_names() {
                if self.in_progress.contains(target) {
                    // Back edge: defer it instead of recursing.
                    self.lazy.insert(RefEdge {
                        from: name.to_string(),
                        to: target.to_string(),
                    });
                } else if !self.done.contains(target) {
                    self.visit(target);
                }
            }
        }
        self.in_progress.remove(name);
        self.done.insert(name);
        self.order.push(name.to_string());
    }
}

/// Members of non-trivial strongly connected components, plus self-referencing nodes.
fn recursive_components(table: &ComponentTable) -> BTreeSet<String> {
    let mut graph = DiGraph::<&str, ()>::new();
    let indices: HashMap<&str, NodeIndex> = table
        .names()
        .map(|name| (name.as_str(), graph.add_node(name.as_str())))
        .collect();

    for (name, node) in table.iter() {
        let Some(&from) = indices.get(name.as_str()) else {
            continue;
        };
        for target in node.referenced_names() {
            if let Some(&to) = indices.get(target) {
                graph.update_edge(from, to, ());
            }
        }
    }

    let mut recursive = BTreeSet::new();
    for scc in kosaraju_scc(&graph) {
        let cyclic = scc.len() > 1 || scc.first().is_some_and(|&n| graph.contains_edge(n, n));
        if cyclic {
            recursive.extend(scc.iter().map(|&n| graph[n].to_string()));
        }
    }
    recursive
}
