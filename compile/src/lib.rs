//!
//! Compiles the edge list of a [`Workflow`] into nested sequence/set expressions.
//!
//! Edges are folded in one at a time, breadth-first from the entry anchor(s):
//! 1. Build the main expression from the edges reachable from the entrypoint or triggers.
//! 2. Partition the edges that were never reached into connected components,
//!    and build one independent expression per component.
//! 3. Hand each finished tree to a [`Renderer`] via [`realize`].
//!
//! Every intermediate tree is a valid graph fragment; an edge that can't be
//! placed (including one with an unknown endpoint) is dropped, never fatal.

use anyhow::Result;
use workflow::Workflow;

/// opaque identities of nodes, ports and triggers
mod reference;
pub use reference::Reference;

mod expr;
pub use expr::GraphExpr;

/// raw ids -> references
mod resolve;
pub use resolve::{Endpoint, ResolvedEdge, Resolver};

/// edge lookups computed once up front
mod index;
pub use index::EdgeIndex;

/// pure rewrites over expression trees
pub mod algebra;

/// folding one edge into a tree
mod fold;
pub use fold::{Anchor, Folder};

/// BFS main loop
mod builder;
pub use builder::Builder;

/// leftover (unreachable) edges
mod components;
pub use components::build_components;

mod realize;
pub use realize::{realize, Renderer};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot realize an empty expression")]
    EmptyExpression,
}

/// Everything compiled out of one workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    /// Expression reachable from the entry anchor(s); `Empty` if there are no entry edges.
    pub main: GraphExpr,
    /// One expression per leftover component, never empty.
    pub components: Vec<GraphExpr>,
}

/// Renderer output for a [`Compiled`] workflow.
#[derive(Debug)]
pub struct Realized<T> {
    pub main: Option<T>,
    pub components: Vec<T>,
}

impl Compiled {
    /// Realize the main expression (if it isn't empty) and every component.
    pub fn realize_with<R: Renderer>(&self, renderer: &mut R) -> Result<Realized<R::Output>> {
        let main = if self.main.is_empty() {
            None
        } else {
            Some(realize(&self.main, renderer)?)
        };
        let components = self
            .components
            .iter()
            .map(|expr| realize(expr, renderer))
            .collect::<Result<_>>()?;
        Ok(Realized { main, components })
    }
}

/// Compile every edge of `wf`.
pub fn compile(wf: &Workflow) -> Compiled {
    let index = EdgeIndex::new(wf);
    let mut builder = Builder::new(wf, &index);

    let main = builder.build_main();
    let components = build_components(&mut builder);
    log::info!(
        "compiled {} edges: main expression {}, {} leftover components",
        wf.num_edges(),
        if main.is_empty() { "empty" } else { "built" },
        components.len(),
    );
    Compiled { main, components }
}
