use std::collections::VecDeque;

use util::HashSet;
use workflow::{EdgeId, Workflow};

use crate::{EdgeIndex, Folder, GraphExpr, Resolver};

const QUEUE_CAPACITY: usize = 32;

/// Breadth-first edge folding. Tracks which edges have been processed
/// across every expression it builds, so the component pass can see
/// what the main pass left over.
pub struct Builder<'a> {
    wf: &'a Workflow,
    index: &'a EdgeIndex,
    resolver: Resolver<'a>,
    folder: Folder<'a>,
    processed: HashSet<EdgeId>,
}

/// Work queue for one expression.
pub(crate) struct EdgeQueue {
    edges: VecDeque<EdgeId>,
    queued: HashSet<EdgeId>,
}

impl EdgeQueue {
    pub(crate) fn new() -> Self {
        Self {
            edges: VecDeque::with_capacity(QUEUE_CAPACITY),
            queued: HashSet::default(),
        }
    }

    /// Add `edge` unless it was ever queued before. Returns true if it was added.
    pub(crate) fn push(&mut self, edge: EdgeId) -> bool {
        if self.queued.insert(edge) {
            self.edges.push_back(edge);
            true
        } else {
            false
        }
    }
}

impl<'a> Builder<'a> {
    pub fn new(wf: &'a Workflow, index: &'a EdgeIndex) -> Self {
        Self {
            wf,
            index,
            resolver: Resolver::new(wf),
            folder: Folder::new(wf, index),
            processed: HashSet::with_capacity_and_hasher(wf.num_edges(), Default::default()),
        }
    }

    #[inline]
    pub fn workflow(&self) -> &'a Workflow {
        self.wf
    }

    #[inline]
    pub fn resolver(&self) -> Resolver<'a> {
        self.resolver
    }

    #[inline]
    pub fn is_processed(&self, edge: EdgeId) -> bool {
        self.processed.contains(&edge)
    }

    /// Mark `edge` as handled without folding it.
    #[inline]
    pub(crate) fn skip(&mut self, edge: EdgeId) {
        self.processed.insert(edge);
    }

    /// Build the expression reachable from the entry anchor(s).
    pub fn build_main(&mut self) -> GraphExpr {
        let mut seeds = Vec::with_capacity(2);
        let mut queue = EdgeQueue::new();
        for edge in self.index.entry_edges() {
            if let Some(trigger) = self.wf.lookup_trigger(self.wf.edge(*edge).source_node) {
                let seed = GraphExpr::Trigger(trigger);
                if !seeds.contains(&seed) {
                    seeds.push(seed);
                }
            }
            queue.push(*edge);
        }
        let seed = crate::algebra::flatten(seeds, self.wf);

        log::info!("building main expression from {} entry edges", queue.edges.len());
        self.drain(seed, &mut queue, None)
    }

    /// Fold queued edges into `expr` until the queue runs dry. With a `scope`,
    /// only edges inside it are ever enqueued.
    pub(crate) fn drain(
        &mut self,
        mut expr: GraphExpr,
        queue: &mut EdgeQueue,
        scope: Option<&HashSet<EdgeId>>,
    ) -> GraphExpr {
        while let Some(edge) = queue.edges.pop_front() {
            expr = self.step(expr, edge, queue, scope);
        }
        expr
    }

    fn step(
        &mut self,
        expr: GraphExpr,
        edge: EdgeId,
        queue: &mut EdgeQueue,
        scope: Option<&HashSet<EdgeId>>,
    ) -> GraphExpr {
        self.processed.insert(edge);
        let Some(resolved) = self.resolver.resolve_edge(edge) else {
            return expr;
        };

        let expr = match self.folder.fold_edge(&expr, &resolved) {
            Some(folded) => {
                log::trace!("folded edge {}: {:?}", self.describe(edge), folded);
                folded
            }
            None => {
                log::debug!("edge {} has no place in the expression", self.describe(edge));
                expr
            }
        };

        for next in self.index.outgoing(self.wf, resolved.target) {
            let in_scope = scope.map_or(true, |s| s.contains(&next));
            if in_scope && !self.processed.contains(&next) {
                queue.push(next);
            }
        }
        expr
    }

    pub(crate) fn describe(&self, edge: EdgeId) -> &'a str {
        self.wf
            .ident_str(self.wf.edge(edge).ident)
            .unwrap_or("<unknown>")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algebra::test::{seq, set, Names};
    use anyhow::Result;
    use workflow::{NodeDef, WorkflowDef};

    #[test]
    fn test_queue_never_repeats() {
        let mut queue = EdgeQueue::new();
        assert!(queue.push(3usize.into()));
        assert!(!queue.push(3usize.into()));
        assert_eq!(Some(EdgeId::from(3usize)), queue.edges.pop_front());
        assert!(!queue.push(3usize.into()));
        assert!(queue.edges.is_empty());
    }

    #[test]
    fn test_main_marks_processed() -> Result<()> {
        let def = WorkflowDef::with_entrypoint("entry")
            .nodes(&["a", "b", "x", "y"])
            .edge("entry", "a")
            .edge("a", "b")
            .edge("x", "y");
        let wf = Workflow::load(def)?;
        let index = EdgeIndex::new(&wf);
        let mut builder = Builder::new(&wf, &index);
        let w = Names(&wf);

        assert_eq!(seq(w.n("a"), w.n("b")), builder.build_main());
        assert!(builder.is_processed(0usize.into()));
        assert!(builder.is_processed(1usize.into()));
        assert!(!builder.is_processed(2usize.into()));
        Ok(())
    }

    #[test]
    fn test_main_seeds_triggers() -> Result<()> {
        let def = WorkflowDef::default()
            .trigger("t")
            .trigger("u")
            .nodes(&["a", "b"])
            .edge("t", "a")
            .edge("u", "b");
        let wf = Workflow::load(def)?;
        let index = EdgeIndex::new(&wf);
        let mut builder = Builder::new(&wf, &index);
        let w = Names(&wf);

        assert_eq!(
            set(vec![seq(w.t("t"), w.n("a")), seq(w.t("u"), w.n("b"))]),
            builder.build_main()
        );
        Ok(())
    }

    #[test]
    fn test_main_without_entry_edges() -> Result<()> {
        let def = WorkflowDef::with_entrypoint("entry")
            .node(NodeDef::new("a"))
            .edge("a", "a");
        let wf = Workflow::load(def)?;
        let index = EdgeIndex::new(&wf);
        let mut builder = Builder::new(&wf, &index);
        assert_eq!(GraphExpr::Empty, builder.build_main());
        Ok(())
    }
}
