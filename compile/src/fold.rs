//! Folding a single edge into an expression tree.

use workflow::{NodeId, Workflow};

use crate::algebra::{
    extend_tail, factor_common_suffix, flatten, pop_shared_prefix, prefix_set, terminals,
};
use crate::{EdgeIndex, GraphExpr, Reference, ResolvedEdge};

/// Where a sub-expression starts from, as seen by its parent.
/// A source the anchor admits can start a new branch alongside the sub-expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// Top of the tree: admits edges leaving the structural entrypoint.
    Entry,
    /// Right-hand side of a sequence: admits edges leaving any of these exits.
    Terminals(Vec<Reference>),
}

impl Anchor {
    pub fn admits(&self, source: Option<Reference>) -> bool {
        match (self, source) {
            (Anchor::Entry, None) => true,
            (Anchor::Terminals(refs), Some(s)) => refs.contains(&s) || refs.contains(&s.owner()),
            _ => false,
        }
    }
}

/// Folds resolved edges into expressions, one edge at a time.
#[derive(Clone, Copy)]
pub struct Folder<'a> {
    wf: &'a Workflow,
    index: &'a EdgeIndex,
}

impl<'a> Folder<'a> {
    pub fn new(wf: &'a Workflow, index: &'a EdgeIndex) -> Self {
        Self { wf, index }
    }

    /// Fold `edge` into a top-level expression.
    #[inline]
    pub fn fold_edge(&self, expr: &GraphExpr, edge: &ResolvedEdge) -> Option<GraphExpr> {
        self.fold(expr, edge.source, edge.target, &Anchor::Entry)
    }

    /// Return a new tree that also contains the edge `source -> target`,
    /// or `None` if the edge has no place in `expr`.
    pub fn fold(
        &self,
        expr: &GraphExpr,
        source: Option<Reference>,
        target: NodeId,
        anchor: &Anchor,
    ) -> Option<GraphExpr> {
        match expr {
            GraphExpr::Empty => Some(GraphExpr::Node(target)),
            GraphExpr::Sequence(lhs, rhs) => self.fold_sequence(lhs, rhs, source, target, anchor),
            GraphExpr::Set(members) => self.fold_set(members, source, target, anchor),
            leaf => {
                let leaf_ref = leaf.reference()?;
                self.fold_leaf(leaf_ref, source, target, anchor)
            }
        }
    }

    fn fold_leaf(
        &self,
        leaf: Reference,
        source: Option<Reference>,
        target: NodeId,
        anchor: &Anchor,
    ) -> Option<GraphExpr> {
        let target_expr = GraphExpr::Node(target);
        match (leaf, source) {
            (leaf, Some(s)) if leaf == s => Some(GraphExpr::sequence(leaf.into(), target_expr)),
            // leaving a bare node through one of its ports names the port:
            (Reference::Node(n), Some(s @ Reference::Port(m, _))) if n == m => {
                Some(GraphExpr::sequence(s.into(), target_expr))
            }
            // leaving a port-leaf's node some other way branches off beside it:
            (Reference::Port(n, _), Some(s @ (Reference::Port(m, _) | Reference::Node(m))))
                if n == m =>
            {
                Some(flatten(
                    vec![leaf.into(), GraphExpr::sequence(s.into(), target_expr)],
                    self.wf,
                ))
            }
            _ if anchor.admits(source) => Some(flatten(vec![leaf.into(), target_expr], self.wf)),
            _ => None,
        }
    }

    fn fold_sequence(
        &self,
        lhs: &GraphExpr,
        rhs: &GraphExpr,
        source: Option<Reference>,
        target: NodeId,
        anchor: &Anchor,
    ) -> Option<GraphExpr> {
        if let Some(new_lhs) = self.fold(lhs, source, target, anchor) {
            let whole = GraphExpr::sequence(lhs.clone(), rhs.clone());
            let combined = flatten(vec![whole, new_lhs], self.wf);
            let GraphExpr::Set(members) = &combined else {
                return Some(combined);
            };
            if let Some(popped) = pop_shared_prefix(members, self.wf) {
                return Some(popped);
            }
            if let Some(merge) = rhs.reference().and_then(Reference::node) {
                if let Some(factored) = factor_common_suffix(members, merge, self.wf) {
                    return Some(factored);
                }
            }
            return Some(combined);
        }

        let rhs_anchor = Anchor::Terminals(terminals(lhs));
        let new_rhs = self.fold(rhs, source, target, &rhs_anchor)?;
        Some(GraphExpr::sequence(lhs.clone(), new_rhs))
    }

    fn fold_set(
        &self,
        members: &[GraphExpr],
        source: Option<Reference>,
        target: NodeId,
        anchor: &Anchor,
    ) -> Option<GraphExpr> {
        if let Some(closed) = self.close_cycle(members, source, target, false) {
            return Some(closed);
        }
        if let Some(merged) = self.merge_shared_tail(members, source, target) {
            return Some(merged);
        }

        // fold into every member, keep the one that yields the richest result:
        let mut best: Option<(usize, u8, GraphExpr)> = None;
        for (i, member) in members.iter().enumerate() {
            let Some(folded) = self.fold(member, source, target, anchor) else {
                continue;
            };
            let priority = if folded.is_set() { 1 } else { 2 };
            if best.as_ref().map_or(true, |(_, p, _)| priority > *p) {
                best = Some((i, priority, folded));
            }
        }
        if let Some((i, _, folded)) = best {
            let mut members = members.to_vec();
            members[i] = folded;
            return Some(self.simplify(flatten(members, self.wf), target));
        }

        if anchor.admits(source) {
            let mut members = members.to_vec();
            members.push(GraphExpr::Node(target));
            return Some(self.simplify(flatten(members, self.wf), target));
        }
        self.close_cycle(members, source, target, true)
    }

    /// Handle an edge whose ends are both already in the set: either a
    /// self-loop, or the back half of a cycle whose forward half we've seen.
    ///
    /// A self-loop is only closed here if the node is a direct member, unless
    /// `anywhere` is set; otherwise it belongs to whichever member holds the node.
    fn close_cycle(
        &self,
        members: &[GraphExpr],
        source: Option<Reference>,
        target: NodeId,
        anywhere: bool,
    ) -> Option<GraphExpr> {
        let source = source?;
        let owner = source.owner();
        let present = |r: Reference| members.iter().any(|m| m.contains(r));
        if !present(Reference::Node(target)) || !present(owner) {
            return None;
        }
        let source_node = source.node()?;

        let mut members = members.to_vec();
        if source_node == target {
            let direct = members
                .iter()
                .any(|m| m.reference().map(Reference::owner) == Some(Reference::Node(target)));
            if !direct && !anywhere {
                return None;
            }
            log::trace!("closing self-loop on {:?}", target);
            members.push(GraphExpr::sequence(source.into(), GraphExpr::Node(target)));
        } else if self.index.has_link(self.wf, target, source_node) {
            let i = members.iter().position(|m| terminals(m).contains(&owner))?;
            log::trace!("closing cycle {:?} -> {:?}", source_node, target);
            members[i] = extend_tail(&members[i], source, target, self.wf);
        } else {
            return None;
        }
        Some(flatten(members, self.wf))
    }

    /// Several members end at the edge's source node: the edge leaves all of
    /// them at once, so they become one branch continuing into the target.
    fn merge_shared_tail(
        &self,
        members: &[GraphExpr],
        source: Option<Reference>,
        target: NodeId,
    ) -> Option<GraphExpr> {
        let source @ Reference::Node(_) = source? else {
            return None;
        };
        let ends_at_source = |m: &GraphExpr| {
            m.steps().last().and_then(|step| step.reference()) == Some(source)
        };
        let (ending, rest): (Vec<_>, Vec<_>) =
            members.iter().cloned().enumerate().partition(|(_, m)| ends_at_source(m));
        if ending.len() < 2 {
            return None;
        }

        let first = ending[0].0;
        let branches = prefix_set(ending.into_iter().map(|(_, m)| m).collect(), self.wf)?;
        log::trace!("merging branches ending at {:?} into {:?}", source, target);
        let mut merged = Vec::with_capacity(rest.len() + 1);
        merged.push((first, GraphExpr::sequence(branches, GraphExpr::Node(target))));
        merged.extend(rest);
        merged.sort_by_key(|(i, _)| *i);
        let members = merged.into_iter().map(|(_, m)| m).collect();
        Some(self.simplify(flatten(members, self.wf), target))
    }

    fn simplify(&self, expr: GraphExpr, target: NodeId) -> GraphExpr {
        let GraphExpr::Set(members) = &expr else {
            return expr;
        };
        pop_shared_prefix(members, self.wf)
            .or_else(|| factor_common_suffix(members, target, self.wf))
            .unwrap_or(expr)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algebra::test::{seq, set, Names};
    use anyhow::Result;
    use workflow::{NodeDef, WorkflowDef};

    fn load() -> Result<Workflow> {
        let def = WorkflowDef::with_entrypoint("entry")
            .nodes(&["a", "b", "c", "m"])
            .node(NodeDef::new("n").default_port("default").port("else"))
            .node(NodeDef::new("cond").port("if").port("else"))
            .edge("a", "b")
            .edge("b", "a");
        Workflow::load(def)
    }

    fn port(wf: &Workflow, id: &str) -> Option<Reference> {
        Names(wf).p(id).reference()
    }

    #[test]
    fn test_anchor_admits() -> Result<()> {
        let wf = load()?;
        let w = Names(&wf);
        let n = Reference::Node(w.id("n"));

        assert!(Anchor::Entry.admits(None));
        assert!(!Anchor::Entry.admits(Some(n)));

        let anchor = Anchor::Terminals(vec![n]);
        assert!(anchor.admits(Some(n)));
        assert!(anchor.admits(port(&wf, "n.else")));
        assert!(!anchor.admits(None));
        assert!(!anchor.admits(Some(Reference::Node(w.id("a")))));
        Ok(())
    }

    #[test]
    fn test_fold_leaf() -> Result<()> {
        let wf = load()?;
        let index = EdgeIndex::new(&wf);
        let folder = Folder::new(&wf, &index);
        let w = Names(&wf);
        let a = Some(Reference::Node(w.id("a")));

        assert_eq!(
            Some(w.n("a")),
            folder.fold(&GraphExpr::Empty, None, w.id("a"), &Anchor::Entry)
        );
        assert_eq!(
            Some(seq(w.n("a"), w.n("b"))),
            folder.fold(&w.n("a"), a, w.id("b"), &Anchor::Entry)
        );
        assert_eq!(
            Some(set(vec![w.n("a"), w.n("b")])),
            folder.fold(&w.n("a"), None, w.id("b"), &Anchor::Entry)
        );
        assert_eq!(None, folder.fold(&w.n("c"), a, w.id("b"), &Anchor::Entry));

        let cond_if = port(&wf, "cond.if");
        let cond_else = port(&wf, "cond.else");
        assert_eq!(
            Some(seq(w.p("cond.if"), w.n("a"))),
            folder.fold(&w.n("cond"), cond_if, w.id("a"), &Anchor::Entry)
        );
        assert_eq!(
            Some(set(vec![w.p("cond.if"), seq(w.p("cond.else"), w.n("b"))])),
            folder.fold(&w.p("cond.if"), cond_else, w.id("b"), &Anchor::Entry)
        );
        Ok(())
    }

    #[test]
    fn test_fold_into_rhs() -> Result<()> {
        let wf = load()?;
        let index = EdgeIndex::new(&wf);
        let folder = Folder::new(&wf, &index);
        let w = Names(&wf);
        let b = Some(Reference::Node(w.id("b")));
        let c = Some(Reference::Node(w.id("c")));

        let expr = seq(w.n("a"), set(vec![w.n("b"), w.n("c")]));
        let expr = folder
            .fold(&expr, b, w.id("m"), &Anchor::Entry)
            .expect("b folds");
        assert_eq!(
            seq(w.n("a"), set(vec![seq(w.n("b"), w.n("m")), w.n("c")])),
            expr
        );

        // second branch into m merges the two:
        let expr = folder
            .fold(&expr, c, w.id("m"), &Anchor::Entry)
            .expect("c folds");
        assert_eq!(
            seq(seq(w.n("a"), set(vec![w.n("b"), w.n("c")])), w.n("m")),
            expr
        );
        Ok(())
    }

    #[test]
    fn test_fold_set_self_loop() -> Result<()> {
        let wf = load()?;
        let index = EdgeIndex::new(&wf);
        let folder = Folder::new(&wf, &index);
        let w = Names(&wf);

        let expr = set(vec![w.n("a"), w.n("n")]);
        let n_else = port(&wf, "n.else");
        assert_eq!(
            Some(set(vec![w.n("a"), w.n("n"), seq(w.p("n.else"), w.n("n"))])),
            folder.fold(&expr, n_else, w.id("n"), &Anchor::Entry)
        );
        Ok(())
    }

    #[test]
    fn test_fold_set_self_loop_inside_member() -> Result<()> {
        let wf = load()?;
        let index = EdgeIndex::new(&wf);
        let folder = Folder::new(&wf, &index);
        let w = Names(&wf);

        // n only appears after c, so the loop stays on that branch:
        let expr = set(vec![w.n("a"), seq(w.n("c"), w.n("n"))]);
        let n_else = port(&wf, "n.else");
        assert_eq!(
            Some(set(vec![
                w.n("a"),
                GraphExpr::chain([w.n("c"), w.p("n.else"), w.n("n")]),
            ])),
            folder.fold(&expr, n_else, w.id("n"), &Anchor::Entry)
        );
        Ok(())
    }

    #[test]
    fn test_fold_set_prefers_members_over_anchor() -> Result<()> {
        let wf = load()?;
        let index = EdgeIndex::new(&wf);
        let folder = Folder::new(&wf, &index);
        let w = Names(&wf);

        let expr = set(vec![w.n("a"), w.n("b")]);
        assert_eq!(
            Some(set(vec![w.n("a"), w.n("c"), w.n("b")])),
            folder.fold(&expr, None, w.id("c"), &Anchor::Entry)
        );
        Ok(())
    }

    #[test]
    fn test_fold_set_merges_shared_tail() -> Result<()> {
        let wf = load()?;
        let index = EdgeIndex::new(&wf);
        let folder = Folder::new(&wf, &index);
        let w = Names(&wf);
        let c = Some(Reference::Node(w.id("c")));

        let expr = set(vec![seq(w.n("b"), w.n("c")), w.n("m"), w.n("c")]);
        assert_eq!(
            Some(set(vec![
                seq(set(vec![seq(w.n("b"), w.n("c")), w.n("c")]), w.n("a")),
                w.n("m"),
            ])),
            folder.fold(&expr, c, w.id("a"), &Anchor::Entry)
        );
        Ok(())
    }

    #[test]
    fn test_fold_set_two_cycle() -> Result<()> {
        let wf = load()?;
        let index = EdgeIndex::new(&wf);
        let folder = Folder::new(&wf, &index);
        let w = Names(&wf);
        let a = Some(Reference::Node(w.id("a")));
        let b = Some(Reference::Node(w.id("b")));

        let expr = set(vec![w.n("a"), w.n("b")]);
        let expr = folder
            .fold(&expr, a, w.id("b"), &Anchor::Entry)
            .expect("a -> b folds");
        assert_eq!(set(vec![seq(w.n("a"), w.n("b")), w.n("b")]), expr);

        let expr = folder
            .fold(&expr, b, w.id("a"), &Anchor::Entry)
            .expect("b -> a folds");
        assert_eq!(
            set(vec![GraphExpr::chain([w.n("a"), w.n("b"), w.n("a")]), w.n("b")]),
            expr
        );
        Ok(())
    }

    #[test]
    fn test_unplaceable_edge() -> Result<()> {
        let wf = load()?;
        let index = EdgeIndex::new(&wf);
        let folder = Folder::new(&wf, &index);
        let w = Names(&wf);
        let c = Some(Reference::Node(w.id("c")));

        let expr = seq(w.n("a"), w.n("b"));
        assert_eq!(None, folder.fold(&expr, c, w.id("m"), &Anchor::Entry));
        Ok(())
    }
}
