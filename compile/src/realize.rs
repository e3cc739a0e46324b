use anyhow::Result;
use workflow::{NodeId, PortId};

use crate::{Error, GraphExpr, Reference};

/// Receives the primitives of a finished expression tree and assembles them
/// into some output, e.g. source text.
pub trait Renderer {
    type Output;

    /// A node (left through its default port) or a trigger.
    fn reference(&mut self, r: Reference) -> Result<Self::Output>;

    /// A named, non-default port of a node.
    fn attribute(&mut self, node: NodeId, port: PortId) -> Result<Self::Output>;

    fn sequence(&mut self, lhs: Self::Output, rhs: Self::Output) -> Result<Self::Output>;

    /// Parallel branches. `wrap_following_set` is true when this set is the
    /// right-hand side of a sequence whose left-hand side is also a set;
    /// the renderer must then mark it explicitly as a graph fragment.
    fn set(&mut self, items: Vec<Self::Output>, wrap_following_set: bool)
        -> Result<Self::Output>;
}

/// Walk `expr` and hand its primitives to `renderer`.
pub fn realize<R: Renderer>(expr: &GraphExpr, renderer: &mut R) -> Result<R::Output> {
    realize_inner(expr, false, renderer)
}

fn realize_inner<R: Renderer>(
    expr: &GraphExpr,
    follows_set: bool,
    renderer: &mut R,
) -> Result<R::Output> {
    match expr {
        GraphExpr::Empty => Err(Error::EmptyExpression.into()),
        GraphExpr::Node(node) => renderer.reference(Reference::Node(*node)),
        GraphExpr::Trigger(trigger) => renderer.reference(Reference::Trigger(*trigger)),
        GraphExpr::Port(node, port) => renderer.attribute(*node, *port),
        GraphExpr::Sequence(lhs, rhs) => {
            let lhs_out = realize_inner(lhs, false, renderer)?;
            let rhs_out = realize_inner(rhs, lhs.is_set(), renderer)?;
            renderer.sequence(lhs_out, rhs_out)
        }
        GraphExpr::Set(members) => {
            let items = members
                .iter()
                .map(|m| realize_inner(m, false, renderer))
                .collect::<Result<Vec<_>>>()?;
            renderer.set(items, follows_set)
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::algebra::test::{seq, set, Names};
    use workflow::{NodeDef, Workflow, WorkflowDef};

    /// Renders labels, ports as `label.port`, sequences as `(a >> b)`,
    /// sets as `{a, b}` and wrapped sets as `wrap{a, b}`.
    pub struct TestRenderer<'a>(pub &'a Workflow);

    impl Renderer for TestRenderer<'_> {
        type Output = String;

        fn reference(&mut self, r: Reference) -> Result<String> {
            Ok(match r {
                Reference::Node(node) | Reference::Port(node, _) => {
                    self.0.node_label(node)?.to_owned()
                }
                Reference::Trigger(trigger) => self.0.trigger_label(trigger)?.to_owned(),
            })
        }

        fn attribute(&mut self, node: NodeId, port: PortId) -> Result<String> {
            Ok(format!("{}.{}", self.0.node_label(node)?, self.0.port_name(port)?))
        }

        fn sequence(&mut self, lhs: String, rhs: String) -> Result<String> {
            Ok(format!("({} >> {})", lhs, rhs))
        }

        fn set(&mut self, items: Vec<String>, wrap_following_set: bool) -> Result<String> {
            let prefix = if wrap_following_set { "wrap" } else { "" };
            Ok(format!("{}{{{}}}", prefix, items.join(", ")))
        }
    }

    fn load() -> Result<Workflow> {
        let def = WorkflowDef::default()
            .trigger("t")
            .nodes(&["a", "b", "c", "d"])
            .node(NodeDef::new("n").label("Cond").port("if"));
        Workflow::load(def)
    }

    #[test]
    fn test_realize_primitives() -> Result<()> {
        let wf = load()?;
        let w = Names(&wf);
        let mut renderer = TestRenderer(&wf);

        let expr = seq(seq(w.t("t"), w.p("n.if")), set(vec![w.n("a"), w.n("b")]));
        assert_eq!("((t >> Cond.if) >> {a, b})", realize(&expr, &mut renderer)?);
        Ok(())
    }

    #[test]
    fn test_set_after_set_is_wrapped() -> Result<()> {
        let wf = load()?;
        let w = Names(&wf);
        let mut renderer = TestRenderer(&wf);

        let expr = seq(set(vec![w.n("a"), w.n("b")]), set(vec![w.n("c"), w.n("d")]));
        assert_eq!("({a, b} >> wrap{c, d})", realize(&expr, &mut renderer)?);

        // only the set directly after a set:
        let expr = GraphExpr::chain([
            set(vec![w.n("a"), w.n("b")]),
            w.n("c"),
            set(vec![w.n("a"), w.n("d")]),
        ]);
        assert_eq!("(({a, b} >> c) >> {a, d})", realize(&expr, &mut renderer)?);
        Ok(())
    }

    #[test]
    fn test_realize_empty_fails() -> Result<()> {
        let wf = load()?;
        let mut renderer = TestRenderer(&wf);
        let err = realize(&GraphExpr::Empty, &mut renderer).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::EmptyExpression)));
        Ok(())
    }
}
