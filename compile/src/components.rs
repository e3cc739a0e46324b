//! Expressions for the edges the main pass never reached.

use util::{HashMap, HashSet};
use workflow::{EdgeId, IdentId, Workflow};

use crate::algebra::flatten;
use crate::builder::EdgeQueue;
use crate::{Builder, Endpoint, GraphExpr, Reference};

/// Partition every unprocessed edge into connected components and build one
/// expression per component. Components that fold to nothing are left out.
pub fn build_components(builder: &mut Builder) -> Vec<GraphExpr> {
    let wf = builder.workflow();
    let leftover: Vec<EdgeId> = wf
        .edges()
        .map(|(id, _)| id)
        .filter(|id| !builder.is_processed(*id))
        .collect();
    if leftover.is_empty() {
        return Vec::new();
    }

    let components = partition(wf, &leftover);
    log::info!(
        "{} edges left over, in {} components",
        leftover.len(),
        components.len()
    );

    let mut exprs = Vec::with_capacity(components.len());
    for (i, edges) in components.iter().enumerate() {
        let expr = build_component(builder, edges);
        if expr.is_empty() {
            log::debug!("component {} folded to nothing; omitting it", i);
        } else {
            exprs.push(expr);
        }
    }
    exprs
}

/// Group `edges` by shared endpoints. Components come out in order of their
/// first edge, and each component's edges keep their document order.
fn partition(wf: &Workflow, edges: &[EdgeId]) -> Vec<Vec<EdgeId>> {
    let mut touching: HashMap<IdentId, Vec<EdgeId>> = HashMap::default();
    for id in edges {
        let edge = wf.edge(*id);
        touching.entry(edge.source_node).or_default().push(*id);
        if edge.target_node != edge.source_node {
            touching.entry(edge.target_node).or_default().push(*id);
        }
    }

    let mut assigned: HashSet<EdgeId> = HashSet::default();
    let mut components = Vec::with_capacity(2);
    for start in edges {
        if !assigned.insert(*start) {
            continue;
        }
        let mut component = vec![*start];
        let mut stack = vec![*start];
        while let Some(id) = stack.pop() {
            let edge = wf.edge(id);
            for ident in [edge.source_node, edge.target_node] {
                for next in touching.get(&ident).into_iter().flatten() {
                    if assigned.insert(*next) {
                        component.push(*next);
                        stack.push(*next);
                    }
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

/// Source ids of the component that nothing in the component points at,
/// or the first edge's source if every node is on a cycle.
fn roots(wf: &Workflow, edges: &[EdgeId]) -> Vec<IdentId> {
    let targets: HashSet<IdentId> = edges.iter().map(|id| wf.edge(*id).target_node).collect();
    let mut roots = Vec::with_capacity(1);
    for id in edges {
        let source = wf.edge(*id).source_node;
        if !targets.contains(&source) && !roots.contains(&source) {
            roots.push(source);
        }
    }
    if roots.is_empty() {
        roots.extend(edges.first().map(|id| wf.edge(*id).source_node));
    }
    roots
}

fn build_component(builder: &mut Builder, edges: &[EdgeId]) -> GraphExpr {
    let wf = builder.workflow();
    let resolver = builder.resolver();
    let scope: HashSet<EdgeId> = edges.iter().copied().collect();
    let roots = roots(wf, edges);

    // seed with the roots that have at least one edge we can actually place:
    let seeds = edges
        .iter()
        .filter(|id| roots.contains(&wf.edge(**id).source_node))
        .filter_map(|id| resolver.resolve_edge(*id)?.source)
        .map(|source| GraphExpr::from(source.owner()))
        .collect();
    let mut expr = flatten(seeds, wf);
    log::debug!(
        "building component of {} edges from {} roots",
        edges.len(),
        roots.len()
    );

    let mut queue = EdgeQueue::new();
    for id in edges {
        if roots.contains(&wf.edge(*id).source_node) {
            queue.push(*id);
        }
    }
    expr = builder.drain(expr, &mut queue, Some(&scope));

    // edges out of cycles or extra roots are only reachable from what's been built so far:
    loop {
        let pending: Vec<EdgeId> = edges
            .iter()
            .copied()
            .filter(|id| !builder.is_processed(*id))
            .collect();
        let Some(first) = pending.first().copied() else {
            break;
        };

        let mut progressed = false;
        for id in &pending {
            let source = wf.edge(*id).source_node;
            if is_present(&expr, resolver.resolve_source(source)) && queue.push(*id) {
                progressed = true;
            }
        }
        if !progressed {
            // resolve_edge already logged why a dangling edge can't seed anything.
            match resolver.resolve_edge(first).and_then(|edge| edge.source) {
                Some(source) => {
                    expr = flatten(vec![expr, source.owner().into()], wf);
                    queue.push(first);
                }
                None => builder.skip(first),
            }
        }
        expr = builder.drain(expr, &mut queue, Some(&scope));
    }
    expr
}

fn is_present(expr: &GraphExpr, source: Option<Endpoint>) -> bool {
    match source {
        Some(Endpoint::Entrypoint) => true,
        Some(Endpoint::Trigger(trigger)) => expr.contains(Reference::Trigger(trigger)),
        Some(Endpoint::Node(node)) => expr.contains(Reference::Node(node)),
        None => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algebra::test::{seq, set, Names};
    use crate::EdgeIndex;
    use anyhow::Result;
    use workflow::{NodeDef, WorkflowDef};

    fn ids(edges: &[usize]) -> Vec<EdgeId> {
        edges.iter().map(|i| EdgeId::from(*i)).collect()
    }

    #[test]
    fn test_partition() -> Result<()> {
        let def = WorkflowDef::default()
            .nodes(&["a", "b", "c", "x", "y"])
            .edge("a", "b")
            .edge("x", "y")
            .edge("c", "b")
            .edge("y", "x");
        let wf = Workflow::load(def)?;
        let all = ids(&[0, 1, 2, 3]);
        assert_eq!(vec![ids(&[0, 2]), ids(&[1, 3])], partition(&wf, &all));
        Ok(())
    }

    #[test]
    fn test_roots() -> Result<()> {
        let def = WorkflowDef::default()
            .nodes(&["a", "b", "c"])
            .edge("a", "b")
            .edge("c", "b")
            .edge("b", "a")
            .edge("a", "c");
        let wf = Workflow::load(def)?;
        let a = wf.ident("a").expect("a");
        let c = wf.ident("c").expect("c");

        assert_eq!(vec![a, c], roots(&wf, &ids(&[0, 1])));
        // all on a cycle: first edge's source.
        assert_eq!(vec![a], roots(&wf, &ids(&[0, 1, 2, 3])));
        Ok(())
    }

    #[test]
    fn test_component_cycle() -> Result<()> {
        let def = WorkflowDef::default()
            .node(NodeDef::new("n").default_port("default"))
            .node(NodeDef::new("m").default_port("default").port("else"))
            .edge("n.default", "m")
            .edge("m.else", "n");
        let wf = Workflow::load(def)?;
        let index = EdgeIndex::new(&wf);
        let mut builder = Builder::new(&wf, &index);
        let w = Names(&wf);

        assert_eq!(GraphExpr::Empty, builder.build_main());
        assert_eq!(
            vec![GraphExpr::chain([w.n("n"), w.p("m.else"), w.n("n")])],
            build_components(&mut builder)
        );
        Ok(())
    }

    #[test]
    fn test_component_with_two_roots() -> Result<()> {
        let def = WorkflowDef::default()
            .nodes(&["a", "b", "m"])
            .edge("a", "m")
            .edge("b", "m");
        let wf = Workflow::load(def)?;
        let index = EdgeIndex::new(&wf);
        let mut builder = Builder::new(&wf, &index);
        let w = Names(&wf);

        builder.build_main();
        assert_eq!(
            vec![seq(set(vec![w.n("a"), w.n("b")]), w.n("m"))],
            build_components(&mut builder)
        );
        Ok(())
    }

    #[test]
    fn test_dangling_component_is_omitted() -> Result<()> {
        let def = WorkflowDef::default()
            .nodes(&["a"])
            .edge("ghost", "a")
            .edge("a", "nowhere");
        let wf = Workflow::load(def)?;
        let index = EdgeIndex::new(&wf);
        let mut builder = Builder::new(&wf, &index);

        builder.build_main();
        assert!(build_components(&mut builder).is_empty());
        assert!(builder.is_processed(0usize.into()));
        assert!(builder.is_processed(1usize.into()));
        Ok(())
    }
}
