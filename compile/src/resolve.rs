use workflow::{EdgeId, IdentId, NodeId, TriggerId, Workflow};

use crate::Reference;

/// What the source id of an edge points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The structural entrypoint; it has no expression of its own.
    Entrypoint,
    Trigger(TriggerId),
    Node(NodeId),
}

/// An edge whose endpoints were all found in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEdge {
    pub id: EdgeId,
    /// `None` when the edge leaves the structural entrypoint.
    pub source: Option<Reference>,
    pub target: NodeId,
}

/// Turns raw ids into references. Never fails loudly: anything that
/// can't be found comes back as `None`, and the caller drops the edge.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    wf: &'a Workflow,
}

impl<'a> Resolver<'a> {
    pub fn new(wf: &'a Workflow) -> Self {
        Self { wf }
    }

    /// Resolve the source id of an edge.
    pub fn resolve_source(&self, ident: IdentId) -> Option<Endpoint> {
        if self.wf.is_entrypoint(ident) {
            Some(Endpoint::Entrypoint)
        } else if let Some(trigger) = self.wf.lookup_trigger(ident) {
            Some(Endpoint::Trigger(trigger))
        } else {
            self.resolve_target(ident).map(Endpoint::Node)
        }
    }

    /// Resolve the target id of an edge. Only concrete nodes can be targets.
    #[inline]
    pub fn resolve_target(&self, ident: IdentId) -> Option<NodeId> {
        self.wf.lookup_node(ident)
    }

    /// Resolve both ends of edge `id`, or `None` if the edge dangles.
    pub fn resolve_edge(&self, id: EdgeId) -> Option<ResolvedEdge> {
        let edge = self.wf.edge(id);

        let Some(target) = self.resolve_target(edge.target_node) else {
            log::debug!("dropping edge {}: unknown target", self.describe(edge.ident));
            return None;
        };

        let source = match self.resolve_source(edge.source_node) {
            Some(Endpoint::Entrypoint) => None,
            Some(Endpoint::Trigger(trigger)) => Some(Reference::Trigger(trigger)),
            Some(Endpoint::Node(node)) => match self.port_reference(node, edge.source_port) {
                Some(r) => Some(r),
                None => {
                    log::debug!("dropping edge {}: unknown source port", self.describe(edge.ident));
                    return None;
                }
            },
            None => {
                log::debug!("dropping edge {}: unknown source", self.describe(edge.ident));
                return None;
            }
        };

        Some(ResolvedEdge { id, source, target })
    }

    /// Reference for leaving `node` through `port`. The default port (or no port)
    /// gives the node itself; a port owned by some other node gives `None`.
    fn port_reference(&self, node: NodeId, port: Option<IdentId>) -> Option<Reference> {
        let Some(port) = port else {
            return Some(Reference::Node(node));
        };
        let port = self.wf.lookup_port(port)?;
        if self.wf.port(port).node != node {
            None
        } else if self.wf.default_port_of(node) == Some(port) {
            Some(Reference::Node(node))
        } else {
            Some(Reference::Port(node, port))
        }
    }

    fn describe(&self, ident: IdentId) -> &str {
        self.wf.ident_str(ident).unwrap_or("<unknown>")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Result;
    use workflow::{NodeDef, WorkflowDef};

    fn load() -> Result<Workflow> {
        let mut def = WorkflowDef::with_entrypoint("entry")
            .trigger("t")
            .node(NodeDef::new("n").default_port("default").port("else"))
            .node(NodeDef::new("m").port("if"))
            .edge("entry", "n")
            .edge("t", "n")
            .edge("n.default", "m")
            .edge("n.else", "m")
            .edge("n", "m")
            .edge("m.if", "nowhere")
            .edge("n", "m");
        // last edge leaves n through a port that belongs to m:
        def.edges[6].source_port_id = Some("m.if".to_owned());
        Workflow::load(def)
    }

    #[test]
    fn test_resolve_sources() -> Result<()> {
        let wf = load()?;
        let resolver = Resolver::new(&wf);
        let n = wf.find_node("n").expect("n");

        let entry = wf.ident("entry").expect("entry");
        assert_eq!(Some(Endpoint::Entrypoint), resolver.resolve_source(entry));
        let t = wf.ident("t").expect("t");
        let trigger = wf.find_trigger("t").expect("trigger");
        assert_eq!(Some(Endpoint::Trigger(trigger)), resolver.resolve_source(t));
        let n_ident = wf.ident("n").expect("n ident");
        assert_eq!(Some(Endpoint::Node(n)), resolver.resolve_source(n_ident));
        assert_eq!(None, resolver.resolve_target(entry));
        Ok(())
    }

    #[test]
    fn test_resolve_edges() -> Result<()> {
        let wf = load()?;
        let resolver = Resolver::new(&wf);
        let n = wf.find_node("n").expect("n");
        let m = wf.find_node("m").expect("m");
        let n_else = wf.find_port("n.else").expect("n.else");
        let trigger = wf.find_trigger("t").expect("trigger");

        let resolved: Vec<_> = (0..wf.num_edges())
            .map(|i| resolver.resolve_edge(i.into()).map(|e| (e.source, e.target)))
            .collect();

        assert_eq!(Some((None, n)), resolved[0]);
        assert_eq!(Some((Some(Reference::Trigger(trigger)), n)), resolved[1]);
        // leaving through the default port is the same as leaving the node:
        assert_eq!(Some((Some(Reference::Node(n)), m)), resolved[2]);
        assert_eq!(Some((Some(Reference::Port(n, n_else)), m)), resolved[3]);
        assert_eq!(Some((Some(Reference::Node(n)), m)), resolved[4]);
        // dangling target:
        assert_eq!(None, resolved[5]);
        // port owned by another node:
        assert_eq!(None, resolved[6]);
        Ok(())
    }
}
