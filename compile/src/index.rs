use util::{HashMap, HashSet};
use workflow::{EdgeId, IdentId, NodeId, Workflow};

/// Lookups over the full edge list, computed once before building.
#[derive(Debug, Default)]
pub struct EdgeIndex {
    /// source port id -> edges leaving through that port
    by_port: HashMap<IdentId, Vec<EdgeId>>,
    /// source node id -> edges that don't name a source port
    portless: HashMap<IdentId, Vec<EdgeId>>,
    /// edges leaving the entry anchor(s), in document order
    entry_edges: Vec<EdgeId>,
    /// (source node id, target node id) of every edge
    links: HashSet<(IdentId, IdentId)>,
}

impl EdgeIndex {
    pub fn new(wf: &Workflow) -> Self {
        let mut index = Self::default();
        let use_triggers = wf.has_triggers();

        for (id, edge) in wf.edges() {
            match edge.source_port {
                Some(port) => index.by_port.entry(port).or_default().push(id),
                None => index.portless.entry(edge.source_node).or_default().push(id),
            }
            index.links.insert((edge.source_node, edge.target_node));

            let is_entry = if use_triggers {
                wf.lookup_trigger(edge.source_node).is_some()
            } else {
                wf.is_entrypoint(edge.source_node)
            };
            if is_entry {
                index.entry_edges.push(id);
            }
        }

        log::debug!(
            "indexed {} edges, {} leaving the entry {}",
            wf.num_edges(),
            index.entry_edges.len(),
            if use_triggers { "triggers" } else { "point" },
        );
        index
    }

    /// Edges leaving a declared trigger or, if no triggers are declared,
    /// the structural entrypoint.
    #[inline]
    pub fn entry_edges(&self) -> &[EdgeId] {
        &self.entry_edges
    }

    /// Edges leaving any port of `node`: port by port in declaration order,
    /// then the ones that don't name a port.
    pub fn outgoing(&self, wf: &Workflow, node: NodeId) -> Vec<EdgeId> {
        let mut edges = Vec::with_capacity(4);
        for port in wf.ports_of(node) {
            if let Some(by_port) = self.by_port.get(&wf.port(*port).ident) {
                edges.extend_from_slice(by_port);
            }
        }
        if let Some(portless) = self.portless.get(&wf.node(node).ident) {
            edges.extend_from_slice(portless);
        }
        edges
    }

    /// True if any edge in the whole workflow goes from `source` to `target`.
    #[inline]
    pub fn has_link(&self, wf: &Workflow, source: NodeId, target: NodeId) -> bool {
        self.links
            .contains(&(wf.node(source).ident, wf.node(target).ident))
    }
}
