use anyhow::Result;

use intern::{GetStr, InternStr, LookupStr};
use util::{HashMap, Hasher, IdVec};

use crate::{
    EdgeDef, EdgeId, Error, Errors, IdentId, NameId, NodeDef, NodeId, PortId, TriggerDef,
    TriggerId, WorkflowDef, WorkflowStrings,
};

/// A node in the workflow graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub ident: IdentId,
    pub label: NameId,
    /// Outgoing ports, in declaration order.
    pub ports: Vec<PortId>,
    /// The node's unconditional port, if it has one.
    pub default_port: Option<PortId>,
}

/// A named outgoing port of a node.
#[derive(Debug, Clone)]
pub struct Port {
    pub ident: IdentId,
    pub node: NodeId,
    pub name: NameId,
}

/// A declared trigger: an entry anchor that is not a structural node.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub ident: IdentId,
    pub label: NameId,
}

/// A directed edge. Endpoints are raw ids, which may or may not resolve
/// to anything in the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub ident: IdentId,
    pub source_node: IdentId,
    pub source_port: Option<IdentId>,
    pub target_node: IdentId,
    pub target_port: Option<IdentId>,
}

/// Contains all the information about a workflow graph,
/// in a form the compiler can resolve references against.
#[derive(Debug)]
pub struct Workflow {
    pub strings: WorkflowStrings,
    nodes: IdVec<NodeId, Node>,
    ports: IdVec<PortId, Port>,
    triggers: IdVec<TriggerId, Trigger>,
    edges: IdVec<EdgeId, Edge>,
    node_lookup: HashMap<IdentId, NodeId>,
    port_lookup: HashMap<IdentId, PortId>,
    trigger_lookup: HashMap<IdentId, TriggerId>,
    entrypoint: Option<IdentId>,
}

impl Default for Workflow {
    fn default() -> Self {
        Self {
            strings: WorkflowStrings::default(),
            nodes: IdVec::with_capacity(16),
            ports: IdVec::with_capacity(32),
            triggers: IdVec::with_capacity(2),
            edges: IdVec::with_capacity(32),
            node_lookup: HashMap::with_capacity_and_hasher(16, Hasher::default()),
            port_lookup: HashMap::with_capacity_and_hasher(32, Hasher::default()),
            trigger_lookup: HashMap::with_capacity_and_hasher(2, Hasher::default()),
            entrypoint: None,
        }
    }
}

impl Workflow {
    /// Load a workflow document. Identity problems (duplicate ids, bad default ports)
    /// are collected and reported together; dangling edges are kept as-is.
    pub fn load(def: WorkflowDef) -> Result<Self> {
        let WorkflowDef {
            entrypoint,
            triggers,
            nodes,
            edges,
        } = def;

        let mut wf = Workflow::default();
        let mut errors = Errors::default();

        if let Some(entrypoint) = entrypoint {
            wf.entrypoint = Some(wf.strings.idents.intern(entrypoint)?);
        }
        for trigger in triggers {
            if let Err(e) = wf.add_trigger(trigger) {
                errors.add(e);
            }
        }
        for node in nodes {
            if let Err(e) = wf.add_node(node) {
                errors.add(e);
            }
        }
        for edge in edges {
            wf.add_edge(edge)?;
        }

        errors.print_recap("loading workflow")?;

        log::debug!(
            "loaded workflow with {} nodes, {} ports, {} triggers, {} edges",
            wf.nodes.len(),
            wf.ports.len(),
            wf.triggers.len(),
            wf.edges.len(),
        );
        wf.strings.log_sizes();
        Ok(wf)
    }

    /// Get the node with the given id.
    #[inline]
    pub fn node(&self, node: NodeId) -> &Node {
        self.nodes.get(node)
    }

    /// Get the port with the given id.
    #[inline]
    pub fn port(&self, port: PortId) -> &Port {
        self.ports.get(port)
    }

    /// Get the edge with the given id.
    #[inline]
    pub fn edge(&self, edge: EdgeId) -> &Edge {
        self.edges.get(edge)
    }

    /// Iterate through all edges, in document order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.enumerate()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn has_triggers(&self) -> bool {
        !self.triggers.is_empty()
    }

    /// Outgoing ports of `node`, in declaration order.
    #[inline]
    pub fn ports_of(&self, node: NodeId) -> &[PortId] {
        &self.nodes.get(node).ports
    }

    #[inline]
    pub fn default_port_of(&self, node: NodeId) -> Option<PortId> {
        self.nodes.get(node).default_port
    }

    /// True if `node` can be left without naming a port:
    /// it either declares a default port or declares no ports at all.
    pub fn has_default_exit(&self, node: NodeId) -> bool {
        let node = self.nodes.get(node);
        node.default_port.is_some() || node.ports.is_empty()
    }

    /// Find the node with raw id `ident`.
    #[inline]
    pub fn lookup_node(&self, ident: IdentId) -> Option<NodeId> {
        self.node_lookup.get(&ident).copied()
    }

    /// Find the port with raw id `ident`.
    #[inline]
    pub fn lookup_port(&self, ident: IdentId) -> Option<PortId> {
        self.port_lookup.get(&ident).copied()
    }

    /// Find the trigger with raw id `ident`.
    #[inline]
    pub fn lookup_trigger(&self, ident: IdentId) -> Option<TriggerId> {
        self.trigger_lookup.get(&ident).copied()
    }

    /// True if `ident` is the structural entrypoint marker.
    #[inline]
    pub fn is_entrypoint(&self, ident: IdentId) -> bool {
        self.entrypoint == Some(ident)
    }

    /// Find the interned id for raw id string `id`, if it appears anywhere in the document.
    pub fn ident(&self, id: &str) -> Option<IdentId> {
        self.strings.idents.lookup(id)
    }

    /// Find the node with raw id string `id`.
    pub fn find_node(&self, id: &str) -> Option<NodeId> {
        self.ident(id).and_then(|ident| self.lookup_node(ident))
    }

    /// Find the port with raw id string `id`.
    pub fn find_port(&self, id: &str) -> Option<PortId> {
        self.ident(id).and_then(|ident| self.lookup_port(ident))
    }

    /// Find the trigger with raw id string `id`.
    pub fn find_trigger(&self, id: &str) -> Option<TriggerId> {
        self.ident(id).and_then(|ident| self.lookup_trigger(ident))
    }

    /// Display label of a node.
    pub fn node_label(&self, node: NodeId) -> Result<&str> {
        self.strings.names.get(self.nodes.get(node).label)
    }

    /// Display name of a port.
    pub fn port_name(&self, port: PortId) -> Result<&str> {
        self.strings.names.get(self.ports.get(port).name)
    }

    /// Display label of a trigger.
    pub fn trigger_label(&self, trigger: TriggerId) -> Result<&str> {
        self.strings.names.get(self.triggers.get(trigger).label)
    }

    /// Raw id string behind `ident`.
    pub fn ident_str(&self, ident: IdentId) -> Result<&str> {
        self.strings.idents.get(ident)
    }
}

// building the workflow /////////////
impl Workflow {
    fn add_trigger(&mut self, trigger: TriggerDef) -> Result<()> {
        let ident = self.strings.idents.intern(&trigger.id)?;
        if self.trigger_lookup.contains_key(&ident) || self.node_lookup.contains_key(&ident) {
            return Err(Error::DuplicateId("trigger", trigger.id).into());
        }
        let label = self
            .strings
            .names
            .intern(trigger.label.as_deref().unwrap_or(&trigger.id))?;

        check_capacity("triggers", self.triggers.len(), u8::MAX as usize)?;
        let id = self.triggers.push(Trigger { ident, label });
        self.trigger_lookup.insert(ident, id);
        Ok(())
    }

    fn add_node(&mut self, node: NodeDef) -> Result<()> {
        let ident = self.strings.idents.intern(&node.id)?;
        if self.node_lookup.contains_key(&ident) || self.trigger_lookup.contains_key(&ident) {
            return Err(Error::DuplicateId("node", node.id).into());
        }
        let label = self
            .strings
            .names
            .intern(node.label.as_deref().unwrap_or(&node.id))?;

        check_capacity("nodes", self.nodes.len(), u16::MAX as usize)?;
        let node_id = self.nodes.push(Node {
            ident,
            label,
            ports: Vec::with_capacity(node.ports.len()),
            default_port: None,
        });
        self.node_lookup.insert(ident, node_id);

        for port in node.ports {
            let port_ident = self.strings.idents.intern(&port.id)?;
            if self.port_lookup.contains_key(&port_ident) {
                return Err(Error::DuplicateId("port", port.id).into());
            }
            let name = self.strings.names.intern(&port.name)?;

            check_capacity("ports", self.ports.len(), u16::MAX as usize)?;
            let port_id = self.ports.push(Port {
                ident: port_ident,
                node: node_id,
                name,
            });
            self.port_lookup.insert(port_ident, port_id);
            self.nodes.get_mut(node_id).ports.push(port_id);
        }

        if let Some(default_port) = node.default_port {
            let port = self
                .strings
                .idents
                .lookup(&default_port)
                .and_then(|ident| self.lookup_port(ident))
                .filter(|port| self.ports.get(*port).node == node_id)
                .ok_or_else(|| Error::UnknownDefaultPort {
                    node: node.id.clone(),
                    port: default_port.clone(),
                })?;
            self.nodes.get_mut(node_id).default_port = Some(port);
        }
        Ok(())
    }

    fn add_edge(&mut self, edge: EdgeDef) -> Result<()> {
        let idents = &mut self.strings.idents;
        let edge = Edge {
            ident: idents.intern(&edge.id)?,
            source_node: idents.intern(&edge.source_node_id)?,
            source_port: edge.source_port_id.map(|p| idents.intern(p)).transpose()?,
            target_node: idents.intern(&edge.target_node_id)?,
            target_port: edge.target_port_id.map(|p| idents.intern(p)).transpose()?,
        };
        check_capacity("edges", self.edges.len(), u32::MAX as usize)?;
        self.edges.push(edge);
        Ok(())
    }
}

fn check_capacity(kind: &'static str, len: usize, max: usize) -> Result<(), Error> {
    if len >= max {
        Err(Error::TooMany(kind, max))
    } else {
        Ok(())
    }
}
