//! Serializable workflow document, as handed to us after schema validation.
//!
//! ```json
//! {
//!   "entrypoint": "entry",
//!   "nodes": [
//!     { "id": "a", "label": "Fetch" },
//!     { "id": "cond", "label": "Check",
//!       "ports": [{ "id": "cond-if", "name": "if" }, { "id": "cond-else", "name": "else" }] }
//!   ],
//!   "edges": [
//!     { "id": "e1", "source_node_id": "entry", "target_node_id": "a" },
//!     { "id": "e2", "source_node_id": "a", "target_node_id": "cond" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Top-level workflow document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDef {
    /// Id of the structural entrypoint. It is not a node; edges leaving it
    /// start the main graph when no triggers are declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,
    #[serde(default)]
    pub triggers: Vec<TriggerDef>,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub edges: Vec<EdgeDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub ports: Vec<PortDef>,
    /// Id of the node's unconditional port, if it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_port: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDef {
    pub id: String,
    pub source_node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port_id: Option<String>,
    pub target_node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port_id: Option<String>,
}

// Builders, mostly so tests can describe graphs tersely:
impl WorkflowDef {
    pub fn with_entrypoint(id: &str) -> Self {
        Self {
            entrypoint: Some(id.to_owned()),
            ..Self::default()
        }
    }

    pub fn trigger(mut self, id: &str) -> Self {
        self.triggers.push(TriggerDef {
            id: id.to_owned(),
            label: None,
        });
        self
    }

    pub fn node(mut self, node: NodeDef) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add plain nodes (no declared ports) labelled by their ids.
    pub fn nodes(mut self, ids: &[&str]) -> Self {
        self.nodes.extend(ids.iter().map(|id| NodeDef::new(id)));
        self
    }

    /// Add an edge from `source` to `target`. `source` may be written as
    /// `"node.port"` to leave through a specific port.
    pub fn edge(mut self, source: &str, target: &str) -> Self {
        let id = format!("e{}", self.edges.len());
        let (node, port) = match source.split_once('.') {
            Some((node, _)) => (node, Some(source.to_owned())),
            None => (source, None),
        };
        self.edges.push(EdgeDef {
            id,
            source_node_id: node.to_owned(),
            source_port_id: port,
            target_node_id: target.to_owned(),
            target_port_id: None,
        });
        self
    }
}

impl NodeDef {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            label: None,
            ports: Vec::new(),
            default_port: None,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_owned());
        self
    }

    /// Add a port named `name`, with id `"<node id>.<name>"`.
    pub fn port(mut self, name: &str) -> Self {
        self.ports.push(PortDef {
            id: format!("{}.{}", self.id, name),
            name: name.to_owned(),
        });
        self
    }

    /// Add a port like [`NodeDef::port`] and make it the default.
    pub fn default_port(mut self, name: &str) -> Self {
        self = self.port(name);
        self.default_port = Some(format!("{}.{}", self.id, name));
        self
    }
}
