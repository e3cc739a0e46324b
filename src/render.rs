use anyhow::Result;

use compile::{Reference, Renderer};
use workflow::{NodeId, PortId, Workflow};

/// Renders expressions as python-style graph source:
/// `Label`, `Label.Ports.name`, `a >> b`, `{a, b}`.
///
/// Sequences are assumed to be left-deep, so `>>` never needs parentheses.
pub struct PythonRenderer<'a> {
    wf: &'a Workflow,
}

impl<'a> PythonRenderer<'a> {
    pub fn new(wf: &'a Workflow) -> Self {
        Self { wf }
    }
}

impl Renderer for PythonRenderer<'_> {
    type Output = String;

    fn reference(&mut self, r: Reference) -> Result<String> {
        let label = match r {
            Reference::Node(node) | Reference::Port(node, _) => self.wf.node_label(node)?,
            Reference::Trigger(trigger) => self.wf.trigger_label(trigger)?,
        };
        Ok(label.to_owned())
    }

    fn attribute(&mut self, node: NodeId, port: PortId) -> Result<String> {
        Ok(format!(
            "{}.Ports.{}",
            self.wf.node_label(node)?,
            self.wf.port_name(port)?
        ))
    }

    fn sequence(&mut self, lhs: String, rhs: String) -> Result<String> {
        Ok(format!("{} >> {}", lhs, rhs))
    }

    fn set(&mut self, items: Vec<String>, wrap_following_set: bool) -> Result<String> {
        let set = format!("{{{}}}", items.join(", "));
        if wrap_following_set {
            Ok(format!("Graph.from_set({})", set))
        } else {
            Ok(set)
        }
    }
}
