use workflow::{NodeId, PortId, TriggerId};

/// Opaque identity of something an expression can point at.
/// Equality is id equality.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Reference {
    /// A node, left through its default port.
    Node(NodeId),
    /// A specific non-default port of a node.
    Port(NodeId, PortId),
    /// A declared trigger.
    Trigger(TriggerId),
}

impl Reference {
    /// The node or trigger this reference belongs to; ports map to their node.
    #[inline]
    pub fn owner(self) -> Reference {
        match self {
            Reference::Port(node, _) => Reference::Node(node),
            other => other,
        }
    }

    /// Node component of this reference, if it has one.
    #[inline]
    pub fn node(self) -> Option<NodeId> {
        match self {
            Reference::Node(node) | Reference::Port(node, _) => Some(node),
            Reference::Trigger(_) => None,
        }
    }
}
