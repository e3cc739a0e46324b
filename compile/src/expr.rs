use workflow::{NodeId, PortId, TriggerId};

use crate::Reference;

/// Nested sequence/set expression denoting a graph fragment.
///
/// `Sequence(a, b)` links every exit of `a` to every entry of `b`;
/// `Set` is the union of its members, which all start from the same point.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum GraphExpr {
    Empty,
    Node(NodeId),
    Port(NodeId, PortId),
    Trigger(TriggerId),
    Sequence(Box<GraphExpr>, Box<GraphExpr>),
    Set(Vec<GraphExpr>),
}

impl From<Reference> for GraphExpr {
    fn from(r: Reference) -> Self {
        match r {
            Reference::Node(node) => GraphExpr::Node(node),
            Reference::Port(node, port) => GraphExpr::Port(node, port),
            Reference::Trigger(trigger) => GraphExpr::Trigger(trigger),
        }
    }
}

impl GraphExpr {
    /// Build `lhs >> rhs`, keeping sequences left-deep (`(a >> b) >> c`).
    /// Sequencing is associative, so this never changes the denoted graph.
    pub fn sequence(lhs: GraphExpr, rhs: GraphExpr) -> GraphExpr {
        match (lhs, rhs) {
            (GraphExpr::Empty, rhs) => rhs,
            (lhs, GraphExpr::Empty) => lhs,
            (lhs, GraphExpr::Sequence(a, b)) => Self::sequence(Self::sequence(lhs, *a), *b),
            (lhs, rhs) => GraphExpr::Sequence(Box::new(lhs), Box::new(rhs)),
        }
    }

    /// Sequence all `steps` together, in order. No steps gives `Empty`.
    pub fn chain<I: IntoIterator<Item = GraphExpr>>(steps: I) -> GraphExpr {
        steps.into_iter().fold(GraphExpr::Empty, Self::sequence)
    }

    /// Steps of a sequence chain: `a >> b >> c` gives `[a, b, c]`,
    /// anything that isn't a sequence is a single step.
    pub fn steps(&self) -> Vec<&GraphExpr> {
        let mut steps = Vec::with_capacity(4);
        self.push_steps(&mut steps);
        steps
    }

    fn push_steps<'a>(&'a self, steps: &mut Vec<&'a GraphExpr>) {
        match self {
            GraphExpr::Sequence(lhs, rhs) => {
                lhs.push_steps(steps);
                rhs.push_steps(steps);
            }
            GraphExpr::Empty => {}
            other => steps.push(other),
        }
    }

    /// Reference held by a leaf, `None` for everything else.
    #[inline]
    pub fn reference(&self) -> Option<Reference> {
        match self {
            GraphExpr::Node(node) => Some(Reference::Node(*node)),
            GraphExpr::Port(node, port) => Some(Reference::Port(*node, *port)),
            GraphExpr::Trigger(trigger) => Some(Reference::Trigger(*trigger)),
            _ => None,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, GraphExpr::Empty)
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        matches!(self, GraphExpr::Set(_))
    }

    #[inline]
    pub fn is_sequence(&self) -> bool {
        matches!(self, GraphExpr::Sequence(..))
    }

    /// True if any leaf in this expression belongs to `owner` (a node or trigger).
    pub fn contains(&self, owner: Reference) -> bool {
        match self {
            GraphExpr::Empty => false,
            GraphExpr::Sequence(lhs, rhs) => lhs.contains(owner) || rhs.contains(owner),
            GraphExpr::Set(members) => members.iter().any(|m| m.contains(owner)),
            leaf => leaf.reference().map(Reference::owner) == Some(owner.owner()),
        }
    }

    /// Copy of this expression with every set's members sorted.
    /// Two trees that only differ in set member order have equal canonical forms.
    pub fn canonical(&self) -> GraphExpr {
        match self {
            GraphExpr::Sequence(lhs, rhs) => {
                GraphExpr::Sequence(Box::new(lhs.canonical()), Box::new(rhs.canonical()))
            }
            GraphExpr::Set(members) => {
                let mut members: Vec<_> = members.iter().map(GraphExpr::canonical).collect();
                members.sort();
                GraphExpr::Set(members)
            }
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn n(i: usize) -> GraphExpr {
        GraphExpr::Node(i.into())
    }

    fn seq(lhs: GraphExpr, rhs: GraphExpr) -> GraphExpr {
        GraphExpr::Sequence(Box::new(lhs), Box::new(rhs))
    }

    #[test]
    fn test_sequence_is_left_deep() {
        let right_nested = GraphExpr::sequence(n(0), seq(n(1), seq(n(2), n(3))));
        assert_eq!(seq(seq(seq(n(0), n(1)), n(2)), n(3)), right_nested);
    }

    #[test]
    fn test_sequence_drops_empty() {
        assert_eq!(n(1), GraphExpr::sequence(GraphExpr::Empty, n(1)));
        assert_eq!(n(1), GraphExpr::sequence(n(1), GraphExpr::Empty));
        assert_eq!(GraphExpr::Empty, GraphExpr::chain(Vec::new()));
    }

    #[test]
    fn test_steps() {
        let set = GraphExpr::Set(vec![n(1), n(2)]);
        let expr = GraphExpr::chain([n(0), set.clone(), n(3)]);
        assert_eq!(vec![&n(0), &set, &n(3)], expr.steps());
        assert_eq!(vec![&set], set.steps());
    }

    #[test]
    fn test_contains_by_owner() {
        let port = GraphExpr::Port(4usize.into(), 0usize.into());
        let expr = GraphExpr::Set(vec![n(1), seq(port, n(2))]);
        assert!(expr.contains(Reference::Node(4usize.into())));
        assert!(expr.contains(Reference::Port(4usize.into(), 9usize.into())));
        assert!(!expr.contains(Reference::Node(3usize.into())));
        assert!(!expr.contains(Reference::Trigger(1usize.into())));
    }

    #[test]
    fn test_canonical_ignores_set_order() {
        let a = GraphExpr::Set(vec![n(2), seq(n(0), n(1))]);
        let b = GraphExpr::Set(vec![seq(n(0), n(1)), n(2)]);
        assert_ne!(a, b);
        assert_eq!(a.canonical(), b.canonical());
    }
}
