//! Pure rewrites over [`GraphExpr`] trees. Nothing here mutates its input;
//! every function returns a new tree that denotes the same graph.

use workflow::{NodeId, Workflow};

use crate::{GraphExpr, Reference};

/// Entry points of an expression.
pub fn sources(expr: &GraphExpr, wf: &Workflow) -> Vec<Reference> {
    let mut refs = Vec::with_capacity(2);
    push_sources(expr, wf, &mut refs);
    refs
}

fn push_sources(expr: &GraphExpr, wf: &Workflow, refs: &mut Vec<Reference>) {
    match expr {
        GraphExpr::Empty => {}
        GraphExpr::Node(node) => {
            // a node only enters by identity if it can be left without naming a port:
            if wf.has_default_exit(*node) {
                push_unique(refs, Reference::Node(*node));
            }
        }
        GraphExpr::Port(node, port) => push_unique(refs, Reference::Port(*node, *port)),
        GraphExpr::Trigger(trigger) => push_unique(refs, Reference::Trigger(*trigger)),
        GraphExpr::Sequence(lhs, _) => push_sources(lhs, wf, refs),
        GraphExpr::Set(members) => {
            for member in members {
                push_sources(member, wf, refs);
            }
        }
    }
}

/// Exit points of an expression. A port's exit is its owning node.
pub fn terminals(expr: &GraphExpr) -> Vec<Reference> {
    let mut refs = Vec::with_capacity(2);
    push_terminals(expr, &mut refs);
    refs
}

fn push_terminals(expr: &GraphExpr, refs: &mut Vec<Reference>) {
    match expr {
        GraphExpr::Empty => {}
        GraphExpr::Sequence(_, rhs) => push_terminals(rhs, refs),
        GraphExpr::Set(members) => {
            for member in members {
                push_terminals(member, refs);
            }
        }
        leaf => {
            if let Some(r) = leaf.reference() {
                push_unique(refs, r.owner());
            }
        }
    }
}

fn push_unique(refs: &mut Vec<Reference>, r: Reference) {
    if !refs.contains(&r) {
        refs.push(r);
    }
}

/// Build a flat set out of `members`: nested sets are inlined, empties and
/// duplicates dropped, and any leaf that is already an entry point of another
/// member is discarded. Collapses to the lone member (or `Empty`) when
/// fewer than two survive.
pub fn flatten(members: Vec<GraphExpr>, wf: &Workflow) -> GraphExpr {
    let mut flat = Vec::with_capacity(members.len());
    inline_into(members, &mut flat);

    let subsumed = subsumed_leaves(&flat, wf);
    let kept = flat
        .into_iter()
        .zip(subsumed)
        .filter_map(|(member, subsumed)| (!subsumed).then_some(member))
        .collect();
    collapse(kept)
}

/// Set of branches that all feed one shared continuation, as in `{a, b} >> m`.
///
/// Unlike [`flatten`], no member may be discarded here: a leaf links straight
/// into the continuation, so dropping it would drop an edge. Returns `None`
/// if some leaf is an entry point of another member.
pub fn prefix_set(members: Vec<GraphExpr>, wf: &Workflow) -> Option<GraphExpr> {
    let mut flat = Vec::with_capacity(members.len());
    inline_into(members, &mut flat);

    if subsumed_leaves(&flat, wf).contains(&true) {
        log::trace!("not merging: a leaf branch also starts another branch");
        return None;
    }
    Some(collapse(flat))
}

/// For each member, whether it is a leaf that some other member starts with.
fn subsumed_leaves(members: &[GraphExpr], wf: &Workflow) -> Vec<bool> {
    let member_sources: Vec<_> = members.iter().map(|m| sources(m, wf)).collect();
    members
        .iter()
        .enumerate()
        .map(|(i, member)| {
            member.reference().is_some_and(|r| {
                member_sources
                    .iter()
                    .enumerate()
                    .any(|(j, srcs)| j != i && srcs.contains(&r))
            })
        })
        .collect()
}

fn collapse(mut members: Vec<GraphExpr>) -> GraphExpr {
    match members.len() {
        0 => GraphExpr::Empty,
        1 => members.swap_remove(0),
        _ => GraphExpr::Set(members),
    }
}

fn inline_into(members: Vec<GraphExpr>, flat: &mut Vec<GraphExpr>) {
    for member in members {
        match member {
            GraphExpr::Empty => {}
            GraphExpr::Set(inner) => inline_into(inner, flat),
            other => {
                if !flat.contains(&other) {
                    flat.push(other);
                }
            }
        }
    }
}

/// If every member is a sequence and they all start with the same steps,
/// pull those steps out front: `{a >> b, a >> c}` becomes `a >> {b, c}`.
pub fn pop_shared_prefix(members: &[GraphExpr], wf: &Workflow) -> Option<GraphExpr> {
    if members.len() < 2 || !members.iter().all(GraphExpr::is_sequence) {
        return None;
    }
    let chains: Vec<_> = members.iter().map(GraphExpr::steps).collect();
    let shortest = chains.iter().map(Vec::len).min().unwrap_or(0);
    let shared = (0..shortest)
        .take_while(|i| chains.iter().all(|c| c[*i] == chains[0][*i]))
        .count();
    if shared == 0 {
        return None;
    }

    let prefix = chain_of(&chains[0][..shared]);
    let remainders = chains.iter().map(|c| chain_of(&c[shared..])).collect();
    Some(GraphExpr::sequence(prefix, flatten(remainders, wf)))
}

/// Split `expr` where `node` is first entered as a top-level step.
/// Returns `(prefix, suffix)` steps; the prefix is empty if `expr` starts at `node`.
pub fn split_at(expr: &GraphExpr, node: NodeId) -> Option<(Vec<&GraphExpr>, Vec<&GraphExpr>)> {
    let steps = expr.steps();
    let at = steps
        .iter()
        .position(|s| s.reference().and_then(Reference::node) == Some(node))?;
    let suffix = steps[at..].to_vec();
    let mut prefix = steps;
    prefix.truncate(at);
    Some((prefix, suffix))
}

/// If every member runs into `node`, share the part from `node` on:
/// `{a >> m, b >> m}` becomes `{a, b} >> m`.
///
/// Only applies when the other members' tails are leading pieces of the
/// longest tail, so nothing after `node` is lost. A member that *starts* at
/// `node` keeps its place by taking `node` itself as its prefix, with the
/// rest of the longest tail shared after it.
pub fn factor_common_suffix(
    members: &[GraphExpr],
    node: NodeId,
    wf: &Workflow,
) -> Option<GraphExpr> {
    if members.len() < 2 {
        return None;
    }
    let splits: Vec<_> = members
        .iter()
        .map(|m| split_at(m, node))
        .collect::<Option<_>>()?;
    if splits.iter().all(|(prefix, _)| prefix.is_empty()) {
        return None;
    }

    let mut longest = 0;
    for (i, (_, suffix)) in splits.iter().enumerate() {
        if suffix.len() > splits[longest].1.len() {
            longest = i;
        }
    }
    let tail = &splits[longest].1;
    let covered = splits
        .iter()
        .all(|(_, suffix)| suffix.iter().zip(tail.iter()).all(|(a, b)| a == b));
    if !covered {
        log::trace!("not factoring: tails after node diverge");
        return None;
    }

    if splits.iter().any(|(prefix, _)| prefix.is_empty()) {
        // the tail always opens with the leaf for `node`, so this is a single hop:
        if tail.len() < 2 {
            return None;
        }
        let head = tail[0].clone();
        let prefixes = splits
            .iter()
            .map(|(prefix, _)| GraphExpr::sequence(chain_of(prefix), head.clone()))
            .collect();
        Some(GraphExpr::sequence(prefix_set(prefixes, wf)?, chain_of(&tail[1..])))
    } else {
        let prefixes = splits.iter().map(|(prefix, _)| chain_of(prefix)).collect();
        Some(GraphExpr::sequence(prefix_set(prefixes, wf)?, chain_of(tail)))
    }
}

fn chain_of(steps: &[&GraphExpr]) -> GraphExpr {
    GraphExpr::chain(steps.iter().map(|s| (*s).clone()))
}

/// Append `target` at the logical end of `expr`, after `source`:
/// `... >> source` becomes `... >> source >> target`.
pub fn extend_tail(expr: &GraphExpr, source: Reference, target: NodeId, wf: &Workflow) -> GraphExpr {
    let owner = source.owner();
    match expr {
        GraphExpr::Sequence(lhs, rhs) => {
            GraphExpr::sequence((**lhs).clone(), extend_tail(rhs, source, target, wf))
        }
        GraphExpr::Set(members) => {
            let members = members
                .iter()
                .map(|m| {
                    if terminals(m).contains(&owner) {
                        extend_tail(m, source, target, wf)
                    } else {
                        m.clone()
                    }
                })
                .collect();
            flatten(members, wf)
        }
        leaf => match leaf.reference() {
            Some(r) if r == source || r == owner => {
                GraphExpr::sequence(source.into(), GraphExpr::Node(target))
            }
            // the tail leaves through a different port; keep it and branch off:
            Some(r) if r.owner() == owner => flatten(
                vec![
                    leaf.clone(),
                    GraphExpr::sequence(source.into(), GraphExpr::Node(target)),
                ],
                wf,
            ),
            _ => GraphExpr::sequence(leaf.clone(), GraphExpr::Node(target)),
        },
    }
}
