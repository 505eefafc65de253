use bevy::log::{debug, info};

use crate::{
    builder::Adjacency,
    errors::{ConstructionError, ConstructionResult},
    node_table::FrameId,
};

/// One strongly connected component of a candidate graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Component {
    /// Members are mutually reachable through at least one cycle. Sorted ascending.
    Cyclic(Vec<FrameId>),
    /// A single vertex that is not on any cycle. It can be entered or left, but never both
    /// repeatedly, so it is never playable.
    Acyclic(FrameId),
}

impl Component {
    pub fn members(&self) -> &[FrameId] {
        match self {
            Component::Cyclic(members) => members,
            Component::Acyclic(frame) => std::slice::from_ref(frame),
        }
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    fn min_member(&self) -> FrameId {
        self.members()[0]
    }
}

const UNVISITED: usize = usize::MAX;

/// Tarjan's algorithm, with an explicit stack so large graphs do not overflow the call
/// stack. Edges pointing outside `adjacency` are ignored.
pub fn strongly_connected_components(adjacency: &Adjacency) -> Vec<Component> {
    let n = adjacency.len();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut next_index = 0;
    let mut components = Vec::new();
    // (vertex, position of the next edge to explore)
    let mut call_stack: Vec<(FrameId, usize)> = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        call_stack.push((root, 0));

        while let Some(frame) = call_stack.last_mut() {
            let vertex = frame.0;
            if let Some(&next) = adjacency[vertex].get(frame.1) {
                frame.1 += 1;
                if next >= n {
                    continue;
                }
                if index[next] == UNVISITED {
                    index[next] = next_index;
                    lowlink[next] = next_index;
                    next_index += 1;
                    stack.push(next);
                    on_stack[next] = true;
                    call_stack.push((next, 0));
                } else if on_stack[next] {
                    lowlink[vertex] = lowlink[vertex].min(index[next]);
                }
                continue;
            }

            call_stack.pop();
            if let Some(&(parent, _)) = call_stack.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[vertex]);
            }
            if lowlink[vertex] != index[vertex] {
                continue;
            }

            let mut members = Vec::new();
            while let Some(member) = stack.pop() {
                on_stack[member] = false;
                members.push(member);
                if member == vertex {
                    break;
                }
            }
            components.push(if members.len() == 1 && !adjacency[vertex].contains(&vertex) {
                Component::Acyclic(vertex)
            } else {
                members.sort_unstable();
                Component::Cyclic(members)
            });
        }
    }

    components
}

/// The biggest cyclic component; ties go to the one holding the lowest frame id.
pub fn largest_component(components: &[Component]) -> Option<&Component> {
    components
        .iter()
        .filter(|component| matches!(component, Component::Cyclic(_)))
        .min_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then(a.min_member().cmp(&b.min_member()))
        })
}

/// Candidate graph restricted to its largest strongly connected component.
#[derive(Clone, Debug, PartialEq)]
pub struct PrunedGraph {
    /// Retained frame ids, sorted ascending.
    pub playable: Vec<FrameId>,
    /// Successor lists indexed by frame id. Empty for every id outside `playable`.
    pub successors: Adjacency,
    pub component_count: usize,
}

/// Keeps only the largest strongly connected component of `adjacency`, dropping every
/// edge that leaves it.
pub fn prune_to_largest_component(adjacency: &Adjacency) -> ConstructionResult<PrunedGraph> {
    let components = strongly_connected_components(adjacency);
    let Some(largest) = largest_component(&components) else {
        return Err(ConstructionError::NoPlayableComponent {
            components: components.len(),
        });
    };

    let playable = largest.members().to_vec();
    let mut retained = vec![false; adjacency.len()];
    for &frame in &playable {
        retained[frame] = true;
    }

    let successors: Adjacency = adjacency
        .iter()
        .enumerate()
        .map(|(frame, targets)| {
            if !retained[frame] {
                return Vec::new();
            }
            targets
                .iter()
                .copied()
                .filter(|&target| target < retained.len() && retained[target])
                .collect()
        })
        .collect();

    if let Some(&dead_end) = playable.iter().find(|&&frame| successors[frame].is_empty()) {
        return Err(ConstructionError::DeadEndAfterPrune(dead_end));
    }

    debug!(
        "Found {} strongly connected components, largest has {} nodes",
        components.len(),
        playable.len()
    );
    info!(
        "Pruned motion graph to {} of {} nodes",
        playable.len(),
        adjacency.len()
    );

    Ok(PrunedGraph {
        playable,
        successors,
        component_count: components.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut components: Vec<Component>) -> Vec<Component> {
        components.sort_by_key(|c| c.members()[0]);
        components
    }

    #[test]
    fn finds_cycles_and_acyclic_vertices() {
        // 0 <-> 1 -> 2 -> 3 -> 2, 4 -> 4
        let adjacency = vec![vec![1], vec![0, 2], vec![3], vec![2], vec![4], vec![]];

        assert_eq!(
            sorted(strongly_connected_components(&adjacency)),
            vec![
                Component::Cyclic(vec![0, 1]),
                Component::Cyclic(vec![2, 3]),
                Component::Cyclic(vec![4]),
                Component::Acyclic(5),
            ]
        );
    }

    #[test]
    fn largest_component_ties_break_on_lowest_member() {
        let components = vec![
            Component::Cyclic(vec![5, 6]),
            Component::Acyclic(9),
            Component::Cyclic(vec![1, 7]),
        ];
        assert_eq!(
            largest_component(&components),
            Some(&Component::Cyclic(vec![1, 7]))
        );
        assert_eq!(largest_component(&[Component::Acyclic(0)]), None);
    }

    #[test]
    fn prune_keeps_single_largest_component() {
        // Two separate cycles of size 3 and 2, joined by a one-way edge.
        let adjacency = vec![
            vec![1],
            vec![2],
            vec![0, 3],
            vec![4],
            vec![3],
        ];

        let pruned = prune_to_largest_component(&adjacency).unwrap();

        assert_eq!(pruned.playable, vec![0, 1, 2]);
        assert_eq!(pruned.successors, vec![vec![1], vec![2], vec![0], vec![], vec![]]);
        assert_eq!(pruned.component_count, 2);
    }

    #[test]
    fn linear_chain_has_no_playable_component() {
        let adjacency = vec![vec![1], vec![2], vec![]];
        assert_eq!(
            prune_to_largest_component(&adjacency),
            Err(ConstructionError::NoPlayableComponent { components: 3 })
        );
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let n = 200_000;
        let mut adjacency: Adjacency = (0..n).map(|i| vec![i + 1]).collect();
        adjacency[n - 1] = vec![0];

        let pruned = prune_to_largest_component(&adjacency).unwrap();
        assert_eq!(pruned.playable.len(), n);
    }
}
