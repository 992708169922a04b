use log::debug;

use crate::{CandidateId, Pair};

/// The "beats" relation built by locking pairs.
///
/// Invariant: the relation is acyclic after every call to `try_lock`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub(crate) struct LockedGraph {
    size: usize,
    // Row-major adjacency matrix: edges[w * size + l] is true iff w -> l is locked.
    edges: Vec<bool>,
}

impl LockedGraph {
    pub(crate) fn new(size: usize) -> LockedGraph {
        LockedGraph {
            size,
            edges: vec![false; size * size],
        }
    }

    pub(crate) fn is_locked(&self, winner: CandidateId, loser: CandidateId) -> bool {
        self.edges[winner.0 * self.size + loser.0]
    }

    /// Locks the edge winner -> loser unless the loser already reaches the winner.
    /// Returns true if the edge was locked.
    pub(crate) fn try_lock(&mut self, winner: CandidateId, loser: CandidateId) -> bool {
        if self.has_path(loser, winner) {
            return false;
        }
        self.edges[winner.0 * self.size + loser.0] = true;
        true
    }

    /// Depth-first search over the locked edges only.
    pub(crate) fn has_path(&self, from: CandidateId, to: CandidateId) -> bool {
        let mut visited = vec![false; self.size];
        let mut stack: Vec<CandidateId> = vec![from];
        while let Some(cid) = stack.pop() {
            if cid == to {
                return true;
            }
            if visited[cid.0] {
                continue;
            }
            visited[cid.0] = true;
            for next in (0..self.size).map(CandidateId) {
                if !visited[next.0] && self.is_locked(cid, next) {
                    stack.push(next);
                }
            }
        }
        false
    }

    /// The candidates with no incoming locked edge, in roster order.
    pub(crate) fn sources(&self) -> Vec<CandidateId> {
        (0..self.size)
            .map(CandidateId)
            .filter(|&cid| {
                !(0..self.size)
                    .map(CandidateId)
                    .any(|other| self.is_locked(other, cid))
            })
            .collect()
    }
}

/// Locks the pairs in the given order, skipping the ones that would close a cycle.
///
/// Each decision only sees the edges locked by the pairs before it. A skipped
/// pair is never reconsidered.
/// Returns the graph and, for each pair, whether it was locked.
pub(crate) fn lock_pairs(size: usize, ranked_pairs: &[Pair]) -> (LockedGraph, Vec<bool>) {
    let mut graph = LockedGraph::new(size);
    let mut decisions: Vec<bool> = Vec::with_capacity(ranked_pairs.len());
    for pair in ranked_pairs.iter() {
        let locked = graph.try_lock(pair.winner, pair.loser);
        if locked {
            debug!("lock_pairs: locked {:?}", pair);
        } else {
            debug!("lock_pairs: skipped {:?}, it would create a cycle", pair);
        }
        decisions.push(locked);
    }
    (graph, decisions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(winner: usize, loser: usize) -> Pair {
        Pair {
            winner: CandidateId(winner),
            loser: CandidateId(loser),
        }
    }

    #[test]
    fn closing_edge_is_skipped() {
        let (graph, decisions) = lock_pairs(3, &[pair(1, 2), pair(0, 1), pair(2, 0)]);
        assert_eq!(decisions, vec![true, true, false]);
        assert!(graph.is_locked(CandidateId(1), CandidateId(2)));
        assert!(graph.is_locked(CandidateId(0), CandidateId(1)));
        assert!(!graph.is_locked(CandidateId(2), CandidateId(0)));
        assert_eq!(graph.sources(), vec![CandidateId(0)]);
    }

    #[test]
    fn long_cycle_is_detected() {
        // 0 -> 1 -> 2 -> 3 -> 4, then 4 -> 0 would close the loop.
        let ranked = vec![pair(0, 1), pair(1, 2), pair(2, 3), pair(3, 4), pair(4, 0)];
        let (graph, decisions) = lock_pairs(5, &ranked);
        assert_eq!(decisions, vec![true, true, true, true, false]);
        assert!(graph.has_path(CandidateId(0), CandidateId(4)));
        assert!(!graph.has_path(CandidateId(4), CandidateId(0)));
    }

    #[test]
    fn skipped_pair_is_not_retried() {
        // 2 -> 0 is rejected, and stays rejected even though nothing else depends on it.
        let ranked = vec![pair(0, 1), pair(1, 2), pair(2, 0), pair(0, 2)];
        let (graph, decisions) = lock_pairs(3, &ranked);
        assert_eq!(decisions, vec![true, true, false, true]);
        assert!(!graph.is_locked(CandidateId(2), CandidateId(0)));
    }

    #[test]
    fn branches_do_not_create_false_cycles() {
        // Diamond: 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3 is acyclic.
        let ranked = vec![pair(0, 1), pair(0, 2), pair(1, 3), pair(2, 3), pair(1, 2)];
        let (graph, decisions) = lock_pairs(4, &ranked);
        assert_eq!(decisions, vec![true; 5]);
        assert_eq!(graph.sources(), vec![CandidateId(0)]);
    }

    #[test]
    fn empty_graph_has_all_sources() {
        let graph = LockedGraph::new(3);
        assert_eq!(
            graph.sources(),
            vec![CandidateId(0), CandidateId(1), CandidateId(2)]
        );
        assert!(graph.has_path(CandidateId(1), CandidateId(1)));
        assert!(!graph.has_path(CandidateId(0), CandidateId(1)));
    }
}
