//! Dependency validation and cycle detection over the declared edge set.

use crate::StoreToken;

/// Returns the candidates that are not present in `known`, in declaration
/// order. An empty result means the candidates form a valid subset of the
/// known stores; an empty candidate list trivially validates.
pub(crate) fn missing_from<S: StoreToken>(
    candidates: &[S],
    known: &[S],
) -> Vec<S> {
    candidates
        .iter()
        .filter(|candidate| !known.contains(candidate))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mark {
    White,
    Grey,
    Black,
}

/// Whether the dependency graph formed by `entries` is free of cycles.
///
/// Depth-first traversal with temporary/permanent marks over the full node
/// set, so the answer depends only on the current edge set. Edges naming a
/// store outside `entries` are skipped: they cannot close a cycle among
/// registered nodes.
pub(crate) fn is_acyclic<S: StoreToken>(entries: &[(S, Vec<S>)]) -> bool {
    let mut marks = vec![Mark::White; entries.len()];

    for start in 0..entries.len() {
        if marks[start] == Mark::White && !visit(entries, &mut marks, start) {
            return false;
        }
    }

    true
}

fn visit<S: StoreToken>(
    entries: &[(S, Vec<S>)],
    marks: &mut [Mark],
    node: usize,
) -> bool {
    marks[node] = Mark::Grey;

    for dep in &entries[node].1 {
        // First match, consistent with registry lookups.
        let next = match entries.iter().position(|(store, _)| store == dep) {
            Some(index) => index,
            None => continue,
        };

        match marks[next] {
            Mark::Grey => return false,
            Mark::White => {
                if !visit(entries, marks, next) {
                    return false;
                }
            }
            Mark::Black => {}
        }
    }

    marks[node] = Mark::Black;
    true
}
