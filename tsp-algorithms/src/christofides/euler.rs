use crate::{SolveError, SolveResult};

/// Hierholzer's algorithm on an undirected multigraph given as an edge list.
/// Returns the closed walk starting and ending at `start`, or an error if a
/// vertex has odd degree or some edge is unreachable from `start`.
pub fn eulerian_circuit(
    num_vertices: usize,
    edges: &[(usize, usize)],
    start: usize,
) -> SolveResult<Vec<usize>> {
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); num_vertices];
    for (id, &(u, v)) in edges.iter().enumerate() {
        adjacency[u].push((v, id));
        adjacency[v].push((u, id));
    }
    if let Some((vertex, neighbors)) = adjacency
        .iter()
        .enumerate()
        .find(|(_, neighbors)| neighbors.len() % 2 != 0)
    {
        return Err(SolveError::MatchingFailed(format!(
            "vertex {} has odd degree {} after matching",
            vertex,
            neighbors.len()
        )));
    }

    let mut used = vec![false; edges.len()];
    let mut cursor = vec![0usize; num_vertices];
    let mut stack = vec![start];
    let mut circuit = Vec::with_capacity(edges.len() + 1);
    while let Some(&vertex) = stack.last() {
        let neighbors = &adjacency[vertex];
        while cursor[vertex] < neighbors.len() && used[neighbors[cursor[vertex]].1] {
            cursor[vertex] += 1;
        }
        match neighbors.get(cursor[vertex]) {
            Some(&(next, id)) => {
                used[id] = true;
                stack.push(next);
            }
            None => {
                circuit.push(vertex);
                stack.pop();
            }
        }
    }
    circuit.reverse();

    if circuit.len() != edges.len() + 1 {
        return Err(SolveError::MatchingFailed(format!(
            "circuit covers {} of {} edges; the multigraph is disconnected",
            circuit.len().saturating_sub(1),
            edges.len()
        )));
    }
    Ok(circuit)
}
