use crate::{SolveError, SolveResult};
use tsp_challenges::DistanceMatrix;

/// Largest odd-vertex set matched exactly. The dynamic programme keeps one
/// `f64` and one `u32` per subset, so 20 vertices costs about 12 MiB.
pub const EXACT_MATCHING_LIMIT: usize = 20;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MatchingStrategy {
    /// Minimum-weight perfect matching; Christofides keeps its 1.5 bound.
    Exact,
    /// Shortest-edge-first pairing; the 1.5 bound is not guaranteed.
    Greedy,
}

pub fn strategy_for(num_vertices: usize) -> MatchingStrategy {
    if num_vertices <= EXACT_MATCHING_LIMIT {
        MatchingStrategy::Exact
    } else {
        MatchingStrategy::Greedy
    }
}

/// Pairs every vertex in `vertices` with exactly one other.
pub fn perfect_matching(
    vertices: &[usize],
    distance_matrix: &DistanceMatrix,
) -> SolveResult<Vec<(usize, usize)>> {
    if vertices.len() % 2 != 0 {
        return Err(SolveError::MatchingFailed(format!(
            "cannot pair an odd number of vertices ({})",
            vertices.len()
        )));
    }
    if let Some(&vertex) = vertices.iter().find(|&&v| v >= distance_matrix.len()) {
        return Err(SolveError::MatchingFailed(format!(
            "vertex {} is not a city",
            vertex
        )));
    }
    match strategy_for(vertices.len()) {
        MatchingStrategy::Exact => exact_matching(vertices, distance_matrix),
        MatchingStrategy::Greedy => greedy_matching(vertices, distance_matrix),
    }
}

/// Bitmask dynamic programme over subsets of matched vertices. Each step pairs
/// the lowest unmatched vertex, so every subset is reached in canonical order.
pub fn exact_matching(
    vertices: &[usize],
    distance_matrix: &DistanceMatrix,
) -> SolveResult<Vec<(usize, usize)>> {
    let k = vertices.len();
    if k == 0 {
        return Ok(Vec::new());
    }
    if k > EXACT_MATCHING_LIMIT {
        return Err(SolveError::MatchingFailed(format!(
            "{} vertices are too many for exact matching (limit {})",
            k, EXACT_MATCHING_LIMIT
        )));
    }
    let full = (1usize << k) - 1;
    let mut cost = vec![f64::INFINITY; full + 1];
    let mut previous = vec![0u32; full + 1];
    cost[0] = 0.0;

    for mask in 0..full {
        if cost[mask].is_infinite() {
            continue;
        }
        let i = (!mask).trailing_zeros() as usize;
        for j in (i + 1)..k {
            if mask & (1 << j) != 0 {
                continue;
            }
            let next = mask | (1 << i) | (1 << j);
            let candidate = cost[mask] + distance_matrix[vertices[i]][vertices[j]];
            if candidate < cost[next] {
                cost[next] = candidate;
                previous[next] = mask as u32;
            }
        }
    }
    if cost[full].is_infinite() {
        return Err(SolveError::MatchingFailed(format!(
            "no perfect matching over {} vertices",
            k
        )));
    }

    let mut pairs = Vec::with_capacity(k / 2);
    let mut mask = full;
    while mask != 0 {
        let prior = previous[mask] as usize;
        let added = mask ^ prior;
        let i = added.trailing_zeros() as usize;
        let j = (added & (added - 1)).trailing_zeros() as usize;
        pairs.push((vertices[i], vertices[j]));
        mask = prior;
    }
    pairs.reverse();
    Ok(pairs)
}

/// Takes candidate pairs shortest first, skipping any vertex already paired.
pub fn greedy_matching(
    vertices: &[usize],
    distance_matrix: &DistanceMatrix,
) -> SolveResult<Vec<(usize, usize)>> {
    let k = vertices.len();
    let mut candidates = Vec::with_capacity(k * k.saturating_sub(1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            candidates.push((distance_matrix[vertices[i]][vertices[j]], i, j));
        }
    }
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut matched = vec![false; k];
    let mut pairs = Vec::with_capacity(k / 2);
    for (_, i, j) in candidates {
        if matched[i] || matched[j] {
            continue;
        }
        matched[i] = true;
        matched[j] = true;
        pairs.push((vertices[i], vertices[j]));
        if pairs.len() == k / 2 {
            break;
        }
    }
    if let Some(i) = matched.iter().position(|&m| !m) {
        return Err(SolveError::MatchingFailed(format!(
            "vertex {} was left unmatched",
            vertices[i]
        )));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsp_challenges::{CitySet, MapSettings};

    fn weight(matrix: &DistanceMatrix, pairs: &[(usize, usize)]) -> f64 {
        pairs.iter().map(|&(u, v)| matrix.get(u, v)).sum()
    }

    fn assert_perfect(vertices: &[usize], pairs: &[(usize, usize)]) {
        let mut seen: Vec<usize> = pairs.iter().flat_map(|&(u, v)| [u, v]).collect();
        seen.sort();
        let mut expected = vertices.to_vec();
        expected.sort();
        assert_eq!(seen, expected);
    }

    fn brute_force_weight(vertices: &[usize], matrix: &DistanceMatrix) -> f64 {
        if vertices.is_empty() {
            return 0.0;
        }
        let first = vertices[0];
        (1..vertices.len())
            .map(|p| {
                let rest: Vec<usize> = vertices[1..]
                    .iter()
                    .enumerate()
                    .filter(|&(idx, _)| idx + 1 != p)
                    .map(|(_, &v)| v)
                    .collect();
                matrix.get(first, vertices[p]) + brute_force_weight(&rest, matrix)
            })
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn test_strategy_threshold() {
        assert_eq!(strategy_for(0), MatchingStrategy::Exact);
        assert_eq!(strategy_for(EXACT_MATCHING_LIMIT), MatchingStrategy::Exact);
        assert_eq!(strategy_for(EXACT_MATCHING_LIMIT + 2), MatchingStrategy::Greedy);
    }

    #[test]
    fn test_exact_beats_greedy_trap() {
        // greedy grabs the short middle edge 1-2 and is forced into 0-3
        let cities =
            CitySet::from_positions(&[(0.0, 0.0), (2.0, 0.0), (3.0, 0.0), (5.0, 0.0)]).unwrap();
        let matrix = cities.distance_matrix();
        let vertices = [0, 1, 2, 3];

        let exact = exact_matching(&vertices, &matrix).unwrap();
        assert_perfect(&vertices, &exact);
        assert_eq!(weight(&matrix, &exact), 4.0);

        let greedy = greedy_matching(&vertices, &matrix).unwrap();
        assert_perfect(&vertices, &greedy);
        assert_eq!(weight(&matrix, &greedy), 6.0);
    }

    #[test]
    fn test_exact_is_optimal() {
        let cities = CitySet::generate_instance(3, &MapSettings::new(12)).unwrap();
        let matrix = cities.distance_matrix();
        let vertices: Vec<usize> = (0..10).collect();
        let pairs = exact_matching(&vertices, &matrix).unwrap();
        assert_perfect(&vertices, &pairs);
        assert!((weight(&matrix, &pairs) - brute_force_weight(&vertices, &matrix)).abs() < 1e-9);
    }

    #[test]
    fn test_greedy_is_perfect() {
        let cities = CitySet::generate_instance(11, &MapSettings::new(60)).unwrap();
        let matrix = cities.distance_matrix();
        let vertices: Vec<usize> = (0..30).map(|i| i * 2).collect();
        let pairs = perfect_matching(&vertices, &matrix).unwrap();
        assert_eq!(pairs.len(), 15);
        assert_perfect(&vertices, &pairs);
    }

    #[test]
    fn test_malformed_vertex_sets() {
        let cities = CitySet::from_positions(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]).unwrap();
        let matrix = cities.distance_matrix();
        assert!(matches!(
            perfect_matching(&[0, 1, 2], &matrix),
            Err(SolveError::MatchingFailed(_))
        ));
        assert!(matches!(
            perfect_matching(&[0, 7], &matrix),
            Err(SolveError::MatchingFailed(_))
        ));
        assert_eq!(perfect_matching(&[], &matrix).unwrap(), vec![]);
    }

    #[test]
    fn test_exact_matching_refuses_large_sets() {
        let cities = CitySet::generate_instance(2, &MapSettings::new(EXACT_MATCHING_LIMIT + 2)).unwrap();
        let matrix = cities.distance_matrix();
        let vertices: Vec<usize> = (0..EXACT_MATCHING_LIMIT + 2).collect();
        assert!(matches!(
            exact_matching(&vertices, &matrix),
            Err(SolveError::MatchingFailed(_))
        ));
        let pairs = perfect_matching(&vertices, &matrix).unwrap();
        assert_perfect(&vertices, &pairs);
    }
}
