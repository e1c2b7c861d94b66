use tsp_challenges::DistanceMatrix;

/// Prim's algorithm over the complete graph. Returns `n - 1` edges as
/// `(parent, child)`; ties go to the lowest city index.
pub fn minimum_spanning_tree(distance_matrix: &DistanceMatrix) -> Vec<(usize, usize)> {
    let num_cities = distance_matrix.len();
    if num_cities == 0 {
        return Vec::new();
    }
    let mut in_tree = vec![false; num_cities];
    let mut min_edge = vec![f64::INFINITY; num_cities];
    let mut parent: Vec<Option<usize>> = vec![None; num_cities];
    min_edge[0] = 0.0;

    let mut edges = Vec::with_capacity(num_cities - 1);
    for _ in 0..num_cities {
        let mut next = None;
        let mut best = f64::INFINITY;
        for city in 0..num_cities {
            if !in_tree[city] && min_edge[city] < best {
                best = min_edge[city];
                next = Some(city);
            }
        }
        let Some(city) = next else {
            break;
        };
        in_tree[city] = true;
        if let Some(parent) = parent[city] {
            edges.push((parent, city));
        }
        for other in 0..num_cities {
            if !in_tree[other] && distance_matrix[city][other] < min_edge[other] {
                min_edge[other] = distance_matrix[city][other];
                parent[other] = Some(city);
            }
        }
    }
    edges
}

pub fn odd_degree_vertices(num_cities: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut degree = vec![0usize; num_cities];
    for &(u, v) in edges {
        degree[u] += 1;
        degree[v] += 1;
    }
    degree
        .iter()
        .enumerate()
        .filter_map(|(city, &d)| (d % 2 == 1).then_some(city))
        .collect()
}
