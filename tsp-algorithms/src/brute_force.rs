use crate::{SolveError, SolveResult};
use tsp_challenges::{CitySet, DistanceMatrix, Tour};

/// Exact solver. City 0 is fixed as the start to drop rotations, and for four
/// or more cities only tours with `route[1] < route[n - 1]` are scored, which
/// drops each tour's mirror image. Runs in O(n!) and does not limit `n`.
pub fn solve(cities: &CitySet) -> SolveResult<Tour> {
    let num_cities = cities.len();
    if num_cities == 0 {
        return Err(SolveError::InvalidInput(
            "City set must contain at least one city".to_string(),
        ));
    }
    if num_cities <= 3 {
        // every ordering of three or fewer cities is the same cycle
        return Ok(Tour::identity(num_cities));
    }

    let mut search = Search {
        distance_matrix: cities.distance_matrix(),
        route: Vec::with_capacity(num_cities),
        visited: vec![false; num_cities],
        best_route: Vec::new(),
        best_distance: f64::INFINITY,
    };
    search.route.push(0);
    search.visited[0] = true;
    search.extend(0.0);

    Ok(Tour::new(search.best_route))
}

struct Search {
    distance_matrix: DistanceMatrix,
    route: Vec<usize>,
    visited: Vec<bool>,
    best_route: Vec<usize>,
    best_distance: f64,
}

impl Search {
    /// Enumerates completions of `self.route` in lexicographic order.
    fn extend(&mut self, partial_distance: f64) {
        let num_cities = self.visited.len();
        let last = self.route[self.route.len() - 1];
        if self.route.len() == num_cities {
            if self.route[1] > self.route[num_cities - 1] {
                return;
            }
            let total_distance = partial_distance + self.distance_matrix[last][0];
            // the first complete tour always counts, even if its length overflowed
            if self.best_route.is_empty() || total_distance < self.best_distance {
                self.best_distance = total_distance;
                self.best_route.clone_from(&self.route);
            }
            return;
        }
        for city in 1..num_cities {
            if self.visited[city] {
                continue;
            }
            self.visited[city] = true;
            self.route.push(city);
            self.extend(partial_distance + self.distance_matrix[last][city]);
            self.route.pop();
            self.visited[city] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_is_perimeter() {
        let cities =
            CitySet::from_positions(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]).unwrap();
        let tour = solve(&cities).unwrap();
        assert_eq!(tour.route, vec![0, 1, 2, 3]);
        assert_eq!(tour.length(&cities), 40.0);
    }

    #[test]
    fn test_crossed_input_is_uncrossed() {
        // index order zig-zags across the square
        let cities =
            CitySet::from_positions(&[(0.0, 0.0), (10.0, 10.0), (0.0, 10.0), (10.0, 0.0)]).unwrap();
        let tour = solve(&cities).unwrap();
        assert_eq!(tour.route, vec![0, 2, 1, 3]);
        assert_eq!(tour.length(&cities), 40.0);
    }

    #[test]
    fn test_infinite_tour_lengths() {
        let cities = CitySet::from_positions(&[
            (-1e308, 0.0),
            (1e308, 0.0),
            (0.0, 1e308),
            (0.0, -1e308),
        ])
        .unwrap();
        let tour = solve(&cities).unwrap();
        assert_eq!(tour.route, vec![0, 1, 2, 3]);
        assert!(tour.length(&cities).is_infinite());
    }

    #[test]
    fn test_tiny_sets() {
        for n in 1..=3 {
            let positions: Vec<(f64, f64)> = (0..n).map(|i| (i as f64, (i * i) as f64)).collect();
            let cities = CitySet::from_positions(&positions).unwrap();
            assert_eq!(solve(&cities).unwrap(), Tour::identity(n));
        }
    }

    #[test]
    fn test_matches_exhaustive_minimum() {
        let cities = CitySet::from_positions(&[
            (0.0, 0.0),
            (4.0, 7.0),
            (9.0, 1.0),
            (2.0, 9.0),
            (8.0, 8.0),
            (5.0, 3.0),
        ])
        .unwrap();
        let best = solve(&cities).unwrap().length(&cities);

        // every permutation of 1..6 behind city 0
        let mut rest = vec![1, 2, 3, 4, 5];
        let mut minimum = f64::INFINITY;
        permute(&mut rest, 0, &mut |perm| {
            let mut route = vec![0];
            route.extend_from_slice(perm);
            minimum = minimum.min(tsp_challenges::tour_length(&route, &cities));
        });
        assert!((best - minimum).abs() < 1e-9);
    }

    fn permute(items: &mut Vec<usize>, k: usize, visit: &mut dyn FnMut(&[usize])) {
        if k == items.len() {
            visit(items);
            return;
        }
        for i in k..items.len() {
            items.swap(k, i);
            permute(items, k + 1, visit);
            items.swap(k, i);
        }
    }
}
