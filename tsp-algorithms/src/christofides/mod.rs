//! Christofides approximation: minimum spanning tree, minimum-weight perfect
//! matching on its odd-degree vertices, Eulerian circuit over the union, then
//! shortcutting repeated cities.
//!
//! Matching is exact up to [`matching::EXACT_MATCHING_LIMIT`] odd vertices,
//! which keeps the 1.5 approximation bound. Larger instances fall back to
//! greedy pairing and the bound no longer holds.
use crate::{SolveError, SolveResult};
use log::debug;
use tsp_challenges::{CitySet, Tour};

pub mod euler;
pub mod matching;
pub mod mst;

pub fn solve(cities: &CitySet) -> SolveResult<Tour> {
    let num_cities = cities.len();
    if num_cities == 0 {
        return Err(SolveError::InvalidInput(
            "City set must contain at least one city".to_string(),
        ));
    }
    if num_cities < 3 {
        return Ok(Tour::identity(num_cities));
    }
    let distance_matrix = cities.distance_matrix();

    let tree = mst::minimum_spanning_tree(&distance_matrix);
    let odd_vertices = mst::odd_degree_vertices(num_cities, &tree);
    debug!(
        "christofides: {} odd-degree vertices, {:?} matching",
        odd_vertices.len(),
        matching::strategy_for(odd_vertices.len())
    );
    let pairs = matching::perfect_matching(&odd_vertices, &distance_matrix)?;

    let mut multigraph = tree;
    multigraph.extend(pairs);
    let circuit = euler::eulerian_circuit(num_cities, &multigraph, 0)?;

    let route = shortcut(&circuit, num_cities);
    if route.len() != num_cities {
        return Err(SolveError::MatchingFailed(format!(
            "shortcut tour visits {} of {} cities",
            route.len(),
            num_cities
        )));
    }
    Ok(Tour::new(route))
}

/// Keeps the first visit of each city in walk order.
pub fn shortcut(circuit: &[usize], num_cities: usize) -> Vec<usize> {
    let mut visited = vec![false; num_cities];
    let mut route = Vec::with_capacity(num_cities);
    for &city in circuit {
        if !visited[city] {
            visited[city] = true;
            route.push(city);
        }
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_is_perimeter() {
        let cities =
            CitySet::from_positions(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]).unwrap();
        let tour = solve(&cities).unwrap();
        assert_eq!(tour.length(&cities), 40.0);
        assert!(cities.verify_tour(&tour).is_ok());
    }

    #[test]
    fn test_fewer_than_three_cities() {
        let one = CitySet::from_positions(&[(1.0, 1.0)]).unwrap();
        assert_eq!(solve(&one).unwrap(), Tour::identity(1));
        let two = CitySet::from_positions(&[(1.0, 1.0), (4.0, 5.0)]).unwrap();
        assert_eq!(solve(&two).unwrap(), Tour::identity(2));
    }

    #[test]
    fn test_coincident_cities() {
        let cities =
            CitySet::from_positions(&[(5.0, 5.0), (5.0, 5.0), (5.0, 5.0), (9.0, 5.0), (5.0, 5.0)])
                .unwrap();
        let tour = solve(&cities).unwrap();
        assert!(cities.verify_tour(&tour).is_ok());
        assert!((tour.length(&cities) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_shortcut() {
        assert_eq!(shortcut(&[0, 1, 2, 1, 3, 0], 4), vec![0, 1, 2, 3]);
        assert_eq!(shortcut(&[0], 1), vec![0]);
    }

    #[test]
    fn test_large_instance_is_a_valid_tour() {
        let cities =
            CitySet::generate_instance(5, &tsp_challenges::MapSettings::new(200)).unwrap();
        let tour = solve(&cities).unwrap();
        assert!(cities.verify_tour(&tour).is_ok());
    }
}
