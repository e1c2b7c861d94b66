use crate::{SolveError, SolveResult};
use tsp_challenges::{CitySet, Tour};

pub fn solve(cities: &CitySet) -> SolveResult<Tour> {
    solve_from(cities, 0)
}

/// Greedy tour from `start_city`: always step to the closest unvisited city,
/// preferring the lowest index on ties.
pub fn solve_from(cities: &CitySet, start_city: usize) -> SolveResult<Tour> {
    let num_cities = cities.len();
    if num_cities == 0 {
        return Err(SolveError::InvalidInput(
            "City set must contain at least one city".to_string(),
        ));
    }
    if start_city >= num_cities {
        return Err(SolveError::InvalidInput(format!(
            "Start city {} is out of range for {} cities",
            start_city, num_cities
        )));
    }
    let distance_matrix = cities.distance_matrix();

    let mut visited = vec![false; num_cities];
    let mut route = Vec::with_capacity(num_cities);
    let mut current_city = start_city;
    visited[current_city] = true;
    route.push(current_city);
    while route.len() < num_cities {
        let mut next_city = None;
        let mut best_distance = f64::INFINITY;
        for city in 0..num_cities {
            if visited[city] {
                continue;
            }
            let distance = distance_matrix[current_city][city];
            if next_city.is_none() || distance < best_distance {
                best_distance = distance;
                next_city = Some(city);
            }
        }
        let Some(next_city) = next_city else {
            return Err(SolveError::InvalidInput(format!(
                "no unvisited city left after {} of {} cities",
                route.len(),
                num_cities
            )));
        };
        visited[next_city] = true;
        route.push(next_city);
        current_city = next_city;
    }
    Ok(Tour::new(route))
}
