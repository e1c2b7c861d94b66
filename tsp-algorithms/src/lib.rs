use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use tsp_challenges::{CitySet, Tour};

pub mod brute_force;
pub mod christofides;
pub mod nearest_neighbor;

/// Errors a solver reports instead of a tour. Serialisable so the runtime can
/// hand them back across the process boundary.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum SolveError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("matching failed: {0}")]
    MatchingFailed(String),
}

pub type SolveResult<T> = std::result::Result<T, SolveError>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    BruteForce,
    NearestNeighbor,
    Christofides,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::BruteForce,
        Algorithm::NearestNeighbor,
        Algorithm::Christofides,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Algorithm::BruteForce => "brute_force",
            Algorithm::NearestNeighbor => "nearest_neighbor",
            Algorithm::Christofides => "christofides",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::BruteForce => "Brute Force",
            Algorithm::NearestNeighbor => "Nearest Neighbor",
            Algorithm::Christofides => "Christofides",
        }
    }

    /// `start_city` only affects nearest neighbor; the other solvers always
    /// anchor their tour at city 0.
    pub fn solve(&self, cities: &CitySet, start_city: usize) -> SolveResult<Tour> {
        match self {
            Algorithm::BruteForce => brute_force::solve(cities),
            Algorithm::NearestNeighbor => nearest_neighbor::solve_from(cities, start_city),
            Algorithm::Christofides => christofides::solve(cities),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "brute_force" | "bruteforce" | "bf" => Ok(Algorithm::BruteForce),
            "nearest_neighbor" | "nearestneighbor" | "nearest_neighbour" | "nn" => {
                Ok(Algorithm::NearestNeighbor)
            }
            "christofides" | "ch" => Ok(Algorithm::Christofides),
            _ => Err(format!(
                "Unknown algorithm '{}'. Expected one of: brute_force, nearest_neighbor, christofides",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("brute_force".parse::<Algorithm>(), Ok(Algorithm::BruteForce));
        assert_eq!("Nearest Neighbor".parse::<Algorithm>(), Ok(Algorithm::NearestNeighbor));
        assert_eq!("CH".parse::<Algorithm>(), Ok(Algorithm::Christofides));
        assert!("two_opt".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_algorithm_ids_round_trip_through_serde() {
        for algorithm in Algorithm::ALL {
            let json = serde_json::to_string(&algorithm).unwrap();
            assert_eq!(json, format!("\"{}\"", algorithm.id()));
            assert_eq!(algorithm.id().parse::<Algorithm>(), Ok(algorithm));
        }
    }

    #[test]
    fn test_solve_error_display() {
        assert_eq!(
            SolveError::MatchingFailed("3 odd vertices".to_string()).to_string(),
            "matching failed: 3 odd vertices"
        );
    }
}
