use std::ops::Index;

use anyhow::{anyhow, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_COORD: i32 = 1000;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct MapSettings {
    pub num_cities: usize,
    pub max_coord: i32,
}

impl MapSettings {
    pub fn new(num_cities: usize) -> Self {
        Self {
            num_cities,
            max_coord: DEFAULT_MAX_COORD,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct City {
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

impl City {
    pub fn new(index: usize, x: f64, y: f64) -> Self {
        Self { index, x, y }
    }
}

pub fn distance(a: &City, b: &City) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Cities of one comparison run. `cities[i].index == i` always holds, so a
/// `CitySet` cannot be empty or carry duplicate indices.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "Vec<City>", into = "Vec<City>")]
pub struct CitySet {
    cities: Vec<City>,
}

impl CitySet {
    pub fn new(cities: Vec<City>) -> Result<Self> {
        if cities.is_empty() {
            return Err(anyhow!("City set must contain at least one city"));
        }
        for (position, city) in cities.iter().enumerate() {
            if city.index != position {
                return Err(anyhow!(
                    "City at position {} has index {} (indices must be 0..{} in order, without duplicates)",
                    position,
                    city.index,
                    cities.len()
                ));
            }
            if !city.x.is_finite() || !city.y.is_finite() {
                return Err(anyhow!(
                    "City {} has a non-finite coordinate ({}, {})",
                    city.index,
                    city.x,
                    city.y
                ));
            }
        }
        Ok(Self { cities })
    }

    pub fn from_positions(positions: &[(f64, f64)]) -> Result<Self> {
        Self::new(
            positions
                .iter()
                .enumerate()
                .map(|(index, &(x, y))| City::new(index, x, y))
                .collect(),
        )
    }

    /// Uniform integer coordinates in `0..=max_coord`, reproducible per seed.
    pub fn generate_instance(seed: u64, settings: &MapSettings) -> Result<Self> {
        if settings.num_cities < 1 {
            return Err(anyhow!("Number of cities must be at least 1"));
        }
        if settings.max_coord < 0 {
            return Err(anyhow!(
                "Max coordinate must be non-negative (got {})",
                settings.max_coord
            ));
        }
        let mut rng = SmallRng::seed_from_u64(seed);
        let cities = (0..settings.num_cities)
            .map(|index| {
                City::new(
                    index,
                    rng.gen_range(0..=settings.max_coord) as f64,
                    rng.gen_range(0..=settings.max_coord) as f64,
                )
            })
            .collect();
        Self::new(cities)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, City> {
        self.cities.iter()
    }

    pub fn distance_matrix(&self) -> DistanceMatrix {
        DistanceMatrix::new(self)
    }

    /// Checks that `tour` visits every city exactly once and returns its
    /// closed-cycle length.
    pub fn verify_tour(&self, tour: &Tour) -> Result<f64> {
        let route = &tour.route;
        if route.len() != self.len() {
            return Err(anyhow!(
                "Route length ({}) does not match number of cities ({})",
                route.len(),
                self.len()
            ));
        }
        let mut visited = vec![false; self.len()];
        for &city in route {
            if city >= self.len() {
                return Err(anyhow!("Route contains invalid city {}", city));
            }
            if visited[city] {
                return Err(anyhow!("Route contains duplicate city {}", city));
            }
            visited[city] = true;
        }
        Ok(tour_length(route, self))
    }
}

impl TryFrom<Vec<City>> for CitySet {
    type Error = anyhow::Error;

    fn try_from(cities: Vec<City>) -> Result<Self> {
        Self::new(cities)
    }
}

impl From<CitySet> for Vec<City> {
    fn from(set: CitySet) -> Self {
        set.cities
    }
}

impl Index<usize> for CitySet {
    type Output = City;

    fn index(&self, index: usize) -> &City {
        &self.cities[index]
    }
}

/// Length of `route` as a closed cycle, including the edge back to the start.
pub fn tour_length(route: &[usize], cities: &CitySet) -> f64 {
    let n = route.len();
    (0..n)
        .map(|i| distance(&cities[route[i]], &cities[route[(i + 1) % n]]))
        .sum()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    pub route: Vec<usize>,
}

impl Tour {
    pub fn new(route: Vec<usize>) -> Self {
        Self { route }
    }

    /// Visits cities in index order.
    pub fn identity(num_cities: usize) -> Self {
        Self {
            route: (0..num_cities).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.route.len()
    }

    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    pub fn length(&self, cities: &CitySet) -> f64 {
        tour_length(&self.route, cities)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    rows: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    pub fn new(cities: &CitySet) -> Self {
        let rows = cities
            .iter()
            .map(|from| cities.iter().map(|to| distance(from, to)).collect())
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.rows[from][to]
    }
}

impl Index<usize> for DistanceMatrix {
    type Output = [f64];

    fn index(&self, from: usize) -> &[f64] {
        &self.rows[from]
    }
}
