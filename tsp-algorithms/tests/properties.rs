use tsp_algorithms::{brute_force, christofides, nearest_neighbor, Algorithm, SolveError};
use tsp_challenges::{CitySet, MapSettings, Tour};

const TOLERANCE: f64 = 1e-9;

fn square() -> CitySet {
    CitySet::from_positions(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]).unwrap()
}

fn assert_permutation(tour: &Tour, num_cities: usize) {
    let mut route = tour.route.clone();
    route.sort();
    assert_eq!(route, (0..num_cities).collect::<Vec<_>>());
}

#[test]
fn test_every_solver_returns_a_permutation() {
    for num_cities in 1..=8 {
        for seed in 0..4 {
            let cities =
                CitySet::generate_instance(seed, &MapSettings::new(num_cities)).unwrap();
            for algorithm in Algorithm::ALL {
                let tour = algorithm.solve(&cities, 0).unwrap();
                assert_permutation(&tour, num_cities);
            }
        }
    }
    for num_cities in [25, 60, 150] {
        let cities = CitySet::generate_instance(99, &MapSettings::new(num_cities)).unwrap();
        assert_permutation(&nearest_neighbor::solve(&cities).unwrap(), num_cities);
        assert_permutation(&christofides::solve(&cities).unwrap(), num_cities);
    }
}

#[test]
fn test_overflowing_distances_still_give_a_permutation() {
    // finite coordinates whose pairwise distances overflow to infinity
    let far = CitySet::from_positions(&[
        (-1e308, 0.0),
        (1e308, 0.0),
        (0.0, 1e308),
        (0.0, -1e308),
    ])
    .unwrap();
    let pair = CitySet::from_positions(&[(-1e308, 0.0), (1e308, 0.0)]).unwrap();
    for cities in [far, pair] {
        for algorithm in Algorithm::ALL {
            let tour = algorithm.solve(&cities, 0).unwrap();
            assert_permutation(&tour, cities.len());
        }
    }
}

#[test]
fn test_brute_force_is_never_beaten() {
    for num_cities in 1..=9 {
        for seed in 0..3 {
            let cities =
                CitySet::generate_instance(seed * 31 + 7, &MapSettings::new(num_cities)).unwrap();
            let optimal = brute_force::solve(&cities).unwrap().length(&cities);
            let greedy = nearest_neighbor::solve(&cities).unwrap().length(&cities);
            let approx = christofides::solve(&cities).unwrap().length(&cities);
            assert!(optimal <= greedy + TOLERANCE, "n={} seed={}", num_cities, seed);
            assert!(optimal <= approx + TOLERANCE, "n={} seed={}", num_cities, seed);
        }
    }
}

#[test]
fn test_christofides_within_one_and_a_half_of_optimal() {
    for num_cities in 3..=9 {
        for seed in 0..5 {
            let cities =
                CitySet::generate_instance(seed + 100, &MapSettings::new(num_cities)).unwrap();
            let optimal = brute_force::solve(&cities).unwrap().length(&cities);
            let approx = christofides::solve(&cities).unwrap().length(&cities);
            assert!(
                approx <= 1.5 * optimal + TOLERANCE,
                "n={} seed={} approx={} optimal={}",
                num_cities,
                seed,
                approx,
                optimal
            );
        }
    }
}

#[test]
fn test_nearest_neighbor_is_deterministic() {
    let cities = CitySet::generate_instance(2024, &MapSettings::new(80)).unwrap();
    for start in [0, 17, 79] {
        let first = nearest_neighbor::solve_from(&cities, start).unwrap();
        let second = nearest_neighbor::solve_from(&cities, start).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.route[0], start);
    }
}

#[test]
fn test_square_scenario() {
    let cities = square();
    for algorithm in Algorithm::ALL {
        let tour = algorithm.solve(&cities, 0).unwrap();
        assert!(
            (tour.length(&cities) - 40.0).abs() < TOLERANCE,
            "{} found {}",
            algorithm,
            tour.length(&cities)
        );
    }
}

#[test]
fn test_single_city_scenario() {
    let cities = CitySet::from_positions(&[(123.0, 456.0)]).unwrap();
    for algorithm in Algorithm::ALL {
        let tour = algorithm.solve(&cities, 0).unwrap();
        assert_eq!(tour.route, vec![0]);
        assert_eq!(tour.length(&cities), 0.0);
    }
}

#[test]
fn test_two_city_tour_traverses_edge_twice() {
    let cities = CitySet::from_positions(&[(0.0, 0.0), (6.0, 8.0)]).unwrap();
    for algorithm in Algorithm::ALL {
        let tour = algorithm.solve(&cities, 0).unwrap();
        assert!((tour.length(&cities) - 20.0).abs() < TOLERANCE);
    }
}

#[test]
fn test_out_of_range_start_city() {
    let cities = square();
    assert!(matches!(
        Algorithm::NearestNeighbor.solve(&cities, 4),
        Err(SolveError::InvalidInput(_))
    ));
    // the other solvers ignore the start city
    assert!(Algorithm::Christofides.solve(&cities, 4).is_ok());
}
