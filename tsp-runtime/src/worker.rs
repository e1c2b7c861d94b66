use log::debug;
use std::time::Instant;
use tsp_structs::core::{OutputData, SolveRequest};

/// Runs the requested solver in the current process. This is the body of the
/// `solve` subcommand, i.e. what executes inside the isolated child.
pub fn compute_solution(request: &SolveRequest) -> OutputData {
    debug!(
        "solving {} cities with {}",
        request.cities.len(),
        request.algorithm
    );
    let start = Instant::now();
    let result = request
        .algorithm
        .solve(&request.cities, request.start_city);
    let compute_time = start.elapsed();
    match result {
        Ok(tour) => OutputData {
            algorithm: request.algorithm,
            tour: Some(tour),
            error: None,
            compute_time,
        },
        Err(e) => OutputData {
            algorithm: request.algorithm,
            tour: None,
            error: Some(e),
            compute_time,
        },
    }
}
