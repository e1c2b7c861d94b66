use crate::serializable_struct_with_getters;
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
pub use tsp_algorithms::{Algorithm, SolveError};
pub use tsp_challenges::{City, CitySet, Tour};

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Completed,
    TimedOut,
    Failed,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected before any process was started, or by the solver itself.
    InvalidInput,
    MatchingFailed,
    /// The solver process crashed, was killed by a signal or exited non-zero
    /// without reporting an error.
    AbnormalExit,
    /// The solver process could not be started or fed its input.
    Dispatch,
    /// The solver process exited cleanly but its output was unusable.
    Protocol,
}

serializable_struct_with_getters! {
    Failure {
        kind: FailureKind,
        message: String,
    }
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<SolveError> for Failure {
    fn from(err: SolveError) -> Self {
        match err {
            SolveError::InvalidInput(message) => Self::new(FailureKind::InvalidInput, message),
            SolveError::MatchingFailed(message) => Self::new(FailureKind::MatchingFailed, message),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            FailureKind::InvalidInput => "invalid input",
            FailureKind::MatchingFailed => "matching failed",
            FailureKind::AbnormalExit => "abnormal exit",
            FailureKind::Dispatch => "dispatch failed",
            FailureKind::Protocol => "bad solver output",
        };
        write!(f, "{}: {}", kind, self.message)
    }
}

serializable_struct_with_getters! {
    AlgorithmResult {
        algorithm: Algorithm,
        status: Status,
        tour: Option<Tour>,
        distance: Option<f64>,
        elapsed: Duration,
        timeout: Duration,
        failure: Option<Failure>,
    }
}

impl AlgorithmResult {
    pub fn completed(
        algorithm: Algorithm,
        tour: Tour,
        distance: f64,
        elapsed: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            algorithm,
            status: Status::Completed,
            tour: Some(tour),
            distance: Some(distance),
            elapsed,
            timeout,
            failure: None,
        }
    }

    pub fn timed_out(algorithm: Algorithm, elapsed: Duration, timeout: Duration) -> Self {
        Self {
            algorithm,
            status: Status::TimedOut,
            tour: None,
            distance: None,
            elapsed,
            timeout,
            failure: None,
        }
    }

    pub fn failed(
        algorithm: Algorithm,
        failure: Failure,
        elapsed: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            algorithm,
            status: Status::Failed,
            tour: None,
            distance: None,
            elapsed,
            timeout,
            failure: Some(failure),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

/// One row of the results table, e.g.
/// `Christofides   : Distance = 5623.18    Time = 0.01       seconds`.
impl fmt::Display for AlgorithmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.algorithm.name();
        match (self.status, self.distance, &self.failure) {
            (Status::Completed, Some(distance), _) => write!(
                f,
                "{:<15}: Distance = {:<10.2} Time = {:<10.2} seconds",
                name,
                distance,
                self.elapsed.as_secs_f64()
            ),
            (Status::TimedOut, _, _) => write!(
                f,
                "{:<15}: Exceeded time limit of {} seconds",
                name,
                self.timeout.as_secs_f64()
            ),
            (_, _, Some(failure)) => write!(
                f,
                "{:<15}: Failed after {:.2} seconds ({})",
                name,
                self.elapsed.as_secs_f64(),
                failure
            ),
            _ => write!(f, "{:<15}: Failed", name),
        }
    }
}

serializable_struct_with_getters! {
    ComparisonRun {
        cities: CitySet,
        results: Vec<AlgorithmResult>,
    }
}

impl ComparisonRun {
    pub fn get(&self, algorithm: Algorithm) -> Option<&AlgorithmResult> {
        self.results.iter().find(|r| r.algorithm == algorithm)
    }

    /// Completed tours in selection order, for drawing route overlays.
    pub fn tours(&self) -> impl Iterator<Item = (Algorithm, &Tour)> {
        self.results
            .iter()
            .filter_map(|r| r.tour.as_ref().map(|tour| (r.algorithm, tour)))
    }

    /// Shortest completed tour; the first one wins ties.
    pub fn best(&self) -> Option<&AlgorithmResult> {
        self.results
            .iter()
            .filter(|r| r.is_completed())
            .fold(None, |best: Option<&AlgorithmResult>, r| match best {
                Some(b) if b.distance <= r.distance => Some(b),
                _ => Some(r),
            })
    }
}

// Wire format between the harness and a solver process

serializable_struct_with_getters! {
    SolveRequest {
        algorithm: Algorithm,
        cities: CitySet,
        start_city: usize,
    }
}

serializable_struct_with_getters! {
    OutputData {
        algorithm: Algorithm,
        tour: Option<Tour>,
        error: Option<SolveError>,
        compute_time: Duration,
    }
}
