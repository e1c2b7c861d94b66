use crate::serializable_struct_with_getters;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};
use tsp_algorithms::Algorithm;
use tsp_challenges::DEFAULT_MAX_COORD;

pub const DEFAULT_TIMEOUT_SECS: f64 = 900.0;

fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_workers() -> usize {
    1
}

fn default_max_coord() -> i32 {
    DEFAULT_MAX_COORD
}

serializable_struct_with_getters! {
    ComparisonConfig {
        #[serde(default = "default_timeout_secs")]
        timeout_secs: f64,
        #[serde(default = "default_workers")]
        workers: usize,
        #[serde(default)]
        start_city: usize,
        #[serde(default = "default_max_coord")]
        max_coord: i32,
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            workers: default_workers(),
            start_city: 0,
            max_coord: DEFAULT_MAX_COORD,
        }
    }
}

impl ComparisonConfig {
    /// Saturates instead of panicking: values that `validate` rejects map to
    /// zero (non-positive, NaN) or `Duration::MAX` (too large, infinite).
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<(), String> {
        timeout_from_secs(self.timeout_secs)?;
        if self.workers == 0 {
            return Err("workers must be at least 1".to_string());
        }
        if self.max_coord < 0 {
            return Err(format!(
                "max_coord must be non-negative (got {})",
                self.max_coord
            ));
        }
        Ok(())
    }
}

fn timeout_from_secs(secs: f64) -> Result<Duration, String> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!(
            "timeout must be a positive number of seconds (got {})",
            secs
        ));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("timeout of {} seconds is too large", secs))
}

/// An algorithm to run, with an optional timeout that replaces the
/// configured default for this algorithm only.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    pub algorithm: Algorithm,
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl Selection {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            timeout: None,
        }
    }

    pub fn with_timeout(algorithm: Algorithm, timeout: Duration) -> Self {
        Self {
            algorithm,
            timeout: Some(timeout),
        }
    }

    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }

    pub fn all() -> Vec<Selection> {
        Algorithm::ALL.iter().copied().map(Selection::new).collect()
    }
}

/// Parses `name` or `name:seconds`, e.g. `christofides` or `brute_force:30`.
impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None => Ok(Selection::new(s.parse()?)),
            Some((name, secs)) => {
                let secs = secs
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid timeout '{}' for {}", secs, name))?;
                let timeout = timeout_from_secs(secs)?;
                Ok(Selection::with_timeout(name.parse()?, timeout))
            }
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timeout {
            Some(timeout) => write!(f, "{}:{}", self.algorithm.id(), timeout.as_secs_f64()),
            None => f.write_str(self.algorithm.id()),
        }
    }
}

/// Parses a comma separated list of selections, dropping repeats of an
/// algorithm so every algorithm appears at most once in a run.
pub fn parse_selections(list: &str) -> Result<Vec<Selection>, String> {
    let mut selections: Vec<Selection> = Vec::new();
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let selection: Selection = item.parse()?;
        if !selections.iter().any(|s| s.algorithm == selection.algorithm) {
            selections.push(selection);
        }
    }
    if selections.is_empty() {
        return Err("Select at least one algorithm".to_string());
    }
    Ok(selections)
}
