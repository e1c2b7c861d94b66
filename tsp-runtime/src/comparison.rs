use crate::harness::Harness;
use futures::stream::{self, StreamExt};
use log::info;
use tsp_structs::{
    config::{ComparisonConfig, Selection},
    core::{CitySet, ComparisonRun},
};

/// Runs every selected algorithm on the same cities, each through its own
/// bounded child process. At most `config.workers` children run at once.
/// Results come back in selection order no matter which child finishes first,
/// and a timeout or failure in one run never affects the others.
pub async fn compare(
    harness: &Harness,
    cities: CitySet,
    selections: &[Selection],
    config: &ComparisonConfig,
) -> ComparisonRun {
    let default_timeout = config.timeout();
    info!(
        "comparing {} algorithms on {} cities ({} at a time)",
        selections.len(),
        cities.len(),
        config.workers.max(1)
    );
    let results = stream::iter(selections)
        .map(|selection| {
            harness.run(
                selection.algorithm,
                &cities,
                selection.timeout_or(default_timeout),
            )
        })
        .buffered(config.workers.max(1))
        .collect::<Vec<_>>()
        .await;
    ComparisonRun { cities, results }
}
