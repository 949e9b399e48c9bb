//! The periodic sampling task.

use futures_util::future::join_all;
use std::sync::Weak;
use tokio::sync::broadcast;

use super::engine::Shared;
use super::sample::ProcessSample;
use super::sampler::Sampler;

/// Poll loop for one run of the monitor.
///
/// Each tick re-reads the watch list and interval, samples every name on the
/// blocking pool, then commits and publishes the snapshot. The loop ends when
/// the shutdown signal fires, when the run is no longer current, or when the
/// monitor itself has been dropped.
pub(crate) async fn poll_loop(
    shared: Weak<Shared>,
    sampler: Sampler,
    run_id: u64,
    mut shutdown: broadcast::Receiver<()>,
) {
    log::debug!("Poll loop for run {} started", run_id);

    loop {
        let plan = match shared.upgrade() {
            Some(shared) => shared.tick_plan(run_id),
            None => None,
        };
        let Some((names, interval)) = plan else {
            break;
        };

        let rows = tokio::select! {
            rows = sample_all(&sampler, &names) => rows,
            _ = shutdown.recv() => break,
        };

        let committed = match shared.upgrade() {
            Some(shared) => shared.commit(run_id, rows),
            None => false,
        };
        if !committed {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.recv() => break,
        }
    }

    log::debug!("Poll loop for run {} exited", run_id);
}

/// Sample every name concurrently and return the rows in `names` order.
///
/// A sample that panics yields a `not_found` row for its name; the other
/// names are unaffected.
pub async fn sample_all(sampler: &Sampler, names: &[String]) -> Vec<ProcessSample> {
    let jobs = names.iter().map(|name| {
        let sampler = sampler.clone();
        let name = name.clone();
        tokio::task::spawn_blocking(move || sampler.sample(&name))
    });

    let results = join_all(jobs).await;

    names
        .iter()
        .zip(results)
        .map(|(name, result)| match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("Sampling '{}' failed: {}", name, e);
                ProcessSample::not_found(name)
            }
        })
        .collect()
}
