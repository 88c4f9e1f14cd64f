//! Fan-out/fan-in over a list of files.
//!
//! A fixed set of scoped threads pulls paths from a bounded queue and reports `(path, result)`
//! pairs back. The caller blocks until every worker has finished. Results arrive in completion
//! order, which is unspecified: callers must sort what they get back.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

pub const MIN_WORKERS: usize = 1;

/// Runs `work` on every path using at most `workers` threads.
pub fn run_pool<T, F>(paths: Vec<PathBuf>, workers: usize, work: F) -> Vec<(PathBuf, T)>
where
    T: Send,
    F: Fn(&Path) -> T + Sync,
{
    if paths.is_empty() {
        return Vec::new();
    }
    let workers = workers.max(MIN_WORKERS).min(paths.len());
    let (job_tx, job_rx) = mpsc::sync_channel::<PathBuf>(workers * 2);
    let job_rx = Mutex::new(job_rx);
    let (result_tx, result_rx) = mpsc::channel::<(PathBuf, T)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = &job_rx;
            let work = &work;
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                loop {
                    let next = job_rx.lock().recv();
                    let Ok(path) = next else { break };
                    let output = work(&path);
                    if result_tx.send((path, output)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        for path in paths {
            if job_tx.send(path).is_err() {
                break;
            }
        }
        drop(job_tx);

        result_rx.iter().collect()
    })
}
