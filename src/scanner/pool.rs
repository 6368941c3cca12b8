//! Fixed-size worker pool over a shared host queue.
//!
//! Each worker takes one item, runs the job to completion, sends the result
//! and only then takes the next item. The result channel closes once every
//! worker has finished, so draining the receiver doubles as joining the pool.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// Number of workers to start for `items` jobs when `requested` were asked for.
///
/// Zero means one worker per item. Never more workers than items, never
/// fewer than one.
pub fn effective_workers(requested: usize, items: usize) -> usize {
    let workers = if requested == 0 { items } else { requested.min(items) };
    workers.max(1)
}

/// Spawn `workers` tasks that run `job` over `items`.
///
/// Results arrive in completion order. Dropping the receiver makes the
/// workers stop after their current job.
pub fn spawn<T, R, F, Fut>(items: Vec<T>, workers: usize, job: F) -> mpsc::Receiver<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let workers = effective_workers(workers, items.len());
    let (tx, rx) = mpsc::channel(workers);
    let queue = Arc::new(Mutex::new(VecDeque::from(items)));
    let job = Arc::new(job);

    for _ in 0..workers {
        let queue = Arc::clone(&queue);
        let job = Arc::clone(&job);
        let tx = tx.clone();

        tokio::spawn(async move {
            loop {
                let next = queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();
                let Some(item) = next else {
                    break;
                };

                if tx.send(job(item).await).await.is_err() {
                    break;
                }
            }
        });
    }

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_effective_workers() {
        assert_eq!(effective_workers(0, 10), 10);
        assert_eq!(effective_workers(4, 10), 4);
        assert_eq!(effective_workers(50, 10), 10);
        assert_eq!(effective_workers(0, 0), 1);
    }

    #[tokio::test]
    async fn test_every_item_produces_one_result() {
        let mut rx = spawn((0..25u32).collect(), 4, |n| async move { n * 2 });

        let mut results = Vec::new();
        while let Some(r) = rx.recv().await {
            results.push(r);
        }
        results.sort_unstable();

        assert_eq!(results, (0..25u32).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded_by_workers() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut rx = {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            spawn((0..20u32).collect(), 3, move |_| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                }
            })
        };

        let mut done = 0;
        while rx.recv().await.is_some() {
            done += 1;
        }

        assert_eq!(done, 20);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_empty_input_closes_channel() {
        let mut rx = spawn(Vec::<u32>::new(), 8, |n| async move { n });
        assert!(rx.recv().await.is_none());
    }
}
