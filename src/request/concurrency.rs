use std::future::Future;
use std::time::{Duration, SystemTime};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::time::Instant;

/// A slot that finished. `output` is `None` when the task ended without a
/// value (it panicked or was aborted).
#[derive(Debug)]
pub struct Finished<R> {
    pub index: usize,
    pub started_at: SystemTime,
    pub elapsed: Duration,
    pub output: Option<R>,
}

fn spawn_slot<R, Fut>(index: usize, task: Fut) -> impl Future<Output = Finished<R>>
where
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    let started_at = SystemTime::now();
    let clock = Instant::now();
    tokio::spawn(task).map(move |joined| Finished {
        index,
        started_at,
        elapsed: clock.elapsed(),
        output: joined.ok(),
    })
}

/// Runs `launch(i)` for every `i` in `0..total` with at most `window` tasks in
/// flight. The first `min(window, total)` start together; each completion
/// starts the next unscheduled index. Results come back in completion order,
/// exactly one per index.
pub async fn execute_sliding_window<R, F, Fut>(total: usize, window: usize, mut launch: F) -> Vec<Finished<R>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    if total == 0 {
        return Vec::new();
    }

    let width = window.max(1).min(total);
    let mut in_flight = FuturesUnordered::new();
    for index in 0..width {
        in_flight.push(spawn_slot(index, launch(index)));
    }

    // Only this loop moves the cursor.
    let mut next_index = width;
    let mut finished = Vec::with_capacity(total);

    while let Some(done) = in_flight.next().await {
        if next_index < total {
            in_flight.push(spawn_slot(next_index, launch(next_index)));
            next_index += 1;
        }
        finished.push(done);
    }

    finished
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Gauge {
        fn new() -> Arc<Self> {
            Arc::new(Self { current: AtomicUsize::new(0), peak: AtomicUsize::new(0) })
        }

        fn enter(&self) {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
        }

        fn leave(&self) {
            self.current.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn never_exceeds_window() {
        let gauge = Gauge::new();
        let finished = execute_sliding_window(12, 3, |i| {
            let gauge = gauge.clone();
            async move {
                gauge.enter();
                tokio::time::sleep(Duration::from_millis(5 + (i as u64 % 4) * 5)).await;
                gauge.leave();
                i
            }
        })
        .await;

        assert_eq!(finished.len(), 12);
        let peak = gauge.peak.load(Ordering::SeqCst);
        assert!(peak <= 3 && peak > 1, "peak concurrency was {}", peak);
        let mut indices: Vec<usize> = finished.iter().map(|f| f.index).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..12).collect::<Vec<_>>());
        assert!(finished.iter().all(|f| f.output == Some(f.index)));
    }

    #[tokio::test]
    async fn empty_batch_launches_nothing() {
        let launched = AtomicUsize::new(0);
        let finished = execute_sliding_window(0, 4, |i| {
            launched.fetch_add(1, Ordering::SeqCst);
            async move { i }
        })
        .await;
        assert!(finished.is_empty());
        assert_eq!(launched.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn launches_in_submission_order() {
        let order = std::sync::Mutex::new(Vec::new());
        execute_sliding_window(7, 2, |i| {
            order.lock().unwrap().push(i);
            async move { i }
        })
        .await;
        assert_eq!(*order.lock().unwrap(), (0..7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn completion_order_not_submission_order() {
        let finished = execute_sliding_window(2, 2, |i| async move {
            let delay = if i == 0 { 60 } else { 1 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            i
        })
        .await;
        assert_eq!(finished[0].index, 1);
        assert_eq!(finished[1].index, 0);
    }

    #[tokio::test]
    async fn panicked_slot_yields_no_output() {
        let finished = execute_sliding_window(3, 4, |i| async move {
            if i == 1 {
                panic!("slot {} blew up", i);
            }
            i
        })
        .await;
        assert_eq!(finished.len(), 3);
        let lost: Vec<usize> = finished.iter().filter(|f| f.output.is_none()).map(|f| f.index).collect();
        assert_eq!(lost, vec![1]);
    }

    #[tokio::test]
    async fn hung_slot_does_not_stall_the_window() {
        let finished = execute_sliding_window(6, 2, |i| async move {
            let delay = if i == 0 { 200 } else { 5 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            i
        })
        .await;
        // Every other request drains through the second slot first.
        assert_eq!(finished.last().map(|f| f.index), Some(0));
        assert_eq!(finished.len(), 6);
    }
}
