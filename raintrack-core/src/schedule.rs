//! Recurring refresh owned by whoever drives the UI.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::{sync::Notify, task::JoinHandle};

/// Runs a job once on start and then on a fixed interval until stopped.
///
/// Stopping interrupts the wait between runs; a job that is already running
/// is left to finish.
#[derive(Debug)]
pub struct RefreshTask {
    is_running: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTask {
    /// Must be called from within a tokio runtime.
    pub fn start<F, Fut>(interval: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let is_running = Arc::new(AtomicBool::new(true));
        let stop_signal = Arc::new(Notify::new());

        let running = Arc::clone(&is_running);
        let signal = Arc::clone(&stop_signal);

        let handle = tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                job().await;

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = signal.notified() => {}
                }
            }
            tracing::info!("Refresh task stopped");
        });

        tracing::info!(interval_secs = interval.as_secs(), "Refresh task started");

        Self {
            is_running,
            stop_signal,
            handle: Some(handle),
        }
    }

    pub fn stop(&self) {
        self.is_running.store(false, Ordering::SeqCst);
        // Stored as a permit if the loop is mid-job.
        self.stop_signal.notify_one();
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Stop the task and wait for its loop to exit.
    pub async fn join(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Refresh task ended abnormally");
            }
        }
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const HOUR: Duration = Duration::from_secs(3600);

    fn counting_task(interval: Duration) -> (RefreshTask, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = RefreshTask::start(interval, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (task, runs)
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_on_interval() {
        let (task, runs) = counting_task(HOUR);

        tokio::time::sleep(HOUR * 2 + Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        task.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_loop() {
        let (task, runs) = counting_task(HOUR);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(task.is_running());
        task.join().await;
        let after_stop = runs.load(Ordering::SeqCst);
        assert_eq!(after_stop, 1);

        tokio::time::sleep(HOUR * 3).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_stops_the_task() {
        let (task, runs) = counting_task(HOUR);
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(task);

        tokio::time::sleep(HOUR * 3).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
