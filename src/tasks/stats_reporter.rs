//! Cache Statistics Reporter
//!
//! Background task that periodically logs the cache hit rate.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::info;

use crate::cache::{BoundedCache, StatsSnapshot};

/// Shortest sampling period; smaller values are raised to this.
pub const MIN_REPORT_PERIOD: Duration = Duration::from_millis(1);

/// Formats the periodic summary, or None before the first lookup.
pub fn hit_rate_line(stats: &StatsSnapshot) -> Option<String> {
    stats.hit_rate().map(|rate| {
        format!(
            "Cache Hits: {} | Misses: {} | Hit Rate: {:.2}%",
            stats.hits, stats.misses, rate
        )
    })
}

/// Spawns a task that samples the cache counters every `period` and logs a
/// hit-rate summary.
///
/// The first sample is taken one full period after spawning. A zero
/// `period` is raised to [`MIN_REPORT_PERIOD`]. Nothing is
/// logged while the cache has served no lookups. The task only reads the
/// counters and runs until `true` is sent on `shutdown` or the sender is
/// dropped.
///
/// # Example
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let reporter = spawn_stats_reporter(cache.clone(), Duration::from_secs(5), shutdown_rx);
/// // Later, during shutdown:
/// let _ = shutdown_tx.send(true);
/// reporter.await?;
/// ```
pub fn spawn_stats_reporter(
    cache: Arc<BoundedCache>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let period = period.max(MIN_REPORT_PERIOD);

    tokio::spawn(async move {
        info!(
            "Starting cache stats reporter with interval of {} ms",
            period.as_millis()
        );

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Cache stats reporter stopping");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let stats = cache.stats();
                    if let Some(line) = hit_rate_line(&stats) {
                        info!(
                            hits = stats.hits,
                            misses = stats.misses,
                            hit_rate = stats.hit_rate().unwrap_or_default(),
                            "{}",
                            line
                        );
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    #[test]
    fn test_hit_rate_line_format() {
        let stats = StatsSnapshot {
            hits: 2,
            misses: 1,
            evictions: 0,
        };
        assert_eq!(
            hit_rate_line(&stats).unwrap(),
            "Cache Hits: 2 | Misses: 1 | Hit Rate: 66.67%"
        );
    }

    #[test]
    fn test_hit_rate_line_silent_without_lookups() {
        assert_eq!(hit_rate_line(&StatsSnapshot::default()), None);
    }

    #[tokio::test]
    async fn test_reporter_stops_on_shutdown_signal() {
        let cache = Arc::new(BoundedCache::new(10));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = spawn_stats_reporter(cache, Duration::from_millis(10), shutdown_rx);
        tokio::time::sleep(Duration::from_millis(30)).await;

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reporter should stop after shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn test_reporter_stops_when_sender_dropped() {
        let cache = Arc::new(BoundedCache::new(10));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = spawn_stats_reporter(cache, Duration::from_secs(60), shutdown_rx);
        drop(shutdown_tx);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reporter should stop once the sender is gone")
            .unwrap();
    }

    #[tokio::test]
    async fn test_reporter_does_not_mutate_cache() {
        let cache = Arc::new(BoundedCache::new(10));
        cache.set("a".to_string(), "1".to_string());
        cache.get("a");
        cache.get("b");
        let before = cache.stats();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_stats_reporter(cache.clone(), Duration::from_millis(5), shutdown_rx);
        tokio::time::sleep(Duration::from_millis(40)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(cache.stats(), before);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_reporter_logs_structured_sample() {
        let (logs, _guard) = capture_logs();

        let cache = Arc::new(BoundedCache::new(10));
        cache.set("a".to_string(), "1".to_string());
        cache.get("a");
        cache.get("b");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_stats_reporter(cache, Duration::from_millis(10), shutdown_rx);
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        let output = logs.contents();
        assert!(output.contains("Cache Hits: 1 | Misses: 1 | Hit Rate: 50.00%"));
        assert!(output.contains("hits=1"));
        assert!(output.contains("misses=1"));
        assert!(output.contains("hit_rate=50"));
    }

    #[tokio::test]
    async fn test_reporter_silent_without_lookups() {
        let (logs, _guard) = capture_logs();

        let cache = Arc::new(BoundedCache::new(10));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_stats_reporter(cache, Duration::from_millis(5), shutdown_rx);
        tokio::time::sleep(Duration::from_millis(30)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        let output = logs.contents();
        assert!(output.contains("Starting cache stats reporter"));
        assert!(!output.contains("Cache Hits"));
    }

    #[tokio::test]
    async fn test_reporter_zero_period_is_clamped() {
        let cache = Arc::new(BoundedCache::new(10));
        cache.get("missing");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_stats_reporter(cache, Duration::ZERO, shutdown_rx);
        tokio::time::sleep(Duration::from_millis(10)).await;
        shutdown_tx.send(true).unwrap();

        // A zero period would have panicked inside the task
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reporter should stop after shutdown")
            .unwrap();
    }
}
