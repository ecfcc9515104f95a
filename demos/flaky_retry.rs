//! # Example: flaky_retry
//!
//! An async download that fails twice before succeeding, retried through a `Flows`
//! factory configured with exponential backoff and jitter.
//!
//! ## Flow
//! ```text
//! Retry::run()
//!   ├─► attempt 1 → Err("connection reset #1")
//!   ├─► publish(AttemptFailed, RetryScheduled{delay≈100ms})
//!   ├─► enqueue_after(delay) → attempt 2 → Err("connection reset #2")
//!   ├─► publish(AttemptFailed, RetryScheduled{delay≈200ms})
//!   ├─► enqueue_after(delay) → attempt 3 → Ok(bytes)
//!   └─► publish(FlowCompleted)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example flaky_retry
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use taskflow::{
    BackoffPolicy, Config, Flows, FutureTask, JitterPolicy, TaskFailure, TaskRef, TokioScheduler,
};
use tokio::runtime::Handle;

static ATTEMPTS: AtomicU32 = AtomicU32::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Retry up to 4 times, 100ms doubling, capped at 2s, equal jitter
    let cfg = Config {
        retries: 4,
        retry_backoff: Some(
            BackoffPolicy::exponential(Duration::from_millis(100), 2.0, Duration::from_secs(2))
                .with_jitter(JitterPolicy::Equal),
        ),
        ..Config::default()
    };

    // 2. No subscribers: we print from the task itself
    let sched = TokioScheduler::current();
    let flows = Flows::builder(cfg, Arc::new(sched.clone())).build()?;

    // 3. A download that fails twice
    let download: TaskRef<Vec<u8>> = FutureTask::arc("download", Handle::current(), || async {
        let attempt = ATTEMPTS.fetch_add(1, Ordering::Relaxed) + 1;
        println!("[download] attempt {attempt}");
        tokio::time::sleep(Duration::from_millis(20)).await;

        if attempt <= 2 {
            Err(TaskFailure::msg(format!("connection reset #{attempt}")))
        } else {
            Ok(b"payload".to_vec())
        }
    });

    // 4. Await the retrying flow
    let bytes = taskflow::complete(&flows.retry(download)).await?;
    println!(
        "[download] got {} bytes after {} attempts",
        bytes.len(),
        ATTEMPTS.load(Ordering::Relaxed)
    );

    flows.shutdown().await;
    Ok(())
}
