//! # Example: pipeline
//!
//! Nests combinators and prints every event with the built-in `LogWriter`:
//! - a `Waterfall` reads a manifest, parses it into item ids;
//! - an `Each` fans out over the ids and "uploads" each one;
//! - a `Forever` heartbeat keeps ticking until it reports failure.
//!
//! ## Run
//! ```bash
//! cargo run --example pipeline --features logging
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use taskflow::{
    Config, Continuation, Flows, LogWriter, Outcome, Subscribe, Task, TaskFailure, TaskFn,
    TaskRef, TokioScheduler,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sched = TokioScheduler::current();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let flows = Flows::builder(Config::default(), Arc::new(sched.clone()))
        .with_subscribers(subs)
        .build()?;

    // 1. manifest → ids
    let read: TaskRef<String> = TaskFn::arc("read-manifest", |done: Continuation<String>| {
        done(Ok("3,1,4,1,5".to_string()))
    });
    let ids = flows
        .waterfall(read)
        .then(|text: String, done: Continuation<Vec<u32>>| {
            let parsed: Result<Vec<u32>, _> =
                text.split(',').map(|s| s.parse::<u32>()).collect();
            done(parsed.map_err(TaskFailure::new))
        })
        .with_name("manifest");
    let ids = taskflow::complete(&ids).await?;

    // 2. one upload per id
    let upload = flows
        .each(ids, |id: u32, done: Continuation<()>| {
            println!("[upload] item {id}");
            done(Ok(()))
        })
        .with_name("upload");
    taskflow::complete(&upload).await?;

    // 3. heartbeat until the third beat fails
    let beats = Arc::new(AtomicU32::new(0));
    let b = Arc::clone(&beats);
    let heartbeat: TaskRef<()> = TaskFn::arc("heartbeat", move |done: Continuation<()>| {
        if b.fetch_add(1, Ordering::SeqCst) < 2 {
            done(Ok(()))
        } else {
            done(Err(TaskFailure::msg("peer went away")))
        }
    });
    flows
        .forever(heartbeat)
        .with_name("heartbeat")
        .run_with(|res: Outcome<Infallible>| {
            if let Some(err) = res.err() {
                println!("[heartbeat] stopped: {err}");
            }
        });

    sched.idle().await;
    flows.shutdown().await;
    Ok(())
}
