//! # Parallel: run independent tasks concurrently, collect values by position.
//!
//! Same join rules as [`Each`](crate::Each), but every branch is a task producing a value:
//! ```text
//! run(done)
//!   ├─► no tasks ──► done(Ok(vec![]))
//!   └─► for (i, task) in tasks: scheduler.enqueue(|| task.run(k_i))
//!
//! k_i(Ok(v))  ──► results[i] = v; last success? ──► done(Ok(results in task order))
//! k_i(Err(e)) ──► first failure?               ──► done(Err(e))
//! ```
//! Values come back in the order the tasks were given, whatever order they finished in.

use std::borrow::Cow;
use std::sync::{Arc, Mutex, PoisonError};

use crate::core::{FanIn, Latch};
use crate::events::{Bus, EventKind, Trace};
use crate::scheduler::SchedulerRef;
use crate::tasks::{Continuation, Outcome, Task, TaskRef};

/// Concurrent fan-out over same-typed tasks.
pub struct Parallel<T> {
    tasks: Arc<[TaskRef<T>]>,
    scheduler: SchedulerRef,
    trace: Trace,
}

impl<T: Send + 'static> Parallel<T> {
    /// Creates a fan-out dispatching every task on `scheduler`.
    pub fn new(tasks: Vec<TaskRef<T>>, scheduler: SchedulerRef) -> Self {
        Self {
            tasks: tasks.into(),
            scheduler,
            trace: Trace::new("parallel"),
        }
    }

    /// Renames the flow (used in events).
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.trace.set_flow(name.into());
        self
    }

    /// Publishes progress events on `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.trace.set_bus(bus);
        self
    }

    /// Number of branches.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if there are no branches.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<T: Send + 'static> Task<Vec<T>> for Parallel<T> {
    fn name(&self) -> &str {
        self.trace.flow()
    }

    fn run(&self, done: Continuation<Vec<T>>) {
        self.trace.starting();
        if self.tasks.is_empty() {
            self.trace.completed();
            done(Ok(Vec::new()));
            return;
        }

        let run = Arc::new(ParallelRun {
            join: FanIn::new(self.tasks.len()),
            latch: Latch::new(done),
            results: Mutex::new(self.tasks.iter().map(|_| None).collect()),
            trace: self.trace.clone(),
        });

        for (index, task) in self.tasks.iter().enumerate() {
            if run.join.has_failed() {
                break;
            }
            let run = Arc::clone(&run);
            let task = Arc::clone(task);
            self.scheduler.enqueue(Box::new(move || {
                task.run(Box::new(move |res: Outcome<T>| run.settle(index, res)))
            }));
        }
    }
}

struct ParallelRun<T> {
    join: FanIn,
    latch: Latch<Vec<T>>,
    results: Mutex<Vec<Option<T>>>,
    trace: Trace,
}

impl<T: Send + 'static> ParallelRun<T> {
    fn settle(&self, index: usize, res: Outcome<T>) {
        match res {
            Ok(value) => {
                self.lock_results()[index] = Some(value);
                self.trace
                    .emit(EventKind::BranchCompleted, |ev| ev.with_index(index));
                if self.join.succeed() {
                    let values = std::mem::take(&mut *self.lock_results());
                    self.trace.completed();
                    self.latch.deliver(Ok(values.into_iter().flatten().collect()));
                }
            }
            Err(err) if self.join.fail() => {
                self.trace.emit(EventKind::BranchFailed, |ev| {
                    ev.with_index(index).with_reason(err.as_message())
                });
                self.trace.failed(&err);
                self.latch.deliver(Err(err));
            }
            Err(err) => {
                self.trace.emit(EventKind::FailureSuppressed, |ev| {
                    ev.with_index(index).with_reason(err.as_message())
                });
            }
        }
    }

    fn lock_results(&self) -> std::sync::MutexGuard<'_, Vec<Option<T>>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{QueueScheduler, Scheduler, TaskFailure, TaskFn, TokioScheduler};
    use std::time::Duration;

    /// Completes with `v` after `delay` of virtual time.
    fn delayed(v: u32, delay: u64, sched: &Arc<QueueScheduler>) -> TaskRef<u32> {
        let sched = Arc::clone(sched);
        TaskFn::arc("delayed", move |done: Continuation<u32>| {
            sched.enqueue_after(Duration::from_millis(delay), Box::new(move || done(Ok(v))));
        })
    }

    fn capture() -> (Arc<Mutex<Vec<Outcome<Vec<u32>>>>>, Continuation<Vec<u32>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, Box::new(move |res| sink.lock().unwrap().push(res)))
    }

    #[test]
    fn test_results_follow_task_order_not_finish_order() {
        let sched = Arc::new(QueueScheduler::new());
        let par = Parallel::new(
            vec![
                delayed(1, 30, &sched),
                delayed(2, 10, &sched),
                delayed(3, 20, &sched),
            ],
            sched.clone(),
        );
        let (seen, done) = capture();
        par.run(done);
        sched.run_until_idle();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(*seen[0].as_ref().unwrap(), vec![1, 2, 3]);
        assert_eq!(sched.now(), Duration::from_millis(30));
    }

    #[test]
    fn test_first_failure_wins() {
        let sched = Arc::new(QueueScheduler::new());
        let s = Arc::clone(&sched);
        let late_failure: TaskRef<u32> = TaskFn::arc("late", move |done: Continuation<u32>| {
            s.enqueue_after(
                Duration::from_millis(50),
                Box::new(move || done(Err(TaskFailure::msg("late")))),
            );
        });
        let s = Arc::clone(&sched);
        let early_failure: TaskRef<u32> = TaskFn::arc("early", move |done: Continuation<u32>| {
            s.enqueue_after(
                Duration::from_millis(5),
                Box::new(move || done(Err(TaskFailure::msg("early")))),
            );
        });
        let par = Parallel::new(
            vec![late_failure, delayed(1, 1, &sched), early_failure],
            sched.clone(),
        );
        let (seen, done) = capture();
        par.run(done);
        sched.run_until_idle();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_ref().unwrap_err().as_message(), "early");
    }

    #[test]
    fn test_empty_parallel_completes_immediately() {
        let sched = Arc::new(QueueScheduler::new());
        let (seen, done) = capture();
        Parallel::<u32>::new(Vec::new(), sched.clone()).run(done);
        assert!(seen.lock().unwrap()[0].as_ref().unwrap().is_empty());
        assert_eq!(sched.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_collects_every_value_across_threads() {
        let sched = TokioScheduler::current();
        let tasks: Vec<TaskRef<u32>> = (0..100u32)
            .map(|i| -> TaskRef<u32> {
                TaskFn::arc("square", move |done: Continuation<u32>| done(Ok(i * i)))
            })
            .collect();
        let par = Parallel::new(tasks, Arc::new(sched.clone()));
        let (seen, done) = capture();
        par.run(done);
        sched.idle().await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let values = seen[0].as_ref().unwrap();
        assert_eq!(values.len(), 100);
        assert!(values.iter().enumerate().all(|(i, v)| *v == (i * i) as u32));
    }
}
