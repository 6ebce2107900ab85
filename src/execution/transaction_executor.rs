//! Transaction Executor
//!
//! Runs state-changing calls as atomic sections: a section either completes or every
//! component it was given is restored to the snapshot taken on entry. Top-level sections
//! from different threads are serialized; sections nested on the owning thread (a router
//! calling into a pair, a token hook calling back) run inside the outer one.
//!
//! Snapshots are taken on every nested entry, so components keep them cheap: the event log
//! and the ledger hand out a journal mark, a pair copies only its own state.

use crate::errors::DexResult;
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread::{self, ThreadId};
use tracing::debug;

/// State that can be captured before an atomic section and put back if it fails.
pub trait Revertible {
    type Snapshot;

    fn snapshot(&self) -> Self::Snapshot;

    fn restore(&self, snapshot: Self::Snapshot);
}

impl Revertible for () {
    type Snapshot = ();

    fn snapshot(&self) -> Self::Snapshot {}

    fn restore(&self, _snapshot: Self::Snapshot) {}
}

impl<T: Revertible + ?Sized> Revertible for &T {
    type Snapshot = T::Snapshot;

    fn snapshot(&self) -> Self::Snapshot {
        (**self).snapshot()
    }

    fn restore(&self, snapshot: Self::Snapshot) {
        (**self).restore(snapshot)
    }
}

impl<A: Revertible, B: Revertible> Revertible for (A, B) {
    type Snapshot = (A::Snapshot, B::Snapshot);

    fn snapshot(&self) -> Self::Snapshot {
        (self.0.snapshot(), self.1.snapshot())
    }

    fn restore(&self, snapshot: Self::Snapshot) {
        self.0.restore(snapshot.0);
        self.1.restore(snapshot.1);
    }
}

impl<A: Revertible, B: Revertible, C: Revertible> Revertible for (A, B, C) {
    type Snapshot = (A::Snapshot, B::Snapshot, C::Snapshot);

    fn snapshot(&self) -> Self::Snapshot {
        (self.0.snapshot(), self.1.snapshot(), self.2.snapshot())
    }

    fn restore(&self, snapshot: Self::Snapshot) {
        self.0.restore(snapshot.0);
        self.1.restore(snapshot.1);
        self.2.restore(snapshot.2);
    }
}

#[derive(Clone, Copy, Debug)]
struct Owner {
    thread: ThreadId,
    depth: usize,
}

#[derive(Debug, Default)]
pub struct TransactionExecutor {
    owner: Mutex<Option<Owner>>,
    released: Condvar,
}

impl TransactionExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `call` atomically over `state`.
    pub fn execute<R, T, F>(&self, state: &R, call: F) -> DexResult<T>
    where
        R: Revertible + ?Sized,
        F: FnOnce() -> DexResult<T>,
    {
        let frame = self.enter();
        let snapshot = state.snapshot();

        match call() {
            Ok(value) => Ok(value),
            Err(error) => {
                state.restore(snapshot);
                debug!(depth = frame.depth, %error, "Atomic section reverted");
                Err(error)
            }
        }
    }

    /// Run `call` inside the serialized section without capturing any state. Plain reads and
    /// single writes use this so they never interleave with another thread's section.
    pub fn run<T, F>(&self, call: F) -> T
    where
        F: FnOnce() -> T,
    {
        let _frame = self.enter();
        call()
    }

    /// Nesting depth of the section currently running on this thread, 0 when idle.
    pub fn depth(&self) -> usize {
        let owner = self.owner.lock().unwrap_or_else(PoisonError::into_inner);
        match *owner {
            Some(owner) if owner.thread == thread::current().id() => owner.depth,
            _ => 0,
        }
    }

    fn enter(&self) -> Frame<'_> {
        let current = thread::current().id();
        let mut owner = self.owner.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match *owner {
                None => {
                    *owner = Some(Owner { thread: current, depth: 1 });
                    return Frame { executor: self, depth: 1 };
                }
                Some(running) if running.thread == current => {
                    let depth = running.depth + 1;
                    *owner = Some(Owner { thread: current, depth });
                    return Frame { executor: self, depth };
                }
                Some(_) => {
                    owner = self.released.wait(owner).unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }
}

struct Frame<'a> {
    executor: &'a TransactionExecutor,
    depth: usize,
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        let mut owner = self.executor.owner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(running) = *owner {
            if running.depth <= 1 {
                *owner = None;
                self.executor.released.notify_all();
            } else {
                *owner = Some(Owner { depth: running.depth - 1, ..running });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DexError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct Counter(AtomicU64);

    impl Revertible for Counter {
        type Snapshot = u64;

        fn snapshot(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }

        fn restore(&self, snapshot: u64) {
            self.0.store(snapshot, Ordering::SeqCst)
        }
    }

    #[test]
    fn test_failed_section_restores_state() {
        let executor = TransactionExecutor::new();
        let counter = Counter::default();

        let result: DexResult<()> = executor.execute(&counter, || {
            counter.0.fetch_add(5, Ordering::SeqCst);
            Err(DexError::InvariantViolation)
        });

        assert_eq!(result, Err(DexError::InvariantViolation));
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
        assert_eq!(executor.depth(), 0);
    }

    #[test]
    fn test_nested_failure_only_reverts_inner_section() {
        let executor = TransactionExecutor::new();
        let counter = Counter::default();

        let result = executor.execute(&counter, || {
            counter.0.fetch_add(1, Ordering::SeqCst);
            assert_eq!(executor.depth(), 1);
            let inner: DexResult<()> = executor.execute(&counter, || {
                assert_eq!(executor.depth(), 2);
                counter.0.fetch_add(10, Ordering::SeqCst);
                Err(DexError::Locked)
            });
            assert_eq!(inner, Err(DexError::Locked));
            Ok(counter.0.load(Ordering::SeqCst))
        });

        assert_eq!(result, Ok(1));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_run_waits_for_running_section() {
        let executor = TransactionExecutor::new();
        let counter = Counter::default();

        let (sender, receiver) = std::sync::mpsc::channel();
        std::thread::scope(|scope| {
            let section = scope.spawn(|| {
                executor.execute(&counter, || {
                    counter.0.store(7, Ordering::SeqCst);
                    sender.send(()).unwrap();
                    std::thread::sleep(std::time::Duration::from_millis(20));
                    Err::<(), _>(DexError::Locked)
                })
            });

            receiver.recv().unwrap();
            assert_eq!(executor.run(|| counter.0.load(Ordering::SeqCst)), 0);
            assert_eq!(section.join().unwrap(), Err(DexError::Locked));
        });
    }

    #[test]
    fn test_sections_from_threads_are_serialized() {
        let executor = Arc::new(TransactionExecutor::new());
        let counter = Arc::new(Counter::default());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let executor = executor.clone();
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        executor
                            .execute(&*counter, || {
                                // read-modify-write that would lose updates without serialization
                                let value = counter.0.load(Ordering::SeqCst);
                                std::thread::yield_now();
                                counter.0.store(value + 1, Ordering::SeqCst);
                                Ok(())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.0.load(Ordering::SeqCst), 400);
    }
}
