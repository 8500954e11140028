//! Bounded worker pool over an order-preserving slot array.
//!
//! `concurrency` workers claim `(index, item)` pairs from a shared queue and
//! send `(index, outcome)` back to the caller, which owns the slot array and
//! writes each slot exactly once. Output order therefore matches input order no
//! matter which worker finishes first. Every item runs in its own task, so a
//! panic costs that item's slot and nothing else.

use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// What became of one input item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<R> {
    Done(R),
    /// The item's task panicked; carries the panic message.
    Panicked(String),
    /// Never claimed, because the run was cancelled first.
    Skipped,
}

impl<R> Slot<R> {
    pub fn into_done(self) -> Option<R> {
        match self {
            Slot::Done(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Slot::Skipped)
    }
}

pub async fn run_bounded<T, R, F, Fut>(
    items: Vec<T>,
    concurrency: usize,
    cancel: CancellationToken,
    work: F,
) -> Vec<Slot<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(usize, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let total = items.len();
    let mut slots: Vec<Slot<R>> = (0..total).map(|_| Slot::Skipped).collect();
    if total == 0 {
        return slots;
    }

    let queue = Arc::new(Mutex::new(items.into_iter().enumerate()));
    let work = Arc::new(work);
    let (tx, mut rx) = mpsc::channel::<(usize, Slot<R>)>(concurrency.max(1) * 2);

    let workers = concurrency.clamp(1, total);
    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let queue = Arc::clone(&queue);
        let work = Arc::clone(&work);
        let cancel = cancel.clone();
        let tx = tx.clone();

        handles.push(tokio::spawn(async move {
            loop {
                if cancel.is_cancelled() {
                    debug!(worker_id, "Worker stopping after cancellation");
                    break;
                }
                let next = match queue.lock() {
                    Ok(mut queue) => queue.next(),
                    Err(_) => None,
                };
                let Some((index, item)) = next else { break };

                let outcome = match tokio::spawn((*work)(index, item)).await {
                    Ok(result) => Slot::Done(result),
                    Err(e) => {
                        let message = panic_message(e);
                        warn!(worker_id, index, "Item task failed: {}", message);
                        Slot::Panicked(message)
                    }
                };
                if tx.send((index, outcome)).await.is_err() {
                    break;
                }
            }
        }));
    }
    drop(tx);

    while let Some((index, outcome)) = rx.recv().await {
        slots[index] = outcome;
    }

    for handle in handles {
        if let Err(e) = handle.await {
            warn!("Worker terminated abnormally: {}", e);
        }
    }

    slots
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}
