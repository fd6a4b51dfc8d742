// src/schedule.rs

//! Cooperative suspension for the generation pipeline.
//!
//! Long passes hand control back to whatever executor is driving them at fixed points
//! (after each carving backtrack, each obstacle row, each outer wall pair, each probe).
//! The [`Scheduler`] decides what a suspension means: [`Immediate`] never suspends, so
//! tests and batch tools run the whole pass in one poll; [`Cooperative`] returns
//! `Pending` once per suspension so a single-threaded host loop gets a turn.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::error::{MazeError, Result};

#[allow(async_fn_in_trait)]
pub trait Scheduler {
    async fn yield_now(&self);
}

/// Never suspends.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Scheduler for Immediate {
    async fn yield_now(&self) {}
}

/// Suspends once at every yield point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cooperative;

impl Scheduler for Cooperative {
    async fn yield_now(&self) {
        YieldNow::default().await
    }
}

/// Future that is pending on its first poll and ready on the second. The waker is
/// signalled immediately, so the executor reschedules the task after servicing
/// whatever else is queued.
#[derive(Debug, Default)]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Shared flag a caller can trip to stop an in-flight pass at its next yield point.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A yield point: suspends through `scheduler`, then fails with
/// [`MazeError::Cancelled`] if `cancel` was tripped meanwhile.
pub async fn checkpoint<S: Scheduler>(scheduler: &S, cancel: &CancellationToken) -> Result<()> {
    scheduler.yield_now().await;
    if cancel.is_cancelled() {
        return Err(MazeError::Cancelled);
    }
    Ok(())
}
