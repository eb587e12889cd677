// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background worker: runs detection, rectification and debug renders on
// the tokio blocking pool so the interaction thread never waits on pixels.
//
// Every submission takes a new generation number from the counter of its
// job kind. A result is only handed back if no newer submission of the same
// kind has been made since; stale results are dropped instead of
// overwriting fresher state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, RgbaImage};
use quadcrop_core::error::{QuadcropError, Result};
use quadcrop_core::{DetectionConfig, Quad};
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use crate::debug::DebugHarness;
use crate::scan::detector::{Detection, DocumentDetector};
use crate::scan::rectify::rectify;

/// Independent lanes of work. A submission only supersedes earlier
/// submissions of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Detection,
    Rectify,
    DebugRender,
}

/// Generation token for one submission.
#[derive(Debug, Clone)]
pub struct Ticket {
    kind: JobKind,
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl Ticket {
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer submission of this kind has been made on the
    /// issuing worker.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }
}

/// A job running on the blocking pool, bound to its ticket.
pub struct PendingResult<T> {
    ticket: Ticket,
    handle: JoinHandle<Result<T>>,
}

impl<T> PendingResult<T> {
    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    /// Wait for the job regardless of staleness.
    pub async fn wait(self) -> Result<(Ticket, T)> {
        let value = self
            .handle
            .await
            .map_err(|e| QuadcropError::Worker(format!("task join: {e}")))??;
        Ok((self.ticket, value))
    }

    /// Wait for the job; `Ok(None)` when a newer submission superseded it.
    pub async fn resolve(self) -> Result<Option<T>> {
        let (ticket, value) = self.wait().await?;
        if ticket.is_current() {
            Ok(Some(value))
        } else {
            debug!(generation = ticket.generation, "Dropping stale result");
            Ok(None)
        }
    }
}

/// Submits pipeline jobs to the tokio blocking pool.
///
/// Must be used from within a tokio runtime. Each [`JobKind`] has its own
/// generation counter, so a rectification never makes a running detection
/// stale. Clones share the counters: a submission through any clone
/// supersedes same-kind jobs submitted through the others.
#[derive(Debug, Clone, Default)]
pub struct DetectionWorker {
    detection: Arc<AtomicU64>,
    rectify: Arc<AtomicU64>,
    debug_render: Arc<AtomicU64>,
}

impl DetectionWorker {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, kind: JobKind) -> &Arc<AtomicU64> {
        match kind {
            JobKind::Detection => &self.detection,
            JobKind::Rectify => &self.rectify,
            JobKind::DebugRender => &self.debug_render,
        }
    }

    /// Generation of the most recent submission of `kind` (0 before any).
    pub fn current_generation(&self, kind: JobKind) -> u64 {
        self.counter(kind).load(Ordering::Acquire)
    }

    fn issue_ticket(&self, kind: JobKind) -> Ticket {
        let latest = self.counter(kind);
        let generation = latest.fetch_add(1, Ordering::AcqRel) + 1;
        Ticket {
            kind,
            generation,
            latest: Arc::clone(latest),
        }
    }

    /// Run an arbitrary blocking job under a fresh ticket of `kind`.
    pub fn submit<T, F>(&self, kind: JobKind, job: F) -> PendingResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let ticket = self.issue_ticket(kind);
        debug!(?kind, generation = ticket.generation, "Job submitted");
        PendingResult {
            ticket,
            handle: tokio::task::spawn_blocking(job),
        }
    }

    #[instrument(skip_all)]
    pub fn submit_detection(
        &self,
        image: Arc<DynamicImage>,
        config: DetectionConfig,
    ) -> PendingResult<Detection> {
        self.submit(JobKind::Detection, move || DocumentDetector::new(config)?.detect(&image))
    }

    #[instrument(skip_all)]
    pub fn submit_rectify(&self, image: Arc<DynamicImage>, corners: Quad) -> PendingResult<RgbaImage> {
        self.submit(JobKind::Rectify, move || rectify(&image, &corners))
    }

    #[instrument(skip_all)]
    pub fn submit_debug_render(
        &self,
        image: Arc<DynamicImage>,
        harness: DebugHarness,
    ) -> PendingResult<RgbaImage> {
        self.submit(JobKind::DebugRender, move || harness.render(&image))
    }
}

/// Holder for whatever is currently displayed. Accepts a value only from a
/// current ticket that is newer than the one already shown. Keep one slot
/// per job kind; generations are only comparable within a kind.
#[derive(Debug, Default)]
pub struct DisplaySlot<T> {
    shown: Mutex<Option<(u64, T)>>,
}

impl<T: Clone> DisplaySlot<T> {
    pub fn new() -> Self {
        Self {
            shown: Mutex::new(None),
        }
    }

    /// Store `value` if `ticket` still wins. Returns whether it was stored.
    pub fn offer(&self, ticket: &Ticket, value: T) -> bool {
        if !ticket.is_current() {
            return false;
        }
        let Ok(mut shown) = self.shown.lock() else {
            return false;
        };
        if matches!(&*shown, Some((generation, _)) if *generation >= ticket.generation) {
            return false;
        }
        *shown = Some((ticket.generation, value));
        true
    }

    pub fn current(&self) -> Option<T> {
        self.shown
            .lock()
            .ok()
            .and_then(|shown| shown.as_ref().map(|(_, value)| value.clone()))
    }

    pub fn generation(&self) -> Option<u64> {
        self.shown
            .lock()
            .ok()
            .and_then(|shown| shown.as_ref().map(|(generation, _)| *generation))
    }
}
