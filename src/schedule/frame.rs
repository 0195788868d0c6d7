use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use crate::foundation::core::PtexId;
use crate::foundation::error::UifxResult;
use crate::render::backend::RenderBackend;

/// What one flush did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was dirty; no mesh rebuild and no draw.
    Clean,
    /// One draw wrote `cells` texel groups.
    Drawn { cells: usize },
}

/// Per-frame flush capability registered with a [`FrameScheduler`].
pub trait FrameFlush {
    fn flush_frame(&self, backend: &mut dyn RenderBackend) -> UifxResult<FlushOutcome>;
}

/// Summary of one [`FrameScheduler::will_render`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub hooks_run: usize,
    pub textures_drawn: usize,
    pub cells_written: usize,
    /// Hooks dropped because their texture no longer exists.
    pub pruned: usize,
    /// Hooks whose flush returned an error.
    pub failed: usize,
}

struct ScheduledFlush {
    id: PtexId,
    hook: Weak<dyn FrameFlush>,
}

#[derive(Default)]
struct HookList {
    entries: Vec<ScheduledFlush>,
    scheduled: HashSet<PtexId>,
}

/// Pre-render hook list shared by every parameter texture of a process.
///
/// The list is created on first activation and lives as long as the scheduler. Each texture adds
/// its flush at most once. While the injected tick gate reports that the host is not ticking, the
/// scheduler neither initializes nor runs.
pub struct FrameScheduler {
    gate: Box<dyn Fn() -> bool>,
    next_id: Cell<u64>,
    hooks: RefCell<Option<HookList>>,
    frames: Cell<u64>,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    /// Scheduler for a host that is always ticking.
    pub fn new() -> Self {
        Self::with_gate(|| true)
    }

    pub fn with_gate(gate: impl Fn() -> bool + 'static) -> Self {
        Self {
            gate: Box::new(gate),
            next_id: Cell::new(1),
            hooks: RefCell::new(None),
            frames: Cell::new(0),
        }
    }

    pub fn is_ticking(&self) -> bool {
        (self.gate)()
    }

    pub fn is_initialized(&self) -> bool {
        self.hooks.borrow().is_some()
    }

    /// Hand out a texture id unique within this scheduler.
    pub fn allocate_id(&self) -> PtexId {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        PtexId(id)
    }

    /// Lazily create the hook list. Returns `false` (and does nothing) while not ticking.
    pub fn activate(&self) -> bool {
        if !self.is_ticking() {
            return false;
        }
        let mut hooks = self.hooks.borrow_mut();
        if hooks.is_none() {
            tracing::debug!("initialize frame scheduler");
            *hooks = Some(HookList::default());
        }
        true
    }

    /// Add `hook` under `id` unless that id is already scheduled.
    ///
    /// Returns `true` only when the hook was added.
    pub fn schedule(&self, id: PtexId, hook: Weak<dyn FrameFlush>) -> bool {
        if !self.activate() {
            return false;
        }
        let mut hooks = self.hooks.borrow_mut();
        let Some(list) = hooks.as_mut() else {
            return false;
        };
        if !list.scheduled.insert(id) {
            return false;
        }
        list.entries.push(ScheduledFlush { id, hook });
        tracing::debug!(ptex = id.0, "scheduled parameter texture flush");
        true
    }

    pub fn is_scheduled(&self, id: PtexId) -> bool {
        self.hooks
            .borrow()
            .as_ref()
            .is_some_and(|l| l.scheduled.contains(&id))
    }

    pub fn scheduled_len(&self) -> usize {
        self.hooks.borrow().as_ref().map_or(0, |l| l.entries.len())
    }

    /// Number of [`Self::will_render`] calls that ran hooks.
    pub fn frames_rendered(&self) -> u64 {
        self.frames.get()
    }

    /// Pre-render notification: flush every scheduled texture once, in registration order.
    ///
    /// Every hook runs even when an earlier one fails. The first error is returned after the
    /// whole pass, and each failing texture keeps its dirty cells for the next frame.
    #[tracing::instrument(skip(self, backend))]
    pub fn will_render(&self, backend: &mut dyn RenderBackend) -> UifxResult<FrameReport> {
        let mut report = FrameReport::default();
        if !self.is_ticking() {
            return Ok(report);
        }

        let live: Vec<Rc<dyn FrameFlush>> = {
            let mut hooks = self.hooks.borrow_mut();
            let Some(list) = hooks.as_mut() else {
                return Ok(report);
            };
            let before = list.entries.len();
            let mut live = Vec::with_capacity(before);
            list.entries.retain(|e| match e.hook.upgrade() {
                Some(h) => {
                    live.push(h);
                    true
                }
                None => false,
            });
            report.pruned = before - list.entries.len();
            if report.pruned > 0 {
                let kept: HashSet<PtexId> = list.entries.iter().map(|e| e.id).collect();
                list.scheduled.retain(|id| kept.contains(id));
                tracing::debug!(pruned = report.pruned, "pruned flush hooks of dropped textures");
            }
            live
        };

        let mut first_error = None;
        for hook in live {
            report.hooks_run += 1;
            match hook.flush_frame(backend) {
                Ok(FlushOutcome::Drawn { cells }) => {
                    report.textures_drawn += 1;
                    report.cells_written += cells;
                }
                Ok(FlushOutcome::Clean) => {}
                Err(err) => {
                    report.failed += 1;
                    tracing::error!(error = %err, "parameter texture flush failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        self.frames.set(self.frames.get().saturating_add(1));
        match first_error {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/frame.rs"]
mod tests;
