use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use crate::foundation::core::{PtexId, Slot, TextureHandle, unorm8_to_f32};
use crate::foundation::error::UifxResult;
use crate::material::{Material, PropertyId};
use crate::ptex::layout::{PtexConfig, PtexLayout};
use crate::ptex::slots::SlotAllocator;
use crate::ptex::store::{ParameterStore, WriteOutcome};
use crate::ptex::target::ParameterTarget;
use crate::render::backend::{DrawCommand, RenderBackend, TargetDesc};
use crate::render::mesh::CellMesh;
use crate::schedule::frame::{FlushOutcome, FrameFlush, FrameScheduler};

/// Result of [`ParameterTexture::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// A free slot was assigned.
    Assigned(Slot),
    /// The target already held this slot; nothing changed.
    AlreadyRegistered(Slot),
    /// No slot was free. The target stays at [`Slot::NONE`] and its writes are ignored.
    Exhausted,
}

impl Registration {
    pub fn slot(self) -> Slot {
        match self {
            Self::Assigned(s) | Self::AlreadyRegistered(s) => s,
            Self::Exhausted => Slot::NONE,
        }
    }
}

/// Lifetime counters of one parameter texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PtexStats {
    pub registrations: u64,
    pub exhausted_registrations: u64,
    pub releases: u64,
    pub draws: u64,
    pub cells_written: u64,
    pub clean_flushes: u64,
}

struct PtexState {
    slots: SlotAllocator,
    store: ParameterStore,
    texture: Option<TextureHandle>,
    mesh: Option<CellMesh>,
    stats: PtexStats,
}

/// Parameter rows of every instance of one effect type, mirrored into one texture.
///
/// Writes land in the CPU buffer immediately and mark their texel group dirty. The scheduled
/// flush turns all dirty groups into one mesh and one draw per frame.
pub struct ParameterTexture {
    id: PtexId,
    layout: PtexLayout,
    property_name: String,
    property_id: OnceCell<PropertyId>,
    scheduler: Rc<FrameScheduler>,
    this: Weak<ParameterTexture>,
    state: RefCell<PtexState>,
}

impl std::fmt::Debug for ParameterTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterTexture")
            .field("id", &self.id)
            .field("layout", &self.layout)
            .field("property_name", &self.property_name)
            .finish_non_exhaustive()
    }
}

impl ParameterTexture {
    pub fn new(config: &PtexConfig, scheduler: &Rc<FrameScheduler>) -> UifxResult<Rc<Self>> {
        let layout = PtexLayout::from_config(config)?;
        let id = scheduler.allocate_id();
        Ok(Rc::new_cyclic(|this| Self {
            id,
            layout,
            property_name: config.property_name.clone(),
            property_id: OnceCell::new(),
            scheduler: Rc::clone(scheduler),
            this: this.clone(),
            state: RefCell::new(PtexState {
                slots: SlotAllocator::new(layout.instance_capacity()),
                store: ParameterStore::new(layout),
                texture: None,
                mesh: None,
                stats: PtexStats::default(),
            }),
        }))
    }

    pub fn id(&self) -> PtexId {
        self.id
    }

    pub fn layout(&self) -> PtexLayout {
        self.layout
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn scheduler(&self) -> &Rc<FrameScheduler> {
        &self.scheduler
    }

    /// Assign a free slot to `target` if it has none.
    pub fn register(&self, target: &mut dyn ParameterTarget) -> Registration {
        self.initialize();
        if let Some(material) = target.ptex_material() {
            self.bind_texture(material);
        }

        let current = target.parameter_slot();
        if current.is_assigned() {
            return Registration::AlreadyRegistered(current);
        }

        let mut state = self.state.borrow_mut();
        match state.slots.acquire() {
            Some(slot) => {
                state.stats.registrations = state.stats.registrations.saturating_add(1);
                drop(state);
                target.set_parameter_slot(slot);
                tracing::debug!(ptex = self.id.0, slot = slot.0, "assigned parameter slot");
                Registration::Assigned(slot)
            }
            None => {
                state.stats.exhausted_registrations =
                    state.stats.exhausted_registrations.saturating_add(1);
                tracing::warn!(
                    ptex = self.id.0,
                    capacity = self.layout.instance_capacity(),
                    "parameter texture is full; instance left unregistered"
                );
                Registration::Exhausted
            }
        }
    }

    /// Return `target`'s slot to the pool and reset it to [`Slot::NONE`].
    ///
    /// Returns `false` when the target held no slot.
    pub fn unregister(&self, target: &mut dyn ParameterTarget) -> bool {
        let slot = target.parameter_slot();
        if !slot.is_assigned() {
            return false;
        }
        let mut state = self.state.borrow_mut();
        if state.slots.release(slot) {
            state.stats.releases = state.stats.releases.saturating_add(1);
            tracing::debug!(ptex = self.id.0, slot = slot.0, "released parameter slot");
        } else {
            tracing::warn!(
                ptex = self.id.0,
                slot = slot.0,
                "target held a slot this texture did not hand out"
            );
        }
        drop(state);
        target.set_parameter_slot(Slot::NONE);
        true
    }

    pub fn set_byte(&self, target: &dyn ParameterTarget, channel: u32, value: u8) -> WriteOutcome {
        let outcome = self
            .state
            .borrow_mut()
            .store
            .set_byte(target.parameter_slot(), channel, value);
        self.trace_write(outcome, target.parameter_slot(), channel);
        outcome
    }

    pub fn set_float(&self, target: &dyn ParameterTarget, channel: u32, value: f32) -> WriteOutcome {
        let outcome = self
            .state
            .borrow_mut()
            .store
            .set_float(target.parameter_slot(), channel, value);
        self.trace_write(outcome, target.parameter_slot(), channel);
        outcome
    }

    fn trace_write(&self, outcome: WriteOutcome, slot: Slot, channel: u32) {
        if outcome == WriteOutcome::ChannelOutOfRange {
            tracing::warn!(
                ptex = self.id.0,
                slot = slot.0,
                channel,
                channels = self.layout.channel_count(),
                "parameter write outside the texture"
            );
        }
    }

    /// Row lookup coordinate for `target`: `(slot - 0.5) / capacity`.
    pub fn normalized_slot_coordinate(&self, target: &dyn ParameterTarget) -> f32 {
        self.layout.normalized_row(target.parameter_slot())
    }

    /// Shader property id of [`Self::property_name`], resolved on first use.
    pub fn property_id(&self) -> PropertyId {
        *self
            .property_id
            .get_or_init(|| PropertyId::from_name(&self.property_name))
    }

    /// Bind the backing texture to [`Self::property_id`] on `material`.
    pub fn bind_texture(&self, material: &mut Material) {
        let texture = self.ensure_texture();
        material.set_texture(self.property_id(), texture);
    }

    /// Handle of the backing texture, creating it if needed.
    pub fn ensure_texture(&self) -> TextureHandle {
        let mut state = self.state.borrow_mut();
        *state.texture.get_or_insert_with(TextureHandle::allocate)
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.state.borrow().texture
    }

    pub fn target_desc(&self) -> TargetDesc {
        TargetDesc::for_layout(self.layout)
    }

    // Host-gated: outside an active tick this leaves the scheduler untouched and is retried on the
    // next registration.
    fn initialize(&self) {
        if !self.scheduler.activate() || self.scheduler.is_scheduled(self.id) {
            return;
        }
        self.ensure_texture();
        let hook: Weak<dyn FrameFlush> = self.this.clone();
        self.scheduler.schedule(self.id, hook);
    }

    /// Draw all dirty cells into the backing texture with a single draw.
    ///
    /// Does nothing when no cell is dirty. On failure the dirty cells are kept for the next flush.
    #[tracing::instrument(skip(self, backend), fields(ptex = self.id.0))]
    pub fn flush(&self, backend: &mut dyn RenderBackend) -> UifxResult<FlushOutcome> {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        if state.store.dirty_len() == 0 {
            state.stats.clean_flushes = state.stats.clean_flushes.saturating_add(1);
            return Ok(FlushOutcome::Clean);
        }

        let target = *state.texture.get_or_insert_with(TextureHandle::allocate);
        backend.ensure_target(target, &self.target_desc())?;

        let mesh = state.mesh.get_or_insert_with(CellMesh::new);
        mesh.rebuild(self.layout, state.store.dirty_texels());
        backend.draw_cells(&DrawCommand {
            target,
            mesh,
            transform: self.layout.grid_to_clip(),
        })?;

        let cells = state.store.clear_dirty();
        state.stats.draws = state.stats.draws.saturating_add(1);
        state.stats.cells_written = state.stats.cells_written.saturating_add(cells as u64);
        tracing::debug!(cells, "flushed parameter cells");
        Ok(FlushOutcome::Drawn { cells })
    }

    pub fn byte(&self, slot: Slot, channel: u32) -> Option<u8> {
        self.state.borrow().store.byte(slot, channel)
    }

    /// Stored value of `(slot, channel)` as a float in `[0, 1]`.
    pub fn value(&self, slot: Slot, channel: u32) -> Option<f32> {
        self.byte(slot, channel).map(unorm8_to_f32)
    }

    pub fn texel(&self, index: u32) -> Option<[u8; 4]> {
        self.state.borrow().store.texel(index)
    }

    /// Snapshot of pending texel-group indices, ascending.
    pub fn dirty_cells(&self) -> Vec<u32> {
        self.state.borrow().store.dirty_cells().collect()
    }

    pub fn buffer_snapshot(&self) -> Vec<u8> {
        self.state.borrow().store.buffer().to_vec()
    }

    pub fn free_slots(&self) -> usize {
        self.state.borrow().slots.free_len()
    }

    pub fn registered_len(&self) -> usize {
        self.state.borrow().slots.in_use_len()
    }

    pub fn stats(&self) -> PtexStats {
        self.state.borrow().stats
    }

    /// Times the cell mesh has been rebuilt.
    pub fn mesh_rebuilds(&self) -> u64 {
        self.state.borrow().mesh.as_ref().map_or(0, CellMesh::rebuilds)
    }
}

impl FrameFlush for ParameterTexture {
    fn flush_frame(&self, backend: &mut dyn RenderBackend) -> UifxResult<FlushOutcome> {
        self.flush(backend)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ptex/texture.rs"]
mod tests;
