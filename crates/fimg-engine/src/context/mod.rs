//! Hardware context: one logical client of the device.
//!
//! A context owns its register queue, its functional-unit mirrors and its
//! shader slot cache. The device is shared with other contexts through a
//! [`HardwareLock`]; every acquisition that reports lost ownership is
//! followed by a full replay of the mirrors before any other register write.
//!
//! Lifecycle: a context is `Active` while it holds the lock, `Suspended`
//! between locked sections and `Closed` once [`HardwareContext::close`] ran.
//! A closed context cannot be reopened.

mod draw;
mod dump;
mod guard;
mod init;

pub use draw::{DrawReport, DrawRequest, ShaderBinding};
pub use guard::HardwareGuard;
pub use init::ContextInit;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::device::{DeviceInit, MmioWindow, RegisterWindow, Registers};
use crate::lock::{AcquireStatus, ContextId, HardwareLock, LockError};
use crate::queue::{FlushOutcome, RegisterQueue};
use crate::regs::{ATTRIB_NUM, NUM_MATRICES};
use crate::shader::ShaderSlotCache;
use crate::state::{
    FunctionalUnits, MAX_CLIP_COORD, ScissorTestData, TextureUnitState,
};

/// Exit status used when the device cannot be acquired.
const EBUSY: i32 = 16;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContextPhase {
    /// Holds the device; register access is allowed.
    Active,
    /// Between locked sections; the device may be reprogrammed by others.
    Suspended,
    Closed,
}

pub struct HardwareContext<W: RegisterWindow> {
    id: ContextId,
    lock: Arc<dyn HardwareLock>,
    regs: Registers<W>,
    queue: RegisterQueue,
    units: FunctionalUnits,
    shaders: ShaderSlotCache,
    phase: ContextPhase,

    /// Texture caches must be flushed before the next draw.
    inval_tex_cache: bool,
    num_attribs: usize,
    fb_height: u32,
    flip_y: bool,

    /// Staging buffer for the vertex words of the current draw.
    vertex_data: Vec<u32>,
    restores: u64,
}

impl HardwareContext<MmioWindow> {
    /// Maps the device and opens a context on it.
    pub fn open_device(
        device: &DeviceInit,
        lock: Arc<dyn HardwareLock>,
        init: ContextInit,
    ) -> Result<Self> {
        let window = MmioWindow::open(device)?;
        Self::try_open(window, lock, init)
            .with_context(|| format!("failed to open context on {}", device.path.display()))
    }
}

impl<W: RegisterWindow> HardwareContext<W> {
    /// Opens a context and takes the device for the first time.
    ///
    /// The returned context is `Active` and its state has been written to
    /// the device. Exits the process if the device cannot be acquired.
    pub fn open(window: W, lock: Arc<dyn HardwareLock>, init: ContextInit) -> Self {
        match Self::try_open(window, lock, init) {
            Ok(ctx) => ctx,
            Err(err) => fatal(err),
        }
    }

    /// Like [`open`](Self::open), but returns acquisition failures.
    pub fn try_open(
        window: W,
        lock: Arc<dyn HardwareLock>,
        init: ContextInit,
    ) -> Result<Self, LockError> {
        let ContextInit {
            cache_stats_interval,
            fb_height,
            flip_y,
        } = init;

        let id = lock.register();
        let mut ctx = Self {
            id,
            lock,
            regs: Registers::new(window),
            queue: RegisterQueue::new(),
            units: FunctionalUnits::default(),
            shaders: ShaderSlotCache::new(cache_stats_interval),
            phase: ContextPhase::Suspended,
            inval_tex_cache: true,
            num_attribs: 1,
            fb_height,
            flip_y,
            vertex_data: Vec::new(),
            restores: 0,
        };

        // The device content is unknown to a new context whatever the lock says.
        let status = ctx.try_acquire()?;
        if !status.requires_restore() {
            ctx.restore();
        }

        log::debug!("context {} opened", id.0);
        Ok(ctx)
    }

    #[inline]
    pub fn id(&self) -> ContextId {
        self.id
    }

    #[inline]
    pub fn phase(&self) -> ContextPhase {
        self.phase
    }

    /// Number of full state replays performed so far.
    #[inline]
    pub fn restore_count(&self) -> u64 {
        self.restores
    }

    // ── locking ───────────────────────────────────────────────────────────

    /// Takes the device, replaying state if another context had it.
    ///
    /// Exits the process if the device cannot be acquired: a half-acquired
    /// device has no safe rollback.
    pub fn acquire(&mut self) -> AcquireStatus {
        match self.try_acquire() {
            Ok(status) => status,
            Err(err) => fatal(err),
        }
    }

    /// Like [`acquire`](Self::acquire), but returns the failure.
    pub fn try_acquire(&mut self) -> Result<AcquireStatus, LockError> {
        if self.phase == ContextPhase::Closed {
            return Err(LockError::ContextClosed(self.id));
        }

        let status = self.lock.acquire(self.id)?;
        self.regs.set_locked(true);
        self.phase = ContextPhase::Active;

        if status.requires_restore() {
            log::debug!("context {}: {status:?}, replaying state", self.id.0);
            self.restore();
        }
        Ok(status)
    }

    /// Gives the device up. Queued writes stay queued.
    pub fn release(&mut self) {
        if self.phase != ContextPhase::Active {
            log::warn!("context {}: release without holding the device", self.id.0);
            return;
        }
        self.regs.set_locked(false);
        self.phase = ContextPhase::Suspended;
        self.lock.release(self.id);
    }

    /// Acquires the device for the lifetime of the returned guard.
    ///
    /// A context that already holds the device keeps holding it after the
    /// guard is dropped.
    pub fn lock_hardware(&mut self) -> HardwareGuard<'_, W> {
        let held = self.phase == ContextPhase::Active;
        if !held {
            self.acquire();
        }
        HardwareGuard::new(self, !held)
    }

    /// Releases the device and detaches from the arbiter for good.
    pub fn close(&mut self) {
        if self.phase == ContextPhase::Closed {
            return;
        }
        if self.phase == ContextPhase::Active {
            self.release();
        }
        self.lock.detach(self.id);
        self.queue.clear();
        self.shaders.invalidate();
        self.vertex_data = Vec::new();
        self.phase = ContextPhase::Closed;
        log::debug!("context {} closed", self.id.0);
    }

    // ── state ─────────────────────────────────────────────────────────────

    /// Replays every functional unit and forgets resident shaders.
    pub fn restore(&mut self) {
        self.queue.clear();
        replay(&mut self.units, &mut self.shaders, &mut self.regs);
        self.inval_tex_cache = true;
        self.restores += 1;
    }

    /// Writes queued state to the device.
    ///
    /// A pending texture cache flush goes out before the queued writes. A
    /// replay caused by overflow rewrites every texture, so the caches are
    /// flushed again after it. Dirty shader constants are uploaded last.
    pub fn flush(&mut self) -> FlushOutcome {
        if self.inval_tex_cache {
            self.regs.invalidate_caches(true, true);
            self.inval_tex_cache = false;
        }

        let Self {
            regs,
            queue,
            units,
            shaders,
            ..
        } = self;
        let outcome = queue.flush(regs, |regs| replay(units, shaders, regs));
        if outcome == FlushOutcome::Restored {
            self.restores += 1;
            self.regs.invalidate_caches(true, true);
        }

        self.units.compat.flush_constants(&mut self.regs);
        outcome
    }

    /// Read access to the functional-unit mirrors.
    pub fn units(&self) -> &FunctionalUnits {
        &self.units
    }

    pub fn shaders(&self) -> &ShaderSlotCache {
        &self.shaders
    }

    pub fn queue(&self) -> &RegisterQueue {
        &self.queue
    }

    pub fn registers(&mut self) -> &mut Registers<W> {
        &mut self.regs
    }

    /// Runs stage mutators against this context's mirrors and queue.
    pub fn with_state<R>(&mut self, f: impl FnOnce(&mut FunctionalUnits, &mut RegisterQueue) -> R) -> R {
        f(&mut self.units, &mut self.queue)
    }

    /// Points rendering at new buffers and records the framebuffer geometry.
    pub fn set_framebuffer(
        &mut self,
        color_addr: u32,
        depth_addr: u32,
        width: u32,
        height: u32,
        flip_y: bool,
    ) {
        self.fb_height = height;
        self.flip_y = flip_y;
        self.units
            .fragment
            .set_buffers(&mut self.queue, color_addr, depth_addr, width);
    }

    /// Sets the scissor rectangle in framebuffer coordinates with the origin
    /// at the bottom-left.
    pub fn set_scissor(&mut self, enable: bool, x: u32, y: u32, width: u32, height: u32) {
        let (y_min, y_end) = if self.flip_y {
            (
                self.fb_height.saturating_sub(y.saturating_add(height)),
                self.fb_height.saturating_sub(y),
            )
        } else {
            (y, y.saturating_add(height))
        };

        let bounds = |min: u32, end: u32| {
            let mut s = ScissorTestData::default();
            s.set_enable(enable);
            s.set_min(min.min(MAX_CLIP_COORD));
            s.set_max(end.saturating_sub(1).min(MAX_CLIP_COORD));
            s
        };

        let sx = bounds(x, x.saturating_add(width));
        let sy = bounds(y_min, y_end);
        self.units.fragment.set_scissor(&mut self.queue, sx, sy);
    }

    /// Sets the number of vertex attributes fetched per vertex.
    pub fn set_attribute_count(&mut self, count: usize) {
        self.num_attribs = count.clamp(1, ATTRIB_NUM);
        self.units
            .host
            .set_attribute_count(&mut self.queue, self.num_attribs);
    }

    #[inline]
    pub fn attribute_count(&self) -> usize {
        self.num_attribs
    }

    /// Binds a texture to `unit`; the texture caches are flushed before the
    /// next draw.
    pub fn set_texture(&mut self, unit: usize, texture: TextureUnitState) {
        self.units.compat.set_texture(&mut self.queue, unit, texture);
        self.inval_tex_cache = true;
    }

    /// Requests a texture cache flush before the next draw.
    pub fn invalidate_texture_cache(&mut self) {
        self.inval_tex_cache = true;
    }

    /// Schedules matrix `index` for re-upload on the next flush.
    pub fn mark_matrix_dirty(&mut self, index: usize) {
        debug_assert!(index < NUM_MATRICES);
        self.units.compat.mark_matrix_dirty(index);
    }
}

impl<W: RegisterWindow> Drop for HardwareContext<W> {
    fn drop(&mut self) {
        self.close();
    }
}

fn replay<W: RegisterWindow>(
    units: &mut FunctionalUnits,
    shaders: &mut ShaderSlotCache,
    regs: &mut Registers<W>,
) {
    log::debug!("replaying full context state");
    units.restore(regs);
    shaders.invalidate();
}

fn fatal(err: LockError) -> ! {
    log::error!("cannot acquire the hardware lock: {err}");
    std::process::exit(EBUSY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::SimWindow;
    use crate::lock::SharedLock;
    use crate::regs::{FGGB_CACHECTL, FGGB_INTPENDING, FGPF_SCISSOR_Y, FGVS_CFLOAT, fgtu_tex_ctrl};
    use crate::shader::{BindOutcome, ShaderKey, ShaderProgram, ShaderUnit};
    use crate::state::PrimitiveType;

    struct Rig {
        sim: SimWindow,
        lock: Arc<SharedLock>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                sim: SimWindow::new(),
                lock: Arc::new(SharedLock::new()),
            }
        }

        fn open(&self) -> HardwareContext<SimWindow> {
            HardwareContext::open(self.sim.clone(), self.lock.clone(), ContextInit::default())
        }
    }

    struct Programs {
        vs: ShaderProgram,
        ps: ShaderProgram,
    }

    impl Programs {
        fn new() -> Self {
            Self {
                vs: ShaderProgram::new(ShaderUnit::Vertex, vec![0x11; 8]).unwrap(),
                ps: ShaderProgram::new(ShaderUnit::Pixel, vec![0x22; 4]).unwrap(),
            }
        }

        fn request(&self, ps_key: u32) -> DrawRequest<'_> {
            DrawRequest {
                primitive: PrimitiveType::Triangles,
                vertex_shader: ShaderBinding {
                    key: ShaderKey::from_words([1, 0, 0]),
                    program: &self.vs,
                },
                pixel_shader: ShaderBinding {
                    key: ShaderKey::from_words([ps_key, 0, 0]),
                    program: &self.ps,
                },
                vertices: &[0.0, 1.0, 0.5, 1.0],
                count: 1,
            }
        }
    }

    // ── lock transitions ──────────────────────────────────────────────────

    #[test]
    fn open_restores_before_any_other_write() {
        let rig = Rig::new();
        let ctx = rig.open();

        assert_eq!(ctx.phase(), ContextPhase::Active);
        assert_eq!(ctx.restore_count(), 1);
        assert_eq!(rig.sim.writes()[0].addr, FGGB_INTPENDING);
    }

    #[test]
    fn already_owned_writes_nothing() {
        let rig = Rig::new();
        let mut ctx = rig.open();
        ctx.release();
        rig.sim.take_writes();

        assert_eq!(ctx.acquire(), AcquireStatus::AlreadyOwned);
        assert!(rig.sim.writes().is_empty());
        assert_eq!(ctx.restore_count(), 1);
    }

    #[test]
    fn losing_the_device_replays_state_first() {
        let rig = Rig::new();
        let mut a = rig.open();
        a.release();
        let mut b = rig.open();
        b.release();
        rig.sim.take_writes();

        assert_eq!(a.acquire(), AcquireStatus::ReacquiredAfterOther);
        assert_eq!(rig.sim.writes()[0].addr, FGGB_INTPENDING);
        assert_eq!(a.restore_count(), 2);
    }

    #[test]
    fn recursive_acquire_is_reported() {
        let rig = Rig::new();
        let mut ctx = rig.open();
        assert_eq!(ctx.try_acquire(), Err(LockError::AlreadyHeld(ctx.id())));
    }

    #[test]
    fn closed_context_refuses_the_device() {
        let rig = Rig::new();
        let mut ctx = rig.open();
        ctx.close();

        assert_eq!(ctx.phase(), ContextPhase::Closed);
        assert_eq!(rig.lock.holder(), None);
        assert_eq!(ctx.try_acquire(), Err(LockError::ContextClosed(ctx.id())));
    }

    #[test]
    fn guard_releases_on_scope_exit() {
        let rig = Rig::new();
        let mut ctx = rig.open();
        ctx.release();

        {
            let mut guard = ctx.lock_hardware();
            assert_eq!(guard.phase(), ContextPhase::Active);
            guard.set_attribute_count(2);
            guard.flush();
        }

        assert_eq!(ctx.phase(), ContextPhase::Suspended);
        assert_eq!(rig.lock.holder(), None);
    }

    #[test]
    fn guard_on_a_held_device_keeps_it() {
        let rig = Rig::new();
        let mut ctx = rig.open();
        rig.sim.take_writes();

        {
            let mut guard = ctx.lock_hardware();
            guard.set_attribute_count(2);
            guard.flush();
        }

        assert_eq!(ctx.phase(), ContextPhase::Active);
        assert_eq!(rig.lock.holder(), Some(ctx.id()));
        assert_eq!(ctx.restore_count(), 1);
        assert_eq!(ctx.try_acquire(), Err(LockError::AlreadyHeld(ctx.id())));
    }

    #[test]
    fn dropping_a_context_frees_the_device() {
        let rig = Rig::new();
        let first = rig.open();
        drop(first);
        assert_eq!(rig.lock.holder(), None);

        let mut second = rig.open();
        assert_eq!(second.phase(), ContextPhase::Active);
        second.release();
    }

    // ── scenarios ─────────────────────────────────────────────────────────

    #[test]
    fn shader_residency_does_not_survive_ownership_loss() {
        let rig = Rig::new();
        let programs = Programs::new();
        const K1: u32 = 0x4b31;

        let mut a = rig.open();
        let report = a.draw(&programs.request(K1));
        assert_eq!(report.pixel, BindOutcome::Miss(0));
        a.release();

        let mut b = rig.open();
        let report = b.draw(&programs.request(K1));
        assert!(matches!(report.pixel, BindOutcome::Miss(_)));
        b.release();

        assert_eq!(a.acquire(), AcquireStatus::ReacquiredAfterOther);
        let report = a.draw(&programs.request(K1));
        assert!(matches!(report.pixel, BindOutcome::Miss(_)));
        assert!(matches!(report.vertex, BindOutcome::Miss(_)));
        a.release();
    }

    #[test]
    fn overflowing_batch_is_replaced_by_full_replay() {
        let rig = Rig::new();
        let mut ctx = rig.open();
        ctx.flush();
        rig.sim.take_writes();

        ctx.with_state(|_, queue| {
            for i in 0..70 {
                queue.write(0x7_8000 + 4 * i, i);
            }
        });
        assert!(ctx.queue().is_overflowed());

        assert_eq!(ctx.flush(), FlushOutcome::Restored);
        let writes = rig.sim.writes();
        assert_eq!(writes[0].addr, FGGB_INTPENDING);
        assert!(writes.iter().all(|w| !(0x7_8000..0x7_8000 + 4 * 70).contains(&w.addr)));
        assert!(ctx.queue().is_empty());
        assert_eq!(ctx.restore_count(), 2);

        let replayed = writes.iter().position(|w| w.addr == fgtu_tex_ctrl(0)).unwrap();
        let cachectl = writes.iter().rposition(|w| w.addr == FGGB_CACHECTL).unwrap();
        assert!(replayed < cachectl);
    }

    #[test]
    fn restore_forces_shader_misses() {
        let rig = Rig::new();
        let programs = Programs::new();
        let mut ctx = rig.open();

        ctx.draw(&programs.request(7));
        let report = ctx.draw(&programs.request(7));
        assert_eq!(report.pixel, BindOutcome::Hit(0));

        ctx.restore();
        assert_eq!(ctx.shaders().current(ShaderUnit::Pixel), None);
        let report = ctx.draw(&programs.request(7));
        assert_eq!(report.pixel, BindOutcome::Miss(1));
    }

    // ── setters ───────────────────────────────────────────────────────────

    #[test]
    fn flipped_scissor_is_mirrored() {
        let rig = Rig::new();
        let mut ctx = rig.open();
        ctx.set_framebuffer(0x5000_0000, 0x5100_0000, 800, 480, true);
        ctx.set_scissor(true, 10, 20, 100, 50);
        ctx.flush();

        let y = ScissorTestData::from_raw(rig.sim.value(FGPF_SCISSOR_Y).unwrap());
        assert!(y.enable());
        assert_eq!((y.min(), y.max()), (480 - 70, 480 - 20 - 1));
    }

    #[test]
    fn texture_change_flushes_texture_caches() {
        let rig = Rig::new();
        let mut ctx = rig.open();
        ctx.flush();
        rig.sim.take_writes();

        ctx.set_texture(0, TextureUnitState::default());
        ctx.flush();
        let writes = rig.sim.writes();
        let cachectl = writes.iter().position(|w| w.addr == FGGB_CACHECTL).unwrap();
        let control = writes.iter().position(|w| w.addr == fgtu_tex_ctrl(0)).unwrap();
        assert!(cachectl < control);

        rig.sim.take_writes();
        ctx.flush();
        assert!(rig.sim.writes().iter().all(|w| w.addr != FGGB_CACHECTL));
    }

    #[test]
    fn dirty_matrix_is_uploaded_on_flush() {
        let rig = Rig::new();
        let mut ctx = rig.open();
        ctx.flush();
        rig.sim.take_writes();

        ctx.mark_matrix_dirty(0);
        ctx.flush();
        let writes = rig.sim.writes();
        assert_eq!(writes.len(), 16);
        assert_eq!(writes[0].addr, FGVS_CFLOAT);
    }
}
