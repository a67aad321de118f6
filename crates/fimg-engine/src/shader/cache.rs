use crate::device::{RegisterWindow, Registers};
use crate::queue::RegisterQueue;
use crate::regs::{FGPS_EXE_MODE, FGPS_PC_COPY, FGPS_PC_END, FGPS_PC_START, FGVS_CONFIG, FGVS_PC_RANGE};

use super::{INSTRUCTION_WORDS, ShaderKey, ShaderProgram, ShaderUnit};

/// Resident vertex programs.
pub const VS_CACHE_SIZE: usize = 4;
/// Resident pixel programs.
pub const PS_CACHE_SIZE: usize = 8;

/// `FGVS_CONFIG` bit that latches the new PC range.
const VS_CONFIG_COPY_PC: u32 = 1;

/// One region of instruction memory.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ShaderSlot {
    pub occupant: Option<ShaderKey>,
    pub instruction_count: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Per-unit bind counters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Program had to be uploaded.
    pub misses: u64,
    /// Program was already the current one.
    pub same_hits: u64,
    /// Program was resident in another slot.
    pub cache_hits: u64,
}

/// What a bind did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    Hit(usize),
    Miss(usize),
}

impl BindOutcome {
    #[inline]
    pub fn slot(self) -> usize {
        match self {
            BindOutcome::Hit(slot) | BindOutcome::Miss(slot) => slot,
        }
    }
}

#[derive(Debug)]
struct SlotTable<const N: usize> {
    unit: ShaderUnit,
    slots: [ShaderSlot; N],
    evict_counter: usize,
    current: Option<usize>,
    stats: CacheStats,
}

impl<const N: usize> SlotTable<N> {
    fn new(unit: ShaderUnit) -> Self {
        debug_assert_eq!(unit.slot_count(), N);
        Self {
            unit,
            slots: [ShaderSlot::default(); N],
            evict_counter: 0,
            current: None,
            stats: CacheStats::default(),
        }
    }

    fn bind<W: RegisterWindow>(
        &mut self,
        key: ShaderKey,
        program: &ShaderProgram,
        regs: &mut Registers<W>,
        queue: &mut RegisterQueue,
    ) -> BindOutcome {
        let resident = self.slots.iter().position(|s| s.occupant == Some(key));

        if let Some(slot) = resident {
            self.slots[slot].hits += 1;
            if self.current == Some(slot) {
                self.stats.same_hits += 1;
            } else {
                self.stats.cache_hits += 1;
                self.select(slot, queue);
            }
            return BindOutcome::Hit(slot);
        }

        let slot = self.evict_counter;
        self.evict_counter = (self.evict_counter + 1) % N;
        self.stats.misses += 1;

        if let Some(old) = self.slots[slot].occupant {
            log::debug!("{:?} shader slot {slot}: evicting {old:?}", self.unit);
        }
        let entry = &mut self.slots[slot];
        entry.occupant = Some(key);
        entry.instruction_count = program.instruction_count();
        entry.misses += 1;

        self.upload(slot, program.words(), regs);
        self.select(slot, queue);
        BindOutcome::Miss(slot)
    }

    fn upload<W: RegisterWindow>(&self, slot: usize, instructions: &[u32], regs: &mut Registers<W>) {
        let base = self.unit.instmem_base()
            + (self.unit.slot_start(slot) * INSTRUCTION_WORDS * 4) as u32;
        for (i, &word) in instructions.iter().enumerate() {
            regs.write(base + 4 * i as u32, word);
        }
    }

    fn select(&mut self, slot: usize, queue: &mut RegisterQueue) {
        let start = self.unit.slot_start(slot) as u32;
        let end = start + self.slots[slot].instruction_count.saturating_sub(1) as u32;

        match self.unit {
            ShaderUnit::Vertex => {
                queue.write(FGVS_PC_RANGE, start | (end << 16));
                queue.write(FGVS_CONFIG, VS_CONFIG_COPY_PC);
            }
            ShaderUnit::Pixel => {
                queue.write(FGPS_EXE_MODE, 0);
                queue.write(FGPS_PC_START, start);
                queue.write(FGPS_PC_END, end);
                queue.write(FGPS_PC_COPY, 1);
                queue.write(FGPS_EXE_MODE, 1);
            }
        }
        self.current = Some(slot);
    }

    fn invalidate(&mut self) {
        for slot in &mut self.slots {
            slot.occupant = None;
            slot.instruction_count = 0;
        }
        self.current = None;
    }
}

/// Resident programs of both shader units.
///
/// Slots are claimed round-robin: no usage tracking, so a bind is a key scan
/// plus at most one upload. Occupancy is only meaningful while the owning
/// context keeps the device; it is dropped on every restore.
#[derive(Debug)]
pub struct ShaderSlotCache {
    vertex: SlotTable<VS_CACHE_SIZE>,
    pixel: SlotTable<PS_CACHE_SIZE>,
    stats_interval: u64,
    binds: u64,
}

impl ShaderSlotCache {
    /// `stats_interval` is the number of binds between statistics log lines;
    /// zero disables them.
    pub fn new(stats_interval: u64) -> Self {
        Self {
            vertex: SlotTable::new(ShaderUnit::Vertex),
            pixel: SlotTable::new(ShaderUnit::Pixel),
            stats_interval,
            binds: 0,
        }
    }

    /// Makes `program`, identified by `key`, current on its unit.
    ///
    /// Instruction words of a miss go straight to instruction memory; the
    /// slot selection words are queued and take effect on the next flush.
    /// [`ShaderProgram`] guarantees the program fits one slot.
    pub fn bind<W: RegisterWindow>(
        &mut self,
        key: ShaderKey,
        program: &ShaderProgram,
        regs: &mut Registers<W>,
        queue: &mut RegisterQueue,
    ) -> BindOutcome {
        let outcome = match program.unit() {
            ShaderUnit::Vertex => self.vertex.bind(key, program, regs, queue),
            ShaderUnit::Pixel => self.pixel.bind(key, program, regs, queue),
        };

        self.binds += 1;
        if self.stats_interval != 0 && self.binds % self.stats_interval == 0 {
            self.log_stats();
        }
        outcome
    }

    /// Forgets every resident program and the current selections.
    pub fn invalidate(&mut self) {
        self.vertex.invalidate();
        self.pixel.invalidate();
    }

    /// Whether binding `key` on `unit` would be a hit.
    pub fn contains(&self, unit: ShaderUnit, key: ShaderKey) -> bool {
        self.slots(unit).iter().any(|s| s.occupant == Some(key))
    }

    pub fn slots(&self, unit: ShaderUnit) -> &[ShaderSlot] {
        match unit {
            ShaderUnit::Vertex => &self.vertex.slots,
            ShaderUnit::Pixel => &self.pixel.slots,
        }
    }

    pub fn current(&self, unit: ShaderUnit) -> Option<usize> {
        match unit {
            ShaderUnit::Vertex => self.vertex.current,
            ShaderUnit::Pixel => self.pixel.current,
        }
    }

    /// Slot the next miss on `unit` will claim.
    pub fn next_victim(&self, unit: ShaderUnit) -> usize {
        match unit {
            ShaderUnit::Vertex => self.vertex.evict_counter,
            ShaderUnit::Pixel => self.pixel.evict_counter,
        }
    }

    pub fn stats(&self, unit: ShaderUnit) -> CacheStats {
        match unit {
            ShaderUnit::Vertex => self.vertex.stats,
            ShaderUnit::Pixel => self.pixel.stats,
        }
    }

    fn log_stats(&self) {
        for unit in [ShaderUnit::Vertex, ShaderUnit::Pixel] {
            let CacheStats {
                misses,
                same_hits,
                cache_hits,
            } = self.stats(unit);
            log::debug!(
                "{unit:?} shader cache: {misses} misses, {same_hits} same hits, {cache_hits} cache hits"
            );
        }
    }
}

impl Default for ShaderSlotCache {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::SimWindow;
    use crate::regs::{FGPS_INSTMEM, FGVS_INSTMEM};

    fn key(n: u32) -> ShaderKey {
        ShaderKey::from_words([n, 0, 0])
    }

    fn program(unit: ShaderUnit, n: u32) -> ShaderProgram {
        ShaderProgram::new(unit, vec![n; 2 * INSTRUCTION_WORDS]).unwrap()
    }

    struct Rig {
        sim: SimWindow,
        regs: Registers<SimWindow>,
        queue: RegisterQueue,
        cache: ShaderSlotCache,
    }

    impl Rig {
        fn new() -> Self {
            let sim = SimWindow::new();
            let mut regs = Registers::new(sim.clone());
            regs.set_locked(true);
            Self {
                sim,
                regs,
                queue: RegisterQueue::new(),
                cache: ShaderSlotCache::default(),
            }
        }

        fn bind(&mut self, unit: ShaderUnit, n: u32) -> BindOutcome {
            let program = program(unit, n);
            self.cache.bind(key(n), &program, &mut self.regs, &mut self.queue)
        }
    }

    // ── hits ──────────────────────────────────────────────────────────────

    #[test]
    fn rebinding_current_program_writes_nothing() {
        let mut rig = Rig::new();
        assert_eq!(rig.bind(ShaderUnit::Pixel, 7), BindOutcome::Miss(0));
        rig.sim.take_writes();
        rig.queue.clear();

        assert_eq!(rig.bind(ShaderUnit::Pixel, 7), BindOutcome::Hit(0));
        assert!(rig.sim.writes().is_empty());
        assert!(rig.queue.is_empty());
        assert_eq!(rig.cache.stats(ShaderUnit::Pixel).same_hits, 1);
    }

    #[test]
    fn hit_on_other_slot_only_queues_selection() {
        let mut rig = Rig::new();
        rig.bind(ShaderUnit::Vertex, 1);
        rig.bind(ShaderUnit::Vertex, 2);
        rig.sim.take_writes();
        rig.queue.clear();

        assert_eq!(rig.bind(ShaderUnit::Vertex, 1), BindOutcome::Hit(0));
        assert!(rig.sim.writes().is_empty());
        let addrs: Vec<_> = rig.queue.entries().iter().map(|e| e.addr).collect();
        assert_eq!(addrs, vec![FGVS_PC_RANGE, FGVS_CONFIG]);
        assert_eq!(rig.queue.entries()[0].value, 1 << 16);
        assert_eq!(rig.cache.stats(ShaderUnit::Vertex).cache_hits, 1);
    }

    // ── misses ────────────────────────────────────────────────────────────

    #[test]
    fn miss_uploads_into_the_slot_region() {
        let mut rig = Rig::new();
        rig.bind(ShaderUnit::Pixel, 1);
        rig.queue.clear();
        assert_eq!(rig.bind(ShaderUnit::Pixel, 2), BindOutcome::Miss(1));

        let slot_base = FGPS_INSTMEM + (64 * INSTRUCTION_WORDS * 4) as u32;
        assert_eq!(rig.sim.value(slot_base), Some(2));
        assert_eq!(rig.sim.value(slot_base + 4 * 7), Some(2));

        let sel: Vec<_> = rig.queue.entries().iter().map(|e| (e.addr, e.value)).collect();
        assert_eq!(
            sel,
            vec![
                (FGPS_EXE_MODE, 0),
                (FGPS_PC_START, 64),
                (FGPS_PC_END, 65),
                (FGPS_PC_COPY, 1),
                (FGPS_EXE_MODE, 1),
            ]
        );
    }

    #[test]
    fn eviction_is_round_robin_and_wraps() {
        let mut rig = Rig::new();
        for n in 0..VS_CACHE_SIZE as u32 {
            assert_eq!(rig.bind(ShaderUnit::Vertex, n), BindOutcome::Miss(n as usize));
        }
        assert_eq!(rig.cache.next_victim(ShaderUnit::Vertex), 0);

        assert_eq!(rig.bind(ShaderUnit::Vertex, 100), BindOutcome::Miss(0));
        assert_eq!(rig.cache.next_victim(ShaderUnit::Vertex), 1);
        assert_eq!(rig.cache.slots(ShaderUnit::Vertex)[0].occupant, Some(key(100)));

        // the evicted program now misses into the next slot
        assert_eq!(rig.bind(ShaderUnit::Vertex, 0), BindOutcome::Miss(1));
        assert_eq!(rig.sim.value(FGVS_INSTMEM + 128 * 16), Some(0));
    }

    #[test]
    fn units_are_independent() {
        let mut rig = Rig::new();
        rig.bind(ShaderUnit::Vertex, 5);
        assert_eq!(rig.bind(ShaderUnit::Pixel, 5), BindOutcome::Miss(0));
        assert_eq!(rig.cache.current(ShaderUnit::Vertex), Some(0));
        assert_eq!(rig.cache.current(ShaderUnit::Pixel), Some(0));
    }

    #[test]
    fn full_slot_program_leaves_the_neighbour_intact() {
        let mut rig = Rig::new();
        rig.bind(ShaderUnit::Pixel, 1);
        rig.bind(ShaderUnit::Pixel, 2);
        for n in 3..=PS_CACHE_SIZE as u32 {
            rig.bind(ShaderUnit::Pixel, n);
        }
        assert_eq!(rig.cache.next_victim(ShaderUnit::Pixel), 0);

        let span = ShaderUnit::Pixel.slot_span();
        let big = ShaderProgram::new(ShaderUnit::Pixel, vec![0xdd; span * INSTRUCTION_WORDS]).unwrap();
        let outcome = rig.cache.bind(key(100), &big, &mut rig.regs, &mut rig.queue);
        assert_eq!(outcome, BindOutcome::Miss(0));
        assert_eq!(rig.cache.slots(ShaderUnit::Pixel)[0].instruction_count, span);

        let slot1 = FGPS_INSTMEM + (span * INSTRUCTION_WORDS * 4) as u32;
        assert_eq!(rig.sim.value(slot1), Some(2));
        assert_eq!(rig.sim.value(slot1 - 4), Some(0xdd));
        assert!(rig.cache.contains(ShaderUnit::Pixel, key(2)));

        // one instruction more no longer forms a program
        let words = vec![0xdd; (span + 1) * INSTRUCTION_WORDS];
        assert!(ShaderProgram::new(ShaderUnit::Pixel, words).is_err());
    }

    // ── invalidation ──────────────────────────────────────────────────────

    #[test]
    fn invalidate_forces_a_miss() {
        let mut rig = Rig::new();
        rig.bind(ShaderUnit::Pixel, 3);
        rig.bind(ShaderUnit::Pixel, 4);
        rig.cache.invalidate();

        assert_eq!(rig.cache.current(ShaderUnit::Pixel), None);
        assert!(rig.cache.slots(ShaderUnit::Pixel).iter().all(|s| s.occupant.is_none()));
        // the victim pointer keeps advancing across invalidations
        assert_eq!(rig.bind(ShaderUnit::Pixel, 3), BindOutcome::Miss(2));
        assert_eq!(rig.cache.stats(ShaderUnit::Pixel).misses, 3);
    }
}
