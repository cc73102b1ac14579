/*
 * Process Table
 *
 * This module implements the scheduler's view of the process table: a fixed
 * array of independently lockable slots. The process subsystem owns slot
 * allocation and the non-scheduling fields of a process; the scheduler only
 * ever reads a slot's state and mutates the burst-accounting fields, always
 * under the slot's own lock.
 *
 * Why per-slot locks:
 * - Selection scans inspect one slot at a time without serializing all CPUs
 * - A successful get() hands the held slot lock to the caller, which releases
 *   it once the context switch completes; no other CPU can steal the entry
 *   in between
 */

use spin::Mutex;

use super::MAX_PROCS;

/// Process lifecycle state
///
/// The scheduler only ever selects slots in `Runnable`. All other transitions
/// belong to the process subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    /// Slot is free
    Unused,
    /// Slot is allocated but not yet schedulable
    Used,
    /// Waiting on a channel (blocked)
    Sleeping,
    /// Ready to run, eligible for selection
    Runnable,
    /// Currently executing on some CPU
    Running,
    /// Exited, waiting to be reaped
    Zombie,
}

/// One process-table slot, scheduling fields only
///
/// The fields form the per-process half of the scheduler state: burst
/// accounting for SJF prediction and the fair-share data CFS consumes.
/// They are created zeroed at slot allocation and cleared at reclamation;
/// while `state == Runnable` their values are owned by the scheduler's
/// enqueue/select operations.
#[derive(Debug, Clone, Copy)]
pub struct ProcEntry {
    /// Process identity, for diagnostics
    pub pid: usize,

    /// Lifecycle state
    pub state: ProcState,

    /// Ticks accumulated during the current CPU burst
    pub running_time: u64,

    /// Predicted length of the next CPU burst (SJF). 0 is a sentinel meaning
    /// "no prediction yet"; once set, tau >= 1
    pub tau: u64,

    /// Dynamically computed fair-share time slice (CFS), always >= 1
    pub quantum: u64,

    /// Tick at which this slot became ready
    pub time_entered: u64,

    /// True iff the previous CPU burst actually completed (the process
    /// blocked or exited) rather than being cut short by preemption.
    /// Governs whether burst accounting is updated on re-enqueue.
    pub from_suspension: bool,
}

impl ProcEntry {
    /// An empty slot. `quantum` starts at 1 so the CFS oracle's modulo is
    /// well-defined even before the first CFS selection computes a real slice.
    pub const fn new() -> Self {
        Self {
            pid: 0,
            state: ProcState::Unused,
            running_time: 0,
            tau: 0,
            quantum: 1,
            time_entered: 0,
            from_suspension: false,
        }
    }

    /// Initialize the scheduling fields for a freshly allocated slot.
    ///
    /// Called by the process subsystem from its allocation path. The slot
    /// comes out in `Used`; the caller transitions it to `Runnable` when the
    /// process is ready to be enqueued.
    pub fn reset(&mut self, pid: usize) {
        *self = Self::new();
        self.pid = pid;
        self.state = ProcState::Used;
    }

    /// Clear the scheduling fields when a slot is reclaimed.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// SJF's estimate of how far this entry is from finishing its burst.
    ///
    /// Negative when the burst overran its prediction, which selection still
    /// treats as "closest to completion".
    pub fn remaining_estimate(&self) -> i64 {
        self.tau as i64 - self.running_time as i64
    }
}

impl Default for ProcEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// The shared process table: MAX_PROCS independently lockable slots
///
/// Shared by reference between all CPUs. Const-constructible so the kernel
/// can place it in a static.
pub struct ProcTable {
    slots: [Mutex<ProcEntry>; MAX_PROCS],
}

impl ProcTable {
    /// Create a table of empty slots.
    pub const fn new() -> Self {
        Self {
            slots: [const { Mutex::new(ProcEntry::new()) }; MAX_PROCS],
        }
    }

    /// Number of slots in the table.
    pub const fn capacity(&self) -> usize {
        MAX_PROCS
    }

    /// Access one slot's lock.
    ///
    /// # Panics
    /// Panics if `idx >= MAX_PROCS`; slot indices are handed out by the
    /// process subsystem and are trusted to be in range.
    pub fn slot(&self, idx: usize) -> &Mutex<ProcEntry> {
        &self.slots[idx]
    }

    /// Iterate over all slot locks in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Mutex<ProcEntry>> {
        self.slots.iter()
    }
}

impl Default for ProcTable {
    fn default() -> Self {
        Self::new()
    }
}
