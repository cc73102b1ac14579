/*
 * Scheduler Mechanism Layer
 *
 * This module implements Sched, the process-wide scheduling singleton. It
 * owns the policy configuration (active algorithm, SJF alpha, round-robin
 * quantum) behind one coarse spin lock, plus two advisory atomics: the
 * round-robin cursor and the ready count.
 *
 * The four operations the rest of the kernel calls:
 *
 * - get():          dispatcher loop, pick the next RUNNABLE entry
 * - put():          re-enqueue an entry that transitioned to RUNNABLE
 * - should_yield(): trap handler, per-tick preemption decision
 * - change_sched(): privileged hot-switch of the active discipline
 *
 * LOCK DISCIPLINE:
 * ===============
 *
 * Every operation snapshots what it needs from the policy configuration,
 * releases the lock, and only then touches slot locks. The policy lock is
 * never acquired while a slot lock is held; that ordering rule is the
 * deadlock-avoidance invariant for the whole core and must hold for every
 * operation added here. The cursor and the ready count are atomics so that
 * selection can commit a winner while still holding the winner's slot lock.
 *
 * The ready count is advisory: incremented on enqueue, decremented once per
 * successful selection (saturating). Concurrent CPUs can make it lag behind
 * the table, which only ever costs CFS an extra rescan or a conservative
 * slice; correctness always comes from slot state checked under slot locks.
 */

pub mod policies;
pub mod process;
pub mod request;
pub mod types;

use core::sync::atomic::{AtomicUsize, Ordering};

use spin::Mutex;

pub use process::{ProcEntry, ProcState, ProcTable};
pub use request::SchedRequestError;
pub use types::{
    Dispatch, PolicyConfig, SchedAlg, DEFAULT_ALPHA, DEFAULT_RR_QUANTUM, FIXED_ONE,
};

/// Number of slots in the process table.
pub const MAX_PROCS: usize = 64;

/// The scheduling core singleton.
///
/// Constructed once at boot by the kernel's scheduling subsystem and shared
/// by reference with every CPU's dispatcher loop. Const-constructible so the
/// kernel can place it in a static next to the process table.
pub struct Sched {
    /// Policy configuration, the one coarse lock of the core
    policy: Mutex<PolicyConfig>,

    /// Approximate count of RUNNABLE slots; advisory only
    ready_count: AtomicUsize,

    /// Round-robin scan start, persists across calls for circular fairness
    rr_cursor: AtomicUsize,
}

impl Sched {
    /// A core with boot defaults: round robin, one-tick slice, alpha 0.5.
    pub const fn new() -> Self {
        Self {
            policy: Mutex::new(PolicyConfig::new()),
            ready_count: AtomicUsize::new(0),
            rr_cursor: AtomicUsize::new(0),
        }
    }

    /// Pick the next entry to run, or None if nothing is RUNNABLE.
    ///
    /// The winner is returned with its slot lock held; the caller releases it
    /// (by dropping the Dispatch) once the context switch completes. The
    /// active algorithm is read under the policy lock, which is released
    /// before any table scanning starts.
    pub fn get<'t>(&self, table: &'t ProcTable, now: u64) -> Option<Dispatch<'t>> {
        let active = self.policy.lock().active;

        match active {
            SchedAlg::RoundRobin => policies::round_robin::select(self, table),
            SchedAlg::NonPreemptiveSjf | SchedAlg::PreemptiveSjf => {
                policies::sjf::select(self, table)
            }
            SchedAlg::Cfs => policies::cfs::select(self, table, now),
        }
    }

    /// Re-enqueue a slot that transitioned into RUNNABLE.
    ///
    /// Always records the entry time and bumps the ready count. If the slot's
    /// previous burst actually completed (`from_suspension`), the burst length
    /// is folded into the SJF prediction and the burst counter resets; a slot
    /// merely re-queued mid-burst keeps its accounting untouched.
    ///
    /// The prediction update runs regardless of the active algorithm, so
    /// entries accumulate burst data continuously and an algorithm switch
    /// needs no warm-up.
    pub fn put(&self, table: &ProcTable, slot: usize, now: u64) {
        // Policy lock first, released before the slot lock is taken.
        let alpha = self.policy.lock().alpha;
        self.ready_count.fetch_add(1, Ordering::AcqRel);

        let mut entry = table.slot(slot).lock();
        entry.time_entered = now;
        if entry.from_suspension {
            entry.from_suspension = false;
            entry.tau = policies::sjf::predict_next_burst(alpha, entry.running_time, entry.tau);
            entry.running_time = 0;
        }
    }

    /// Per-tick preemption decision for the entry running in `slot`.
    ///
    /// | algorithm          | yields when                         |
    /// |--------------------|-------------------------------------|
    /// | non-preemptive SJF | never                               |
    /// | preemptive SJF     | every tick                          |
    /// | round robin        | running_time % rr_quantum == 0      |
    /// | CFS                | running_time % entry's quantum == 0 |
    pub fn should_yield(&self, table: &ProcTable, slot: usize) -> bool {
        let (active, rr_quantum) = {
            let cfg = self.policy.lock();
            (cfg.active, cfg.rr_quantum)
        };

        let entry = table.slot(slot).lock();
        match active {
            SchedAlg::NonPreemptiveSjf => policies::sjf::should_yield(false),
            SchedAlg::PreemptiveSjf => policies::sjf::should_yield(true),
            SchedAlg::RoundRobin => policies::round_robin::should_yield(&entry, rr_quantum),
            SchedAlg::Cfs => policies::cfs::should_yield(&entry),
        }
    }

    /// Policy Controller: atomically switch the active algorithm.
    ///
    /// `param` is reinterpreted per algorithm: the round-robin quantum
    /// (caller ensures >= 1), the SJF alpha (caller ensures <= FIXED_ONE),
    /// or ignored for CFS. Untrusted input goes through [`Sched::handle_request`]
    /// instead. No table slot is touched: entries keep accumulating burst and
    /// fairness data continuously, so a switch takes effect lazily at the
    /// next selection.
    pub fn change_sched(&self, alg: SchedAlg, param: u64) {
        let mut cfg = self.policy.lock();
        cfg.active = alg;
        match alg {
            SchedAlg::RoundRobin => cfg.rr_quantum = param,
            SchedAlg::NonPreemptiveSjf | SchedAlg::PreemptiveSjf => cfg.alpha = param,
            SchedAlg::Cfs => {}
        }
        log::info!(
            "SWITCH: scheduler: {}, alpha = {}, rr_quantum = {}",
            alg.name(),
            cfg.alpha,
            cfg.rr_quantum
        );
    }

    /// Validated entry point for the change-scheduler system call.
    ///
    /// Decodes the raw (selector, param) pair; on any validation failure the
    /// core state is left untouched.
    pub fn handle_request(&self, selector: u64, param: i64) -> Result<(), SchedRequestError> {
        let (alg, param) = request::decode(selector, param)?;
        self.change_sched(alg, param);
        Ok(())
    }

    /// Currently active algorithm.
    pub fn active_algorithm(&self) -> SchedAlg {
        self.policy.lock().active
    }

    /// Snapshot of the full policy configuration.
    pub fn config(&self) -> PolicyConfig {
        *self.policy.lock()
    }

    /// Advisory count of RUNNABLE slots.
    pub fn ready_count(&self) -> usize {
        self.ready_count.load(Ordering::Acquire)
    }

    // ========================================================================
    // POLICY-FACING INTERNALS
    // ========================================================================

    /// Where the next round-robin lap starts.
    pub(crate) fn cursor_snapshot(&self) -> usize {
        self.rr_cursor.load(Ordering::Acquire)
    }

    /// Advance the cursor to just past a selected slot, wrapping at the end
    /// of the table.
    pub(crate) fn advance_cursor(&self, past: usize) {
        self.rr_cursor.store((past + 1) % MAX_PROCS, Ordering::Release);
    }

    /// Consume one ready-count slot, returning the pre-decrement value.
    /// Saturates at zero since the count is advisory.
    pub(crate) fn take_ready(&self) -> usize {
        self.ready_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                Some(count.saturating_sub(1))
            })
            .unwrap_or(0)
    }

    /// Advisory ready count, CFS fast-path check.
    pub(crate) fn ready_now(&self) -> usize {
        self.ready_count.load(Ordering::Acquire)
    }
}

impl Default for Sched {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enqueue_runnable(sched: &Sched, table: &ProcTable, slot: usize, now: u64) {
        {
            let mut entry = table.slot(slot).lock();
            entry.reset(slot);
            entry.state = ProcState::Runnable;
        }
        sched.put(table, slot, now);
    }

    #[test]
    fn test_burst_reset_law_on_completed_burst() {
        let sched = Sched::new();
        let table = ProcTable::new();
        {
            let mut entry = table.slot(0).lock();
            entry.reset(0);
            entry.state = ProcState::Runnable;
            entry.running_time = 20;
            entry.tau = 10;
            entry.from_suspension = true;
        }

        sched.put(&table, 0, 7);

        let entry = table.slot(0).lock();
        assert_eq!(entry.running_time, 0);
        // Smoothing with the default alpha 0.5: (20 + 10) / 2 = 15
        assert_eq!(entry.tau, 15);
        assert!(entry.tau >= 1);
        assert!(!entry.from_suspension);
        assert_eq!(entry.time_entered, 7);
        assert_eq!(sched.ready_count(), 1);
    }

    #[test]
    fn test_put_mid_burst_leaves_accounting_untouched() {
        let sched = Sched::new();
        let table = ProcTable::new();
        {
            let mut entry = table.slot(0).lock();
            entry.reset(0);
            entry.state = ProcState::Runnable;
            entry.running_time = 13;
            entry.tau = 4;
            entry.from_suspension = false;
        }

        sched.put(&table, 0, 99);

        let entry = table.slot(0).lock();
        assert_eq!(entry.running_time, 13);
        assert_eq!(entry.tau, 4);
        assert_eq!(entry.time_entered, 99);
    }

    #[test]
    fn test_first_burst_sets_tau_from_burst_length() {
        let sched = Sched::new();
        let table = ProcTable::new();
        {
            let mut entry = table.slot(0).lock();
            entry.reset(0);
            entry.running_time = 10;
            entry.from_suspension = true;
        }
        sched.put(&table, 0, 0);
        assert_eq!(table.slot(0).lock().tau, 10);

        // A zero-length first burst clamps to the minimum prediction
        {
            let mut entry = table.slot(1).lock();
            entry.reset(1);
            entry.from_suspension = true;
        }
        sched.put(&table, 1, 0);
        assert_eq!(table.slot(1).lock().tau, 1);
    }

    #[test]
    fn test_oracle_determinism_per_algorithm() {
        let sched = Sched::new();
        let table = ProcTable::new();
        {
            let mut entry = table.slot(0).lock();
            entry.reset(0);
            entry.state = ProcState::Running;
            entry.quantum = 4;
        }

        sched.change_sched(SchedAlg::NonPreemptiveSjf, DEFAULT_ALPHA);
        for tick in 0..6u64 {
            table.slot(0).lock().running_time = tick;
            assert!(!sched.should_yield(&table, 0));
        }

        sched.change_sched(SchedAlg::PreemptiveSjf, DEFAULT_ALPHA);
        for tick in 0..6u64 {
            table.slot(0).lock().running_time = tick;
            assert!(sched.should_yield(&table, 0));
        }

        sched.change_sched(SchedAlg::RoundRobin, 3);
        for tick in 0..9u64 {
            table.slot(0).lock().running_time = tick;
            assert_eq!(sched.should_yield(&table, 0), tick % 3 == 0);
        }

        sched.change_sched(SchedAlg::Cfs, 0);
        for tick in 0..9u64 {
            table.slot(0).lock().running_time = tick;
            assert_eq!(sched.should_yield(&table, 0), tick % 4 == 0);
        }
    }

    #[test]
    fn test_change_sched_reinterprets_param() {
        let sched = Sched::new();

        sched.change_sched(SchedAlg::RoundRobin, 7);
        let cfg = sched.config();
        assert_eq!(cfg.active, SchedAlg::RoundRobin);
        assert_eq!(cfg.rr_quantum, 7);

        sched.change_sched(SchedAlg::NonPreemptiveSjf, 30_000);
        let cfg = sched.config();
        assert_eq!(cfg.active, SchedAlg::NonPreemptiveSjf);
        assert_eq!(cfg.alpha, 30_000);
        // The quantum is untouched by an SJF switch
        assert_eq!(cfg.rr_quantum, 7);

        sched.change_sched(SchedAlg::Cfs, 999_999);
        let cfg = sched.config();
        assert_eq!(cfg.active, SchedAlg::Cfs);
        // CFS ignores the parameter entirely
        assert_eq!(cfg.alpha, 30_000);
        assert_eq!(cfg.rr_quantum, 7);
    }

    #[test]
    fn test_rejected_request_leaves_state_unchanged() {
        let sched = Sched::new();
        sched.change_sched(SchedAlg::Cfs, 0);

        assert_eq!(
            sched.handle_request(0, 0),
            Err(SchedRequestError::InvalidQuantum)
        );
        assert_eq!(
            sched.handle_request(1, 100_001),
            Err(SchedRequestError::InvalidAlpha)
        );
        assert_eq!(
            sched.handle_request(9, 1),
            Err(SchedRequestError::UnknownAlgorithm)
        );
        assert_eq!(sched.active_algorithm(), SchedAlg::Cfs);

        assert_eq!(sched.handle_request(0, 2), Ok(()));
        assert_eq!(sched.active_algorithm(), SchedAlg::RoundRobin);
        assert_eq!(sched.config().rr_quantum, 2);
    }

    #[test]
    fn test_no_candidate_under_every_algorithm() {
        let sched = Sched::new();
        let table = ProcTable::new();

        for (selector, param) in [(0, 1), (1, 50_000), (2, 50_000), (3, 0)] {
            sched.handle_request(selector, param).unwrap();
            assert!(sched.get(&table, 0).is_none());
        }
    }

    #[test]
    fn test_switch_is_visible_lazily() {
        let sched = Sched::new();
        let table = ProcTable::new();
        enqueue_runnable(&sched, &table, 0, 0);
        {
            let mut entry = table.slot(0).lock();
            entry.tau = 11;
            entry.running_time = 2;
        }

        // Switching disciplines touches no slot fields
        sched.change_sched(SchedAlg::PreemptiveSjf, 20_000);
        let entry = table.slot(0).lock();
        assert_eq!(entry.tau, 11);
        assert_eq!(entry.running_time, 2);
        drop(entry);

        // The switch only shows up at the next selection
        let picked = sched.get(&table, 0).unwrap();
        assert_eq!(picked.slot, 0);
    }

    #[test]
    fn test_get_dispatches_per_algorithm() {
        let sched = Sched::new();
        let table = ProcTable::new();
        enqueue_runnable(&sched, &table, 3, 0);
        enqueue_runnable(&sched, &table, 5, 0);
        {
            // Slot 5 is predicted much shorter than slot 3
            table.slot(3).lock().tau = 50;
            table.slot(5).lock().tau = 2;
        }

        // Round robin walks the table in index order
        let picked = sched.get(&table, 0).unwrap();
        assert_eq!(picked.slot, 3);
        drop(picked);

        // SJF prefers the shorter prediction regardless of position
        sched.change_sched(SchedAlg::NonPreemptiveSjf, DEFAULT_ALPHA);
        let picked = sched.get(&table, 0).unwrap();
        assert_eq!(picked.slot, 5);
    }

    #[test]
    fn test_take_ready_saturates_at_zero() {
        let sched = Sched::new();
        assert_eq!(sched.take_ready(), 0);
        assert_eq!(sched.ready_count(), 0);
    }

    #[test]
    fn test_concurrent_selection_yields_distinct_slots() {
        use std::sync::Mutex as StdMutex;

        let sched = Sched::new();
        let table = ProcTable::new();
        for slot in 0..8 {
            enqueue_runnable(&sched, &table, slot, 0);
        }

        // Four "CPUs" select in parallel; each marks its winner RUNNING
        // before releasing the slot lock, like the dispatcher does after the
        // context switch completes.
        let selected = StdMutex::new(Vec::new());
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let mut picked = sched.get(&table, 0).unwrap();
                    picked.entry.state = ProcState::Running;
                    selected.lock().unwrap().push(picked.slot);
                });
            }
        });

        let mut slots = selected.into_inner().unwrap();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots.len(), 4);
    }
}
