/*
 * Scheduler Type Definitions
 *
 * Core types shared by the mechanism layer and the selection policies:
 * the closed algorithm sum type, the policy configuration guarded by the
 * coarse scheduler lock, and the Dispatch handle a successful selection
 * returns.
 */

use spin::MutexGuard;

use super::process::ProcEntry;

/// Fixed-point scale: this integer value represents 1.0.
///
/// The SJF smoothing weight `alpha` is an integer in `[0, FIXED_ONE]` so the
/// exponential average is bit-reproducible; no floating point anywhere.
pub const FIXED_ONE: u64 = 100_000;

/// Default SJF smoothing weight (0.5 in fixed point).
pub const DEFAULT_ALPHA: u64 = 50_000;

/// Default round-robin time slice in ticks.
pub const DEFAULT_RR_QUANTUM: u64 = 1;

/// The four scheduling disciplines.
///
/// A closed sum type: the mechanism layer dispatches selection and the yield
/// decision over these variants. Adding a fifth algorithm means adding one
/// variant, one policy module and the two match arms that route to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedAlg {
    /// Circular scan from a persistent cursor, fixed time slice
    RoundRobin,
    /// Shortest-job-first; a selected burst runs to completion
    NonPreemptiveSjf,
    /// Shortest-job-first, re-evaluated on every tick
    PreemptiveSjf,
    /// Completely-fair-share: least-served entry wins, dynamic slice
    Cfs,
}

impl SchedAlg {
    /// Algorithm name as it appears in the switch diagnostic.
    pub fn name(self) -> &'static str {
        match self {
            SchedAlg::RoundRobin => "ROUND_ROBIN",
            SchedAlg::NonPreemptiveSjf => "NON_PREEMPTIVE_SJF",
            SchedAlg::PreemptiveSjf => "PREEMPTIVE_SJF",
            SchedAlg::Cfs => "CFS",
        }
    }
}

/// Runtime policy configuration, guarded by the coarse scheduler lock.
///
/// The Policy Controller (`change_sched`) is the only writer. Every field is
/// a short Copy value; the lock is held only to snapshot or update them,
/// never across a table scan.
#[derive(Debug, Clone, Copy)]
pub struct PolicyConfig {
    /// Currently active discipline
    pub active: SchedAlg,

    /// SJF smoothing weight in `[0, FIXED_ONE]`
    pub alpha: u64,

    /// Round-robin time slice in ticks, >= 1
    pub rr_quantum: u64,
}

impl PolicyConfig {
    /// Boot-time defaults: round robin with a one-tick slice.
    pub const fn new() -> Self {
        Self {
            active: SchedAlg::RoundRobin,
            alpha: DEFAULT_ALPHA,
            rr_quantum: DEFAULT_RR_QUANTUM,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A successful selection: the chosen slot with its lock still held.
///
/// Ownership of "this entry is mid-transition, do not touch" transfers to the
/// caller; dropping the Dispatch releases the slot lock, so the caller holds
/// on to it until the context switch completes.
pub struct Dispatch<'t> {
    /// Table index of the chosen slot
    pub slot: usize,

    /// The chosen entry, lock held
    pub entry: MutexGuard<'t, ProcEntry>,
}
