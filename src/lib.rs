/*
 * Marlin Scheduler Core
 *
 * This crate implements the CPU scheduling core of the Marlin multiprocessor
 * kernel. It decides, for each CPU, which ready process runs next, supports
 * hot-switching among four scheduling disciplines at runtime, and decides when
 * a running process must be preempted.
 *
 * SCOPE:
 * ======
 *
 * The crate consumes a process table maintained by the process subsystem and
 * exposes four operations to the dispatcher/trap layer:
 *
 * - get():          pick the next RUNNABLE entry (returned with its lock held)
 * - put():          re-enqueue an entry that became RUNNABLE
 * - should_yield(): per-tick preemption decision for the running entry
 * - change_sched(): hot-switch the active algorithm and its parameter
 *
 * Process creation/destruction, memory management, trap delivery and the
 * context-switch machinery itself live in the surrounding kernel; this crate
 * only ever mutates the scheduling fields of a table slot under that slot's
 * own lock.
 *
 * CONCURRENCY:
 * ===========
 *
 * One dispatcher loop per CPU, all contending on the same ProcTable and the
 * same Sched singleton. The policy configuration sits behind a single coarse
 * spin lock that is held only for short reads/writes and never across a table
 * scan. Each table slot carries its own spin lock.
 *
 * Lock ordering invariant: the policy lock is NEVER acquired while a slot
 * lock is held. Every operation snapshots the configuration first, releases,
 * and only then touches slot locks. The advisory ready count and the
 * round-robin cursor are atomics precisely so that selection can commit a
 * winner while holding that winner's slot lock without touching the policy
 * lock.
 *
 * The crate is no_std; tests build with std so they can drive the selection
 * path from real threads.
 */

#![cfg_attr(not(test), no_std)]

pub mod scheduler;

pub use scheduler::{
    Dispatch, PolicyConfig, ProcEntry, ProcState, ProcTable, Sched, SchedAlg, SchedRequestError,
    DEFAULT_ALPHA, DEFAULT_RR_QUANTUM, FIXED_ONE, MAX_PROCS,
};
