/*
 * Round-Robin Selection
 *
 * Circular scan over the process table starting at the persistent cursor,
 * at most one full lap. The first RUNNABLE slot wins; the cursor advances to
 * just past it so the next selection (from any CPU) continues the rotation.
 *
 * No revalidation is needed: the slot lock is acquired before the state
 * check and held through the return, so there is no window for another CPU
 * to steal the entry.
 */

use crate::scheduler::process::{ProcEntry, ProcState, ProcTable};
use crate::scheduler::types::Dispatch;
use crate::scheduler::{Sched, MAX_PROCS};

/// One circular lap from the cursor; first RUNNABLE slot wins.
pub(crate) fn select<'t>(sched: &Sched, table: &'t ProcTable) -> Option<Dispatch<'t>> {
    let mut cursor = sched.cursor_snapshot();

    for _ in 0..MAX_PROCS {
        let entry = table.slot(cursor).lock();
        if entry.state == ProcState::Runnable {
            // Commit while the winner's lock is held. Cursor and ready count
            // are atomics, so the policy lock stays untouched here.
            sched.advance_cursor(cursor);
            sched.take_ready();
            log::trace!("rr: selected slot {} pid {}", cursor, entry.pid);
            return Some(Dispatch { slot: cursor, entry });
        }
        drop(entry);
        cursor = (cursor + 1) % MAX_PROCS;
    }

    // Full lap without a RUNNABLE slot
    None
}

/// The fixed slice expires whenever the burst length reaches a multiple of
/// the configured quantum.
pub(crate) fn should_yield(entry: &ProcEntry, rr_quantum: u64) -> bool {
    entry.running_time % rr_quantum == 0
}
