/*
 * Completely-Fair-Share Selection
 *
 * The least-served RUNNABLE slot wins: a slot that has not run at all this
 * cycle (running_time == 0) is taken on sight, otherwise the minimum
 * running_time across the table is tracked, ties to the lowest index.
 *
 * On every successful return the winner's quantum is recomputed as a fair
 * slice proportional to how long it waited, divided by the current
 * contention:
 *
 *   quantum = max(1, (now - time_entered) / ready_count)
 *
 * The ready count is advisory; a count of zero short-circuits the scan, and
 * the tracked-minimum path uses the same revalidate-and-restart loop as SJF
 * to tolerate a concurrent CPU stealing the candidate.
 */

use crate::scheduler::process::{ProcEntry, ProcState, ProcTable};
use crate::scheduler::types::Dispatch;
use crate::scheduler::{Sched, MAX_PROCS};

/// Scan for the least-served entry and hand it a freshly computed slice.
pub(crate) fn select<'t>(sched: &Sched, table: &'t ProcTable, now: u64) -> Option<Dispatch<'t>> {
    loop {
        // Fast path: nothing enqueued since the last drain.
        if sched.ready_now() == 0 {
            return None;
        }

        let mut best: Option<(usize, u64)> = None;

        for idx in 0..MAX_PROCS {
            let mut entry = table.slot(idx).lock();
            if entry.state != ProcState::Runnable {
                continue;
            }

            // 0 is the least possible running_time; no need to look further.
            if entry.running_time == 0 {
                refresh_quantum(sched, &mut entry, now);
                log::trace!(
                    "cfs: selected fresh slot {} pid {} quantum {}",
                    idx,
                    entry.pid,
                    entry.quantum
                );
                return Some(Dispatch { slot: idx, entry });
            }

            if best.is_none_or(|(_, min)| entry.running_time < min) {
                best = Some((idx, entry.running_time));
            }
        }

        let (idx, _) = best?;

        // Same optimistic double-check as SJF: the candidate was unlocked
        // after inspection, so confirm it is still RUNNABLE or rescan.
        let mut entry = table.slot(idx).lock();
        if entry.state == ProcState::Runnable {
            refresh_quantum(sched, &mut entry, now);
            log::trace!(
                "cfs: selected slot {} pid {} quantum {}",
                idx,
                entry.pid,
                entry.quantum
            );
            return Some(Dispatch { slot: idx, entry });
        }
    }
}

/// Recompute the winner's fair slice and consume one ready-count slot.
///
/// Contention is the pre-decrement count, floored at 1 since the count is
/// only advisory and may lag behind the table.
fn refresh_quantum(sched: &Sched, entry: &mut ProcEntry, now: u64) {
    let contenders = sched.take_ready().max(1) as u64;
    let waited = now.saturating_sub(entry.time_entered);
    entry.quantum = (waited / contenders).max(1);
}

/// The dynamic slice expires whenever the burst length reaches a multiple of
/// the slot's own quantum.
pub(crate) fn should_yield(entry: &ProcEntry) -> bool {
    entry.running_time % entry.quantum == 0
}
