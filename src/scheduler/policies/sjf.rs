/*
 * Shortest-Job-First Selection
 *
 * Both SJF variants share this selector; they differ only in the yield
 * decision (non-preemptive never yields, preemptive yields every tick so a
 * newly-ready shorter burst can take over).
 *
 * Selection scans the whole table. A slot whose tau is still the "no
 * prediction yet" sentinel wins immediately: new processes get first chance.
 * Otherwise the slot with the minimal estimated remaining time
 * (tau - running_time) wins, ties to the lowest index. The estimate can go
 * negative when a burst overran its prediction; that still counts as closest
 * to completion.
 *
 * The scan drops every slot lock before picking, so the winner is re-locked
 * and re-checked; if another CPU grabbed it in the meantime the whole scan
 * restarts. This busy rescan is deliberate: it keeps the policy lock out of
 * the scan entirely, and each lap is bounded by the table size.
 */

use crate::scheduler::process::{ProcState, ProcTable};
use crate::scheduler::types::{Dispatch, FIXED_ONE};
use crate::scheduler::{Sched, MAX_PROCS};

/// Scan for the entry closest to finishing its predicted burst.
pub(crate) fn select<'t>(sched: &Sched, table: &'t ProcTable) -> Option<Dispatch<'t>> {
    loop {
        let mut best: Option<(usize, i64)> = None;

        for idx in 0..MAX_PROCS {
            let entry = table.slot(idx).lock();
            if entry.state != ProcState::Runnable {
                continue;
            }

            // Never measured: return immediately, lock still held.
            if entry.tau == 0 {
                sched.take_ready();
                log::trace!("sjf: selected unmeasured slot {} pid {}", idx, entry.pid);
                return Some(Dispatch { slot: idx, entry });
            }

            let remaining = entry.remaining_estimate();
            if best.is_none_or(|(_, min)| remaining < min) {
                best = Some((idx, remaining));
            }
        }

        // Zero RUNNABLE slots seen this lap
        let (idx, remaining) = best?;

        // The candidate was unlocked after inspection; re-check that it is
        // still RUNNABLE, otherwise another CPU won the race and we rescan.
        let entry = table.slot(idx).lock();
        if entry.state == ProcState::Runnable {
            sched.take_ready();
            log::trace!(
                "sjf: selected slot {} pid {} remaining {}",
                idx,
                entry.pid,
                remaining
            );
            return Some(Dispatch { slot: idx, entry });
        }
    }
}

/// Fold a completed burst into the prediction for the next one.
///
/// Fixed-point exponential smoothing:
/// `tau_new = (alpha * running_time + (FIXED_ONE - alpha) * tau_old) / FIXED_ONE`,
/// floored at 1 because 0 is reserved as the "no prediction" sentinel. The
/// very first completed burst has no history to smooth against, so the
/// prediction is just the burst length itself (again floored at 1).
pub(crate) fn predict_next_burst(alpha: u64, running_time: u64, tau_old: u64) -> u64 {
    if tau_old == 0 {
        return running_time.max(1);
    }
    let smoothed = (alpha * running_time + (FIXED_ONE - alpha) * tau_old) / FIXED_ONE;
    smoothed.max(1)
}

/// Non-preemptive SJF lets a selected burst run to completion or voluntary
/// block; the preemptive variant re-evaluates selection on every tick.
pub(crate) fn should_yield(preemptive: bool) -> bool {
    preemptive
}
