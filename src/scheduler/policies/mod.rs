/*
 * Selection Policies
 *
 * One module per discipline. Each module exposes a `select` over the shared
 * process table and its variant's yield decision; the mechanism layer in
 * `scheduler::Sched` dispatches to them based on the active algorithm.
 */

pub(crate) mod cfs;
pub(crate) mod round_robin;
pub(crate) mod sjf;
