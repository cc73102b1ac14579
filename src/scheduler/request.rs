/*
 * Privileged Request Decoding
 *
 * The change-scheduler system call reaches the kernel as a raw
 * (selector, param) integer pair. This module validates that pair before any
 * core state is touched: an unknown selector or an out-of-range parameter
 * fails here and the active algorithm is left unchanged.
 *
 * Selector table:
 *   0 -> ROUND_ROBIN        param is the quantum in ticks, >= 1
 *   1 -> NON_PREEMPTIVE_SJF param is alpha, in [0, FIXED_ONE]
 *   2 -> PREEMPTIVE_SJF     param is alpha, in [0, FIXED_ONE]
 *   3 -> CFS                param ignored
 */

use super::types::{SchedAlg, FIXED_ONE};

/// Why a change-scheduler request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedRequestError {
    /// Selector does not name one of the four algorithms
    UnknownAlgorithm,
    /// Round-robin quantum below 1
    InvalidQuantum,
    /// SJF alpha outside [0, FIXED_ONE]
    InvalidAlpha,
}

impl core::fmt::Display for SchedRequestError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SchedRequestError::UnknownAlgorithm => write!(f, "unknown algorithm selector"),
            SchedRequestError::InvalidQuantum => write!(f, "round-robin quantum must be >= 1"),
            SchedRequestError::InvalidAlpha => {
                write!(f, "alpha must be in [0, {}]", FIXED_ONE)
            }
        }
    }
}

/// Decode and validate a raw request into an algorithm and its parameter.
///
/// `param` arrives as a signed integer straight from the syscall argument;
/// range checks happen here so the core only ever sees valid values.
pub fn decode(selector: u64, param: i64) -> Result<(SchedAlg, u64), SchedRequestError> {
    match selector {
        0 => {
            if param < 1 {
                return Err(SchedRequestError::InvalidQuantum);
            }
            Ok((SchedAlg::RoundRobin, param as u64))
        }
        1 | 2 => {
            if param < 0 || param as u64 > FIXED_ONE {
                return Err(SchedRequestError::InvalidAlpha);
            }
            let alg = if selector == 1 {
                SchedAlg::NonPreemptiveSjf
            } else {
                SchedAlg::PreemptiveSjf
            };
            Ok((alg, param as u64))
        }
        3 => Ok((SchedAlg::Cfs, 0)),
        _ => Err(SchedRequestError::UnknownAlgorithm),
    }
}
