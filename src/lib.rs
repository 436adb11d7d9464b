#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::cargo, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Sentinel magnitudes, node priorities and frequency conversions.
pub mod constants;
/// Shared scalar aliases and phasor helpers.
pub mod math;
/// Solver tuning knobs (clamping sentinels, singularity threshold, source model).
pub mod config;
/// Circuit components, node bookkeeping and the nodal solver.
pub mod circuits;
/// Frequency sweep builders and frequency-response post-processing.
pub mod sweep;
/// Error and warning types returned by the solver.
pub mod errors;

/// Common exports for downstream crates.
pub mod prelude;
