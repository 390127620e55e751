// src/proc/mod.rs

//! Process lifecycle for the supervised tool.
//!
//! This module covers:
//! - spawning the child into its own process group ([`spawn_group`])
//! - the merged, permissively-decoded line stream ([`merged_lines`])
//! - platform group signaling (one interface, unix/windows implementations
//!   picked at build time)
//! - two-phase termination escalation ([`terminate_group`])

mod reader;
mod spawn;
mod terminate;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub(crate) use unix::{signal_group_interrupt, signal_group_kill};
#[cfg(windows)]
pub(crate) use windows::{signal_group_interrupt, signal_group_kill};

pub use reader::merged_lines;
pub use spawn::{ChildProcess, spawn_group};
pub use terminate::{DEFAULT_GRACE_PERIOD, terminate_group};
