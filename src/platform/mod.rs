//! Native adapters. Everything outside this module is platform-neutral.

#[cfg(windows)]
pub mod windows;
