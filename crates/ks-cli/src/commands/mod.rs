//! CLI command implementations

pub(crate) mod check;
pub(crate) mod common;
pub(crate) mod process;
pub(crate) mod sheets;
pub(crate) mod sync;
