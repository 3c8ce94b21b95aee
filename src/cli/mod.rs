//! Command-line front ends: `cursor-restore` and `cursor-inspect`.

pub mod inspect;
pub mod logging;
pub mod restore;
