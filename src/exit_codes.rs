//! Process exit codes of the `mbutane` binary.
//!
//! - `SUCCESS` (0): the output file was written, or help/version was shown.
//! - `ERROR` (1): invalid usage or any failure while composing or translating.
//! - `INTERRUPTED` (130): the run was interrupted with Ctrl-C.

pub const SUCCESS: u8 = 0;
pub const ERROR: u8 = 1;
pub const INTERRUPTED: u8 = 130;
