//! Data structures representing caption memory and decoded codes.

/// Cell-level storage: colors, packed attributes, cells.
pub mod cell;

/// The 15x32 caption memory grid and its cursor operations.
pub mod memory;

/// Preamble Address Code decoding and parity validation.
pub mod pac;

/// Presentation timestamps in 100 ns ticks.
pub mod timestamp;
