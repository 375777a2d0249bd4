//! Utility functions and supporting infrastructure.

/// Bitstream reading for the user data envelope.
pub mod bitstream_io;

/// Error types.
pub mod errors;
