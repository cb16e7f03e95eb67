//! Error types for the decode core.
//!
//! `DecodeError` is the single failure type returned from `disasm` and
//! from every helper it calls. Truncated reads at any layer (prefix
//! absorption, opcode table walk, ModR/M, operand parsing) are folded
//! into `InvalidInstruction` at the public boundary, per the decode
//! driver's error-handling contract; `TruncatedInput` is kept as a
//! distinct variant so bit-utility callers can tell the two apart
//! before that folding happens.

use thiserror::Error;

/// Errors produced while decoding a single instruction.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A read of `width` bytes at `offset` ran past the end of the input
    /// buffer of length `len`.
    #[error("truncated input: wanted {width} byte(s) at offset {offset}, buffer has {len}")]
    TruncatedInput {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// The opcode table walk terminated on an entry with no assigned
    /// opcode id, or an inner read truncated mid-instruction.
    #[error("invalid instruction")]
    InvalidInstruction,

    /// An addressing method byte selected a dispatch slot that has no
    /// parser registered. This is a programmer/table-data fault, not a
    /// malformed-input fault, and is kept distinguishable so callers do
    /// not mistake a missing addressing method for bad input.
    #[error("unimplemented addressing method 0x{0:02x}")]
    UnimplementedAddressingMethod(u8),
}

/// Convenience result alias for decode operations.
pub type Result<T> = core::result::Result<T, DecodeError>;
