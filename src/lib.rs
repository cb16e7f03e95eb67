//! A from-scratch IA-32 instruction decoder core.
//!
//! This crate decodes one x86 instruction at a time from a byte slice
//! into an [`Opcode`] value: prefixes, a mnemonic, and a list of typed
//! [`Operand`]s, together with the instruction flags and branch-edge
//! analysis an analysis tool needs to walk a control-flow graph. It
//! does not execute instructions, disassemble a whole buffer, or
//! render an x86 addressing-mode grammar back out to bytes — see
//! `SPEC_FULL.md` in this crate's repository for the full module list
//! and the Non-goals that bound it.
//!
//! The entry point is [`decoder::disasm`]. Callers that want textual
//! disassembly implement the [`canvas::Canvas`] and
//! [`regs::RegisterContext`] traits and call [`Opcode::render`];
//! callers that want control-flow edges implement [`emu::Emulator`]
//! (optionally) and call [`Opcode::branches`].
//!
//! ```
//! use ia32_decode::decoder::disasm;
//!
//! let buf = [0xb8, 0x44, 0x33, 0x22, 0x11]; // mov eax, 0x11223344
//! let op = disasm(&buf, 0, 0x1000).unwrap();
//! assert_eq!(op.mnem, "mov");
//! assert_eq!(op.size, 5);
//! ```

pub mod ameth;
pub mod bits;
pub mod canvas;
pub mod decoder;
pub mod emu;
pub mod error;
pub mod modrm;
pub mod opcode;
pub mod operand;
pub mod prefix;
pub mod regs;
pub mod tables;

pub use decoder::disasm;
pub use error::{DecodeError, Result};
pub use opcode::{
    Opcode, BR_COND, BR_DEREF, BR_FALL, BR_PROC, BR_TABLE, IF_BRANCH, IF_CALL, IF_NOFALL, IF_PRIV,
    IF_RET,
};
pub use operand::Operand;
