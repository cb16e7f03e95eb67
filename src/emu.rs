//! The emulator collaborator: register/memory access and segment info
//! for operands that need a live machine to resolve a value or address.
//!
//! Decoding never requires an emulator — every `disasm` call succeeds
//! or fails purely from the input bytes. An emulator is only consulted
//! by `Operand::value`/`Operand::write`/`Operand::addr` and by
//! `Opcode::branches`, both of which accept `Option<&dyn Emulator>` and
//! degrade gracefully (returning `None`, or a narrower branch list) when
//! none is supplied.

use crate::opcode::Opcode;
use crate::regs::RegId;

/// Live machine state an operand can be resolved against.
///
/// This is a narrow trait by design: it exposes exactly the primitives
/// the operand model needs (register read/write, sized memory
/// read/write, segment base lookup, pointer validity) and nothing of
/// the emulator's own execution loop, instruction cache, or threading
/// model — those are entirely the implementer's concern.
pub trait Emulator {
    fn get_register(&self, reg: RegId) -> u64;
    fn set_register(&mut self, reg: RegId, value: u64);

    /// Read `width` bytes (1, 2, 4, or 8) at `addr` as an unsigned
    /// little-endian integer.
    fn read_mem_value(&self, addr: u64, width: u8) -> Option<u64>;

    /// Write the low `width` bytes of `value` to `addr`.
    fn write_mem_value(&mut self, addr: u64, value: u64, width: u8);

    /// Segment base and limit in effect for the given opcode's memory
    /// operands (accounting for any segment-override prefix).
    fn segment_info(&self, op: &Opcode) -> (u64, u64);

    /// Whether `addr` refers to mapped, readable memory.
    fn is_valid_pointer(&self, addr: u64) -> bool;
}
