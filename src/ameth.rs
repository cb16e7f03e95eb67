//! Addressing-method dispatchers: one function per Intel addressing
//! method letter, each returning the number of bytes it consumed
//! starting at `offset` and the operand it materialized.
//!
//! Grounded directly on the `ameth_*` family in the original envi i386
//! disassembler. Methods C, D, G, P, S, U, V read the ModR/M byte's
//! `reg` field but never consume it — the opcode table walk or a
//! sibling E/M/R-method operand on the same instruction is what
//! advances past ModR/M — matching the original's `return (0, ...)`.

use crate::error::Result;
use crate::modrm::{adjust_reg, extended_parse_modrm, parse_modrm_byte};
use crate::operand::Operand;
use crate::regs::{
    byte_reg_offset, RegId, OFFSET_CTRL, OFFSET_DEBUG, OFFSET_MMX, OFFSET_SEG, OFFSET_SIMD,
    OFFSET_TEST, REG_EDI, REG_ESI,
};
use crate::tables::{OpVal, OperandDesc};

fn reg_field(buf: &[u8], offset: usize) -> Result<u8> {
    let byte = crate::bits::parse_bytes(buf, offset, 1, false)? as u8;
    let (_md, reg, _rm) = parse_modrm_byte(byte);
    Ok(reg)
}

/// Method `0`: the operand is embedded directly in the table entry
/// rather than read from the instruction stream (`ameth_0`).
pub fn embedded(desc: &OperandDesc, tsize: u8) -> Operand {
    match desc.op_val {
        OpVal::Reg(reg) => Operand::Reg { reg, tsize },
        OpVal::Imm(value) => Operand::Imm { value, tsize },
        OpVal::None => Operand::Imm { value: 0, tsize },
    }
}

/// Method `A`: a far pointer. The trailing 2-byte segment selector is
/// read (to account for its size) and discarded, matching the
/// original's own comment that only `callf`/`jmpf` are affected and
/// the segment is not modeled.
pub fn a(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    let imm = crate::bits::parse_bytes(buf, offset, tsize as usize, false)?;
    let _seg = crate::bits::parse_bytes(buf, offset + tsize as usize, 2, false)?;
    Ok((tsize as usize + 2, Operand::Imm { value: imm, tsize }))
}

/// Methods `E`, `M`, `R`: plain ModR/M, GPR bank.
pub fn e(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    extended_parse_modrm(buf, offset, tsize, 0)
}

/// Methods `N`, `Q`: ModR/M with the MMX register bank.
pub fn n(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    extended_parse_modrm(buf, offset, tsize, OFFSET_MMX)
}

/// Method `W`: ModR/M with the SIMD (XMM) register bank.
pub fn w(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    extended_parse_modrm(buf, offset, tsize, OFFSET_SIMD)
}

/// Method `I`: an unsigned immediate of `tsize` bytes.
pub fn i(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    let value = crate::bits::parse_bytes(buf, offset, tsize as usize, false)?;
    Ok((tsize as usize, Operand::Imm { value, tsize }))
}

/// Method `J`: a signed relative displacement.
pub fn j(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    let raw = crate::bits::parse_bytes(buf, offset, tsize as usize, true)?;
    Ok((tsize as usize, Operand::PcRel { delta: raw as i64, tsize }))
}

/// Method `O`: an absolute-address memory operand. The displacement is
/// always read as 4 bytes regardless of `tsize` (the original's note:
/// "displacement *stays* 32 bit even with REX").
pub fn o(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    let addr = crate::bits::parse_bytes(buf, offset, 4, false)? as u32;
    Ok((4, Operand::ImmMem { addr, tsize }))
}

/// Method `G`: ModR/M reg field, GPR bank, with sub-register adjust.
/// Consumes nothing.
pub fn g(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    let reg = reg_field(buf, offset)?;
    let reg = adjust_reg(reg as u32, tsize);
    Ok((0, Operand::Reg { reg, tsize }))
}

fn bank_reg(buf: &[u8], offset: usize, tsize: u8, bank: RegId) -> Result<(usize, Operand)> {
    let reg = reg_field(buf, offset)? as u32;
    Ok((0, Operand::Reg { reg: reg + bank, tsize }))
}

/// Method `C`: ModR/M reg field, control-register bank.
pub fn c(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    bank_reg(buf, offset, tsize, OFFSET_CTRL)
}

/// Method `D`: ModR/M reg field, debug-register bank.
pub fn d(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    bank_reg(buf, offset, tsize, OFFSET_DEBUG)
}

/// Method `P`: ModR/M reg field, MMX register bank.
pub fn p(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    bank_reg(buf, offset, tsize, OFFSET_MMX)
}

/// Method `S`: ModR/M reg field, segment-register bank.
pub fn s(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    bank_reg(buf, offset, tsize, OFFSET_SEG)
}

/// Method `U`: ModR/M reg field, test-register bank.
pub fn u(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    bank_reg(buf, offset, tsize, OFFSET_TEST)
}

/// Method `V`: ModR/M reg field, SIMD (XMM) register bank.
pub fn v(buf: &[u8], offset: usize, tsize: u8) -> Result<(usize, Operand)> {
    bank_reg(buf, offset, tsize, OFFSET_SIMD)
}

/// Method `X`: implicit `[esi]` string-source operand. The DS segment
/// override that real string instructions imply is not modeled
/// (matches the original; only relevant to `outs`, which is out of
/// scope). Consumes nothing.
pub fn x(tsize: u8) -> Operand {
    Operand::RegMem { reg: REG_ESI, tsize, disp: 0 }
}

/// Method `Y`: implicit `[edi]` string-destination operand.
///
/// The original returns `REG_ESI` here too (a copy-paste of `ameth_x`);
/// Intel's addressing-method letters assign ESI to X-type (source) and
/// EDI to Y-type (destination) operands, so this dispatcher uses EDI.
pub fn y(tsize: u8) -> Operand {
    Operand::RegMem { reg: REG_EDI, tsize, disp: 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::{REG_EAX, REG_ECX};

    #[test]
    fn method_i_reads_unsigned_immediate() {
        let buf = [0x44, 0x33, 0x22, 0x11];
        let (size, oper) = i(&buf, 0, 4).unwrap();
        assert_eq!(size, 4);
        assert_eq!(oper, Operand::Imm { value: 0x1122_3344, tsize: 4 });
    }

    #[test]
    fn method_j_sign_extends() {
        let buf = [0xfb, 0xff, 0xff, 0xff];
        let (size, oper) = j(&buf, 0, 4).unwrap();
        assert_eq!(size, 4);
        assert_eq!(oper, Operand::PcRel { delta: -5, tsize: 4 });
    }

    #[test]
    fn method_o_always_reads_4_bytes() {
        let buf = [0x00, 0x00, 0x40, 0x00];
        let (size, oper) = o(&buf, 0, 1).unwrap();
        assert_eq!(size, 4);
        assert_eq!(oper, Operand::ImmMem { addr: 0x0040_0000, tsize: 1 });
    }

    #[test]
    fn method_g_consumes_nothing_and_adjusts_byte_regs() {
        // reg field = 1 (ecx) at bit positions 3..5: 0b00_001_000 = 0x08
        let buf = [0x08];
        let (size, oper) = g(&buf, 0, 1).unwrap();
        assert_eq!(size, 0);
        assert_eq!(oper, Operand::Reg { reg: byte_reg_offset(1), tsize: 1 });
    }

    #[test]
    fn method_c_reads_reg_field_into_ctrl_bank() {
        let buf = [0x08]; // reg = 1
        let (size, oper) = c(&buf, 0, 4).unwrap();
        assert_eq!(size, 0);
        assert_eq!(oper, Operand::Reg { reg: 1 + OFFSET_CTRL, tsize: 4 });
    }

    #[test]
    fn method_x_and_y_use_distinct_registers() {
        assert_eq!(x(4), Operand::RegMem { reg: REG_ESI, tsize: 4, disp: 0 });
        assert_eq!(y(4), Operand::RegMem { reg: REG_EDI, tsize: 4, disp: 0 });
    }

    #[test]
    fn embedded_reg_and_imm() {
        let reg_desc = OperandDesc::embedded_reg(REG_EAX, crate::tables::OpType::Dword);
        assert_eq!(embedded(&reg_desc, 4), Operand::Reg { reg: REG_EAX, tsize: 4 });
        let imm_desc = OperandDesc::embedded_imm(1, crate::tables::OpType::Byte);
        assert_eq!(embedded(&imm_desc, 1), Operand::Imm { value: 1, tsize: 1 });
        let _ = REG_ECX;
    }
}
