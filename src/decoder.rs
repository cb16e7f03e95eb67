//! The decode driver: prefix absorption, opcode table walk, operand
//! materialization, instruction-flag derivation, and final `Opcode`
//! assembly.
//!
//! Grounded on `i386Disasm.disasm` in the original envi i386
//! disassembler. The five numbered steps in the original's single
//! `disasm` method become five private helpers here for readability;
//! the control flow and the final `(offset - startoff) + operoffset`
//! size computation are unchanged.

use crate::ameth;
use crate::bits::parse_bytes;
use crate::error::{DecodeError, Result};
use crate::opcode::{Opcode, IF_BRANCH, IF_CALL, IF_NOFALL, IF_RET};
use crate::prefix;
use crate::regs::Mode;
use crate::tables::data::TABLES;
use crate::tables::ids;
use crate::tables::{AddrMethod, Entry};

/// Mnemonics restricted to the most privileged ring (`priv_lookup` in
/// the original). Carried in full per this crate's supplemented
/// feature list, including the four VMX instructions the distilled
/// spec's prose dropped.
const PRIVILEGED: &[&str] = &[
    "int", "in", "out", "insb", "outsb", "insd", "outsd", "vmcall", "vmlaunch", "vmresume",
    "vmxoff", "vmread", "vmwrite", "rsm", "lar", "lsl", "clts", "invd", "wbinvd", "wrmsr",
    "rdmsr", "sysexit", "lgdt", "lidt", "lmsw", "monitor", "mwait", "vmclear", "vmptrld",
    "vmptrst", "vmxon",
];

fn iflags_for(opcode_id: u32) -> u32 {
    match opcode_id {
        ids::RET => IF_NOFALL | IF_RET,
        ids::CALL | ids::CALLCC => IF_CALL,
        ids::BRANCH => IF_NOFALL | IF_BRANCH,
        ids::BRANCHCC => IF_BRANCH,
        _ => 0,
    }
}

/// Decode a single instruction from `buf` at `offset`, as though it
/// resides at virtual address `va`.
pub fn disasm(buf: &[u8], offset: usize, va: u64) -> Result<Opcode> {
    match disasm_inner(buf, offset, va) {
        Err(DecodeError::TruncatedInput { .. }) => Err(DecodeError::InvalidInstruction),
        other => other,
    }
}

fn disasm_inner(buf: &[u8], offset: usize, va: u64) -> Result<Opcode> {
    let mut cursor = offset;
    let prefixes = absorb_prefixes(buf, &mut cursor)?;
    let entry = walk_tables(buf, &mut cursor)?;

    if entry.opcode_id == ids::INVALID {
        return Err(DecodeError::InvalidInstruction);
    }

    let mode = if prefixes & prefix::OP_SIZE != 0 { Mode::Mode16 } else { Mode::Mode32 };
    let (operands, operoffset) = parse_operands(buf, cursor, entry, mode)?;

    let mut iflags = iflags_for(entry.opcode_id);
    if PRIVILEGED.contains(&entry.mnem) {
        iflags |= crate::opcode::IF_PRIV;
    }

    Ok(Opcode {
        va,
        opcode_id: entry.opcode_id,
        mnem: entry.mnem,
        prefixes,
        size: ((cursor - offset) + operoffset) as u8,
        operands,
        iflags,
    })
}

/// Step 1: absorb leading prefix bytes, returning the accumulated
/// prefix bitset and advancing `cursor` past them.
///
/// The `0x66` immediately followed by `0x0f` is left unconsumed here —
/// it is retained as a SIMD table discriminator and eaten by the table
/// walk's composite-hop handling instead (§4.2's special case).
fn absorb_prefixes(buf: &[u8], cursor: &mut usize) -> Result<u32> {
    let mut prefixes = 0u32;
    loop {
        let b = parse_bytes(buf, *cursor, 1, false)? as u8;
        let bit = prefix::TABLE[b as usize];
        if bit == 0 {
            break;
        }
        if b == 0x66 {
            let next = parse_bytes(buf, *cursor + 1, 1, false)? as u8;
            if next == 0x0f {
                break;
            }
        }
        prefixes |= bit;
        *cursor += 1;
    }
    Ok(prefixes)
}

/// Step 2: walk the opcode table forest from the root to a terminal
/// entry, advancing `cursor` past every consumed opcode byte.
fn walk_tables(buf: &[u8], cursor: &mut usize) -> Result<&'static Entry> {
    let mut table = &TABLES[crate::tables::data::ROOT];
    loop {
        let b = parse_bytes(buf, *cursor, 1, false)? as u8;
        let (resolved, entry) = table.lookup(&TABLES, b);

        if let Some(next) = entry.next_table {
            if b == 0x66 {
                let next_byte = parse_bytes(buf, *cursor + 1, 1, false)? as u8;
                if next_byte == 0x0f {
                    *cursor += 1;
                }
            }
            table = &TABLES[next];
            *cursor += 1;
            continue;
        }

        if resolved.mask == 0xff {
            *cursor += 1;
        }
        return Ok(entry);
    }
}

/// Step 3/4: materialize each operand descriptor on `entry` in order,
/// dispatching to the matching addressing-method function. Stops at
/// the first `Unused` slot.
fn parse_operands(
    buf: &[u8],
    base_offset: usize,
    entry: &Entry,
    mode: Mode,
) -> Result<(Vec<crate::operand::Operand>, usize)> {
    let mut operands = Vec::new();
    let mut operoffset = 0usize;

    for desc in entry.operands.iter() {
        if desc.addr_method == AddrMethod::Unused {
            break;
        }

        let tsize = desc.op_type.size_for(mode);

        let (osize, oper) = match desc.addr_method {
            AddrMethod::Embedded => (0, ameth::embedded(desc, tsize)),
            AddrMethod::A => ameth::a(buf, base_offset, tsize)?,
            AddrMethod::C => ameth::c(buf, base_offset, tsize)?,
            AddrMethod::D => ameth::d(buf, base_offset, tsize)?,
            AddrMethod::E | AddrMethod::M | AddrMethod::R => ameth::e(buf, base_offset, tsize)?,
            AddrMethod::G => ameth::g(buf, base_offset, tsize)?,
            AddrMethod::I => ameth::i(buf, base_offset + operoffset, tsize)?,
            AddrMethod::J => ameth::j(buf, base_offset + operoffset, tsize)?,
            AddrMethod::N | AddrMethod::Q => ameth::n(buf, base_offset, tsize)?,
            AddrMethod::O => ameth::o(buf, base_offset, tsize)?,
            AddrMethod::P => ameth::p(buf, base_offset, tsize)?,
            AddrMethod::S => ameth::s(buf, base_offset, tsize)?,
            AddrMethod::U => ameth::u(buf, base_offset, tsize)?,
            AddrMethod::V => ameth::v(buf, base_offset, tsize)?,
            AddrMethod::W => ameth::w(buf, base_offset, tsize)?,
            AddrMethod::X => (0, ameth::x(tsize)),
            AddrMethod::Y => (0, ameth::y(tsize)),
            AddrMethod::Unused => unreachable!("checked above"),
        };

        operands.push(oper);
        operoffset += osize;
    }

    Ok((operands, operoffset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::Operand;
    use crate::regs::{REG_EAX, REG_ECX, REG_ESP};

    #[test]
    fn scenario_nop() {
        let buf = [0x90];
        let op = disasm(&buf, 0, 0x1000).unwrap();
        assert_eq!(op.mnem, "nop");
        assert_eq!(op.size, 1);
        assert!(op.operands.is_empty());
        assert_eq!(op.iflags, 0);
    }

    #[test]
    fn scenario_mov_eax_imm32() {
        let buf = [0xb8, 0x44, 0x33, 0x22, 0x11];
        let op = disasm(&buf, 0, 0x1000).unwrap();
        assert_eq!(op.mnem, "mov");
        assert_eq!(op.size, 5);
        assert_eq!(
            op.operands,
            vec![Operand::Reg { reg: REG_EAX, tsize: 4 }, Operand::Imm { value: 0x1122_3344, tsize: 4 }]
        );
    }

    #[test]
    fn scenario_jmp_rel32_self_loop() {
        let buf = [0xe9, 0xfb, 0xff, 0xff, 0xff];
        let op = disasm(&buf, 0, 0x1000).unwrap();
        assert_eq!(op.mnem, "jmp");
        assert_eq!(op.size, 5);
        assert_eq!(op.operands, vec![Operand::PcRel { delta: -5, tsize: 4 }]);
        assert_eq!(op.operands[0].value(&op, None), Some(0x1000));
        assert_eq!(op.branches(None), vec![(0x1000, 0)]);
    }

    #[test]
    fn scenario_jz_rel8_conditional() {
        let buf = [0x74, 0x05];
        let op = disasm(&buf, 0, 0x1000).unwrap();
        assert_eq!(op.mnem, "jz");
        assert_eq!(op.size, 2);
        let branches = op.branches(None);
        assert_eq!(
            branches,
            vec![
                (0x1002, crate::opcode::BR_COND | crate::opcode::BR_FALL),
                (0x1007, crate::opcode::BR_COND),
            ]
        );
    }

    #[test]
    fn scenario_mov_eax_sib_esp_disp8() {
        let buf = [0x8b, 0x44, 0x24, 0x08];
        let op = disasm(&buf, 0, 0x1000).unwrap();
        assert_eq!(op.mnem, "mov");
        assert_eq!(op.size, 4);
        assert_eq!(
            op.operands,
            vec![
                Operand::Reg { reg: REG_EAX, tsize: 4 },
                Operand::Sib { tsize: 4, base: Some(REG_ESP), index: None, scale: 1, imm: None, disp: 8 },
            ]
        );
    }

    #[test]
    fn scenario_lock_add_immmem_ecx() {
        let buf = [0xf0, 0x01, 0x0d, 0x00, 0x00, 0x40, 0x00];
        let op = disasm(&buf, 0, 0x1000).unwrap();
        assert_eq!(op.mnem, "add");
        assert_eq!(op.prefixes, prefix::LOCK);
        assert_eq!(op.size, 7);
        assert_eq!(
            op.operands,
            vec![Operand::ImmMem { addr: 0x0040_0000, tsize: 4 }, Operand::Reg { reg: REG_ECX, tsize: 4 }]
        );
        assert_eq!(op.iflags & (IF_BRANCH | IF_CALL | IF_RET), 0);
    }

    #[test]
    fn group_83_sign_extends_for_display_only() {
        // 83 e8 fb -> sub eax, 0xfffffffb (imm8 sign-extended to an
        // unsigned dword for display); reg=5 (sub), rm=0 (eax).
        let buf = [0x83, 0xe8, 0xfb];
        let op = disasm(&buf, 0, 0x1000).unwrap();
        assert_eq!(op.mnem, "sub");
        assert_eq!(op.operands[1], Operand::Imm { value: 0xfb, tsize: 1 });
        assert_eq!(op.repr_operand(1, &crate::regs::BasicRegisterContext), "0xfffffffb");
    }

    #[test]
    fn truncated_instruction_is_invalid() {
        let buf = [0xb8, 0x01];
        assert!(matches!(disasm(&buf, 0, 0x1000), Err(DecodeError::InvalidInstruction)));
    }

    #[test]
    fn unknown_opcode_is_invalid() {
        let buf = [0x0f, 0xff, 0xff];
        assert!(matches!(disasm(&buf, 0, 0x1000), Err(DecodeError::InvalidInstruction)));
    }

    #[test]
    fn prefix_idempotence_across_reorderings() {
        let a = [0xf0, 0x3e, 0x01, 0x0d, 0x00, 0x00, 0x40, 0x00];
        let b = [0x3e, 0xf0, 0x01, 0x0d, 0x00, 0x00, 0x40, 0x00];
        let op_a = disasm(&a, 0, 0x1000).unwrap();
        let op_b = disasm(&b, 0, 0x1000).unwrap();
        assert_eq!(op_a.prefixes, op_b.prefixes);
        assert_eq!(op_a.mnem, op_b.mnem);
        assert_eq!(op_a.operands, op_b.operands);
    }
}
