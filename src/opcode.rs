//! The decoded instruction record, its instruction-flag constants, and
//! branch enumeration / rendering.
//!
//! Grounded on `i386Opcode` in the original: a value object created
//! once by `disasm` and never mutated afterward. Operands are stored
//! inline (`Vec<Operand>` rather than the original's duck-typed list)
//! since `Operand` is a closed, `Copy` sum type.

use crate::canvas::Canvas;
use crate::emu::Emulator;
use crate::operand::Operand;
use crate::prefix;
use crate::regs::RegisterContext;
use crate::tables::ids;

/// Suppresses the default fall-through edge in branch analysis
/// (`IF_NOFALL`).
pub const IF_NOFALL: u32 = 1 << 0;
/// Marks a return instruction (`IF_RET`).
pub const IF_RET: u32 = 1 << 1;
/// Marks a call instruction (`IF_CALL`).
pub const IF_CALL: u32 = 1 << 2;
/// Marks a branch instruction (`IF_BRANCH`).
pub const IF_BRANCH: u32 = 1 << 3;
/// Marks an instruction restricted to the most privileged ring
/// (`IF_PRIV`).
pub const IF_PRIV: u32 = 1 << 4;

/// A branch-analysis edge is conditional (`BR_COND`).
pub const BR_COND: u32 = 1 << 0;
/// A branch-analysis edge is the straight-line fall-through
/// (`BR_FALL`).
pub const BR_FALL: u32 = 1 << 1;
/// A branch-analysis edge enters a called procedure (`BR_PROC`).
pub const BR_PROC: u32 = 1 << 2;
/// The branch target was computed through a memory dereference
/// (`BR_DEREF`).
pub const BR_DEREF: u32 = 1 << 3;
/// The branch target is the base of a jump table rather than a
/// resolved destination (`BR_TABLE`).
pub const BR_TABLE: u32 = 1 << 4;

/// Opcode ids whose immediate is sign-extended for display only, not
/// for the stored value (`sextend` in the original).
pub(crate) const SIGN_EXTEND_DISPLAY: [u32; 3] = [ids::ADD, ids::SUB, ids::AND];

/// A single decoded x86 instruction.
///
/// Records are plain value objects: `disasm` builds one per call and
/// hands it back by value. Nothing downstream mutates it; the
/// operands carry no reference back to the record that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Opcode {
    pub va: u64,
    pub opcode_id: u32,
    pub mnem: &'static str,
    pub prefixes: u32,
    /// Total bytes consumed, including prefixes, opcode bytes, and
    /// every operand.
    pub size: u8,
    pub operands: Vec<Operand>,
    pub iflags: u32,
}

impl Opcode {
    /// `repr` of the operand at `idx`, applying the `Imm`
    /// sign-extend-for-display rule, which needs this opcode's id and
    /// first operand and so cannot live on `Operand` alone.
    pub fn repr_operand(&self, idx: usize, regs: &dyn RegisterContext) -> String {
        match self.operands.get(idx) {
            Some(Operand::Imm { value, tsize }) if *tsize == 1 => {
                let mut uval = *value;
                if SIGN_EXTEND_DISPLAY.contains(&self.opcode_id) {
                    if let Some(first) = self.operands.first() {
                        if first.tsize() != *tsize {
                            uval = crate::bits::sign_extend(*value, 1, first.tsize() as usize);
                        }
                    }
                }
                imm_repr(uval)
            }
            Some(Operand::PcRel { delta, .. }) => {
                let target = (self.va as i64)
                    .wrapping_add(self.size as i64)
                    .wrapping_add(*delta) as u64;
                format!("0x{:08x}", target)
            }
            Some(op) => op.repr(self, regs),
            None => String::new(),
        }
    }

    /// The concatenated active-prefix label ahead of the mnemonic
    /// (`_getPrefixName` in the original).
    pub fn prefix_label(&self) -> String {
        prefix::label(self.prefixes)
    }

    /// Render this instruction into `canvas`: prefix label, mnemonic,
    /// then each operand separated by commas.
    pub fn render(&self, canvas: &mut dyn Canvas, regs: &dyn RegisterContext) {
        if self.prefixes != 0 {
            let pfx = self.prefix_label();
            if !pfx.is_empty() {
                canvas.add_name_text(&format!("{}: ", pfx), Some(&pfx));
            }
        }

        canvas.add_name_text(self.mnem, Some("mnemonic"));
        canvas.add_text(" ");

        let last = self.operands.len().saturating_sub(1);
        for (i, oper) in self.operands.iter().enumerate() {
            oper.render(self, i, canvas, regs);
            if i != last {
                canvas.add_text(",");
            }
        }
    }

    /// Enumerate the control-flow edges leaving this instruction
    /// (`getBranches` in the original).
    pub fn branches(&self, emu: Option<&dyn Emulator>) -> Vec<(u64, u32)> {
        let mut ret = Vec::new();
        let mut flags = 0u32;
        let mut addb = false;

        if self.opcode_id == ids::BRANCHCC {
            flags |= BR_COND;
            addb = true;
        }

        if self.iflags & IF_NOFALL == 0 {
            ret.push((self.va + self.size as u64, flags | BR_FALL));
        }

        if self.operands.is_empty() {
            return ret;
        }

        if self.opcode_id == ids::CALL {
            flags |= BR_PROC;
            addb = true;
        } else if self.opcode_id == ids::CALLCC {
            flags |= BR_PROC | BR_COND;
            addb = true;
        } else if self.opcode_id == ids::BRANCH {
            let oper0 = &self.operands[0];
            if let Operand::Sib { scale: 4, .. } = oper0 {
                let base = oper0.sib_base(emu);
                match (emu, base) {
                    (Some(e), Some(base)) => {
                        let tsize = oper0.tsize();
                        let mut addr = base;
                        let mut dest = e.read_mem_value(addr, tsize);
                        while let Some(d) = dest {
                            if !e.is_valid_pointer(d) {
                                break;
                            }
                            ret.push((d, BR_COND));
                            addr += tsize as u64;
                            dest = e.read_mem_value(addr, tsize);
                        }
                    }
                    (None, Some(base)) => {
                        ret.push((base, flags | BR_DEREF | BR_TABLE));
                    }
                    _ => {}
                }
            } else {
                addb = true;
            }
        }

        if addb {
            let oper0 = &self.operands[0];
            let tova = if oper0.is_deref() {
                flags |= BR_DEREF;
                oper0.addr(self, emu)
            } else {
                oper0.value(self, emu)
            };
            if let Some(tova) = tova {
                ret.push((tova, flags));
            }
        }

        ret
    }
}

fn imm_repr(uval: u64) -> String {
    if uval > 4096 {
        format!("0x{:08x}", uval)
    } else {
        uval.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::Operand;
    use crate::regs::{BasicRegisterContext, REG_EAX, REG_ESP};

    fn mk(opcode_id: u32, size: u8, operands: Vec<Operand>, iflags: u32) -> Opcode {
        Opcode {
            va: 0x1000,
            opcode_id,
            mnem: "test",
            prefixes: 0,
            size,
            operands,
            iflags,
        }
    }

    #[test]
    fn nop_has_no_branches() {
        let op = mk(ids::NOP, 1, vec![], 0);
        assert_eq!(op.branches(None), vec![(0x1001, BR_FALL)]);
    }

    #[test]
    fn unconditional_branch_suppresses_fallthrough() {
        let op = mk(
            ids::BRANCH,
            5,
            vec![Operand::PcRel { delta: -5, tsize: 4 }],
            IF_NOFALL | IF_BRANCH,
        );
        assert_eq!(op.branches(None), vec![(0x1000, 0)]);
    }

    #[test]
    fn conditional_branch_has_fall_and_cond_edges() {
        let op = mk(
            ids::BRANCHCC,
            2,
            vec![Operand::PcRel { delta: 5, tsize: 1 }],
            IF_BRANCH,
        );
        let branches = op.branches(None);
        assert_eq!(branches, vec![(0x1002, BR_COND | BR_FALL), (0x1007, BR_COND)]);
    }

    #[test]
    fn prefix_label_order_matches_original() {
        let op = Opcode {
            va: 0,
            opcode_id: ids::ADD,
            mnem: "add",
            prefixes: crate::prefix::LOCK | crate::prefix::SEG_DS,
            size: 1,
            operands: vec![],
            iflags: 0,
        };
        assert_eq!(op.prefix_label(), "lockds");
    }

    #[test]
    fn imm_sign_extend_for_display_only() {
        let op = mk(
            ids::ADD,
            3,
            vec![
                Operand::Reg { reg: REG_EAX, tsize: 4 },
                Operand::Imm { value: 0xfb, tsize: 1 },
            ],
            0,
        );
        assert_eq!(op.repr_operand(1, &BasicRegisterContext), "0xfffffffb");
        // Stored value is unchanged.
        assert_eq!(op.operands[1].value(&op, None), Some(0xfb));
    }

    #[test]
    fn reg_mem_repr_omits_zero_disp() {
        let op = mk(ids::MOV, 4, vec![], 0);
        let oper = Operand::RegMem { reg: REG_ESP, tsize: 4, disp: 0 };
        assert_eq!(oper.repr(&op, &BasicRegisterContext), "dword [esp]");
    }
}
