//! The operand sum type and its repr/render/value/write/addr contract.
//!
//! The original's duck-typed `i386*Oper` classes (`i386RegOper`,
//! `i386ImmOper`, `i386PcRelOper`, `i386RegMemOper`, `i386ImmMemOper`,
//! `i386SibOper`) become one closed enum here, per the crate's
//! redesign note: a systems language expresses "one of six shapes,
//! each with the same five operations" as a tagged enum with inherent
//! methods, not a trait object nobody ever holds polymorphically.
//!
//! Every method takes `&Opcode` as its first argument even where a
//! given variant ignores it, mirroring the original's
//! `repr(self, op)` / `getOperValue(self, op, emu)` signatures: `PcRel`
//! needs `op.va`/`op.size`, `RegMem`/`ImmMem`/`Sib` need the segment
//! base `emu.segment_info(op)` resolves for that specific opcode, and
//! `Imm`'s display-only sign extension needs `op.opcode_id` and
//! `op.operands[0]`.

use crate::canvas::{addr_to_name, Canvas};
use crate::emu::Emulator;
use crate::opcode::Opcode;
use crate::regs::{RegId, RegisterContext};

fn size_name(tsize: u8) -> &'static str {
    match tsize {
        1 => "byte",
        2 => "word",
        4 => "dword",
        8 => "qword",
        16 => "oword",
        _ => "",
    }
}

/// One decoded operand. See the module docs for the method contract
/// shared by every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg {
        reg: RegId,
        tsize: u8,
    },
    Imm {
        value: u64,
        tsize: u8,
    },
    PcRel {
        delta: i64,
        tsize: u8,
    },
    RegMem {
        reg: RegId,
        tsize: u8,
        disp: i64,
    },
    ImmMem {
        addr: u32,
        tsize: u8,
    },
    Sib {
        tsize: u8,
        base: Option<RegId>,
        index: Option<RegId>,
        scale: u8,
        imm: Option<u32>,
        disp: i64,
    },
}

impl Operand {
    pub fn tsize(&self) -> u8 {
        match *self {
            Operand::Reg { tsize, .. }
            | Operand::Imm { tsize, .. }
            | Operand::PcRel { tsize, .. }
            | Operand::RegMem { tsize, .. }
            | Operand::ImmMem { tsize, .. }
            | Operand::Sib { tsize, .. } => tsize,
        }
    }

    /// Whether this operand reads/writes memory rather than a
    /// register or a literal (`isDeref` in the original).
    pub fn is_deref(&self) -> bool {
        matches!(
            self,
            Operand::RegMem { .. } | Operand::ImmMem { .. } | Operand::Sib { .. }
        )
    }

    /// Plain textual representation. `Imm`'s sign-extend-for-display
    /// rule and `PcRel`'s target-address rule both need the owning
    /// opcode, so `Opcode::repr_operand` special-cases those two
    /// variants; this covers the rest.
    pub fn repr(&self, op: &Opcode, regs: &dyn RegisterContext) -> String {
        match self {
            Operand::Reg { reg, .. } => regs.register_name(*reg),
            Operand::Imm { value, .. } => {
                if *value > 4096 {
                    format!("0x{:08x}", value)
                } else {
                    value.to_string()
                }
            }
            Operand::PcRel { delta, tsize } => {
                let target = (op.va as i64)
                    .wrapping_add(op.size as i64)
                    .wrapping_add(*delta) as u64;
                let _ = tsize;
                format!("0x{:08x}", target)
            }
            Operand::RegMem { reg, tsize, disp } => {
                let r = regs.register_name(*reg);
                match disp.signum() {
                    1 => format!("{} [{} + {}]", size_name(*tsize), r, disp),
                    -1 => format!("{} [{} - {}]", size_name(*tsize), r, -disp),
                    _ => format!("{} [{}]", size_name(*tsize), r),
                }
            }
            Operand::ImmMem { addr, tsize } => {
                format!("{} [0x{:08x}]", size_name(*tsize), addr)
            }
            Operand::Sib {
                tsize,
                base,
                imm,
                index,
                scale,
                disp,
            } => {
                let mut r = format!("{} [", size_name(*tsize));
                if let Some(b) = base {
                    r.push_str(&regs.register_name(*b));
                }
                if let Some(imm) = imm {
                    r.push_str(&format!("0x{:08x}", imm));
                }
                if let Some(idx) = index {
                    r.push_str(&format!(" + {}", regs.register_name(*idx)));
                    if *scale != 1 {
                        r.push_str(&format!(" * {}", scale));
                    }
                }
                if *disp != 0 {
                    r.push_str(&format!(" + {}", disp));
                }
                r.push(']');
                r
            }
        }
    }

    /// The operand's value, reading through `emu` where a live
    /// machine is required. `None` when the variant needs an
    /// emulator and none was supplied.
    pub fn value(&self, op: &Opcode, emu: Option<&dyn Emulator>) -> Option<u64> {
        match self {
            Operand::Reg { reg, .. } => emu.map(|e| e.get_register(*reg)),
            Operand::Imm { value, .. } => Some(*value),
            Operand::PcRel { delta, .. } => Some(
                (op.va as i64)
                    .wrapping_add(op.size as i64)
                    .wrapping_add(*delta) as u64,
            ),
            Operand::RegMem { tsize, .. } => {
                let emu = emu?;
                let addr = self.addr(op, Some(emu))?;
                emu.read_mem_value(addr, *tsize)
            }
            Operand::ImmMem { tsize, .. } => {
                let emu = emu?;
                let addr = self.addr(op, Some(emu))?;
                emu.read_mem_value(addr, *tsize)
            }
            Operand::Sib { tsize, .. } => {
                let emu = emu?;
                let addr = self.addr(op, Some(emu))?;
                emu.read_mem_value(addr, *tsize)
            }
        }
    }

    /// Write `value` through `emu`. A no-op for variants that are not
    /// writable (`Imm`, `PcRel`), matching the original, which never
    /// defines `setOperValue` for those two classes.
    pub fn write(&self, op: &Opcode, emu: &mut dyn Emulator, value: u64) {
        match self {
            Operand::Reg { reg, .. } => emu.set_register(*reg, value),
            Operand::Imm { .. } | Operand::PcRel { .. } => {}
            Operand::RegMem { tsize, .. } | Operand::ImmMem { tsize, .. } | Operand::Sib { tsize, .. } => {
                if let Some(addr) = self.addr(op, Some(emu)) {
                    emu.write_mem_value(addr, value, *tsize);
                }
            }
        }
    }

    /// The effective address this operand dereferences, for the
    /// memory-shaped variants. `PcRel`'s "address" is its resolved
    /// target, also returned here for branch analysis's convenience.
    pub fn addr(&self, op: &Opcode, emu: Option<&dyn Emulator>) -> Option<u64> {
        match self {
            Operand::Reg { .. } | Operand::Imm { .. } => None,
            Operand::PcRel { delta, .. } => Some(
                (op.va as i64)
                    .wrapping_add(op.size as i64)
                    .wrapping_add(*delta) as u64,
            ),
            Operand::RegMem { reg, disp, .. } => {
                let emu = emu?;
                let (base, _limit) = emu.segment_info(op);
                let rval = emu.get_register(*reg);
                Some((base as i64).wrapping_add(rval as i64).wrapping_add(*disp) as u64)
            }
            Operand::ImmMem { addr, .. } => {
                // Matches the original: resolvable without an
                // emulator (segment base just defaults to 0).
                let mut ret = *addr as u64;
                if let Some(emu) = emu {
                    let (base, _limit) = emu.segment_info(op);
                    ret = ret.wrapping_add(base);
                }
                Some(ret)
            }
            Operand::Sib { .. } => {
                // Unlike ImmMem, the original's SibOper.getOperAddr
                // requires an emulator unconditionally, even when
                // only an absolute `imm` term is present.
                let emu = emu?;
                let (base_reg, index, scale, imm, disp) = self.sib_parts();
                let mut ret = 0i64;
                if let Some(imm) = imm {
                    ret = ret.wrapping_add(imm as i64);
                }
                if let Some(r) = base_reg {
                    ret = ret.wrapping_add(emu.get_register(r) as i64);
                }
                if let Some(idx) = index {
                    ret = ret.wrapping_add(emu.get_register(idx) as i64 * scale as i64);
                }
                let (base, _limit) = emu.segment_info(op);
                Some((ret.wrapping_add(base as i64)).wrapping_add(disp) as u64)
            }
        }
    }

    /// The Sib-only effective-base helper used by branch analysis
    /// (`_getOperBase` in the original): prefers the absolute `imm`
    /// term over the base register whenever `imm` is present and
    /// nonzero, even when a base register is also present. Preserved
    /// verbatim because jump-table branch analysis depends on it.
    pub fn sib_base(&self, emu: Option<&dyn Emulator>) -> Option<u64> {
        match self {
            Operand::Sib { base, imm, .. } => {
                if let Some(imm) = imm {
                    if *imm != 0 {
                        return Some(*imm as u64);
                    }
                }
                match (emu, base) {
                    (Some(e), Some(r)) => Some(e.get_register(*r)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn sib_parts(&self) -> (Option<RegId>, Option<RegId>, u8, Option<u32>, i64) {
        match self {
            Operand::Sib {
                base,
                index,
                scale,
                imm,
                disp,
                ..
            } => (*base, *index, *scale, *imm, *disp),
            _ => (None, None, 1, None, 0),
        }
    }

    /// Render this operand at position `idx` of `op` into `canvas`.
    ///
    /// Two bug fixes from the original's design notes are applied
    /// here rather than reproduced: a register operand always renders
    /// its register name (a symbol hint at its position never
    /// replaces it — hints apply to addresses), and a PC-relative
    /// operand computes its target address before consulting a
    /// symbol hint rather than after.
    pub fn render(&self, op: &Opcode, idx: usize, canvas: &mut dyn Canvas, regs: &dyn RegisterContext) {
        match self {
            Operand::Reg { reg, .. } => {
                let name = regs.register_name(*reg);
                canvas.add_name_text(&name, Some("registers"));
            }
            Operand::Imm { value, .. } => {
                let hint = canvas.syms().sym_hint(op.va, idx);
                if let Some(hint) = hint {
                    canvas.add_va_text(&hint, None);
                } else if canvas.mem().is_valid_pointer(*value) {
                    let name = addr_to_name(canvas.syms(), *value);
                    canvas.add_va_text(&name, Some(*value));
                } else {
                    canvas.add_name_text(&value.to_string(), None);
                }
            }
            Operand::PcRel { delta, .. } => {
                let target = (op.va as i64)
                    .wrapping_add(op.size as i64)
                    .wrapping_add(*delta) as u64;
                let hint = canvas.syms().sym_hint(op.va, idx);
                if let Some(hint) = hint {
                    canvas.add_va_text(&hint, Some(target));
                } else {
                    let name = addr_to_name(canvas.syms(), target);
                    canvas.add_va_text(&name, Some(target));
                }
            }
            Operand::RegMem { reg, tsize, disp } => {
                canvas.add_name_text(size_name(*tsize), None);
                canvas.add_text(" [");
                canvas.add_name_text(&regs.register_name(*reg), Some("registers"));
                let hint = canvas.syms().sym_hint(op.va, idx);
                if let Some(hint) = hint {
                    canvas.add_text(" + ");
                    canvas.add_name_text(&hint, None);
                } else if *disp > 0 {
                    canvas.add_text(" + ");
                    canvas.add_name_text(&disp.to_string(), None);
                } else if *disp < 0 {
                    canvas.add_text(" - ");
                    canvas.add_name_text(&(-disp).to_string(), None);
                }
                canvas.add_text("]");
            }
            Operand::ImmMem { addr, tsize } => {
                canvas.add_name_text(size_name(*tsize), None);
                canvas.add_text(" [");
                let hint = canvas.syms().sym_hint(op.va, idx);
                if let Some(hint) = hint {
                    canvas.add_va_text(&hint, Some(*addr as u64));
                } else {
                    let name = addr_to_name(canvas.syms(), *addr as u64);
                    canvas.add_va_text(&name, Some(*addr as u64));
                }
                canvas.add_text("]");
            }
            Operand::Sib {
                tsize,
                base,
                imm,
                index,
                scale,
                disp,
            } => {
                canvas.add_name_text(size_name(*tsize), None);
                canvas.add_text(" [");
                if let Some(imm) = imm {
                    let name = addr_to_name(canvas.syms(), *imm as u64);
                    canvas.add_va_text(&name, Some(*imm as u64));
                }
                if let Some(b) = base {
                    canvas.add_name_text(&regs.register_name(*b), Some("registers"));
                }
                if let Some(idx_reg) = index {
                    canvas.add_text(" + ");
                    canvas.add_name_text(&regs.register_name(*idx_reg), Some("registers"));
                    if *scale != 1 {
                        canvas.add_text(" * ");
                        canvas.add_name_text(&scale.to_string(), None);
                    }
                }
                let hint = canvas.syms().sym_hint(op.va, idx);
                if let Some(hint) = hint {
                    canvas.add_text(" + ");
                    canvas.add_name_text(&hint, None);
                } else if *disp != 0 {
                    canvas.add_text(" + ");
                    canvas.add_name_text(&disp.to_string(), None);
                }
                canvas.add_text("]");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emu::Emulator;
    use crate::regs::{BasicRegisterContext, REG_EAX, REG_ECX, REG_ESP};
    use crate::tables::ids;
    use std::collections::HashMap;

    fn mkop(opcode_id: u32, operands: Vec<Operand>) -> Opcode {
        Opcode {
            va: 0x1000,
            opcode_id,
            mnem: "x",
            prefixes: 0,
            size: 4,
            operands,
            iflags: 0,
        }
    }

    struct TestEmu {
        regs: HashMap<RegId, u64>,
        mem: HashMap<u64, u64>,
    }

    impl Emulator for TestEmu {
        fn get_register(&self, reg: RegId) -> u64 {
            *self.regs.get(&reg).unwrap_or(&0)
        }
        fn set_register(&mut self, reg: RegId, value: u64) {
            self.regs.insert(reg, value);
        }
        fn read_mem_value(&self, addr: u64, _width: u8) -> Option<u64> {
            self.mem.get(&addr).copied()
        }
        fn write_mem_value(&mut self, addr: u64, value: u64, _width: u8) {
            self.mem.insert(addr, value);
        }
        fn segment_info(&self, _op: &Opcode) -> (u64, u64) {
            (0, 0xffff_ffff)
        }
        fn is_valid_pointer(&self, addr: u64) -> bool {
            self.mem.contains_key(&addr)
        }
    }

    #[test]
    fn reg_repr_and_value() {
        let op = mkop(ids::MOV, vec![]);
        let oper = Operand::Reg { reg: REG_EAX, tsize: 4 };
        assert_eq!(oper.repr(&op, &BasicRegisterContext), "eax");
        assert_eq!(oper.value(&op, None), None);
        let mut emu = TestEmu { regs: HashMap::new(), mem: HashMap::new() };
        emu.set_register(REG_EAX, 42);
        assert_eq!(oper.value(&op, Some(&emu)), Some(42));
    }

    #[test]
    fn pcrel_value_matches_invariant() {
        let op = mkop(ids::BRANCH, vec![]);
        let oper = Operand::PcRel { delta: -5, tsize: 4 };
        assert_eq!(oper.value(&op, None), Some(op.va + op.size as u64 - 5));
    }

    #[test]
    fn regmem_addr_uses_segment_base_and_disp() {
        let op = mkop(ids::MOV, vec![]);
        let oper = Operand::RegMem { reg: REG_ESP, tsize: 4, disp: 8 };
        let mut emu = TestEmu { regs: HashMap::new(), mem: HashMap::new() };
        emu.set_register(REG_ESP, 0x2000);
        assert_eq!(oper.addr(&op, Some(&emu)), Some(0x2008));
        assert_eq!(oper.addr(&op, None), None);
    }

    #[test]
    fn immmem_addr_resolves_without_emulator() {
        let op = mkop(ids::MOV, vec![]);
        let oper = Operand::ImmMem { addr: 0x0040_0000, tsize: 4 };
        assert_eq!(oper.addr(&op, None), Some(0x0040_0000));
    }

    #[test]
    fn sib_addr_requires_emulator() {
        let op = mkop(ids::MOV, vec![]);
        let oper = Operand::Sib {
            tsize: 4,
            base: Some(REG_ESP),
            index: None,
            scale: 1,
            imm: None,
            disp: 8,
        };
        assert_eq!(oper.addr(&op, None), None);
        let mut emu = TestEmu { regs: HashMap::new(), mem: HashMap::new() };
        emu.set_register(REG_ESP, 0x1000);
        assert_eq!(oper.addr(&op, Some(&emu)), Some(0x1008));
    }

    #[test]
    fn sib_scale_and_index_domain() {
        let oper = Operand::Sib {
            tsize: 4,
            base: Some(REG_EAX),
            index: Some(REG_ECX),
            scale: 4,
            imm: None,
            disp: 0,
        };
        if let Operand::Sib { scale, index, .. } = oper {
            assert!(matches!(scale, 1 | 2 | 4 | 8));
            assert_ne!(index, Some(4));
        }
    }

    #[test]
    fn sib_base_prefers_imm_over_base_register() {
        let oper = Operand::Sib {
            tsize: 4,
            base: Some(REG_EAX),
            index: None,
            scale: 4,
            imm: Some(0x0040_0000),
            disp: 0,
        };
        let mut emu = TestEmu { regs: HashMap::new(), mem: HashMap::new() };
        emu.set_register(REG_EAX, 0x1234);
        assert_eq!(oper.sib_base(Some(&emu)), Some(0x0040_0000));
    }

    #[test]
    fn operand_equality_reflexive() {
        let a = Operand::Sib { tsize: 4, base: Some(REG_ESP), index: None, scale: 1, imm: None, disp: 8 };
        let b = Operand::Sib { tsize: 4, base: Some(REG_ESP), index: None, scale: 1, imm: None, disp: 8 };
        assert_eq!(a, b);
    }
}
