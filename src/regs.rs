//! Register identifiers and the register-naming context.
//!
//! A register identifier is a small integer index, optionally combined
//! (via bitwise OR) with one of the `META_*` bits below to select a
//! sub-register view of a general-purpose register rather than the
//! full 32-bit register. The numeric bank offsets (`OFFSET_MMX` and
//! friends) let one flat `RegId` space address every register bank
//! (GPR, segment, control, debug, test, MMX, SIMD, FPU) that a ModR/M
//! reg field or SIB base/index can select.

/// A flat register identifier: a bank-relative index, optionally
/// OR'd with a `META_*` bit to select a narrower view.
pub type RegId = u32;

/// Select `al`/`cl`/`dl`/`bl`-style low-byte views of `eax..ebx`.
pub const META_LOW8: u32 = 0x0008_0000;
/// Select `ah`/`ch`/`dh`/`bh`-style high-byte views of `eax..ebx`.
pub const META_HIGH8: u32 = 0x0808_0000;
/// Select `ax`/`cx`/`dx`/`bx`-style 16-bit views of the GPRs.
pub const META_LOW16: u32 = 0x0010_0000;

const META_MASK: u32 = META_LOW8 | META_HIGH8 | META_LOW16;

/// Strip any `META_*` bits, returning the bare bank-relative index.
pub fn index_of(reg: RegId) -> u32 {
    reg & !META_MASK
}

/// General-purpose register indices, in x86 encoding order.
pub const REG_EAX: u32 = 0;
pub const REG_ECX: u32 = 1;
pub const REG_EDX: u32 = 2;
pub const REG_EBX: u32 = 3;
pub const REG_ESP: u32 = 4;
pub const REG_EBP: u32 = 5;
pub const REG_ESI: u32 = 6;
pub const REG_EDI: u32 = 7;

/// Base offsets for register banks outside the plain GPR file, used as
/// `reg_base` arguments to `extended_parse_modrm` and the addressing
/// methods that read alternate banks directly out of ModR/M's reg
/// field (C, D, P, S, U, V, and the N/Q/W memory-or-register forms).
pub const OFFSET_MMX: u32 = 32;
pub const OFFSET_SIMD: u32 = 48;
pub const OFFSET_DEBUG: u32 = 64;
pub const OFFSET_CTRL: u32 = 80;
pub const OFFSET_TEST: u32 = 96;
pub const OFFSET_SEG: u32 = 112;
pub const OFFSET_FPU: u32 = 128;

/// Segment register indices, relative to `OFFSET_SEG`.
pub const SEG_ES: u32 = 0;
pub const SEG_CS: u32 = 1;
pub const SEG_SS: u32 = 2;
pub const SEG_DS: u32 = 3;
pub const SEG_FS: u32 = 4;
pub const SEG_GS: u32 = 5;

/// Addressing mode: governs default operand/address sizes and which
/// entry of a per-operand-type size triple applies.
///
/// `Mode64` is carried as a reserved variant only; REX-prefixed 64-bit
/// decoding is not implemented (see the crate's module documentation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Mode16,
    Mode32,
    Mode64,
}

impl Mode {
    /// Index into a `[u8; 3]` operand-size triple for this mode.
    pub fn size_index(self) -> usize {
        match self {
            Mode::Mode16 => 0,
            Mode::Mode32 => 1,
            Mode::Mode64 => 2,
        }
    }
}

/// Resolves a `RegId` to a display name.
///
/// Operand variants take a `&dyn RegisterContext` as a parameter at
/// render/repr time rather than storing a reference to one internally,
/// so that an `Operand` remains an owned, `'static`, freely cloneable
/// value — the register context is a rendering-time collaborator, not
/// part of an operand's identity.
pub trait RegisterContext {
    fn register_name(&self, reg: RegId) -> String;
}

/// A minimal `RegisterContext` covering the GPR bank plus segment
/// registers, sufficient for tests and for embedding tools that only
/// need 16/32-bit general-purpose register names.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicRegisterContext;

impl RegisterContext for BasicRegisterContext {
    fn register_name(&self, reg: RegId) -> String {
        let meta = reg & META_MASK;
        let idx = index_of(reg);

        if idx >= OFFSET_SEG && idx < OFFSET_FPU {
            const SEG_NAMES: [&str; 6] = ["es", "cs", "ss", "ds", "fs", "gs"];
            let seg = (idx - OFFSET_SEG) as usize;
            return SEG_NAMES.get(seg).map(|s| s.to_string()).unwrap_or_else(|| format!("seg{}", seg));
        }

        if idx >= OFFSET_MMX && idx < OFFSET_SIMD {
            return format!("mm{}", idx - OFFSET_MMX);
        }
        if idx >= OFFSET_SIMD && idx < OFFSET_DEBUG {
            return format!("xmm{}", idx - OFFSET_SIMD);
        }
        if idx >= OFFSET_DEBUG && idx < OFFSET_CTRL {
            return format!("debug{}", idx - OFFSET_DEBUG);
        }
        if idx >= OFFSET_CTRL && idx < OFFSET_TEST {
            return format!("ctrl{}", idx - OFFSET_CTRL);
        }
        if idx >= OFFSET_TEST && idx < OFFSET_SEG {
            return format!("test{}", idx - OFFSET_TEST);
        }
        if idx >= OFFSET_FPU {
            return format!("st{}", idx - OFFSET_FPU);
        }

        const REG32: [&str; 8] = ["eax", "ecx", "edx", "ebx", "esp", "ebp", "esi", "edi"];
        const REG16: [&str; 8] = ["ax", "cx", "dx", "bx", "sp", "bp", "si", "di"];
        const REG8LOW: [&str; 4] = ["al", "cl", "dl", "bl"];
        const REG8HIGH: [&str; 4] = ["ah", "ch", "dh", "bh"];

        match meta {
            META_LOW8 => REG8LOW.get(idx as usize).copied().unwrap_or("?").to_string(),
            META_HIGH8 => REG8HIGH.get(idx as usize).copied().unwrap_or("?").to_string(),
            META_LOW16 => REG16.get(idx as usize).copied().unwrap_or("?").to_string(),
            _ => REG32.get(idx as usize).copied().unwrap_or("?").to_string(),
        }
    }
}

/// Given a ModR/M `rm`/`reg` field value and the operand size of a
/// byte-sized reference, return the register id adjusted to the
/// matching sub-register view (`adjust` in the ModR/M parse table).
///
/// Only meaningful for `opersize == 1`; callers must not apply this to
/// wider operand sizes.
pub fn byte_reg_offset(val: u32) -> u32 {
    if val < 4 {
        val | META_LOW8
    } else {
        (val - 4) | META_HIGH8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpr_names() {
        let ctx = BasicRegisterContext;
        assert_eq!(ctx.register_name(REG_EAX), "eax");
        assert_eq!(ctx.register_name(REG_ESP), "esp");
    }

    #[test]
    fn sub_register_names() {
        let ctx = BasicRegisterContext;
        assert_eq!(ctx.register_name(REG_EAX | META_LOW8), "al");
        assert_eq!(ctx.register_name(REG_EAX | META_HIGH8), "ah");
        assert_eq!(ctx.register_name(REG_ECX | META_LOW16), "cx");
    }

    #[test]
    fn byte_reg_offset_low_and_high() {
        assert_eq!(byte_reg_offset(0), REG_EAX | META_LOW8);
        assert_eq!(byte_reg_offset(4), REG_EAX | META_HIGH8);
        assert_eq!(byte_reg_offset(7), 3 | META_HIGH8);
    }

    #[test]
    fn segment_names() {
        let ctx = BasicRegisterContext;
        assert_eq!(ctx.register_name(OFFSET_SEG + SEG_DS), "ds");
    }
}
