//! The instruction prefix bitset and the 256-entry byte-to-prefix
//! lookup used during prefix absorption.
//!
//! Grounded on `i386_prefixes` and `prefix_names` in the original
//! envi i386 disassembler: a flat array keyed on the prefix byte
//! value, and a fixed display order for the nameable subset of
//! prefixes.

/// LOCK (`0xf0`).
pub const LOCK: u32 = 1 << 0;
/// REPNZ (`0xf2`).
pub const REPNZ: u32 = 1 << 1;
/// REPZ/REP (`0xf3`).
pub const REPZ: u32 = 1 << 2;
/// Set alongside `REPZ`/`REPNZ` when the driver recognizes a SIMD
/// scalar-repeat variant of a two-byte opcode. Not produced by the
/// byte table below; reserved for an SSE-table extension, per
/// `PREFIX_REP_SIMD` in the original.
pub const REP_SIMD: u32 = 1 << 3;
/// Operand-size override (`0x66`).
pub const OP_SIZE: u32 = 1 << 4;
/// Address-size override (`0x67`).
pub const ADDR_SIZE: u32 = 1 << 5;
/// Set by the driver when `0x66` is retained ahead of a `0x0f` escape
/// as a SIMD opcode discriminator rather than consumed as `OP_SIZE`.
/// Reserved for an SSE-table extension, per `PREFIX_SIMD` in the
/// original.
pub const SIMD: u32 = 1 << 6;
pub const SEG_CS: u32 = 1 << 7;
pub const SEG_SS: u32 = 1 << 8;
pub const SEG_DS: u32 = 1 << 9;
pub const SEG_ES: u32 = 1 << 10;
pub const SEG_FS: u32 = 1 << 11;
pub const SEG_GS: u32 = 1 << 12;

/// 256-entry byte -> prefix-bit lookup. `0` means "not a prefix byte"
/// and terminates prefix absorption.
pub const TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut t = [0u32; 256];
    t[0xf0] = LOCK;
    t[0xf2] = REPNZ;
    t[0xf3] = REPZ;
    t[0x2e] = SEG_CS;
    t[0x36] = SEG_SS;
    t[0x3e] = SEG_DS;
    t[0x26] = SEG_ES;
    t[0x64] = SEG_FS;
    t[0x65] = SEG_GS;
    t[0x66] = OP_SIZE;
    t[0x67] = ADDR_SIZE;
    t
}

/// Prefix display order and labels (`prefix_names` in the original):
/// lock, repnz, rep, then segment overrides in encoding order.
const NAMES: &[(u32, &str)] = &[
    (LOCK, "lock"),
    (REPNZ, "repnz"),
    (REPZ, "rep"),
    (SEG_CS, "cs"),
    (SEG_SS, "ss"),
    (SEG_DS, "ds"),
    (SEG_ES, "es"),
    (SEG_FS, "fs"),
    (SEG_GS, "gs"),
];

/// Concatenated label for the active prefixes in `prefixes`, e.g.
/// `"lock"` or `"repnzcs"`. Empty when no nameable prefix is set.
pub fn label(prefixes: u32) -> String {
    let mut s = String::new();
    for (bit, name) in NAMES {
        if prefixes & bit != 0 {
            s.push_str(name);
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_lookup() {
        assert_eq!(TABLE[0xf0], LOCK);
        assert_eq!(TABLE[0x66], OP_SIZE);
        assert_eq!(TABLE[0x90], 0);
    }

    #[test]
    fn label_order() {
        assert_eq!(label(LOCK | SEG_DS), "lockds");
        assert_eq!(label(0), "");
    }
}
