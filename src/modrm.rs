//! ModR/M and SIB byte parsing.
//!
//! Grounded on `extended_parse_modrm`/`parse_sib`/`byteRegOffset` in the
//! original envi i386 disassembler. The mod/reg/rm split and the SIB
//! base==5/mod==0 absolute-displacement special case are carried over
//! byte for byte; `regbase` stays a plain offset added to the resolved
//! register id so the same parser serves the GPR, MMX, and SIMD
//! addressing-method dispatchers in `ameth`.

use crate::bits::parse_bytes;
use crate::error::Result;
use crate::operand::Operand;
use crate::regs::{byte_reg_offset, RegId, META_LOW16};

/// Split a ModR/M byte into `(mod, reg, rm)`.
pub fn parse_modrm_byte(byte: u8) -> (u8, u8, u8) {
    ((byte >> 6) & 0x3, (byte >> 3) & 0x7, byte & 0x7)
}

/// Adjust a raw rm/reg field to the sub-register view matching
/// `opersize`, for the `mod == 3` pure-register case and for method G.
/// Only byte and word operands need adjustment; wider operands use the
/// bare index.
pub fn adjust_reg(rm: u32, opersize: u8) -> RegId {
    match opersize {
        1 => byte_reg_offset(rm),
        2 => rm | META_LOW16,
        _ => rm,
    }
}

fn scale_for(encoded: u8) -> u8 {
    match encoded & 0x3 {
        0 => 1,
        1 => 2,
        2 => 4,
        _ => 8,
    }
}

/// Parse a ModR/M byte (and, when `rm == 4`, a following SIB byte plus
/// whatever displacement the mod/rm/SIB combination calls for) into an
/// `Operand` and the number of bytes consumed starting at `offset`.
///
/// `reg_base` selects an alternate register bank (MMX, SIMD, control,
/// debug, test, segment) for the resolved register id; `0` is the
/// plain GPR bank.
pub fn extended_parse_modrm(
    buf: &[u8],
    offset: usize,
    opersize: u8,
    reg_base: RegId,
) -> Result<(usize, Operand)> {
    let byte = parse_bytes(buf, offset, 1, false)? as u8;
    let (md, _reg, rm) = parse_modrm_byte(byte);
    let mut size = 1usize;

    if md == 3 {
        let rm = adjust_reg(rm as u32, opersize);
        return Ok((
            size,
            Operand::Reg {
                reg: rm + reg_base,
                tsize: opersize,
            },
        ));
    }

    match md {
        0 => {
            if rm == 5 {
                let imm = parse_bytes(buf, offset + size, 4, false)? as u32;
                size += 4;
                Ok((size, Operand::ImmMem { addr: imm, tsize: opersize }))
            } else if rm == 4 {
                let (sib_size, scale, index, base, imm) = parse_sib(buf, offset + size, md)?;
                size += sib_size;
                let base = base.map(|b| b + reg_base);
                let index = index.map(|i| i + reg_base);
                Ok((
                    size,
                    Operand::Sib {
                        tsize: opersize,
                        base,
                        index,
                        scale,
                        imm,
                        disp: 0,
                    },
                ))
            } else {
                Ok((
                    size,
                    Operand::RegMem {
                        reg: reg_base + rm as u32,
                        tsize: opersize,
                        disp: 0,
                    },
                ))
            }
        }
        1 => {
            if rm == 4 {
                let (sib_size, scale, index, base, imm) = parse_sib(buf, offset + size, md)?;
                size += sib_size;
                let disp = parse_bytes(buf, offset + size, 1, true)? as i8 as i64;
                size += 1;
                let base = base.map(|b| b + reg_base);
                let index = index.map(|i| i + reg_base);
                Ok((
                    size,
                    Operand::Sib {
                        tsize: opersize,
                        base,
                        index,
                        scale,
                        imm,
                        disp,
                    },
                ))
            } else {
                let disp = parse_bytes(buf, offset + size, 1, true)? as i8 as i64;
                size += 1;
                Ok((
                    size,
                    Operand::RegMem {
                        reg: reg_base + rm as u32,
                        tsize: opersize,
                        disp,
                    },
                ))
            }
        }
        2 => {
            if rm == 4 {
                let (sib_size, scale, index, base, imm) = parse_sib(buf, offset + size, md)?;
                size += sib_size;
                let disp = parse_bytes(buf, offset + size, 4, true)? as i32 as i64;
                size += 4;
                let base = base.map(|b| b + reg_base);
                let index = index.map(|i| i + reg_base);
                Ok((
                    size,
                    Operand::Sib {
                        tsize: opersize,
                        base,
                        index,
                        scale,
                        imm,
                        disp,
                    },
                ))
            } else {
                let disp = parse_bytes(buf, offset + size, 4, true)? as i32 as i64;
                size += 4;
                Ok((
                    size,
                    Operand::RegMem {
                        reg: reg_base + rm as u32,
                        tsize: opersize,
                        disp,
                    },
                ))
            }
        }
        _ => unreachable!("mod is a 2-bit field"),
    }
}

/// Parse a SIB byte at `offset`. Returns `(bytes_consumed, scale, index,
/// base, imm)`; `index == 4` is normalized to `None`, and `base == 5`
/// under `mod == 0` is normalized to `None` with a trailing unsigned
/// 32-bit displacement captured in `imm`.
pub fn parse_sib(
    buf: &[u8],
    offset: usize,
    md: u8,
) -> Result<(usize, u8, Option<RegId>, Option<RegId>, Option<u32>)> {
    let byte = parse_bytes(buf, offset, 1, false)? as u8;
    let scale = scale_for(byte >> 6);
    let mut index: Option<RegId> = Some(((byte >> 3) & 0x7) as u32);
    let mut base: Option<RegId> = Some((byte & 0x7) as u32);
    let mut imm = None;
    let mut size = 1usize;

    if index == Some(4) {
        index = None;
    }

    if base == Some(5) && md == 0 {
        base = None;
        imm = Some(parse_bytes(buf, offset + size, 4, false)? as u32);
        size += 4;
    }

    Ok((size, scale, index, base, imm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::{REG_EAX, REG_ESP};

    #[test]
    fn mod3_is_pure_register() {
        let buf = [0xc0]; // mod=3 reg=0 rm=0
        let (size, oper) = extended_parse_modrm(&buf, 0, 4, 0).unwrap();
        assert_eq!(size, 1);
        assert_eq!(oper, Operand::Reg { reg: REG_EAX, tsize: 4 });
    }

    #[test]
    fn mod0_rm5_is_absolute_disp32() {
        let buf = [0x05, 0x00, 0x00, 0x40, 0x00]; // mod=0 rm=5, imm32
        let (size, oper) = extended_parse_modrm(&buf, 0, 4, 0).unwrap();
        assert_eq!(size, 5);
        assert_eq!(oper, Operand::ImmMem { addr: 0x0040_0000, tsize: 4 });
    }

    #[test]
    fn mod1_rm4_is_sib_plus_disp8() {
        // mod=1 reg=0 rm=4 -> 0x44; sib byte scale=0 index=4(none) base=4(esp) -> 0x24; disp8=0x08
        let buf = [0x44, 0x24, 0x08];
        let (size, oper) = extended_parse_modrm(&buf, 0, 4, 0).unwrap();
        assert_eq!(size, 3);
        assert_eq!(
            oper,
            Operand::Sib { tsize: 4, base: Some(REG_ESP), index: None, scale: 1, imm: None, disp: 8 }
        );
    }

    #[test]
    fn mod0_rm4_sib_base5_is_absolute_disp32() {
        // mod=0 reg=0 rm=4 -> 0x04; sib base=5 index=4(none) scale=0 -> 0x05; imm32
        let buf = [0x04, 0x05, 0x00, 0x00, 0x40, 0x00];
        let (size, oper) = extended_parse_modrm(&buf, 0, 4, 0).unwrap();
        assert_eq!(size, 6);
        assert_eq!(
            oper,
            Operand::Sib { tsize: 4, base: None, index: None, scale: 1, imm: Some(0x0040_0000), disp: 0 }
        );
    }

    #[test]
    fn truncated_modrm_errors() {
        let buf: [u8; 0] = [];
        assert!(extended_parse_modrm(&buf, 0, 4, 0).is_err());
    }

    #[test]
    fn sib_index_sentinel_normalized_to_none() {
        let buf = [0x24]; // scale=0 index=4 base=4
        let (_, _scale, index, base, _imm) = parse_sib(&buf, 0, 0).unwrap();
        assert_eq!(index, None);
        assert_eq!(base, Some(REG_ESP));
    }
}
