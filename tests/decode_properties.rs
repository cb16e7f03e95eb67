//! Property tests for the testable properties in the crate's
//! specification: size conservation, prefix idempotence, the
//! sign-extension and PC-relative invariants, and the SIB scale
//! domain.
//!
//! Grounded on `tests/fuzz_props.rs` in the `aero-cpu-decoder` example
//! crate: a `proptest!` block driving the public `disasm` entry point
//! with randomized byte buffers and asserting it never panics.

use ia32_decode::decoder::disasm;
use ia32_decode::operand::Operand;
use ia32_decode::regs::{BasicRegisterContext, REG_EAX};
use proptest::prelude::*;

proptest! {
    /// Decoding arbitrary bytes must never panic; any successful
    /// decode's reported size must fit within the buffer it was read
    /// from (size conservation).
    #[test]
    fn decode_never_panics_and_size_fits_buffer(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let res = disasm(&bytes, 0, 0x1000);
        if let Ok(op) = res {
            prop_assert!(op.size as usize >= 1);
            prop_assert!(op.size as usize <= bytes.len());
        }
    }

    /// Feeding the decoder again at `offset + size` after a successful
    /// decode must not itself panic (the other half of size
    /// conservation: the next call starts from a byte-accurate cursor).
    #[test]
    fn decode_resumes_cleanly_after_success(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        if let Ok(op) = disasm(&bytes, 0, 0x1000) {
            let _ = disasm(&bytes, op.size as usize, 0x1000 + op.size as u64);
        }
    }

    /// SIB scale domain: every encoded 2-bit scale resolves to one of
    /// {1,2,4,8}, and a `None` index never decodes to the encoded
    /// sentinel value 4.
    #[test]
    fn sib_scale_domain_holds(encoded in 0u8..4) {
        let buf = [((encoded << 6) | (4 << 3) | 0x4) as u8, 0x44, 0x24];
        let (_, oper) = ia32_decode::modrm::extended_parse_modrm(&buf, 0, 4, 0).unwrap();
        if let Operand::Sib { scale, index, .. } = oper {
            prop_assert!(matches!(scale, 1 | 2 | 4 | 8));
            prop_assert_eq!(index, None);
        } else {
            prop_assert!(false, "expected a Sib operand");
        }
    }

    /// PC-relative invariant: `value(op) == op.va + op.size + delta`
    /// for every delta a signed byte or dword displacement can encode.
    #[test]
    fn pcrel_invariant_holds(delta in any::<i32>(), va in any::<u32>(), size in 1u8..16) {
        let op = ia32_decode::opcode::Opcode {
            va: va as u64,
            opcode_id: ia32_decode::tables::ids::BRANCH,
            mnem: "jmp",
            prefixes: 0,
            size,
            operands: vec![],
            iflags: 0,
        };
        let oper = Operand::PcRel { delta: delta as i64, tsize: 4 };
        let expected = (op.va as i64).wrapping_add(op.size as i64).wrapping_add(delta as i64) as u64;
        prop_assert_eq!(oper.value(&op, None), Some(expected));
    }

    /// Sign-extension invariant: for an `Imm` with `tsize == 1` under
    /// an opcode id in the display sign-extend set, with a wider first
    /// operand, the rendered text matches `sign_extend(v, 1, op0.tsize)`
    /// read as an *unsigned* value through the usual hex/decimal rule,
    /// while the stored value is untouched.
    #[test]
    fn sign_extend_invariant_holds(byte in any::<u8>()) {
        let op = ia32_decode::opcode::Opcode {
            va: 0x1000,
            opcode_id: ia32_decode::tables::ids::SUB,
            mnem: "sub",
            prefixes: 0,
            size: 3,
            operands: vec![
                Operand::Reg { reg: REG_EAX, tsize: 4 },
                Operand::Imm { value: byte as u64, tsize: 1 },
            ],
            iflags: 0,
        };
        let rendered = op.repr_operand(1, &BasicRegisterContext);
        let extended = ia32_decode::bits::sign_extend(byte as u64, 1, 4);
        let expected = if extended > 4096 { format!("0x{:08x}", extended) } else { extended.to_string() };
        prop_assert_eq!(rendered, expected);
        prop_assert_eq!(op.operands[1], Operand::Imm { value: byte as u64, tsize: 1 });
    }

    /// Prefix idempotence: absorbing the same set of prefix bytes in
    /// any order yields an identical decoded instruction.
    #[test]
    fn prefix_idempotence_holds(lock_first in any::<bool>()) {
        let tail = [0x01u8, 0x0d, 0x00, 0x00, 0x40, 0x00];
        let mut a = vec![0xf0u8, 0x3e];
        let mut b = vec![0x3eu8, 0xf0];
        if !lock_first {
            a.swap(0, 1);
            b.swap(0, 1);
        }
        a.extend_from_slice(&tail);
        b.extend_from_slice(&tail);
        let op_a = disasm(&a, 0, 0x1000).unwrap();
        let op_b = disasm(&b, 0, 0x1000).unwrap();
        prop_assert_eq!(op_a.prefixes, op_b.prefixes);
        prop_assert_eq!(op_a.operands, op_b.operands);
        prop_assert_eq!(op_a.mnem, op_b.mnem);
    }
}
