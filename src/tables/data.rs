//! Opcode table contents.
//!
//! This is external, versioned *data* per the schema fixed in
//! `tables::mod` — the real Intel primary and secondary (`0x0f`-escape)
//! opcode maps run to several thousand entries and a handful of
//! SSE/3DNow! operand banks this crate's Non-goals explicitly leave to
//! the table-data maintainer, not the decode core. What follows is a
//! representative subset: real, recognizable x86 mnemonics chosen to
//! exercise every addressing-method letter, the group-table (reg-field
//! sub-dispatch) shape, and the six worked decode scenarios, without
//! attempting to replicate the full Intel map.
//!
//! Table indices are part of this data's contract with `decoder.rs`
//! (which hard-codes `ROOT` as the initial table) — they are otherwise
//! opaque and only meaningful via the named constants below.

use super::{AddrMethod, Entry, OpType, OpVal, OperandDesc, Table};
use crate::regs::{
    META_LOW8, REG_EAX, REG_ECX, REG_EDX, REG_EBX, REG_ESP, REG_EBP, REG_ESI, REG_EDI,
};
use crate::tables::ids;

pub const ROOT: usize = 0;
pub const SECONDARY: usize = 1;
pub const GROUP_80: usize = 2;
pub const GROUP_81: usize = 3;
pub const GROUP_83: usize = 4;
pub const GROUP_C6: usize = 5;
pub const GROUP_C7: usize = 6;
pub const GROUP_D1: usize = 7;
pub const GROUP_F6: usize = 8;
pub const GROUP_F7: usize = 9;
pub const GROUP_FE: usize = 10;
pub const GROUP_FF: usize = 11;
pub const GROUP_0F00: usize = 12;
pub const GROUP_0F01: usize = 13;

const AL: u32 = REG_EAX | META_LOW8;

const fn eg(op_type: OpType) -> [OperandDesc; 3] {
    [
        OperandDesc::method(AddrMethod::E, op_type),
        OperandDesc::method(AddrMethod::G, op_type),
        OperandDesc::UNUSED,
    ]
}

const fn ge(op_type: OpType) -> [OperandDesc; 3] {
    [
        OperandDesc::method(AddrMethod::G, op_type),
        OperandDesc::method(AddrMethod::E, op_type),
        OperandDesc::UNUSED,
    ]
}

const fn entry(opcode_id: u32, mnem: &'static str, operands: [OperandDesc; 3]) -> Entry {
    Entry { next_table: None, opcode_id, mnem, operands }
}

const fn unary_e(opcode_id: u32, mnem: &'static str, op_type: OpType) -> Entry {
    entry(opcode_id, mnem, [OperandDesc::method(AddrMethod::E, op_type), OperandDesc::UNUSED, OperandDesc::UNUSED])
}

const fn no_operands(opcode_id: u32, mnem: &'static str) -> Entry {
    entry(opcode_id, mnem, [OperandDesc::UNUSED; 3])
}

const fn build_root() -> [Entry; 256] {
    let mut t = [Entry::INVALID; 256];

    // ALU families: representative Eb,Gb / Ev,Gv / Gv,Ev forms.
    t[0x00] = entry(ids::ADD, "add", eg(OpType::Byte));
    t[0x01] = entry(ids::ADD, "add", eg(OpType::Full));
    t[0x02] = entry(ids::ADD, "add", ge(OpType::Byte));
    t[0x03] = entry(ids::ADD, "add", ge(OpType::Full));
    t[0x04] = entry(ids::ADD, "add", [
        OperandDesc::embedded_reg(AL, OpType::Byte),
        OperandDesc::method(AddrMethod::I, OpType::Byte),
        OperandDesc::UNUSED,
    ]);
    t[0x05] = entry(ids::ADD, "add", [
        OperandDesc::embedded_reg(REG_EAX, OpType::Full),
        OperandDesc::method(AddrMethod::I, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0x08] = entry(ids::OR, "or", eg(OpType::Byte));
    t[0x09] = entry(ids::OR, "or", eg(OpType::Full));
    t[0x10] = entry(ids::ADC, "adc", eg(OpType::Full));
    t[0x18] = entry(ids::SBB, "sbb", eg(OpType::Full));
    t[0x20] = entry(ids::AND, "and", eg(OpType::Full));
    t[0x28] = entry(ids::SUB, "sub", eg(OpType::Full));
    t[0x2b] = entry(ids::SUB, "sub", ge(OpType::Full));
    t[0x30] = entry(ids::XOR, "xor", eg(OpType::Full));
    t[0x38] = entry(ids::CMP, "cmp", eg(OpType::Full));
    t[0x3b] = entry(ids::CMP, "cmp", ge(OpType::Full));
    t[0x3c] = entry(ids::CMP, "cmp", [
        OperandDesc::embedded_reg(AL, OpType::Byte),
        OperandDesc::method(AddrMethod::I, OpType::Byte),
        OperandDesc::UNUSED,
    ]);

    // PUSH/POP r32, one entry per embedded GPR.
    t[0x50] = entry(ids::PUSH, "push", [OperandDesc::embedded_reg(REG_EAX, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x51] = entry(ids::PUSH, "push", [OperandDesc::embedded_reg(REG_ECX, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x52] = entry(ids::PUSH, "push", [OperandDesc::embedded_reg(REG_EDX, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x53] = entry(ids::PUSH, "push", [OperandDesc::embedded_reg(REG_EBX, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x54] = entry(ids::PUSH, "push", [OperandDesc::embedded_reg(REG_ESP, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x55] = entry(ids::PUSH, "push", [OperandDesc::embedded_reg(REG_EBP, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x56] = entry(ids::PUSH, "push", [OperandDesc::embedded_reg(REG_ESI, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x57] = entry(ids::PUSH, "push", [OperandDesc::embedded_reg(REG_EDI, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x58] = entry(ids::POP, "pop", [OperandDesc::embedded_reg(REG_EAX, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x59] = entry(ids::POP, "pop", [OperandDesc::embedded_reg(REG_ECX, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x5a] = entry(ids::POP, "pop", [OperandDesc::embedded_reg(REG_EDX, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x5b] = entry(ids::POP, "pop", [OperandDesc::embedded_reg(REG_EBX, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x5c] = entry(ids::POP, "pop", [OperandDesc::embedded_reg(REG_ESP, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x5d] = entry(ids::POP, "pop", [OperandDesc::embedded_reg(REG_EBP, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x5e] = entry(ids::POP, "pop", [OperandDesc::embedded_reg(REG_ESI, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x5f] = entry(ids::POP, "pop", [OperandDesc::embedded_reg(REG_EDI, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);

    t[0x66] = Entry::hop(SECONDARY); // 0x66 0x0f composite, see decoder::step_table.
    t[0x68] = entry(ids::PUSH, "push", [OperandDesc::method(AddrMethod::I, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x6a] = entry(ids::PUSH, "push", [OperandDesc::method(AddrMethod::I, OpType::Byte), OperandDesc::UNUSED, OperandDesc::UNUSED]);

    t[0x70] = entry(ids::BRANCHCC, "jo", [OperandDesc::method(AddrMethod::J, OpType::Byte), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x74] = entry(ids::BRANCHCC, "jz", [OperandDesc::method(AddrMethod::J, OpType::Byte), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x75] = entry(ids::BRANCHCC, "jnz", [OperandDesc::method(AddrMethod::J, OpType::Byte), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0x7c] = entry(ids::BRANCHCC, "jl", [OperandDesc::method(AddrMethod::J, OpType::Byte), OperandDesc::UNUSED, OperandDesc::UNUSED]);

    t[0x80] = Entry::hop(GROUP_80);
    t[0x81] = Entry::hop(GROUP_81);
    t[0x83] = Entry::hop(GROUP_83);

    t[0x8c] = entry(ids::MOV, "mov", [
        OperandDesc::method(AddrMethod::E, OpType::Word),
        OperandDesc::method(AddrMethod::S, OpType::Word),
        OperandDesc::UNUSED,
    ]);
    t[0x8e] = entry(ids::MOV, "mov", [
        OperandDesc::method(AddrMethod::S, OpType::Word),
        OperandDesc::method(AddrMethod::E, OpType::Word),
        OperandDesc::UNUSED,
    ]);
    t[0x88] = entry(ids::MOV, "mov", eg(OpType::Byte));
    t[0x89] = entry(ids::MOV, "mov", eg(OpType::Full));
    t[0x8a] = entry(ids::MOV, "mov", ge(OpType::Byte));
    t[0x8b] = entry(ids::MOV, "mov", ge(OpType::Full));
    t[0x8d] = entry(ids::LEA, "lea", [
        OperandDesc::method(AddrMethod::G, OpType::Full),
        OperandDesc::method(AddrMethod::M, OpType::Full),
        OperandDesc::UNUSED,
    ]);

    t[0x90] = no_operands(ids::NOP, "nop");
    t[0x98] = no_operands(ids::CWDE, "cwde");
    t[0x99] = no_operands(ids::CDQ, "cdq");
    t[0x9c] = no_operands(ids::PUSHFD, "pushfd");
    t[0x9d] = no_operands(ids::POPFD, "popfd");

    t[0xa0] = entry(ids::MOV, "mov", [
        OperandDesc::embedded_reg(AL, OpType::Byte),
        OperandDesc::method(AddrMethod::O, OpType::Byte),
        OperandDesc::UNUSED,
    ]);
    t[0xa1] = entry(ids::MOV, "mov", [
        OperandDesc::embedded_reg(REG_EAX, OpType::Full),
        OperandDesc::method(AddrMethod::O, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xa2] = entry(ids::MOV, "mov", [
        OperandDesc::method(AddrMethod::O, OpType::Byte),
        OperandDesc::embedded_reg(AL, OpType::Byte),
        OperandDesc::UNUSED,
    ]);
    t[0xa3] = entry(ids::MOV, "mov", [
        OperandDesc::method(AddrMethod::O, OpType::Full),
        OperandDesc::embedded_reg(REG_EAX, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xa4] = entry(ids::MOVS, "movsb", [
        OperandDesc::method(AddrMethod::Y, OpType::Byte),
        OperandDesc::method(AddrMethod::X, OpType::Byte),
        OperandDesc::UNUSED,
    ]);
    t[0xa5] = entry(ids::MOVS, "movsd", [
        OperandDesc::method(AddrMethod::Y, OpType::Full),
        OperandDesc::method(AddrMethod::X, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xa6] = entry(ids::CMPS, "cmpsb", [
        OperandDesc::method(AddrMethod::X, OpType::Byte),
        OperandDesc::method(AddrMethod::Y, OpType::Byte),
        OperandDesc::UNUSED,
    ]);
    t[0xa7] = entry(ids::CMPS, "cmpsd", [
        OperandDesc::method(AddrMethod::X, OpType::Full),
        OperandDesc::method(AddrMethod::Y, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xaa] = entry(ids::STOS, "stosb", [
        OperandDesc::method(AddrMethod::Y, OpType::Byte),
        OperandDesc::embedded_reg(AL, OpType::Byte),
        OperandDesc::UNUSED,
    ]);
    t[0xab] = entry(ids::STOS, "stosd", [
        OperandDesc::method(AddrMethod::Y, OpType::Full),
        OperandDesc::embedded_reg(REG_EAX, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xac] = entry(ids::LODS, "lodsb", [
        OperandDesc::embedded_reg(AL, OpType::Byte),
        OperandDesc::method(AddrMethod::X, OpType::Byte),
        OperandDesc::UNUSED,
    ]);
    t[0xad] = entry(ids::LODS, "lodsd", [
        OperandDesc::embedded_reg(REG_EAX, OpType::Full),
        OperandDesc::method(AddrMethod::X, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xae] = entry(ids::SCAS, "scasb", [
        OperandDesc::embedded_reg(AL, OpType::Byte),
        OperandDesc::method(AddrMethod::Y, OpType::Byte),
        OperandDesc::UNUSED,
    ]);
    t[0xaf] = entry(ids::SCAS, "scasd", [
        OperandDesc::embedded_reg(REG_EAX, OpType::Full),
        OperandDesc::method(AddrMethod::Y, OpType::Full),
        OperandDesc::UNUSED,
    ]);

    t[0xb0] = entry(ids::MOV, "mov", [OperandDesc::embedded_reg(REG_EAX | META_LOW8, OpType::Byte), OperandDesc::method(AddrMethod::I, OpType::Byte), OperandDesc::UNUSED]);
    t[0xb8] = entry(ids::MOV, "mov", [
        OperandDesc::embedded_reg(REG_EAX, OpType::Full),
        OperandDesc::method(AddrMethod::I, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xb9] = entry(ids::MOV, "mov", [
        OperandDesc::embedded_reg(REG_ECX, OpType::Full),
        OperandDesc::method(AddrMethod::I, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xba] = entry(ids::MOV, "mov", [
        OperandDesc::embedded_reg(REG_EDX, OpType::Full),
        OperandDesc::method(AddrMethod::I, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xbb] = entry(ids::MOV, "mov", [
        OperandDesc::embedded_reg(REG_EBX, OpType::Full),
        OperandDesc::method(AddrMethod::I, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xbc] = entry(ids::MOV, "mov", [
        OperandDesc::embedded_reg(REG_ESP, OpType::Full),
        OperandDesc::method(AddrMethod::I, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xbd] = entry(ids::MOV, "mov", [
        OperandDesc::embedded_reg(REG_EBP, OpType::Full),
        OperandDesc::method(AddrMethod::I, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xbe] = entry(ids::MOV, "mov", [
        OperandDesc::embedded_reg(REG_ESI, OpType::Full),
        OperandDesc::method(AddrMethod::I, OpType::Full),
        OperandDesc::UNUSED,
    ]);
    t[0xbf] = entry(ids::MOV, "mov", [
        OperandDesc::embedded_reg(REG_EDI, OpType::Full),
        OperandDesc::method(AddrMethod::I, OpType::Full),
        OperandDesc::UNUSED,
    ]);

    t[0x9a] = entry(ids::CALL, "callf", [OperandDesc::method(AddrMethod::A, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0xc2] = entry(ids::RET, "ret", [OperandDesc::method(AddrMethod::I, OpType::Word), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0xc3] = no_operands(ids::RET, "ret");
    t[0xc6] = Entry::hop(GROUP_C6);
    t[0xc7] = Entry::hop(GROUP_C7);
    t[0xc9] = no_operands(ids::LEAVE, "leave");
    t[0xcc] = no_operands(ids::INT3, "int3");
    t[0xd1] = Entry::hop(GROUP_D1);

    t[0xe8] = entry(ids::CALL, "call", [OperandDesc::method(AddrMethod::J, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0xe9] = entry(ids::BRANCH, "jmp", [OperandDesc::method(AddrMethod::J, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0xeb] = entry(ids::BRANCH, "jmp", [OperandDesc::method(AddrMethod::J, OpType::Byte), OperandDesc::UNUSED, OperandDesc::UNUSED]);

    t[0xf4] = no_operands(ids::HLT, "hlt");
    t[0xf6] = Entry::hop(GROUP_F6);
    t[0xf7] = Entry::hop(GROUP_F7);
    t[0xfe] = Entry::hop(GROUP_FE);
    t[0xff] = Entry::hop(GROUP_FF);

    t[0x0f] = Entry::hop(SECONDARY);

    t
}

const fn build_secondary() -> [Entry; 256] {
    let mut t = [Entry::INVALID; 256];

    t[0x00] = Entry::hop(GROUP_0F00);
    t[0x01] = Entry::hop(GROUP_0F01);
    t[0x06] = no_operands(ids::CLTS, "clts");
    t[0x08] = no_operands(ids::INVD, "invd");
    t[0x09] = no_operands(ids::WBINVD, "wbinvd");
    t[0x1f] = unary_e(ids::NOP, "nop", OpType::Full);
    t[0x20] = entry(ids::MOV, "mov", [
        OperandDesc::method(AddrMethod::R, OpType::Dword),
        OperandDesc::method(AddrMethod::C, OpType::Dword),
        OperandDesc::UNUSED,
    ]);
    t[0x22] = entry(ids::MOV, "mov", [
        OperandDesc::method(AddrMethod::C, OpType::Dword),
        OperandDesc::method(AddrMethod::R, OpType::Dword),
        OperandDesc::UNUSED,
    ]);
    t[0x21] = entry(ids::MOV, "mov", [
        OperandDesc::method(AddrMethod::R, OpType::Dword),
        OperandDesc::method(AddrMethod::D, OpType::Dword),
        OperandDesc::UNUSED,
    ]);
    t[0x23] = entry(ids::MOV, "mov", [
        OperandDesc::method(AddrMethod::D, OpType::Dword),
        OperandDesc::method(AddrMethod::R, OpType::Dword),
        OperandDesc::UNUSED,
    ]);
    t[0x24] = entry(ids::MOV, "mov", [
        OperandDesc::method(AddrMethod::R, OpType::Dword),
        OperandDesc::method(AddrMethod::U, OpType::Dword),
        OperandDesc::UNUSED,
    ]);
    t[0x26] = entry(ids::MOV, "mov", [
        OperandDesc::method(AddrMethod::U, OpType::Dword),
        OperandDesc::method(AddrMethod::R, OpType::Dword),
        OperandDesc::UNUSED,
    ]);
    t[0x30] = no_operands(ids::WRMSR, "wrmsr");
    t[0x31] = no_operands(ids::RDTSC, "rdtsc");
    t[0x32] = no_operands(ids::RDMSR, "rdmsr");
    t[0x34] = no_operands(ids::SYSENTER, "sysenter");
    t[0x35] = no_operands(ids::SYSEXIT, "sysexit");
    t[0xa2] = no_operands(ids::CPUID, "cpuid");
    t[0xb6] = entry(ids::MOVZX, "movzx", [
        OperandDesc::method(AddrMethod::G, OpType::Full),
        OperandDesc::method(AddrMethod::E, OpType::Byte),
        OperandDesc::UNUSED,
    ]);
    t[0xb7] = entry(ids::MOVZX, "movzx", [
        OperandDesc::method(AddrMethod::G, OpType::Full),
        OperandDesc::method(AddrMethod::E, OpType::Word),
        OperandDesc::UNUSED,
    ]);
    t[0xbe] = entry(ids::MOVSX, "movsx", [
        OperandDesc::method(AddrMethod::G, OpType::Full),
        OperandDesc::method(AddrMethod::E, OpType::Byte),
        OperandDesc::UNUSED,
    ]);
    t[0xbf] = entry(ids::MOVSX, "movsx", [
        OperandDesc::method(AddrMethod::G, OpType::Full),
        OperandDesc::method(AddrMethod::E, OpType::Word),
        OperandDesc::UNUSED,
    ]);
    t[0xc8] = entry(ids::BSWAP, "bswap", [OperandDesc::embedded_reg(REG_EAX, OpType::Full), OperandDesc::UNUSED, OperandDesc::UNUSED]);
    t[0xd7] = entry(ids::PMOVMSKB, "pmovmskb", [
        OperandDesc::method(AddrMethod::G, OpType::Dword),
        OperandDesc::method(AddrMethod::N, OpType::Qword),
        OperandDesc::UNUSED,
    ]);
    t[0x6e] = entry(ids::MOVD, "movd", [
        OperandDesc::method(AddrMethod::P, OpType::Qword),
        OperandDesc::method(AddrMethod::E, OpType::Dword),
        OperandDesc::UNUSED,
    ]);
    t[0x7e] = entry(ids::MOVD, "movd", [
        OperandDesc::method(AddrMethod::E, OpType::Dword),
        OperandDesc::method(AddrMethod::P, OpType::Qword),
        OperandDesc::UNUSED,
    ]);
    t[0x6f] = entry(ids::MOVQ, "movq", [
        OperandDesc::method(AddrMethod::P, OpType::Qword),
        OperandDesc::method(AddrMethod::Q, OpType::Qword),
        OperandDesc::UNUSED,
    ]);
    t[0x28] = entry(ids::MOVAPS, "movaps", [
        OperandDesc::method(AddrMethod::V, OpType::Oword),
        OperandDesc::method(AddrMethod::W, OpType::Oword),
        OperandDesc::UNUSED,
    ]);

    t
}

const fn alu_group(ids_row: [u32; 8], mnems: [&'static str; 8], op_type: OpType, imm_type: OpType) -> [Entry; 8] {
    [
        entry(ids_row[0], mnems[0], [OperandDesc::method(AddrMethod::E, op_type), OperandDesc::method(AddrMethod::I, imm_type), OperandDesc::UNUSED]),
        entry(ids_row[1], mnems[1], [OperandDesc::method(AddrMethod::E, op_type), OperandDesc::method(AddrMethod::I, imm_type), OperandDesc::UNUSED]),
        entry(ids_row[2], mnems[2], [OperandDesc::method(AddrMethod::E, op_type), OperandDesc::method(AddrMethod::I, imm_type), OperandDesc::UNUSED]),
        entry(ids_row[3], mnems[3], [OperandDesc::method(AddrMethod::E, op_type), OperandDesc::method(AddrMethod::I, imm_type), OperandDesc::UNUSED]),
        entry(ids_row[4], mnems[4], [OperandDesc::method(AddrMethod::E, op_type), OperandDesc::method(AddrMethod::I, imm_type), OperandDesc::UNUSED]),
        entry(ids_row[5], mnems[5], [OperandDesc::method(AddrMethod::E, op_type), OperandDesc::method(AddrMethod::I, imm_type), OperandDesc::UNUSED]),
        entry(ids_row[6], mnems[6], [OperandDesc::method(AddrMethod::E, op_type), OperandDesc::method(AddrMethod::I, imm_type), OperandDesc::UNUSED]),
        entry(ids_row[7], mnems[7], [OperandDesc::method(AddrMethod::E, op_type), OperandDesc::method(AddrMethod::I, imm_type), OperandDesc::UNUSED]),
    ]
}

const ALU_IDS: [u32; 8] = [ids::ADD, ids::OR, ids::ADC, ids::SBB, ids::AND, ids::SUB, ids::XOR, ids::CMP];
const ALU_MNEMS: [&str; 8] = ["add", "or", "adc", "sbb", "and", "sub", "xor", "cmp"];

const fn build_group_80() -> [Entry; 8] {
    alu_group(ALU_IDS, ALU_MNEMS, OpType::Byte, OpType::Byte)
}

const fn build_group_81() -> [Entry; 8] {
    alu_group(ALU_IDS, ALU_MNEMS, OpType::Full, OpType::Full)
}

const fn build_group_83() -> [Entry; 8] {
    // Ev, Ib: the immediate is read as a single byte but sign-extended
    // for display against a wider first operand for ADD/SUB/AND, per
    // `Opcode::SIGN_EXTEND_DISPLAY`.
    alu_group(ALU_IDS, ALU_MNEMS, OpType::Full, OpType::Byte)
}

const fn build_group_c6() -> [Entry; 8] {
    let mut t = [Entry::INVALID; 8];
    t[0] = entry(ids::MOV, "mov", [OperandDesc::method(AddrMethod::E, OpType::Byte), OperandDesc::method(AddrMethod::I, OpType::Byte), OperandDesc::UNUSED]);
    t
}

const fn build_group_c7() -> [Entry; 8] {
    let mut t = [Entry::INVALID; 8];
    t[0] = entry(ids::MOV, "mov", [OperandDesc::method(AddrMethod::E, OpType::Full), OperandDesc::method(AddrMethod::I, OpType::Full), OperandDesc::UNUSED]);
    t
}

const fn build_group_d1() -> [Entry; 8] {
    // Shift-by-1 group: Ev, with the shift count embedded as the
    // literal immediate 1 rather than read from the stream.
    let imm1 = OperandDesc::embedded_imm(1, OpType::Byte);
    [
        entry(ids::ROL, "rol", [OperandDesc::method(AddrMethod::E, OpType::Full), imm1, OperandDesc::UNUSED]),
        entry(ids::ROR, "ror", [OperandDesc::method(AddrMethod::E, OpType::Full), imm1, OperandDesc::UNUSED]),
        entry(ids::RCL, "rcl", [OperandDesc::method(AddrMethod::E, OpType::Full), imm1, OperandDesc::UNUSED]),
        entry(ids::RCR, "rcr", [OperandDesc::method(AddrMethod::E, OpType::Full), imm1, OperandDesc::UNUSED]),
        entry(ids::SHL, "shl", [OperandDesc::method(AddrMethod::E, OpType::Full), imm1, OperandDesc::UNUSED]),
        entry(ids::SHR, "shr", [OperandDesc::method(AddrMethod::E, OpType::Full), imm1, OperandDesc::UNUSED]),
        Entry::INVALID,
        entry(ids::SAR, "sar", [OperandDesc::method(AddrMethod::E, OpType::Full), imm1, OperandDesc::UNUSED]),
    ]
}

const fn build_group_f6() -> [Entry; 8] {
    [
        entry(ids::TEST, "test", [OperandDesc::method(AddrMethod::E, OpType::Byte), OperandDesc::method(AddrMethod::I, OpType::Byte), OperandDesc::UNUSED]),
        entry(ids::TEST, "test", [OperandDesc::method(AddrMethod::E, OpType::Byte), OperandDesc::method(AddrMethod::I, OpType::Byte), OperandDesc::UNUSED]),
        unary_e(ids::NOT, "not", OpType::Byte),
        unary_e(ids::NEG, "neg", OpType::Byte),
        unary_e(ids::MUL, "mul", OpType::Byte),
        unary_e(ids::IMUL, "imul", OpType::Byte),
        unary_e(ids::DIV, "div", OpType::Byte),
        unary_e(ids::IDIV, "idiv", OpType::Byte),
    ]
}

const fn build_group_f7() -> [Entry; 8] {
    [
        entry(ids::TEST, "test", [OperandDesc::method(AddrMethod::E, OpType::Full), OperandDesc::method(AddrMethod::I, OpType::Full), OperandDesc::UNUSED]),
        entry(ids::TEST, "test", [OperandDesc::method(AddrMethod::E, OpType::Full), OperandDesc::method(AddrMethod::I, OpType::Full), OperandDesc::UNUSED]),
        unary_e(ids::NOT, "not", OpType::Full),
        unary_e(ids::NEG, "neg", OpType::Full),
        unary_e(ids::MUL, "mul", OpType::Full),
        unary_e(ids::IMUL, "imul", OpType::Full),
        unary_e(ids::DIV, "div", OpType::Full),
        unary_e(ids::IDIV, "idiv", OpType::Full),
    ]
}

const fn build_group_fe() -> [Entry; 8] {
    let mut t = [Entry::INVALID; 8];
    t[0] = unary_e(ids::INC, "inc", OpType::Byte);
    t[1] = unary_e(ids::DEC, "dec", OpType::Byte);
    t
}

const fn build_group_ff() -> [Entry; 8] {
    let mut t = [Entry::INVALID; 8];
    t[0] = unary_e(ids::INC, "inc", OpType::Full);
    t[1] = unary_e(ids::DEC, "dec", OpType::Full);
    t[2] = unary_e(ids::CALL, "call", OpType::Full);
    t[4] = unary_e(ids::BRANCH, "jmp", OpType::Full);
    t[6] = unary_e(ids::PUSH, "push", OpType::Full);
    t
}

const fn build_group_0f00() -> [Entry; 8] {
    let mut t = [Entry::INVALID; 8];
    t[0] = unary_e(ids::SLDT, "sldt", OpType::Word);
    t[1] = unary_e(ids::STR, "str", OpType::Word);
    t[2] = unary_e(ids::LLDT, "lldt", OpType::Word);
    t[3] = unary_e(ids::LTR, "ltr", OpType::Word);
    t[4] = unary_e(ids::VERR, "verr", OpType::Word);
    t[5] = unary_e(ids::VERW, "verw", OpType::Word);
    t
}

const fn build_group_0f01() -> [Entry; 8] {
    let mut t = [Entry::INVALID; 8];
    t[0] = unary_e(ids::SGDT, "sgdt", OpType::Full);
    t[1] = unary_e(ids::SIDT, "sidt", OpType::Full);
    t[2] = unary_e(ids::LGDT, "lgdt", OpType::Full);
    t[3] = unary_e(ids::LIDT, "lidt", OpType::Full);
    t[4] = unary_e(ids::SMSW, "smsw", OpType::Word);
    t[6] = unary_e(ids::LMSW, "lmsw", OpType::Word);
    t[7] = unary_e(ids::INVLPG, "invlpg", OpType::Byte);
    t
}

static ROOT_ENTRIES: [Entry; 256] = build_root();
static SECONDARY_ENTRIES: [Entry; 256] = build_secondary();
static GROUP_80_ENTRIES: [Entry; 8] = build_group_80();
static GROUP_81_ENTRIES: [Entry; 8] = build_group_81();
static GROUP_83_ENTRIES: [Entry; 8] = build_group_83();
static GROUP_C6_ENTRIES: [Entry; 8] = build_group_c6();
static GROUP_C7_ENTRIES: [Entry; 8] = build_group_c7();
static GROUP_D1_ENTRIES: [Entry; 8] = build_group_d1();
static GROUP_F6_ENTRIES: [Entry; 8] = build_group_f6();
static GROUP_F7_ENTRIES: [Entry; 8] = build_group_f7();
static GROUP_FE_ENTRIES: [Entry; 8] = build_group_fe();
static GROUP_FF_ENTRIES: [Entry; 8] = build_group_ff();
static GROUP_0F00_ENTRIES: [Entry; 8] = build_group_0f00();
static GROUP_0F01_ENTRIES: [Entry; 8] = build_group_0f01();

const fn full_byte_table(entries: &'static [Entry]) -> Table {
    Table { shift: 0, mask: 0xff, sub: 0, max: 0xff, overflow: None, entries }
}

const fn reg_field_table(entries: &'static [Entry]) -> Table {
    Table { shift: 3, mask: 0x7, sub: 0, max: 0xff, overflow: None, entries }
}

/// The complete table forest, indexed by the constants above.
/// `decoder::disasm` always starts the walk at `TABLES[ROOT]`.
pub static TABLES: [Table; 14] = [
    full_byte_table(&ROOT_ENTRIES),
    full_byte_table(&SECONDARY_ENTRIES),
    reg_field_table(&GROUP_80_ENTRIES),
    reg_field_table(&GROUP_81_ENTRIES),
    reg_field_table(&GROUP_83_ENTRIES),
    reg_field_table(&GROUP_C6_ENTRIES),
    reg_field_table(&GROUP_C7_ENTRIES),
    reg_field_table(&GROUP_D1_ENTRIES),
    reg_field_table(&GROUP_F6_ENTRIES),
    reg_field_table(&GROUP_F7_ENTRIES),
    reg_field_table(&GROUP_FE_ENTRIES),
    reg_field_table(&GROUP_FF_ENTRIES),
    reg_field_table(&GROUP_0F00_ENTRIES),
    reg_field_table(&GROUP_0F01_ENTRIES),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_nop_is_terminal_full_mask() {
        let (table, e) = TABLES[ROOT].lookup(&TABLES, 0x90);
        assert_eq!(table.mask, 0xff);
        assert_eq!(e.opcode_id, ids::NOP);
    }

    #[test]
    fn root_0f_hops_to_secondary() {
        let (_, e) = TABLES[ROOT].lookup(&TABLES, 0x0f);
        assert_eq!(e.next_table, Some(SECONDARY));
    }

    #[test]
    fn group_83_reg_field_selects_without_consuming() {
        // ModR/M byte 0xf8 = mod 3, reg 7 (cmp), rm 0 -> group index 7.
        let (table, e) = TABLES[GROUP_83].lookup(&TABLES, 0xf8);
        assert_ne!(table.mask, 0xff);
        assert_eq!(e.opcode_id, ids::CMP);
    }

    #[test]
    fn group_ff_reg2_is_call_through_modrm() {
        let (_, e) = TABLES[GROUP_FF].lookup(&TABLES, 0x10); // reg field 2
        assert_eq!(e.opcode_id, ids::CALL);
    }
}
