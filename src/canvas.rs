//! The rendering canvas: symbol lookup and text sinks consulted while
//! turning a decoded `Opcode` into human-readable text.
//!
//! A canvas is assumed single-threaded by convention — one canvas per
//! render call — unlike the opcode tables and register context, which
//! are shared read-only across decode calls from any number of
//! threads.

/// Symbol-name lookups a canvas offers while rendering operands.
pub trait SymbolHints {
    /// A human-readable name for a symbol at `va`, if one is known.
    fn sym_by_addr(&self, va: u64) -> Option<String>;

    /// A rendering hint for the operand at `idx` of the instruction at
    /// `va` (e.g. a jump-table entry label), if one has been computed
    /// out of band. When present, this replaces the displacement or
    /// absolute-address term that would otherwise be rendered for that
    /// operand — except for register operands, which always render
    /// their register name regardless of any hint at their position.
    fn sym_hint(&self, va: u64, idx: usize) -> Option<String>;
}

/// Memory-validity check a canvas offers while rendering operands.
pub trait MemValidity {
    fn is_valid_pointer(&self, addr: u64) -> bool;
}

/// Text sink an `Opcode` renders itself into.
pub trait Canvas {
    fn add_text(&mut self, text: &str);
    fn add_name_text(&mut self, text: &str, typename: Option<&str>);
    fn add_va_text(&mut self, text: &str, va: Option<u64>);

    fn syms(&self) -> &dyn SymbolHints;
    fn mem(&self) -> &dyn MemValidity;
}

/// Render an address as its symbol name if known, otherwise as an
/// 8-digit zero-padded hex literal.
pub fn addr_to_name(syms: &dyn SymbolHints, va: u64) -> String {
    match syms.sym_by_addr(va) {
        Some(name) => name,
        None => format!("0x{:08x}", va),
    }
}
