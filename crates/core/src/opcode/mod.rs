//! Opcode tables for the DVI and PK command spaces.
//!
//! Every opcode is described declaratively: its byte value, display name,
//! fixed parameter shapes, and the kind of command it stands for. The two
//! tables are built once at startup into fixed 256-slot arrays; decoding is
//! an array lookup, never dynamic dispatch.
//!
//! Four-width opcode families (`set1..set4`, `right1..right4`, ...) are
//! declared once and expanded across their contiguous code range, the
//! parameter width growing with the code (`width = code - base + 1`).
//! Implied-operand ranges (`set_char_0..127`, `fnt_num_0..63`) carry their
//! operand in the opcode byte itself.

pub mod decoder;

pub use decoder::{Decoded, OpcodeDecoder};

use crate::stream::IntWidth;
use once_cell::sync::Lazy;
use smallvec::SmallVec;

use crate::error::{DviError, Result};

/// DVI container opcode values.
pub mod dvi_codes {
    pub const SET_CHAR_0: u8 = 0;
    pub const SET_CHAR_127: u8 = 127;
    pub const SET1: u8 = 128;
    pub const SET_RULE: u8 = 132;
    pub const PUT1: u8 = 133;
    pub const PUT_RULE: u8 = 137;
    pub const NOP: u8 = 138;
    pub const BOP: u8 = 139;
    pub const EOP: u8 = 140;
    pub const PUSH: u8 = 141;
    pub const POP: u8 = 142;
    pub const RIGHT1: u8 = 143;
    pub const W0: u8 = 147;
    pub const W1: u8 = 148;
    pub const X0: u8 = 152;
    pub const X1: u8 = 153;
    pub const DOWN1: u8 = 157;
    pub const Y0: u8 = 161;
    pub const Y1: u8 = 162;
    pub const Z0: u8 = 166;
    pub const Z1: u8 = 167;
    pub const FNT_NUM_0: u8 = 171;
    pub const FNT_NUM_63: u8 = 234;
    pub const FNT1: u8 = 235;
    pub const XXX1: u8 = 239;
    pub const FNT_DEF1: u8 = 243;
    pub const FNT_DEF4: u8 = 246;
    pub const PRE: u8 = 247;
    pub const POST: u8 = 248;
    pub const POST_POST: u8 = 249;

    /// Trailer padding byte closing the container.
    pub const TRAILER: u8 = 223;
    /// A valid container ends with at least this many trailer bytes.
    pub const MIN_TRAILER_RUN: usize = 4;
}

/// PK font opcode values.
pub mod pk_codes {
    /// Last flag byte introducing a character packet.
    pub const CHAR_MAX: u8 = 239;
    pub const XXX1: u8 = 240;
    pub const YYY: u8 = 244;
    pub const POST: u8 = 245;
    pub const NOP: u8 = 246;
    pub const PRE: u8 = 247;

    /// Format identification byte carried by the preamble.
    pub const ID: u8 = 89;
}

/// Recognized DVI format identification bytes.
pub const DVI_FORMATS: [u8; 3] = [2, 3, 5];

/// What a decoded opcode stands for. The decoder itself never interprets
/// this; the container parsers dispatch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeKind {
    // DVI container commands.
    SetCharImplied,
    SetChar,
    SetRule,
    PutChar,
    PutRule,
    Nop,
    Bop,
    Eop,
    Push,
    Pop,
    Right,
    MoveW,
    SetW,
    MoveX,
    SetX,
    Down,
    MoveY,
    SetY,
    MoveZ,
    SetZ,
    FontImplied,
    Font,
    /// Extension blob; the fixed parameter is the payload length.
    Special,
    /// Font declaration; the fixed parameter is the font id, the remaining
    /// fields are read by the container parser.
    FontDef,
    Pre,
    Post,
    PostPost,
    // PK font commands.
    PkChar,
    PkNumSpecial,
}

/// Immutable descriptor for one opcode byte.
#[derive(Debug, Clone)]
pub struct Opcode {
    pub code: u8,
    pub name: &'static str,
    pub params: SmallVec<[IntWidth; 2]>,
    pub kind: OpcodeKind,
    /// First code of the implied-operand range this opcode belongs to;
    /// equal to `code` outside such ranges.
    base: u8,
}

impl Opcode {
    /// Operand carried by the opcode byte itself (`set_char_i`, `fnt_num_i`).
    pub fn implied_operand(&self) -> u32 {
        u32::from(self.code - self.base)
    }
}

/// 256-slot opcode lookup table; unused codes stay undefined.
pub struct OpcodeTable {
    entries: [Option<Opcode>; 256],
}

impl OpcodeTable {
    fn new() -> Self {
        Self {
            entries: std::array::from_fn(|_| None),
        }
    }

    /// Resolve one opcode byte to its descriptor.
    pub fn lookup(&self, code: u8) -> Result<&Opcode> {
        self.entries[usize::from(code)]
            .as_ref()
            .ok_or(DviError::UnknownOpcode(code))
    }

    fn define(&mut self, opcode: Opcode) {
        let slot = &mut self.entries[usize::from(opcode.code)];
        debug_assert!(slot.is_none(), "opcode {} defined twice", opcode.code);
        *slot = Some(opcode);
    }

    /// Define a single opcode with fixed parameter shapes.
    fn op(&mut self, code: u8, name: &'static str, kind: OpcodeKind, params: &[IntWidth]) {
        self.define(Opcode {
            code,
            name,
            params: SmallVec::from_slice(params),
            kind,
            base: code,
        });
    }

    /// Define a range of parameterless opcodes whose operand is implied by
    /// the byte value (`operand = code - lo`).
    fn implied_range(&mut self, lo: u8, hi: u8, name: &'static str, kind: OpcodeKind) {
        for code in lo..=hi {
            self.define(Opcode {
                code,
                name,
                params: SmallVec::new(),
                kind,
                base: lo,
            });
        }
    }

    /// Expand a four-width family: opcode `base + i` takes one parameter of
    /// `i + 1` bytes.
    fn family(&mut self, base: u8, name: &'static str, kind: OpcodeKind, signed: bool) {
        for i in 0u8..4 {
            let width = IntWidth {
                bytes: i + 1,
                signed,
            };
            self.define(Opcode {
                code: base + i,
                name,
                params: SmallVec::from_slice(&[width]),
                kind,
                base: base + i,
            });
        }
    }
}

static DVI_TABLE: Lazy<OpcodeTable> = Lazy::new(build_dvi_table);
static PK_TABLE: Lazy<OpcodeTable> = Lazy::new(build_pk_table);

/// The DVI container opcode table.
pub fn dvi_opcodes() -> &'static OpcodeTable {
    &DVI_TABLE
}

/// The PK font opcode table.
pub fn pk_opcodes() -> &'static OpcodeTable {
    &PK_TABLE
}

fn build_dvi_table() -> OpcodeTable {
    use dvi_codes::*;
    use OpcodeKind::*;

    const S4: IntWidth = IntWidth::signed(4);
    // Ten count registers plus the previous-page link, all signed.
    const BOP_PARAMS: [IntWidth; 11] = [S4; 11];

    let mut t = OpcodeTable::new();
    t.implied_range(SET_CHAR_0, SET_CHAR_127, "set_char", SetCharImplied);
    t.family(SET1, "set", SetChar, false);
    t.op(SET_RULE, "set_rule", SetRule, &[S4, S4]);
    t.family(PUT1, "put", PutChar, false);
    t.op(PUT_RULE, "put_rule", PutRule, &[S4, S4]);
    t.op(NOP, "nop", Nop, &[]);
    t.op(BOP, "bop", Bop, &BOP_PARAMS);
    t.op(EOP, "eop", Eop, &[]);
    t.op(PUSH, "push", Push, &[]);
    t.op(POP, "pop", Pop, &[]);
    t.family(RIGHT1, "right", Right, true);
    t.op(W0, "w0", MoveW, &[]);
    t.family(W1, "w", SetW, true);
    t.op(X0, "x0", MoveX, &[]);
    t.family(X1, "x", SetX, true);
    t.family(DOWN1, "down", Down, true);
    t.op(Y0, "y0", MoveY, &[]);
    t.family(Y1, "y", SetY, true);
    t.op(Z0, "z0", MoveZ, &[]);
    t.family(Z1, "z", SetZ, true);
    t.implied_range(FNT_NUM_0, FNT_NUM_63, "fnt_num", FontImplied);
    t.family(FNT1, "fnt", Font, false);
    t.family(XXX1, "xxx", Special, false);
    t.family(FNT_DEF1, "fnt_def", FontDef, false);
    t.op(PRE, "pre", Pre, &[]);
    t.op(POST, "post", Post, &[]);
    t.op(POST_POST, "post_post", PostPost, &[]);
    t
}

fn build_pk_table() -> OpcodeTable {
    use pk_codes::*;
    use OpcodeKind::*;

    let mut t = OpcodeTable::new();
    // Character packets decode their own self-describing preamble from the
    // flag byte; the table only routes them.
    t.implied_range(0, CHAR_MAX, "char", PkChar);
    t.family(XXX1, "xxx", Special, false);
    t.op(YYY, "yyy", PkNumSpecial, &[IntWidth::unsigned(4)]);
    t.op(POST, "post", Post, &[]);
    t.op(NOP, "nop", Nop, &[]);
    t.op(PRE, "pre", Pre, &[]);
    t
}
