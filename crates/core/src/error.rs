//! Error types for the fuchs DVI/PK decoding library.

use thiserror::Error;

/// Primary error type for DVI and PK decoding operations.
#[derive(Error, Debug)]
pub enum DviError {
    #[error("not a DVI stream: leading opcode {0:#04x} is not pre")]
    BadMagic(u8),

    #[error("unrecognized format id {0}")]
    UnknownFormat(u8),

    #[error("undefined opcode {0:#04x}")]
    UnknownOpcode(u8),

    #[error("stream ended inside a command")]
    TruncatedStream,

    #[error("malformed stream: {0}")]
    BadPostamble(&'static str),

    #[error("postamble declares {declared} pages, decoded {decoded}")]
    PageCountMismatch { declared: u16, decoded: usize },

    #[error("pop on an empty register stack")]
    StackUnderflow,

    #[error("page ended at stack depth {depth}, expected 1")]
    UnbalancedStack { depth: usize },

    #[error("character typeset before any font was selected")]
    NoFontSelected,

    #[error("font {0} selected but never defined")]
    UnresolvedFont(u32),

    #[error("char {code} missing from font {font}")]
    UnresolvedGlyph { font: u32, code: u32 },

    #[error("malformed packed glyph: {0}")]
    MalformedPackedGlyph(&'static str),

    #[error("page index {0} out of range")]
    PageOutOfRange(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias for DviError.
pub type Result<T> = std::result::Result<T, DviError>;
