//! Packed (PK) bitmap font container.
//!
//! A PK file is a preamble (format id 89, comment, design size, checksum,
//! pixels-per-point), a sequence of character packets interleaved with
//! specials and no-ops, and a `post` marker. Character packets are decoded
//! eagerly into `PackedGlyph` rasters; a character code that appears twice
//! keeps its first definition so repeated lookups always return the same
//! data.
//!
//! The opcode space (specials, no-op, pre/post) runs through the same
//! table-driven decoder as the DVI container; character packets carry a
//! self-describing flag byte and are unpacked by `glyph`.

pub mod glyph;

pub use glyph::PackedGlyph;

use crate::error::{DviError, Result};
use crate::opcode::{pk_codes, pk_opcodes, OpcodeDecoder, OpcodeKind};
use crate::stream::ByteReader;
use rustc_hash::FxHashMap;
use std::io::{Read, Seek};

/// A decoded packed font: preamble scalars plus the glyph table.
#[derive(Debug)]
pub struct PkFont {
    /// Free-form comment written by the producer.
    pub comment: String,
    /// Design size in points, as a 2^-20 fix-word.
    pub design_size: u32,
    /// Checksum copied from the TFM file; compared against `fnt_def`
    /// declarations, mismatches are reported but tolerated.
    pub checksum: u32,
    /// Horizontal pixels per point, as a 2^-16 fix-word.
    pub hppp: u32,
    /// Vertical pixels per point, as a 2^-16 fix-word.
    pub vppp: u32,
    glyphs: FxHashMap<u32, PackedGlyph>,
}

impl PkFont {
    /// Decode a whole PK container.
    pub fn parse<R: Read + Seek>(source: R) -> Result<Self> {
        let mut reader = ByteReader::new(source);
        reader.seek_to(0)?;

        let code = reader.read_u8()?;
        if code != pk_codes::PRE {
            return Err(DviError::BadMagic(code));
        }
        let id = reader.read_u8()?;
        if id != pk_codes::ID {
            return Err(DviError::UnknownFormat(id));
        }
        let comment = reader.read_short_string()?;
        let design_size = reader.read_u32()?;
        let checksum = reader.read_u32()?;
        let hppp = reader.read_u32()?;
        let vppp = reader.read_u32()?;

        let decoder = OpcodeDecoder::new(pk_opcodes());
        let mut glyphs: FxHashMap<u32, PackedGlyph> = FxHashMap::default();
        loop {
            let decoded = decoder.decode_one(&mut reader)?;
            match decoded.opcode.kind {
                OpcodeKind::Post => break,
                OpcodeKind::Nop => {}
                OpcodeKind::Special => {
                    // Extension blob; carried for writers, ignored here.
                    reader.read_bytes(decoded.operand() as usize)?;
                }
                OpcodeKind::PkNumSpecial => {}
                OpcodeKind::PkChar => {
                    let glyph = PackedGlyph::parse(decoded.opcode.code, &mut reader)?;
                    glyphs.entry(glyph.char_code).or_insert(glyph);
                }
                _ => return Err(DviError::UnknownOpcode(decoded.opcode.code)),
            }
        }

        Ok(Self {
            comment,
            design_size,
            checksum,
            hppp,
            vppp,
            glyphs,
        })
    }

    pub fn glyph(&self, code: u32) -> Option<&PackedGlyph> {
        self.glyphs.get(&code)
    }

    pub fn glyphs(&self) -> impl Iterator<Item = &PackedGlyph> {
        self.glyphs.values()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
