//! Generic opcode-stream decoder.
//!
//! Reads one opcode byte, resolves it against a table, and reads the
//! declared big-endian parameters. No semantic interpretation happens here,
//! which is what lets the DVI container and the PK font share the engine.

use crate::error::Result;
use crate::opcode::{Opcode, OpcodeTable};
use crate::stream::ByteReader;
use smallvec::SmallVec;
use std::io::{Read, Seek};

/// One decoded command: its descriptor and the parameter values, widened
/// to `i64` in declaration order.
pub struct Decoded<'t> {
    pub opcode: &'t Opcode,
    pub params: SmallVec<[i64; 2]>,
}

impl Decoded<'_> {
    /// First parameter, or the operand implied by the opcode byte.
    pub fn operand(&self) -> i64 {
        self.params
            .first()
            .copied()
            .unwrap_or_else(|| i64::from(self.opcode.implied_operand()))
    }
}

/// Table-driven decoder over a seekable byte source.
pub struct OpcodeDecoder<'t> {
    table: &'t OpcodeTable,
}

impl<'t> OpcodeDecoder<'t> {
    pub fn new(table: &'t OpcodeTable) -> Self {
        Self { table }
    }

    /// Decode exactly one command.
    ///
    /// Fails with `UnknownOpcode` if the byte has no descriptor and with
    /// `TruncatedStream` if the source ends before the declared parameters.
    pub fn decode_one<R: Read + Seek>(&self, reader: &mut ByteReader<R>) -> Result<Decoded<'t>> {
        let code = reader.read_u8()?;
        let opcode = self.table.lookup(code)?;
        let mut params = SmallVec::with_capacity(opcode.params.len());
        for &width in &opcode.params {
            params.push(reader.read_int(width)?);
        }
        Ok(Decoded { opcode, params })
    }
}
