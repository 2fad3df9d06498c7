//! DVI container parser.
//!
//! A DVI file is a preamble, a sequence of pages, and a postamble. The
//! postamble is located from the *end* of the stream: the file closes with a
//! run of at least four 223 trailer bytes, preceded by the format id and a
//! four-byte pointer to the `post` command. The postamble in turn points at
//! the last page's `bop`, and every `bop` carries a pointer to the previous
//! one (-1 for the first page), so pages are recovered by walking that
//! backward-linked list. The chain is followed iteratively, one buffered
//! link at a time; a page's byte length is unknown until its `eop` is
//! scanned, which is why each `bop`'s link is read before its body.
//!
//! Page bodies are decoded with the table-driven opcode engine and collapsed
//! into typed instructions, merging adjacent single-character `set` commands
//! into one run.

use crate::error::{DviError, Result};
use crate::model::{DviFont, DviProgram, Instruction, PageProgram, Postamble, Preamble};
use crate::opcode::{dvi_codes, dvi_opcodes, DVI_FORMATS, OpcodeDecoder, OpcodeKind};
use crate::stream::ByteReader;
use smol_str::SmolStr;
use std::io::{Read, Seek};

/// Structural parser over one seekable DVI byte source.
pub struct DviParser<R> {
    reader: ByteReader<R>,
    decoder: OpcodeDecoder<'static>,
}

impl<R: Read + Seek> DviParser<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: ByteReader::new(source),
            decoder: OpcodeDecoder::new(dvi_opcodes()),
        }
    }

    /// Decode the whole container into a program.
    ///
    /// Phases run strictly in order: preamble, postamble (located by the
    /// backward trailer scan), then the backward page walk.
    pub fn parse(mut self) -> Result<DviProgram> {
        let mut program = DviProgram::new();
        self.parse_preamble(&mut program)?;
        let last_page = self.parse_postamble(&mut program)?;
        self.parse_pages_backward(&mut program, last_page)?;
        Ok(program)
    }

    fn parse_preamble(&mut self, program: &mut DviProgram) -> Result<()> {
        self.reader.seek_to(0)?;
        let code = self.reader.read_u8()?;
        if code != dvi_codes::PRE {
            return Err(DviError::BadMagic(code));
        }
        let format = self.reader.read_u8()?;
        if !DVI_FORMATS.contains(&format) {
            return Err(DviError::UnknownFormat(format));
        }
        let numerator = self.reader.read_u32()?;
        let denominator = self.reader.read_u32()?;
        let magnification = self.reader.read_u32()?;
        let comment = self.reader.read_short_string()?;
        program.preamble = Preamble {
            format,
            numerator,
            denominator,
            magnification,
            comment,
        };
        Ok(())
    }

    /// Locate and read the postamble; returns the pointer to the last
    /// page's `bop`.
    fn parse_postamble(&mut self, program: &mut DviProgram) -> Result<i32> {
        self.reader.seek_from_end(0)?;
        let len = self.reader.tell()?;
        if len < dvi_codes::MIN_TRAILER_RUN as u64 + 1 {
            return Err(DviError::BadPostamble("stream too short"));
        }

        self.reader.seek_from_end(-(dvi_codes::MIN_TRAILER_RUN as i64))?;
        let tail = self.reader.read_bytes(dvi_codes::MIN_TRAILER_RUN)?;
        if tail.iter().any(|&b| b != dvi_codes::TRAILER) {
            return Err(DviError::BadPostamble("missing trailer signature"));
        }

        // Walk backward from the fifth-to-last byte over any extra trailer
        // bytes; the first other byte is the format id repeated at the tail.
        let mut pos = len - 5;
        let format = loop {
            self.reader.seek_to(pos)?;
            let byte = self.reader.read_u8()?;
            if byte != dvi_codes::TRAILER {
                break byte;
            }
            if pos == 0 {
                return Err(DviError::BadPostamble("trailer run reaches start of stream"));
            }
            pos -= 1;
        };
        if !DVI_FORMATS.contains(&format) {
            return Err(DviError::BadPostamble("unrecognized trailing format id"));
        }
        if pos < 4 {
            return Err(DviError::BadPostamble("post pointer out of range"));
        }

        // The four bytes before the format id point at the post command.
        self.reader.seek_to(pos - 4)?;
        let post_pointer = u64::from(self.reader.read_u32()?);
        if post_pointer >= len {
            return Err(DviError::BadPostamble("post pointer out of range"));
        }
        self.reader.seek_to(post_pointer)?;
        if self.reader.read_u8()? != dvi_codes::POST {
            return Err(DviError::BadPostamble("post pointer does not reach post"));
        }

        let last_page = self.reader.read_i32()?;

        let numerator = self.reader.read_u32()?;
        let denominator = self.reader.read_u32()?;
        let magnification = self.reader.read_u32()?;
        let pre = &program.preamble;
        if (numerator, denominator, magnification)
            != (pre.numerator, pre.denominator, pre.magnification)
        {
            tracing::warn!("postamble unit scalars disagree with preamble");
        }

        let max_height = self.reader.read_i32()?;
        let max_width = self.reader.read_i32()?;
        let max_stack_depth = self.reader.read_u16()?;
        let page_count = self.reader.read_u16()?;
        program.set_postamble(Postamble {
            max_height,
            max_width,
            max_stack_depth,
            page_count,
        });

        // Font definitions, possibly interspersed with no-ops, close the
        // postamble; anything but post_post after them is malformed.
        loop {
            let decoded = self.decoder.decode_one(&mut self.reader)?;
            match decoded.opcode.kind {
                OpcodeKind::FontDef => {
                    let id = decoded.operand() as u32;
                    self.read_font_def_body(program, id)?;
                }
                OpcodeKind::Nop => {}
                OpcodeKind::PostPost => break,
                _ => return Err(DviError::BadPostamble("unexpected opcode before post_post")),
            }
        }

        Ok(last_page)
    }

    /// Read the fields of a font definition after its id parameter and
    /// register it on the program.
    fn read_font_def_body(&mut self, program: &mut DviProgram, id: u32) -> Result<()> {
        let checksum = self.reader.read_u32()?;
        let scale_factor = self.reader.read_u32()?;
        let design_size = self.reader.read_u32()?;
        let area_len = self.reader.read_u8()?;
        let name_len = self.reader.read_u8()?;
        let name_bytes = self
            .reader
            .read_bytes(usize::from(area_len) + usize::from(name_len))?;
        program.register_font(DviFont {
            id,
            name: SmolStr::new(String::from_utf8_lossy(&name_bytes)),
            checksum,
            scale_factor,
            design_size,
        });
        Ok(())
    }

    /// Follow the backward page chain from the last page, placing each
    /// decoded page at its document-order index.
    fn parse_pages_backward(&mut self, program: &mut DviProgram, last_page: i32) -> Result<()> {
        let declared = program.postamble.page_count;
        let total = usize::from(declared);
        let mut pointer = i64::from(last_page);
        let mut seen = 0usize;

        while pointer >= 0 {
            if seen == total {
                return Err(DviError::PageCountMismatch {
                    declared,
                    decoded: seen + 1,
                });
            }
            self.reader.seek_to(pointer as u64)?;
            if self.reader.read_u8()? != dvi_codes::BOP {
                return Err(DviError::BadPostamble("page link does not reach bop"));
            }
            let mut counts = [0i32; 10];
            for slot in &mut counts {
                *slot = self.reader.read_i32()?;
            }
            // Read the link before the body: the body's length is unknown
            // until its eop is scanned.
            let previous = self.reader.read_i32()?;
            let instructions = self.decode_page_body(program)?;
            program.set_page(total - seen - 1, PageProgram::new(counts, instructions));
            seen += 1;
            pointer = i64::from(previous);
        }

        if seen != total {
            return Err(DviError::PageCountMismatch {
                declared,
                decoded: seen,
            });
        }
        Ok(())
    }

    /// Decode one page body up to its `eop`.
    fn decode_page_body(&mut self, program: &mut DviProgram) -> Result<Vec<Instruction>> {
        let mut instructions = Vec::new();
        let mut pending_run = false;

        loop {
            let decoded = self.decoder.decode_one(&mut self.reader)?;
            let kind = decoded.opcode.kind;

            // Any command that is not a character set closes a pending run,
            // whether or not it emits an instruction.
            if !matches!(kind, OpcodeKind::SetCharImplied | OpcodeKind::SetChar) {
                pending_run = false;
            }

            match kind {
                OpcodeKind::Eop => break,
                OpcodeKind::SetCharImplied | OpcodeKind::SetChar => {
                    let code = decoded.operand() as u32;
                    match instructions.last_mut() {
                        Some(Instruction::SetChars(run)) if pending_run => run.push(code),
                        _ => instructions.push(Instruction::SetChars(vec![code])),
                    }
                    pending_run = true;
                }
                OpcodeKind::PutChar => {
                    instructions.push(Instruction::PutChar(decoded.operand() as u32));
                }
                OpcodeKind::SetRule => instructions.push(Instruction::SetRule {
                    height: decoded.params[0] as i32,
                    width: decoded.params[1] as i32,
                }),
                OpcodeKind::PutRule => instructions.push(Instruction::PutRule {
                    height: decoded.params[0] as i32,
                    width: decoded.params[1] as i32,
                }),
                OpcodeKind::Nop => {}
                OpcodeKind::Push => instructions.push(Instruction::Push),
                OpcodeKind::Pop => instructions.push(Instruction::Pop),
                OpcodeKind::Right => instructions.push(Instruction::Right(decoded.operand() as i32)),
                OpcodeKind::SetW => instructions.push(Instruction::SetW(decoded.operand() as i32)),
                OpcodeKind::MoveW => instructions.push(Instruction::MoveW),
                OpcodeKind::SetX => instructions.push(Instruction::SetX(decoded.operand() as i32)),
                OpcodeKind::MoveX => instructions.push(Instruction::MoveX),
                OpcodeKind::Down => instructions.push(Instruction::Down(decoded.operand() as i32)),
                OpcodeKind::SetY => instructions.push(Instruction::SetY(decoded.operand() as i32)),
                OpcodeKind::MoveY => instructions.push(Instruction::MoveY),
                OpcodeKind::SetZ => instructions.push(Instruction::SetZ(decoded.operand() as i32)),
                OpcodeKind::MoveZ => instructions.push(Instruction::MoveZ),
                OpcodeKind::FontImplied | OpcodeKind::Font => {
                    instructions.push(Instruction::SelectFont(decoded.operand() as u32));
                }
                OpcodeKind::Special => {
                    let payload = self.reader.read_bytes(decoded.operand() as usize)?;
                    instructions.push(Instruction::Special(payload));
                }
                OpcodeKind::FontDef => {
                    // Legal between commands inside a page; registers the
                    // font but emits nothing.
                    let id = decoded.operand() as u32;
                    self.read_font_def_body(program, id)?;
                }
                OpcodeKind::Bop
                | OpcodeKind::Pre
                | OpcodeKind::Post
                | OpcodeKind::PostPost
                | OpcodeKind::PkChar
                | OpcodeKind::PkNumSpecial => {
                    return Err(DviError::BadPostamble("structural opcode inside page body"));
                }
            }
        }

        Ok(instructions)
    }
}

/// Convenience: parse a program from an in-memory buffer.
pub fn parse_bytes(data: &[u8]) -> Result<DviProgram> {
    DviParser::new(std::io::Cursor::new(data)).parse()
}
