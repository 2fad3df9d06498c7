//! Stack-based page interpreter.
//!
//! Replays one page program against the six positioning registers, looking
//! glyphs up in the loaded packed fonts and forwarding paint calls to a
//! `Device`. The register stack starts each page with a single frame; `pop`
//! refuses to empty it, and a page that finishes at any other depth is
//! rejected as unbalanced.

use crate::error::{DviError, Result};
use crate::model::{DviProgram, Instruction, Registers};
use crate::machine::device::Device;
use crate::pk::PkFont;
use crate::resolver::FontResolver;
use rustc_hash::FxHashMap;
use std::io::Cursor;

/// Interpreter for page programs.
pub struct DviMachine<'a, D> {
    program: &'a DviProgram,
    device: &'a mut D,
    fonts: FxHashMap<u32, PkFont>,
    registers_stack: Vec<Registers>,
    current_font: Option<u32>,
}

impl<'a, D: Device> DviMachine<'a, D> {
    pub fn new(program: &'a DviProgram, device: &'a mut D) -> Self {
        Self {
            program,
            device,
            fonts: FxHashMap::default(),
            registers_stack: vec![Registers::default()],
            current_font: None,
        }
    }

    /// Load a packed font for every declaration in the program.
    ///
    /// A checksum disagreement between the declaration and the font file is
    /// reported and tolerated; files and fonts disagree benignly in the
    /// wild. A zero checksum on either side disables the comparison.
    pub fn load_fonts<F: FontResolver>(&mut self, resolver: &mut F) -> Result<()> {
        let program = self.program;
        for font in program.fonts() {
            if self.fonts.contains_key(&font.id) {
                continue;
            }
            let data = resolver.open_font(&font.name)?;
            let pk = PkFont::parse(Cursor::new(data))?;
            if font.checksum != 0 && pk.checksum != 0 && font.checksum != pk.checksum {
                tracing::warn!(
                    font = %font.name,
                    declared = font.checksum,
                    stored = pk.checksum,
                    "font checksum mismatch"
                );
            }
            self.fonts.insert(font.id, pk);
        }
        Ok(())
    }

    /// Register an already-decoded packed font under a font id.
    pub fn add_font(&mut self, id: u32, font: PkFont) {
        self.fonts.insert(id, font);
    }

    /// Replay one page through the device.
    ///
    /// Page state (registers, stack, current font) is reset first, so pages
    /// can be replayed independently and in any order.
    pub fn run_page(&mut self, page_index: usize) -> Result<()> {
        let program = self.program;
        let page = program
            .page(page_index)
            .ok_or(DviError::PageOutOfRange(page_index))?;

        self.registers_stack.clear();
        self.registers_stack.push(Registers::default());
        self.current_font = None;

        self.device.begin_page(page_index, &page.counts);
        for instruction in page.iter() {
            self.execute(instruction)?;
        }
        let depth = self.registers_stack.len();
        if depth != 1 {
            return Err(DviError::UnbalancedStack { depth });
        }
        self.device.end_page(page_index);
        Ok(())
    }

    /// Current register frame.
    pub fn registers(&self) -> Registers {
        *self
            .registers_stack
            .last()
            .expect("register stack holds at least one frame")
    }

    fn registers_mut(&mut self) -> &mut Registers {
        self.registers_stack
            .last_mut()
            .expect("register stack holds at least one frame")
    }

    fn execute(&mut self, instruction: &Instruction) -> Result<()> {
        match instruction {
            Instruction::SetChars(run) => self.typeset(run, true)?,
            Instruction::PutChar(code) => self.typeset(&[*code], false)?,
            Instruction::SetRule { height, width } => self.rule(*height, *width, true),
            Instruction::PutRule { height, width } => self.rule(*height, *width, false),
            Instruction::Push => {
                let top = self.registers();
                self.registers_stack.push(top);
            }
            Instruction::Pop => {
                if self.registers_stack.len() == 1 {
                    return Err(DviError::StackUnderflow);
                }
                self.registers_stack.pop();
            }
            Instruction::Right(d) => self.registers_mut().h += i64::from(*d),
            Instruction::SetW(d) => {
                let regs = self.registers_mut();
                regs.w = i64::from(*d);
                regs.h += i64::from(*d);
            }
            Instruction::MoveW => {
                let regs = self.registers_mut();
                regs.h += regs.w;
            }
            Instruction::SetX(d) => {
                let regs = self.registers_mut();
                regs.x = i64::from(*d);
                regs.h += i64::from(*d);
            }
            Instruction::MoveX => {
                let regs = self.registers_mut();
                regs.h += regs.x;
            }
            Instruction::Down(d) => self.registers_mut().v += i64::from(*d),
            Instruction::SetY(d) => {
                let regs = self.registers_mut();
                regs.y = i64::from(*d);
                regs.v += i64::from(*d);
            }
            Instruction::MoveY => {
                let regs = self.registers_mut();
                regs.v += regs.y;
            }
            Instruction::SetZ(d) => {
                let regs = self.registers_mut();
                regs.z = i64::from(*d);
                regs.v += i64::from(*d);
            }
            Instruction::MoveZ => {
                let regs = self.registers_mut();
                regs.v += regs.z;
            }
            Instruction::SelectFont(id) => self.current_font = Some(*id),
            Instruction::Special(payload) => self.device.special(payload),
        }
        Ok(())
    }

    /// Paint a run of characters; `advance` distinguishes set from put.
    fn typeset(&mut self, codes: &[u32], advance: bool) -> Result<()> {
        let font_id = self.current_font.ok_or(DviError::NoFontSelected)?;
        let dvi_font = self
            .program
            .font(font_id)
            .ok_or(DviError::UnresolvedFont(font_id))?;
        let pk = self
            .fonts
            .get(&font_id)
            .ok_or(DviError::UnresolvedFont(font_id))?;
        let magnification = dvi_font.magnification();

        for &code in codes {
            let glyph = pk
                .glyph(code)
                .ok_or(DviError::UnresolvedGlyph {
                    font: font_id,
                    code,
                })?;
            let regs = self
                .registers_stack
                .last()
                .copied()
                .expect("register stack holds at least one frame");
            self.device.paint_character(
                regs.h - i64::from(glyph.horizontal_offset),
                regs.v - i64::from(glyph.vertical_offset),
                glyph,
                magnification,
            );
            if advance {
                let width = dvi_font.char_width(glyph.tfm_width);
                self.registers_stack
                    .last_mut()
                    .expect("register stack holds at least one frame")
                    .h += width;
            }
        }
        Ok(())
    }

    /// Paint a rule; a degenerate rule paints nothing but `set_rule` still
    /// moves the cursor by its width.
    fn rule(&mut self, height: i32, width: i32, advance: bool) {
        let regs = self.registers();
        if height > 0 && width > 0 {
            self.device
                .paint_rule(regs.h, regs.v, i64::from(width), i64::from(height));
        }
        if advance {
            self.registers_mut().h += i64::from(width);
        }
    }
}
