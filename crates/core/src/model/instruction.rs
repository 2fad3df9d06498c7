//! Page-program instructions.
//!
//! The container parser collapses the raw opcode stream into these typed
//! instructions; adjacent single-character `set` commands are merged into
//! one run so that consumers can shape a word at a time while the machine
//! still advances the cursor per character.

use std::fmt;

/// One decoded page instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Typeset a run of characters, advancing `h` after each.
    SetChars(Vec<u32>),
    /// Typeset one character without moving the cursor.
    PutChar(u32),
    /// Paint a rule and advance `h` by its width.
    SetRule { height: i32, width: i32 },
    /// Paint a rule without moving the cursor.
    PutRule { height: i32, width: i32 },
    /// Save the positioning registers.
    Push,
    /// Restore the positioning registers.
    Pop,
    /// `h += delta`
    Right(i32),
    /// `w = delta; h += delta`
    SetW(i32),
    /// `h += w`
    MoveW,
    /// `x = delta; h += delta`
    SetX(i32),
    /// `h += x`
    MoveX,
    /// `v += delta`
    Down(i32),
    /// `y = delta; v += delta`
    SetY(i32),
    /// `v += y`
    MoveY,
    /// `z = delta; v += delta`
    SetZ(i32),
    /// `v += z`
    MoveZ,
    /// Make `font_id` the current font.
    SelectFont(u32),
    /// Extension blob, forwarded verbatim to the device.
    Special(Vec<u8>),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::SetChars(run) => {
                write!(f, "set \"")?;
                for &c in run {
                    match char::from_u32(c).filter(char::is_ascii_graphic) {
                        Some(ch) => write!(f, "{ch}")?,
                        None => write!(f, "\\{c}")?,
                    }
                }
                write!(f, "\"")
            }
            Instruction::PutChar(c) => write!(f, "put char {c}"),
            Instruction::SetRule { height, width } => {
                write!(f, "set rule height {height} width {width}, h += width")
            }
            Instruction::PutRule { height, width } => {
                write!(f, "put rule height {height} width {width}")
            }
            Instruction::Push => write!(f, "push"),
            Instruction::Pop => write!(f, "pop"),
            Instruction::Right(d) => write!(f, "h += {d}"),
            Instruction::SetW(d) => write!(f, "w = {d}, h += w"),
            Instruction::MoveW => write!(f, "h += w"),
            Instruction::SetX(d) => write!(f, "x = {d}, h += x"),
            Instruction::MoveX => write!(f, "h += x"),
            Instruction::Down(d) => write!(f, "v += {d}"),
            Instruction::SetY(d) => write!(f, "y = {d}, v += y"),
            Instruction::MoveY => write!(f, "v += y"),
            Instruction::SetZ(d) => write!(f, "z = {d}, v += z"),
            Instruction::MoveZ => write!(f, "v += z"),
            Instruction::SelectFont(id) => write!(f, "fnt {id}"),
            Instruction::Special(payload) => {
                write!(f, "xxx [{}]", String::from_utf8_lossy(payload))
            }
        }
    }
}

/// The decoded instruction sequence of one physical page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageProgram {
    /// The ten `\count` registers recorded by `bop`; `counts[0]` is the
    /// page number TeX printed while shipping the page out.
    pub counts: [i32; 10],
    instructions: Vec<Instruction>,
}

impl PageProgram {
    pub fn new(counts: [i32; 10], instructions: Vec<Instruction>) -> Self {
        Self {
            counts,
            instructions,
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }
}
