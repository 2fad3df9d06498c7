//! pkdump - Inspect packed (PK) bitmap font files.
//!
//! A command line tool that decodes a PK container and prints its preamble
//! scalars, a glyph table, and optionally the raster of a single character
//! as ASCII art.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use fuchs_core::{PackedGlyph, PkFont};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufWriter, Cursor, Write};
use std::path::PathBuf;

/// A command line tool for dumping PK font files: preamble, glyph metrics,
/// and decoded rasters.
#[derive(Parser, Debug)]
#[command(name = "pkdump")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a PK file
    file: PathBuf,

    /// Render the raster of one character code as ASCII art
    #[arg(short = 'c', long = "char")]
    char_code: Option<u32>,

    /// List every glyph's metrics
    #[arg(short = 'g', long, action = ArgAction::SetTrue)]
    glyphs: bool,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

fn dump_summary<W: Write>(out: &mut W, font: &PkFont) -> io::Result<()> {
    writeln!(out, "Preamble")?;
    writeln!(out, "  - comment     {:?}", font.comment)?;
    writeln!(out, "  - design size {}", font.design_size)?;
    writeln!(out, "  - checksum    {:#010x}", font.checksum)?;
    writeln!(out, "  - hppp        {}", font.hppp)?;
    writeln!(out, "  - vppp        {}", font.vppp)?;
    writeln!(out, "  - glyphs      {}", font.glyph_count())?;
    Ok(())
}

fn dump_glyph_table<W: Write>(out: &mut W, font: &PkFont) -> io::Result<()> {
    let mut glyphs: Vec<_> = font.glyphs().collect();
    glyphs.sort_by_key(|g| g.char_code);
    writeln!(out, "Glyphs")?;
    for glyph in glyphs {
        writeln!(
            out,
            "  - {:3} {:>3}x{:<3} offset ({}, {}) tfm {}",
            glyph.char_code,
            glyph.pixel_width,
            glyph.pixel_height,
            glyph.horizontal_offset,
            glyph.vertical_offset,
            glyph.tfm_width
        )?;
    }
    Ok(())
}

fn dump_raster<W: Write>(out: &mut W, glyph: &PackedGlyph) -> io::Result<()> {
    writeln!(
        out,
        "Char {} ({}x{})",
        glyph.char_code, glyph.pixel_width, glyph.pixel_height
    )?;
    for row in glyph.rows() {
        let line: String = row.iter().map(|&p| if p != 0 { '*' } else { '.' }).collect();
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if args.debug { "debug" } else { "warn" })
        .with_writer(io::stderr)
        .init();

    let file = File::open(&args.file)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("cannot map {}", args.file.display()))?;
    let font = PkFont::parse(Cursor::new(&mmap[..]))
        .with_context(|| format!("cannot decode {}", args.file.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    writeln!(out, "PK file: {}", args.file.display())?;
    dump_summary(&mut out, &font)?;

    if args.glyphs {
        dump_glyph_table(&mut out, &font)?;
    }
    if let Some(code) = args.char_code {
        let glyph = font
            .glyph(code)
            .with_context(|| format!("char {code} not present in font"))?;
        dump_raster(&mut out, glyph)?;
    }

    out.flush()?;
    Ok(())
}
