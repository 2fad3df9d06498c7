//! dvidump - Inspect the structure of DVI files.
//!
//! A command line tool that decodes a DVI container and prints its
//! preamble/postamble scalars, registered fonts, and per-page instruction
//! listings.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use fuchs_core::units::dvi_to_mm;
use fuchs_core::{DviProgram, PageProgram};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufWriter, Cursor, Write};
use std::path::PathBuf;

/// A command line tool for dumping the structure of DVI files: document
/// scalars, font definitions, and decoded page programs.
#[derive(Parser, Debug)]
#[command(name = "dvidump")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a DVI file
    file: PathBuf,

    /// Print the instruction listing of one page (0-indexed)
    #[arg(short = 'p', long = "page")]
    page: Option<usize>,

    /// Print the instruction listings of every page
    #[arg(long, action = ArgAction::SetTrue)]
    program: bool,

    /// Print the font table only
    #[arg(long, action = ArgAction::SetTrue)]
    fonts: bool,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

fn dump_summary<W: Write>(out: &mut W, program: &DviProgram) -> io::Result<()> {
    let unit = program.dvi_unit();
    let pre = &program.preamble;
    let post = &program.postamble;
    writeln!(out, "Preamble")?;
    writeln!(out, "  - comment       {:?}", pre.comment)?;
    writeln!(out, "  - format        {}", pre.format)?;
    writeln!(out, "  - numerator     {}", pre.numerator)?;
    writeln!(out, "  - denominator   {}", pre.denominator)?;
    writeln!(out, "  - magnification {}", pre.magnification)?;
    writeln!(out, "Postamble")?;
    writeln!(out, "  - pages         {}", post.page_count)?;
    writeln!(out, "  - stack depth   {}", post.max_stack_depth)?;
    writeln!(
        out,
        "  - max height    {} ({:.2} mm)",
        post.max_height,
        dvi_to_mm(i64::from(post.max_height), unit)
    )?;
    writeln!(
        out,
        "  - max width     {} ({:.2} mm)",
        post.max_width,
        dvi_to_mm(i64::from(post.max_width), unit)
    )?;
    Ok(())
}

fn dump_fonts<W: Write>(out: &mut W, program: &DviProgram) -> io::Result<()> {
    writeln!(out, "Fonts")?;
    let mut fonts: Vec<_> = program.fonts().collect();
    fonts.sort_by_key(|f| f.id);
    for font in fonts {
        writeln!(
            out,
            "  - {:3} {:<12} checksum {:#010x} scale {} design {}",
            font.id, font.name, font.checksum, font.scale_factor, font.design_size
        )?;
    }
    Ok(())
}

fn dump_page<W: Write>(out: &mut W, index: usize, page: &PageProgram) -> io::Result<()> {
    writeln!(
        out,
        "Page {} (count0 {}, {} instructions)",
        index,
        page.counts[0],
        page.len()
    )?;
    for instruction in page.iter() {
        writeln!(out, "  {instruction}")?;
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
    let program = fuchs_core::DviParser::new(Cursor::new(&mmap[..]))
        .parse()
        .with_context(|| format!("cannot decode {}", args.file.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.fonts {
        dump_fonts(&mut out, &program)?;
        return Ok(());
    }

    writeln!(out, "DVI file: {}", args.file.display())?;
    dump_summary(&mut out, &program)?;
    dump_fonts(&mut out, &program)?;

    if let Some(index) = args.page {
        let page = program
            .page(index)
            .with_context(|| format!("page {index} out of range"))?;
        dump_page(&mut out, index, page)?;
    } else if args.program {
        for (index, page) in program.pages().iter().enumerate() {
            dump_page(&mut out, index, page)?;
        }
    }

    out.flush()?;
    Ok(())
}
