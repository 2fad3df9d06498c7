//! TeX unit conversions.
//!
//! DVI dimensions are integers in a document-defined unit; with the
//! standard preamble fraction they are scaled points (2^16 sp = 1 pt,
//! 72.27 pt = 1 in). The floating-point helpers exist for display only;
//! anything that feeds back into positioning stays in exact integer or
//! rational arithmetic.

use num_rational::Ratio;

/// Scaled points per printer's point.
pub const SP_PER_PT: i64 = 1 << 16;

/// Printer's points per inch.
pub const PT_PER_IN: f64 = 72.27;

pub fn sp_to_pt(sp: i64) -> f64 {
    sp as f64 / SP_PER_PT as f64
}

pub fn sp_to_in(sp: i64) -> f64 {
    sp_to_pt(sp) / PT_PER_IN
}

pub fn sp_to_mm(sp: i64) -> f64 {
    sp_to_in(sp) * 25.4
}

/// Convert a dimension to millimeters through a document's unit fraction
/// (the fraction is in 10^-7 m per DVI unit).
pub fn dvi_to_mm(value: i64, unit: Ratio<u64>) -> f64 {
    let scale = *unit.numer() as f64 / *unit.denom() as f64;
    value as f64 * scale * 1e-4
}
