//! Font declarations carried by `fnt_def` commands.

use num_rational::Ratio;
use smol_str::SmolStr;

/// A font as declared in the container (`fnt_def` in a page stream or the
/// postamble). The declaration carries TFM-level scaling data only; the
/// actual glyphs live in the PK container resolved by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DviFont {
    /// Font number assigned by the declaration opcode. Ids are arbitrary,
    /// not sequential.
    pub id: u32,
    /// External font name, e.g. `cmr10`.
    pub name: SmolStr,
    /// Checksum copied from the TFM file by the DVI writer.
    pub checksum: u32,
    /// Fixed-point scale factor applied to character widths, DVI units.
    pub scale_factor: u32,
    /// Design size, DVI units.
    pub design_size: u32,
}

impl DviFont {
    /// `scale_factor / design_size` as an exact rational.
    ///
    /// Kept rational rather than floating so that repeated glyph placement
    /// does not accumulate rounding error.
    pub fn magnification(&self) -> Ratio<u64> {
        // A zero design size would be a nonsense declaration; degrade to a
        // zero ratio instead of dividing by it.
        if self.design_size == 0 {
            return Ratio::from_integer(0);
        }
        Ratio::new(u64::from(self.scale_factor), u64::from(self.design_size))
    }

    /// Width of a character in DVI units.
    ///
    /// `tfm_width` is a fix-word (a 2^-20 fraction of the design size as
    /// stored in PK/TFM files); multiplying by the scale factor and shifting
    /// is the exact integer arithmetic DVI processors use.
    pub fn char_width(&self, tfm_width: u32) -> i64 {
        (i64::from(tfm_width) * i64::from(self.scale_factor)) >> 20
    }
}
