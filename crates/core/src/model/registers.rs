//! Positioning registers saved and restored by push/pop.

/// The six-value cursor state of a page replay.
///
/// `h`/`v` are the current horizontal and vertical positions (origin at the
/// upper-left corner, `v` growing downward); `w`/`x` hold horizontal and
/// `y`/`z` vertical spacing amounts. All are DVI units. The stream encodes
/// them in at most 32 bits; arithmetic is done in 64 so that accumulated
/// motion cannot wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub h: i64,
    pub v: i64,
    pub w: i64,
    pub x: i64,
    pub y: i64,
    pub z: i64,
}
