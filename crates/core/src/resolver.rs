//! Collaborator boundary for locating fonts.
//!
//! The core never searches font paths; a resolver maps a font name to the
//! raw bytes of its packed container (and, for callers that need one, its
//! metric table). Implementations typically shell out to a path-search
//! tool or read a prebuilt directory.

use crate::error::Result;

/// Opens font sources by name.
pub trait FontResolver {
    /// Return the bytes of the packed-font container for `name`.
    fn open_font(&mut self, name: &str) -> Result<Vec<u8>>;

    /// Return the bytes of the font-metric table for `name`.
    ///
    /// Resolvers that never serve metrics may rely on the default.
    fn open_metrics(&mut self, name: &str) -> Result<Vec<u8>> {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no metric source for {name}"),
        )
        .into())
    }
}
