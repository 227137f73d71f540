//! # DWARF Acquisition
//!
//! The boundary between on-disk binaries and the producer-agnostic entry
//! tree. [`DebugImage`] handles file parsing and section ownership; the
//! lowering walks the decoded DWARF and emits a [`DebugInfo`] the IR builder
//! consumes without knowing DWARF exists.

pub mod image;
pub mod lower;

pub use image::DebugImage;
pub use lower::lower_image;

use std::path::Path;

use crate::entry::DebugInfo;
use crate::error::Result;

/// Read the binary at `path` and lower its debug info into an entry tree
///
/// A binary without debug sections yields an empty tree (and thus an empty
/// API surface downstream).
///
/// ## Example
///
/// ```rust,no_run
/// use apex_core::dwarf::read_debug_info;
/// use apex_core::ir::ApiSurface;
///
/// # fn example() -> apex_core::error::Result<()> {
/// let info = read_debug_info("target/debug/example")?;
/// let surface = ApiSurface::build(&info);
/// println!("{} symbols", surface.table.populated());
/// # Ok(())
/// # }
/// ```
///
/// ## Errors
///
/// Fails if the file cannot be read, is not an object file, or carries
/// malformed debug sections.
pub fn read_debug_info(path: impl AsRef<Path>) -> Result<DebugInfo>
{
    let image = DebugImage::open(path)?;
    lower_image(&image)
}
