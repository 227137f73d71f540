//! # Error Types
//!
//! General error handling for Apex.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

/// Main error type for Apex operations
///
/// This enum represents all the ways loading and lowering a binary's debug
/// info can fail. The IR construction itself never fails on malformed input
/// (unsupported entries are logged and skipped); errors here come from the
/// acquisition boundary.
///
/// ## Error Categories
///
/// 1. **Image errors**: InvalidImage (unparseable object file)
/// 2. **DWARF errors**: Dwarf (malformed debug sections)
/// 3. **I/O errors**: Io (file reads)
#[derive(Error, Debug)]
pub enum ApexError
{
    /// The file exists but could not be parsed as an object file
    ///
    /// This happens when:
    /// - The file is not ELF/Mach-O/PE (e.g. a script or text file)
    /// - The file is truncated or corrupt
    /// - The object format is one the `object` crate cannot read
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The object file's debug sections could not be decoded
    ///
    /// The string carries the decoding context and the underlying DWARF
    /// reader error. Note that a binary with *no* debug sections is not an
    /// error; it simply yields an empty entry tree.
    #[error("DWARF error: {0}")]
    Dwarf(String),

    /// I/O error (for file operations, etc.)
    ///
    /// Used for errors when reading the target binary from disk.
    /// This is a standard Rust `std::io::Error` converted to our error type.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, ApexError>`
///
/// ```rust
/// use apex_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, ApexError>;

/// Wrap a DWARF reader error with the operation that hit it.
pub(crate) fn map_dwarf_error(context: &str, err: gimli::Error) -> ApexError
{
    ApexError::Dwarf(format!("{context}: {err}"))
}
