//! # apex-core
//!
//! Debug-metadata ingestion and symbol IR construction for Apex.
//!
//! This crate turns the debug info of a compiled binary into an
//! index-addressable symbol IR describing its API surface:
//! - Class and struct records with their methods, nested types, and bases
//! - Function records with signatures, addresses, and declaration flags
//! - A single owning table addressed by stable integer indices
//!
//! ## Pipeline
//!
//! 1. [`dwarf`] reads the binary (`object`) and lowers its DWARF (`gimli`)
//!    into the producer-agnostic entry tree in [`entry`].
//! 2. [`ir`] walks the tree and constructs the symbol table.
//!
//! The two halves meet only at [`entry::DebugInfo`], so tests and other
//! producers can feed the builder directly.
//!
//! ## Example
//!
//! ```rust,no_run
//! use apex_core::dwarf::read_debug_info;
//! use apex_core::ir::{ApiSurface, Symbol};
//!
//! # fn main() -> apex_core::Result<()> {
//! let info = read_debug_info("./my-binary")?;
//! let surface = ApiSurface::build(&info);
//! for (index, symbol) in surface.table.iter() {
//!     if let Symbol::Structure(structure) = symbol {
//!         println!("{index} {}", structure.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod dwarf;
pub mod entry;
pub mod error;
pub mod ir;

// Re-export commonly used types
pub use dwarf::read_debug_info;
pub use entry::{DebugEntry, DebugInfo, EntryOffset, EntryTag};
pub use error::{ApexError, Result};
pub use ir::{ApiSurface, Symbol, SymbolIndex, SymbolTable};
