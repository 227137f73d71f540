//! # Symbol IR
//!
//! The index-addressable intermediate representation of a binary's API
//! surface, and the machinery that constructs it from a debug-entry tree.
//!
//! Everything cross-referential in the IR goes through [`SymbolIndex`]es
//! into one owning [`SymbolTable`]; the [`SymbolIndexAllocator`] hands out
//! those indices lazily so references can precede definitions, and the
//! [`SurfaceBuilder`] drives the whole construction.

pub mod allocator;
pub mod builder;
pub mod symbol;
pub mod table;

// Re-export all public types
pub use allocator::SymbolIndexAllocator;
pub use builder::{ApiSurface, BuildSummary, SurfaceBuilder};
pub use symbol::{FunctionSymbol, Parameter, StructureSymbol, Symbol, SymbolIndex, TypeSymbol};
pub use table::SymbolTable;
