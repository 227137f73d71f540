//! Symbol IR model.

use std::fmt;

/// Strongly typed handle to a symbol in a [`SymbolTable`]
///
/// All cross-references in the IR (return types, parameter types, a class's
/// method list) are stored as indices into the one owning table rather than
/// as references, so self-referential and mutually-recursive shapes need no
/// special ownership handling.
///
/// Index `0` is reserved as the "no symbol" sentinel and never identifies a
/// populated symbol.
///
/// ## Example
///
/// ```rust
/// use apex_core::ir::SymbolIndex;
///
/// let index = SymbolIndex::new(3);
/// assert_eq!(index.value(), 3);
/// assert!(!index.is_none());
/// assert!(SymbolIndex::NONE.is_none());
/// ```
///
/// [`SymbolTable`]: crate::ir::SymbolTable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolIndex(u32);

impl SymbolIndex
{
    /// The "no symbol" sentinel
    ///
    /// Appears wherever a reference is absent: a function with no return
    /// type, a parameter whose type the producer omitted.
    pub const NONE: Self = SymbolIndex(0);

    /// Create an index from its raw value
    pub const fn new(value: u32) -> Self
    {
        SymbolIndex(value)
    }

    /// Get the raw index value
    pub const fn value(self) -> u32
    {
        self.0
    }

    /// Whether this is the "no symbol" sentinel
    pub const fn is_none(self) -> bool
    {
        self.0 == 0
    }
}

impl From<u32> for SymbolIndex
{
    fn from(value: u32) -> Self
    {
        SymbolIndex(value)
    }
}

impl From<SymbolIndex> for u32
{
    fn from(index: SymbolIndex) -> Self
    {
        index.0
    }
}

impl fmt::Display for SymbolIndex
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "#{}", self.0)
    }
}

impl Default for SymbolIndex
{
    fn default() -> Self
    {
        SymbolIndex::NONE
    }
}

/// One symbol of the extracted API surface
///
/// A closed set: consumers match exhaustively instead of downcasting. Every
/// populated slot of a [`SymbolTable`] holds exactly one of these.
///
/// [`SymbolTable`]: crate::ir::SymbolTable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol
{
    /// A non-structural type (base, pointer, array, ...)
    Type(TypeSymbol),
    /// A class or struct
    Structure(StructureSymbol),
    /// A function or method
    Function(FunctionSymbol),
}

impl Symbol
{
    /// Source-level name, empty if the producer gave none
    pub fn name(&self) -> &str
    {
        match self {
            Symbol::Type(ty) => &ty.name,
            Symbol::Structure(structure) => &structure.name,
            Symbol::Function(function) => &function.name,
        }
    }
}

/// A plain type: name plus storage size
///
/// The current structure/function builders never materialize these (the
/// type-entry path is an acknowledged extension point), but the variant is
/// part of the closed model so consumers are already prepared for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSymbol
{
    pub name: String,
    /// Storage size in bits, when the producer recorded one
    pub bit_size: Option<u64>,
}

/// A class or struct
///
/// Members, methods, nested structures, and base classes are index lists
/// into the owning table, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureSymbol
{
    pub name: String,
    /// Data members (not populated yet; kept for layout work)
    pub members: Vec<SymbolIndex>,
    /// Member functions
    pub functions: Vec<SymbolIndex>,
    /// Nested classes and structs
    pub structures: Vec<SymbolIndex>,
    /// Base classes this structure inherits from
    pub bases: Vec<SymbolIndex>,
    /// Declaration without a definition
    pub declaration: bool,
    /// Generated by the compiler rather than written in source
    pub artificial: bool,
}

/// A function or method
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionSymbol
{
    pub name: String,
    /// Return type, [`SymbolIndex::NONE`] for `void`/unknown
    pub return_type: SymbolIndex,
    /// Source-visible parameters, in order
    pub parameters: Vec<Parameter>,
    /// Lowest code address of the body, `0` if the function has none
    /// (declarations, inlined-away bodies)
    pub address: u64,
    /// Declaration without a definition
    pub declaration: bool,
    /// Compiler-generated, or carrying a compiler-generated parameter
    /// (an implicit receiver)
    pub artificial: bool,
}

/// One source-visible parameter of a [`FunctionSymbol`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter
{
    pub name: String,
    /// Parameter type, [`SymbolIndex::NONE`] if the producer omitted it
    pub ty: SymbolIndex,
}
