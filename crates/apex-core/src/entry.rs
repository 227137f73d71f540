//! # Debug Entry Tree
//!
//! The producer-side input model for IR construction.
//!
//! A [`DebugInfo`] holds the decoded debug-metadata tree for one binary: a
//! forest of [`DebugEntry`] nodes, one root per compilation unit. Entries are
//! stored in an arena and addressed by [`EntryId`]; cross-entry references in
//! the metadata itself (type refs, specification links) use the producer's
//! persistent [`EntryOffset`] instead, resolved through
//! [`DebugInfo::entry_at_offset`].
//!
//! The tree is deliberately producer-agnostic: the DWARF lowering in
//! [`crate::dwarf`] is the normal producer, but tests (and any other
//! frontend) can assemble a `DebugInfo` directly.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

/// Persistent identity of an entry within its producing container
///
/// For DWARF input this is the entry's `.debug_info` section offset. Offsets
/// are the currency of cross-entry references: a type attribute names the
/// offset of the type's defining entry, wherever (and in whichever unit) that
/// entry lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryOffset(u64);

impl EntryOffset
{
    /// Create an offset from its raw value
    pub const fn new(value: u64) -> Self
    {
        EntryOffset(value)
    }

    /// Get the raw offset value
    pub const fn value(self) -> u64
    {
        self.0
    }
}

impl From<u64> for EntryOffset
{
    fn from(value: u64) -> Self
    {
        EntryOffset(value)
    }
}

impl From<EntryOffset> for u64
{
    fn from(offset: EntryOffset) -> Self
    {
        offset.0
    }
}

impl fmt::Display for EntryOffset
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:08x}", self.0)
    }
}

/// What kind of program construct an entry describes
///
/// Mirrors the DWARF tag vocabulary this tool understands. Codes outside the
/// recognized set are preserved rather than dropped: vendor-extension codes
/// map to [`EntryTag::Vendor`] and anything else to [`EntryTag::Unknown`], so
/// the builder can log exactly what it skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTag
{
    /// Root of one compilation unit
    CompileUnit,
    /// A class definition or declaration
    ClassType,
    /// A struct definition or declaration
    StructureType,
    /// An enumeration (recognized, not yet modeled)
    EnumerationType,
    /// A union (recognized, not yet modeled)
    UnionType,
    /// A function, method, or other callable
    Subprogram,
    /// One parameter of a callable
    FormalParameter,
    /// A data member of a class or struct
    Member,
    /// A base-class link from a derived class to its parent
    Inheritance,
    /// A global or local variable
    Variable,
    /// A namespace scope
    Namespace,
    /// A type alias
    Typedef,
    ArrayType,
    BaseType,
    PointerType,
    ReferenceType,
    ConstType,
    SubroutineType,
    /// An inlined copy of a subprogram body
    InlinedSubroutine,
    /// Trailing `...` of a variadic signature
    UnspecifiedParameters,
    /// A `using` style import
    ImportedDeclaration,
    /// A template type argument
    TemplateTypeParameter,
    /// Producer-specific extension tag (`DW_TAG_lo_user` and above)
    Vendor(u16),
    /// Any tag code this tool does not recognize
    Unknown(u16),
}

/// Which fact about an entry an attribute carries
///
/// Attributes the builder acts on come first; the block from [`External`]
/// through [`Vendor`] is recognized only so it can be discarded without
/// tripping the unknown-attribute diagnostics.
///
/// [`External`]: AttrKind::External
/// [`Vendor`]: AttrKind::Vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind
{
    /// Source-level name
    Name,
    /// Reference to the entry describing this entry's type
    TypeRef,
    /// Entry is a declaration without a definition
    Declaration,
    /// Entry was generated by the compiler, not written in source
    Artificial,
    /// Lowest code address of a callable's body
    EntryAddress,
    /// Link from a definition back to its declaration
    Specification,
    /// Link from a concrete instance back to its abstract origin
    AbstractOrigin,
    External,
    DeclFile,
    DeclLine,
    Sibling,
    LinkageName,
    ObjectPointer,
    Inline,
    FrameBase,
    Location,
    HighAddress,
    Accessibility,
    /// Producer-specific extension attribute (`DW_AT_lo_user`..=`DW_AT_hi_user`)
    Vendor(u16),
    /// Any attribute code this tool does not recognize
    Unknown(u16),
}

/// Decoded value of one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue
{
    /// Boolean flag
    Flag(bool),
    /// String payload (names)
    Str(String),
    /// Reference to another entry by persistent offset
    Ref(EntryOffset),
    /// Machine address
    Address(u64),
    /// Value in a form the lowering does not decode
    ///
    /// Kept so recognized-but-discarded attributes (source locations,
    /// expression blobs) survive in the tree without forcing the lowering to
    /// understand every DWARF form.
    Unrecognized,
}

/// One attribute of a [`DebugEntry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugAttr
{
    pub kind: AttrKind,
    pub value: AttrValue,
}

/// Arena handle to a [`DebugEntry`] inside its [`DebugInfo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

/// One node of the debug-metadata tree
#[derive(Debug, Clone)]
pub struct DebugEntry
{
    pub tag: EntryTag,
    pub offset: EntryOffset,
    pub attrs: Vec<DebugAttr>,
    /// Ordered children, filled in by [`DebugInfo::add_child`]
    pub children: Vec<EntryId>,
}

impl DebugEntry
{
    pub fn new(tag: EntryTag, offset: EntryOffset) -> Self
    {
        Self {
            tag,
            offset,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append an attribute, builder-style
    #[must_use]
    pub fn with_attr(mut self, kind: AttrKind, value: AttrValue) -> Self
    {
        self.attrs.push(DebugAttr { kind, value });
        self
    }

    /// First attribute of the given kind, if present
    pub fn attr(&self, kind: AttrKind) -> Option<&AttrValue>
    {
        self.attrs.iter().find(|attr| attr.kind == kind).map(|attr| &attr.value)
    }
}

/// The decoded debug-metadata forest for one binary
///
/// Owns every entry; hands out [`EntryId`]s for tree navigation and resolves
/// [`EntryOffset`]s for reference chasing. The construction API only ever
/// attaches a fresh entry under an existing parent, so the child graph is a
/// forest by construction and consumers never need cycle checks on it.
#[derive(Debug, Default)]
pub struct DebugInfo
{
    entries: Vec<DebugEntry>,
    units: Vec<EntryId>,
    by_offset: HashMap<EntryOffset, EntryId>,
}

impl DebugInfo
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Add a compilation-unit root
    pub fn new_unit(&mut self, entry: DebugEntry) -> EntryId
    {
        let id = self.push(entry);
        self.units.push(id);
        id
    }

    /// Attach `entry` as the last child of `parent`
    pub fn add_child(&mut self, parent: EntryId, entry: DebugEntry) -> EntryId
    {
        let id = self.push(entry);
        self.entries[parent.0].children.push(id);
        id
    }

    pub fn entry(&self, id: EntryId) -> &DebugEntry
    {
        &self.entries[id.0]
    }

    /// Compilation-unit roots, in producer order
    pub fn units(&self) -> &[EntryId]
    {
        &self.units
    }

    /// Look up an entry by its persistent offset
    ///
    /// This is how cross-entry references (type refs, specification and
    /// origin links) are chased, including across compilation units. Returns
    /// `None` for offsets no registered entry carries.
    pub fn entry_at_offset(&self, offset: EntryOffset) -> Option<EntryId>
    {
        self.by_offset.get(&offset).copied()
    }

    /// Total number of entries across all units
    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: DebugEntry) -> EntryId
    {
        let id = EntryId(self.entries.len());
        let offset = entry.offset;
        self.entries.push(entry);
        if let Some(existing) = self.by_offset.insert(offset, id) {
            // First registration wins for lookup; later duplicates keep their
            // place in the tree but are not reachable by offset.
            debug!(%offset, "duplicate entry offset, keeping first registration");
            self.by_offset.insert(offset, existing);
        }
        id
    }
}
