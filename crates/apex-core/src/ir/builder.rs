//! # Surface Builder
//!
//! The construction engine: walks a [`DebugInfo`] tree and produces the
//! symbol table describing the binary's API surface.
//!
//! The walk is work-list driven rather than recursive, so input nesting
//! depth never translates into call-stack depth. Forward references are
//! absorbed by the index allocator: the first *mention* of an offset fixes
//! its index, whether that mention is the entry's own visit or a reference
//! from something built earlier. Attribute merging across
//! specification/abstract-origin chains is fill-if-missing, with the primary
//! entry's facts (and only its flags) taking precedence.
//!
//! Unrecognized input never aborts a build; it is logged, counted in the
//! [`BuildSummary`], and skipped. The single fatal case is a tag reaching a
//! builder it was never dispatched to, which is a bug in this module, not in
//! the input.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::entry::{AttrKind, AttrValue, DebugEntry, DebugInfo, EntryId, EntryOffset, EntryTag};
use crate::ir::allocator::SymbolIndexAllocator;
use crate::ir::symbol::{FunctionSymbol, Parameter, StructureSymbol, Symbol, SymbolIndex};
use crate::ir::table::SymbolTable;

/// Longest specification/abstract-origin chain the function builder will
/// follow before giving up on a link.
const MAX_LINK_DEPTH: usize = 32;

/// What a build visited, skipped, and could not place
///
/// All counters are informational; none of them implies failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary
{
    /// Structure symbols installed
    pub structures: usize,
    /// Function symbols installed
    pub functions: usize,
    /// Type entries seen at scope level (recognized, not yet modeled)
    pub types_deferred: usize,
    /// Enumeration/union entries (recognized, not yet modeled)
    pub unsupported: usize,
    /// Typedefs, variables, and imports recorded and skipped
    pub out_of_scope: usize,
    /// Entries whose tag no dispatch rule covers
    pub unhandled_tags: usize,
    /// Attributes no parsing rule covers
    pub unhandled_attrs: usize,
}

/// The finished product of one build: the symbol table plus its summary
#[derive(Debug)]
pub struct ApiSurface
{
    pub table: SymbolTable,
    pub summary: BuildSummary,
}

impl ApiSurface
{
    /// Build the API surface for one debug-info tree
    ///
    /// Convenience for [`SurfaceBuilder::new`] + [`SurfaceBuilder::build`].
    /// Never fails: malformed or unsupported input degrades to logged gaps,
    /// and an empty tree yields an empty surface.
    #[must_use]
    pub fn build(info: &DebugInfo) -> Self
    {
        SurfaceBuilder::new(info).build()
    }
}

/// Pending construction work
enum Task
{
    /// Dispatch the children of a unit root or namespace
    Scope(EntryId),
    /// Run the structure builder on a class/struct/enum/union entry
    Structure(EntryId),
    /// Run the function builder on a subprogram entry
    Function(EntryId),
}

/// One build session over one [`DebugInfo`]
///
/// Owns the table and the index allocator for the duration of the build;
/// nothing persists across sessions, so two builds over the same tree are
/// fully independent (and assign identical indices).
pub struct SurfaceBuilder<'a>
{
    info: &'a DebugInfo,
    table: SymbolTable,
    allocator: SymbolIndexAllocator,
    summary: BuildSummary,
}

impl<'a> SurfaceBuilder<'a>
{
    pub fn new(info: &'a DebugInfo) -> Self
    {
        Self {
            info,
            table: SymbolTable::new(),
            allocator: SymbolIndexAllocator::new(),
            summary: BuildSummary::default(),
        }
    }

    /// Run the build to completion
    pub fn build(mut self) -> ApiSurface
    {
        let mut work: VecDeque<Task> = self.info.units().iter().copied().map(Task::Scope).collect();

        while let Some(task) = work.pop_front() {
            match task {
                Task::Scope(id) => self.visit_scope(id, &mut work),
                Task::Structure(id) => {
                    self.build_structure(id, &mut work);
                }
                Task::Function(id) => {
                    self.build_function(id);
                }
            }
        }

        let unresolved = self.table.unresolved().len();
        if unresolved > 0 {
            debug!(unresolved, "build finished with reserved but unpopulated symbol slots");
        }

        ApiSurface {
            table: self.table,
            summary: self.summary,
        }
    }

    /// Dispatch the children of a unit root or namespace by tag
    ///
    /// Namespaces are transparent: their children are dispatched by the same
    /// rules as top-level entries, and no symbol is materialized for the
    /// namespace itself.
    fn visit_scope(&mut self, id: EntryId, work: &mut VecDeque<Task>)
    {
        let info = self.info;
        for &child_id in &info.entry(id).children {
            let child = info.entry(child_id);
            match child.tag {
                EntryTag::ArrayType
                | EntryTag::BaseType
                | EntryTag::ConstType
                | EntryTag::PointerType
                | EntryTag::ReferenceType
                | EntryTag::SubroutineType => {
                    self.build_type(child);
                }
                EntryTag::ClassType | EntryTag::StructureType | EntryTag::EnumerationType | EntryTag::UnionType => {
                    work.push_back(Task::Structure(child_id));
                }
                EntryTag::Subprogram => work.push_back(Task::Function(child_id)),
                EntryTag::Namespace => work.push_back(Task::Scope(child_id)),
                EntryTag::Typedef => {
                    debug!(offset = %child.offset, "typedef recorded, not modeled");
                    self.summary.out_of_scope += 1;
                }
                EntryTag::Variable => {
                    debug!(offset = %child.offset, "variable recorded, not modeled");
                    self.summary.out_of_scope += 1;
                }
                EntryTag::ImportedDeclaration => {
                    debug!(offset = %child.offset, "imported declaration recorded, not modeled");
                    self.summary.out_of_scope += 1;
                }
                _ => {
                    warn!(tag = ?child.tag, offset = %child.offset, "unhandled top-level entry");
                    self.summary.unhandled_tags += 1;
                }
            }
        }
    }

    /// Type-entry path: recognized, not yet materialized
    ///
    /// Base, pointer, reference, const, array, and subroutine types will
    /// eventually produce [`Symbol::Type`] records carrying names and sizes.
    /// Until then the entries are acknowledged here and no symbol is
    /// installed; anything that referenced such an entry keeps a reserved
    /// index that reads as absent.
    fn build_type(&mut self, entry: &DebugEntry)
    {
        debug!(tag = ?entry.tag, offset = %entry.offset, "type entry deferred");
        self.summary.types_deferred += 1;
    }

    /// Build a structure symbol from a class/struct entry
    ///
    /// Enumerations and unions are accepted by this builder but yield no
    /// symbol yet; they return [`SymbolIndex::NONE`] so callers simply skip
    /// them. Any other tag arriving here is a dispatch bug and panics.
    ///
    /// The entry's own index is resolved before any child's, so a structure
    /// that references itself (through a nested type or a base-class link)
    /// reuses its own allocation instead of looping.
    fn build_structure(&mut self, id: EntryId, work: &mut VecDeque<Task>) -> SymbolIndex
    {
        let info = self.info;
        let entry = info.entry(id);
        match entry.tag {
            EntryTag::ClassType | EntryTag::StructureType => {}
            EntryTag::EnumerationType | EntryTag::UnionType => {
                debug!(tag = ?entry.tag, offset = %entry.offset, "enumeration/union entries are not modeled yet");
                self.summary.unsupported += 1;
                return SymbolIndex::NONE;
            }
            other => panic!("structure builder dispatched on a {other:?} entry at {}", entry.offset),
        }

        let index = self.allocator.resolve(&mut self.table, entry.offset);
        let mut structure = StructureSymbol::default();
        self.parse_structure_attributes(&mut structure, entry);

        for &child_id in &entry.children {
            let child = info.entry(child_id);
            match child.tag {
                EntryTag::Subprogram => {
                    let function = self.allocator.resolve(&mut self.table, child.offset);
                    structure.functions.push(function);
                    work.push_back(Task::Function(child_id));
                }
                EntryTag::ClassType | EntryTag::StructureType => {
                    let nested = self.allocator.resolve(&mut self.table, child.offset);
                    structure.structures.push(nested);
                    work.push_back(Task::Structure(child_id));
                }
                EntryTag::EnumerationType | EntryTag::UnionType => {
                    debug!(tag = ?child.tag, offset = %child.offset, "nested enumeration/union not modeled yet");
                    self.summary.unsupported += 1;
                }
                EntryTag::Inheritance => {
                    if let Some(AttrValue::Ref(base)) = child.attr(AttrKind::TypeRef) {
                        let base = self.allocator.resolve(&mut self.table, *base);
                        structure.bases.push(base);
                    } else {
                        debug!(offset = %child.offset, "inheritance entry without a type reference");
                    }
                }
                EntryTag::Member => {
                    debug!(offset = %child.offset, "member data deferred");
                }
                EntryTag::TemplateTypeParameter => {
                    debug!(offset = %child.offset, "template parameter deferred");
                }
                EntryTag::Vendor(_) => {}
                _ => {
                    debug!(tag = ?child.tag, offset = %child.offset, "unhandled child of a structure entry");
                    self.summary.unhandled_tags += 1;
                }
            }
        }

        self.table.install(index, Symbol::Structure(structure));
        self.summary.structures += 1;
        index
    }

    fn parse_structure_attributes(&mut self, structure: &mut StructureSymbol, entry: &DebugEntry)
    {
        for attr in &entry.attrs {
            match attr.kind {
                AttrKind::Name => {
                    if let AttrValue::Str(name) = &attr.value {
                        structure.name = name.clone();
                    }
                }
                AttrKind::Declaration => {
                    if let AttrValue::Flag(flag) = attr.value {
                        structure.declaration = flag;
                    }
                }
                AttrKind::Artificial => {
                    if let AttrValue::Flag(flag) = attr.value {
                        structure.artificial = flag;
                    }
                }
                kind if is_discarded_attr(kind) => {}
                kind => {
                    debug!(?kind, offset = %entry.offset, "unhandled structure attribute");
                    self.summary.unhandled_attrs += 1;
                }
            }
        }
    }

    /// Build a function symbol from a subprogram entry
    ///
    /// A logical function's facts may be spread over a declaration, an
    /// abstract origin, and the concrete definition; the definition (the
    /// entry dispatched here) is the primary source, and linked entries only
    /// fill what it left blank.
    fn build_function(&mut self, id: EntryId) -> SymbolIndex
    {
        let info = self.info;
        let entry = info.entry(id);
        assert!(
            entry.tag == EntryTag::Subprogram,
            "function builder dispatched on a {:?} entry at {}",
            entry.tag,
            entry.offset
        );

        let index = self.allocator.resolve(&mut self.table, entry.offset);
        let mut function = FunctionSymbol::default();

        // The primary entry seeds the visited set so a link cycling back to
        // it is caught on the first hop.
        let mut visited = HashSet::new();
        visited.insert(entry.offset);
        self.parse_function_attributes(&mut function, entry, true, &mut visited, 0);
        self.parse_function_children(&mut function, entry);

        self.table.install(index, Symbol::Function(function));
        self.summary.functions += 1;
        index
    }

    /// One pass over a function entry's attributes
    ///
    /// `primary` is true only for the entry the builder was dispatched on.
    /// Non-primary passes (specification/abstract-origin targets) follow the
    /// merge rule: name, return type, and address fill in only when still
    /// blank; the declaration and artificial flags are never touched.
    fn parse_function_attributes(
        &mut self,
        function: &mut FunctionSymbol,
        entry: &DebugEntry,
        primary: bool,
        visited: &mut HashSet<EntryOffset>,
        depth: usize,
    )
    {
        for attr in &entry.attrs {
            match attr.kind {
                AttrKind::Declaration => {
                    if primary {
                        if let AttrValue::Flag(flag) = attr.value {
                            function.declaration = flag;
                        }
                    }
                }
                AttrKind::Artificial => {
                    if primary {
                        if let AttrValue::Flag(flag) = attr.value {
                            function.artificial = flag;
                        }
                    }
                }
                AttrKind::Name => {
                    if let AttrValue::Str(name) = &attr.value {
                        if primary || function.name.is_empty() {
                            function.name = name.clone();
                        }
                    }
                }
                AttrKind::TypeRef => {
                    if let AttrValue::Ref(target) = attr.value {
                        if primary || function.return_type.is_none() {
                            function.return_type = self.allocator.resolve(&mut self.table, target);
                        }
                    }
                }
                AttrKind::EntryAddress => {
                    if let AttrValue::Address(address) = attr.value {
                        if primary || function.address == 0 {
                            function.address = address;
                        }
                    }
                }
                AttrKind::Specification | AttrKind::AbstractOrigin => {
                    if let AttrValue::Ref(target) = attr.value {
                        self.follow_function_link(function, target, visited, depth);
                    }
                }
                kind if is_discarded_attr(kind) => {}
                kind => {
                    debug!(?kind, offset = %entry.offset, "unhandled function attribute");
                    self.summary.unhandled_attrs += 1;
                }
            }
        }
    }

    /// Chase one specification/abstract-origin link, non-primary
    fn follow_function_link(
        &mut self,
        function: &mut FunctionSymbol,
        target: EntryOffset,
        visited: &mut HashSet<EntryOffset>,
        depth: usize,
    )
    {
        if depth >= MAX_LINK_DEPTH {
            warn!(%target, depth, "specification chain too deep, truncating");
            return;
        }
        if !visited.insert(target) {
            warn!(%target, "cyclic specification chain, truncating");
            return;
        }
        let Some(target_id) = self.info.entry_at_offset(target) else {
            debug!(%target, "specification link target is not in the tree");
            return;
        };
        let target_entry = self.info.entry(target_id);
        self.parse_function_attributes(function, target_entry, false, visited, depth + 1);
    }

    /// Scan a function entry's children for parameters
    ///
    /// Only the primary entry's children are scanned; linked entries
    /// contribute attributes, never parameters.
    fn parse_function_children(&mut self, function: &mut FunctionSymbol, entry: &DebugEntry)
    {
        let info = self.info;
        for &child_id in &entry.children {
            let child = info.entry(child_id);
            match child.tag {
                EntryTag::FormalParameter => {
                    let mut parameter = Parameter::default();
                    let mut artificial = false;
                    for attr in &child.attrs {
                        match attr.kind {
                            AttrKind::Name => {
                                if let AttrValue::Str(name) = &attr.value {
                                    parameter.name = name.clone();
                                }
                            }
                            AttrKind::TypeRef => {
                                if let AttrValue::Ref(target) = attr.value {
                                    parameter.ty = self.allocator.resolve(&mut self.table, target);
                                }
                            }
                            AttrKind::Artificial => {
                                if let AttrValue::Flag(flag) = attr.value {
                                    artificial = flag;
                                }
                            }
                            // Merge links are not followed at parameter level.
                            AttrKind::AbstractOrigin => {}
                            kind if is_discarded_attr(kind) => {}
                            kind => {
                                debug!(?kind, offset = %child.offset, "unhandled parameter attribute");
                                self.summary.unhandled_attrs += 1;
                            }
                        }
                    }
                    if artificial {
                        // An implicit receiver stays out of the visible
                        // signature but marks the function. Set-only: a later
                        // ordinary parameter must not clear it.
                        function.artificial = true;
                    } else {
                        function.parameters.push(parameter);
                    }
                }
                EntryTag::Variable => {
                    debug!(offset = %child.offset, "function-local variable recorded, not modeled");
                    self.summary.out_of_scope += 1;
                }
                EntryTag::InlinedSubroutine | EntryTag::UnspecifiedParameters | EntryTag::Vendor(_) => {}
                _ => {
                    debug!(tag = ?child.tag, offset = %child.offset, "unhandled child of a function entry");
                    self.summary.unhandled_tags += 1;
                }
            }
        }
    }
}

/// Attributes recognized only so they can be dropped without diagnostics
fn is_discarded_attr(kind: AttrKind) -> bool
{
    matches!(
        kind,
        AttrKind::External
            | AttrKind::DeclFile
            | AttrKind::DeclLine
            | AttrKind::Sibling
            | AttrKind::LinkageName
            | AttrKind::ObjectPointer
            | AttrKind::Inline
            | AttrKind::FrameBase
            | AttrKind::Location
            | AttrKind::HighAddress
            | AttrKind::Accessibility
            | AttrKind::Vendor(_)
    )
}
