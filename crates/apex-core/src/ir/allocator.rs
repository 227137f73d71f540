//! Lazy offset-to-index allocation.

use std::collections::HashMap;

use tracing::trace;

use crate::entry::EntryOffset;
use crate::ir::symbol::SymbolIndex;
use crate::ir::table::SymbolTable;

/// Maps entry offsets to stable [`SymbolIndex`]es, allocating on first sight
///
/// Forward references are the normal case in debug metadata: a method's
/// return type may be defined later in the unit, or in another unit
/// entirely. The allocator makes ordering irrelevant: *any* mention of an
/// offset (definition or reference) yields the same index, and the slot
/// exists in the table from that moment on.
///
/// One allocator serves exactly one build over one [`SymbolTable`]; nothing
/// persists across builds.
#[derive(Debug)]
pub struct SymbolIndexAllocator
{
    indices: HashMap<EntryOffset, SymbolIndex>,
    next: u32,
}

impl SymbolIndexAllocator
{
    pub fn new() -> Self
    {
        Self {
            indices: HashMap::new(),
            // Index 0 is the "no symbol" sentinel, never handed out.
            next: 1,
        }
    }

    /// Index for `offset`, allocating (and reserving the table slot) on
    /// first sight
    ///
    /// Idempotent: resolving the same offset any number of times returns the
    /// same index. Never fails.
    pub fn resolve(&mut self, table: &mut SymbolTable, offset: EntryOffset) -> SymbolIndex
    {
        if let Some(&index) = self.indices.get(&offset) {
            return index;
        }

        let index = SymbolIndex::new(self.next);
        self.next += 1;
        self.indices.insert(offset, index);
        table.reserve(index);
        trace!(%offset, %index, "allocated symbol index");
        index
    }

    /// Number of offsets allocated so far
    pub fn allocated(&self) -> usize
    {
        self.indices.len()
    }
}

impl Default for SymbolIndexAllocator
{
    fn default() -> Self
    {
        Self::new()
    }
}
