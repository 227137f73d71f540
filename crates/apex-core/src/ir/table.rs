//! Symbol table: the one owner of every constructed symbol.

use tracing::warn;

use crate::ir::symbol::{Symbol, SymbolIndex};

/// Growable, index-addressed owner of all [`Symbol`]s from one build
///
/// Slot 0 is permanently vacant; it backs the [`SymbolIndex::NONE`] sentinel.
/// Every other slot is in one of two states: *reserved* (some entry
/// referenced its offset, nothing populated it yet) or *populated*. Reserved
/// slots that survive a complete build are unresolved references; they read
/// as absent rather than failing.
#[derive(Debug)]
pub struct SymbolTable
{
    slots: Vec<Option<Symbol>>,
}

impl SymbolTable
{
    pub fn new() -> Self
    {
        // Slot 0 exists from the start and stays vacant.
        Self { slots: vec![None] }
    }

    /// Read the symbol at `index`
    ///
    /// Returns `None` for the sentinel index, for slots never allocated, and
    /// for reserved-but-unpopulated slots. Absence is a valid observable
    /// state for consumers, not an error.
    pub fn get(&self, index: SymbolIndex) -> Option<&Symbol>
    {
        if index.is_none() {
            return None;
        }
        self.slots.get(index.value() as usize).and_then(Option::as_ref)
    }

    /// Grow the table so the slot for `index` exists
    pub fn reserve(&mut self, index: SymbolIndex)
    {
        let slot = index.value() as usize;
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, None);
        }
    }

    /// Put `symbol` in the slot for `index`
    ///
    /// Populating an already-populated slot replaces the previous symbol;
    /// that only happens on malformed input carrying duplicate definitions,
    /// so it is logged.
    pub fn install(&mut self, index: SymbolIndex, symbol: Symbol)
    {
        if index.is_none() {
            // Slot 0 stays vacant.
            warn!("refusing to install a symbol at the reserved index 0");
            return;
        }
        self.reserve(index);
        let slot = &mut self.slots[index.value() as usize];
        if slot.is_some() {
            warn!(%index, "replacing an already populated symbol slot");
        }
        *slot = Some(symbol);
    }

    /// Number of slots, including the reserved slot 0
    pub fn len(&self) -> usize
    {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.slots.len() <= 1
    }

    /// Number of populated slots
    pub fn populated(&self) -> usize
    {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Indices that were referenced but never populated
    ///
    /// Empty after a build whose input defined every entry it referenced.
    pub fn unresolved(&self) -> Vec<SymbolIndex>
    {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, slot)| slot.is_none())
            .map(|(index, _)| SymbolIndex::new(index as u32))
            .collect()
    }

    /// Populated symbols in index order
    pub fn iter(&self) -> impl Iterator<Item = (SymbolIndex, &Symbol)>
    {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(index, slot)| slot.as_ref().map(|symbol| (SymbolIndex::new(index as u32), symbol)))
    }
}

impl Default for SymbolTable
{
    fn default() -> Self
    {
        Self::new()
    }
}
