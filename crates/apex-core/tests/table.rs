//! Tests for the symbol table and the index allocator

use apex_core::entry::EntryOffset;
use apex_core::ir::{StructureSymbol, Symbol, SymbolIndex, SymbolIndexAllocator, SymbolTable};

fn structure(name: &str) -> Symbol
{
    Symbol::Structure(StructureSymbol {
        name: name.to_string(),
        ..StructureSymbol::default()
    })
}

#[test]
fn test_new_table_is_empty()
{
    let table = SymbolTable::new();

    assert!(table.is_empty());
    assert_eq!(table.len(), 1);
    assert_eq!(table.populated(), 0);
    assert!(table.get(SymbolIndex::NONE).is_none());
    assert!(table.unresolved().is_empty());
}

#[test]
fn test_install_and_get()
{
    let mut table = SymbolTable::new();
    let index = SymbolIndex::new(1);
    table.install(index, structure("Widget"));

    assert_eq!(table.populated(), 1);
    assert!(!table.is_empty());
    match table.get(index) {
        Some(Symbol::Structure(found)) => assert_eq!(found.name, "Widget"),
        other => panic!("unexpected symbol: {other:?}"),
    }
}

#[test]
fn test_get_out_of_range()
{
    let table = SymbolTable::new();
    assert!(table.get(SymbolIndex::new(5)).is_none());
}

#[test]
fn test_install_at_sentinel_is_refused()
{
    let mut table = SymbolTable::new();
    table.install(SymbolIndex::NONE, structure("Nothing"));

    assert_eq!(table.len(), 1);
    assert_eq!(table.populated(), 0);
    assert!(table.get(SymbolIndex::NONE).is_none());
}

#[test]
fn test_reserved_slots_read_as_absent()
{
    let mut table = SymbolTable::new();
    table.reserve(SymbolIndex::new(3));

    assert_eq!(table.len(), 4);
    assert_eq!(table.populated(), 0);
    assert!(table.get(SymbolIndex::new(3)).is_none());
    assert_eq!(
        table.unresolved(),
        vec![SymbolIndex::new(1), SymbolIndex::new(2), SymbolIndex::new(3)]
    );
}

#[test]
fn test_install_replaces_populated_slot()
{
    let mut table = SymbolTable::new();
    let index = SymbolIndex::new(1);
    table.install(index, structure("First"));
    table.install(index, structure("Second"));

    assert_eq!(table.populated(), 1);
    match table.get(index) {
        Some(Symbol::Structure(found)) => assert_eq!(found.name, "Second"),
        other => panic!("unexpected symbol: {other:?}"),
    }
}

#[test]
fn test_iter_yields_populated_in_index_order()
{
    let mut table = SymbolTable::new();
    table.install(SymbolIndex::new(3), structure("C"));
    table.install(SymbolIndex::new(1), structure("A"));
    table.reserve(SymbolIndex::new(4));

    let names: Vec<&str> = table.iter().map(|(_, symbol)| symbol.name()).collect();
    assert_eq!(names, vec!["A", "C"]);

    let indices: Vec<SymbolIndex> = table.iter().map(|(index, _)| index).collect();
    assert_eq!(indices, vec![SymbolIndex::new(1), SymbolIndex::new(3)]);
}

#[test]
fn test_unresolved_after_partial_population()
{
    let mut table = SymbolTable::new();
    let mut allocator = SymbolIndexAllocator::new();

    let a = allocator.resolve(&mut table, EntryOffset::new(0x10));
    let b = allocator.resolve(&mut table, EntryOffset::new(0x20));
    let c = allocator.resolve(&mut table, EntryOffset::new(0x30));
    table.install(a, structure("A"));
    table.install(c, structure("C"));

    assert_eq!(table.unresolved(), vec![b]);
}

#[test]
fn test_allocator_is_idempotent()
{
    let mut table = SymbolTable::new();
    let mut allocator = SymbolIndexAllocator::new();

    let first = allocator.resolve(&mut table, EntryOffset::new(0x10));
    let again = allocator.resolve(&mut table, EntryOffset::new(0x10));
    let other = allocator.resolve(&mut table, EntryOffset::new(0x20));

    assert_eq!(first, again);
    assert_ne!(first, other);
    assert_eq!(allocator.allocated(), 2);
}

#[test]
fn test_allocator_starts_above_the_sentinel()
{
    let mut table = SymbolTable::new();
    let mut allocator = SymbolIndexAllocator::new();

    let first = allocator.resolve(&mut table, EntryOffset::new(0x10));
    let second = allocator.resolve(&mut table, EntryOffset::new(0x20));

    assert_eq!(first, SymbolIndex::new(1));
    assert_eq!(second, SymbolIndex::new(2));
    assert!(!first.is_none());
}

#[test]
fn test_allocator_reserves_table_slots()
{
    let mut table = SymbolTable::new();
    let mut allocator = SymbolIndexAllocator::new();

    let index = allocator.resolve(&mut table, EntryOffset::new(0x10));

    // Reserved, not populated: the slot exists and reads as absent.
    assert_eq!(table.len(), 2);
    assert!(table.get(index).is_none());
    assert_eq!(table.unresolved(), vec![index]);
}

#[test]
fn test_allocators_are_independent()
{
    let mut table_a = SymbolTable::new();
    let mut allocator_a = SymbolIndexAllocator::new();
    let mut table_b = SymbolTable::new();
    let mut allocator_b = SymbolIndexAllocator::new();

    let from_a = allocator_a.resolve(&mut table_a, EntryOffset::new(0x10));
    let from_b = allocator_b.resolve(&mut table_b, EntryOffset::new(0x99));

    // Fresh allocators hand out the same first index regardless of offset.
    assert_eq!(from_a, from_b);
    assert_eq!(from_a, SymbolIndex::new(1));
}
