//! Tests for the debug-entry tree

use apex_core::entry::{AttrKind, AttrValue, DebugEntry, DebugInfo, EntryOffset, EntryTag};

#[test]
fn test_entry_offset_roundtrip()
{
    let offset = EntryOffset::new(0x1234);
    assert_eq!(offset.value(), 0x1234);

    let from_raw = EntryOffset::from(0x1234u64);
    assert_eq!(offset, from_raw);

    let back: u64 = offset.into();
    assert_eq!(back, 0x1234);
}

#[test]
fn test_entry_offset_display()
{
    assert_eq!(EntryOffset::new(0x10).to_string(), "0x00000010");
    assert_eq!(EntryOffset::new(0xdead_beef).to_string(), "0xdeadbeef");
}

#[test]
fn test_attr_lookup()
{
    let entry = DebugEntry::new(EntryTag::ClassType, EntryOffset::new(0x10))
        .with_attr(AttrKind::Name, AttrValue::Str("Widget".to_string()))
        .with_attr(AttrKind::Declaration, AttrValue::Flag(true));

    assert_eq!(entry.attrs.len(), 2);
    assert_eq!(entry.attr(AttrKind::Name), Some(&AttrValue::Str("Widget".to_string())));
    assert_eq!(entry.attr(AttrKind::Declaration), Some(&AttrValue::Flag(true)));
    assert_eq!(entry.attr(AttrKind::Artificial), None);
}

#[test]
fn test_attr_lookup_returns_first_of_kind()
{
    let entry = DebugEntry::new(EntryTag::Subprogram, EntryOffset::new(0x10))
        .with_attr(AttrKind::Name, AttrValue::Str("first".to_string()))
        .with_attr(AttrKind::Name, AttrValue::Str("second".to_string()));

    assert_eq!(entry.attr(AttrKind::Name), Some(&AttrValue::Str("first".to_string())));
}

#[test]
fn test_empty_info()
{
    let info = DebugInfo::new();

    assert!(info.is_empty());
    assert_eq!(info.len(), 0);
    assert!(info.units().is_empty());
    assert!(info.entry_at_offset(EntryOffset::new(0x10)).is_none());
}

#[test]
fn test_tree_construction()
{
    let mut info = DebugInfo::new();
    let root = info.new_unit(DebugEntry::new(EntryTag::CompileUnit, EntryOffset::new(0x0b)));
    let class = info.add_child(root, DebugEntry::new(EntryTag::ClassType, EntryOffset::new(0x10)));
    let method = info.add_child(class, DebugEntry::new(EntryTag::Subprogram, EntryOffset::new(0x18)));
    info.add_child(class, DebugEntry::new(EntryTag::Member, EntryOffset::new(0x20)));

    assert_eq!(info.len(), 4);
    assert_eq!(info.units(), &[root]);
    assert_eq!(info.entry(root).children, vec![class]);
    assert_eq!(info.entry(class).children.len(), 2);
    assert_eq!(info.entry(class).children[0], method);
    assert!(info.entry(method).children.is_empty());
}

#[test]
fn test_entry_at_offset_across_units()
{
    let mut info = DebugInfo::new();
    let first = info.new_unit(DebugEntry::new(EntryTag::CompileUnit, EntryOffset::new(0x0b)));
    info.add_child(first, DebugEntry::new(EntryTag::ClassType, EntryOffset::new(0x10)));
    let second = info.new_unit(DebugEntry::new(EntryTag::CompileUnit, EntryOffset::new(0x1fb)));
    let remote = info.add_child(second, DebugEntry::new(EntryTag::ClassType, EntryOffset::new(0x200)));

    assert_eq!(info.units().len(), 2);
    assert_eq!(info.entry_at_offset(EntryOffset::new(0x200)), Some(remote));
    assert_eq!(info.entry(remote).tag, EntryTag::ClassType);
    assert!(info.entry_at_offset(EntryOffset::new(0x999)).is_none());
}

#[test]
fn test_duplicate_offsets_keep_first_registration()
{
    let mut info = DebugInfo::new();
    let root = info.new_unit(DebugEntry::new(EntryTag::CompileUnit, EntryOffset::new(0x0b)));
    let original = info.add_child(root, DebugEntry::new(EntryTag::ClassType, EntryOffset::new(0x10)));
    let duplicate = info.add_child(root, DebugEntry::new(EntryTag::Subprogram, EntryOffset::new(0x10)));

    // Both entries exist in the tree; offset lookup resolves to the first.
    assert_eq!(info.len(), 3);
    assert_eq!(info.entry_at_offset(EntryOffset::new(0x10)), Some(original));
    assert_eq!(info.entry(duplicate).tag, EntryTag::Subprogram);
}
