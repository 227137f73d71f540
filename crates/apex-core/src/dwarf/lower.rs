//! Lowering decoded DWARF into the debug-entry tree.
//!
//! The walk over each compilation unit is iterative: `next_dfs` hands back
//! depth deltas, and an explicit parent stack turns them into tree edges.
//! Input nesting is therefore bounded by [`MAX_TREE_DEPTH`], not by the call
//! stack; entries beyond the cap (and everything beneath them) are dropped
//! with a warning instead of aborting the lowering.

use gimli::{constants, AttributeValue, DebuggingInformationEntry, Reader, Unit, UnitOffset, UnitSectionOffset};
use tracing::{debug, warn};

use crate::dwarf::image::{DebugImage, OwnedDwarf, OwnedReader};
use crate::entry::{AttrKind, AttrValue, DebugAttr, DebugEntry, DebugInfo, EntryId, EntryOffset, EntryTag};
use crate::error::{map_dwarf_error, Result};

/// Deepest entry nesting the lowering will follow.
const MAX_TREE_DEPTH: usize = 256;

/// Lower everything `image` carries into one [`DebugInfo`]
///
/// A binary without debug sections lowers to an empty tree; only malformed
/// section data is an error.
pub fn lower_image(image: &DebugImage) -> Result<DebugInfo>
{
    if !image.has_debug_info() {
        debug!(path = %image.path().display(), "no debug info in image, lowering to an empty tree");
        return Ok(DebugInfo::new());
    }
    lower_dwarf(image.dwarf()?)
}

pub(crate) fn lower_dwarf(dwarf: &OwnedDwarf) -> Result<DebugInfo>
{
    let mut info = DebugInfo::new();
    let mut headers = dwarf.units();
    while let Some(header) = headers
        .next()
        .map_err(|err| map_dwarf_error("reading .debug_info unit header", err))?
    {
        let unit = dwarf
            .unit(header)
            .map_err(|err| map_dwarf_error("parsing compilation unit", err))?;
        lower_unit(dwarf, &unit, &mut info)?;
    }
    debug!(units = info.units().len(), entries = info.len(), "lowered debug info");
    Ok(info)
}

fn lower_unit(dwarf: &OwnedDwarf, unit: &Unit<OwnedReader>, info: &mut DebugInfo) -> Result<()>
{
    // parents[d] is the arena id of the current ancestor at depth d.
    let mut parents: Vec<EntryId> = Vec::new();
    let mut depth: isize = 0;
    let mut dropped = 0usize;

    let mut cursor = unit.entries();
    while let Some((delta, die)) = cursor
        .next_dfs()
        .map_err(|err| map_dwarf_error("traversing entry tree", err))?
    {
        depth += delta;

        if parents.is_empty() {
            // First entry of the unit is its root.
            let lowered = lower_entry(dwarf, unit, die)?;
            let id = info.new_unit(lowered);
            parents.push(id);
            continue;
        }

        let level = usize::try_from(depth).unwrap_or(0);
        if level == 0 || level > MAX_TREE_DEPTH || parents.len() < level {
            // Beyond the cap, or beneath an entry that was. Dropping the
            // parent drops the whole subtree.
            dropped += 1;
            continue;
        }

        let lowered = lower_entry(dwarf, unit, die)?;
        parents.truncate(level);
        let id = info.add_child(parents[level - 1], lowered);
        parents.push(id);
    }

    if dropped > 0 {
        warn!(dropped, max_depth = MAX_TREE_DEPTH, "dropped entries nested beyond the depth cap");
    }
    Ok(())
}

fn lower_entry(
    dwarf: &OwnedDwarf,
    unit: &Unit<OwnedReader>,
    die: &DebuggingInformationEntry<'_, '_, OwnedReader>,
) -> Result<DebugEntry>
{
    let mut lowered = DebugEntry::new(lower_tag(die.tag()), entry_offset(unit, die.offset()));

    let mut attrs = die.attrs();
    while let Some(attr) = attrs
        .next()
        .map_err(|err| map_dwarf_error("reading entry attributes", err))?
    {
        lowered.attrs.push(DebugAttr {
            kind: lower_attr_kind(attr.name()),
            value: lower_attr_value(dwarf, unit, attr.value())?,
        });
    }

    Ok(lowered)
}

/// Section offset of `offset` within `unit`, the persistent entry identity
fn entry_offset(unit: &Unit<OwnedReader>, offset: UnitOffset<usize>) -> EntryOffset
{
    match offset.to_unit_section_offset(unit) {
        UnitSectionOffset::DebugInfoOffset(section) => EntryOffset::new(section.0 as u64),
        UnitSectionOffset::DebugTypesOffset(section) => EntryOffset::new(section.0 as u64),
    }
}

fn lower_tag(tag: constants::DwTag) -> EntryTag
{
    match tag {
        constants::DW_TAG_compile_unit => EntryTag::CompileUnit,
        constants::DW_TAG_class_type => EntryTag::ClassType,
        constants::DW_TAG_structure_type => EntryTag::StructureType,
        constants::DW_TAG_enumeration_type => EntryTag::EnumerationType,
        constants::DW_TAG_union_type => EntryTag::UnionType,
        constants::DW_TAG_subprogram => EntryTag::Subprogram,
        constants::DW_TAG_formal_parameter => EntryTag::FormalParameter,
        constants::DW_TAG_member => EntryTag::Member,
        constants::DW_TAG_inheritance => EntryTag::Inheritance,
        constants::DW_TAG_variable => EntryTag::Variable,
        constants::DW_TAG_namespace => EntryTag::Namespace,
        constants::DW_TAG_typedef => EntryTag::Typedef,
        constants::DW_TAG_array_type => EntryTag::ArrayType,
        constants::DW_TAG_base_type => EntryTag::BaseType,
        constants::DW_TAG_pointer_type => EntryTag::PointerType,
        constants::DW_TAG_reference_type => EntryTag::ReferenceType,
        constants::DW_TAG_const_type => EntryTag::ConstType,
        constants::DW_TAG_subroutine_type => EntryTag::SubroutineType,
        constants::DW_TAG_inlined_subroutine => EntryTag::InlinedSubroutine,
        constants::DW_TAG_unspecified_parameters => EntryTag::UnspecifiedParameters,
        constants::DW_TAG_imported_declaration => EntryTag::ImportedDeclaration,
        constants::DW_TAG_template_type_parameter => EntryTag::TemplateTypeParameter,
        other if other.0 >= constants::DW_TAG_lo_user.0 => EntryTag::Vendor(other.0),
        other => EntryTag::Unknown(other.0),
    }
}

fn lower_attr_kind(name: constants::DwAt) -> AttrKind
{
    match name {
        constants::DW_AT_name => AttrKind::Name,
        constants::DW_AT_type => AttrKind::TypeRef,
        constants::DW_AT_declaration => AttrKind::Declaration,
        constants::DW_AT_artificial => AttrKind::Artificial,
        constants::DW_AT_low_pc => AttrKind::EntryAddress,
        constants::DW_AT_specification => AttrKind::Specification,
        constants::DW_AT_abstract_origin => AttrKind::AbstractOrigin,
        constants::DW_AT_external => AttrKind::External,
        constants::DW_AT_decl_file => AttrKind::DeclFile,
        constants::DW_AT_decl_line => AttrKind::DeclLine,
        constants::DW_AT_sibling => AttrKind::Sibling,
        constants::DW_AT_linkage_name => AttrKind::LinkageName,
        constants::DW_AT_object_pointer => AttrKind::ObjectPointer,
        constants::DW_AT_inline => AttrKind::Inline,
        constants::DW_AT_frame_base => AttrKind::FrameBase,
        constants::DW_AT_location => AttrKind::Location,
        constants::DW_AT_high_pc => AttrKind::HighAddress,
        constants::DW_AT_accessibility => AttrKind::Accessibility,
        other if (constants::DW_AT_lo_user.0..=constants::DW_AT_hi_user.0).contains(&other.0) => AttrKind::Vendor(other.0),
        other => AttrKind::Unknown(other.0),
    }
}

/// Decode the attribute forms the tree model carries
///
/// Strings are resolved through the DWARF string sections, unit-local
/// references are widened to section offsets, and indexed addresses are
/// looked up in `.debug_addr`. Forms outside the model (expression blobs,
/// constants, range lists) lower to [`AttrValue::Unrecognized`]; the
/// attributes that carry them are ones the builder discards anyway.
fn lower_attr_value(dwarf: &OwnedDwarf, unit: &Unit<OwnedReader>, value: AttributeValue<OwnedReader>) -> Result<AttrValue>
{
    Ok(match value {
        AttributeValue::Flag(flag) => AttrValue::Flag(flag),
        AttributeValue::Addr(address) => AttrValue::Address(address),
        AttributeValue::DebugAddrIndex(index) => {
            let address = dwarf
                .address(unit, index)
                .map_err(|err| map_dwarf_error("resolving indexed address", err))?;
            AttrValue::Address(address)
        }
        AttributeValue::UnitRef(offset) => AttrValue::Ref(entry_offset(unit, offset)),
        AttributeValue::DebugInfoRef(offset) => AttrValue::Ref(EntryOffset::new(offset.0 as u64)),
        string_form @ (AttributeValue::String(_)
        | AttributeValue::DebugStrRef(_)
        | AttributeValue::DebugStrOffsetsIndex(_)
        | AttributeValue::DebugLineStrRef(_)) => {
            let reader = dwarf
                .attr_string(unit, string_form)
                .map_err(|err| map_dwarf_error("resolving entry string", err))?;
            let owned = match reader.to_string() {
                Ok(cow) => cow.into_owned(),
                Err(_) => reader
                    .to_string_lossy()
                    .map_err(|err| map_dwarf_error("decoding entry string", err))?
                    .into_owned(),
            };
            AttrValue::Str(owned)
        }
        _ => AttrValue::Unrecognized,
    })
}
