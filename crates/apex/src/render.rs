//! Text rendering of a built API surface.
//!
//! Everything here reads the symbol table strictly through indices, the
//! same way any other consumer would. Reserved-but-unpopulated indices are
//! printed as `type#N` so gaps in the extraction stay visible instead of
//! masquerading as real types.

use std::collections::HashSet;

use apex_core::ir::{ApiSurface, FunctionSymbol, StructureSymbol, Symbol, SymbolIndex, SymbolTable};

/// Print every structure with its bases, nested types, and methods
pub fn print_structures(table: &SymbolTable)
{
    for (index, symbol) in table.iter() {
        if let Symbol::Structure(structure) = symbol {
            print_structure(table, index, structure);
        }
    }
}

fn print_structure(table: &SymbolTable, index: SymbolIndex, structure: &StructureSymbol)
{
    let name = if structure.name.is_empty() {
        "<anonymous>"
    } else {
        &structure.name
    };
    println!("class {name}{} {}", flag_suffix(structure.declaration, structure.artificial), index);

    if !structure.bases.is_empty() {
        let bases: Vec<String> = structure.bases.iter().map(|&base| type_name(table, base)).collect();
        println!("  bases: {}", bases.join(", "));
    }
    for &nested in &structure.structures {
        println!("  nested {}", type_name(table, nested));
    }
    for &method in &structure.functions {
        match table.get(method) {
            Some(Symbol::Function(function)) => println!("  {}", function_line(table, function)),
            _ => println!("  {}", type_name(table, method)),
        }
    }
    println!();
}

/// Print functions that are not a method of any structure
pub fn print_free_functions(table: &SymbolTable)
{
    let members = member_function_indices(table);

    println!("functions:");
    for (index, symbol) in table.iter() {
        if members.contains(&index) {
            continue;
        }
        if let Symbol::Function(function) = symbol {
            println!("  {}", function_line(table, function));
        }
    }
}

/// Print every function, methods included
pub fn print_functions(table: &SymbolTable)
{
    for (_, symbol) in table.iter() {
        if let Symbol::Function(function) = symbol {
            println!("{}", function_line(table, function));
        }
    }
}

/// Print the build summary and table totals
pub fn print_stats(surface: &ApiSurface)
{
    let summary = &surface.summary;
    let table = &surface.table;

    println!("Build Summary:");
    println!("  Structures:      {}", summary.structures);
    println!("  Functions:       {}", summary.functions);
    println!("  Types deferred:  {}", summary.types_deferred);
    println!("  Unsupported:     {}", summary.unsupported);
    println!("  Out of scope:    {}", summary.out_of_scope);
    println!("  Unhandled tags:  {}", summary.unhandled_tags);
    println!("  Unhandled attrs: {}", summary.unhandled_attrs);

    println!("\nSymbol Table:");
    println!("  Allocated:  {}", table.len().saturating_sub(1));
    println!("  Populated:  {}", table.populated());
    println!("  Unresolved: {}", table.unresolved().len());
}

fn member_function_indices(table: &SymbolTable) -> HashSet<SymbolIndex>
{
    let mut members = HashSet::new();
    for (_, symbol) in table.iter() {
        if let Symbol::Structure(structure) = symbol {
            members.extend(structure.functions.iter().copied());
        }
    }
    members
}

fn function_line(table: &SymbolTable, function: &FunctionSymbol) -> String
{
    let name = if function.name.is_empty() { "<unnamed>" } else { &function.name };

    let parameters: Vec<String> = function
        .parameters
        .iter()
        .map(|parameter| {
            if parameter.name.is_empty() {
                type_name(table, parameter.ty)
            } else {
                format!("{}: {}", parameter.name, type_name(table, parameter.ty))
            }
        })
        .collect();

    let mut line = format!("{name}({}) -> {}", parameters.join(", "), type_name(table, function.return_type));
    if function.address != 0 {
        line.push_str(&format!(" @ 0x{:016x}", function.address));
    }
    line.push_str(&flag_suffix(function.declaration, function.artificial));
    line
}

/// Name for an index in type position
///
/// `void` for the absent sentinel, the symbol's name when the slot is
/// populated, and the raw `type#N` handle when it was referenced but never
/// resolved.
fn type_name(table: &SymbolTable, index: SymbolIndex) -> String
{
    if index.is_none() {
        return "void".to_string();
    }
    match table.get(index) {
        Some(symbol) if !symbol.name().is_empty() => symbol.name().to_string(),
        _ => format!("type{index}"),
    }
}

fn flag_suffix(declaration: bool, artificial: bool) -> String
{
    let mut suffix = String::new();
    if declaration {
        suffix.push_str(" [declaration]");
    }
    if artificial {
        suffix.push_str(" [artificial]");
    }
    suffix
}
