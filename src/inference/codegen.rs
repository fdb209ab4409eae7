//! Textual renderings of an inferred schema for persistence outside the
//! process: Rust source for pasting into a project, JSON for tooling.

use std::fmt::Write;

use crate::schema::{ColumnType, CsvSchema};

/// Render a schema as Rust source: a `pub fn` returning the [`CsvSchema`].
///
/// Output is deterministic for a given schema, so the generated code can be
/// committed and diffed.
pub fn schema_to_code(schema: &CsvSchema, name: &str) -> String {
    let mut out = String::new();
    let fn_name = to_snake_case(name);

    // Writing to a String cannot fail.
    let _ = writeln!(out, "pub fn {fn_name}_schema() -> CsvSchema {{");
    let _ = writeln!(out, "    CsvSchema {{");
    let _ = writeln!(out, "        min_columns: {},", schema.min_columns);
    let _ = writeln!(out, "        strict_columns: {},", schema.strict_columns);
    let _ = writeln!(out, "        columns: vec![");

    for col in &schema.columns {
        let _ = writeln!(out, "            ColumnDef {{");
        let _ = writeln!(out, "                index: {},", col.index);
        let _ = writeln!(out, "                name: {:?}.to_string(),", col.name);
        let _ = writeln!(
            out,
            "                data_type: ColumnType::{},",
            type_variant(col.data_type)
        );
        let _ = writeln!(out, "                required: {},", col.required);
        if col.min_length > 0 {
            let _ = writeln!(out, "                min_length: {},", col.min_length);
        }
        if col.max_length > 0 {
            let _ = writeln!(out, "                max_length: {},", col.max_length);
        }
        if let Some(min) = col.min {
            let _ = writeln!(out, "                min: Some({min:.2}),");
        }
        if let Some(max) = col.max {
            let _ = writeln!(out, "                max: Some({max:.2}),");
        }
        if let Some(pattern) = &col.pattern {
            let _ = writeln!(
                out,
                "                pattern: Some({pattern:?}.to_string()),"
            );
        }
        if let Some(format) = &col.date_format {
            let _ = writeln!(
                out,
                "                date_format: Some({format:?}.to_string()),"
            );
        }
        if !col.allowed_values.is_empty() {
            let values = col
                .allowed_values
                .iter()
                .map(|v| format!("{v:?}.to_string()"))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "                allowed_values: vec![{values}],");
        }
        let _ = writeln!(out, "                ..ColumnDef::default()");
        let _ = writeln!(out, "            }},");
    }

    let _ = writeln!(out, "        ],");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");

    out
}

/// Render a schema as pretty-printed JSON.
pub fn schema_to_json(schema: &CsvSchema) -> serde_json::Result<String> {
    serde_json::to_string_pretty(schema)
}

fn type_variant(data_type: ColumnType) -> &'static str {
    match data_type {
        ColumnType::String => "String",
        ColumnType::Int => "Int",
        ColumnType::Float => "Float",
        ColumnType::Bool => "Bool",
        ColumnType::Date => "Date",
        ColumnType::DateTime => "DateTime",
        ColumnType::Email => "Email",
        ColumnType::Regex => "Regex",
    }
}

// "StockData" -> "stock_data"; already-snake input passes through.
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '-' || c == ' ' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }
    out
}
