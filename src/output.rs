/// Result rendering for the shell: box-drawn tables or JSON.
use comfy_table::{presets::UTF8_FULL, Cell, Table as ComfyTable};
use serde_json::json;

use crate::core::{CompatError, ResultSet, Value};

#[must_use]
pub fn format_result(result: &ResultSet) -> String {
    if result.columns().is_empty() {
        return format!("OK, {} rows affected\n", result.rows_affected());
    }
    if result.is_empty() {
        return "(0 rows)\n".to_string();
    }

    let mut table = ComfyTable::new();
    table.load_preset(UTF8_FULL);
    table.set_header(result.columns().iter().map(Cell::new));
    for row in result.rows() {
        table.add_row(row.values().iter().map(|v| Cell::new(v.to_string())));
    }

    format!("{}\n({} rows)\n", table, result.rows().len())
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => json!(i),
        Value::Real(r) => json!(r),
        Value::Text(s) => json!(s),
        Value::Boolean(b) => json!(b),
        Value::Timestamp(_) => json!(value.to_string()),
    }
}

/// `{"columns": [...], "rows": [[...]], "rows_affected": n, "last_insert_id": n}`
pub fn format_json(result: &ResultSet) -> Result<String, CompatError> {
    let rows: Vec<Vec<serde_json::Value>> = result
        .rows()
        .iter()
        .map(|row| row.values().iter().map(json_value).collect())
        .collect();

    let document = json!({
        "columns": result.columns(),
        "rows": rows,
        "rows_affected": result.rows_affected(),
        "last_insert_id": result.last_insert_id(),
    });
    Ok(serde_json::to_string_pretty(&document)?)
}
