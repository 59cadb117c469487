//! Rendering of statement results to a terminal or as JSON.

use simpledb_core::Value;
use simpledb_storage::{CommandOk, ExecResult, QueryResult};

pub fn print_result(result: &ExecResult, json: bool) {
    if json {
        print_json(result);
    } else {
        print_human(result);
    }
}

fn print_json(result: &ExecResult) {
    let value = match result {
        ExecResult::Command(cmd) => serde_json::json!({
            "rows_affected": cmd.rows_affected,
            "message": cmd.message,
        }),
        ExecResult::Query(query) => serde_json::json!({
            "columns": query.columns,
            "rows": query.rows.iter().map(|r| r.iter().map(value_to_json).collect::<Vec<_>>()).collect::<Vec<_>>(),
        }),
    };
    if let Ok(s) = serde_json::to_string_pretty(&value) {
        println!("{s}");
    }
}

fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Integer(i) => serde_json::json!(i),
        Value::Text(s) => serde_json::json!(s),
        Value::Boolean(b) => serde_json::json!(b),
        Value::Null => serde_json::Value::Null,
    }
}

fn print_human(result: &ExecResult) {
    match result {
        ExecResult::Command(cmd) => print_command(cmd),
        ExecResult::Query(query) => print_query(query),
    }
}

fn print_command(cmd: &CommandOk) {
    println!("{}", cmd.message);
}

fn print_query(query: &QueryResult) {
    if query.columns.is_empty() {
        println!("(0 columns)");
        return;
    }

    let mut widths: Vec<usize> = query.columns.iter().map(|c| c.len()).collect();
    for row in &query.rows {
        for (i, v) in row.iter().enumerate() {
            widths[i] = widths[i].max(format_value(v).len());
        }
    }

    print_row(&query.columns, &widths);
    println!("{}", widths.iter().map(|w| "-".repeat(w + 2)).collect::<Vec<_>>().join("+"));
    for row in &query.rows {
        let formatted: Vec<String> = row.iter().map(format_value).collect();
        print_row(&formatted, &widths);
    }

    println!("({} row{})", query.rows.len(), if query.rows.len() == 1 { "" } else { "s" });
}

fn print_row(cells: &[impl AsRef<str>], widths: &[usize]) {
    let rendered: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!(" {:<width$} ", c.as_ref(), width = w))
        .collect();
    println!("{}", rendered.join("|"));
}

fn format_value(v: &Value) -> String {
    match v {
        Value::Integer(i) => i.to_string(),
        Value::Text(s) => s.clone(),
        Value::Boolean(b) => b.to_string(),
        Value::Null => "NULL".to_string(),
    }
}
