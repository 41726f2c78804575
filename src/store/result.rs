//! Tabular query results and their delimited-text export.

use serde::Serialize;

use super::value::Value;

/// Ordered columns plus ordered rows, one [`Value`] per column in each row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// A single cell by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Flatten to delimited text.
    ///
    /// One header line of column names, then one line per row, each ending in
    /// `\n`. Missing cells are empty fields. A field containing the
    /// delimiter, a double quote, or a line break is wrapped in double quotes
    /// with inner quotes doubled.
    pub fn to_delimited(&self, delimiter: char) -> String {
        let mut out = String::new();
        write_record(&mut out, self.columns.iter().map(String::as_str), delimiter);
        for row in &self.rows {
            let fields: Vec<String> = row.iter().map(Value::to_string).collect();
            write_record(&mut out, fields.iter().map(String::as_str), delimiter);
        }
        out
    }
}

fn write_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>, delimiter: char) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        push_field(out, field, delimiter);
    }
    out.push('\n');
}

fn push_field(out: &mut String, field: &str, delimiter: char) {
    let needs_quotes = field
        .chars()
        .any(|c| c == delimiter || c == '"' || c == '\n' || c == '\r');
    if needs_quotes {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
