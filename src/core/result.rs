use std::sync::Arc;

use super::error::CompatError;
use super::value::Value;

/// One row of a result. Shares the column list with its `ResultSet`, so a row
/// can be read by column name or by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// (column name, value) pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

/// Uniform result shape shared by emulated statements and the backend.
///
/// Every row carries exactly the result's column list; `ResultSet::new`
/// rejects rows of the wrong width.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    columns: Arc<[String]>,
    rows: Vec<Row>,
    rows_affected: u64,
    last_insert_id: u64,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, CompatError> {
        let columns: Arc<[String]> = Arc::from(columns);

        let rows = rows
            .into_iter()
            .map(|values| {
                if values.len() == columns.len() {
                    Ok(Row {
                        columns: Arc::clone(&columns),
                        values,
                    })
                } else {
                    Err(CompatError::ColumnCountMismatch {
                        expected: columns.len(),
                        actual: values.len(),
                    })
                }
            })
            .collect::<Result<Vec<Row>, CompatError>>()?;

        Ok(Self {
            columns,
            rows,
            rows_affected: 0,
            last_insert_id: 0,
        })
    }

    /// No columns, no rows, nothing affected.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            columns: Arc::from(Vec::new()),
            rows: Vec::new(),
            rows_affected: 0,
            last_insert_id: 0,
        }
    }

    /// Result of a write that returns no rows.
    #[must_use]
    pub fn affected(rows_affected: u64, last_insert_id: u64) -> Self {
        Self {
            rows_affected,
            last_insert_id,
            ..Self::empty()
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub const fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    #[must_use]
    pub const fn last_insert_id(&self) -> u64 {
        self.last_insert_id
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keeps only the rows matching `predicate`, preserving their order.
    #[must_use]
    pub fn retain_rows<F>(mut self, predicate: F) -> Self
    where
        F: FnMut(&Row) -> bool,
    {
        self.rows.retain(predicate);
        self
    }
}
