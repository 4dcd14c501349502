use std::collections::HashSet;

use super::Connection;
use crate::analyzer::{AnalyzedQuery, Placeholder, Query};
use crate::backend::{BindVars, ParamKey};
use crate::core::{CompatError, ResultSet, Value};
use crate::fetcher::{FetchMode, FetchedRow, Fetcher};
use crate::params::ParamType;

/// A prepared statement and, once executed, its result cursor.
pub struct Statement<'a> {
    connection: &'a Connection,
    query: Query,
    params: BindVars,
    result: Option<ResultSet>,
    cursor: usize,
}

impl<'a> Statement<'a> {
    pub(crate) fn new(connection: &'a Connection, query: Query) -> Self {
        Self {
            connection,
            query,
            params: BindVars::new(),
            result: None,
            cursor: 0,
        }
    }

    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Binds a value to a 1-based position or a `:name`, coerced to `param_type`.
    pub fn bind_value(
        &mut self,
        key: impl Into<ParamKey>,
        value: &Value,
        param_type: ParamType,
    ) -> Result<(), CompatError> {
        let value = self.connection.params().process(value, param_type)?;
        self.params.bind(key.into(), value);
        Ok(())
    }

    pub fn execute(&mut self) -> Result<(), CompatError> {
        self.check_bindings()?;
        let read = self.query.query_type().is_read();
        let result = self.connection.run(self.query.clone(), &self.params, read)?;
        self.result = Some(result);
        self.cursor = 0;
        Ok(())
    }

    /// Binds `values` to the positional placeholders as strings, then executes.
    pub fn execute_with(&mut self, values: &[Value]) -> Result<(), CompatError> {
        self.params.clear();
        for (index, value) in values.iter().enumerate() {
            self.bind_value(index + 1, value, ParamType::Str)?;
        }
        self.execute()
    }

    /// Binds `values` to `:name` placeholders as strings, then executes.
    /// Keys may be given with or without the leading `:`.
    pub fn execute_named(&mut self, values: &[(&str, Value)]) -> Result<(), CompatError> {
        self.params.clear();
        for (name, value) in values {
            self.bind_value(*name, value, ParamType::Str)?;
        }
        self.execute()
    }

    fn check_bindings(&self) -> Result<(), CompatError> {
        let placeholders = self.query.placeholders();
        let positional = placeholders
            .iter()
            .filter(|p| matches!(p, Placeholder::Positional))
            .count();
        let named: HashSet<&str> = placeholders
            .iter()
            .filter_map(|p| match p {
                Placeholder::Named(name) => Some(name.as_str()),
                Placeholder::Positional => None,
            })
            .collect();

        if positional > 0 && !named.is_empty() {
            return Err(CompatError::InvalidParameterNumber(
                "mixed positional and named parameters".to_string(),
            ));
        }

        for (key, _) in self.params.iter() {
            let known = match key {
                ParamKey::Position(position) => (1..=positional).contains(position),
                ParamKey::Name(name) => named.contains(name.as_str()),
            };
            if !known {
                return Err(CompatError::InvalidParameterNumber(format!(
                    "parameter {key:?} is not used by the statement"
                )));
            }
        }

        let missing = (1..=positional)
            .map(ParamKey::Position)
            .chain(named.iter().map(|name| ParamKey::Name((*name).to_string())))
            .find(|key| self.params.get(key).is_none());
        match missing {
            Some(key) => Err(CompatError::InvalidParameterNumber(format!(
                "parameter {key:?} is not bound"
            ))),
            None => Ok(()),
        }
    }

    fn rows_left(&self) -> &[crate::core::Row] {
        match &self.result {
            Some(result) => result.rows().get(self.cursor..).unwrap_or(&[]),
            None => &[],
        }
    }

    /// Next row, or `None` once the cursor is past the last row.
    pub fn fetch(&mut self, mode: FetchMode) -> Option<FetchedRow> {
        let row = self.rows_left().first().map(|row| Fetcher::fetch_row(row, mode))?;
        self.cursor += 1;
        Some(row)
    }

    /// Remaining rows.
    pub fn fetch_all(&mut self, mode: FetchMode) -> Vec<FetchedRow> {
        let Some(result) = &self.result else {
            return Vec::new();
        };
        let rows: Vec<FetchedRow> = Fetcher::fetch_all(result, mode)
            .into_iter()
            .skip(self.cursor)
            .collect();
        self.cursor = result.rows().len();
        rows
    }

    /// Column `index` of the next row.
    pub fn fetch_column(&mut self, index: usize) -> Result<Option<Value>, CompatError> {
        let Some(row) = self.rows_left().first() else {
            return Ok(None);
        };
        let value = row.get_index(index).cloned().ok_or_else(|| {
            CompatError::InvalidParameterNumber(format!("column index {index} out of range"))
        })?;
        self.cursor += 1;
        Ok(Some(value))
    }

    /// Rows returned by a read, else rows affected by the write.
    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.result.as_ref().map_or(0, |result| {
            if result.rows().is_empty() {
                result.rows_affected()
            } else {
                result.rows().len() as u64
            }
        })
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.result.as_ref().map_or(0, |result| result.columns().len())
    }

    /// The whole result of the last execution.
    #[must_use]
    pub const fn result(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }
}
