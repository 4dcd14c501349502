/// Fetch-mode projection of result rows.
///
/// Rows are first expanded to carry both name and position keys, then
/// filtered down to the requested kind. The `ResultSet` is never modified.
use crate::core::{CompatError, ResultSet, Row, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchMode {
    /// Keyed by column name.
    Assoc,
    /// Keyed by column position.
    Num,
    /// Name and position keys, interleaved per column.
    #[default]
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Name(String),
    Index(usize),
}

impl RowKey {
    #[must_use]
    pub const fn is_name(&self) -> bool {
        matches!(self, Self::Name(_))
    }

    #[must_use]
    pub const fn is_index(&self) -> bool {
        matches!(self, Self::Index(_))
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// One projected row: ordered (key, value) entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedRow {
    entries: Vec<(RowKey, Value)>,
}

impl FetchedRow {
    #[must_use]
    pub fn get(&self, key: &RowKey) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    #[must_use]
    pub fn get_name(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find_map(|(k, v)| match k {
            RowKey::Name(n) if n == name => Some(v),
            _ => None,
        })
    }

    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.get(&RowKey::Index(index))
    }

    pub fn keys(&self) -> impl Iterator<Item = &RowKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(RowKey, Value)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct Fetcher;

impl Fetcher {
    /// Expands a row to name and position keys: `name0, 0, name1, 1, ...`
    #[must_use]
    pub fn both(row: &Row) -> FetchedRow {
        let mut entries = Vec::with_capacity(row.values().len() * 2);
        for (index, (name, value)) in row.iter().enumerate() {
            entries.push((RowKey::Name(name.to_string()), value.clone()));
            entries.push((RowKey::Index(index), value.clone()));
        }
        FetchedRow { entries }
    }

    /// Keeps, in every row, only the keys of the first row that pass
    /// `predicate`. Row order and key order are preserved.
    #[must_use]
    pub fn filter_rows_keys_by<F>(rows: Vec<FetchedRow>, predicate: F) -> Vec<FetchedRow>
    where
        F: Fn(&RowKey) -> bool,
    {
        let keys: Vec<RowKey> = match rows.first() {
            Some(first) => first.keys().filter(|k| predicate(k)).cloned().collect(),
            None => return rows,
        };

        rows.into_iter()
            .map(|row| FetchedRow {
                entries: row
                    .entries
                    .into_iter()
                    .filter(|(k, _)| keys.contains(k))
                    .collect(),
            })
            .collect()
    }

    #[must_use]
    pub fn fetch_row(row: &Row, mode: FetchMode) -> FetchedRow {
        Self::fetch_rows(std::slice::from_ref(row), mode)
            .pop()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn fetch_all(result: &ResultSet, mode: FetchMode) -> Vec<FetchedRow> {
        Self::fetch_rows(result.rows(), mode)
    }

    fn fetch_rows(rows: &[Row], mode: FetchMode) -> Vec<FetchedRow> {
        let rows: Vec<FetchedRow> = rows.iter().map(Self::both).collect();
        match mode {
            FetchMode::Both => rows,
            FetchMode::Assoc => Self::filter_rows_keys_by(rows, RowKey::is_name),
            FetchMode::Num => Self::filter_rows_keys_by(rows, RowKey::is_index),
        }
    }

    /// Values of one column, by position.
    pub fn fetch_column(result: &ResultSet, index: usize) -> Result<Vec<Value>, CompatError> {
        if index >= result.columns().len() {
            return Err(CompatError::InvalidParameterNumber(format!(
                "column index {index} out of range ({} columns)",
                result.columns().len()
            )));
        }
        Ok(result
            .rows()
            .iter()
            .filter_map(|row| row.get_index(index).cloned())
            .collect())
    }
}
