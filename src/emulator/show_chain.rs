/// SHOW family emulation (v0.3.0: SHOW DATABASES, LIKE filters)
///
/// Result shapes follow MySQL exactly:
/// - SHOW TABLES: `Tables_in_<db>` (`Tables_in_<db> (<pattern>)` with LIKE),
///   FULL adds `Table_type`
/// - SHOW DATABASES: `Database`
/// - SHOW COLLATION: the single supported collation, `utf8_bin`
/// - SHOW CREATE DATABASE: `Database`, `Create Database`
/// - SHOW TABLE STATUS: the 18 MySQL columns, sizes reported as 0
///
/// COLLATION and CREATE DATABASE are static. The others read the
/// administrative API and are only linked when one is configured.
use super::chain::{Chain, ChainQuery};
use super::context::EmulatorContext;
use crate::analyzer::{ShowCommand, ShowQuery};
use crate::core::{CompatError, ResultSet, Value};
use crate::vtctld::TableMetadata;

const CHARSET: &str = "utf8";
const COLLATION: &str = "utf8_bin";
const COLLATION_ID: i64 = 83;
const ENGINE: &str = "InnoDB";
const ENGINE_VERSION: i64 = 10;
const ROW_FORMAT: &str = "Compact";

const TABLE_STATUS_COLUMNS: [&str; 18] = [
    "Name",
    "Engine",
    "Version",
    "Row_format",
    "Rows",
    "Avg_row_length",
    "Data_length",
    "Max_data_length",
    "Index_length",
    "Data_free",
    "Auto_increment",
    "Create_time",
    "Update_time",
    "Check_time",
    "Collation",
    "Checksum",
    "Create_options",
    "Comment",
];

impl ChainQuery for ShowQuery {
    type Pattern = ShowCommand;

    fn pattern(&self) -> Result<Option<ShowCommand>, CompatError> {
        self.command()
    }
}

pub fn build(with_vtctld: bool) -> Result<Chain<ShowQuery>, CompatError> {
    let mut builder = Chain::builder("show")
        .link(ShowCommand::Collation, show_collation)
        .link(ShowCommand::CreateDatabase, show_create_database);

    if with_vtctld {
        builder = builder
            .link(ShowCommand::Tables, show_tables)
            .link(ShowCommand::Databases, show_databases)
            .link(ShowCommand::TableStatus, show_table_status);
    }
    builder.build()
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

fn target_database<'a>(query: &'a ShowQuery, context: &'a EmulatorContext) -> Result<&'a str, CompatError> {
    Ok(query.database()?.unwrap_or_else(|| context.keyspace()))
}

fn show_tables(query: &ShowQuery, context: &EmulatorContext) -> Result<ResultSet, CompatError> {
    let database = target_database(query, context)?;
    let pattern = query.like_pattern()?;

    let mut header = format!("Tables_in_{database}");
    if let Some(pattern) = pattern {
        header.push_str(&format!(" ({pattern})"));
    }

    let full = query.is_full()?;
    let rows = context
        .vtctld()?
        .list_tables(database)?
        .into_iter()
        .filter(|table| pattern.is_none_or(|p| like_matches(p, table)))
        .map(|table| {
            let mut row = vec![Value::Text(table)];
            if full {
                row.push(Value::from("BASE TABLE"));
            }
            row
        })
        .collect();

    let mut names = vec![header];
    if full {
        names.push("Table_type".to_string());
    }
    ResultSet::new(names, rows)
}

fn show_databases(query: &ShowQuery, context: &EmulatorContext) -> Result<ResultSet, CompatError> {
    let pattern = query.like_pattern()?;
    let rows = context
        .vtctld()?
        .list_keyspaces()?
        .into_iter()
        .filter(|keyspace| pattern.is_none_or(|p| like_matches(p, keyspace)))
        .map(|keyspace| vec![Value::Text(keyspace)])
        .collect();

    ResultSet::new(columns(&["Database"]), rows)
}

fn show_collation(query: &ShowQuery, _context: &EmulatorContext) -> Result<ResultSet, CompatError> {
    let result = ResultSet::new(
        columns(&["Collation", "Charset", "Id", "Default", "Compiled", "Sortlen"]),
        vec![vec![
            Value::from(COLLATION),
            Value::from(CHARSET),
            Value::Integer(COLLATION_ID),
            Value::from("Yes"),
            Value::from("Yes"),
            Value::Integer(1),
        ]],
    )?;

    Ok(match query.like_pattern()? {
        Some(pattern) => result.retain_rows(|row| {
            row.get("Collation")
                .and_then(Value::as_text)
                .is_some_and(|name| like_matches(pattern, name))
        }),
        None => result,
    })
}

fn show_create_database(query: &ShowQuery, _context: &EmulatorContext) -> Result<ResultSet, CompatError> {
    let database = query.database()?.ok_or_else(|| {
        CompatError::MalformedQuery("SHOW CREATE DATABASE without a database name".to_string())
    })?;

    let if_not_exists = if query.if_not_exists()? {
        "/*!32312 IF NOT EXISTS*/ "
    } else {
        ""
    };
    let statement = format!(
        "CREATE DATABASE {if_not_exists}`{database}` /*!40100 DEFAULT CHARACTER SET {CHARSET} */"
    );

    ResultSet::new(
        columns(&["Database", "Create Database"]),
        vec![vec![Value::from(database), Value::Text(statement)]],
    )
}

fn show_table_status(query: &ShowQuery, context: &EmulatorContext) -> Result<ResultSet, CompatError> {
    let database = target_database(query, context)?;
    let pattern = query.like_pattern()?;

    let rows = context
        .vtctld()?
        .table_status(database)?
        .into_iter()
        .filter(|table| pattern.is_none_or(|p| like_matches(p, &table.name)))
        .map(table_status_row)
        .collect();

    ResultSet::new(columns(&TABLE_STATUS_COLUMNS), rows)
}

fn table_status_row(table: TableMetadata) -> Vec<Value> {
    vec![
        Value::Text(table.name),
        Value::from(ENGINE),
        Value::Integer(ENGINE_VERSION),
        Value::from(ROW_FORMAT),
        Value::Integer(0), // Rows
        Value::Integer(0), // Avg_row_length
        Value::Integer(0), // Data_length
        Value::Integer(0), // Max_data_length
        Value::Integer(0), // Index_length
        Value::Integer(0), // Data_free
        Value::Null,       // Auto_increment
        Value::from(table.create_time),
        Value::from(table.update_time),
        Value::Null, // Check_time
        Value::from(COLLATION),
        Value::Null, // Checksum
        Value::from(""),
        Value::from(""),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
    AnyRun,
    AnyOne,
    Literal(char),
}

fn like_tokens(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::AnyRun,
            '_' => LikeToken::AnyOne,
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            c => LikeToken::Literal(c),
        });
    }
    tokens
}

/// MySQL `LIKE`: `%` matches any run, `_` one character, `\` escapes.
///
/// Greedy scan that backtracks only to the most recent `%`, so matching stays
/// linear in `pattern.len() * text.len()`.
#[must_use]
pub fn like_matches(pattern: &str, text: &str) -> bool {
    let pattern = like_tokens(pattern);
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // (pattern index after the last `%`, text index it was resumed from)
    let mut resume: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(LikeToken::AnyRun) => {
                p += 1;
                resume = Some((p, t));
            }
            Some(LikeToken::AnyOne) => {
                p += 1;
                t += 1;
            }
            Some(LikeToken::Literal(c)) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match resume {
                Some((after_any, from)) => {
                    p = after_any;
                    t = from + 1;
                    resume = Some((after_any, t));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|token| *token == LikeToken::AnyRun)
}
