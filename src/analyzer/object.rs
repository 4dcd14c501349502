use crate::core::CompatError;
use crate::parser::parse_identifier_chain;

/// Structured form of an object name: `[schema.]name`, unquoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectExpression {
    pub schema: Option<String>,
    pub name: String,
}

impl ObjectExpression {
    /// Re-parses object text such as `` `user`.orders ``.
    pub fn parse(text: &str) -> Result<Self, CompatError> {
        let mut parts = parse_identifier_chain(text)?;
        match parts.len() {
            1 => Ok(Self {
                schema: None,
                name: parts.remove(0),
            }),
            2 => {
                let name = parts.remove(1);
                Ok(Self {
                    schema: Some(parts.remove(0)),
                    name,
                })
            }
            _ => Err(CompatError::MalformedQuery(format!(
                "'{text}' has too many name parts"
            ))),
        }
    }

    /// Schema if given, else `default`.
    #[must_use]
    pub fn schema_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.schema.as_deref().unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        let object = ObjectExpression::parse("orders").unwrap();
        assert_eq!(object.schema, None);
        assert_eq!(object.name, "orders");
        assert_eq!(object.schema_or("user"), "user");
    }

    #[test]
    fn test_qualified_name() {
        let object = ObjectExpression::parse("`lookup`.`Orders`").unwrap();
        assert_eq!(object.schema.as_deref(), Some("lookup"));
        assert_eq!(object.name, "Orders");
        assert_eq!(object.schema_or("user"), "lookup");
    }

    #[test]
    fn test_too_many_parts() {
        assert!(matches!(
            ObjectExpression::parse("a.b.c"),
            Err(CompatError::MalformedQuery(_))
        ));
    }
}
