use nom::{
    bytes::complete::{tag_no_case, take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, opt},
    multi::separated_list0,
    sequence::{delimited, preceded, separated_pair, terminated},
    IResult,
};

use crate::core::CompatError;

/// Connection string: `vitess:host=..;port=..[;dbname=..][;vtctld_host=..;vtctld_port=..]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    pub host: String,
    pub port: u16,
    pub dbname: Option<String>,
    pub vtctld: Option<(String, u16)>,
}

fn key(input: &str) -> IResult<&str, &str> {
    delimited(
        multispace0,
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        multispace0,
    )(input)
}

fn pair_value(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c != ';')(input)
}

fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(key, char('='), pair_value)(input)
}

fn dsn(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    all_consuming(preceded(
        tag_no_case("vitess:"),
        terminated(separated_list0(char(';'), attribute), opt(char(';'))),
    ))(input)
}

fn parse_port(name: &str, value: &str) -> Result<u16, CompatError> {
    value
        .parse()
        .map_err(|_| CompatError::InvalidDsn(format!("{name} must be a port number, got '{value}'")))
}

impl Dsn {
    pub fn parse(text: &str) -> Result<Self, CompatError> {
        let (_, attributes) =
            dsn(text.trim()).map_err(|e| CompatError::InvalidDsn(format!("{text}: {e}")))?;

        let mut host = None;
        let mut port = None;
        let mut dbname = None;
        let mut vtctld_host = None;
        let mut vtctld_port = None;

        for (name, value) in attributes {
            let value = value.trim();
            match name.to_ascii_lowercase().as_str() {
                "host" => host = Some(value.to_string()),
                "port" => port = Some(parse_port(name, value)?),
                "dbname" => dbname = Some(value.to_string()),
                "vtctld_host" => vtctld_host = Some(value.to_string()),
                "vtctld_port" => vtctld_port = Some(parse_port(name, value)?),
                _ => {
                    return Err(CompatError::InvalidDsn(format!("unknown attribute '{name}'")));
                }
            }
        }

        let host = host
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CompatError::InvalidDsn("host is required".to_string()))?;
        let port = port.ok_or_else(|| CompatError::InvalidDsn("port is required".to_string()))?;

        let vtctld = match (vtctld_host, vtctld_port) {
            (Some(h), Some(p)) => Some((h, p)),
            (None, None) => None,
            _ => {
                return Err(CompatError::InvalidDsn(
                    "vtctld_host and vtctld_port must be given together".to_string(),
                ));
            }
        };

        Ok(Self {
            host,
            port,
            dbname: dbname.filter(|d| !d.is_empty()),
            vtctld,
        })
    }
}
