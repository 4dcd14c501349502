use crate::core::CompatError;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, digit1, multispace1, one_of, satisfy},
    combinator::{all_consuming, eof, map, not, opt, peek, recognize, value, verify},
    error::{Error, ErrorKind},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

/// Lexical unit produced by the tokenizer. Every variant keeps the fragment
/// exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Bare word: keyword or unquoted identifier
    Word(String),
    /// Back-quoted or dotted identifier (`` `orders` ``, `user.orders`)
    Identifier(String),
    Str(String),
    Number(String),
    Placeholder(String),
    Symbol(String),
}

impl Token {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Word(s)
            | Self::Identifier(s)
            | Self::Str(s)
            | Self::Number(s)
            | Self::Placeholder(s)
            | Self::Symbol(s) => s,
        }
    }

    /// Case-insensitive match against a bare word.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Self::Word(w) if w.eq_ignore_ascii_case(word))
    }

    #[must_use]
    pub fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self, Self::Symbol(s) if s == symbol)
    }
}

/// `#` comment, or `--` followed by whitespace or end of input.
fn line_comment(input: &str) -> IResult<&str, &str> {
    let dash_dash = terminated(
        tag("--"),
        peek(alt((value((), satisfy(char::is_whitespace)), value((), eof)))),
    );
    recognize(pair(alt((dash_dash, tag("#"))), take_while(|c: char| c != '\n')))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

/// Whitespace and comments.
pub fn sp(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((multispace1, line_comment, block_comment))))(input)
}

pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(sp, inner, sp)
}

/// Quoted fragment delimited by `quote`, including the delimiters. A doubled
/// delimiter is an escaped delimiter; outside back-quotes a backslash escapes
/// the next character. Running off the end of the input is a hard failure.
fn quoted<'a>(quote: char) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        if !input.starts_with(quote) {
            return Err(nom::Err::Error(Error::new(input, ErrorKind::Char)));
        }

        let mut escaped = false;
        let mut chars = input.char_indices().skip(1).peekable();
        while let Some((idx, c)) = chars.next() {
            if escaped {
                escaped = false;
            } else if c == '\\' && quote != '`' {
                escaped = true;
            } else if c == quote {
                if chars.peek().is_some_and(|&(_, next)| next == quote) {
                    chars.next();
                } else {
                    let end = idx + c.len_utf8();
                    return Ok((&input[end..], &input[..end]));
                }
            }
        }

        Err(nom::Err::Failure(Error::new(input, ErrorKind::Eof)))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Unquoted name part; may start with a digit (`2fa`) but is never all digits.
fn bare_word(input: &str) -> IResult<&str, &str> {
    verify(take_while1(is_word_char), |s: &str| {
        !s.chars().all(|c| c.is_ascii_digit())
    })(input)
}

fn name_part(input: &str) -> IResult<&str, &str> {
    alt((quoted('`'), bare_word))(input)
}

/// `name`, `` `name` ``, `db.name`, `` `db`.`name` ``
pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(name_part, many0(pair(char('.'), name_part))))(input)
}

fn number(input: &str) -> IResult<&str, &str> {
    terminated(
        recognize(tuple((
            digit1,
            opt(pair(char('.'), digit1)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        not(satisfy(is_word_char)),
    )(input)
}

fn placeholder(input: &str) -> IResult<&str, &str> {
    alt((tag("?"), recognize(pair(char(':'), bare_word))))(input)
}

fn symbol(input: &str) -> IResult<&str, &str> {
    alt((
        tag("<=>"),
        tag("<="),
        tag(">="),
        tag("<>"),
        tag("!="),
        tag(":="),
        tag("||"),
        tag("&&"),
        recognize(one_of("=<>+-*/%(),;.!~^&|@")),
    ))(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((
        map(alt((quoted('\''), quoted('"'))), |s: &str| Token::Str(s.to_string())),
        map(number, |s: &str| Token::Number(s.to_string())),
        map(identifier, |s: &str| {
            if s.starts_with('`') || s.contains('.') {
                Token::Identifier(s.to_string())
            } else {
                Token::Word(s.to_string())
            }
        }),
        map(placeholder, |s: &str| Token::Placeholder(s.to_string())),
        map(symbol, |s: &str| Token::Symbol(s.to_string())),
    ))(input)
}

/// Splits SQL text into tokens, dropping whitespace and comments.
pub fn tokenize(input: &str) -> Result<Vec<Token>, CompatError> {
    match terminated(many0(preceded(sp, token)), sp)(input) {
        Ok((rest, tokens)) if rest.is_empty() => Ok(tokens),
        Ok((rest, _)) => Err(CompatError::ParseError(format!(
            "Unexpected input: {rest}"
        ))),
        Err(nom::Err::Failure(e) | nom::Err::Error(e)) => Err(CompatError::ParseError(format!(
            "Unterminated or invalid token at: {}",
            e.input
        ))),
        Err(nom::Err::Incomplete(_)) => Err(CompatError::ParseError(
            "Incomplete input".to_string(),
        )),
    }
}

/// Strips back-quotes from one identifier part.
#[must_use]
pub fn unquote_identifier(part: &str) -> String {
    part.strip_prefix('`')
        .and_then(|p| p.strip_suffix('`'))
        .map_or_else(|| part.to_string(), |inner| inner.replace("``", "`"))
}

/// Strips quotes from a string literal and resolves its escapes.
#[must_use]
pub fn unquote_string(literal: &str) -> String {
    let Some(quote) = literal.chars().next().filter(|c| *c == '\'' || *c == '"') else {
        return literal.to_string();
    };
    let body = &literal[quote.len_utf8()..];
    let inner = body.strip_suffix(quote).unwrap_or(body);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('0') => out.push('\0'),
                Some('Z') => out.push('\x1a'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            c if c == quote && chars.peek() == Some(&quote) => {
                chars.next();
                out.push(quote);
            }
            c => out.push(c),
        }
    }
    out
}

/// Re-parses an object name such as `` `db`.orders `` into its unquoted parts.
pub fn parse_identifier_chain(text: &str) -> Result<Vec<String>, CompatError> {
    let parsed: IResult<&str, Vec<&str>> =
        all_consuming(ws(separated_list1(char('.'), name_part)))(text);

    match parsed {
        Ok((_, parts)) => Ok(parts.into_iter().map(unquote_identifier).collect()),
        Err(_) => Err(CompatError::MalformedQuery(format!(
            "'{text}' is not a valid object name"
        ))),
    }
}
