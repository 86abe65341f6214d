//! Parsing of "<query> by author(s) <names>" queries.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Splits at the last `by author(s)`, so earlier occurrences stay in the query.
static BY_AUTHORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(?P<query>.*)\s+by\s+authors?\s+(?P<authors>.*?)\s*$").unwrap()
});

/// Separators between author names: commas and `and`/`or`.
static AUTHOR_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*,\s*(?:(?:and|or)\s+)?|\s+(?:and|or)\s+").unwrap());

static CONJUNCTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s(and|or)\s").unwrap());

/// How multiple authors combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorRelation {
    /// Documents written by all listed authors together.
    All,
    /// Documents written by any listed author.
    #[default]
    Any,
}

/// One author as written in the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName {
    first_names: Option<String>,
    last_name: String,
}

impl AuthorName {
    /// Split a name on its last whitespace: `"J. Smith"` → first `"J."`, last `"Smith"`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        Some(match name.rsplit_once(char::is_whitespace) {
            Some((first, last)) => Self {
                first_names: Some(first.trim().to_string()),
                last_name: last.to_string(),
            },
            None => Self {
                first_names: None,
                last_name: name.to_string(),
            },
        })
    }

    pub fn first_names(&self) -> Option<&str> {
        self.first_names.as_deref()
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }
}

impl fmt::Display for AuthorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.first_names {
            Some(first) => write!(f, "{} {}", first, self.last_name),
            None => f.write_str(&self.last_name),
        }
    }
}

/// Author restriction extracted from a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorQuery {
    pub names: Vec<AuthorName>,
    pub relation: AuthorRelation,
    /// The author expression as typed, e.g. `"smith and jones"`.
    pub expression: String,
}

/// Split an author clause off `input`.
///
/// Returns the remaining query text and the author query, or `None` when the
/// input has no `by author(s)` clause with at least one name.
pub fn parse_author_query(input: &str) -> Option<(String, AuthorQuery)> {
    let captures = BY_AUTHORS.captures(input)?;
    let query = captures.name("query")?.as_str().trim();
    let expression = captures.name("authors")?.as_str().trim();
    if query.is_empty() {
        return None;
    }

    let names: Vec<AuthorName> = AUTHOR_SEPARATOR
        .split(expression)
        .filter_map(AuthorName::parse)
        .collect();
    if names.is_empty() {
        return None;
    }

    let relation = relation_of(expression);
    Some((
        query.to_string(),
        AuthorQuery {
            names,
            relation,
            expression: expression.to_string(),
        },
    ))
}

/// `and` without any `or` means every author must match; anything else is a disjunction.
fn relation_of(expression: &str) -> AuthorRelation {
    let mut has_and = false;
    for captures in CONJUNCTION.captures_iter(expression) {
        if captures[1].eq_ignore_ascii_case("or") {
            return AuthorRelation::Any;
        }
        has_and = true;
    }
    if has_and {
        AuthorRelation::All
    } else {
        AuthorRelation::Any
    }
}
