//! Parsing of structured-file node paths
//!
//! Paths use the addressing syntax of the MAT format itself:
//! `var.field{2,1}(3).other`, plus the `size(...)` and `class(...)` forms
//! of the synthetic array nodes.

/// One addressing step after the variable name
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// `.name`
    Field(String),
    /// `{i}` or `{i,j,...}` into a cell array
    Brace(Vec<usize>),
    /// `(i)` into a struct array
    Paren(Vec<usize>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Query {
    Size,
    Class,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedPath {
    pub query: Option<Query>,
    pub variable: String,
    pub steps: Vec<Step>,
}

pub(crate) fn parse(path: &str) -> Option<ParsedPath> {
    for (prefix, query) in [("size(", Query::Size), ("class(", Query::Class)] {
        let inner = path
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(')'));
        // `size(2)` indexes a variable that happens to be called size
        if let Some(mut parsed) = inner.and_then(parse_access) {
            parsed.query = Some(query);
            return Some(parsed);
        }
    }
    parse_access(path)
}

fn parse_access(path: &str) -> Option<ParsedPath> {
    let mut parser = Parser { rest: path };
    let variable = parser.identifier()?;
    let mut steps = Vec::new();

    while let Some(c) = parser.rest.chars().next() {
        parser.rest = &parser.rest[c.len_utf8()..];
        let step = match c {
            '.' => Step::Field(parser.identifier()?),
            '{' => Step::Brace(parser.subscripts('}')?),
            '(' => Step::Paren(parser.subscripts(')')?),
            _ => return None,
        };
        steps.push(step);
    }

    Some(ParsedPath {
        query: None,
        variable,
        steps,
    })
}

struct Parser<'a> {
    rest: &'a str,
}

impl<'a> Parser<'a> {
    fn identifier(&mut self) -> Option<String> {
        let mut chars = self.rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_ascii_alphabetic() => {}
            _ => return None,
        }
        let end = chars
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (name, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(name.to_string())
    }

    fn subscripts(&mut self, close: char) -> Option<Vec<usize>> {
        let (inner, rest) = self.rest.split_once(close)?;
        self.rest = rest;
        inner
            .split(',')
            .map(|part| part.trim().parse::<usize>().ok().filter(|&s| s > 0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_variable() {
        let parsed = parse("results").unwrap();
        assert_eq!(parsed.variable, "results");
        assert!(parsed.steps.is_empty());
        assert_eq!(parsed.query, None);
    }

    #[test]
    fn test_steps() {
        let parsed = parse("s.a{2,1}(3).b_2").unwrap();
        assert_eq!(parsed.variable, "s");
        assert_eq!(
            parsed.steps,
            vec![
                Step::Field("a".to_string()),
                Step::Brace(vec![2, 1]),
                Step::Paren(vec![3]),
                Step::Field("b_2".to_string()),
            ]
        );
    }

    #[test]
    fn test_queries() {
        let parsed = parse("size(c{1})").unwrap();
        assert_eq!(parsed.query, Some(Query::Size));
        assert_eq!(parsed.variable, "c");
        assert_eq!(parsed.steps, vec![Step::Brace(vec![1])]);

        let parsed = parse("class(x)").unwrap();
        assert_eq!(parsed.query, Some(Query::Class));

        // a variable named `size`, indexed
        let parsed = parse("size(2)").unwrap();
        assert_eq!(parsed.query, None);
        assert_eq!(parsed.variable, "size");
        assert_eq!(parsed.steps, vec![Step::Paren(vec![2])]);
    }

    #[test]
    fn test_invalid() {
        assert!(parse("").is_none());
        assert!(parse("1abc").is_none());
        assert!(parse("a.").is_none());
        assert!(parse("a{0}").is_none());
        assert!(parse("a{1").is_none());
        assert!(parse("a{x}").is_none());
        assert!(parse("a b").is_none());
    }
}
