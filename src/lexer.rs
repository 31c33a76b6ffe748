use pest::Parser;
use pest_derive::Parser;

use crate::ast::{Function, Token};
use crate::error::{ItmlError, Result};

#[derive(Parser)]
#[grammar = "src/itml.pest"]
pub struct ItmlLexer;

/// Number of whitespace characters before the first non-whitespace one.
///
/// Tabs count as a single column, the same as spaces.
pub fn leading_space(line: &str) -> usize {
    line.chars().count() - line.trim_start().chars().count()
}

/// Split ITML source into tokens, one line at a time.
pub fn tokenize(text: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    for (index, line) in text.lines().enumerate() {
        tokens.extend(tokenize_line(line, index + 1)?);
    }
    tracing::trace!(tokens = tokens.len(), "tokenized");
    Ok(tokens)
}

/// Classify a single line. `number` is the 1-based line number used in errors.
pub fn tokenize_line(line: &str, number: usize) -> Result<Vec<Token<'_>>> {
    let mut pairs = ItmlLexer::parse(Rule::line, line).map_err(|_| {
        ItmlError::MalformedIdentifierLine {
            line: number,
            text: line.to_owned(),
        }
    })?;

    // An empty line yields nothing but EOI.
    let Some(pair) = pairs.next() else {
        return Ok(vec![Token::Newline]);
    };

    let tokens = match pair.as_rule() {
        Rule::comment => vec![Token::Comment],
        Rule::content => {
            let mut inner = pair.into_inner();
            let indent = inner.next().map(|p| p.as_str()).unwrap_or_default();
            let text = inner.next().map(|p| p.as_str()).unwrap_or_default();
            vec![Token::Indent(indent.chars().count()), Token::String(text.trim())]
        }
        Rule::import => {
            let argument = pair.into_inner().next().map(|p| p.as_str()).unwrap_or_default();
            vec![Token::Function(Function::Import(argument.trim()))]
        }
        Rule::name => {
            let mut inner = pair.into_inner();
            let id = inner.next().map(|p| p.as_str()).unwrap_or_default();
            let kind = inner.next().map(|p| p.as_str()).unwrap_or_default();
            vec![Token::Name {
                id: id.trim(),
                kind: kind.trim(),
            }]
        }
        _ => vec![Token::Newline],
    };

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_leading_space() {
        let cases = [
            ("    Hello, world!", 4),
            ("    Hello, world!  ", 4),
            ("\tHello, world!", 1),
            ("\t Hello, world!", 2),
            ("Hello, world!", 0),
            ("\n", 1),
            ("", 0),
        ];
        for (input, expected) in cases {
            assert_eq!(leading_space(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_tokenize_line_as_newline() {
        assert_eq!(tokenize_line("", 1).unwrap(), vec![Token::Newline]);
    }

    #[test]
    fn test_tokenize_line_as_name() {
        assert_eq!(
            tokenize_line("identifier: type", 1).unwrap(),
            vec![Token::Name {
                id: "identifier",
                kind: "type"
            }]
        );
    }

    #[test]
    fn test_tokenize_line_as_string() {
        let tokens = tokenize_line("    Hello, world!", 1).unwrap();
        assert_eq!(tokens, vec![Token::Indent(4), Token::String("Hello, world!")]);
    }

    #[test]
    fn test_tokenize_line_trims_content() {
        let tokens = tokenize_line("\t Hello, world!  \t", 1).unwrap();
        assert_eq!(tokens, vec![Token::Indent(2), Token::String("Hello, world!")]);
    }

    #[test]
    fn test_tokenize_line_whitespace_only() {
        let tokens = tokenize_line("   ", 1).unwrap();
        assert_eq!(tokens, vec![Token::Indent(3), Token::String("")]);
    }

    #[test]
    fn test_tokenize_line_as_comment() {
        assert_eq!(tokenize_line("# note", 1).unwrap(), vec![Token::Comment]);
        assert_eq!(tokenize_line("    # indented", 1).unwrap(), vec![Token::Comment]);
        assert_eq!(tokenize_line("#id: str", 1).unwrap(), vec![Token::Comment]);
    }

    #[test]
    fn test_tokenize_line_as_import() {
        assert_eq!(
            tokenize_line("import  shared/common.itml  ", 1).unwrap(),
            vec![Token::Function(Function::Import("shared/common.itml"))]
        );
    }

    #[test]
    fn test_import_keyword_needs_whitespace() {
        assert_eq!(
            tokenize_line("import: str", 1).unwrap(),
            vec![Token::Name {
                id: "import",
                kind: "str"
            }]
        );
        assert_eq!(
            tokenize_line("imports: list", 1).unwrap(),
            vec![Token::Name {
                id: "imports",
                kind: "list"
            }]
        );
    }

    #[test]
    fn test_name_splits_on_first_colon() {
        assert_eq!(
            tokenize_line("a : b: c", 1).unwrap(),
            vec![Token::Name { id: "a", kind: "b: c" }]
        );
    }

    #[test]
    fn test_malformed_identifier_line() {
        let err = tokenize("a: str\n    x\nmissing separator\n").unwrap_err();
        match err {
            ItmlError::MalformedIdentifierLine { line, text } => {
                assert_eq!(line, 3);
                assert_eq!(text, "missing separator");
            }
            other => panic!("Expected MalformedIdentifierLine, got {other:?}"),
        }
    }

    #[test]
    fn test_tokenize() {
        let input = "id1: str\n    Hello, world!\n\nid2: str\n    Hello,\n    world!\n";
        let tokens = tokenize(input).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Name { id: "id1", kind: "str" },
                Token::Indent(4),
                Token::String("Hello, world!"),
                Token::Newline,
                Token::Name { id: "id2", kind: "str" },
                Token::Indent(4),
                Token::String("Hello,"),
                Token::Indent(4),
                Token::String("world!"),
            ]
        );
    }

    #[test]
    fn test_tokenize_crlf() {
        let tokens = tokenize("id: str\r\n  text\r\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Name { id: "id", kind: "str" },
                Token::Indent(2),
                Token::String("text"),
            ]
        );
    }

    proptest! {
        #[test]
        fn indent_matches_leading_space(
            indent in "[ \t]{1,8}",
            text in "[a-zA-Z,.!]{0,12}",
        ) {
            let line = format!("{indent}{text}");
            let tokens = tokenize_line(&line, 1).unwrap();
            prop_assert_eq!(tokens[0], Token::Indent(leading_space(&line)));
            prop_assert_eq!(leading_space(&line), indent.chars().count());
        }

        #[test]
        fn one_classification_per_line(
            lines in prop::collection::vec(
                prop_oneof![
                    "[a-z]{1,6}: (str|list)",
                    "[ \t]{1,4}[a-z ]{1,10}",
                ],
                1..12,
            ),
        ) {
            let text = lines.join("\n");
            let tokens = tokenize(&text).unwrap();
            let expected: usize = lines
                .iter()
                .map(|line| if leading_space(line) > 0 { 2 } else { 1 })
                .sum();
            prop_assert_eq!(tokens.len(), expected);
        }
    }
}
