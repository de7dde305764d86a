//! # Filter Expression Compiler
//!
//! Compiles CQL-style filter expressions into a [`FilterProgram`].
//!
//! ```text
//! query      := [boolean] [ "sortBy" sort_key+ ]
//! boolean    := term ( ("and" | "or" | "not") term )*
//! term       := "(" boolean ")" | field relation value
//! relation   := "=" | "==" | "<>" | "<" | "<=" | ">" | ">="
//! value      := word | "quoted string"
//! sort_key   := field ( "/sort.ascending" | "/sort.descending" )*
//! ```
//!
//! Boolean operators share one precedence level and associate to the left,
//! as in CQL. `cql.allRecords=1` matches every record.

use super::ast::{
    Comparison, FieldPath, FilterProgram, Predicate, Relation, SortDirection, SortKey,
};
use super::errors::ParseError;

const ALL_RECORDS_INDEX: &str = "cql.allRecords";
const SORT_BY: &str = "sortBy";

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    LParen,
    RParen,
    Slash,
    Relation(Relation),
    Word(String),
    Quoted(String),
    End,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    position: usize,
}

impl Token {
    fn describe(&self) -> String {
        match &self.kind {
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Relation(rel) => format!("'{}'", rel.as_str()),
            TokenKind::Word(word) => format!("'{}'", word),
            TokenKind::Quoted(text) => format!("\"{}\"", text),
            TokenKind::End => "end of query".to_string(),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

/// Compile a filter expression.
///
/// Blank input compiles to [`FilterProgram::match_all`].
pub fn compile(input: &str) -> Result<FilterProgram, ParseError> {
    let tokens = tokenize(input)?;
    Parser { tokens, pos: 0 }.parse_program()
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '=' | '<' | '>' | '/' | '"')
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match c {
            '(' => {
                chars.next();
                TokenKind::LParen
            }
            ')' => {
                chars.next();
                TokenKind::RParen
            }
            '/' => {
                chars.next();
                TokenKind::Slash
            }
            '=' => {
                chars.next();
                if chars.next_if(|&(_, n)| n == '=').is_some() {
                    TokenKind::Relation(Relation::Exact)
                } else {
                    TokenKind::Relation(Relation::Contains)
                }
            }
            '<' => {
                chars.next();
                if chars.next_if(|&(_, n)| n == '>').is_some() {
                    TokenKind::Relation(Relation::NotEqual)
                } else if chars.next_if(|&(_, n)| n == '=').is_some() {
                    TokenKind::Relation(Relation::LessOrEqual)
                } else {
                    TokenKind::Relation(Relation::Less)
                }
            }
            '>' => {
                chars.next();
                if chars.next_if(|&(_, n)| n == '=').is_some() {
                    TokenKind::Relation(Relation::GreaterOrEqual)
                } else {
                    TokenKind::Relation(Relation::Greater)
                }
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, q)) = chars.next() {
                    match q {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, escaped @ ('"' | '\\'))) => text.push(escaped),
                            Some((_, other)) => {
                                text.push('\\');
                                text.push(other);
                            }
                            None => break,
                        },
                        other => text.push(other),
                    }
                }
                if !closed {
                    return Err(ParseError::new("unterminated quoted string", position));
                }
                TokenKind::Quoted(text)
            }
            _ => {
                let mut word = String::new();
                while let Some(&(_, w)) = chars.peek() {
                    if !is_word_char(w) {
                        break;
                    }
                    word.push(w);
                    chars.next();
                }
                TokenKind::Word(word)
            }
        };

        tokens.push(Token { kind, position });
    }

    tokens.push(Token {
        kind: TokenKind::End,
        position: input.len(),
    });
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token list always ends with `End`, and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_next(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::End {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError::new(
            format!("expected {}, found {}", expected, token.describe()),
            token.position,
        )
    }

    fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::End
    }

    /// `sortBy` starts the sort clause unless it is used as a field name.
    fn at_sort_by(&self) -> bool {
        self.peek().is_keyword(SORT_BY)
            && !matches!(self.peek_next().kind, TokenKind::Relation(_))
    }

    fn parse_program(&mut self) -> Result<FilterProgram, ParseError> {
        let predicate = if self.at_end() || self.at_sort_by() {
            Predicate::All
        } else {
            self.parse_boolean()?
        };

        let sort = if self.at_sort_by() {
            self.advance();
            self.parse_sort_keys()?
        } else {
            Vec::new()
        };

        if !self.at_end() {
            return Err(self.unexpected("a boolean operator or end of query"));
        }

        Ok(FilterProgram { predicate, sort })
    }

    fn parse_boolean(&mut self) -> Result<Predicate, ParseError> {
        let mut left = self.parse_term()?;

        loop {
            let token = self.peek();
            let combine: fn(Box<Predicate>, Box<Predicate>) -> Predicate = if token.is_keyword("and")
            {
                Predicate::And
            } else if token.is_keyword("or") {
                Predicate::Or
            } else if token.is_keyword("not") {
                Predicate::AndNot
            } else {
                break;
            };
            self.advance();
            let right = self.parse_term()?;
            left = combine(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Predicate, ParseError> {
        if self.peek().kind == TokenKind::LParen {
            self.advance();
            let inner = self.parse_boolean()?;
            if self.peek().kind != TokenKind::RParen {
                return Err(self.unexpected("')'"));
            }
            self.advance();
            return Ok(inner);
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Predicate, ParseError> {
        let index = match &self.peek().kind {
            TokenKind::Word(word) => word.clone(),
            _ => return Err(self.unexpected("a field name")),
        };
        let index_token = self.advance();

        let relation = match self.peek().kind {
            TokenKind::Relation(rel) => rel,
            _ => return Err(self.unexpected(&format!("a relation after '{}'", index))),
        };
        self.advance();

        let value = match &self.peek().kind {
            TokenKind::Word(word) => word.clone(),
            TokenKind::Quoted(text) => text.clone(),
            _ => return Err(self.unexpected("a search term")),
        };
        self.advance();

        if index.eq_ignore_ascii_case(ALL_RECORDS_INDEX) {
            return Ok(Predicate::All);
        }

        let field = parse_field_path(&index, index_token.position)?;
        Ok(Predicate::Compare(Comparison {
            field,
            relation,
            value,
        }))
    }

    fn parse_sort_keys(&mut self) -> Result<Vec<SortKey>, ParseError> {
        let mut keys = Vec::new();

        while let TokenKind::Word(word) = &self.peek().kind {
            let word = word.clone();
            let token = self.advance();
            let field = parse_field_path(&word, token.position)?;
            let mut direction = SortDirection::Ascending;

            while self.peek().kind == TokenKind::Slash {
                self.advance();
                let modifier = match &self.peek().kind {
                    TokenKind::Word(m) => m.to_ascii_lowercase(),
                    _ => return Err(self.unexpected("a sort modifier")),
                };
                let modifier_token = self.advance();
                direction = match modifier.as_str() {
                    "sort.ascending" => SortDirection::Ascending,
                    "sort.descending" => SortDirection::Descending,
                    _ => {
                        return Err(ParseError::new(
                            format!("unknown sort modifier '{}'", modifier),
                            modifier_token.position,
                        ))
                    }
                };
            }

            keys.push(SortKey { field, direction });
        }

        if keys.is_empty() {
            return Err(self.unexpected("a sort field"));
        }
        Ok(keys)
    }
}

fn parse_field_path(index: &str, position: usize) -> Result<FieldPath, ParseError> {
    let segments: Vec<String> = index.split('.').map(str::to_string).collect();
    let valid = segments.iter().all(|segment| {
        let mut chars = segment.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
    if !valid {
        return Err(ParseError::new(
            format!("invalid field name '{}'", index),
            position,
        ));
    }
    Ok(FieldPath::new(segments))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> FieldPath {
        FieldPath::new(name.split('.').map(str::to_string).collect())
    }

    fn cmp(name: &str, relation: Relation, value: &str) -> Predicate {
        Predicate::Compare(Comparison {
            field: field(name),
            relation,
            value: value.to_string(),
        })
    }

    #[test]
    fn test_blank_matches_all() {
        assert_eq!(compile("").unwrap(), FilterProgram::match_all());
        assert_eq!(compile("   ").unwrap(), FilterProgram::match_all());
    }

    #[test]
    fn test_all_records() {
        let program = compile("cql.allRecords=1").unwrap();
        assert_eq!(program.predicate, Predicate::All);
    }

    #[test]
    fn test_relations() {
        let cases = [
            ("a=1", Relation::Contains),
            ("a==1", Relation::Exact),
            ("a<>1", Relation::NotEqual),
            ("a<1", Relation::Less),
            ("a<=1", Relation::LessOrEqual),
            ("a>1", Relation::Greater),
            ("a>=1", Relation::GreaterOrEqual),
        ];
        for (input, relation) in cases {
            let program = compile(input).unwrap();
            assert_eq!(program.predicate, cmp("a", relation, "1"), "input {}", input);
        }
    }

    #[test]
    fn test_quoted_value_with_escapes() {
        let program = compile(r#"name == "say \"hi\" now""#).unwrap();
        assert_eq!(program.predicate, cmp("name", Relation::Exact, r#"say "hi" now"#));
    }

    #[test]
    fn test_boolean_operators_left_associative() {
        let program = compile("a=1 or b=2 and c=3").unwrap();
        let expected = Predicate::And(
            Box::new(Predicate::Or(
                Box::new(cmp("a", Relation::Contains, "1")),
                Box::new(cmp("b", Relation::Contains, "2")),
            )),
            Box::new(cmp("c", Relation::Contains, "3")),
        );
        assert_eq!(program.predicate, expected);
    }

    #[test]
    fn test_parentheses_and_not() {
        let program = compile("type=mobile NOT (a=1 OR b=2)").unwrap();
        let expected = Predicate::AndNot(
            Box::new(cmp("type", Relation::Contains, "mobile")),
            Box::new(Predicate::Or(
                Box::new(cmp("a", Relation::Contains, "1")),
                Box::new(cmp("b", Relation::Contains, "2")),
            )),
        );
        assert_eq!(program.predicate, expected);
    }

    #[test]
    fn test_nested_field_path() {
        let program = compile("address.city==Boston").unwrap();
        assert_eq!(program.predicate, cmp("address.city", Relation::Exact, "Boston"));
    }

    #[test]
    fn test_sort_by() {
        let program = compile("type=office sortBy name/sort.descending createdAt").unwrap();
        assert_eq!(program.sort.len(), 2);
        assert_eq!(program.sort[0].field, field("name"));
        assert_eq!(program.sort[0].direction, SortDirection::Descending);
        assert_eq!(program.sort[1].direction, SortDirection::Ascending);
    }

    #[test]
    fn test_sort_by_without_predicate() {
        let program = compile("sortBy phoneNumber").unwrap();
        assert_eq!(program.predicate, Predicate::All);
        assert_eq!(program.sort.len(), 1);
    }

    #[test]
    fn test_sort_by_as_field_name() {
        let program = compile("sortBy=x").unwrap();
        assert_eq!(program.predicate, cmp("sortBy", Relation::Contains, "x"));
        assert!(program.sort.is_empty());
    }

    #[test]
    fn test_missing_value_reports_position() {
        let err = compile("name=").unwrap_err();
        assert_eq!(err.position, 5);
        assert_eq!(err.message, "expected a search term, found end of query");
    }

    #[test]
    fn test_missing_relation() {
        let err = compile("name").unwrap_err();
        assert_eq!(err.message, "expected a relation after 'name', found end of query");
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        let err = compile("(a=1 or b=2").unwrap_err();
        assert_eq!(err.message, "expected ')', found end of query");
    }

    #[test]
    fn test_trailing_garbage() {
        let err = compile("a=1 b=2").unwrap_err();
        assert_eq!(err.position, 4);
        assert!(err.message.contains("found 'b'"));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = compile("name=\"abc").unwrap_err();
        assert_eq!(err.message, "unterminated quoted string");
        assert_eq!(err.position, 5);
    }

    #[test]
    fn test_invalid_field_name() {
        let err = compile("9lives=1").unwrap_err();
        assert_eq!(err.message, "invalid field name '9lives'");
    }

    #[test]
    fn test_unknown_sort_modifier() {
        let err = compile("sortBy name/sort.sideways").unwrap_err();
        assert_eq!(err.message, "unknown sort modifier 'sort.sideways'");
        assert_eq!(err.position, 12);
    }

    #[test]
    fn test_sort_by_requires_field() {
        let err = compile("a=1 sortBy").unwrap_err();
        assert_eq!(err.message, "expected a sort field, found end of query");
    }
}
