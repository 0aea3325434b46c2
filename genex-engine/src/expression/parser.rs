// Expression Engine Parser
// Parses generator expression tokens into a tree of text and marker nodes

use crate::expression::lexer::{Lexer, Token};

use std::fmt;

/// Node of a parsed generator expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Literal text emitted verbatim
    Text(String),

    /// `$<identifier[:param,...]>`
    ///
    /// The identifier may itself contain markers. `parameters` is `None`
    /// when no colon was written.
    Marker {
        identifier: Vec<Expr>,
        parameters: Option<Vec<Vec<Expr>>>,
    },
}

impl Expr {
    pub fn text(s: impl Into<String>) -> Self {
        Expr::Text(s.into())
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Expr::Marker { .. })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Text(s) => write!(f, "{}", s),
            Expr::Marker {
                identifier,
                parameters,
            } => {
                write!(f, "$<")?;
                for node in identifier {
                    write!(f, "{}", node)?;
                }
                if let Some(parameters) = parameters {
                    write!(f, ":")?;
                    for (i, parameter) in parameters.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        for node in parameter {
                            write!(f, "{}", node)?;
                        }
                    }
                }
                write!(f, ">")
            }
        }
    }
}

/// Recursive descent parser for generator expressions
///
/// Parsing never fails: malformed markers degrade to literal text.
pub struct ExprParser {
    tokens: Vec<Token>,
    position: usize,
}

impl ExprParser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse a string into a sequence of nodes
    pub fn parse_str(input: &str) -> Vec<Expr> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize();
        if !lexer.saw_marker() {
            return if input.is_empty() {
                Vec::new()
            } else {
                vec![Expr::text(input)]
            };
        }
        ExprParser::new(tokens).parse()
    }

    /// Parse the token stream
    pub fn parse(&mut self) -> Vec<Expr> {
        let mut nodes = Vec::new();
        while let Some(token) = self.advance() {
            match token {
                Token::BeginMarker => {
                    let parsed = self.parse_marker();
                    extend_nodes(&mut nodes, parsed);
                }
                other => push_text(&mut nodes, other.as_text()),
            }
        }
        nodes
    }

    /// Parse the remainder of a marker after its `$<`
    fn parse_marker(&mut self) -> Vec<Expr> {
        let mut identifier = Vec::new();

        loop {
            match self.peek() {
                None => return degrade(identifier, None),
                Some(Token::EndMarker) | Some(Token::Colon) => break,
                Some(Token::BeginMarker) => {
                    self.advance();
                    let nested = self.parse_marker();
                    extend_nodes(&mut identifier, nested);
                }
                Some(_) => {
                    if let Some(token) = self.advance() {
                        push_text(&mut identifier, token.as_text());
                    }
                }
            }
        }

        if identifier.is_empty() {
            // `$<>` and `$<:`: the separator is left for the enclosing level
            tracing::trace!("empty marker identifier, keeping as text");
            return vec![Expr::text("$<")];
        }

        if self.check(&Token::EndMarker) {
            self.advance();
            return vec![Expr::Marker {
                identifier,
                parameters: None,
            }];
        }

        // Colon
        self.advance();
        let mut parameters: Vec<Vec<Expr>> = vec![Vec::new()];

        loop {
            let Some(token) = self.advance() else {
                return degrade(identifier, Some(parameters));
            };
            match token {
                Token::EndMarker => {
                    return vec![Expr::Marker {
                        identifier,
                        parameters: Some(parameters),
                    }];
                }
                Token::Comma => parameters.push(Vec::new()),
                Token::BeginMarker => {
                    let nested = self.parse_marker();
                    if let Some(current) = parameters.last_mut() {
                        extend_nodes(current, nested);
                    }
                }
                other => {
                    if let Some(current) = parameters.last_mut() {
                        push_text(current, other.as_text());
                    }
                }
            }
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }
}

/// Rebuild an unterminated marker as text, keeping nested markers intact
fn degrade(identifier: Vec<Expr>, parameters: Option<Vec<Vec<Expr>>>) -> Vec<Expr> {
    tracing::trace!("unterminated marker, keeping as text");

    let mut nodes = vec![Expr::text("$<")];
    extend_nodes(&mut nodes, identifier);
    if let Some(parameters) = parameters {
        push_text(&mut nodes, ":");
        for (i, parameter) in parameters.into_iter().enumerate() {
            if i > 0 {
                push_text(&mut nodes, ",");
            }
            extend_nodes(&mut nodes, parameter);
        }
    }
    nodes
}

fn push_text(nodes: &mut Vec<Expr>, text: &str) {
    if let Some(Expr::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Expr::text(text));
    }
}

fn extend_nodes(nodes: &mut Vec<Expr>, other: Vec<Expr>) {
    for node in other {
        match node {
            Expr::Text(text) => push_text(nodes, &text),
            marker => nodes.push(marker),
        }
    }
}

/// Whether any node needs evaluation
pub fn contains_marker(nodes: &[Expr]) -> bool {
    nodes.iter().any(Expr::is_marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(identifier: &str, parameters: Option<Vec<&str>>) -> Expr {
        Expr::Marker {
            identifier: vec![Expr::text(identifier)],
            parameters: parameters.map(|ps| ps.into_iter().map(|p| vec![Expr::text(p)]).collect()),
        }
    }

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(ExprParser::parse_str("a;b,c:d>e"), vec![Expr::text("a;b,c:d>e")]);
        assert!(ExprParser::parse_str("").is_empty());
    }

    #[test]
    fn test_parse_simple_marker() {
        assert_eq!(
            ExprParser::parse_str("$<CONFIG:Debug>"),
            vec![marker("CONFIG", Some(vec!["Debug"]))]
        );
        assert_eq!(ExprParser::parse_str("$<CONFIG>"), vec![marker("CONFIG", None)]);
    }

    #[test]
    fn test_parse_empty_parameter() {
        assert_eq!(ExprParser::parse_str("$<1:>"), vec![marker("1", Some(vec![""]))]);
    }

    #[test]
    fn test_parse_surrounding_text() {
        assert_eq!(
            ExprParser::parse_str("-D$<IF:1,a,b>, x"),
            vec![
                Expr::text("-D"),
                marker("IF", Some(vec!["1", "a", "b"])),
                Expr::text(", x"),
            ]
        );
    }

    #[test]
    fn test_parse_nested_identifier() {
        let nodes = ExprParser::parse_str("$<$<CONFIG:Debug>:-g>");
        assert_eq!(
            nodes,
            vec![Expr::Marker {
                identifier: vec![marker("CONFIG", Some(vec!["Debug"]))],
                parameters: Some(vec![vec![Expr::text("-g")]]),
            }]
        );
    }

    #[test]
    fn test_nested_separators_stay_inside() {
        let nodes = ExprParser::parse_str("$<JOIN:$<IF:1,a;b,c>,->");
        let Expr::Marker {
            parameters: Some(parameters),
            ..
        } = &nodes[0]
        else {
            panic!("expected marker");
        };
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0], vec![marker("IF", Some(vec!["1", "a;b", "c"]))]);
        assert_eq!(parameters[1], vec![Expr::text("-")]);
    }

    #[test]
    fn test_colons_after_first_are_text() {
        assert_eq!(
            ExprParser::parse_str("$<1:C:/path>"),
            vec![marker("1", Some(vec!["C:/path"]))]
        );
    }

    #[test]
    fn test_degenerate_markers_are_text() {
        assert_eq!(ExprParser::parse_str("$<>"), vec![Expr::text("$<>")]);
        assert_eq!(ExprParser::parse_str("a$<:b>"), vec![Expr::text("a$<:b>")]);
        assert_eq!(
            ExprParser::parse_str("$<CONFIG:Debug"),
            vec![Expr::text("$<CONFIG:Debug")]
        );
    }

    #[test]
    fn test_unterminated_keeps_nested_markers() {
        let nodes = ExprParser::parse_str("$<IF:$<CONFIG:Debug>,x");
        assert_eq!(
            nodes,
            vec![
                Expr::text("$<IF:"),
                marker("CONFIG", Some(vec!["Debug"])),
                Expr::text(",x"),
            ]
        );
    }

    #[test]
    fn test_display_round_trips_source() {
        let input = "pre $<IF:$<CONFIG:Debug>,a,b> post";
        let rendered: String = ExprParser::parse_str(input)
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(rendered, input);
    }

    #[test]
    fn test_contains_marker() {
        assert!(!contains_marker(&ExprParser::parse_str("plain")));
        assert!(!contains_marker(&ExprParser::parse_str("$<")));
        assert!(contains_marker(&ExprParser::parse_str("x$<1:y>")));
    }
}
