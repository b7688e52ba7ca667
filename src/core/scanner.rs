//! Bracket scanner - splits template text into literal runs and `[token]` placeholders.
//!
//! Syntax:
//! - `[name]` -> `Placeholder("name")`, closed by the first `]` after the `[`
//! - a `[` inside an open token is part of the name: `[a[b]` -> `Placeholder("a[b")`
//! - a newline before the closing `]` cancels the token; the `[` stays literal
//! - an unterminated `[` is literal
//! - `[]` -> `Placeholder("")`

/// A segment of scanned template text. Both variants borrow from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text, emitted as-is.
    Literal(&'a str),
    /// The inner text of a bracketed placeholder, without the brackets.
    Placeholder(&'a str),
}

#[derive(Debug, Clone, Copy)]
enum State {
    Outside,
    Inside { open: usize },
}

/// Iterator over the tokens of a template body.
///
/// Concatenating every `Literal` and every `Placeholder` re-wrapped in
/// brackets reproduces the input exactly.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        // Brackets and newline are ASCII, so byte offsets are always char boundaries.
        let mut state = State::Outside;
        for i in start..bytes.len() {
            match (state, bytes[i]) {
                (State::Outside, b'[') => state = State::Inside { open: i },
                (State::Inside { open }, b']') => {
                    if open > start {
                        // Flush the literal run; the placeholder is picked up on the next call.
                        self.pos = open;
                        return Some(Token::Literal(&self.input[start..open]));
                    }
                    self.pos = i + 1;
                    return Some(Token::Placeholder(&self.input[open + 1..i]));
                }
                (State::Inside { .. }, b'\n') => state = State::Outside,
                _ => {}
            }
        }

        self.pos = bytes.len();
        Some(Token::Literal(&self.input[start..]))
    }
}

/// Scan `input` into tokens.
pub fn scan(input: &str) -> Scanner<'_> {
    Scanner::new(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        scan(input).collect()
    }

    #[test]
    fn scan_literal_only() {
        assert_eq!(tokens("Hello, world."), vec![Token::Literal("Hello, world.")]);
    }

    #[test]
    fn scan_empty_input() {
        assert!(tokens("").is_empty());
    }

    #[test]
    fn scan_placeholders_and_literals() {
        assert_eq!(
            tokens("Hi [name], you are [adjective]!"),
            vec![
                Token::Literal("Hi "),
                Token::Placeholder("name"),
                Token::Literal(", you are "),
                Token::Placeholder("adjective"),
                Token::Literal("!"),
            ]
        );
    }

    #[test]
    fn scan_adjacent_placeholders() {
        assert_eq!(
            tokens("[a][b]"),
            vec![Token::Placeholder("a"), Token::Placeholder("b")]
        );
    }

    #[test]
    fn scan_empty_brackets() {
        assert_eq!(
            tokens("x [] y"),
            vec![
                Token::Literal("x "),
                Token::Placeholder(""),
                Token::Literal(" y"),
            ]
        );
    }

    #[test]
    fn scan_nested_brackets_close_at_first_bracket() {
        assert_eq!(
            tokens("[a[b]c]"),
            vec![Token::Placeholder("a[b"), Token::Literal("c]")]
        );
    }

    #[test]
    fn scan_unterminated_bracket_is_literal() {
        assert_eq!(
            tokens("Bad [unclosed here"),
            vec![Token::Literal("Bad [unclosed here")]
        );
    }

    #[test]
    fn scan_stray_close_bracket_is_literal() {
        assert_eq!(tokens("Bad ] here"), vec![Token::Literal("Bad ] here")]);
    }

    #[test]
    fn scan_newline_cancels_token() {
        assert_eq!(
            tokens("[broken\nline] then [ok]"),
            vec![
                Token::Literal("[broken\nline] then "),
                Token::Placeholder("ok"),
            ]
        );
    }

    #[test]
    fn scan_keeps_spacing_and_case_verbatim() {
        assert_eq!(
            tokens("[Noun][ noun ]"),
            vec![Token::Placeholder("Noun"), Token::Placeholder(" noun ")]
        );
    }

    #[test]
    fn scan_multibyte_text() {
        assert_eq!(
            tokens("café [naïve] über ok"),
            vec![
                Token::Literal("café "),
                Token::Placeholder("naïve"),
                Token::Literal(" über ok"),
            ]
        );
    }

    #[test]
    fn scan_reassembles_input() {
        let input = "A [x] b [a[b]c] [unclosed\n[y] z ] end";
        let rebuilt: String = scan(input)
            .map(|t| match t {
                Token::Literal(s) => s.to_string(),
                Token::Placeholder(p) => format!("[{}]", p),
            })
            .collect();
        assert_eq!(rebuilt, input);
    }
}
