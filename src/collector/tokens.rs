//! A tiny lexer splitting a source line into call-level tokens.

/// Token classes relevant to counting call arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// An identifier directly followed by `(`; carries the identifier. The
    /// parenthesis is part of the token.
    CallStart(&'a str),
    Open,
    Close,
    Separator,
    Whitespace,
    /// Anything else, including whole string and character literals.
    Other,
}

impl Token<'_> {
    /// Callee name without its qualifier (`Assert.assertTrue` -> `assertTrue`).
    #[must_use]
    pub fn callee(&self) -> Option<&str> {
        match self {
            Token::CallStart(name) => Some(name.rsplit('.').next().unwrap_or(name)),
            _ => None,
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '.'
}

/// Split `line` into tokens. Unterminated literals run to end of line.
#[must_use]
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '(' | '[' | '{' => tokens.push(Token::Open),
            ')' | ']' | '}' => tokens.push(Token::Close),
            ',' => tokens.push(Token::Separator),
            '"' | '\'' => {
                let mut escaped = false;
                for (_, next) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if next == '\\' {
                        escaped = true;
                    } else if next == c {
                        break;
                    }
                }
                tokens.push(Token::Other);
            }
            c if c.is_whitespace() => {
                while chars.next_if(|(_, n)| n.is_whitespace()).is_some() {}
                tokens.push(Token::Whitespace);
            }
            c if is_ident_char(c) => {
                let mut end = start + c.len_utf8();
                while let Some((i, n)) = chars.next_if(|(_, n)| is_ident_char(*n)) {
                    end = i + n.len_utf8();
                }
                if chars.next_if(|(_, n)| *n == '(').is_some() {
                    tokens.push(Token::CallStart(&line[start..end]));
                } else {
                    tokens.push(Token::Other);
                }
            }
            _ => tokens.push(Token::Other),
        }
    }
    tokens
}

#[cfg(test)]
#[path = "tokens_tests.rs"]
mod tests;
