use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Ident(SmolStr),
    True,
    False,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    AndAnd,
    OrOr,
    LParen,
    RParen,
}

/// A token paired with the byte offset of its first character, for error
/// reporting per `spec.md` §4.1 ("Errors include a character offset").
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub offset: usize,
    pub message: String,
}

pub(crate) fn tokenize(text: &str) -> Result<Vec<Spanned>, LexError> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let token = match c {
            '+' => {
                i += 1;
                Token::Plus
            }
            '-' => {
                i += 1;
                Token::Minus
            }
            '*' => {
                i += 1;
                Token::Star
            }
            '/' => {
                i += 1;
                Token::Slash
            }
            '(' => {
                i += 1;
                Token::LParen
            }
            ')' => {
                i += 1;
                Token::RParen
            }
            '<' => {
                i += 1;
                if bytes.get(i) == Some(&b'=') {
                    i += 1;
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                i += 1;
                if bytes.get(i) == Some(&b'=') {
                    i += 1;
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '=' => {
                i += 1;
                if bytes.get(i) == Some(&b'=') {
                    i += 1;
                    Token::EqEq
                } else {
                    return Err(LexError {
                        offset: start,
                        message: "expected '==', found single '='".to_string(),
                    });
                }
            }
            '!' => {
                i += 1;
                if bytes.get(i) == Some(&b'=') {
                    i += 1;
                    Token::Ne
                } else {
                    Token::Bang
                }
            }
            '&' => {
                i += 1;
                if bytes.get(i) == Some(&b'&') {
                    i += 1;
                    Token::AndAnd
                } else {
                    return Err(LexError {
                        offset: start,
                        message: "expected '&&', found single '&'".to_string(),
                    });
                }
            }
            '|' => {
                i += 1;
                if bytes.get(i) == Some(&b'|') {
                    i += 1;
                    Token::OrOr
                } else {
                    return Err(LexError {
                        offset: start,
                        message: "expected '||', found single '|'".to_string(),
                    });
                }
            }
            c if c.is_ascii_digit() => {
                while i < bytes.len() && ((bytes[i] as char).is_ascii_digit() || bytes[i] == b'.')
                {
                    i += 1;
                }
                let slice = &text[start..i];
                let value: f64 = slice.parse().map_err(|_| LexError {
                    offset: start,
                    message: format!("invalid numeric literal '{slice}'"),
                })?;
                Token::Number(value)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                match &text[start..i] {
                    "true" => Token::True,
                    "false" => Token::False,
                    ident => Token::Ident(SmolStr::new(ident)),
                }
            }
            other => {
                return Err(LexError {
                    offset: start,
                    message: format!("unexpected character '{other}'"),
                });
            }
        };

        out.push(Spanned {
            token,
            offset: start,
        });
    }

    Ok(out)
}
