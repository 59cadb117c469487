//! Hand-rolled tokenizer for the simpledb SQL dialect.

use crate::error::{Position, SqlSyntaxError};
use crate::token::{lookup_keyword, Token, TokenKind};
use crate::value::Value;

/// Tokenizes a SQL string into a sequence of tokens ending in `Eof`.
///
/// Whitespace is skipped; line/col accounting advances on `\n`. String
/// literals are single-quoted with no escape syntax -- the literal runs to
/// the next single quote. Integer literals are maximal digit runs. Keyword
/// matching is case-insensitive; identifiers preserve their original case.
pub fn tokenize(sql: &str) -> Result<Vec<Token>, SqlSyntaxError> {
    let chars: Vec<char> = sql.chars().collect();
    let mut tokens = Vec::new();

    let mut i = 0usize;
    let mut line = 1usize;
    let mut col = 1usize;

    let advance = |i: &mut usize, line: &mut usize, col: &mut usize, chars: &[char]| {
        if *i < chars.len() {
            if chars[*i] == '\n' {
                *line += 1;
                *col = 1;
            } else {
                *col += 1;
            }
            *i += 1;
        }
    };

    while i < chars.len() {
        let ch = chars[i];

        if ch.is_whitespace() {
            advance(&mut i, &mut line, &mut col, &chars);
            continue;
        }

        let pos = Position::new(line, col);

        macro_rules! single {
            ($kind:expr) => {{
                tokens.push(Token::new($kind, ch.to_string(), None, pos));
                advance(&mut i, &mut line, &mut col, &chars);
                continue;
            }};
        }

        match ch {
            '(' => single!(TokenKind::LParen),
            ')' => single!(TokenKind::RParen),
            ',' => single!(TokenKind::Comma),
            ';' => single!(TokenKind::Semi),
            '=' => single!(TokenKind::Eq),
            '*' => single!(TokenKind::Star),
            '.' => single!(TokenKind::Dot),
            _ => {}
        }

        // String literal: '...'
        if ch == '\'' {
            let start = pos;
            advance(&mut i, &mut line, &mut col, &chars);
            let mut buf = String::new();
            loop {
                if i >= chars.len() {
                    return Err(SqlSyntaxError::new("unterminated string literal", start));
                }
                let c = chars[i];
                if c == '\'' {
                    advance(&mut i, &mut line, &mut col, &chars);
                    break;
                }
                buf.push(c);
                advance(&mut i, &mut line, &mut col, &chars);
            }
            tokens.push(Token::new(
                TokenKind::String,
                format!("'{buf}'"),
                Some(Value::Text(buf)),
                start,
            ));
            continue;
        }

        // Integer literal: maximal digit run.
        if ch.is_ascii_digit() {
            let start = pos;
            let mut j = i;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            let lexeme: String = chars[i..j].iter().collect();
            let n: i64 = lexeme.parse().map_err(|_| {
                SqlSyntaxError::new(format!("integer literal out of range: {lexeme}"), start)
            })?;
            tokens.push(Token::new(TokenKind::Int, lexeme, Some(Value::Integer(n)), start));
            for _ in i..j {
                advance(&mut i, &mut line, &mut col, &chars);
            }
            continue;
        }

        // Identifier / keyword / boolean.
        if ch.is_alphabetic() || ch == '_' {
            let start = pos;
            let mut j = i;
            while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            let lexeme: String = chars[i..j].iter().collect();
            let upper = lexeme.to_ascii_uppercase();

            let token = if upper == "TRUE" {
                Token::new(TokenKind::Bool, lexeme, Some(Value::Boolean(true)), start)
            } else if upper == "FALSE" {
                Token::new(TokenKind::Bool, lexeme, Some(Value::Boolean(false)), start)
            } else if let Some(kind) = lookup_keyword(&upper) {
                Token::new(kind, lexeme, Some(Value::Text(upper)), start)
            } else {
                Token::new(TokenKind::Ident, lexeme.clone(), Some(Value::Text(lexeme)), start)
            };
            tokens.push(token);

            for _ in i..j {
                advance(&mut i, &mut line, &mut col, &chars);
            }
            continue;
        }

        return Err(SqlSyntaxError::new(format!("unexpected character: {ch:?}"), pos));
    }

    tokens.push(Token::new(TokenKind::Eof, "", None, Position::new(line, col)));
    Ok(tokens)
}
