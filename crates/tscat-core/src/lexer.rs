use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `<?xml ...?>`; other processing instructions are skipped.
    Declaration(Vec<Attribute>),
    StartTag {
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
    },
    EndTag(String),
    /// Character data with entities already decoded.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    Markup,
    Encoding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub message: String,
    pub span: Span,
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        match error.kind {
            LexErrorKind::Markup => {
                ParseError::format(error.message, error.span.line, error.span.column)
            }
            LexErrorKind::Encoding => {
                ParseError::encoding(error.message, error.span.line, error.span.column)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    offset: usize,
    line: u32,
    column: u32,
}

pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn lex_all(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Ok(None);
            }
            let start = self.mark();
            if !rest.starts_with('<') {
                return self.lex_text(start).map(Some);
            }
            if rest.starts_with("<?") {
                if let Some(token) = self.lex_instruction(start)? {
                    return Ok(Some(token));
                }
                continue;
            }
            if rest.starts_with("<!--") {
                self.skip_past("-->", start, "unterminated comment")?;
                continue;
            }
            if rest.starts_with("<![CDATA[") {
                return self.lex_cdata(start).map(Some);
            }
            if rest.starts_with("<!") {
                self.skip_doctype(start)?;
                continue;
            }
            if rest.starts_with("</") {
                return self.lex_end_tag(start).map(Some);
            }
            return self.lex_start_tag(start).map(Some);
        }
    }

    fn lex_text(&mut self, start: Mark) -> Result<Token, LexError> {
        let rest = self.rest();
        let len = rest.find('<').unwrap_or(rest.len());
        let raw = &rest[..len];
        self.advance(len);
        let text = decode_entities(raw, start)?;
        Ok(Token {
            kind: TokenKind::Text(text),
            span: self.span_from(start),
        })
    }

    fn lex_cdata(&mut self, start: Mark) -> Result<Token, LexError> {
        self.advance("<![CDATA[".len());
        let rest = self.rest();
        let Some(end) = rest.find("]]>") else {
            return Err(markup_error("unterminated CDATA section", start));
        };
        let text = rest[..end].to_string();
        self.advance(end + 3);
        Ok(Token {
            kind: TokenKind::Text(text),
            span: self.span_from(start),
        })
    }

    fn lex_instruction(&mut self, start: Mark) -> Result<Option<Token>, LexError> {
        self.advance(2);
        let target = self.lex_name()?;
        if target != "xml" {
            self.skip_past("?>", start, "unterminated processing instruction")?;
            return Ok(None);
        }
        let attributes = self.lex_attributes(start)?;
        if !self.rest().starts_with("?>") {
            return Err(markup_error("unterminated XML declaration", start));
        }
        self.advance(2);
        Ok(Some(Token {
            kind: TokenKind::Declaration(attributes),
            span: self.span_from(start),
        }))
    }

    fn lex_start_tag(&mut self, start: Mark) -> Result<Token, LexError> {
        self.advance(1);
        let name = self.lex_name()?;
        let attributes = self.lex_attributes(start)?;
        let rest = self.rest();
        let self_closing = if rest.starts_with("/>") {
            self.advance(2);
            true
        } else if rest.starts_with('>') {
            self.advance(1);
            false
        } else {
            return Err(markup_error(format!("malformed tag `{name}`"), self.mark()));
        };
        Ok(Token {
            kind: TokenKind::StartTag {
                name,
                attributes,
                self_closing,
            },
            span: self.span_from(start),
        })
    }

    fn lex_end_tag(&mut self, start: Mark) -> Result<Token, LexError> {
        self.advance(2);
        let name = self.lex_name()?;
        self.skip_whitespace();
        if !self.rest().starts_with('>') {
            return Err(markup_error(
                format!("malformed closing tag `{name}`"),
                self.mark(),
            ));
        }
        self.advance(1);
        Ok(Token {
            kind: TokenKind::EndTag(name),
            span: self.span_from(start),
        })
    }

    /// Reads `name="value"` pairs up to (not including) `>`, `/>` or `?>`.
    fn lex_attributes(&mut self, tag_start: Mark) -> Result<Vec<Attribute>, LexError> {
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(markup_error("unterminated tag", tag_start));
            }
            if rest.starts_with('>') || rest.starts_with("/>") || rest.starts_with("?>") {
                return Ok(attributes);
            }
            let name = self.lex_name()?;
            self.skip_whitespace();
            if !self.rest().starts_with('=') {
                return Err(markup_error(
                    format!("expected `=` after attribute `{name}`"),
                    self.mark(),
                ));
            }
            self.advance(1);
            self.skip_whitespace();
            let value_start = self.mark();
            let rest = self.rest();
            let quote = match rest.chars().next() {
                Some(quote @ ('"' | '\'')) => quote,
                _ => {
                    return Err(markup_error(
                        format!("attribute `{name}` value must be quoted"),
                        value_start,
                    ));
                }
            };
            let Some(len) = rest[1..].find(quote) else {
                return Err(markup_error(
                    format!("unterminated value for attribute `{name}`"),
                    value_start,
                ));
            };
            let raw = &rest[1..1 + len];
            if raw.contains('<') {
                return Err(markup_error(
                    format!("`<` in value of attribute `{name}`"),
                    value_start,
                ));
            }
            let inner = Mark {
                offset: value_start.offset + 1,
                line: value_start.line,
                column: value_start.column + 1,
            };
            let value = decode_entities(raw, inner)?;
            self.advance(len + 2);
            attributes.push(Attribute { name, value });
        }
    }

    fn lex_name(&mut self) -> Result<String, LexError> {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(idx, ch)| !is_name_char(*ch, *idx == 0))
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(markup_error("expected a name", self.mark()));
        }
        let name = rest[..len].to_string();
        self.advance(len);
        Ok(name)
    }

    fn skip_doctype(&mut self, start: Mark) -> Result<(), LexError> {
        let mut depth = 0usize;
        for (idx, ch) in self.rest().char_indices() {
            match ch {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                '>' if depth == 0 => {
                    self.advance(idx + 1);
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(markup_error("unterminated declaration", start))
    }

    fn skip_past(
        &mut self,
        terminator: &str,
        start: Mark,
        message: &'static str,
    ) -> Result<(), LexError> {
        match self.rest().find(terminator) {
            Some(idx) => {
                self.advance(idx + terminator.len());
                Ok(())
            }
            None => Err(markup_error(message, start)),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let len = rest.len() - rest.trim_start().len();
        self.advance(len);
    }

    fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    fn mark(&self) -> Mark {
        Mark {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    fn span_from(&self, start: Mark) -> Span {
        Span {
            start: start.offset,
            end: self.offset,
            line: start.line,
            column: start.column,
        }
    }

    fn advance(&mut self, len: usize) {
        let consumed = &self.input[self.offset..self.offset + len];
        track_position(consumed, &mut self.line, &mut self.column);
        self.offset += len;
    }
}

fn is_name_char(ch: char, first: bool) -> bool {
    if first {
        ch.is_ascii_alphabetic() || ch == '_' || ch == ':'
    } else {
        ch.is_ascii_alphanumeric() || matches!(ch, '_' | ':' | '.' | '-')
    }
}

fn track_position(text: &str, line: &mut u32, column: &mut u32) {
    for ch in text.chars() {
        if ch == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
    }
}

fn decode_entities(raw: &str, start: Mark) -> Result<String, LexError> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }
    let mut output = String::with_capacity(raw.len());
    let mut line = start.line;
    let mut column = start.column;
    let mut offset = start.offset;
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        let (before, after) = rest.split_at(amp);
        output.push_str(before);
        track_position(before, &mut line, &mut column);
        offset += before.len();
        let here = Mark {
            offset,
            line,
            column,
        };
        let Some(semi) = after.find(';') else {
            return Err(encoding_error("unterminated entity reference", here));
        };
        let entity = &after[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_char_reference(entity),
        };
        let Some(ch) = decoded else {
            return Err(encoding_error(format!("unknown entity `&{entity};`"), here));
        };
        output.push(ch);
        let consumed = &after[..=semi];
        track_position(consumed, &mut line, &mut column);
        offset += consumed.len();
        rest = &after[semi + 1..];
    }
    output.push_str(rest);
    Ok(output)
}

fn decode_char_reference(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    if code == 0 {
        return None;
    }
    char::from_u32(code)
}

fn markup_error(message: impl Into<String>, at: Mark) -> LexError {
    LexError {
        kind: LexErrorKind::Markup,
        message: message.into(),
        span: Span {
            start: at.offset,
            end: at.offset,
            line: at.line,
            column: at.column,
        },
    }
}

fn encoding_error(message: impl Into<String>, at: Mark) -> LexError {
    LexError {
        kind: LexErrorKind::Encoding,
        ..markup_error(message, at)
    }
}
