use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::lexer::{Attribute, Lexer, Span, Token, TokenKind};
use crate::{
    Catalog, CatalogBuilder, Diagnostic, LanguageTag, MessageEntry, ParseError, Translation,
    TranslationState,
};

/// A parsed catalog together with the non-fatal findings made while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCatalog {
    pub catalog: Catalog,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns a catalog document into a [`Catalog`].
///
/// The document's `language` attribute names the locale unless one is set
/// with [`CatalogParser::with_locale`], which takes precedence.
#[derive(Debug, Clone, Default)]
pub struct CatalogParser {
    locale: Option<LanguageTag>,
}

impl CatalogParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(mut self, locale: LanguageTag) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn parse(&self, document: &[u8]) -> Result<ParsedCatalog, ParseError> {
        let text = decode_utf8(document)?;
        self.parse_str(text)
    }

    pub fn parse_str(&self, document: &str) -> Result<ParsedCatalog, ParseError> {
        let document = document.strip_prefix('\u{feff}').unwrap_or(document);
        let tokens = Lexer::new(document).lex_all()?;
        let mut parser = Parser::new(tokens);
        parser.parse_document(self.locale.as_ref())
    }
}

pub fn parse(document: &[u8]) -> Result<ParsedCatalog, ParseError> {
    CatalogParser::new().parse(document)
}

fn decode_utf8(document: &[u8]) -> Result<&str, ParseError> {
    let body = document.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(document);
    core::str::from_utf8(body).map_err(|err| {
        let valid = core::str::from_utf8(&body[..err.valid_up_to()]).unwrap_or_default();
        let (line, column) = end_position(valid);
        ParseError::encoding("invalid UTF-8 sequence", line, column)
    })
}

fn end_position(text: &str) -> (u32, u32) {
    let mut line = 1;
    let mut column = 1;
    for ch in text.chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

struct ParsedMessage {
    entry: MessageEntry,
    span: Span,
    forms_without_numerus: bool,
    numerus_without_forms: bool,
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            diagnostics: Vec::new(),
        }
    }

    fn parse_document(
        &mut self,
        locale: Option<&LanguageTag>,
    ) -> Result<ParsedCatalog, ParseError> {
        while let Some(token) = self.tokens.get(self.index) {
            match &token.kind {
                TokenKind::Declaration(attributes) => {
                    check_encoding(attributes, token.span)?;
                    self.index += 1;
                }
                TokenKind::Text(text) if is_blank(text) => self.index += 1,
                _ => break,
            }
        }

        let root = self
            .next()
            .ok_or_else(|| self.eof_error("document has no root element"))?;
        let TokenKind::StartTag {
            name,
            attributes,
            self_closing,
        } = root.kind
        else {
            return Err(format_error("expected root element `TS`", root.span));
        };
        if name != "TS" {
            return Err(format_error(
                format!("expected root element `TS`, found `{name}`"),
                root.span,
            ));
        }

        let locale = match (locale, attribute(&attributes, "language")) {
            (Some(tag), _) => tag.clone(),
            (None, Some(value)) if !value.trim().is_empty() => LanguageTag::parse(value)
                .map_err(|_| {
                    format_error(format!("invalid language attribute `{value}`"), root.span)
                })?,
            (None, _) => {
                return Err(format_error(
                    "catalog does not declare a language",
                    root.span,
                ));
            }
        };
        let mut builder = CatalogBuilder::new(locale);
        builder.set_source_language(
            attribute(&attributes, "sourcelanguage")
                .filter(|value| !value.is_empty())
                .map(ToString::to_string),
        );

        if !self_closing {
            self.parse_root(&mut builder)?;
        }

        while let Some(token) = self.next() {
            match token.kind {
                TokenKind::Text(text) if is_blank(&text) => {}
                _ => {
                    return Err(format_error("content after the root element", token.span));
                }
            }
        }

        Ok(ParsedCatalog {
            catalog: builder.build(),
            diagnostics: core::mem::take(&mut self.diagnostics),
        })
    }

    fn parse_root(&mut self, builder: &mut CatalogBuilder) -> Result<(), ParseError> {
        loop {
            let token = self.expect_token("TS")?;
            match token.kind {
                TokenKind::EndTag(name) if name == "TS" => return Ok(()),
                TokenKind::EndTag(name) => return Err(mismatched(&name, "TS", token.span)),
                TokenKind::StartTag {
                    name, self_closing, ..
                } if name == "context" => {
                    if self_closing {
                        return Err(format_error("context is missing its name", token.span));
                    }
                    self.parse_context(builder, token.span)?;
                }
                TokenKind::StartTag {
                    name, self_closing, ..
                } => self.skip_element(&name, self_closing)?,
                TokenKind::Text(_) => {}
                TokenKind::Declaration(_) => {
                    return Err(format_error("unexpected XML declaration", token.span));
                }
            }
        }
    }

    fn parse_context(
        &mut self,
        builder: &mut CatalogBuilder,
        span: Span,
    ) -> Result<(), ParseError> {
        let mut name: Option<String> = None;
        let mut messages = Vec::new();
        loop {
            let token = self.expect_token("context")?;
            match token.kind {
                TokenKind::EndTag(tag) if tag == "context" => break,
                TokenKind::EndTag(tag) => return Err(mismatched(&tag, "context", token.span)),
                TokenKind::StartTag {
                    name: tag,
                    attributes,
                    self_closing,
                } => match tag.as_str() {
                    "name" => name = Some(self.read_text("name", self_closing)?),
                    "message" => {
                        messages.push(self.parse_message(&attributes, self_closing, token.span)?);
                    }
                    _ => self.skip_element(&tag, self_closing)?,
                },
                TokenKind::Text(_) => {}
                TokenKind::Declaration(_) => {
                    return Err(format_error("unexpected XML declaration", token.span));
                }
            }
        }

        let name = name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| format_error("context is missing its name", span))?;
        if builder.has_context(&name) {
            self.diagnostics.push(
                Diagnostic::warning(
                    "TS001",
                    "context appears more than once; messages were merged",
                )
                .with_context(name.clone())
                .with_line(span.line),
            );
        }
        builder.open_context(&name);

        for message in messages {
            let source = message.entry.source().to_string();
            if message.forms_without_numerus {
                self.diagnostics.push(
                    Diagnostic::warning("TS021", "plural forms on a message not marked numerus")
                        .with_context(name.clone())
                        .with_source(source.clone())
                        .with_line(message.span.line),
                );
            }
            if message.numerus_without_forms {
                self.diagnostics.push(
                    Diagnostic::warning("TS021", "numerus message has no plural forms")
                        .with_context(name.clone())
                        .with_source(source.clone())
                        .with_line(message.span.line),
                );
            }
            if builder.push(&name, message.entry).is_some() {
                self.diagnostics.push(
                    Diagnostic::warning("TS002", "message defined more than once; the last one wins")
                        .with_context(name.clone())
                        .with_source(source)
                        .with_line(message.span.line),
                );
            }
        }
        Ok(())
    }

    fn parse_message(
        &mut self,
        attributes: &[Attribute],
        self_closing: bool,
        span: Span,
    ) -> Result<ParsedMessage, ParseError> {
        if self_closing {
            return Err(format_error("message is missing its source text", span));
        }
        let numerus = attribute(attributes, "numerus") == Some("yes");
        let mut source = None;
        let mut disambiguation = None;
        let mut translation = None;
        loop {
            let token = self.expect_token("message")?;
            match token.kind {
                TokenKind::EndTag(tag) if tag == "message" => break,
                TokenKind::EndTag(tag) => return Err(mismatched(&tag, "message", token.span)),
                TokenKind::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => match name.as_str() {
                    "source" => source = Some(self.read_text("source", self_closing)?),
                    "comment" => disambiguation = Some(self.read_text("comment", self_closing)?),
                    "translation" => {
                        translation = Some(self.parse_translation(
                            &attributes,
                            self_closing,
                            numerus,
                            token.span,
                        )?);
                    }
                    _ => self.skip_element(&name, self_closing)?,
                },
                TokenKind::Text(_) => {}
                TokenKind::Declaration(_) => {
                    return Err(format_error("unexpected XML declaration", token.span));
                }
            }
        }

        let source =
            source.ok_or_else(|| format_error("message is missing its source text", span))?;
        let (translation, state, forms_without_numerus, numerus_without_forms) = translation
            .unwrap_or_else(|| {
                let empty = if numerus {
                    Translation::Plural(Vec::new())
                } else {
                    Translation::Single(String::new())
                };
                (empty, TranslationState::Unfinished, false, false)
            });
        let mut entry = MessageEntry::new(source, translation).with_state(state);
        if let Some(disambiguation) = disambiguation {
            entry = entry.with_disambiguation(disambiguation);
        }
        Ok(ParsedMessage {
            entry,
            span,
            forms_without_numerus,
            numerus_without_forms,
        })
    }

    fn parse_translation(
        &mut self,
        attributes: &[Attribute],
        self_closing: bool,
        numerus: bool,
        span: Span,
    ) -> Result<(Translation, TranslationState, bool, bool), ParseError> {
        let kind = attribute(attributes, "type").unwrap_or("");
        let state = TranslationState::from_attribute(kind).ok_or_else(|| {
            format_error(format!("unknown translation type `{kind}`"), span)
        })?;
        if self_closing {
            let empty = if numerus {
                Translation::Plural(Vec::new())
            } else {
                Translation::Single(String::new())
            };
            return Ok((empty, state, false, false));
        }

        let mut text = String::new();
        let mut forms = Vec::new();
        let mut variant = None;
        loop {
            let token = self.expect_token("translation")?;
            match token.kind {
                TokenKind::EndTag(tag) if tag == "translation" => break,
                TokenKind::EndTag(tag) => {
                    return Err(mismatched(&tag, "translation", token.span));
                }
                TokenKind::Text(chunk) => text.push_str(&chunk),
                TokenKind::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => match name.as_str() {
                    "numerusform" => forms.push(self.read_text("numerusform", self_closing)?),
                    "lengthvariant" => {
                        let value = self.read_text("lengthvariant", self_closing)?;
                        if variant.is_none() {
                            variant = Some(value);
                        }
                    }
                    "byte" => {
                        text.push(byte_char(&attributes, token.span)?);
                        self.skip_element(&name, self_closing)?;
                    }
                    _ => self.skip_element(&name, self_closing)?,
                },
                TokenKind::Declaration(_) => {
                    return Err(format_error("unexpected XML declaration", token.span));
                }
            }
        }

        if !forms.is_empty() {
            return Ok((Translation::Plural(forms), state, !numerus, false));
        }
        // The longest length variant comes first; the whitespace around the
        // variant elements is layout.
        if let Some(first) = variant {
            text = first;
        }
        if !numerus {
            return Ok((Translation::Single(text), state, false, false));
        }
        if is_blank(&text) {
            Ok((Translation::Plural(Vec::new()), state, false, false))
        } else {
            Ok((Translation::Plural(alloc::vec![text]), state, false, true))
        }
    }

    /// Collects the character data of a leaf element up to its closing tag.
    /// An element split into `lengthvariant` children yields its first variant.
    fn read_text(&mut self, tag: &str, self_closing: bool) -> Result<String, ParseError> {
        let mut text = String::new();
        if self_closing {
            return Ok(text);
        }
        let mut variant = None;
        loop {
            let token = self.expect_token(tag)?;
            match token.kind {
                TokenKind::Text(chunk) => text.push_str(&chunk),
                TokenKind::EndTag(name) if name == tag => return Ok(variant.unwrap_or(text)),
                TokenKind::EndTag(name) => return Err(mismatched(&name, tag, token.span)),
                TokenKind::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => match name.as_str() {
                    "lengthvariant" if tag != "lengthvariant" => {
                        let value = self.read_text("lengthvariant", self_closing)?;
                        if variant.is_none() {
                            variant = Some(value);
                        }
                    }
                    "byte" => {
                        text.push(byte_char(&attributes, token.span)?);
                        self.skip_element(&name, self_closing)?;
                    }
                    _ => self.skip_element(&name, self_closing)?,
                },
                TokenKind::Declaration(_) => {
                    return Err(format_error("unexpected XML declaration", token.span));
                }
            }
        }
    }

    fn skip_element(&mut self, name: &str, self_closing: bool) -> Result<(), ParseError> {
        if self_closing {
            return Ok(());
        }
        let mut open: Vec<String> = Vec::new();
        loop {
            let token = self.expect_token(name)?;
            match token.kind {
                TokenKind::StartTag {
                    name: inner,
                    self_closing: false,
                    ..
                } => open.push(inner),
                TokenKind::EndTag(closing) => {
                    let expected = open.last().map(String::as_str).unwrap_or(name);
                    if closing != expected {
                        return Err(mismatched(&closing, expected, token.span));
                    }
                    if open.pop().is_none() {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn expect_token(&mut self, inside: &str) -> Result<Token, ParseError> {
        self.next()
            .ok_or_else(|| self.eof_error(&format!("unclosed element `{inside}`")))
    }

    fn eof_error(&self, message: &str) -> ParseError {
        let (line, column) = self
            .tokens
            .last()
            .map(|token| (token.span.line, token.span.column))
            .unwrap_or((1, 1));
        ParseError::format(message, line, column)
    }
}

fn attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|attribute| attribute.name == name)
        .map(|attribute| attribute.value.as_str())
}

fn check_encoding(attributes: &[Attribute], span: Span) -> Result<(), ParseError> {
    match attribute(attributes, "encoding") {
        Some(encoding)
            if !encoding.eq_ignore_ascii_case("utf-8") && !encoding.eq_ignore_ascii_case("utf8") =>
        {
            Err(ParseError::encoding(
                format!("unsupported document encoding `{encoding}`"),
                span.line,
                span.column,
            ))
        }
        _ => Ok(()),
    }
}

/// `<byte value="x1b"/>` carries a character that XML text cannot.
fn byte_char(attributes: &[Attribute], span: Span) -> Result<char, ParseError> {
    let invalid = || ParseError::encoding("invalid byte value", span.line, span.column);
    let value = attribute(attributes, "value").ok_or_else(invalid)?;
    let code = match value.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).map_err(|_| invalid())?,
        None => value.parse::<u32>().map_err(|_| invalid())?,
    };
    char::from_u32(code).ok_or_else(invalid)
}

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

fn format_error(message: impl Into<String>, span: Span) -> ParseError {
    ParseError::format(message, span.line, span.column)
}

fn mismatched(found: &str, expected: &str, span: Span) -> ParseError {
    format_error(
        format!("mismatched closing tag `{found}`, expected `{expected}`"),
        span,
    )
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{CatalogParser, parse};
    use crate::{LanguageTag, MessageEntry, ParseError, Translation, TranslationState};

    const WALLET_KO: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="ko_KR" sourcelanguage="en">
<context>
    <name>AskPassphraseDialog</name>
    <message>
        <location filename="../forms/askpassphrasedialog.ui" line="+20"/>
        <source>OK</source>
        <translation>선택</translation>
    </message>
    <message>
        <source>Cancel</source>
        <translation>취소</translation>
    </message>
</context>
<context>
    <name>BitcoinGUI</name>
    <message numerus="yes">
        <source>%n hour(s)</source>
        <translation><numerusform>%n 시간</numerusform></translation>
    </message>
    <message>
        <source>Status: %1</source>
        <extracomment>Shown in the status bar</extracomment>
        <translation type="unfinished"></translation>
    </message>
</context>
</TS>
"#;

    fn parse_ok(document: &str) -> super::ParsedCatalog {
        parse(document.as_bytes()).expect("parse ok")
    }

    fn codes(parsed: &super::ParsedCatalog) -> Vec<&'static str> {
        parsed.diagnostics.iter().map(|diagnostic| diagnostic.code).collect()
    }

    #[test]
    fn parses_contexts_and_messages() {
        let parsed = parse_ok(WALLET_KO);
        let catalog = &parsed.catalog;
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(catalog.locale().normalized(), "ko_KR");
        assert_eq!(catalog.source_language(), Some("en"));
        assert_eq!(catalog.message_count(), 4);
        let ok = catalog.lookup("AskPassphraseDialog", "OK", None).expect("entry");
        assert_eq!(ok.translation(), &Translation::Single(String::from("선택")));
        assert_eq!(ok.state(), TranslationState::Finished);
    }

    #[test]
    fn parses_plural_and_unfinished_entries() {
        let parsed = parse_ok(WALLET_KO);
        let hours = parsed
            .catalog
            .lookup("BitcoinGUI", "%n hour(s)", None)
            .expect("entry");
        assert_eq!(
            hours.translation(),
            &Translation::Plural(vec![String::from("%n 시간")])
        );
        let status = parsed
            .catalog
            .lookup("BitcoinGUI", "Status: %1", None)
            .expect("entry");
        assert_eq!(status.state(), TranslationState::Unfinished);
        assert_eq!(status.translation(), &Translation::Single(String::new()));
    }

    #[test]
    fn parsing_is_idempotent() {
        let first = parse_ok(WALLET_KO);
        let second = parse_ok(WALLET_KO);
        assert_eq!(first, second);
    }

    #[test]
    fn accepts_byte_order_mark() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(WALLET_KO.as_bytes());
        let parsed = parse(&bytes).expect("parse ok");
        assert_eq!(parsed.catalog.message_count(), 4);
    }

    #[test]
    fn merges_duplicate_contexts() {
        let parsed = parse_ok(
            "<TS language=\"de\">\
             <context><name>Ctx</name><message><source>A</source><translation>a</translation></message></context>\
             <context><name>Other</name></context>\
             <context><name>Ctx</name><message><source>B</source><translation>b</translation></message></context>\
             </TS>",
        );
        assert_eq!(codes(&parsed), ["TS001"]);
        let block = parsed.catalog.context("Ctx").expect("context");
        let sources: Vec<&str> = block.messages().iter().map(MessageEntry::source).collect();
        assert_eq!(sources, ["A", "B"]);
        assert!(parsed.catalog.context("Other").expect("context").is_empty());
    }

    #[test]
    fn last_duplicate_message_wins() {
        let parsed = parse_ok(
            "<TS language=\"de\"><context><name>Ctx</name>\
             <message><source>A</source><translation>first</translation></message>\
             <message><source>B</source><translation>b</translation></message>\
             <message><source>A</source><translation>second</translation></message>\
             </context></TS>",
        );
        assert_eq!(codes(&parsed), ["TS002"]);
        let block = parsed.catalog.context("Ctx").expect("context");
        assert_eq!(block.len(), 2);
        assert_eq!(block.messages()[0].source(), "A");
        assert_eq!(
            block.messages()[0].translation(),
            &Translation::Single(String::from("second"))
        );
    }

    #[test]
    fn comment_is_a_disambiguation() {
        let parsed = parse_ok(
            "<TS language=\"nl\"><context><name>Ctx</name>\
             <message><source>Open</source><translation>Openen</translation></message>\
             <message><source>Open</source><comment>state</comment><translation>Geopend</translation></message>\
             </context></TS>",
        );
        assert!(parsed.diagnostics.is_empty());
        let entry = parsed
            .catalog
            .lookup("Ctx", "Open", Some("state"))
            .expect("entry");
        assert_eq!(entry.translation(), &Translation::Single(String::from("Geopend")));
    }

    #[test]
    fn decodes_entities_and_bytes() {
        let parsed = parse_ok(
            "<TS language=\"en\"><context><name>Ctx</name>\
             <message><source>&amp;Save &lt;all&gt;</source>\
             <translation>&#83;ave&#x21;<byte value=\"x1b\"/></translation></message>\
             </context></TS>",
        );
        let entry = parsed
            .catalog
            .lookup("Ctx", "&Save <all>", None)
            .expect("entry");
        assert_eq!(
            entry.translation(),
            &Translation::Single(String::from("Save!\u{1b}"))
        );
    }

    #[test]
    fn retired_states_are_retained() {
        let parsed = parse_ok(
            "<TS language=\"fr\"><context><name>Ctx</name>\
             <message><source>Old</source><translation type=\"obsolete\">Vieux</translation></message>\
             <message><source>Gone</source><translation type=\"vanished\">Parti</translation></message>\
             </context></TS>",
        );
        let old = parsed.catalog.lookup("Ctx", "Old", None).expect("entry");
        assert_eq!(old.state(), TranslationState::Obsolete);
        let gone = parsed.catalog.lookup("Ctx", "Gone", None).expect("entry");
        assert_eq!(gone.state(), TranslationState::Vanished);
    }

    #[test]
    fn missing_translation_is_an_unfinished_empty_entry() {
        let parsed = parse_ok(
            "<TS language=\"fr\"><context><name>Ctx</name>\
             <message><source>Lone</source></message>\
             <message numerus=\"yes\"><source>%n item(s)</source><translation type=\"unfinished\"/></message>\
             </context></TS>",
        );
        let lone = parsed.catalog.lookup("Ctx", "Lone", None).expect("entry");
        assert_eq!(lone.state(), TranslationState::Unfinished);
        assert_eq!(lone.translation(), &Translation::Single(String::new()));
        let items = parsed
            .catalog
            .lookup("Ctx", "%n item(s)", None)
            .expect("entry");
        assert_eq!(items.translation(), &Translation::Plural(Vec::new()));
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn flags_numerus_mismatches() {
        let parsed = parse_ok(
            "<TS language=\"en\"><context><name>Ctx</name>\
             <message><source>A</source><translation><numerusform>a</numerusform></translation></message>\
             <message numerus=\"yes\"><source>B</source><translation>b</translation></message>\
             </context></TS>",
        );
        assert_eq!(codes(&parsed), ["TS021", "TS021"]);
        let b = parsed.catalog.lookup("Ctx", "B", None).expect("entry");
        assert_eq!(b.translation(), &Translation::Plural(vec![String::from("b")]));
    }

    #[test]
    fn locale_override_wins() {
        let parser = CatalogParser::new().with_locale(LanguageTag::parse("ko-KR").expect("tag"));
        let parsed = parser
            .parse_str("<TS><context><name>Ctx</name></context></TS>")
            .expect("parse ok");
        assert_eq!(parsed.catalog.locale().normalized(), "ko_KR");
    }

    #[test]
    fn missing_language_is_a_format_error() {
        let err = parse(b"<TS version=\"2.1\"></TS>").expect_err("no language");
        assert!(matches!(err, ParseError::Format { .. }));
    }

    #[test]
    fn context_without_name_is_a_format_error() {
        let err = parse(
            b"<TS language=\"en\">\n<context>\n<message><source>A</source></message>\n</context></TS>",
        )
        .expect_err("no name");
        assert_eq!(err.message(), "context is missing its name");
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn message_without_source_is_a_format_error() {
        let err = parse(
            b"<TS language=\"en\"><context><name>Ctx</name><message><translation>x</translation></message></context></TS>",
        )
        .expect_err("no source");
        assert_eq!(err.message(), "message is missing its source text");
    }

    #[test]
    fn structural_errors_are_format_errors() {
        for document in [
            "",
            "<html></html>",
            "<TS language=\"en\"><context><name>Ctx</name></TS>",
            "<TS language=\"en\"><context><name>Ctx</name></context>",
            "<TS language=\"en\"></TS><TS language=\"en\"></TS>",
            "<TS language=\"en\"><context><name>Ctx</name><message><source>A</source><translation type=\"bogus\">x</translation></message></context></TS>",
        ] {
            let err = parse(document.as_bytes()).expect_err(document);
            assert!(!err.is_encoding(), "{document}: {err}");
        }
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let err = parse(b"<TS language=\"en\">\n<context>\xFF</context></TS>").expect_err("bad utf-8");
        assert!(err.is_encoding());
        assert_eq!(err.line(), 2);
        assert_eq!(err.column(), 10);
    }

    #[test]
    fn foreign_encoding_is_rejected() {
        let err = parse(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><TS language=\"en\"/>")
            .expect_err("latin-1");
        assert!(err.is_encoding());
    }

    #[test]
    fn unknown_entity_is_an_encoding_error() {
        let err = parse(
            b"<TS language=\"en\"><context><name>A&nbsp;B</name></context></TS>",
        )
        .expect_err("unknown entity");
        assert!(err.is_encoding());
    }

    #[test]
    fn length_variants_use_the_first_variant() {
        let parsed = parse_ok(
            "<TS language=\"de\"><context><name>Ctx</name>\n\
             <message><source>Save</source>\n\
                 <translation variants=\"yes\">\n\
                     <lengthvariant>Speichern</lengthvariant>\n\
                     <lengthvariant>Sp.</lengthvariant>\n\
                 </translation></message>\n\
             <message numerus=\"yes\"><source>%n file(s)</source><translation>\n\
                 <numerusform variants=\"yes\"><lengthvariant>%n Datei</lengthvariant>\
                 <lengthvariant>%n D.</lengthvariant></numerusform>\n\
                 <numerusform>%n Dateien</numerusform>\n\
             </translation></message>\n\
             <message><source>Open</source><translation variants=\"yes\">\n\
                 <lengthvariant></lengthvariant>\n\
             </translation></message></context></TS>",
        );
        let catalog = &parsed.catalog;
        let save = catalog.lookup("Ctx", "Save", None).expect("save");
        assert_eq!(save.translation(), &Translation::Single("Speichern".into()));
        let files = catalog.lookup("Ctx", "%n file(s)", None).expect("files");
        assert_eq!(
            files.translation(),
            &Translation::Plural(vec!["%n Datei".into(), "%n Dateien".into()])
        );
        let open = catalog.lookup("Ctx", "Open", None).expect("open");
        assert_eq!(open.translation(), &Translation::Single(String::new()));
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn skips_unknown_elements() {
        let parsed = parse_ok(
            "<TS language=\"en\"><dependencies><dependency catalog=\"qtbase\"/></dependencies>\
             <context><name>Ctx</name><extra-po-flags>c-format</extra-po-flags>\
             <message><source>A</source><translatorcomment>note</translatorcomment>\
             <oldsource>a</oldsource><translation>x</translation>\
             <userdata><nested>y</nested></userdata></message></context></TS>",
        );
        assert_eq!(parsed.catalog.message_count(), 1);
    }
}
