//! Placeholder grammar for catalog templates.
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `%1` … `%99` | positional argument (1-based) |
//! | `%L1` … `%L99` | same as `%1`; no locale-aware number formatting is applied |
//! | `%n`, `%Ln` | the plural count |
//! | `%{name}` | named argument |
//!
//! Anything else, including a token whose value was not supplied, is copied
//! to the output verbatim.

use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use core::fmt;
use core::fmt::Write;

use crate::Args;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    Positional(u8),
    Count,
    Named(String),
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Positional(index) => write!(f, "%{index}"),
            Placeholder::Count => f.write_str("%n"),
            Placeholder::Named(name) => write!(f, "%{{{name}}}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Token {
        raw: &'a str,
        placeholder: Placeholder,
    },
}

/// Splits a template into literal text and placeholder tokens.
pub struct Segments<'a> {
    template: &'a str,
    offset: usize,
}

impl<'a> Segments<'a> {
    pub fn new(template: &'a str) -> Self {
        Self {
            template,
            offset: 0,
        }
    }

    fn token_at(&self, start: usize) -> Option<(usize, Placeholder)> {
        let bytes = self.template.as_bytes();
        let mut cursor = start + 1;
        let localized = bytes.get(cursor) == Some(&b'L');
        if localized {
            cursor += 1;
        }
        match *bytes.get(cursor)? {
            b'n' => Some((cursor + 1, Placeholder::Count)),
            digit @ b'1'..=b'9' => {
                let mut index = digit - b'0';
                cursor += 1;
                if let Some(next @ b'0'..=b'9') = bytes.get(cursor).copied() {
                    index = index * 10 + (next - b'0');
                    cursor += 1;
                }
                Some((cursor, Placeholder::Positional(index)))
            }
            b'{' if !localized => {
                let name_start = cursor + 1;
                let mut end = name_start;
                while let Some(byte) = bytes.get(end) {
                    if byte.is_ascii_alphanumeric() || *byte == b'_' {
                        end += 1;
                    } else {
                        break;
                    }
                }
                if end == name_start || bytes.get(end) != Some(&b'}') {
                    return None;
                }
                let name = self.template[name_start..end].to_string();
                Some((end + 1, Placeholder::Named(name)))
            }
            _ => None,
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.template.as_bytes();
        if self.offset >= bytes.len() {
            return None;
        }
        let start = self.offset;
        if bytes[start] == b'%' {
            if let Some((end, placeholder)) = self.token_at(start) {
                self.offset = end;
                return Some(Segment::Token {
                    raw: &self.template[start..end],
                    placeholder,
                });
            }
        }
        // A lone `%` is literal; scan to the next candidate token.
        let mut end = start + 1;
        while end < bytes.len() && bytes[end] != b'%' {
            end += 1;
        }
        self.offset = end;
        Some(Segment::Text(&self.template[start..end]))
    }
}

pub fn render(template: &str, count: Option<i64>, args: &Args) -> String {
    let mut output = String::with_capacity(template.len());
    for segment in Segments::new(template) {
        match segment {
            Segment::Text(text) => output.push_str(text),
            Segment::Token { raw, placeholder } => {
                let written = match &placeholder {
                    Placeholder::Positional(index) => args
                        .get_index(usize::from(*index))
                        .map(|value| write!(output, "{value}")),
                    Placeholder::Count => count.map(|count| write!(output, "{count}")),
                    Placeholder::Named(name) => {
                        args.get(name).map(|value| write!(output, "{value}"))
                    }
                };
                if written.is_none() {
                    output.push_str(raw);
                }
            }
        }
    }
    output
}

pub fn placeholders(template: &str) -> BTreeSet<Placeholder> {
    Segments::new(template)
        .filter_map(|segment| match segment {
            Segment::Token { placeholder, .. } => Some(placeholder),
            Segment::Text(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{Placeholder, Segment, Segments, placeholders, render};
    use crate::Args;

    #[test]
    fn substitutes_positional_arguments() {
        let args = Args::positional(["Active"]);
        assert_eq!(render("Status: %1", None, &args), "Status: Active");
    }

    #[test]
    fn substitutes_in_order_of_index_not_position() {
        let args = Args::positional(["a", "b"]);
        assert_eq!(render("%2 then %1", None, &args), "b then a");
    }

    #[test]
    fn substitutes_count_only_when_supplied() {
        let args = Args::new();
        assert_eq!(render("%n hour(s)", Some(5), &args), "5 hour(s)");
        assert_eq!(render("%n hour(s)", None, &args), "%n hour(s)");
        assert_eq!(render("%Ln blocks", Some(-3), &args), "-3 blocks");
    }

    #[test]
    fn localized_markers_are_treated_as_plain() {
        let args = Args::positional([1500]);
        assert_eq!(render("Fee: %L1 WAGE", None, &args), "Fee: 1500 WAGE");
    }

    #[test]
    fn named_arguments() {
        let args = Args::new().named("ticker", "WAGE");
        assert_eq!(render("Send %{ticker}", None, &args), "Send WAGE");
        assert_eq!(render("Send %{unknown}", None, &args), "Send %{unknown}");
    }

    #[test]
    fn leaves_unknown_tokens_verbatim() {
        let args = Args::positional(["x"]);
        assert_eq!(render("100% sure", None, &args), "100% sure");
        assert_eq!(render("%0 %x %{ %{a b}", None, &args), "%0 %x %{ %{a b}");
        assert_eq!(render("%3 of %1", None, &args), "%3 of x");
        assert_eq!(render("trailing %", None, &args), "trailing %");
    }

    #[test]
    fn two_digit_indices() {
        let values: Vec<i64> = (1..=12).collect();
        let args = Args::positional(values);
        assert_eq!(render("%12/%1", None, &args), "12/1");
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        let args = Args::positional(["10"]);
        assert_eq!(render("동기화 - Block : %1", None, &args), "동기화 - Block : 10");
    }

    #[test]
    fn segments_split_text_and_tokens() {
        let segments: Vec<Segment<'_>> = Segments::new("a %1%%n").collect();
        assert_eq!(
            segments,
            vec![
                Segment::Text("a "),
                Segment::Token {
                    raw: "%1",
                    placeholder: Placeholder::Positional(1),
                },
                Segment::Text("%"),
                Segment::Token {
                    raw: "%n",
                    placeholder: Placeholder::Count,
                },
            ]
        );
    }

    #[test]
    fn collects_placeholders() {
        let found = placeholders("%1 and %2, %n, %1 again, %{name}");
        let rendered: Vec<_> = found.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["%1", "%2", "%n", "%{name}"]);
    }
}
