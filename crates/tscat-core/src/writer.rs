use alloc::string::String;
use core::fmt::Write;

use crate::{Catalog, MessageEntry, Translation};

/// Serializes a catalog back into the document format read by
/// [`CatalogParser`](crate::CatalogParser).
///
/// Parsing the output yields a catalog equal to the input.
pub fn write_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<!DOCTYPE TS>\n");
    out.push_str("<TS version=\"2.1\" language=\"");
    escape_into(&mut out, catalog.locale().normalized(), true);
    out.push('"');
    if let Some(source_language) = catalog.source_language() {
        out.push_str(" sourcelanguage=\"");
        escape_into(&mut out, source_language, true);
        out.push('"');
    }
    out.push_str(">\n");

    for context in catalog.contexts() {
        out.push_str("<context>\n    <name>");
        escape_into(&mut out, context.name(), false);
        out.push_str("</name>\n");
        for entry in context.messages() {
            write_message(&mut out, entry);
        }
        out.push_str("</context>\n");
    }

    out.push_str("</TS>\n");
    out
}

fn write_message(out: &mut String, entry: &MessageEntry) {
    if entry.is_plural() {
        out.push_str("    <message numerus=\"yes\">\n");
    } else {
        out.push_str("    <message>\n");
    }
    out.push_str("        <source>");
    escape_into(out, entry.source(), false);
    out.push_str("</source>\n");
    if let Some(disambiguation) = entry.disambiguation() {
        out.push_str("        <comment>");
        escape_into(out, disambiguation, false);
        out.push_str("</comment>\n");
    }

    out.push_str("        <translation");
    if let Some(state) = entry.state().as_attribute() {
        let _ = write!(out, " type=\"{state}\"");
    }
    out.push('>');
    match entry.translation() {
        Translation::Single(text) => escape_into(out, text, false),
        Translation::Plural(forms) => {
            for form in forms {
                out.push_str("<numerusform>");
                escape_into(out, form, false);
                out.push_str("</numerusform>");
            }
        }
    }
    out.push_str("</translation>\n    </message>\n");
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' | '\t' if !attribute => out.push(ch),
            '\r' => out.push_str("&#13;"),
            ch if ch.is_control() && attribute => {
                let _ = write!(out, "&#x{:x};", u32::from(ch));
            }
            ch if ch.is_control() => {
                let _ = write!(out, "<byte value=\"x{:x}\"/>", u32::from(ch));
            }
            ch => out.push(ch),
        }
    }
}
