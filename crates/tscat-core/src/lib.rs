#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod args;
mod diagnostic;
mod error;
mod fallback;
mod language_tag;
mod lexer;
mod model;
mod parser;
pub mod plural;
pub mod template;
mod validate;
mod writer;

pub use args::{Args, Value};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{CoreError, CoreResult, ParseError};
pub use fallback::{ChainLink, LocaleFallbackChain, chain_for};
pub use language_tag::LanguageTag;
pub use model::{
    Catalog, CatalogBuilder, ContextBlock, MessageEntry, Translation, TranslationState,
};
pub use parser::{CatalogParser, ParsedCatalog, parse};
pub use plural::{PluralCategory, PluralRule, PluralRuleTable};
pub use template::{Placeholder, placeholders, render};
pub use validate::validate_catalog;
pub use writer::write_catalog;
