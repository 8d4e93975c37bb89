use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::template::{Placeholder, placeholders};
use crate::{LanguageTag, PluralCategory, PluralRule};

/// Review state of a translation as recorded in the document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TranslationState {
    #[default]
    Finished,
    Unfinished,
    /// The source string no longer exists in the application.
    Obsolete,
    /// Like `Obsolete`, recorded by newer tooling.
    Vanished,
}

impl TranslationState {
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "" | "finished" => Some(TranslationState::Finished),
            "unfinished" => Some(TranslationState::Unfinished),
            "obsolete" => Some(TranslationState::Obsolete),
            "vanished" => Some(TranslationState::Vanished),
            _ => None,
        }
    }

    pub const fn as_attribute(self) -> Option<&'static str> {
        match self {
            TranslationState::Finished => None,
            TranslationState::Unfinished => Some("unfinished"),
            TranslationState::Obsolete => Some("obsolete"),
            TranslationState::Vanished => Some("vanished"),
        }
    }

    pub const fn is_retired(self) -> bool {
        matches!(self, TranslationState::Obsolete | TranslationState::Vanished)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Translation {
    Single(String),
    /// Templates in the order of the catalog locale's plural slots.
    Plural(Vec<String>),
}

impl Translation {
    pub fn templates(&self) -> &[String] {
        match self {
            Translation::Single(template) => core::slice::from_ref(template),
            Translation::Plural(forms) => forms,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEntry {
    source: String,
    disambiguation: Option<String>,
    translation: Translation,
    state: TranslationState,
}

impl MessageEntry {
    pub fn new(source: impl Into<String>, translation: Translation) -> Self {
        Self {
            source: source.into(),
            disambiguation: None,
            translation,
            state: TranslationState::Finished,
        }
    }

    pub fn single(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            disambiguation: None,
            translation: Translation::Single(translation.into()),
            state: TranslationState::Finished,
        }
    }

    pub fn plural<I, S>(source: impl Into<String>, forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            disambiguation: None,
            translation: Translation::Plural(forms.into_iter().map(Into::into).collect()),
            state: TranslationState::Finished,
        }
    }

    pub fn with_disambiguation(mut self, disambiguation: impl Into<String>) -> Self {
        self.disambiguation = Some(disambiguation.into());
        self
    }

    pub fn with_state(mut self, state: TranslationState) -> Self {
        self.state = state;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn disambiguation(&self) -> Option<&str> {
        self.disambiguation.as_deref()
    }

    pub fn translation(&self) -> &Translation {
        &self.translation
    }

    pub fn state(&self) -> TranslationState {
        self.state
    }

    pub fn is_plural(&self) -> bool {
        matches!(self.translation, Translation::Plural(_))
    }

    /// The template stored for `category` under `rule`'s slot order.
    pub fn plural_template(&self, rule: &PluralRule, category: PluralCategory) -> Option<&str> {
        let Translation::Plural(forms) = &self.translation else {
            return None;
        };
        let index = rule.slot_index(category)?;
        forms.get(index).map(String::as_str)
    }

    /// Placeholder tokens referenced by any of the translated templates.
    pub fn placeholders(&self) -> BTreeSet<Placeholder> {
        self.translation
            .templates()
            .iter()
            .flat_map(|template| placeholders(template))
            .collect()
    }

    pub fn source_placeholders(&self) -> BTreeSet<Placeholder> {
        placeholders(&self.source)
    }

    fn matches(&self, source: &str, disambiguation: Option<&str>) -> bool {
        self.source == source && self.disambiguation.as_deref() == disambiguation
    }
}

/// The messages of one UI surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextBlock {
    name: String,
    messages: Vec<MessageEntry>,
    index: BTreeMap<String, Vec<usize>>,
}

impl ContextBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn messages(&self) -> &[MessageEntry] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn lookup(&self, source: &str, disambiguation: Option<&str>) -> Option<&MessageEntry> {
        self.index
            .get(source)?
            .iter()
            .map(|position| &self.messages[*position])
            .find(|entry| entry.matches(source, disambiguation))
    }

    /// Adds an entry; an entry with the same key is replaced in place and
    /// returned.
    fn insert(&mut self, entry: MessageEntry) -> Option<MessageEntry> {
        let positions = self.index.entry(entry.source.clone()).or_default();
        for position in positions.iter() {
            let existing = &mut self.messages[*position];
            if existing.disambiguation == entry.disambiguation {
                return Some(core::mem::replace(existing, entry));
            }
        }
        positions.push(self.messages.len());
        self.messages.push(entry);
        None
    }
}

/// One locale's complete message set. Built once, never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    locale: LanguageTag,
    source_language: Option<String>,
    contexts: BTreeMap<String, ContextBlock>,
}

impl Catalog {
    pub fn locale(&self) -> &LanguageTag {
        &self.locale
    }

    pub fn source_language(&self) -> Option<&str> {
        self.source_language.as_deref()
    }

    pub fn contexts(&self) -> impl Iterator<Item = &ContextBlock> {
        self.contexts.values()
    }

    pub fn context(&self, name: &str) -> Option<&ContextBlock> {
        self.contexts.get(name)
    }

    pub fn lookup(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
    ) -> Option<&MessageEntry> {
        self.contexts.get(context)?.lookup(source, disambiguation)
    }

    pub fn message_count(&self) -> usize {
        self.contexts.values().map(ContextBlock::len).sum()
    }
}

/// Assembles a [`Catalog`].
///
/// Repeated context names merge into one block; a repeated
/// `(context, source, disambiguation)` key keeps the last entry.
#[derive(Clone, Debug)]
pub struct CatalogBuilder {
    locale: LanguageTag,
    source_language: Option<String>,
    contexts: BTreeMap<String, ContextBlock>,
}

impl CatalogBuilder {
    pub fn new(locale: LanguageTag) -> Self {
        Self {
            locale,
            source_language: None,
            contexts: BTreeMap::new(),
        }
    }

    pub fn source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = Some(language.into());
        self
    }

    pub fn set_source_language(&mut self, language: Option<String>) {
        self.source_language = language;
    }

    pub fn has_context(&self, name: &str) -> bool {
        self.contexts.contains_key(name)
    }

    /// Creates the context if it does not exist yet.
    pub fn open_context(&mut self, name: &str) {
        if !self.contexts.contains_key(name) {
            self.contexts
                .insert(name.to_string(), ContextBlock::new(name));
        }
    }

    pub fn push(&mut self, context: &str, entry: MessageEntry) -> Option<MessageEntry> {
        self.open_context(context);
        self.contexts
            .get_mut(context)
            .and_then(|block| block.insert(entry))
    }

    pub fn message(mut self, context: &str, entry: MessageEntry) -> Self {
        self.push(context, entry);
        self
    }

    pub fn build(self) -> Catalog {
        Catalog {
            locale: self.locale,
            source_language: self.source_language,
            contexts: self.contexts,
        }
    }
}
