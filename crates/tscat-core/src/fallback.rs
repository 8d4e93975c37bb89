use alloc::vec::Vec;

use crate::LanguageTag;

/// One step of a fallback walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainLink {
    Locale(LanguageTag),
    /// The source language: the "translation" is the source text itself.
    Source,
}

/// Produces the ordered list of locales probed for a requested locale.
///
/// The requested tag is truncated one subtag at a time down to its base
/// language, then any configured fallback locales are appended (each with its
/// own truncations), and the walk always ends in [`ChainLink::Source`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocaleFallbackChain {
    fallbacks: Vec<LanguageTag>,
}

impl LocaleFallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallbacks(fallbacks: Vec<LanguageTag>) -> Self {
        Self { fallbacks }
    }

    pub fn fallbacks(&self) -> &[LanguageTag] {
        &self.fallbacks
    }

    pub fn chain_for(&self, requested: &LanguageTag) -> Vec<ChainLink> {
        let mut links = Vec::new();
        push_truncations(&mut links, requested);
        for fallback in &self.fallbacks {
            push_truncations(&mut links, fallback);
        }
        links.push(ChainLink::Source);
        links
    }
}

pub fn chain_for(requested: &LanguageTag) -> Vec<ChainLink> {
    LocaleFallbackChain::new().chain_for(requested)
}

fn push_truncations(links: &mut Vec<ChainLink>, tag: &LanguageTag) {
    push_unique(links, tag.clone());
    let mut len = tag.match_subtags().len();
    let full = tag.truncate(len);
    if full.normalized() != tag.normalized() {
        push_unique(links, full);
    }
    while len > 1 {
        len -= 1;
        push_unique(links, tag.truncate(len));
    }
}

fn push_unique(links: &mut Vec<ChainLink>, tag: LanguageTag) {
    let seen = links.iter().any(|link| match link {
        ChainLink::Locale(existing) => existing.normalized() == tag.normalized(),
        ChainLink::Source => false,
    });
    if !seen {
        links.push(ChainLink::Locale(tag));
    }
}
