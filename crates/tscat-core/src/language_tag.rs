use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::{CoreError, CoreResult};

/// A locale identifier such as `ko_KR`, `zh_Hant_TW` or `sr_Latn_RS`.
///
/// Both `-` and `_` are accepted as separators; the normalized form always
/// uses `_`, which is how catalog documents name their locales. Equality
/// and hashing look at the normalized form only.
#[derive(Clone, Debug)]
pub struct LanguageTag {
    original: String,
    normalized: String,
    match_subtags: Vec<String>,
}

impl LanguageTag {
    pub fn parse(input: &str) -> CoreResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput("language tag is empty"));
        }

        let subtags: Vec<&str> = trimmed.split(['-', '_']).collect();
        if subtags.iter().any(|part| part.is_empty()) {
            return Err(CoreError::InvalidInput("language tag has empty subtag"));
        }

        let mut normalized_parts = Vec::with_capacity(subtags.len());
        let mut match_parts = Vec::with_capacity(subtags.len());
        let mut script_seen = false;
        let mut region_seen = false;
        let mut stop_for_match = false;

        for (idx, part) in subtags.iter().enumerate() {
            if idx == 0 {
                if !is_alpha(part) || !(2..=8).contains(&part.len()) {
                    return Err(CoreError::InvalidInput("invalid language subtag"));
                }
                let lower = part.to_ascii_lowercase();
                normalized_parts.push(lower.clone());
                match_parts.push(lower);
                continue;
            }

            if !part.chars().all(|ch| ch.is_ascii_alphanumeric()) {
                return Err(CoreError::InvalidInput("language tag has invalid subtag"));
            }

            if part.len() == 1 {
                stop_for_match = true;
                normalized_parts.push(part.to_ascii_lowercase());
                continue;
            }

            let normalized = if stop_for_match {
                part.to_ascii_lowercase()
            } else if !script_seen && !region_seen && part.len() == 4 && is_alpha(part) {
                script_seen = true;
                titlecase(part)
            } else if !region_seen && is_region(part) {
                region_seen = true;
                part.to_ascii_uppercase()
            } else {
                part.to_ascii_lowercase()
            };

            normalized_parts.push(normalized.clone());
            if !stop_for_match {
                match_parts.push(normalized);
            }
        }

        Ok(Self {
            original: trimmed.to_string(),
            normalized: normalized_parts.join("_"),
            match_subtags: match_parts,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn language(&self) -> &str {
        &self.match_subtags[0]
    }

    /// Subtags that take part in fallback matching; extensions and
    /// private-use sequences are excluded.
    pub fn match_subtags(&self) -> &[String] {
        &self.match_subtags
    }

    /// The tag made of the first `len` matching subtags (at least the language).
    pub fn truncate(&self, len: usize) -> LanguageTag {
        let len = len.clamp(1, self.match_subtags.len());
        let parts = self.match_subtags[..len].to_vec();
        let normalized = parts.join("_");
        LanguageTag {
            original: normalized.clone(),
            normalized,
            match_subtags: parts,
        }
    }
}

/// `en`.
impl Default for LanguageTag {
    fn default() -> Self {
        Self {
            original: String::from("en"),
            normalized: String::from("en"),
            match_subtags: alloc::vec![String::from("en")],
        }
    }
}

impl PartialEq for LanguageTag {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for LanguageTag {}

impl Hash for LanguageTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

fn is_alpha(value: &str) -> bool {
    value.chars().all(|ch| ch.is_ascii_alphabetic())
}

fn is_region(value: &str) -> bool {
    (value.len() == 2 && is_alpha(value))
        || (value.len() == 3 && value.chars().all(|ch| ch.is_ascii_digit()))
}

fn titlecase(value: &str) -> String {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut output = String::with_capacity(value.len());
    output.push(first.to_ascii_uppercase());
    for ch in chars {
        output.push(ch.to_ascii_lowercase());
    }
    output
}
