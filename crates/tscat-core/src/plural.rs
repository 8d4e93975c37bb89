//! Cardinal plural rules.
//!
//! Every rule is a pure function from a count to a [`PluralCategory`] plus
//! the ordered list of slots a catalog provides templates for. A plural
//! message stores its templates in that slot order, so the slot list is what
//! ties a category back to a template.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::fmt;

use crate::{CoreResult, LanguageTag};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "zero" => Some(PluralCategory::Zero),
            "one" => Some(PluralCategory::One),
            "two" => Some(PluralCategory::Two),
            "few" => Some(PluralCategory::Few),
            "many" => Some(PluralCategory::Many),
            "other" => Some(PluralCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PluralRule {
    name: &'static str,
    slots: &'static [PluralCategory],
    select: fn(u64) -> PluralCategory,
}

impl PluralRule {
    pub const fn new(
        name: &'static str,
        slots: &'static [PluralCategory],
        select: fn(u64) -> PluralCategory,
    ) -> Self {
        Self {
            name,
            slots,
            select,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Slots in the order catalog templates are stored.
    pub fn slots(&self) -> &'static [PluralCategory] {
        self.slots
    }

    /// Negative counts are categorized by their magnitude.
    pub fn category(&self, count: i64) -> PluralCategory {
        (self.select)(count.unsigned_abs())
    }

    pub fn slot_index(&self, category: PluralCategory) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == category)
    }
}

use self::PluralCategory::{Few, Many, One, Other, Two, Zero};

/// No grammatical number: every count is `other`.
pub const OTHER_ONLY: PluralRule = PluralRule::new("other-only", &[Other], |_| Other);

pub const ONE_OTHER: PluralRule = PluralRule::new("one-other", &[One, Other], |n| {
    if n == 1 { One } else { Other }
});

/// `one` covers both 0 and 1.
pub const ZERO_ONE_OTHER: PluralRule = PluralRule::new("zero-one-other", &[One, Other], |n| {
    if n <= 1 { One } else { Other }
});

pub const EAST_SLAVIC: PluralRule = PluralRule::new("east-slavic", &[One, Few, Many], |n| {
    let mod10 = n % 10;
    let mod100 = n % 100;
    if mod10 == 1 && mod100 != 11 {
        One
    } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
        Few
    } else {
        Many
    }
});

pub const POLISH: PluralRule = PluralRule::new("polish", &[One, Few, Many], |n| {
    let mod10 = n % 10;
    let mod100 = n % 100;
    if n == 1 {
        One
    } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
        Few
    } else {
        Many
    }
});

pub const CZECH: PluralRule = PluralRule::new("czech", &[One, Few, Other], |n| match n {
    1 => One,
    2..=4 => Few,
    _ => Other,
});

pub const ROMANIAN: PluralRule = PluralRule::new("romanian", &[One, Few, Other], |n| {
    let mod100 = n % 100;
    if n == 1 {
        One
    } else if n == 0 || (2..=19).contains(&mod100) {
        Few
    } else {
        Other
    }
});

pub const LITHUANIAN: PluralRule = PluralRule::new("lithuanian", &[One, Few, Other], |n| {
    let mod10 = n % 10;
    let mod100 = n % 100;
    if (11..=19).contains(&mod100) {
        Other
    } else if mod10 == 1 {
        One
    } else if mod10 >= 2 {
        Few
    } else {
        Other
    }
});

pub const SLOVENIAN: PluralRule = PluralRule::new("slovenian", &[One, Two, Few, Other], |n| {
    match n % 100 {
        1 => One,
        2 => Two,
        3 | 4 => Few,
        _ => Other,
    }
});

pub const ARABIC: PluralRule = PluralRule::new(
    "arabic",
    &[Zero, One, Two, Few, Many, Other],
    |n| {
        let mod100 = n % 100;
        match n {
            0 => Zero,
            1 => One,
            2 => Two,
            _ if (3..=10).contains(&mod100) => Few,
            _ if (11..=99).contains(&mod100) => Many,
            _ => Other,
        }
    },
);

const BUILTIN: &[(&str, PluralRule)] = &[
    ("ja", OTHER_ONLY),
    ("ko", OTHER_ONLY),
    ("zh", OTHER_ONLY),
    ("vi", OTHER_ONLY),
    ("th", OTHER_ONLY),
    ("id", OTHER_ONLY),
    ("ms", OTHER_ONLY),
    ("lo", OTHER_ONLY),
    ("my", OTHER_ONLY),
    ("en", ONE_OTHER),
    ("de", ONE_OTHER),
    ("nl", ONE_OTHER),
    ("es", ONE_OTHER),
    ("it", ONE_OTHER),
    ("pt", ONE_OTHER),
    ("sv", ONE_OTHER),
    ("da", ONE_OTHER),
    ("nb", ONE_OTHER),
    ("nn", ONE_OTHER),
    ("no", ONE_OTHER),
    ("fi", ONE_OTHER),
    ("et", ONE_OTHER),
    ("el", ONE_OTHER),
    ("hu", ONE_OTHER),
    ("bg", ONE_OTHER),
    ("ca", ONE_OTHER),
    ("eo", ONE_OTHER),
    ("tr", ONE_OTHER),
    ("he", ONE_OTHER),
    ("fr", ZERO_ONE_OTHER),
    ("pt_BR", ZERO_ONE_OTHER),
    ("hy", ZERO_ONE_OTHER),
    ("ff", ZERO_ONE_OTHER),
    ("kab", ZERO_ONE_OTHER),
    ("ru", EAST_SLAVIC),
    ("uk", EAST_SLAVIC),
    ("be", EAST_SLAVIC),
    ("hr", EAST_SLAVIC),
    ("sr", EAST_SLAVIC),
    ("bs", EAST_SLAVIC),
    ("pl", POLISH),
    ("cs", CZECH),
    ("sk", CZECH),
    ("ro", ROMANIAN),
    ("lt", LITHUANIAN),
    ("sl", SLOVENIAN),
    ("ar", ARABIC),
];

/// Locale → rule table. Lookups try the full tag, then each shorter
/// truncation; anything unknown gets [`OTHER_ONLY`].
#[derive(Clone, Debug)]
pub struct PluralRuleTable {
    rules: BTreeMap<String, PluralRule>,
}

impl PluralRuleTable {
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut rules = BTreeMap::new();
        for (locale, rule) in BUILTIN {
            rules.insert(locale.to_string(), *rule);
        }
        Self { rules }
    }

    pub fn register(&mut self, locale: &str, rule: PluralRule) -> CoreResult<Option<PluralRule>> {
        let tag = LanguageTag::parse(locale)?;
        Ok(self.rules.insert(tag.normalized().to_string(), rule))
    }

    pub fn rule_for_tag(&self, tag: &LanguageTag) -> PluralRule {
        let mut len = tag.match_subtags().len();
        if let Some(rule) = self.rules.get(tag.normalized()) {
            return *rule;
        }
        while len > 0 {
            if let Some(rule) = self.rules.get(tag.truncate(len).normalized()) {
                return *rule;
            }
            len -= 1;
        }
        OTHER_ONLY
    }

    pub fn rule_for(&self, locale: &str) -> PluralRule {
        match LanguageTag::parse(locale) {
            Ok(tag) => self.rule_for_tag(&tag),
            Err(_) => OTHER_ONLY,
        }
    }

    pub fn form_for(&self, locale: &str, count: i64) -> PluralCategory {
        self.rule_for(locale).category(count)
    }
}

impl Default for PluralRuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}
