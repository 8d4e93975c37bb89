use alloc::format;
use alloc::string::ToString;
use alloc::vec::Vec;

use crate::template::placeholders;
use crate::{Catalog, Diagnostic, PluralRuleTable, Translation, TranslationState};

/// Checks placeholder consistency and plural form counts.
///
/// A translation placeholder the source lacks is an error: no caller
/// supplies a value for it and it renders verbatim. Retired entries are
/// skipped; empty templates count as untranslated and are not checked for
/// missing placeholders.
pub fn validate_catalog(catalog: &Catalog, rules: &PluralRuleTable) -> Vec<Diagnostic> {
    let rule = rules.rule_for_tag(catalog.locale());
    let mut diagnostics = Vec::new();
    for context in catalog.contexts() {
        for entry in context.messages() {
            if entry.state().is_retired() {
                continue;
            }
            let located = |diagnostic: Diagnostic| {
                diagnostic
                    .with_context(context.name().to_string())
                    .with_source(entry.source().to_string())
            };
            let source_tokens = entry.source_placeholders();

            for token in entry.placeholders() {
                if !source_tokens.contains(&token) {
                    diagnostics.push(located(Diagnostic::error(
                        "TS010",
                        format!("translation uses {token}, which the source does not"),
                    )));
                }
            }

            if entry.state() == TranslationState::Finished {
                for template in entry.translation().templates() {
                    if template.is_empty() {
                        continue;
                    }
                    let found = placeholders(template);
                    for token in source_tokens.iter().filter(|token| !found.contains(*token)) {
                        // A count the form spells out ("one day") is normal.
                        if entry.is_plural() && *token == crate::Placeholder::Count {
                            continue;
                        }
                        diagnostics.push(located(Diagnostic::warning(
                            "TS011",
                            format!("translation `{template}` drops {token}"),
                        )));
                    }
                }
            }

            if let Translation::Plural(forms) = entry.translation() {
                if !forms.is_empty() && forms.len() != rule.slots().len() {
                    diagnostics.push(located(Diagnostic::warning(
                        "TS020",
                        format!(
                            "{} plural forms, but {} expects {}",
                            forms.len(),
                            catalog.locale(),
                            rule.slots().len()
                        ),
                    )));
                }
            }
        }
    }
    diagnostics
}
