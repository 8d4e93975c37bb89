use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{trace, warn};
use tscat_core::{
    Args, ChainLink, LanguageTag, LocaleFallbackChain, MessageEntry, PluralCategory,
    PluralRuleTable, Translation, TranslationState, render,
};

use crate::config::parse_locale;
use crate::error::RuntimeResult;
use crate::store::CatalogStore;

static NO_ARGS: Args = Args::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Report misses through the [`MissingMessageHook`].
    pub strict_mode: bool,
    /// Use `type="unfinished"` translations.
    pub include_unfinished: bool,
    /// Probed after the requested locale and its truncations.
    pub fallback_locales: Vec<LanguageTag>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            strict_mode: false,
            include_unfinished: true,
            fallback_locales: Vec::new(),
        }
    }
}

/// A lookup that found no translation in any probed catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMessage {
    pub context: String,
    pub source: String,
    pub requested_locale: LanguageTag,
    pub probed: Vec<LanguageTag>,
}

pub trait MissingMessageHook: Send + Sync {
    fn on_missing(&self, event: &MissingMessage);
}

/// Logs misses at `warn` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHook;

impl MissingMessageHook for TracingHook {
    fn on_missing(&self, event: &MissingMessage) {
        let probed: Vec<&str> = event.probed.iter().map(LanguageTag::normalized).collect();
        warn!(
            context = %event.context,
            source = %event.source,
            locale = %event.requested_locale,
            probed = ?probed,
            "missing translation"
        );
    }
}

/// Everything needed to resolve one message.
#[derive(Debug, Clone)]
pub struct MessageRequest<'a> {
    context: &'a str,
    source: &'a str,
    disambiguation: Option<&'a str>,
    count: Option<i64>,
    args: &'a Args,
}

impl<'a> MessageRequest<'a> {
    pub fn new(context: &'a str, source: &'a str) -> Self {
        Self {
            context,
            source,
            disambiguation: None,
            count: None,
            args: &NO_ARGS,
        }
    }

    pub fn disambiguation(mut self, disambiguation: &'a str) -> Self {
        self.disambiguation = Some(disambiguation);
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn args(mut self, args: &'a Args) -> Self {
        self.args = args;
        self
    }
}

/// Resolves `(context, source)` against the active locale's fallback chain
/// and renders the result. Resolution never fails: when nothing matches,
/// the source text itself is rendered.
pub struct MessageResolver {
    store: Arc<CatalogStore>,
    plural_rules: PluralRuleTable,
    chain: LocaleFallbackChain,
    options: ResolverOptions,
    hook: Arc<dyn MissingMessageHook>,
}

impl MessageResolver {
    pub fn new(store: Arc<CatalogStore>, options: ResolverOptions) -> Self {
        Self {
            store,
            plural_rules: PluralRuleTable::builtin(),
            chain: LocaleFallbackChain::with_fallbacks(options.fallback_locales.clone()),
            options,
            hook: Arc::new(TracingHook),
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn MissingMessageHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn with_plural_rules(mut self, plural_rules: PluralRuleTable) -> Self {
        self.plural_rules = plural_rules;
        self
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn resolve(&self, context: &str, source: &str, count: Option<i64>, args: &Args) -> String {
        let mut request = MessageRequest::new(context, source).args(args);
        request.count = count;
        self.resolve_request(&request)
    }

    pub fn translate(&self, context: &str, source: &str) -> String {
        self.resolve_request(&MessageRequest::new(context, source))
    }

    pub fn resolve_plural(&self, context: &str, source: &str, count: i64, args: &Args) -> String {
        self.resolve(context, source, Some(count), args)
    }

    pub fn resolve_request(&self, request: &MessageRequest<'_>) -> String {
        let snapshot = self.store.snapshot();
        let requested = snapshot.active_locale();
        let mut probed = Vec::new();
        for link in self.chain.chain_for(requested) {
            let ChainLink::Locale(locale) = link else {
                break;
            };
            let template = snapshot
                .catalog(&locale)
                .and_then(|catalog| {
                    catalog.lookup(request.context, request.source, request.disambiguation)
                })
                .and_then(|entry| self.template_for(entry, &locale, request.count));
            if let Some(template) = template {
                return render(template, request.count, request.args);
            }
            probed.push(locale);
        }

        self.report_missing(request, requested, probed);
        render(request.source, request.count, request.args)
    }

    pub fn active_locale(&self) -> LanguageTag {
        self.store.active_locale()
    }

    pub fn set_active_locale(&self, locale: &str) -> RuntimeResult<()> {
        self.store.set_active_locale(parse_locale(locale)?);
        Ok(())
    }

    pub fn available_locales(&self) -> BTreeSet<String> {
        self.store.available_locales()
    }

    fn template_for<'e>(
        &self,
        entry: &'e MessageEntry,
        locale: &LanguageTag,
        count: Option<i64>,
    ) -> Option<&'e str> {
        let state = entry.state();
        if state.is_retired()
            || (state == TranslationState::Unfinished && !self.options.include_unfinished)
        {
            return None;
        }
        let template = match entry.translation() {
            Translation::Single(template) => template.as_str(),
            Translation::Plural(forms) if forms.is_empty() => return None,
            Translation::Plural(_) => {
                let rule = self.plural_rules.rule_for_tag(locale);
                let category = rule.category(count.unwrap_or(0));
                entry
                    .plural_template(&rule, category)
                    .or_else(|| entry.plural_template(&rule, PluralCategory::Other))
                    .unwrap_or(entry.source())
            }
        };
        (!template.is_empty()).then_some(template)
    }

    fn report_missing(
        &self,
        request: &MessageRequest<'_>,
        requested: &LanguageTag,
        probed: Vec<LanguageTag>,
    ) {
        if !self.options.strict_mode {
            trace!(
                context = request.context,
                source = request.source,
                locale = %requested,
                "no translation; using source text"
            );
            return;
        }
        self.hook.on_missing(&MissingMessage {
            context: request.context.to_string(),
            source: request.source.to_string(),
            requested_locale: requested.clone(),
            probed,
        });
    }
}
