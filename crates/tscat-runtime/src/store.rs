use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use arc_swap::ArcSwap;
use tracing::debug;
use tscat_core::{Catalog, LanguageTag};

/// An immutable view of the store: the active locale and every loaded
/// catalog, always observed together.
#[derive(Debug, Clone)]
pub struct Snapshot {
    active: LanguageTag,
    catalogs: BTreeMap<String, Arc<Catalog>>,
}

impl Snapshot {
    pub fn active_locale(&self) -> &LanguageTag {
        &self.active
    }

    pub fn catalog(&self, locale: &LanguageTag) -> Option<&Arc<Catalog>> {
        self.catalogs.get(locale.normalized())
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }
}

/// Loaded catalogs keyed by normalized locale, plus the active locale.
///
/// Reads are a single atomic load. Writers take an internal lock, build a
/// new [`Snapshot`] and publish it with one store, so a reader never sees a
/// half-applied change.
pub struct CatalogStore {
    current: ArcSwap<Snapshot>,
    writer: Mutex<()>,
}

static GLOBAL: LazyLock<Arc<CatalogStore>> = LazyLock::new(|| Arc::new(CatalogStore::default()));

impl CatalogStore {
    pub fn new(active: LanguageTag) -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot {
                active,
                catalogs: BTreeMap::new(),
            }),
            writer: Mutex::new(()),
        }
    }

    /// The process-wide store, created on first use. `bootstrap_global`
    /// loads the configured catalogs into it; `clear` empties it again.
    pub fn global() -> Arc<CatalogStore> {
        Arc::clone(&GLOBAL)
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Installs `catalog` under its own locale and returns the catalog it
    /// replaced. Readers holding the old one keep it until they finish.
    pub fn load(&self, catalog: Catalog) -> Option<Arc<Catalog>> {
        let locale = catalog.locale().normalized().to_string();
        let messages = catalog.message_count();
        let replaced = self.update(|snapshot| {
            snapshot.catalogs.insert(locale.clone(), Arc::new(catalog))
        });
        debug!(
            locale = %locale,
            messages,
            replaced = replaced.is_some(),
            "catalog installed"
        );
        replaced
    }

    pub fn get(&self, locale: &LanguageTag) -> Option<Arc<Catalog>> {
        self.current.load().catalog(locale).cloned()
    }

    pub fn unload(&self, locale: &LanguageTag) -> Option<Arc<Catalog>> {
        let removed = self.update(|snapshot| snapshot.catalogs.remove(locale.normalized()));
        if removed.is_some() {
            debug!(locale = %locale, "catalog unloaded");
        }
        removed
    }

    pub fn active_locale(&self) -> LanguageTag {
        self.current.load().active.clone()
    }

    pub fn set_active_locale(&self, locale: LanguageTag) {
        debug!(locale = %locale, "active locale switched");
        self.update(|snapshot| snapshot.active = locale);
    }

    pub fn available_locales(&self) -> BTreeSet<String> {
        self.current.load().catalogs.keys().cloned().collect()
    }

    /// Drops every catalog; the active locale is kept.
    pub fn clear(&self) {
        self.update(|snapshot| snapshot.catalogs.clear());
        debug!("catalog store cleared");
    }

    fn update<R>(&self, change: impl FnOnce(&mut Snapshot) -> R) -> R {
        let _guard = self.lock_writer();
        let mut next = Snapshot::clone(&self.current.load());
        let result = change(&mut next);
        self.current.store(Arc::new(next));
        result
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(LanguageTag::default())
    }
}
