//! Choosing the text written for one resource in one target locale.
//!
//! The steps are tried in a fixed order:
//!
//! 1. the pseudo-testing locale with pseudo generation disabled keeps the
//!    source text, whatever translations exist;
//! 2. with no translation, a pseudo generator registered for the locale
//!    produces the text from its basis;
//! 3. an exact translation is used as is;
//! 4. otherwise the resource is new: the missing-translation pseudo applies
//!    when one is configured, else the source text is kept.

use crate::core::{
    pseudo::PseudoProvider,
    resource::{ResourceSet, ResourceValue, hash_key},
};

use super::ProjectSettings;

/// The value chosen for a resource, and whether it differs from a plain
/// copy of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub value: ResourceValue,
    pub localized: bool,
}

impl Resolution {
    fn source(source: &ResourceValue) -> Self {
        Self {
            value: source.clone(),
            localized: false,
        }
    }

    fn localized(value: ResourceValue) -> Self {
        Self {
            value,
            localized: true,
        }
    }
}

/// Outcome of [`Fallback::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub resolution: Resolution,
    /// No translation and no generator: the caller registers a new resource.
    pub is_new: bool,
}

pub struct Fallback<'a> {
    pub settings: &'a ProjectSettings,
    /// Normalized target locale.
    pub locale: &'a str,
    pub translations: &'a ResourceSet,
    pub pseudos: &'a dyn PseudoProvider,
}

impl Fallback<'_> {
    /// Translation of `key` into `locale`. A translation of another kind
    /// than the source counts as missing.
    fn translation(&self, locale: &str, key: &str, source: &ResourceValue) -> Option<&ResourceValue> {
        let hash = hash_key(&self.settings.project_id, locale, key, &self.settings.datatype);
        self.translations
            .get(&hash)
            .and_then(|resource| resource.target.as_ref())
            .filter(|target| target.kind() == source.kind())
    }

    /// Resolution of a resource whose source is empty. Only an exact
    /// translation applies; such a resource is never new.
    pub fn resolve_empty(&self, key: &str, source: &ResourceValue) -> Option<Resolution> {
        if self.locale == self.settings.pseudo_locale && self.settings.nopseudo {
            return None;
        }
        self.translation(self.locale, key, source)
            .map(|target| Resolution::localized(target.clone()))
    }

    pub fn resolve(&self, key: &str, source: &ResourceValue) -> Resolved {
        let settings = self.settings;

        if self.locale == settings.pseudo_locale && settings.nopseudo {
            tracing::trace!(key, "pseudo locale with pseudo disabled, keeping source");
            return Resolved {
                resolution: Resolution::source(source),
                is_new: false,
            };
        }

        let translation = self.translation(self.locale, key, source);

        if translation.is_none()
            && let Some(pseudo) = self.pseudos.for_locale(self.locale)
        {
            let basis = if pseudo.basis_locale != settings.source_locale {
                self.translation(&pseudo.basis_locale, key, source)
                    .unwrap_or(source)
            } else {
                source
            };
            tracing::trace!(key, basis = %pseudo.basis_locale, "pseudo-localizing");
            return Resolved {
                resolution: Resolution::localized(pseudo.generate_value(basis)),
                is_new: false,
            };
        }

        if let Some(target) = translation {
            tracing::trace!(key, locale = self.locale, "translated");
            return Resolved {
                resolution: Resolution::localized(target.clone()),
                is_new: false,
            };
        }

        tracing::trace!(key, locale = self.locale, "new resource");
        let missing = (!settings.nopseudo)
            .then(|| self.pseudos.for_locale(&settings.pseudo_locale))
            .flatten();
        let resolution = match missing {
            Some(pseudo) => Resolution::localized(pseudo.generate_value(source)),
            None => Resolution::source(source),
        };
        Resolved {
            resolution,
            is_new: true,
        }
    }
}
