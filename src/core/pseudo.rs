//! Pseudo-localization generators.
//!
//! A generator turns source text into a recognizably "translated" string so
//! that untranslated or hard-coded text stands out in a localized build.

use std::collections::HashMap;

use enum_dispatch::enum_dispatch;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{locale::normalize_locale, resource::ResourceValue};

const ACCENTS: &[(char, char)] = &[
    ('a', 'à'), ('b', 'ƀ'), ('c', 'ç'), ('d', 'ð'), ('e', 'ë'), ('f', 'ƒ'), ('g', 'ğ'),
    ('h', 'ĥ'), ('i', 'í'), ('j', 'ĵ'), ('k', 'ķ'), ('l', 'ľ'), ('m', 'ɱ'), ('n', 'ñ'),
    ('o', 'õ'), ('p', 'þ'), ('q', 'ʠ'), ('r', 'ŕ'), ('s', 'š'), ('t', 'ţ'), ('u', 'ü'),
    ('v', 'ṽ'), ('w', 'ŵ'), ('x', 'ҳ'), ('y', 'ÿ'), ('z', 'ž'), ('A', 'Ã'), ('B', 'ß'),
    ('C', 'Ç'), ('D', 'Ð'), ('E', 'Ë'), ('F', 'Ƒ'), ('G', 'Ĝ'), ('H', 'Ĥ'), ('I', 'Ï'),
    ('J', 'Ĵ'), ('K', 'Ķ'), ('L', 'Ŀ'), ('M', 'Ṁ'), ('N', 'Ñ'), ('O', 'Ø'), ('P', 'Þ'),
    ('Q', 'Ǫ'), ('R', 'Ŕ'), ('S', 'Š'), ('T', 'Ť'), ('U', 'Ú'), ('V', 'Ṽ'), ('W', 'Ŵ'),
    ('X', 'Ӿ'), ('Y', 'Ŷ'), ('Z', 'Ż'),
];

#[enum_dispatch]
pub trait PseudoGenerator {
    fn generate(&self, text: &str) -> String;
}

/// Accents every Latin letter, keeps `{placeholders}` intact, pads the text
/// with descending digits and wraps it in brackets.
#[derive(Debug, Clone, Default)]
pub struct AccentedPseudo;

impl PseudoGenerator for AccentedPseudo {
    fn generate(&self, text: &str) -> String {
        let mut accented = String::with_capacity(text.len() * 2);
        let mut in_placeholder = false;

        for c in text.chars() {
            match c {
                '{' => in_placeholder = true,
                '}' => in_placeholder = false,
                _ => {}
            }
            if in_placeholder {
                accented.push(c);
            } else {
                accented.push(accent(c));
            }
        }

        let len = accented.chars().count();
        let divisor = match len {
            0..=20 => 2.0,
            21..=40 => 3.0,
            _ => 5.0,
        };
        let padding = (len as f64 / divisor).round() as usize;
        for i in (0..padding).rev() {
            accented.push(char::from(b'0' + (i % 10) as u8));
        }

        format!("[{}]", accented)
    }
}

/// Wraps the text in brackets and changes nothing else.
#[derive(Debug, Clone, Default)]
pub struct BracketedPseudo;

impl PseudoGenerator for BracketedPseudo {
    fn generate(&self, text: &str) -> String {
        format!("[{}]", text)
    }
}

fn accent(c: char) -> char {
    ACCENTS
        .iter()
        .find(|(plain, _)| *plain == c)
        .map(|(_, accented)| *accented)
        .unwrap_or(c)
}

#[enum_dispatch(PseudoGenerator)]
#[derive(Debug, Clone)]
pub enum Pseudo {
    AccentedPseudo,
    BracketedPseudo,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PseudoStyle {
    #[default]
    Accented,
    Bracketed,
}

impl PseudoStyle {
    pub fn generator(self) -> Pseudo {
        match self {
            PseudoStyle::Accented => AccentedPseudo.into(),
            PseudoStyle::Bracketed => BracketedPseudo.into(),
        }
    }
}

/// One `pseudoLocales` entry of the project configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PseudoSettings {
    #[serde(default)]
    pub style: PseudoStyle,
    /// Locale whose text feeds the generator; the source locale when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis: Option<String>,
}

/// A generator registered for one target locale.
#[derive(Debug, Clone)]
pub struct PseudoEntry {
    pub basis_locale: String,
    pub generator: Pseudo,
}

impl PseudoEntry {
    pub fn generate(&self, text: &str) -> String {
        self.generator.generate(text)
    }

    /// Run the generator over every string of `value`.
    pub fn generate_value(&self, value: &ResourceValue) -> ResourceValue {
        value.map_strings(|text| self.generate(text))
    }
}

/// Source of pseudo generators, looked up per target locale.
pub trait PseudoProvider: Send + Sync {
    fn for_locale(&self, locale: &str) -> Option<&PseudoEntry>;
}

/// Pseudo generators keyed by normalized locale spec.
#[derive(Debug, Clone, Default)]
pub struct PseudoRegistry {
    entries: HashMap<String, PseudoEntry>,
}

impl PseudoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `pseudoLocales` settings. Entries without a basis use
    /// `source_locale`.
    pub fn from_settings(settings: &IndexMap<String, PseudoSettings>, source_locale: &str) -> Self {
        let mut registry = Self::new();
        for (locale, entry) in settings {
            registry.register(
                locale,
                PseudoEntry {
                    basis_locale: normalize_locale(entry.basis.as_deref().unwrap_or(source_locale)),
                    generator: entry.style.generator(),
                },
            );
        }
        registry
    }

    pub fn register(&mut self, locale: &str, entry: PseudoEntry) {
        self.entries.insert(normalize_locale(locale), entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PseudoProvider for PseudoRegistry {
    fn for_locale(&self, locale: &str) -> Option<&PseudoEntry> {
        self.entries.get(&normalize_locale(locale))
    }
}
