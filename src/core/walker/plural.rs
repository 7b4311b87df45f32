//! Plural output built from a schema's plural template.
//!
//! A template is an ordinary JSON value whose strings may name fields of
//! the resource (`[_category]`, `[_source]`, `[_key]`, ...). A member named
//! `[_forEachCategory]` is repeated once per plural category of the
//! translation, which is how a target locale gets more or fewer forms than
//! the source document has.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::core::resource::DEFAULT_CATEGORY;

const FOR_EACH_CATEGORY: &str = "[_forEachCategory]";

/// Values a plural template may refer to.
pub struct PluralFields<'a> {
    /// Translated forms by category, in output order.
    pub forms: &'a IndexMap<String, String>,
    pub key: &'a str,
    pub comment: Option<&'a str>,
    pub locale: &'a str,
}

impl PluralFields<'_> {
    pub fn expand(&self, template: &Value) -> Value {
        self.expand_in(template, None)
    }

    fn expand_in(&self, template: &Value, category: Option<&str>) -> Value {
        match template {
            Value::Object(members) => {
                let mut out = Map::new();
                for (prop, value) in members {
                    if prop != FOR_EACH_CATEGORY {
                        out.insert(self.text(prop, category), self.expand_in(value, category));
                        continue;
                    }
                    for category in self.forms.keys() {
                        if let Value::Object(item) = self.expand_in(value, Some(category)) {
                            for (name, value) in item {
                                merge(&mut out, name, value);
                            }
                        }
                    }
                }
                Value::Object(out)
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.expand_in(item, category))
                .collect(),
            Value::String(text) => Value::String(self.text(text, category)),
            other => other.clone(),
        }
    }

    fn text(&self, text: &str, category: Option<&str>) -> String {
        let category = category.unwrap_or(DEFAULT_CATEGORY);
        match text {
            "[_category]" => category.to_string(),
            "[_source]" | "[_target]" => self.forms.get(category).cloned().unwrap_or_default(),
            "[_key]" => self.key.to_string(),
            "[_comment]" => self.comment.unwrap_or_default().to_string(),
            "[_locale]" => self.locale.to_string(),
            _ => text.to_string(),
        }
    }
}

/// Members produced for several categories collect into an array.
fn merge(out: &mut Map<String, Value>, name: String, value: Value) {
    match out.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            out.insert(name, value);
        }
    }
}
