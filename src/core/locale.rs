use std::fmt;

/// A BCP-47-style locale reduced to the parts the path templates care about.
///
/// Parsing accepts `-` or `_` as separators and normalizes case:
/// language is lower-case, script is title-case, region is upper-case.
/// Anything that does not fit one of those slots is kept as the variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Locale {
    pub language: Option<String>,
    pub script: Option<String>,
    pub region: Option<String>,
    pub variant: Option<String>,
}

impl Locale {
    pub fn new(
        language: Option<&str>,
        script: Option<&str>,
        region: Option<&str>,
    ) -> Self {
        Self {
            language: language.filter(|s| !s.is_empty()).map(str::to_lowercase),
            script: script.filter(|s| !s.is_empty()).map(title_case),
            region: region.filter(|s| !s.is_empty()).map(str::to_uppercase),
            variant: None,
        }
    }

    pub fn parse(spec: &str) -> Self {
        let mut locale = Locale::default();
        let mut variants = Vec::new();

        for (i, part) in spec
            .split(['-', '_'])
            .filter(|part| !part.is_empty())
            .enumerate()
        {
            if i == 0 && is_language(part) {
                locale.language = Some(part.to_lowercase());
            } else if locale.script.is_none() && locale.region.is_none() && is_script(part) {
                locale.script = Some(title_case(part));
            } else if locale.region.is_none() && is_region(part) {
                locale.region = Some(part.to_uppercase());
            } else {
                variants.push(part.to_string());
            }
        }

        if !variants.is_empty() {
            locale.variant = Some(variants.join("-"));
        }
        locale
    }

    pub fn is_empty(&self) -> bool {
        self.language.is_none()
            && self.script.is_none()
            && self.region.is_none()
            && self.variant.is_none()
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or("")
    }

    pub fn script(&self) -> &str {
        self.script.as_deref().unwrap_or("")
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or("")
    }

    pub fn has_variant(&self) -> bool {
        self.variant.is_some()
    }

    /// Canonical dash-joined form, e.g. `zh-Hans-CN`.
    pub fn spec(&self) -> String {
        self.join("-")
    }

    /// Directory form, e.g. `zh/Hans/CN`.
    pub fn dir(&self) -> String {
        self.join("/")
    }

    /// Underscore form, e.g. `zh_Hans_CN`.
    pub fn under(&self) -> String {
        self.join("_")
    }

    fn join(&self, sep: &str) -> String {
        [&self.language, &self.script, &self.region, &self.variant]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec())
    }
}

/// Normalize a locale spec string to its canonical form.
pub fn normalize_locale(spec: &str) -> String {
    Locale::parse(spec).spec()
}

fn is_language(part: &str) -> bool {
    (2..=3).contains(&part.len()) && part.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_script(part: &str) -> bool {
    part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_region(part: &str) -> bool {
    (part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
        || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()))
}

fn title_case(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
