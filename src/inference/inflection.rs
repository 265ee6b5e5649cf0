//! Singular/plural forms for matching column stems against table names.
//!
//! `inflector` handles regular English; the table below covers irregular
//! nouns that show up as table names.

use inflector::Inflector;

static IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("wife", "wives"),
    ("half", "halves"),
    ("shelf", "shelves"),
    ("hero", "heroes"),
    ("potato", "potatoes"),
    ("analysis", "analyses"),
    ("crisis", "crises"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("status", "statuses"),
];

/// Plural form, lowercase.
pub fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.is_empty() {
        return lower;
    }
    match IRREGULAR
        .iter()
        .find(|(s, p)| lower == *s || lower == *p)
    {
        Some((_, plural)) => plural.to_string(),
        None => lower.to_plural(),
    }
}

/// Singular form, lowercase.
pub fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.is_empty() {
        return lower;
    }
    match IRREGULAR
        .iter()
        .find(|(s, p)| lower == *s || lower == *p)
    {
        Some((singular, _)) => singular.to_string(),
        None => lower.to_singular(),
    }
}

/// The word itself plus its singular and plural, lowercase and deduplicated.
pub fn name_variants(word: &str) -> Vec<String> {
    let lower = word.to_lowercase();
    let mut variants = vec![lower.clone()];
    for form in [singularize(&lower), pluralize(&lower)] {
        if !form.is_empty() && !variants.contains(&form) {
            variants.push(form);
        }
    }
    variants
}
