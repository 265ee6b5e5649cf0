//! Column type normalization for compatibility checks.
//!
//! Catalog type strings vary by engine: `varchar(255)`, `Nullable(UInt64)`,
//! `ARRAY<INT64>`, `integer[]`. Two columns are compatible when their base
//! types match after stripping size parameters and container wrappers.

const WRAPPERS: &[&str] = &["array<", "array(", "nullable(", "lowcardinality("];

/// Lowercase base type with parameters and wrappers removed.
///
/// `Nullable(LowCardinality(String))` → `string`, `varchar(255)` → `varchar`,
/// `ARRAY<STRUCT<a INT64>>` → `struct`, `integer[]` → `integer`.
pub fn base_type(data_type: &str) -> String {
    let mut t = data_type.trim().to_lowercase();

    loop {
        if let Some(stripped) = t.strip_suffix("[]") {
            t = stripped.trim_end().to_string();
            continue;
        }
        match WRAPPERS.iter().find(|w| t.starts_with(*w)) {
            Some(w) => t = t[w.len()..].to_string(),
            None => break,
        }
    }

    let end = t
        .find(|c: char| matches!(c, '(' | '<' | '[' | '>' | ')'))
        .unwrap_or(t.len());
    t[..end].trim().to_string()
}

/// Whether the catalog type is an array/repeated type.
pub fn is_array_type(data_type: &str) -> bool {
    let t = data_type.trim().to_lowercase();
    t.starts_with("array") || t.ends_with("[]")
}

/// Base types match.
pub fn types_compatible(a: &str, b: &str) -> bool {
    base_type(a) == base_type(b)
}
