//! Tag normalisation.
//!
//! Product tags arrive either as an array or as a comma-separated string typed
//! into an admin form. Festival tags (`#halloween`) connect products to the
//! special-dates calendar and drive the `holiday` catalog filter.

use serde_json::Value;

/// Normalise a stored `tags` value into a list of tag strings.
///
/// Arrays keep their items (trimmed). A string such as `"Amor, dia madre"` is
/// split on commas and each piece becomes a hashtag: `#amor`, `#dia-madre`.
/// Pieces that already start with `#` are kept verbatim.
pub fn normalize_tags(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(true) => Some("true".to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.starts_with('#') {
                    s.to_string()
                } else {
                    format!("#{}", hyphenate(s).to_lowercase())
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Normalise a tag picked or typed in the admin festival selector.
pub fn normalize_festival_tag(raw: &str) -> String {
    let tag = hyphenate(&raw.trim().to_lowercase());
    if tag.is_empty() || tag.starts_with('#') {
        tag
    } else {
        format!("#{}", tag)
    }
}

/// Tags as written by the admin console: either shape accepted by
/// [`normalize_tags`], each run through [`normalize_festival_tag`].
pub fn festival_tags(raw: &Value) -> Vec<String> {
    normalize_tags(Some(raw))
        .iter()
        .map(|tag| normalize_festival_tag(tag))
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Normalise the `holiday` catalog parameter: `Halloween` and `#halloween`
/// both become `#halloween`.
pub fn normalize_holiday_param(raw: Option<&str>) -> Option<String> {
    let tag = raw?.trim().to_lowercase();
    if tag.is_empty() {
        None
    } else if tag.starts_with('#') {
        Some(tag)
    } else {
        Some(format!("#{}", tag))
    }
}

/// Replace whitespace runs with a single `-`.
fn hyphenate(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_tags_are_trimmed_not_rewritten() {
        let raw = json!([" Camiseta ", "", "#navidad", null]);
        assert_eq!(normalize_tags(Some(&raw)), vec!["Camiseta", "#navidad"]);
    }

    #[test]
    fn test_string_tags_become_hashtags() {
        let raw = json!("Amor, dia  de la madre ,#Navidad,, ");
        assert_eq!(
            normalize_tags(Some(&raw)),
            vec!["#amor", "#dia-de-la-madre", "#Navidad"]
        );
    }

    #[test]
    fn test_other_tag_shapes_are_empty() {
        assert!(normalize_tags(None).is_empty());
        assert!(normalize_tags(Some(&json!(42))).is_empty());
        assert!(normalize_tags(Some(&json!({ "a": "b" }))).is_empty());
    }

    #[test]
    fn test_festival_tag() {
        assert_eq!(normalize_festival_tag("  Dia Madre "), "#dia-madre");
        assert_eq!(normalize_festival_tag("#halloween"), "#halloween");
        assert_eq!(normalize_festival_tag("   "), "");
    }

    #[test]
    fn test_festival_tags_from_either_shape() {
        assert_eq!(
            festival_tags(&json!(["Navidad", "#Halloween", " dia madre "])),
            vec!["#navidad", "#halloween", "#dia-madre"]
        );
        assert_eq!(festival_tags(&json!("amor, Fin de año")), vec!["#amor", "#fin-de-año"]);
        assert!(festival_tags(&json!(null)).is_empty());
    }

    #[test]
    fn test_holiday_param() {
        assert_eq!(
            normalize_holiday_param(Some("Halloween")).as_deref(),
            Some("#halloween")
        );
        assert_eq!(
            normalize_holiday_param(Some(" #NAVIDAD ")).as_deref(),
            Some("#navidad")
        );
        assert_eq!(normalize_holiday_param(Some("  ")), None);
        assert_eq!(normalize_holiday_param(None), None);
    }
}
