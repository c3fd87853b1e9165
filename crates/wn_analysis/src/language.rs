use crate::taxonomy::LANGUAGE_LOOKUP;

/// Maps a raw language code or name to a display name.
///
/// Known codes resolve through the language table; anything else passes
/// through in title case. Blank input yields `None`.
pub fn normalize_language(value: Option<&str>) -> Option<String> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    match LANGUAGE_LOOKUP.get(raw.to_lowercase().as_str()) {
        Some(name) => Some((*name).to_string()),
        None => Some(title_case(raw)),
    }
}

/// Uppercases the first letter of every alphabetic run and lowercases the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_language_basic() {
        assert_eq!(normalize_language(Some("eng")).as_deref(), Some("English"));
        assert_eq!(normalize_language(Some("Swedish")).as_deref(), Some("Swedish"));
        assert_eq!(normalize_language(Some("")), None);
        assert_eq!(normalize_language(None), None);
    }

    #[test]
    fn test_codes_are_case_and_whitespace_insensitive() {
        assert_eq!(normalize_language(Some("  DE ")).as_deref(), Some("German"));
        assert_eq!(normalize_language(Some("pt-BR")).as_deref(), Some("Portuguese (Brazil)"));
        assert_eq!(normalize_language(Some("   ")), None);
    }

    #[test]
    fn test_unknown_values_are_title_cased() {
        assert_eq!(normalize_language(Some("swahili")).as_deref(), Some("Swahili"));
        assert_eq!(normalize_language(Some("OLD NORSE")).as_deref(), Some("Old Norse"));
        assert_eq!(normalize_language(Some("es-419")).as_deref(), Some("Es-419"));
    }
}
