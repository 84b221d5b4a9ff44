use std::collections::BTreeMap;

/// Analyzer id used when a language has no dedicated default.
pub const GENERIC_STANDARD: &str = "generic";

/// Default analyzer id per language.
fn default_standard(language: &str) -> Option<&'static str> {
    match language {
        "python" => Some("pylint"),
        "javascript" => Some("eslint"),
        "typescript" => Some("typescript-eslint"),
        "java" => Some("checkstyle"),
        "cpp" => Some("cppcheck"),
        "csharp" => Some("roslyn-analyzers"),
        "go" => Some("golangci-lint"),
        _ => None,
    }
}

/// Resolve the analyzer id to use for each language.
///
/// Overrides win over the default table; anything else falls through to
/// `"generic"`. Unknown languages never fail here, so downstream stages can
/// assume every detected language has a mapping.
pub fn resolve<S: AsRef<str>>(
    languages: impl IntoIterator<Item = S>,
    overrides: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut standards = BTreeMap::new();
    for language in languages {
        let language = language.as_ref();
        let standard = overrides
            .get(language)
            .map(String::as_str)
            .or_else(|| default_standard(language))
            .unwrap_or(GENERIC_STANDARD);
        standards.insert(language.to_string(), standard.to_string());
    }
    standards
}
