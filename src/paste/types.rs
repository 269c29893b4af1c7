use serde::Serialize;

pub const DEFAULT_LANGUAGE: &str = "plaintext";

/// A highlight language offered by the creation form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn lang(value: &'static str, label: &'static str) -> LanguageOption {
    LanguageOption { value, label }
}

pub const LANGUAGES: &[LanguageOption] = &[
    lang("plaintext", "Plain Text"),
    lang("javascript", "JavaScript"),
    lang("typescript", "TypeScript"),
    lang("python", "Python"),
    lang("java", "Java"),
    lang("csharp", "C#"),
    lang("cpp", "C++"),
    lang("php", "PHP"),
    lang("ruby", "Ruby"),
    lang("go", "Go"),
    lang("rust", "Rust"),
    lang("swift", "Swift"),
    lang("kotlin", "Kotlin"),
    lang("html", "HTML"),
    lang("css", "CSS"),
    lang("sql", "SQL"),
    lang("json", "JSON"),
    lang("markdown", "Markdown"),
    lang("yaml", "YAML"),
    lang("xml", "XML"),
];

/// Display label for a known language value. Free-text languages have none.
pub fn language_label(value: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|option| option.value.eq_ignore_ascii_case(value))
        .map(|option| option.label)
}

/// What the creation flow hands back after a successful submit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedPaste {
    pub slug: String,
    pub share_url: String,
    pub note: String,
    /// Characters in the submitted text
    pub chars: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Nothing to paste: the snippet text is empty.")]
    EmptyText,
    #[error("A paste is already being created.")]
    Busy,
    /// Transport details are logged, never shown
    #[error("Failed to create paste. Please try again.")]
    CreateFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_language_is_listed_first() {
        assert_eq!(LANGUAGES[0].value, DEFAULT_LANGUAGE);
        assert_eq!(LANGUAGES.len(), 20);
    }

    #[test]
    fn test_language_label() {
        assert_eq!(language_label("csharp"), Some("C#"));
        assert_eq!(language_label("Rust"), Some("Rust"));
        assert_eq!(language_label("brainfuck"), None);
    }
}
