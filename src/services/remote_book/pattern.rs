use anyhow::{anyhow, Result};
use regex::Regex;

/// Book formats the reader can open
pub const DEFAULT_BOOK_FILE_PATTERN: &str = r"(?i).*\.(txt|epub|umd|pdf|mobi|azw3|azw)";

/// Decides whether a remote display name denotes a supported book file.
/// Matching is always against the whole name.
#[derive(Debug, Clone)]
pub struct BookNamePattern {
    regex: Regex,
}

impl BookNamePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| anyhow!("Invalid book name pattern '{}': {}", pattern, e))?;
        Ok(Self { regex })
    }

    /// Case-insensitive match on any of the given extensions (leading dots are ignored)
    pub fn from_extensions<S: AsRef<str>>(extensions: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = extensions
            .iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Err(anyhow!("At least one book extension must be specified"));
        }

        Self::new(&format!(r"(?i).*\.({})", alternatives.join("|")))
    }

    pub fn matches(&self, display_name: &str) -> bool {
        self.regex.is_match(display_name)
    }
}

impl Default for BookNamePattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(&format!("^(?:{})$", DEFAULT_BOOK_FILE_PATTERN))
                .expect("default book pattern is valid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern() {
        let pattern = BookNamePattern::default();
        assert!(pattern.matches("b1.epub"));
        assert!(pattern.matches("Novel.TXT"));
        assert!(pattern.matches("series.vol1.azw3"));
        assert!(!pattern.matches("cover.jpg"));
        assert!(!pattern.matches("epub"));
        // Whole-name match, not a substring search
        assert!(!pattern.matches("b1.epub.bak"));
    }

    #[test]
    fn test_from_extensions() {
        let pattern = BookNamePattern::from_extensions(&["epub", ".PDF", " cbz "]).unwrap();
        assert!(pattern.matches("a.epub"));
        assert!(pattern.matches("a.pdf"));
        assert!(pattern.matches("a.CBZ"));
        assert!(!pattern.matches("a.txt"));

        let empty: [&str; 0] = [];
        assert!(BookNamePattern::from_extensions(&empty).is_err());
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        assert!(BookNamePattern::new("(unclosed").is_err());
    }
}
