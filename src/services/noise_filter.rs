//! Ad/promo filtering on display names
//!
//! Runs before any network I/O so promotional entries cost nothing.

/// Case-insensitive substring match against a keyword list
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    /// Lowercased keywords, paired with the keyword as configured
    keywords: Vec<(String, String)>,
}

impl NoiseFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords = keywords
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.trim().is_empty())
            .map(|k| (k.to_lowercase(), k))
            .collect();
        Self { keywords }
    }

    /// The configured keyword `name` matches, if any
    pub fn matched_keyword(&self, name: &str) -> Option<&str> {
        let lower = name.to_lowercase();
        self.keywords
            .iter()
            .find(|(needle, _)| lower.contains(needle.as_str()))
            .map(|(_, original)| original.as_str())
    }

    pub fn is_noise(&self, name: &str) -> bool {
        self.matched_keyword(name).is_some()
    }
}
