//! Logo URL generation
//!
//! Logos are a cosmetic hint for players: the URL is derived from the
//! display name through a template and never fetched or validated.

/// Placeholder replaced in the template
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Builds logo URLs from a `{name}` template
#[derive(Debug, Clone, PartialEq)]
pub struct LogoUrlGenerator {
    template: String,
}

impl LogoUrlGenerator {
    pub fn new<S: Into<String>>(template: S) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Strip all whitespace from `display_name`, percent-encode it and
    /// substitute it into the template
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stream_curator::utils::logo::LogoUrlGenerator;
    ///
    /// let logos = LogoUrlGenerator::new("https://logo.clearbit.com/{name}.com");
    /// assert_eq!(logos.generate("News 24"), "https://logo.clearbit.com/News24.com");
    /// ```
    pub fn generate(&self, display_name: &str) -> String {
        let compact: String = display_name.split_whitespace().collect();
        self.template
            .replace(NAME_PLACEHOLDER, &urlencoding::encode(&compact))
    }
}
