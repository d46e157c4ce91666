//! Keyword-based channel categorisation
//!
//! Rules are an ordered list, never a map: a name such as "CCTV-6 电影"
//! matches more than one rule and the first declared rule must win.

use crate::config::{CategoryRule, ClassificationConfig};

#[derive(Debug, Clone)]
struct CompiledRule {
    category: String,
    /// Lowercased keywords
    keywords: Vec<String>,
}

/// Maps display names to one category from a closed set
#[derive(Debug, Clone)]
pub struct ChannelClassifier {
    rules: Vec<CompiledRule>,
    default_category: String,
}

impl ChannelClassifier {
    pub fn new(rules: &[CategoryRule], default_category: impl Into<String>) -> Self {
        let rules = rules
            .iter()
            .map(|rule| CompiledRule {
                category: rule.category.clone(),
                keywords: rule
                    .keywords
                    .iter()
                    .filter(|k| !k.trim().is_empty())
                    .map(|k| k.to_lowercase())
                    .collect(),
            })
            .collect();

        Self {
            rules,
            default_category: default_category.into(),
        }
    }

    pub fn from_config(config: &ClassificationConfig) -> Self {
        Self::new(&config.rules, config.default_category.clone())
    }

    /// First rule with a keyword contained in `name` (case-insensitive),
    /// otherwise the default category
    pub fn classify(&self, name: &str) -> &str {
        let lower = name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lower.contains(k.as_str())))
            .map(|rule| rule.category.as_str())
            .unwrap_or(self.default_category.as_str())
    }

    /// Declared category order: rules first, default bucket last
    pub fn category_order(&self) -> Vec<String> {
        let mut order: Vec<String> = Vec::with_capacity(self.rules.len() + 1);
        for category in self
            .rules
            .iter()
            .map(|r| &r.category)
            .chain(std::iter::once(&self.default_category))
        {
            if !order.contains(category) {
                order.push(category.clone());
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(category: &str, keywords: &[&str]) -> CategoryRule {
        CategoryRule {
            category: category.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_default_rules() {
        let classifier = ChannelClassifier::from_config(&ClassificationConfig::default());
        assert_eq!(classifier.classify("News24"), "News");
        assert_eq!(classifier.classify("CCTV-1 综合"), "News");
        assert_eq!(classifier.classify("湖南卫视"), "Satellite");
        assert_eq!(classifier.classify("Movie Max"), "Movies");
        assert_eq!(classifier.classify("Cartoon Planet"), "Kids");
        assert_eq!(classifier.classify("Random Channel"), "Other");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = vec![rule("Movies", &["movie"]), rule("Kids", &["kid"])];
        let classifier = ChannelClassifier::new(&rules, "Other");
        assert_eq!(classifier.classify("Kids Movie Time"), "Movies");

        let reversed = vec![rule("Kids", &["kid"]), rule("Movies", &["movie"])];
        let classifier = ChannelClassifier::new(&reversed, "Other");
        assert_eq!(classifier.classify("Kids Movie Time"), "Kids");
    }

    #[test]
    fn test_case_insensitive() {
        let classifier = ChannelClassifier::new(&[rule("Sports", &["ESPN"])], "Other");
        assert_eq!(classifier.classify("espn 2"), "Sports");
        assert_eq!(classifier.classify("ESPN NEWS"), "Sports");
    }

    #[test]
    fn test_category_order_ends_with_default() {
        let rules = vec![
            rule("News", &["news"]),
            rule("Movies", &["movie"]),
            rule("News", &["headline"]),
        ];
        let classifier = ChannelClassifier::new(&rules, "Other");
        assert_eq!(classifier.category_order(), vec!["News", "Movies", "Other"]);
        assert_eq!(classifier.classify("Headline Now"), "News");
    }

    #[test]
    fn test_idempotent() {
        let classifier = ChannelClassifier::from_config(&ClassificationConfig::default());
        assert_eq!(classifier.classify("CCTV-6 电影"), classifier.classify("CCTV-6 电影"));
    }
}
