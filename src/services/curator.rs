//! Deduplication, grouping and ranking of accepted channels

use std::collections::HashMap;
use tracing::debug;

use crate::models::{CuratedPlaylist, EvaluatedChannel};

pub struct Curator {
    max_per_category: usize,
}

impl Curator {
    pub fn new(max_per_category: usize) -> Self {
        Self { max_per_category }
    }

    /// Build the curated playlist from accepted channels
    ///
    /// Channels sharing a display name collapse to the highest score; on a
    /// tie the one seen first is kept. Survivors are grouped by category,
    /// sorted by score descending (stable) and truncated to the cap.
    pub fn curate(&self, channels: Vec<EvaluatedChannel>) -> CuratedPlaylist {
        let accepted = channels.len();
        let unique = dedup_by_name(channels);
        let unique_count = unique.len();

        let mut categories: HashMap<String, Vec<EvaluatedChannel>> = HashMap::new();
        for channel in unique {
            categories
                .entry(channel.category.clone())
                .or_default()
                .push(channel);
        }

        let mut truncated = 0usize;
        for bucket in categories.values_mut() {
            bucket.sort_by(|a, b| b.score.cmp(&a.score));
            if bucket.len() > self.max_per_category {
                truncated += bucket.len() - self.max_per_category;
                bucket.truncate(self.max_per_category);
            }
        }

        debug!(
            "Curated {} accepted channels: {} after dedup, {} over category cap",
            accepted, unique_count, truncated
        );

        CuratedPlaylist::new(categories)
    }
}

/// Keep one channel per name, preserving first-seen order
fn dedup_by_name(channels: Vec<EvaluatedChannel>) -> Vec<EvaluatedChannel> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<EvaluatedChannel> = Vec::with_capacity(channels.len());

    for channel in channels {
        match positions.get(&channel.name) {
            Some(&index) => {
                if channel.score > unique[index].score {
                    unique[index] = channel;
                }
            }
            None => {
                positions.insert(channel.name.clone(), unique.len());
                unique.push(channel);
            }
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(name: &str, url: &str, category: &str, score: u32) -> EvaluatedChannel {
        EvaluatedChannel {
            name: name.to_string(),
            url: url.to_string(),
            category: category.to_string(),
            score,
            logo_url: String::new(),
        }
    }

    #[test]
    fn test_duplicate_name_keeps_highest_score() {
        let curator = Curator::new(5);
        let playlist = curator.curate(vec![
            channel("CCTV-1", "http://a.example.com/1", "News", 65),
            channel("CCTV-1", "http://b.example.com/1", "News", 72),
        ]);

        let news = playlist.channels("News");
        assert_eq!(news.len(), 1);
        assert_eq!(news[0].score, 72);
        assert_eq!(news[0].url, "http://b.example.com/1");
    }

    #[test]
    fn test_duplicate_tie_keeps_first_seen() {
        let curator = Curator::new(5);
        let playlist = curator.curate(vec![
            channel("CCTV-1", "http://first.example.com", "News", 80),
            channel("CCTV-1", "http://second.example.com", "News", 80),
        ]);
        assert_eq!(playlist.channels("News")[0].url, "http://first.example.com");
    }

    #[test]
    fn test_category_cap_and_descending_order() {
        let curator = Curator::new(5);
        let scores = [55, 80, 60, 75, 65, 70, 50];
        let channels = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| {
                channel(&format!("Movie {i}"), &format!("http://m.example.com/{i}"), "Movies", score)
            })
            .collect();

        let playlist = curator.curate(channels);
        let movies: Vec<u32> = playlist.channels("Movies").iter().map(|c| c.score).collect();
        assert_eq!(movies, vec![80, 75, 70, 65, 60]);
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        let curator = Curator::new(5);
        let playlist = curator.curate(vec![
            channel("A", "http://x/a", "Kids", 70),
            channel("B", "http://x/b", "Kids", 80),
            channel("C", "http://x/c", "Kids", 70),
        ]);
        let names: Vec<&str> = playlist
            .channels("Kids")
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_same_name_across_categories_dedups_globally() {
        let curator = Curator::new(5);
        let playlist = curator.curate(vec![
            channel("Mix", "http://x/1", "News", 60),
            channel("Mix", "http://x/2", "Other", 90),
        ]);
        assert!(playlist.channels("News").is_empty());
        assert_eq!(playlist.channels("Other").len(), 1);
        assert_eq!(playlist.channel_count(), 1);
    }

    #[test]
    fn test_empty_input() {
        let playlist = Curator::new(5).curate(Vec::new());
        assert!(playlist.is_empty());
        assert_eq!(playlist.categories().count(), 0);
    }
}
