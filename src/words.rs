use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A word as supplied by the list owner. Immutable from the engines' point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub list_id: i64,
    pub text: String,
    /// 1 (easiest) to 5
    pub difficulty: u8,
    pub audio_ref: Option<String>,
    pub definition: Option<String>,
    pub position: u32,
}

impl Word {
    pub fn normalized(&self) -> String {
        self.text.trim().to_lowercase()
    }
}

/// Input for adding a word to a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewWord {
    pub text: String,
    pub difficulty: u8,
    #[serde(default)]
    pub audio_ref: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
}

impl NewWord {
    pub fn new(text: &str, difficulty: u8) -> Self {
        Self {
            text: text.to_string(),
            difficulty,
            audio_ref: None,
            definition: None,
        }
    }
}

/// Historical practice results of one player on one word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WordPerformance {
    pub attempts: u32,
    pub correct: u32,
}

impl WordPerformance {
    pub fn success_rate(&self) -> Option<f64> {
        if self.attempts == 0 {
            None
        } else {
            Some(f64::from(self.correct) / f64::from(self.attempts))
        }
    }
}

/// Read-only access to word lists and per-player word history
pub trait WordSource {
    /// Words of a list in list order. `NotFound` for an unknown list; an existing
    /// list may legitimately be empty.
    fn get_words(&self, list_id: i64) -> Result<Vec<Word>>;

    /// Performance for the given words; words never attempted are absent from the map.
    fn get_word_performance(
        &self,
        player_id: &str,
        word_ids: &[i64],
    ) -> Result<HashMap<i64, WordPerformance>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_of_unattempted_word_is_none() {
        assert_eq!(WordPerformance::default().success_rate(), None);
    }

    #[test]
    fn success_rate_ratio() {
        let perf = WordPerformance {
            attempts: 4,
            correct: 1,
        };
        assert_eq!(perf.success_rate(), Some(0.25));
    }

    #[test]
    fn normalized_trims_and_lowercases() {
        let word = Word {
            id: 1,
            list_id: 1,
            text: "  Giraffe ".to_string(),
            difficulty: 2,
            audio_ref: None,
            definition: None,
            position: 0,
        };
        assert_eq!(word.normalized(), "giraffe");
    }

    #[test]
    fn new_word_deserializes_without_optional_fields() {
        let word: NewWord = serde_json::from_str(r#"{"text":"cat","difficulty":1}"#).unwrap();
        assert_eq!(word, NewWord::new("cat", 1));
    }
}
