use crate::words::{Word, WordPerformance};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::collections::HashMap;

/// Weight of a word the player has never attempted
pub const UNATTEMPTED_WEIGHT: f64 = 0.7;

/// Trait for different word selection strategies
pub trait WordSelector {
    /// Pick up to `count` words and return them in play order
    fn select_words(
        &self,
        words: &[Word],
        count: usize,
        performance: &HashMap<i64, WordPerformance>,
        rng: &mut dyn RngCore,
    ) -> Vec<Word>;
}

/// Uniform shuffle; with `count >= words.len()` every word is used exactly once
pub struct ShuffleSelector;

impl WordSelector for ShuffleSelector {
    fn select_words(
        &self,
        words: &[Word],
        count: usize,
        _performance: &HashMap<i64, WordPerformance>,
        rng: &mut dyn RngCore,
    ) -> Vec<Word> {
        let mut selected = words.to_vec();
        selected.shuffle(rng);
        selected.truncate(count);
        selected
    }
}

/// Weighted sampling without replacement, biased toward words the player gets wrong
pub struct PerformanceWeightedSelector;

impl WordSelector for PerformanceWeightedSelector {
    fn select_words(
        &self,
        words: &[Word],
        count: usize,
        performance: &HashMap<i64, WordPerformance>,
        rng: &mut dyn RngCore,
    ) -> Vec<Word> {
        let mut pool: Vec<(&Word, f64)> = words
            .iter()
            .map(|word| (word, selection_weight(performance.get(&word.id))))
            .collect();

        let target = count.min(pool.len());
        let mut selected = Vec::with_capacity(target);

        while selected.len() < target && !pool.is_empty() {
            let total: f64 = pool.iter().map(|(_, weight)| weight).sum();
            let idx = if total > 0.0 {
                pick_weighted(&pool, rng.gen_range(0.0..total))
            } else {
                rng.gen_range(0..pool.len())
            };
            let (word, _) = pool.remove(idx);
            selected.push(word.clone());
        }

        selected.shuffle(rng);
        selected
    }
}

/// `0.7` for an unattempted word, otherwise `1.0 - 0.9 * success_rate` (0.1 to 1.0)
pub fn selection_weight(performance: Option<&WordPerformance>) -> f64 {
    match performance.and_then(WordPerformance::success_rate) {
        Some(rate) => 1.0 - 0.9 * rate.clamp(0.0, 1.0),
        None => UNATTEMPTED_WEIGHT,
    }
}

/// Walk cumulative weights until `point` falls inside an item's span
fn pick_weighted(pool: &[(&Word, f64)], point: f64) -> usize {
    let mut cumulative = 0.0;
    for (idx, (_, weight)) in pool.iter().enumerate() {
        cumulative += weight;
        if point < cumulative {
            return idx;
        }
    }
    // float rounding can leave `point` a hair past the last boundary
    pool.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_test_words(n: usize) -> Vec<Word> {
        (0..n)
            .map(|i| Word {
                id: i as i64 + 1,
                list_id: 1,
                text: format!("word{i}"),
                difficulty: 1,
                audio_ref: None,
                definition: None,
                position: i as u32,
            })
            .collect()
    }

    fn perf(attempts: u32, correct: u32) -> WordPerformance {
        WordPerformance { attempts, correct }
    }

    #[test]
    fn weights_follow_success_rate() {
        assert_eq!(selection_weight(None), 0.7);
        assert_eq!(selection_weight(Some(&perf(5, 0))), 1.0);
        assert!((selection_weight(Some(&perf(5, 5))) - 0.1).abs() < 1e-12);
        assert!((selection_weight(Some(&perf(4, 2))) - 0.55).abs() < 1e-12);
        // an empty history row counts as never attempted
        assert_eq!(selection_weight(Some(&perf(0, 0))), 0.7);
    }

    #[test]
    fn shuffle_selector_uses_every_word_once() {
        let words = create_test_words(12);
        let mut rng = StdRng::seed_from_u64(7);
        let mut selected =
            ShuffleSelector.select_words(&words, words.len(), &HashMap::new(), &mut rng);
        assert_eq!(selected.len(), 12);
        selected.sort_by_key(|w| w.id);
        assert_eq!(selected, words);
    }

    #[test]
    fn weighted_selector_draws_without_replacement() {
        let words = create_test_words(30);
        let mut rng = StdRng::seed_from_u64(11);
        let selected =
            PerformanceWeightedSelector.select_words(&words, 20, &HashMap::new(), &mut rng);
        assert_eq!(selected.len(), 20);

        let mut ids: Vec<_> = selected.iter().map(|w| w.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn weighted_selector_stops_when_candidates_run_out() {
        let words = create_test_words(3);
        let mut rng = StdRng::seed_from_u64(3);
        let selected =
            PerformanceWeightedSelector.select_words(&words, 20, &HashMap::new(), &mut rng);
        assert_eq!(selected.len(), 3);

        let none = PerformanceWeightedSelector.select_words(&[], 5, &HashMap::new(), &mut rng);
        assert!(none.is_empty());
    }

    #[test]
    fn weighted_selection_is_proportional_to_weight() {
        // weights: never right = 1.0, always right = 0.1, unattempted = 0.7
        let words = create_test_words(3);
        let mut performance = HashMap::new();
        performance.insert(1, perf(10, 0));
        performance.insert(2, perf(10, 10));

        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 20_000;
        let mut counts = [0usize; 3];
        for _ in 0..trials {
            let picked =
                PerformanceWeightedSelector.select_words(&words, 1, &performance, &mut rng);
            counts[(picked[0].id - 1) as usize] += 1;
        }

        let expected = [1.0 / 1.8, 0.1 / 1.8, 0.7 / 1.8];
        for (count, expected) in counts.iter().zip(expected) {
            let observed = *count as f64 / trials as f64;
            assert!(
                (observed - expected).abs() < 0.02,
                "observed {observed:.3}, expected {expected:.3}"
            );
        }
    }

    #[test]
    fn struggling_words_are_picked_more_often() {
        let words = create_test_words(40);
        let mut performance = HashMap::new();
        for word in &words[..20] {
            performance.insert(word.id, perf(4, 4));
        }
        for word in &words[20..] {
            performance.insert(word.id, perf(4, 0));
        }

        let mut rng = StdRng::seed_from_u64(99);
        let mut struggling = 0;
        let trials = 200;
        for _ in 0..trials {
            let picked =
                PerformanceWeightedSelector.select_words(&words, 20, &performance, &mut rng);
            struggling += picked.iter().filter(|w| w.id > 20).count();
        }
        assert!(
            struggling > trials * 20 * 3 / 4,
            "struggling words picked {struggling} times"
        );
    }

    #[test]
    fn pick_weighted_handles_boundary() {
        let words = create_test_words(2);
        let pool = vec![(&words[0], 0.5), (&words[1], 0.5)];
        assert_eq!(pick_weighted(&pool, 0.0), 0);
        assert_eq!(pick_weighted(&pool, 0.5), 1);
        assert_eq!(pick_weighted(&pool, 1.0), 1);
    }
}
