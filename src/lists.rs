use crate::error::{GameError, Result};
use crate::store::SqliteStore;
use crate::words::NewWord;
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use tracing::info;

static LISTS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lists");

/// A demo word list shipped inside the binary
#[derive(Deserialize, Clone, Debug)]
pub struct BundledList {
    pub name: String,
    pub words: Vec<NewWord>,
}

/// All bundled lists, ordered by file name
pub fn bundled_lists() -> Result<Vec<BundledList>> {
    let mut files: Vec<_> = LISTS_DIR
        .files()
        .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort_by_key(|f| f.path());

    files
        .into_iter()
        .map(|file| {
            let contents = file.contents_utf8().ok_or_else(|| {
                GameError::Config(format!("{} is not valid utf-8", file.path().display()))
            })?;
            Ok(serde_json::from_str(contents)?)
        })
        .collect()
}

/// Import every bundled list whose name is not in the store yet.
/// Returns the ids of the lists created.
pub fn seed_bundled_lists(store: &SqliteStore) -> Result<Vec<i64>> {
    let mut created = Vec::new();
    for list in bundled_lists()? {
        if store.find_list(&list.name)?.is_some() {
            continue;
        }
        let list_id = store.create_list(&list.name)?;
        for word in &list.words {
            store.add_word(list_id, word)?;
        }
        info!(list_id, name = %list.name, words = list.words.len(), "seeded word list");
        created.push(list_id);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::WordSource;

    #[test]
    fn bundled_lists_parse() {
        let lists = bundled_lists().unwrap();
        assert!(lists.len() >= 3);
        for list in &lists {
            assert!(!list.words.is_empty(), "{} has no words", list.name);
            for word in &list.words {
                assert!((1..=5).contains(&word.difficulty), "{}", word.text);
            }
        }
    }

    #[test]
    fn one_bundled_list_is_large_enough_for_weighted_selection() {
        let lists = bundled_lists().unwrap();
        assert!(lists.iter().any(|l| l.words.len() > 20));
    }

    #[test]
    fn seeding_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = seed_bundled_lists(&store).unwrap();
        let second = seed_bundled_lists(&store).unwrap();

        assert_eq!(first.len(), bundled_lists().unwrap().len());
        assert!(second.is_empty());

        let words = store.get_words(first[0]).unwrap();
        assert!(!words.is_empty());
        assert!(words.windows(2).all(|w| w[0].position < w[1].position));
    }
}
