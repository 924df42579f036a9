use std::collections::HashSet;

use anyhow::{Context, Result};

use crate::wordle::WORD_LENGTH;

/// Dictionary is the immutable word list a game draws its secret word from and checks guesses
/// against. Words are stored in upper case.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: Vec<String>,
    index: HashSet<String>,
}

impl Dictionary {
    /// Builds a dictionary from `words`, keeping only `WORD_LENGTH`-letter alphabetic words.
    /// Order is preserved and duplicates are dropped.
    pub fn from_words<I, S>(words: I) -> Dictionary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Dictionary::default();
        for word in words {
            let word = word.as_ref().trim().to_ascii_uppercase();
            if word.len() != WORD_LENGTH || !word.chars().all(|c| c.is_ascii_alphabetic()) {
                continue;
            }
            if dictionary.index.insert(word.clone()) {
                dictionary.words.push(word);
            }
        }
        dictionary
    }

    /// `load` reads a file containing one word per line. Empty lines and lines that start
    /// with a '#' are skipped.
    pub fn load(path: impl AsRef<str>) -> Result<Dictionary> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .context(format!("Error reading word list {}", path))?;

        Ok(Dictionary::from_words(
            contents
                .lines()
                .filter(|s| !s.starts_with('#'))
                .filter(|s| !s.trim().is_empty()),
        ))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(&word.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
