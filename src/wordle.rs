/// Wordle is a game where you have to guess a word. The word is chosen by the game, and you
/// have a limited number of tries to guess it. After each attempt, the game tells you which
/// letters you guessed correctly, and which letters are in the word but in the wrong position.
///
/// This module implements the game logic: letter classification and the per-player engine
/// that owns the secret word, the tries budget and the guess being typed.
use std::sync::Arc;

use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

use crate::dictionary::Dictionary;

/// Number of letters in every secret word and every guess.
pub const WORD_LENGTH: usize = 5;

/// Largest tries budget a game accepts.
pub const MAX_TRIES: u32 = 20;

/// Reason a guess could not be classified.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum InvalidGuess {
    /// The guess buffer holds fewer than `WORD_LENGTH` letters.
    #[error("guess has {0} of {len} letters", len = WORD_LENGTH)]
    Incomplete(usize),
    /// The guess is not a dictionary word.
    #[error("{0} is not in the word list")]
    NotInDictionary(String),
}

/// Errors reported by the game engine and the board.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum GameError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid input: {0:?} is not a single letter")]
    InvalidInput(String),

    #[error("invalid guess: {0}")]
    InvalidGuess(InvalidGuess),

    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),

    #[error("row is full")]
    RowFull,

    #[error("board is full")]
    BoardFull,
}

/// Classification is the verdict for a single letter of a guess.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Classification {
    /// Right letter in the right position.
    Good,
    /// Letter is in the word, but somewhere else.
    Partially,
    /// Letter is not in the word, or all its occurrences are already accounted for.
    Wrong,
    /// Nothing classified yet.
    #[default]
    Empty,
}

impl Classification {
    /// Rank used to pick the most informative verdict for a letter seen several times.
    pub fn rank(self) -> u8 {
        match self {
            Classification::Good => 3,
            Classification::Partially => 2,
            Classification::Wrong => 1,
            Classification::Empty => 0,
        }
    }
}

/// Cell is a single classified letter of a guess.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Cell {
    pub letter: char,
    pub position: usize,
    pub classification: Classification,
}

/// GuessResult holds the classification of every position of one guess, in order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GuessResult {
    cells: [Cell; WORD_LENGTH],
}

impl GuessResult {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn classifications(&self) -> Vec<Classification> {
        self.cells.iter().map(|c| c.classification).collect()
    }

    /// The guessed word, in upper case.
    pub fn word(&self) -> String {
        self.cells.iter().map(|c| c.letter).collect()
    }
}

/// `classify` compares `guess` with `secret` and returns the per-position classification.
///
/// Duplicates are handled as per the rules of Wordle: exact matches claim their letter of the
/// secret first, then the remaining letters are matched left to right against what is left.
/// Both words must be `WORD_LENGTH` letters long.
pub fn classify(secret: &str, guess: &str) -> Result<GuessResult, GameError> {
    let secret: Vec<char> = secret.to_ascii_uppercase().chars().collect();
    let guess: Vec<char> = guess.to_ascii_uppercase().chars().collect();
    if guess.len() != WORD_LENGTH {
        return Err(GameError::InvalidGuess(InvalidGuess::Incomplete(guess.len())));
    }
    if secret.len() != WORD_LENGTH {
        return Err(GameError::InvariantViolation("secret word has the wrong length"));
    }

    let mut verdicts = [None; WORD_LENGTH];

    // Letters of the secret not yet claimed by a guess letter.
    let mut remaining: Vec<Option<char>> = secret.iter().copied().map(Some).collect();

    for (i, c) in guess.iter().enumerate() {
        if secret[i] == *c {
            verdicts[i] = Some(Classification::Good);
            remaining[i] = None;
        }
    }

    for (i, c) in guess.iter().enumerate() {
        if verdicts[i].is_some() {
            continue;
        }
        if let Some(slot) = remaining.iter_mut().find(|s| **s == Some(*c)) {
            *slot = None;
            verdicts[i] = Some(Classification::Partially);
        }
    }

    // Anything not claimed above is wrong.
    let cells = std::array::from_fn(|i| Cell {
        letter: guess[i],
        position: i,
        classification: verdicts[i].unwrap_or(Classification::Wrong),
    });

    Ok(GuessResult { cells })
}

/// `has_won` returns true if every position of the guess is `Good`.
pub fn has_won(result: &GuessResult) -> bool {
    result
        .cells
        .iter()
        .all(|c| c.classification == Classification::Good)
}

/// GuessEngine represents a single Wordle game: the secret word, the tries left, and the guess
/// currently being typed.
#[derive(Debug, Clone)]
pub struct GuessEngine {
    dictionary: Arc<Dictionary>,
    secret_word: String,
    tries: u32,
    guess: String,
}

impl GuessEngine {
    /// `new` starts a game with a secret word picked at random from `dictionary`.
    pub fn new(dictionary: Arc<Dictionary>, tries: u32) -> Result<GuessEngine, GameError> {
        GuessEngine::with_rng(dictionary, tries, &mut rand::thread_rng())
    }

    /// `with_rng` is like `new`, but picks the secret word with the given random source.
    pub fn with_rng<R: Rng + ?Sized>(
        dictionary: Arc<Dictionary>,
        tries: u32,
        rng: &mut R,
    ) -> Result<GuessEngine, GameError> {
        if !(1..=MAX_TRIES).contains(&tries) {
            return Err(GameError::Configuration(format!(
                "tries budget must be between 1 and {}",
                MAX_TRIES
            )));
        }

        let secret_word = dictionary
            .words()
            .choose(rng)
            .ok_or_else(|| GameError::Configuration("word list is empty".into()))?
            .clone();

        Ok(GuessEngine {
            dictionary,
            secret_word,
            tries,
            guess: String::with_capacity(WORD_LENGTH),
        })
    }

    pub fn secret_word(&self) -> &str {
        &self.secret_word
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    pub fn has_tries_remaining(&self) -> bool {
        self.tries > 0
    }

    /// The guess typed so far.
    pub fn guess(&self) -> &str {
        &self.guess
    }

    /// `append_letter` adds one letter to the guess. Letters typed into a full guess are
    /// dropped.
    pub fn append_letter(&mut self, letter: impl AsRef<str>) -> Result<(), GameError> {
        let letter = letter.as_ref();
        let mut chars = letter.chars();
        let c = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            _ => return Err(GameError::InvalidInput(letter.to_string())),
        };

        if !self.is_guess_complete() {
            self.guess.push(c);
        }
        Ok(())
    }

    pub fn is_guess_complete(&self) -> bool {
        self.guess.len() == WORD_LENGTH
    }

    pub fn clear_guess(&mut self) {
        self.guess.clear();
    }

    pub fn decrement_tries(&mut self) -> Result<(), GameError> {
        if self.tries == 0 {
            return Err(GameError::InvariantViolation("no tries left to use"));
        }
        self.tries -= 1;
        Ok(())
    }

    /// Returns true if the current guess is a dictionary word.
    pub fn validate_guess(&self) -> bool {
        self.dictionary.contains(&self.guess)
    }

    /// `classify_guess` classifies the current guess against the secret word. The guess must
    /// be complete and in the dictionary.
    pub fn classify_guess(&self) -> Result<GuessResult, GameError> {
        if !self.is_guess_complete() {
            return Err(GameError::InvalidGuess(InvalidGuess::Incomplete(
                self.guess.len(),
            )));
        }
        if !self.validate_guess() {
            return Err(GameError::InvalidGuess(InvalidGuess::NotInDictionary(
                self.guess.clone(),
            )));
        }

        classify(&self.secret_word, &self.guess)
    }
}
