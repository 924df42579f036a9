/// The board is the grid of letters a player sees: every submitted guess with its
/// classification, plus the row being typed.
///
/// The guess history is authoritative. The grid and the cursor are a projection of it that can
/// be thrown away and rebuilt at any time with `reset_and_replay`.
use std::collections::BTreeMap;

use crate::wordle::{Classification, GameError, GuessResult, WORD_LENGTH};

/// Tile is one square of the grid.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct Tile {
    pub letter: Option<char>,
    pub classification: Classification,
}

#[derive(Debug, Clone)]
pub struct BoardRenderState {
    row_limit: usize,
    rows: Vec<[Tile; WORD_LENGTH]>,
    current_row: usize,
    current_column: usize,
    history: Vec<(String, GuessResult)>,
}

impl BoardRenderState {
    /// Creates an empty board with `row_limit` rows of `WORD_LENGTH` tiles.
    pub fn new(row_limit: usize) -> Result<BoardRenderState, GameError> {
        if row_limit == 0 {
            return Err(GameError::Configuration(
                "board needs at least one row".into(),
            ));
        }

        Ok(BoardRenderState {
            row_limit,
            rows: vec![[Tile::default(); WORD_LENGTH]; row_limit],
            current_row: 0,
            current_column: 0,
            history: Vec::new(),
        })
    }

    pub fn rows(&self) -> &[[Tile; WORD_LENGTH]] {
        &self.rows
    }

    /// Returns `(current_row, current_column)`.
    pub fn cursor(&self) -> (usize, usize) {
        (self.current_row, self.current_column)
    }

    /// Submitted guesses, oldest first.
    pub fn history(&self) -> &[(String, GuessResult)] {
        &self.history
    }

    pub fn has_room_in_row(&self) -> bool {
        self.current_row < self.row_limit && self.current_column < WORD_LENGTH
    }

    /// Writes `letter` at the cursor and moves the cursor one column right.
    pub fn record_letter(
        &mut self,
        letter: char,
        classification: Classification,
    ) -> Result<(), GameError> {
        if self.current_row >= self.row_limit {
            return Err(GameError::BoardFull);
        }
        if !self.has_room_in_row() {
            return Err(GameError::RowFull);
        }

        self.rows[self.current_row][self.current_column] = Tile {
            letter: Some(letter.to_ascii_uppercase()),
            classification,
        };
        self.current_column += 1;
        Ok(())
    }

    pub fn advance_row(&mut self) -> Result<(), GameError> {
        if self.current_row >= self.row_limit {
            return Err(GameError::BoardFull);
        }
        self.current_row += 1;
        self.current_column = 0;
        Ok(())
    }

    /// Writes a whole classified guess into the current row and adds it to the history. The
    /// cursor is left at the end of the row; the caller decides when to `advance_row`.
    pub fn record_full_guess(&mut self, word: &str, result: &GuessResult) -> Result<(), GameError> {
        let word = word.to_ascii_uppercase();
        if word != result.word() {
            return Err(GameError::InvariantViolation(
                "guess does not match its classification",
            ));
        }

        self.write_row(result)?;
        self.history.push((word, result.clone()));
        Ok(())
    }

    /// Wipes the grid and rebuilds it from the history, one row per submitted guess. Anything
    /// typed into the current row is lost.
    pub fn reset_and_replay(&mut self) -> Result<(), GameError> {
        self.rows.fill([Tile::default(); WORD_LENGTH]);
        self.current_row = 0;
        self.current_column = 0;

        let history = std::mem::take(&mut self.history);
        let replayed = history.iter().try_for_each(|(_, result)| {
            self.write_row(result)?;
            self.advance_row()
        });
        self.history = history;
        replayed
    }

    /// `letter_summary` returns the best known classification of every letter played so far,
    /// in alphabetical order.
    pub fn letter_summary(&self) -> Vec<(char, Classification)> {
        let mut letters: BTreeMap<char, Classification> = BTreeMap::new();
        for cell in self.history.iter().flat_map(|(_, r)| r.cells()) {
            let best = letters.entry(cell.letter).or_default();
            if cell.classification.rank() > best.rank() {
                *best = cell.classification;
            }
        }
        letters.into_iter().collect()
    }

    fn write_row(&mut self, result: &GuessResult) -> Result<(), GameError> {
        if self.current_row >= self.row_limit {
            return Err(GameError::BoardFull);
        }
        if self.current_column != 0 {
            return Err(GameError::RowFull);
        }

        for cell in result.cells() {
            self.record_letter(cell.letter, cell.classification)?;
        }
        Ok(())
    }
}
