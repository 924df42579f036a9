/// App is the main bot application and handler. It implements the outer game logic, keeping
/// track of the game session per chat, scores, and persistence.
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use log::*;
use mobot::{api::User, *};
use std::{collections::HashMap, sync::Arc};
use tokio::{
    fs::{self, File},
    io::{AsyncReadExt, AsyncWriteExt},
    sync::RwLock,
};

use serde::{Deserialize, Serialize};

use crate::board::BoardRenderState;
use crate::dictionary::Dictionary;
use crate::score::{self, Outcome, Score, ScoringPolicy};
use crate::wordle::{self, Classification, GameError, GuessEngine, GuessResult};

/// Tries a player gets when none are configured.
pub const DEFAULT_TRIES: u32 = 6;

/// Player identifies the person behind a chat.
#[derive(Clone, Debug, Default)]
pub struct Player {
    pub id: String,
    pub handle: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for Player {
    fn from(user: &User) -> Self {
        Player {
            id: user.id.to_string(),
            handle: user.username.clone().unwrap_or_default(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone().unwrap_or_default(),
        }
    }
}

impl Player {
    /// Name shown on the leaderboard.
    pub fn display_name(&self) -> String {
        if self.handle.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} ({})", self.first_name, self.handle)
        }
    }
}

/// Session is one game in progress: the engine and the board it is drawn on.
#[derive(Debug, Clone)]
pub struct Session {
    pub engine: GuessEngine,
    pub board: BoardRenderState,
}

impl Session {
    fn new(dictionary: Arc<Dictionary>, tries: u32) -> Result<Session, GameError> {
        let engine = GuessEngine::new(dictionary, tries)?;
        let board = BoardRenderState::new(tries as usize + 1)?;
        Ok(Session { engine, board })
    }
}

/// Move is the result of feeding a message to the game.
#[derive(Debug)]
pub enum Move {
    /// Letters were added, the guess is not complete yet.
    Typing,
    /// The message contained something other than letters; nothing was typed.
    InvalidLetter(String),
    /// The completed guess is not in the word list; the row was cleared.
    InvalidWord(String),
    /// The guess was classified and the game goes on.
    Valid(GuessResult),
    Won {
        board: BoardRenderState,
        points: u32,
    },
    Lost {
        board: BoardRenderState,
        points: u32,
        target_word: String,
    },
}

/// SaveData represents the data that is saved for each user on disk. Data
/// is saved in JSON format.
#[derive(Serialize, Deserialize)]
struct SaveData {
    user_id: String,
    #[serde(default)]
    user_handle: String,
    #[serde(default)]
    user_first_name: String,
    #[serde(default)]
    user_last_name: String,
    score: Score,
    #[serde(default)]
    last_played: Option<NaiveDate>,
}

/// App represents the bot state for the wordle bot.
#[derive(Clone, Default, BotState)]
pub struct App {
    // App global
    pub game_name: String,
    pub admin_user: Option<String>,
    admin_chat_id: Arc<RwLock<Option<i64>>>,
    save_dir: String,
    scores: Arc<RwLock<HashMap<String, Score>>>,
    dictionary: Arc<Dictionary>,
    tries: u32,
    policy: ScoringPolicy,
    unlimited: bool,

    // Per chat ID
    pub session: Option<Session>,
    last_played: Option<NaiveDate>,
    loaded: bool,
}

impl App {
    /// Creates a new App instance.
    pub fn new(game_name: String, dictionary: Dictionary) -> App {
        App {
            game_name,
            dictionary: Arc::new(dictionary),
            tries: DEFAULT_TRIES,
            ..Default::default()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    /// Set the number of tries per game.
    pub fn set_tries(&mut self, tries: u32) {
        self.tries = tries;
    }

    /// Set how finished games are scored.
    pub fn set_policy(&mut self, policy: ScoringPolicy) {
        self.policy = policy;
    }

    /// Allow more than one game per player per day.
    pub fn set_unlimited(&mut self, unlimited: bool) {
        self.unlimited = unlimited;
    }

    /// Set the directory where game state is saved.
    pub fn set_save_dir(&mut self, save_dir: String) {
        self.save_dir = save_dir;
    }

    /// Returns true if a new game may be started on `today`.
    pub fn can_play(&self, today: NaiveDate) -> bool {
        self.unlimited || self.last_played != Some(today)
    }

    /// Starts a new game and returns its target word.
    pub async fn start_game(&mut self, player: &Player, today: NaiveDate) -> Result<String> {
        if self.is_playing() {
            bail!("a game is already in progress");
        }
        if !self.can_play(today) {
            bail!("already played on {}", today);
        }

        let session = Session::new(Arc::clone(&self.dictionary), self.tries)
            .context("Error starting game")?;
        let target_word = session.engine.secret_word().to_string();

        self.session = Some(session);
        self.last_played = Some(today);
        self.inc_games(player).await;
        Ok(target_word)
    }

    /// Authorizes the user as an admin.
    pub async fn auth_admin(&mut self, username: &str, chat_id: i64) -> bool {
        if self.admin_user.as_deref() == Some(username) {
            *self.admin_chat_id.write().await = Some(chat_id);
            return true;
        }
        false
    }

    /// Sends a log message to the admin chat
    pub async fn admin_log(&self, api: Arc<API>, text: String) {
        let chat_id = *self.admin_chat_id.read().await;
        if let Some(chat_id) = chat_id {
            _ = api
                .send_message(&api::SendMessageRequest {
                    chat_id,
                    text: format!("`{}`", api::escape_code(text.as_str())),
                    parse_mode: Some(api::ParseMode::MarkdownV2),
                    ..Default::default()
                })
                .await;
        }
    }

    /// Returns the user's current score
    pub async fn score(&self, player_id: &str) -> Score {
        self.scores
            .read()
            .await
            .get(player_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the `n` best scores across all players.
    pub async fn leaderboard(&self, n: usize) -> Vec<Score> {
        score::leaderboard(self.scores.read().await.values(), n)
    }

    /// Increments the number of games this user played and saves state.
    async fn inc_games(&self, player: &Player) {
        {
            let mut scores = self.scores.write().await;
            let score = scores.entry(player.id.clone()).or_default();
            score.name = player.display_name();
            score.games += 1;
        }
        if let Err(e) = self.save(player).await {
            error!("Error saving game state: {}", e);
        }
    }

    /// Ends the current game, adds its points to the user's score and saves state.
    async fn finish_game(&mut self, player: &Player, outcome: Outcome) -> u32 {
        self.session = None;

        let points = self.policy.points(outcome);
        {
            let mut scores = self.scores.write().await;
            let score = scores.entry(player.id.clone()).or_default();
            score.name = player.display_name();
            score.record(outcome, points);
        }
        if let Err(e) = self.save(player).await {
            error!("Error saving game state: {}", e);
        }
        points
    }

    /// `play_text` types the letters of `text` into the current guess, and submits the guess
    /// once it is complete. A message with anything but letters is rejected as a whole.
    pub async fn play_text(&mut self, player: &Player, text: &str) -> Result<Move> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| anyhow!("no game in progress"))?;

        let before = session.clone();
        for c in text.trim().chars() {
            match session.engine.append_letter(c.to_string()) {
                Err(GameError::InvalidInput(_)) => {
                    *session = before;
                    return Ok(Move::InvalidLetter(text.to_string()));
                }
                Err(e) => return Err(e.into()),
                Ok(()) => {}
            }
            if session.board.has_room_in_row() {
                session.board.record_letter(c, Classification::Empty)?;
            }
        }

        if session.engine.is_guess_complete() {
            return self.submit(player).await;
        }
        Ok(Move::Typing)
    }

    /// Clears the row being typed.
    pub fn clear_row(&mut self) -> Result<()> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| anyhow!("no game in progress"))?;

        session.engine.clear_guess();
        session.board.reset_and_replay()?;
        Ok(())
    }

    async fn submit(&mut self, player: &Player) -> Result<Move> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| anyhow!("no game in progress"))?;
        let word = session.engine.guess().to_string();

        if !session.engine.validate_guess() {
            session.engine.clear_guess();
            session.board.reset_and_replay()?;
            return Ok(Move::InvalidWord(word));
        }

        let result = session.engine.classify_guess()?;
        debug!(
            "{} guessed {}: {:?}",
            player.id,
            word,
            result.classifications()
        );
        session.engine.clear_guess();

        // Drop the typed letters and redraw the row with its classification.
        session.board.reset_and_replay()?;
        session.board.record_full_guess(&word, &result)?;
        session.board.advance_row()?;

        let outcome = if wordle::has_won(&result) {
            Outcome::Won {
                tries_remaining: session.engine.tries(),
            }
        } else {
            session.engine.decrement_tries()?;
            if session.engine.has_tries_remaining() {
                return Ok(Move::Valid(result));
            }
            Outcome::Lost
        };

        let board = session.board.clone();
        let target_word = session.engine.secret_word().to_string();
        let points = self.finish_game(player, outcome).await;
        debug!("{} finished with {:?} for {} points", player.id, outcome, points);

        Ok(match outcome {
            Outcome::Won { .. } => Move::Won { board, points },
            Outcome::Lost => Move::Lost {
                board,
                points,
                target_word,
            },
        })
    }

    /// Save game state for user
    pub async fn save(&self, player: &Player) -> Result<()> {
        if self.save_dir.is_empty() {
            return Ok(());
        }

        let filename = format!("{}/{}.json", self.save_dir, player.id);

        let mut file = File::create(filename.clone())
            .await
            .context(format!("Error creating file {}", filename))?;

        let save_data = SaveData {
            user_id: player.id.clone(),
            user_handle: player.handle.clone(),
            user_first_name: player.first_name.clone(),
            user_last_name: player.last_name.clone(),
            score: self.score(&player.id).await,
            last_played: self.last_played,
        };

        file.write_all(
            serde_json::to_vec(&save_data)
                .context("Error serializing game state")?
                .as_ref(),
        )
        .await
        .context(format!("Error writing file {}", filename))
    }

    /// Load game state for user, once per chat.
    pub async fn load(&mut self, player: &Player) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        if self.save_dir.is_empty() {
            bail!("No save directory configured");
        }

        let filename = format!("{}/{}.json", self.save_dir, player.id);
        let save_data = read_save_data(&filename).await?;

        self.scores
            .write()
            .await
            .insert(player.id.clone(), save_data.score);
        self.last_played = save_data.last_played;
        self.loaded = true;

        Ok(())
    }

    /// Loads the scores of every saved user, so the leaderboard is complete from the start.
    /// Returns the number of users loaded.
    pub async fn load_scores(&self) -> Result<usize> {
        if self.save_dir.is_empty() {
            return Ok(0);
        }

        let mut entries = fs::read_dir(&self.save_dir)
            .await
            .context(format!("Error reading directory {}", self.save_dir))?;

        let mut loaded = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match read_save_data(&path.to_string_lossy()).await {
                Ok(save_data) => {
                    self.scores
                        .write()
                        .await
                        .insert(save_data.user_id, save_data.score);
                    loaded += 1;
                }
                Err(e) => warn!("Skipping {}: {:#}", path.display(), e),
            }
        }

        Ok(loaded)
    }
}

async fn read_save_data(filename: &str) -> Result<SaveData> {
    let mut file = File::open(filename)
        .await
        .context(format!("Error opening file {}", filename))?;

    let mut contents = vec![];
    file.read_to_end(&mut contents)
        .await
        .context(format!("Error reading file {}", filename))?;

    serde_json::from_slice(&contents)
        .context(format!("Error deserializing game state from {}", filename))
}
