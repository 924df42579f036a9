use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use log::*;
use mobot::api::escape_md;
use mobot::*;

use crate::app::*;
use crate::board::{BoardRenderState, Tile};
use crate::wordle::Classification;

/// Number of players listed by /top.
const LEADERBOARD_SIZE: usize = 10;

/// emoji_letter takes a capital letter and returns the corresponding emoji letter
/// inside the Regional Indicator Symbol range.
fn emoji_letter(l: char) -> char {
    let base = 0x1F1E6;
    let a = 'A' as u32;
    let target = l.to_ascii_uppercase() as u32;

    std::char::from_u32(base + target - a).unwrap_or('?')
}

/// render_tile returns the MarkdownV2 for one square of the board.
fn render_tile(tile: &Tile) -> String {
    match (tile.letter, tile.classification) {
        (Some(c), Classification::Good) => format!(" {}", emoji_letter(c)),
        (Some(c), Classification::Partially) => format!(" *`{}`* ", c),
        (Some(c), Classification::Wrong) => format!(" ~{}~ ", c),
        (Some(c), Classification::Empty) => format!(" `{}` ", c),
        (None, _) => " \u{2B1C}".to_string(),
    }
}

/// render_board takes a board and returns a MarkdownV2 representation of it. While the game is
/// on, the row being typed is marked with a pencil.
/// Emoji codepoints: https://emojipedia.org/emoji/
fn render_board(board: &BoardRenderState, playing: bool) -> String {
    let (current_row, _) = board.cursor();
    let mut s = String::from("Your board:\n\n");
    for (i, row) in board.rows().iter().enumerate() {
        for tile in row {
            s.push_str(&render_tile(tile));
        }
        if playing && i == current_row {
            s.push_str(" \u{270F}");
        }
        s.push_str("\n\n");
    }
    s
}

/// render_letters lists the letters played so far, marked with what is known about them.
fn render_letters(board: &BoardRenderState) -> String {
    board
        .letter_summary()
        .iter()
        .map(|(c, class)| match class {
            Classification::Good => format!("*{}*", c),
            Classification::Partially => format!("`{}`", c),
            Classification::Wrong | Classification::Empty => format!("~{}~", c),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn current_board(app: &App) -> String {
    app.session
        .as_ref()
        .map(|s| render_board(&s.board, true))
        .unwrap_or_default()
}

pub async fn handle_new_game(e: Event, state: State<App>) -> Result<Action, anyhow::Error> {
    // Get the sender's first name
    let from = e.update.get_message()?.clone().from.unwrap_or_default();
    let player = Player::from(&from);
    let today = Utc::now().date_naive();

    // Get the application state
    let mut app = state.get().write().await;
    if let Err(e) = app.load(&player).await {
        warn!("No saved game state: {}", e);
    }

    if app.is_playing() {
        return Ok(Action::ReplyMarkdown(format!(
            "{}\nYou already have a game going\\. Finish it first\\!",
            current_board(&app)
        )));
    }

    if !app.can_play(today) {
        return Ok(Action::ReplyText(format!(
            "Sorry {}, you already played today. Come back tomorrow!",
            from.first_name
        )));
    }

    let target_word = app.start_game(&player, today).await?;

    info!(
        "Starting new game with {} ({}), target word: {}.",
        from.first_name,
        from.username.clone().unwrap_or("unknown".into()),
        target_word
    );

    app.admin_log(
        Arc::clone(&e.api),
        format!(
            "{} ({}) starting a new game with word {}.",
            from.first_name,
            from.username.clone().unwrap_or_default(),
            target_word,
        ),
    )
    .await;

    let score = app.score(&player.id).await;
    let first_game = if score.games <= 1 {
        "This is your first game.".to_string()
    } else {
        format!("Your score: {}.", score)
    };

    Ok(Action::ReplyText(format!(
        "Hi {}, Welcome to {}!\n\n{}\nGuess the {}-letter word in {} tries. Type letters or whole words, /clear to wipe the row.",
        from.first_name,
        app.game_name,
        first_game,
        target_word.len(),
        app.tries()
    )))
}

pub async fn handle_bot_command(e: Event, state: State<App>) -> Result<Action, anyhow::Error> {
    // Get the command
    let command = e
        .update
        .get_message()?
        .text
        .clone()
        .ok_or(anyhow!("No command"))?;

    let reply = match command.split_whitespace().next().unwrap_or_default() {
        "/help" => {
            let app = state.get().read().await;
            format!(
                "Welcome to {}! The goal of the game is to guess the target word within {} tries.

Type letters to fill the row; a full row is submitted as your guess.
Type /clear to wipe the row, /new to start the game, /score to see your score or /top for the leaderboard",
                app.game_name,
                app.tries()
            )
        }

        "/new" | "/start" => {
            return handle_new_game(e, state).await;
        }

        "/clear" => {
            let mut app = state.get().write().await;
            if !app.is_playing() {
                "There's no game going. Type /new to start one.".into()
            } else {
                app.clear_row()?;
                return Ok(Action::ReplyMarkdown(current_board(&app)));
            }
        }

        "/admin" => {
            let username = e.update.from_user()?.username.clone().unwrap_or_default();
            let chat_id = e.update.chat_id()?;
            let mut app = state.get().write().await;
            if app.auth_admin(username.as_str(), chat_id).await {
                "Admin messages routed to this chat.".into()
            } else {
                "You are not an admin.".into()
            }
        }

        "/score" => {
            let from = e.update.get_message()?.clone().from.unwrap_or_default();
            let player = Player::from(&from);
            let mut app = state.get().write().await;

            // Get the application state
            if let Err(e) = app.load(&player).await {
                warn!("No saved game state: {}", e);
            }
            let score = app.score(&player.id).await;
            if score.games == 0 {
                "You have not played any games yet.".to_string()
            } else {
                format!("Your score: {}", score)
            }
        }

        "/top" => {
            let board = state.get().read().await.leaderboard(LEADERBOARD_SIZE).await;
            if board.is_empty() {
                "Nobody has played yet.".to_string()
            } else {
                board
                    .iter()
                    .enumerate()
                    .map(|(i, s)| format!("{}. {}: {}", i + 1, s.name, s))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }

        _ => "I don't know that command.".into(),
    };

    Ok(Action::ReplyText(reply))
}

/// handle_chat_event is the main Telegram handler for the bot.
pub async fn handle_chat_event(e: Event, state: State<App>) -> Result<Action, anyhow::Error> {
    // Get the message
    let message = e
        .update
        .get_message()?
        .text
        .clone()
        .unwrap_or_default();

    if message.starts_with('/') {
        return handle_bot_command(e, state).await;
    }

    // Get the sender's first name
    let from = e.update.get_message()?.clone().from.unwrap_or_default();
    let player = Player::from(&from);

    // Get the application state
    {
        let mut state = state.get().write().await;
        if let Err(err) = state.load(&player).await {
            warn!("No saved game state: {}", err);
        }
    }

    // If there's no active game, start one.
    if !state.get().read().await.is_playing() {
        return handle_new_game(e, state).await;
    }

    // There's an active game, so play a turn.
    info!(
        "{} ({}) typed {}",
        from.first_name,
        from.username.clone().unwrap_or("unknown".into()),
        message
    );

    let mut app = state.get().write().await;
    let turn = app.play_text(&player, &message).await?;
    let name = escape_md(from.first_name.as_str());

    let reply = match &turn {
        Move::Typing => current_board(&app),
        Move::InvalidLetter(text) => format!(
            "Sorry {}, {} has something that isn't a letter\\. Try again\\.",
            name,
            escape_md(text)
        ),
        Move::InvalidWord(word) => format!(
            "{}\nSorry {}, {} is not a valid word\\. Try again\\.",
            current_board(&app),
            name,
            word
        ),
        Move::Valid(_) => {
            let session = app
                .session
                .as_ref()
                .ok_or(anyhow!("game ended unexpectedly"))?;
            format!(
                "{}\nNice try\\. Guesses so far: {}, tries left: {}\nLetters: {}",
                render_board(&session.board, true),
                session.board.history().len(),
                session.engine.tries(),
                render_letters(&session.board)
            )
        }
        Move::Won { board, points } => {
            let score = app.score(&player.id).await;
            format!(
                "{}{}",
                render_board(board, false),
                escape_md(
                    format!(
                        "\nYou won! \u{1F46F} +{} points\nYour score: {}",
                        points, score
                    )
                    .as_str()
                )
            )
        }
        Move::Lost {
            board,
            points,
            target_word,
        } => {
            let score = app.score(&player.id).await;
            format!(
                "{}{}",
                render_board(board, false),
                escape_md(
                    format!(
                        "\nYou lost! Target word: {} \u{1F979} +{} points\nYour score: {}",
                        target_word, points, score
                    )
                    .as_str()
                )
            )
        }
    };

    match &turn {
        Move::Won { .. } => info!("{} won", player.display_name()),
        Move::Lost { target_word, .. } => info!(
            "{} lost (target: {})",
            player.display_name(),
            target_word
        ),
        _ => {}
    }

    let verdict = match &turn {
        Move::Typing | Move::InvalidLetter(_) => None,
        Move::InvalidWord(_) => Some("which was invalid"),
        Move::Valid(_) => Some("which was valid"),
        Move::Won { .. } => Some("and won"),
        Move::Lost { .. } => Some("and lost"),
    };
    if let Some(verdict) = verdict {
        app.admin_log(
            Arc::clone(&e.api),
            format!(
                "{} played '{}' {}.",
                player.display_name(),
                message,
                verdict
            ),
        )
        .await;
    }

    Ok(Action::ReplyMarkdown(reply))
}
