use anyhow::{bail, Context};
use argh::FromArgs;
use log::*;
use mobot::*;

use crate::app::{App, DEFAULT_TRIES};
use crate::dictionary::Dictionary;
use crate::handlers::handle_chat_event;
use crate::score::ScoringPolicy;

mod app;
mod board;
mod dictionary;
mod handlers;
mod score;
mod wordle;

#[cfg(test)]
mod wordle_test;

#[derive(FromArgs)]
/// A daily word guessing game for Telegram.
struct Args {
    /// file containing the words for the game, one per line
    #[argh(option, short = 'w', default = "String::from(\"words.txt\")")]
    words: String,

    /// number of tries per game
    #[argh(option, short = 't', default = "DEFAULT_TRIES")]
    tries: u32,

    /// directory where player scores are saved
    #[argh(option, short = 's', default = "String::new()")]
    save_dir: String,

    /// name of the game shown to players
    #[argh(option, default = "String::from(\"Wordle\")")]
    game_name: String,

    /// telegram username allowed to receive the admin log
    #[argh(option)]
    admin_user: Option<String>,

    /// points per unused try (plus one) for a win
    #[argh(option, default = "ScoringPolicy::default().win_multiplier")]
    win_multiplier: u32,

    /// points for a lost game
    #[argh(option, default = "ScoringPolicy::default().loss_score")]
    loss_score: u32,

    /// allow more than one game per player per day
    #[argh(switch)]
    unlimited: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mobot::init_logger();
    let args: Args = argh::from_env();

    let dictionary = Dictionary::load(&args.words)?;
    if dictionary.is_empty() {
        bail!("no {}-letter words in {}", wordle::WORD_LENGTH, args.words);
    }
    if !(1..=wordle::MAX_TRIES).contains(&args.tries) {
        bail!("--tries must be between 1 and {}", wordle::MAX_TRIES);
    }
    info!("Loaded {} words from {}.", dictionary.len(), args.words);

    let mut app = App::new(args.game_name, dictionary);
    app.admin_user = args.admin_user;
    app.set_tries(args.tries);
    app.set_unlimited(args.unlimited);
    app.set_policy(ScoringPolicy {
        win_multiplier: args.win_multiplier,
        loss_score: args.loss_score,
    });
    app.set_save_dir(args.save_dir);
    info!("Loaded scores for {} players.", app.load_scores().await?);

    let token = std::env::var("TELEGRAM_TOKEN").context("TELEGRAM_TOKEN is not set")?;
    let client = Client::new(token);

    info!("Starting bot...");
    let mut router = Router::new(client).with_state(app);
    router.add_route(Route::Message(Matcher::Any), handle_chat_event);
    router.start().await;

    Ok(())
}
