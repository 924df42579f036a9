use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};

use crate::dictionary::Dictionary;
use crate::wordle::Classification::*;
use crate::wordle::*;

fn dictionary(words: &[&str]) -> Arc<Dictionary> {
    Arc::new(Dictionary::from_words(words))
}

fn type_word(engine: &mut GuessEngine, word: &str) {
    for c in word.chars() {
        engine.append_letter(c.to_string()).unwrap();
    }
}

/// Builds an engine over `words` whose secret is `secret`, trying seeds until one picks it.
fn engine_with_secret(words: &[&str], secret: &str, tries: u32) -> GuessEngine {
    let dictionary = dictionary(words);
    (0..256)
        .map(|seed| {
            GuessEngine::with_rng(Arc::clone(&dictionary), tries, &mut StdRng::seed_from_u64(seed))
                .unwrap()
        })
        .find(|e| e.secret_word() == secret)
        .expect("no seed picked the secret")
}

#[test]
fn it_works() {
    let result = classify("hello", "bolle").unwrap();

    assert_eq!(result.word(), "BOLLE");
    assert_eq!(
        result.classifications(),
        vec![Wrong, Partially, Good, Good, Partially]
    );
}

#[test]
fn distinct_letters_match_position_then_presence() {
    let words = [
        "CRANE", "SLATE", "PLUMB", "FJORD", "GHOST", "NYMPH", "QUICK", "WALTZ", "BRINK", "TOWEL",
    ];

    for secret in words {
        for guess in words {
            let result = classify(secret, guess).unwrap();
            for (i, (g, s)) in guess.chars().zip(secret.chars()).enumerate() {
                let expected = if g == s {
                    Good
                } else if secret.contains(g) {
                    Partially
                } else {
                    Wrong
                };
                assert_eq!(
                    result.cells()[i].classification,
                    expected,
                    "{} against {} at {}",
                    guess,
                    secret,
                    i
                );
            }
        }
    }
}

#[test]
fn distinct_letters_follow_position_and_presence() {
    let result = classify("CRANE", "SLATE").unwrap();
    assert_eq!(
        result.classifications(),
        vec![Wrong, Wrong, Good, Wrong, Good]
    );

    let result = classify("CRANE", "NACRE").unwrap();
    assert_eq!(
        result.classifications(),
        vec![Partially, Partially, Partially, Partially, Good]
    );
}

#[test]
fn duplicate_letters_are_only_credited_once_per_occurrence() {
    // Neither E of the guess sits on an E of the secret; both claim one.
    let result = classify("SPEED", "ERASE").unwrap();
    assert_eq!(
        result.classifications(),
        vec![Partially, Wrong, Wrong, Partially, Partially]
    );

    // Exact matches take the letters first, the leading L gets nothing.
    let result = classify("HELLO", "LOLLY").unwrap();
    assert_eq!(
        result.classifications(),
        vec![Wrong, Partially, Good, Good, Wrong]
    );

    let result = classify("HELLO", "LLAMA").unwrap();
    assert_eq!(
        result.classifications(),
        vec![Partially, Partially, Wrong, Wrong, Wrong]
    );

    // One E in the secret, three in the guess, the exact match wins it.
    let result = classify("CRANE", "EERIE").unwrap();
    assert_eq!(
        result.classifications(),
        vec![Wrong, Wrong, Partially, Wrong, Good]
    );
}

#[test]
fn cells_carry_letter_and_position() {
    let result = classify("crane", "trace").unwrap();
    let cell = result.cells()[3];
    assert_eq!(cell.letter, 'C');
    assert_eq!(cell.position, 3);
    assert_eq!(cell.classification, Partially);
    assert_eq!(result.cells()[1].classification, Good);
    assert_eq!(result.cells().len(), WORD_LENGTH);
}

#[test]
fn classify_rejects_wrong_length() {
    assert_eq!(
        classify("CRANE", "CRAN"),
        Err(GameError::InvalidGuess(InvalidGuess::Incomplete(4)))
    );
}

#[test]
fn has_won_only_when_all_good() {
    assert!(has_won(&classify("GRAPE", "grape").unwrap()));
    assert!(!has_won(&classify("GRAPE", "GRAPH").unwrap()));
    assert!(!has_won(&classify("GRAPE", "PAGER").unwrap()));
}

#[test]
fn new_rejects_bad_configuration() {
    assert!(matches!(
        GuessEngine::new(dictionary(&[]), 5),
        Err(GameError::Configuration(_))
    ));
    assert!(matches!(
        GuessEngine::new(dictionary(&["APPLE"]), 0),
        Err(GameError::Configuration(_))
    ));
}

#[test]
fn new_rejects_oversized_tries_budget() {
    assert!(GuessEngine::new(dictionary(&["APPLE"]), MAX_TRIES).is_ok());
    assert!(matches!(
        GuessEngine::new(dictionary(&["APPLE"]), MAX_TRIES + 1),
        Err(GameError::Configuration(_))
    ));
    assert!(matches!(
        GuessEngine::new(dictionary(&["APPLE"]), u32::MAX),
        Err(GameError::Configuration(_))
    ));
}

#[test]
fn append_letter_accepts_single_letters_only() {
    let mut engine = GuessEngine::new(dictionary(&["APPLE"]), 6).unwrap();

    engine.append_letter("a").unwrap();
    assert_eq!(engine.guess(), "A");

    for bad in ["", "ab", "1", " ", "é"] {
        assert_eq!(
            engine.append_letter(bad),
            Err(GameError::InvalidInput(bad.to_string()))
        );
    }
    assert_eq!(engine.guess(), "A");
}

#[test]
fn append_letter_on_full_guess_is_a_no_op() {
    let mut engine = GuessEngine::new(dictionary(&["APPLE"]), 6).unwrap();
    type_word(&mut engine, "apple");
    assert!(engine.is_guess_complete());

    engine.append_letter("z").unwrap();
    assert_eq!(engine.guess(), "APPLE");
}

#[test]
fn clear_guess_keeps_tries() {
    let mut engine = GuessEngine::new(dictionary(&["APPLE"]), 3).unwrap();
    type_word(&mut engine, "app");
    engine.clear_guess();
    assert_eq!(engine.guess(), "");
    assert_eq!(engine.tries(), 3);
}

#[test]
fn classify_guess_checks_preconditions() {
    let mut engine = GuessEngine::new(dictionary(&["APPLE", "GRAPE"]), 6).unwrap();

    type_word(&mut engine, "gra");
    assert_eq!(
        engine.classify_guess(),
        Err(GameError::InvalidGuess(InvalidGuess::Incomplete(3)))
    );

    type_word(&mut engine, "pz");
    assert!(!engine.validate_guess());
    assert_eq!(
        engine.classify_guess(),
        Err(GameError::InvalidGuess(InvalidGuess::NotInDictionary(
            "GRAPZ".into()
        )))
    );

    engine.clear_guess();
    type_word(&mut engine, "GrApE");
    assert!(engine.validate_guess());
    assert!(engine.classify_guess().is_ok());
}

#[test]
fn tries_never_go_negative() {
    let mut engine = GuessEngine::new(dictionary(&["APPLE"]), 2).unwrap();
    assert!(engine.has_tries_remaining());

    engine.decrement_tries().unwrap();
    engine.decrement_tries().unwrap();
    assert!(!engine.has_tries_remaining());
    assert_eq!(
        engine.decrement_tries(),
        Err(GameError::InvariantViolation("no tries left to use"))
    );
    assert_eq!(engine.tries(), 0);
}

#[test]
fn winning_guess_keeps_tries() {
    let mut engine = engine_with_secret(&["APPLE", "GRAPE"], "GRAPE", 2);
    type_word(&mut engine, "GRAPE");

    let result = engine.classify_guess().unwrap();
    assert!(has_won(&result));
    assert_eq!(result.classifications(), vec![Good; WORD_LENGTH]);
    assert_eq!(engine.tries(), 2);
}

#[test]
fn losing_guess_uses_a_try() {
    let mut engine = engine_with_secret(&["APPLE", "GRAPE"], "GRAPE", 2);
    type_word(&mut engine, "APPLE");

    let result = engine.classify_guess().unwrap();
    assert!(!has_won(&result));
    assert_eq!(
        result.classifications(),
        vec![Partially, Partially, Wrong, Wrong, Good]
    );

    engine.decrement_tries().unwrap();
    engine.clear_guess();
    assert_eq!(engine.tries(), 1);
    assert!(engine.has_tries_remaining());
}

#[test]
fn losing_guesses_use_up_the_budget() {
    let mut engine = engine_with_secret(&["CRANE", "SLATE", "PLUMB"], "CRANE", 3);

    for (played, guess) in ["SLATE", "PLUMB", "SLATE"].iter().enumerate() {
        assert!(engine.has_tries_remaining());
        type_word(&mut engine, guess);

        let result = engine.classify_guess().unwrap();
        assert!(!has_won(&result));
        engine.decrement_tries().unwrap();
        engine.clear_guess();

        assert_eq!(engine.tries(), 3 - played as u32 - 1);
    }

    assert!(!engine.has_tries_remaining());
    assert!(matches!(
        engine.decrement_tries(),
        Err(GameError::InvariantViolation(_))
    ));
    assert_eq!(engine.tries(), 0);
}

#[test]
fn invalid_guess_messages() {
    assert_eq!(
        InvalidGuess::Incomplete(3).to_string(),
        "guess has 3 of 5 letters"
    );
    assert_eq!(
        GameError::InvalidGuess(InvalidGuess::NotInDictionary("GRAPZ".into())).to_string(),
        "invalid guess: GRAPZ is not in the word list"
    );
}
