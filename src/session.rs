use anyhow::{Context, Result};
use itertools::Itertools;
use std::io::Write;

use crate::llm::{self, LlmClient, LlmError};
use crate::phrases;
use crate::quiz::Quiz;
use crate::speech::Speech;

/// Validation failures tolerated per round before the session gives up.
const MAX_VALIDATION_RETRIES: u32 = 3;

enum State {
    AwaitingRound,
    RoundActive(Quiz),
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Answer,
    Hint,
    Japanese,
    Speech,
    Next,
    Blank,
    Guess(&'a str),
}

/// Single-letter commands are case-insensitive; anything else non-empty is
/// a free-text guess. `s` is only a command while speech is available,
/// otherwise it falls through to the guess branch like any other input.
fn parse_command(input: &str, speech_enabled: bool) -> Command<'_> {
    let token = input.trim();
    if token.is_empty() {
        return Command::Blank;
    }
    match token.to_lowercase().as_str() {
        "q" => Command::Quit,
        "a" => Command::Answer,
        "h" => Command::Hint,
        "j" => Command::Japanese,
        "s" if speech_enabled => Command::Speech,
        "n" => Command::Next,
        _ => Command::Guess(token),
    }
}

pub struct Session {
    llm: LlmClient,
    speech: Option<Speech>,
    phrases: Vec<String>,
    generation_model: String,
    judge_model: String,
}

impl Session {
    pub fn new(
        llm: LlmClient,
        speech: Option<Speech>,
        phrases: Vec<String>,
        generation_model: String,
        judge_model: String,
    ) -> Self {
        Self {
            llm,
            speech,
            phrases,
            generation_model,
            judge_model,
        }
    }

    pub async fn run(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let mut state = State::AwaitingRound;

        loop {
            let quiz = match &state {
                State::AwaitingRound => {
                    let quiz = self.next_quiz().await?;
                    println!("### CONVERSATION ##################################");
                    for line in quiz.question() {
                        println!("{line}");
                    }
                    state = State::RoundActive(quiz);
                    continue;
                }
                State::RoundActive(quiz) => quiz,
            };

            self.print_menu()?;

            let mut line = String::new();
            if stdin.read_line(&mut line)? == 0 {
                // stdin closed, same as quitting
                break;
            }

            match parse_command(&line, self.speech.is_some()) {
                Command::Quit => {
                    println!("Good bye");
                    break;
                }
                Command::Answer => {
                    println!("### Answer");
                    println!("{}", quiz.correct_answer());
                    println!("{}", quiz.japanese());
                }
                Command::Hint => {
                    println!("### Hint");
                    println!("{}", quiz.hint());
                }
                Command::Japanese => {
                    println!("### Japanese");
                    println!("{}", quiz.japanese());
                }
                Command::Speech => {
                    if let Some(speech) = &self.speech {
                        speech.speak(quiz.correct_answer()).await?;
                    }
                }
                Command::Next => {
                    state = State::AwaitingRound;
                }
                Command::Blank => {}
                Command::Guess(guess) => {
                    self.handle_guess(quiz, guess).await?;
                }
            }
        }

        Ok(())
    }

    /// Draws phrases until one yields a valid conversation, up to the retry
    /// bound. Transport errors are not retried.
    async fn next_quiz(&self) -> Result<Quiz> {
        let mut retries = 0;
        loop {
            let phrase = phrases::select_phrase(&self.phrases);
            match llm::generator::generate(&self.llm, &self.generation_model, phrase).await {
                Ok(conversation) => return Ok(Quiz::new(conversation)),
                Err(LlmError::Validation(detail)) => {
                    if retries >= MAX_VALIDATION_RETRIES {
                        anyhow::bail!(
                            "Giving up after {MAX_VALIDATION_RETRIES} retries, \
                             last failure: {detail}"
                        );
                    }
                    retries += 1;
                    log::warn!("discarding round (attempt {retries}): {detail}");
                }
                Err(error) => {
                    return Err(error).context("Conversation generation failed");
                }
            }
        }
    }

    async fn handle_guess(&self, quiz: &Quiz, guess: &str) -> Result<()> {
        println!("{}", if quiz.confirm(guess) { "Correct" } else { "Wrong" });

        let conversation = quiz.question().iter().join("\n");
        let feedback = match llm::judge::judge(
            &self.llm,
            &self.judge_model,
            guess,
            &conversation,
            quiz.correct_answer(),
        )
        .await
        {
            Ok(feedback) => feedback,
            Err(LlmError::Validation(detail)) => {
                // A malformed critique is not worth ending the session over.
                log::warn!("feedback failed validation: {detail}");
                println!("(feedback unavailable this time)");
                return Ok(());
            }
            Err(error) => return Err(error).context("Feedback generation failed"),
        };

        println!("### FEEDBACK");
        println!("{}", feedback.correction_result);
        println!();
        for (index, example) in feedback.examples.iter().enumerate() {
            println!("--- Example {index}: {example}");
        }

        Ok(())
    }

    fn print_menu(&self) -> Result<()> {
        let speech = if self.speech.is_some() {
            ", s: speech"
        } else {
            ""
        };
        print!("\n(q: quit, a: answer, h: hint, j: japanese{speech}, n: next question) => ");
        std::io::stdout().flush()?;
        Ok(())
    }
}
