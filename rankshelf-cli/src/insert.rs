/// Interactive insertion: drives an `InsertionSession` from typed answers.
///
/// The session itself is pure; this module is the "ask the user" step that
/// feeds each answer back in.
use anyhow::{Context, Result, bail};
use rankshelf_core::{Category, InsertionSession, RatedItem};
use std::io::{BufRead, Write};
use tracing::debug;

use crate::parse::{Answer, parse_judgment, parse_sentiment};
use crate::prompt::{build_comparison_prompt, build_sentiment_prompt};

/// Read one trimmed line. End of input is an error: the session cannot resume without it.
fn read_answer(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    let n = input.read_line(&mut line).context("Failed to read answer")?;
    if n == 0 {
        bail!("Input ended before the rating was finished");
    }
    Ok(line)
}

/// Ask until `parse` recognises the answer.
fn ask<T>(
    prompt: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
    parse: impl Fn(&str) -> Option<Answer<T>>,
) -> Result<Answer<T>> {
    loop {
        write!(out, "{prompt}")?;
        out.flush()?;
        let line = read_answer(input)?;
        match parse(&line) {
            Some(answer) => return Ok(answer),
            None => writeln!(out, "Didn't catch that: \"{}\"", line.trim())?,
        }
    }
}

/// Run a session to a terminal state. Returns `Resolved` or `Cancelled`.
pub fn run_insertion(
    new_item: &str,
    category: Category,
    existing: Vec<RatedItem>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<InsertionSession> {
    let total = existing.len();
    let session = InsertionSession::begin(existing)?;

    let prompt = build_sentiment_prompt(new_item, category, total);
    let mut session = match ask(&prompt, input, out, parse_sentiment)? {
        Answer::Value(sentiment) => session.with_sentiment(sentiment)?,
        Answer::Cancel => return Ok(session.cancel()?),
    };

    let mut step = 1;
    while let Some(opponent) = session.opponent() {
        let prompt = build_comparison_prompt(new_item, opponent, step);
        session = match ask(&prompt, input, out, parse_judgment)? {
            Answer::Value(judgment) => {
                debug!(step, opponent = %opponent.item, ?judgment, "insertion answer");
                session.advance(judgment)?
            }
            Answer::Cancel => session.cancel()?,
        };
        step += 1;
    }

    Ok(session)
}
