//! Spoken/typed annotation commands.
//!
//! Review sessions often run hands-on-keyboard-free; a dictated phrase like
//! `"seizure activity from 42.5 to 47"` carries everything an annotation
//! needs. This module turns such a phrase into a [`VoiceCommand`] that
//! [`Session::add_voice_command`](crate::Session::add_voice_command) feeds
//! through the same validation as any other add.

use crate::error::{AnnotError, Result};

/// Annotation details extracted from a command phrase.
///
/// Times are as spoken; range and label validation happen in the store,
/// not here.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceCommand {
    pub label: String,
    pub start: f64,
    pub end: f64,
}

/// Parses a phrase of the form `"<label> from <start> to <end>"`.
///
/// The whole phrase is lowercased first, so the returned label is lowercase.
/// The label is the shortest non-empty text before the first
/// `from <number> to <number>` sequence; anything after the second number is
/// ignored, so `"spike from 10 to 12 please"` works.
///
/// # Errors
///
/// [`AnnotError::Format`] when no `from .. to ..` sequence is found or a
/// captured number does not parse (e.g. `"1.2.3"`).
///
/// # Examples
///
/// ```rust
/// use eegannot::voice::parse_command;
///
/// let cmd = parse_command("Seizure activity from 42.5 to 47")?;
/// assert_eq!(cmd.label, "seizure activity");
/// assert_eq!(cmd.start, 42.5);
/// assert_eq!(cmd.end, 47.0);
/// # Ok::<(), eegannot::AnnotError>(())
/// ```
pub fn parse_command(text: &str) -> Result<VoiceCommand> {
    let lowered = text.to_lowercase();
    let tokens = tokenize(&lowered);

    // Earliest "from <number> to <number>" with at least one label token
    // before it wins.
    for i in 1..tokens.len() {
        if tokens.len() < i + 4 {
            break;
        }
        let (from_offset, word) = tokens[i];
        if word != "from" || tokens[i + 2].1 != "to" {
            continue;
        }
        if !is_number_run(tokens[i + 1].1) || !is_number_run(tokens[i + 3].1) {
            continue;
        }

        let label = lowered[..from_offset].trim();
        if label.is_empty() {
            continue;
        }
        let start = parse_time(tokens[i + 1].1, text)?;
        let end = parse_time(tokens[i + 3].1, text)?;
        return Ok(VoiceCommand {
            label: label.to_string(),
            start,
            end,
        });
    }

    Err(AnnotError::Format(format!(
        "not an annotation command: {:?}",
        text
    )))
}

fn parse_time(token: &str, original: &str) -> Result<f64> {
    token.parse::<f64>().map_err(|_| {
        AnnotError::Format(format!(
            "bad time value {:?} in command {:?}",
            token, original
        ))
    })
}

/// Digits and dots only, like the time captures of the phrase grammar.
fn is_number_run(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Whitespace-separated words with their byte offsets, so the label can be
/// cut from the original phrase instead of re-joined from words.
fn tokenize(s: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in s.char_indices() {
        if c.is_whitespace() {
            if let Some(st) = start.take() {
                out.push((st, &s[st..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(st) = start {
        out.push((st, &s[st..]));
    }
    out
}
