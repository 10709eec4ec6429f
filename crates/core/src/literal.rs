//! Literal resolution: raw opcode value text → typed [`Value`].
//!
//! Resolution tries, in order: a quoted string, a `$variable` reference, an
//! integer, a float, a note name, and finally falls back to the trimmed text.
//! Numeric forms always win over note names.

use crate::macros::MacroEnv;
use serde::Serialize;
use std::fmt;

/// Semitone offsets for the note spellings SFZ accepts.
const NOTE_MAP: [(&str, i64); 17] = [
    ("c", 0),
    ("c#", 1),
    ("db", 1),
    ("d", 2),
    ("d#", 3),
    ("eb", 3),
    ("e", 4),
    ("f", 5),
    ("f#", 6),
    ("gb", 6),
    ("g", 7),
    ("g#", 8),
    ("ab", 8),
    ("a", 9),
    ("a#", 10),
    ("bb", 10),
    ("b", 11),
];

/// A MIDI note written by name (`c4`, `F#2`, `bb-1`).
///
/// Compares equal to its pitch as an integer and to its exact source spelling
/// as a string.
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pitch: i64,
    name: String,
}

impl Note {
    /// Parse `<letter>[#|b]<octave>`. The letter and flat marker are
    /// case-insensitive; the octave is a signed integer.
    ///
    /// Pitch is `semitone + octave * 12 + 12`, so `c1` is 24 and `c4` is 60.
    pub fn parse(text: &str) -> Option<Note> {
        let split = |key_len: usize| -> Option<Note> {
            let key = text.get(..key_len)?.to_ascii_lowercase();
            let octave: i64 = text.get(key_len..)?.parse().ok()?;
            let semitone = NOTE_MAP.iter().find(|(k, _)| *k == key)?.1;
            Some(Note {
                pitch: octave.checked_mul(12)?.checked_add(semitone + 12)?,
                name: text.to_string(),
            })
        };
        split(2).or_else(|| split(1))
    }

    /// MIDI pitch number.
    pub fn pitch(&self) -> i64 {
        self.pitch
    }

    /// The spelling as written in the source.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.pitch == other.pitch
    }
}

/// A resolved opcode or macro value.
///
/// Equality is symmetric across kinds: a [`Value::Note`] equals an
/// [`Value::Int`] with the same pitch and a [`Value::Str`] holding its exact
/// spelling; integers and floats compare numerically.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Whole number.
    Int(i64),
    /// Real number.
    Float(f64),
    /// Note name.
    Note(Note),
    /// Text, quotes stripped.
    Str(String),
}

impl Value {
    /// Numeric view of the value: integers, floats and note pitches.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Note(n) => Some(n.pitch as f64),
            Value::Str(_) => None,
        }
    }

    /// Whether the value is a string.
    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Short kind name for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Note(_) => "note",
            Value::Str(_) => "string",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Str(a), Str(b)) => a == b,
            (Note(n), Str(s)) | (Str(s), Note(n)) => n.name == *s,
            (Str(_), _) | (_, Str(_)) => false,
            (Int(a), Int(b)) => a == b,
            (Note(n), Int(i)) | (Int(i), Note(n)) => n.pitch == *i,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        *self == Value::Int(*other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        *self == Value::Str((*other).to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            // `{:?}` keeps the decimal point on whole floats (`1.0`).
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Note(n) => f.write_str(&n.name),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// A `$variable` reference with no matching `#define`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("undefined variable ${name}")]
pub struct UndefinedVariable {
    /// Variable name without the `$`.
    pub name: String,
}

/// Resolve raw value text against the macro environment.
///
/// An undefined `$variable` is an error; callers decide what to store.
pub fn resolve(raw: &str, env: &MacroEnv) -> Result<Value, UndefinedVariable> {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Ok(Value::Str(raw[1..raw.len() - 1].to_string()));
    }
    if let Some(name) = raw.strip_prefix('$') {
        return env.get(name).cloned().ok_or_else(|| UndefinedVariable {
            name: name.to_string(),
        });
    }
    Ok(parse_number_or_note(raw).unwrap_or_else(|| Value::Str(raw.trim().to_string())))
}

/// The ordered attempt list for bare text: integer, float, note.
fn parse_number_or_note(raw: &str) -> Option<Value> {
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Value::Int(i));
    }
    if looks_numeric(raw)
        && let Ok(x) = raw.parse::<f64>()
        && x.is_finite()
    {
        return Some(Value::Float(x));
    }
    Note::parse(raw).map(Value::Note)
}

/// Rejects `inf`, `nan` and friends, which `f64::from_str` accepts.
fn looks_numeric(raw: &str) -> bool {
    raw.bytes().any(|b| b.is_ascii_digit())
        && raw
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}
