//! Partial JSON repair for streamed model output.
//!
//! The model emits a JSON document a few tokens at a time. To render it before
//! it is complete, the received prefix is cut back to the last point where it
//! can be closed and the missing closing quote/brackets are appended:
//!
//! - open strings are closed (`["Pyth` → `["Pyth"]`)
//! - open arrays and objects are closed
//! - dangling keys, colons and commas are dropped (`{"a":1,"b` → `{"a":1}`)
//! - incomplete literals and escape sequences are dropped

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum PartialParse {
    /// Nothing usable has arrived yet.
    Undefined,
    /// The text parsed only after repair.
    Repaired(Value),
    /// The text parsed as-is.
    Successful(Value),
    /// The text is not a JSON prefix.
    Failed,
}

impl PartialParse {
    pub fn value(&self) -> Option<&Value> {
        match self {
            PartialParse::Repaired(value) | PartialParse::Successful(value) => Some(value),
            PartialParse::Undefined | PartialParse::Failed => None,
        }
    }
}

/// Parses `text`, repairing it first if it is a truncated JSON document.
pub fn parse_partial_json(text: &str) -> PartialParse {
    if text.trim().is_empty() {
        return PartialParse::Undefined;
    }

    if let Ok(value) = serde_json::from_str(text) {
        return PartialParse::Successful(value);
    }

    let repaired = repair_json(text);
    if repaired.is_empty() {
        return PartialParse::Undefined;
    }

    match serde_json::from_str(&repaired) {
        Ok(value) => PartialParse::Repaired(value),
        Err(_) => PartialParse::Failed,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ObjectSlot {
    KeyOrEnd,
    Key,
    Colon,
    Value,
    CommaOrEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ArraySlot {
    ValueOrEnd,
    CommaOrEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Frame {
    Object(ObjectSlot),
    Array(ArraySlot),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Escape {
    None,
    Backslash,
    Unicode { remaining: u8, code: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scalar {
    Idle,
    /// `high_surrogate`: a `\uD800`..`\uDBFF` escape is waiting for its pair.
    String {
        is_key: bool,
        escape: Escape,
        high_surrogate: bool,
    },
    Literal { start: usize },
    Number,
}

struct Repair {
    stack: Vec<Frame>,
    /// Byte length of the prefix that can be kept.
    keep: usize,
    /// Characters that close the kept prefix.
    suffix: String,
    /// A complete top-level value has been read.
    finished: bool,
}

impl Repair {
    fn mark(&mut self, end: usize, in_string: bool) {
        self.keep = end;
        self.suffix.clear();
        if in_string {
            self.suffix.push('"');
        }
        for frame in self.stack.iter().rev() {
            self.suffix.push(match frame {
                Frame::Object(_) => '}',
                Frame::Array(_) => ']',
            });
        }
    }

    /// Records that a value ended at byte offset `end`.
    fn value_finished(&mut self, end: usize) {
        match self.stack.last_mut() {
            Some(Frame::Object(slot)) => *slot = ObjectSlot::CommaOrEnd,
            Some(Frame::Array(slot)) => *slot = ArraySlot::CommaOrEnd,
            None => self.finished = true,
        }
        self.mark(end, false);
    }

    fn expects_value(&self) -> bool {
        match self.stack.last() {
            Some(Frame::Object(slot)) => *slot == ObjectSlot::Value,
            Some(Frame::Array(slot)) => *slot == ArraySlot::ValueOrEnd,
            None => !self.finished,
        }
    }
}

/// Returns the longest closable prefix of `text` with its closing characters
/// appended, or an empty string when no prefix can be closed.
pub fn repair_json(text: &str) -> String {
    let mut repair = Repair {
        stack: Vec::new(),
        keep: 0,
        suffix: String::new(),
        finished: false,
    };
    let mut scalar = Scalar::Idle;

    for (i, ch) in text.char_indices() {
        let end = i + ch.len_utf8();

        match scalar {
            Scalar::String {
                is_key,
                escape,
                mut high_surrogate,
            } => {
                let escape = match escape {
                    Escape::None if ch == '\\' => Escape::Backslash,
                    Escape::None if ch == '"' => {
                        scalar = Scalar::Idle;
                        if is_key {
                            if let Some(Frame::Object(slot)) = repair.stack.last_mut() {
                                *slot = ObjectSlot::Colon;
                            }
                        } else {
                            repair.value_finished(end);
                        }
                        continue;
                    }
                    Escape::None => Escape::None,
                    Escape::Backslash if ch == 'u' => Escape::Unicode {
                        remaining: 4,
                        code: 0,
                    },
                    Escape::Backslash => Escape::None,
                    Escape::Unicode { remaining, code } => {
                        let code = code * 16 + ch.to_digit(16).unwrap_or(0);
                        if remaining > 1 {
                            Escape::Unicode {
                                remaining: remaining - 1,
                                code,
                            }
                        } else {
                            high_surrogate = (0xD800..=0xDBFF).contains(&code);
                            Escape::None
                        }
                    }
                };
                if escape == Escape::None && !is_key && !high_surrogate {
                    repair.mark(end, true);
                }
                scalar = Scalar::String {
                    is_key,
                    escape,
                    high_surrogate,
                };
                continue;
            }
            Scalar::Literal { start } => {
                if ch.is_ascii_alphabetic() {
                    continue;
                }
                if !matches!(&text[start..i], "true" | "false" | "null") {
                    break;
                }
                scalar = Scalar::Idle;
                repair.value_finished(i);
            }
            Scalar::Number => {
                if ch.is_ascii_digit() {
                    repair.mark(end, false);
                    continue;
                }
                if matches!(ch, '.' | 'e' | 'E' | '+' | '-') {
                    continue;
                }
                scalar = Scalar::Idle;
                repair.value_finished(i);
            }
            Scalar::Idle => {}
        }

        if ch.is_whitespace() {
            continue;
        }

        match ch {
            '{' | '[' if repair.expects_value() => {
                repair.stack.push(if ch == '{' {
                    Frame::Object(ObjectSlot::KeyOrEnd)
                } else {
                    Frame::Array(ArraySlot::ValueOrEnd)
                });
                repair.mark(end, false);
            }
            '}' if matches!(
                repair.stack.last(),
                Some(Frame::Object(ObjectSlot::KeyOrEnd | ObjectSlot::CommaOrEnd))
            ) =>
            {
                repair.stack.pop();
                repair.value_finished(end);
            }
            ']' if matches!(repair.stack.last(), Some(Frame::Array(_))) => {
                repair.stack.pop();
                repair.value_finished(end);
            }
            '"' if matches!(repair.stack.last(), Some(Frame::Object(ObjectSlot::KeyOrEnd))) => {
                if let Some(Frame::Object(slot)) = repair.stack.last_mut() {
                    *slot = ObjectSlot::Key;
                }
                scalar = Scalar::String {
                    is_key: true,
                    escape: Escape::None,
                    high_surrogate: false,
                };
            }
            '"' if repair.expects_value() => {
                scalar = Scalar::String {
                    is_key: false,
                    escape: Escape::None,
                    high_surrogate: false,
                };
                repair.mark(end, true);
            }
            ':' => match repair.stack.last_mut() {
                Some(Frame::Object(slot)) if *slot == ObjectSlot::Colon => {
                    *slot = ObjectSlot::Value;
                }
                _ => break,
            },
            ',' => match repair.stack.last_mut() {
                Some(Frame::Object(slot)) if *slot == ObjectSlot::CommaOrEnd => {
                    *slot = ObjectSlot::KeyOrEnd;
                }
                Some(Frame::Array(slot)) if *slot == ArraySlot::CommaOrEnd => {
                    *slot = ArraySlot::ValueOrEnd;
                }
                _ => break,
            },
            't' | 'f' | 'n' if repair.expects_value() => {
                scalar = Scalar::Literal { start: i };
            }
            '-' | '0'..='9' if repair.expects_value() => {
                scalar = Scalar::Number;
                if ch.is_ascii_digit() {
                    repair.mark(end, false);
                }
            }
            _ => break,
        }
    }

    if let Scalar::Literal { start } = scalar {
        if matches!(&text[start..], "true" | "false" | "null") {
            repair.value_finished(text.len());
        }
    }

    if repair.keep == 0 {
        return String::new();
    }

    let mut repaired = String::with_capacity(repair.keep + repair.suffix.len());
    repaired.push_str(&text[..repair.keep]);
    repaired.push_str(&repair.suffix);
    repaired
}
