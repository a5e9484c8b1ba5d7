//! Deterministic transcript parsing, no external dependency
//!
//! This is the safety net under the AI translator: when the service is
//! down, slow, or returns garbage, this rule engine substitutes
//! transparently. It is pure and total - every input maps to exactly one
//! Command, and identical input always maps to the same Command.

use crate::command::model::{Command, HistoryDirection, ReadTarget, ScrollDirection};
use crate::command::ordinal::find_ordinal;

/// Deterministic transcript -> Command rule engine
///
/// An ordered phrase-rule list over the normalized transcript; the first
/// matching rule wins and there is no backtracking. When nothing matches
/// the result is `Command::Unknown`, an inert command whose execution
/// speaks a fixed "not understood" line - the pipeline never narrates
/// page content the user did not ask for.
pub struct FallbackInterpreter;

impl FallbackInterpreter {
    pub fn interpret(transcript: &str) -> Command {
        let t = normalize(transcript);
        if t.is_empty() {
            return Command::Unknown;
        }

        // Stop first: "stop reading" must never reach the read rule
        if t.starts_with("stop")
            || t == "pause"
            || t == "quiet"
            || t.contains("shut up")
            || t.contains("be quiet")
        {
            return Command::Stop;
        }

        if let Some(direction) = parse_scroll(&t) {
            return Command::Scroll { direction };
        }

        if t.contains("go back") || t.contains("navigate back") || t == "back" {
            return Command::navigate_history(HistoryDirection::Back);
        }
        if t.contains("go forward") || t.contains("navigate forward") || t == "forward" {
            return Command::navigate_history(HistoryDirection::Forward);
        }

        if has_word(&t, "read") {
            let (target, which_index) = parse_read_target(&t);
            return Command::Read {
                target,
                which_index,
            };
        }

        if has_word(&t, "summarize") || has_word(&t, "summarise") || has_word(&t, "summary") {
            let (target, which_index) = parse_read_target(&t);
            return Command::Summarize {
                target,
                which_index,
            };
        }

        if has_word(&t, "open") || has_word(&t, "click") || has_word(&t, "press") {
            return parse_click(&t);
        }

        if let Some(text) = extract_after(&t, &["type", "enter", "write"]) {
            return parse_type(&text);
        }

        if let Some(query) = extract_after(&t, &["search for", "look for", "find"]) {
            return Command::Find { query };
        }

        Command::Unknown
    }
}

/// Lower-case, strip quotes and punctuation, collapse whitespace
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}'))
        .map(|c| {
            if matches!(c, '.' | ',' | '!' | '?' | ';' | ':') {
                ' '
            } else {
                c
            }
        })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Take the text after the first matching keyword, if any remains
pub fn extract_after(text: &str, keywords: &[&str]) -> Option<String> {
    for keyword in keywords {
        if let Some(pos) = find_word(text, keyword) {
            let rest = text[pos + keyword.len()..].trim();
            if !rest.is_empty() {
                return Some(rest.to_string());
            }
        }
    }
    None
}

/// Whole-word test over the normalized transcript
///
/// Substring matching alone would let "ready" trigger the read rule.
pub fn has_word(text: &str, word: &str) -> bool {
    text.split_whitespace().any(|token| token == word)
}

/// Byte position of a keyword occurring on word boundaries
fn find_word(text: &str, keyword: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find(keyword) {
        let pos = search_from + rel;
        let end = pos + keyword.len();
        let boundary_before = pos == 0 || text.as_bytes()[pos - 1] == b' ';
        let boundary_after = end == text.len() || text.as_bytes()[end] == b' ';
        if boundary_before && boundary_after {
            return Some(pos);
        }
        search_from = pos + 1;
    }
    None
}

fn parse_scroll(t: &str) -> Option<ScrollDirection> {
    let mentions_top = t.contains("top of the page")
        || t.contains("top of page")
        || t.contains("go to the top")
        || t.contains("go to top");
    let mentions_bottom = t.contains("bottom of the page")
        || t.contains("bottom of page")
        || t.contains("go to the bottom")
        || t.contains("go to bottom");

    if !has_word(t, "scroll") && !mentions_top && !mentions_bottom {
        return None;
    }

    if mentions_top || has_word(t, "top") {
        return Some(ScrollDirection::Top);
    }
    if mentions_bottom || has_word(t, "bottom") {
        return Some(ScrollDirection::Bottom);
    }
    if has_word(t, "up") {
        return Some(ScrollDirection::Up);
    }
    // "scroll down" and bare "scroll"
    Some(ScrollDirection::Down)
}

fn parse_read_target(t: &str) -> (ReadTarget, Option<usize>) {
    if t.contains("selection") || t.contains("selected") || t.contains("highlighted") {
        return (ReadTarget::Selection, None);
    }
    if t.contains("paragraph") {
        // "read the third paragraph" - missing ordinal means the first one
        return (ReadTarget::Paragraph, Some(find_ordinal(t).unwrap_or(0)));
    }
    if has_word(t, "page") || has_word(t, "all") || has_word(t, "everything") || has_word(t, "article") {
        return (ReadTarget::Page, None);
    }
    // "read this" with no other anchor means the current selection
    if has_word(t, "this") {
        return (ReadTarget::Selection, None);
    }
    (ReadTarget::Page, None)
}

fn parse_click(t: &str) -> Command {
    // "open link that says contact" / "click the button with text submit"
    if let Some(text) = extract_after(t, &["that says", "with the text", "with text", "labeled"]) {
        return Command::click_text(text);
    }

    // "open link 3" / "click the second button"
    if let Some(index) = find_ordinal(t) {
        return Command::click_index(index);
    }

    // "click submit" / "press play" / "open the menu"
    if let Some(rest) = extract_after(t, &["click on", "click", "press", "open"]) {
        let label = strip_click_noise(&rest);
        if !label.is_empty() {
            return Command::click_text(label);
        }
    }

    Command::Unknown
}

/// Drop filler words so "the link" or "link that says" leaves a usable label
fn strip_click_noise(rest: &str) -> String {
    rest.split_whitespace()
        .filter(|w| !matches!(*w, "the" | "a" | "an" | "link" | "button" | "on"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_type(rest: &str) -> Command {
    // "type hello into the search box" splits into text and destination
    for separator in [" into ", " in "] {
        if let Some(pos) = rest.find(separator) {
            let text = rest[..pos].trim();
            let target = strip_click_noise(rest[pos + separator.len()..].trim());
            if !text.is_empty() {
                return Command::Type {
                    text: text.to_string(),
                    target: if target.is_empty() {
                        None
                    } else {
                        Some(target)
                    },
                };
            }
        }
    }
    Command::Type {
        text: rest.to_string(),
        target: None,
    }
}
