//! Spoken ordinal and digit resolution
//!
//! Voice input is 1-based ("the first link"); every index in the command
//! model is 0-based. All conversion happens here and nowhere else.

/// Convert one spoken token to a zero-based index
///
/// Accepts ordinal words ("first".."tenth"), suffixed forms ("1st", "22nd")
/// and bare digits ("12"). Returns None for anything else, including zero.
pub fn ordinal_to_index(token: &str) -> Option<usize> {
    const WORDS: [(&str, usize); 10] = [
        ("first", 1),
        ("second", 2),
        ("third", 3),
        ("fourth", 4),
        ("fifth", 5),
        ("sixth", 6),
        ("seventh", 7),
        ("eighth", 8),
        ("ninth", 9),
        ("tenth", 10),
    ];

    let token = token.trim().to_lowercase();

    for (word, n) in WORDS {
        if token == word {
            return Some(n - 1);
        }
    }

    // "1st", "2nd", "3rd", "4th"... and bare digits
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || digits.len() != token.len() {
        let rest = &token[digits.len()..];
        if !matches!(rest, "st" | "nd" | "rd" | "th") {
            return None;
        }
    }
    let n: usize = digits.parse().ok()?;
    if n == 0 {
        return None;
    }
    Some(n - 1)
}

/// Find the first ordinal-like token in a phrase
///
/// "open the third video" -> Some(2). Scans whitespace-separated tokens.
pub fn find_ordinal(text: &str) -> Option<usize> {
    text.split_whitespace().find_map(ordinal_to_index)
}
