//! Resolution ladders from command fields to concrete page targets
//!
//! Click and type commands arrive with fuzzy, speech-derived hints. The
//! ladders here turn those hints into one concrete element, field, or
//! text source - or a typed ExecutionError the executor converts into a
//! spoken failure.

use crate::command::model::ReadTarget;
use crate::core::config::config;
use crate::core::error::ExecutionError;
use crate::page::PageDom;

/// Resolve a click request to an element index
///
/// Candidate set = visible interactive elements in document order.
/// `by_text` narrows the pool by label, exact case-insensitive match
/// before substring match; `which_index` then selects a position within
/// whatever pool is left. With no text the pool is the whole candidate
/// set, so a bare index click is positional over everything visible.
pub fn resolve_element(
    page: &PageDom,
    by_text: Option<&str>,
    which_index: Option<usize>,
) -> Result<usize, ExecutionError> {
    let candidates = page.visible_interactive();

    let pool: Vec<usize> = match by_text {
        Some(text) => {
            let needle = text.to_lowercase();
            let exact: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&i| page.elements[i].label.to_lowercase() == needle)
                .collect();
            if !exact.is_empty() {
                exact
            } else {
                let partial: Vec<usize> = candidates
                    .iter()
                    .copied()
                    .filter(|&i| page.elements[i].label.to_lowercase().contains(&needle))
                    .collect();
                if partial.is_empty() {
                    return Err(ExecutionError::NoMatchingElement(text.to_string()));
                }
                partial
            }
        }
        None => candidates,
    };

    let index = which_index.unwrap_or(0);
    pool.get(index)
        .copied()
        .ok_or(ExecutionError::IndexOutOfRange {
            index,
            available: pool.len(),
        })
}

/// Resolve a type destination to a field index
///
/// Target hint substring match first, then the focused editable, then
/// the first editable in document order.
pub fn resolve_field(page: &PageDom, target: Option<&str>) -> Result<usize, ExecutionError> {
    if let Some(target) = target {
        let needle = target.to_lowercase();
        if let Some(i) = page
            .fields
            .iter()
            .position(|f| f.name.to_lowercase().contains(&needle))
        {
            return Ok(i);
        }
    }

    if let Some(i) = page.fields.iter().position(|f| f.focused) {
        return Ok(i);
    }

    if !page.fields.is_empty() {
        return Ok(0);
    }

    Err(ExecutionError::NoMatchingElement(
        target.unwrap_or("an editable field").to_string(),
    ))
}

/// Resolve the source text for read and summarize commands
pub fn resolve_read_source(
    page: &PageDom,
    target: ReadTarget,
    which_index: Option<usize>,
) -> Result<String, ExecutionError> {
    match target {
        ReadTarget::Selection => page
            .selection
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ExecutionError::EmptySource("no text is selected".into())),

        ReadTarget::Paragraph => {
            let paragraphs = page.qualifying_paragraphs(config().paragraph_min_chars);
            let index = which_index.unwrap_or(0);
            paragraphs
                .get(index)
                .map(|p| p.text.clone())
                .ok_or(ExecutionError::IndexOutOfRange {
                    index,
                    available: paragraphs.len(),
                })
        }

        ReadTarget::Page => {
            let text = page.primary_text(config().page_text_min_chars);
            if text.trim().is_empty() {
                Err(ExecutionError::EmptySource(
                    "the page has no readable text".into(),
                ))
            } else {
                Ok(text)
            }
        }
    }
}

/// Cap text for speech synthesis
///
/// Anything longer should have been a summarize command.
pub fn clip_for_speech(text: &str) -> String {
    text.chars().take(config().read_char_cap).collect()
}
