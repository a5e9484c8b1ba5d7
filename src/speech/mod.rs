//! Single-slot spoken-output channel
//!
//! At most one utterance is ever active: speaking always cancels whatever
//! is queued or playing first (last-write-wins, depth 1). The slot is an
//! owned resource shared by handle, never free-floating global state.

use std::sync::Mutex;

use crate::core::config::config;

/// A synthesis voice offered by the host
#[derive(Debug, Clone)]
pub struct Voice {
    pub id: String,
    pub name: String,
    /// BCP 47 tag, e.g. "en-US"
    pub language: String,
}

/// One spoken feedback line
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub voice_id: Option<String>,
    pub rate: f32,
}

/// Known good voices, tried in order before any language fallback
const PREFERRED_VOICES: [&str; 4] = [
    "Google US English",
    "Samantha",
    "Microsoft Zira",
    "Daniel",
];

#[derive(Debug, Default)]
struct SpeechState {
    catalog: Vec<Voice>,
    selected: Option<String>,
    active: Option<Utterance>,
    spoken: u64,
    cancelled: u64,
}

/// The spoken-output channel
#[derive(Debug, Default)]
pub struct SpeechFeedback {
    state: Mutex<SpeechState>,
}

impl SpeechFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Vec<Voice>) -> Self {
        let feedback = Self::new();
        feedback.set_catalog(catalog);
        feedback
    }

    /// Replace the voice catalog and re-select
    ///
    /// Hosts signal catalog changes at unpredictable times (voices load
    /// lazily); selection must follow the catalog, not initialization
    /// order.
    pub fn set_catalog(&self, catalog: Vec<Voice>) {
        let mut state = self.lock();
        state.selected = select_voice(&catalog, &config().speech_language);
        state.catalog = catalog;
    }

    /// Speak a line, cancelling any active utterance first
    pub fn speak(&self, text: &str) {
        self.speak_as(text, None);
    }

    /// Speak a line with an explicit voice override
    pub fn speak_as(&self, text: &str, voice_override: Option<&str>) {
        let mut state = self.lock();
        if state.active.take().is_some() {
            state.cancelled += 1;
        }
        let voice_id = voice_override
            .map(str::to_string)
            .or_else(|| state.selected.clone());
        state.active = Some(Utterance {
            text: text.to_string(),
            language: config().speech_language.clone(),
            voice_id,
            rate: config().speech_rate,
        });
        state.spoken += 1;
    }

    /// Cancel the active utterance, if any. Idempotent.
    pub fn cancel(&self) {
        let mut state = self.lock();
        if state.active.take().is_some() {
            state.cancelled += 1;
        }
    }

    /// The currently active utterance
    pub fn active(&self) -> Option<Utterance> {
        self.lock().active.clone()
    }

    /// The id of the currently selected voice
    pub fn selected_voice(&self) -> Option<String> {
        self.lock().selected.clone()
    }

    pub fn spoken_count(&self) -> u64 {
        self.lock().spoken
    }

    pub fn cancelled_count(&self) -> u64 {
        self.lock().cancelled
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SpeechState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Pick a voice: known names first, then language match, then anything
fn select_voice(catalog: &[Voice], language: &str) -> Option<String> {
    for preferred in PREFERRED_VOICES {
        if let Some(voice) = catalog
            .iter()
            .find(|v| v.name.to_lowercase().contains(&preferred.to_lowercase()))
        {
            return Some(voice.id.clone());
        }
    }

    // Primary subtag match: "en-US" accepts "en-GB" before giving up
    let primary = language.split('-').next().unwrap_or(language);
    if let Some(voice) = catalog.iter().find(|v| {
        v.language.split('-').next().unwrap_or(&v.language) == primary
    }) {
        return Some(voice.id.clone());
    }

    catalog.first().map(|v| v.id.clone())
}
