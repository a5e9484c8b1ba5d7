//! Pipeline configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use std::path::Path;

/// Configuration for the command pipeline
///
/// These values have been tuned against real pages and real speech input.
/// Changing them will affect how commands feel to a voice user.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // === SCROLLING ===
    /// Fraction of the viewport height covered by one scroll command
    ///
    /// At 0.8, consecutive "scroll down" commands overlap by 20% so the
    /// listener keeps visual continuity between screens. 1.0 would lose
    /// the last lines of each screen; small values make scrolling tedious.
    pub scroll_fraction: f32,

    // === CLICKING ===
    /// Delay between highlighting a matched element and activating it (ms)
    ///
    /// The highlight exists so the user can see what is about to be
    /// activated before the side effect happens. Below ~200ms the flash is
    /// not perceivable; above ~1000ms the pipeline feels unresponsive.
    pub highlight_delay_ms: u64,

    // === READING ===
    /// Maximum characters spoken for a single read command
    ///
    /// Speech synthesis of 2000 characters already runs over a minute.
    /// Longer content should be summarized, not read.
    pub read_char_cap: usize,

    /// Minimum characters for a block to count as a real paragraph
    ///
    /// Filters out one-line captions, timestamps and button labels when
    /// resolving "read the third paragraph".
    pub paragraph_min_chars: usize,

    /// Minimum characters for extracted page text to be trusted
    ///
    /// If the semantic containers and paragraph join produce less than
    /// this, the page is assumed to hide its content behind markup we
    /// don't recognize and the whole document text is used instead.
    pub page_text_min_chars: usize,

    // === SUMMARIZATION ===
    /// Minimum characters of source text required to request a summary
    ///
    /// Below this the summary would be longer than the source.
    pub summary_min_chars: usize,

    /// Maximum characters of source text sent to the summarization service
    ///
    /// Bounds request size and cost for very long articles.
    pub summary_input_cap: usize,

    // === TRANSLATION ===
    /// Seconds to wait for the AI translator before falling back
    ///
    /// A hung translation must degrade to the deterministic parser, not
    /// stall the pipeline. Order of seconds: long enough for a normal
    /// completion round trip, short enough that the user notices only a
    /// pause, not a failure.
    pub translation_timeout_secs: u64,

    // === SPEECH ===
    /// BCP 47 language tag used for spoken feedback
    pub speech_language: String,

    /// Speech rate multiplier (1.0 = the voice's natural rate)
    pub speech_rate: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            // Scrolling
            scroll_fraction: 0.8,

            // Clicking
            highlight_delay_ms: 400,

            // Reading
            read_char_cap: 2000,
            paragraph_min_chars: 20,
            page_text_min_chars: 100,

            // Summarization
            summary_min_chars: 40,
            summary_input_cap: 6000,

            // Translation
            translation_timeout_secs: 8,

            // Speech
            speech_language: "en-US".to_string(),
            speech_rate: 1.0,
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.scroll_fraction <= 0.0 || self.scroll_fraction > 1.0 {
            return Err(format!(
                "scroll_fraction ({}) must be in (0.0, 1.0]",
                self.scroll_fraction
            ));
        }

        // A read cap below the page-text threshold would truncate even
        // minimal extractions
        if self.read_char_cap < self.page_text_min_chars {
            return Err(format!(
                "read_char_cap ({}) should be >= page_text_min_chars ({})",
                self.read_char_cap, self.page_text_min_chars
            ));
        }

        if self.summary_min_chars > self.summary_input_cap {
            return Err(format!(
                "summary_min_chars ({}) should be <= summary_input_cap ({})",
                self.summary_min_chars, self.summary_input_cap
            ));
        }

        if self.translation_timeout_secs == 0 {
            return Err("translation_timeout_secs must be positive".into());
        }

        if self.speech_rate <= 0.0 || self.speech_rate > 4.0 {
            return Err(format!(
                "speech_rate ({}) must be in (0.0, 4.0]",
                self.speech_rate
            ));
        }

        Ok(())
    }

    /// Load a config from a TOML file, using defaults for missing keys
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content)
    }

    /// Parse a config from TOML content, using defaults for missing keys
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let toml: toml::Value = content
            .parse()
            .map_err(|e| format!("Invalid TOML: {}", e))?;

        let mut config = Self::default();

        if let Some(pipeline) = toml.get("pipeline").and_then(|v| v.as_table()) {
            if let Some(v) = pipeline.get("scroll_fraction").and_then(|v| v.as_float()) {
                config.scroll_fraction = v as f32;
            }
            if let Some(v) = pipeline.get("highlight_delay_ms").and_then(|v| v.as_integer()) {
                config.highlight_delay_ms = v as u64;
            }
            if let Some(v) = pipeline.get("read_char_cap").and_then(|v| v.as_integer()) {
                config.read_char_cap = v as usize;
            }
            if let Some(v) = pipeline.get("paragraph_min_chars").and_then(|v| v.as_integer()) {
                config.paragraph_min_chars = v as usize;
            }
            if let Some(v) = pipeline.get("page_text_min_chars").and_then(|v| v.as_integer()) {
                config.page_text_min_chars = v as usize;
            }
            if let Some(v) = pipeline.get("summary_min_chars").and_then(|v| v.as_integer()) {
                config.summary_min_chars = v as usize;
            }
            if let Some(v) = pipeline.get("summary_input_cap").and_then(|v| v.as_integer()) {
                config.summary_input_cap = v as usize;
            }
            if let Some(v) = pipeline
                .get("translation_timeout_secs")
                .and_then(|v| v.as_integer())
            {
                config.translation_timeout_secs = v as u64;
            }
        }

        if let Some(speech) = toml.get("speech").and_then(|v| v.as_table()) {
            if let Some(v) = speech.get("language").and_then(|v| v.as_str()) {
                config.speech_language = v.to_string();
            }
            if let Some(v) = speech.get("rate").and_then(|v| v.as_float()) {
                config.speech_rate = v as f32;
            }
        }

        config.validate()?;
        Ok(config)
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<PipelineConfig> = OnceLock::new();

/// Get the global pipeline config (initializes with defaults if not set)
pub fn config() -> &'static PipelineConfig {
    CONFIG.get_or_init(PipelineConfig::default)
}

/// Set the global pipeline config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: PipelineConfig) -> Result<(), PipelineConfig> {
    CONFIG.set(config)
}
