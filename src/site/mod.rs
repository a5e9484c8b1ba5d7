//! Per-website command specialization
//!
//! Some spoken requests only make sense on a particular site ("open
//! shorts", "like the second post"). Each strategy owns a small phrase
//! table scoped to one site's conventions and compiles matches down to
//! ordinary Commands - strategies never execute anything themselves.
//!
//! The registry is consulted before the translators: the first strategy
//! that consumes the transcript wins, and the Generic terminal strategy
//! intercepts nothing.

pub mod generic;
pub mod instagram;
pub mod linkedin;
pub mod twitter;
pub mod youtube;

pub use generic::GenericStrategy;
pub use instagram::InstagramStrategy;
pub use linkedin::LinkedinStrategy;
pub use twitter::TwitterStrategy;
pub use youtube::YoutubeStrategy;

use crate::command::model::Command;

/// Which site family the active document belongs to
///
/// Derived from the document URL for every command, never cached: the
/// active page can change between any two commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteSignature {
    Youtube,
    Linkedin,
    Instagram,
    Twitter,
    Generic,
}

impl SiteSignature {
    /// Classify a document URL by substring match
    pub fn from_url(url: &str) -> Self {
        let url = url.to_lowercase();
        if url.contains("youtube.com") || url.contains("youtu.be") {
            Self::Youtube
        } else if url.contains("linkedin.com") {
            Self::Linkedin
        } else if url.contains("instagram.com") {
            Self::Instagram
        } else if url.contains("twitter.com")
            || url.contains("://x.com")
            || url.contains("www.x.com")
        {
            Self::Twitter
        } else {
            Self::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Linkedin => "linkedin",
            Self::Instagram => "instagram",
            Self::Twitter => "twitter",
            Self::Generic => "generic",
        }
    }
}

/// A per-site command recognizer
pub trait SiteStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Does this strategy apply to the given site?
    fn matches(&self, signature: SiteSignature) -> bool;

    /// Consume the transcript if it names one of this site's phrases
    fn try_handle(&self, transcript: &str) -> Option<Command>;
}

/// Ordered strategy list, Generic last
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn SiteStrategy>>,
}

impl StrategyRegistry {
    /// The standard registry: all site strategies, Generic terminal
    pub fn standard() -> Self {
        Self {
            strategies: vec![
                Box::new(YoutubeStrategy),
                Box::new(LinkedinStrategy),
                Box::new(InstagramStrategy),
                Box::new(TwitterStrategy),
                Box::new(GenericStrategy),
            ],
        }
    }

    /// Offer the transcript to each applicable strategy in order
    ///
    /// Returns the compiled command and the consuming strategy's name,
    /// or None when every strategy (including Generic) declined.
    pub fn intercept(&self, url: &str, transcript: &str) -> Option<(Command, &'static str)> {
        let signature = SiteSignature::from_url(url);
        for strategy in &self.strategies {
            if !strategy.matches(signature) {
                continue;
            }
            if let Some(command) = strategy.try_handle(transcript) {
                tracing::debug!(
                    "site strategy {} consumed transcript as {}",
                    strategy.name(),
                    command.name()
                );
                return Some((command, strategy.name()));
            }
        }
        None
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
