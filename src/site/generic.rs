//! Terminal strategy: no site-specific interception

use crate::command::model::Command;
use crate::site::{SiteSignature, SiteStrategy};

/// The end of the strategy chain
///
/// Matches every site and consumes nothing, so an unconsumed transcript
/// always falls through to the translators with no special casing at the
/// call site.
pub struct GenericStrategy;

impl SiteStrategy for GenericStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn matches(&self, _signature: SiteSignature) -> bool {
        true
    }

    fn try_handle(&self, _transcript: &str) -> Option<Command> {
        None
    }
}
