//! Instagram phrase table

use crate::command::fallback::{extract_after, has_word, normalize};
use crate::command::model::Command;
use crate::command::ordinal::find_ordinal;
use crate::site::{SiteSignature, SiteStrategy};

pub struct InstagramStrategy;

impl SiteStrategy for InstagramStrategy {
    fn name(&self) -> &'static str {
        "instagram"
    }

    fn matches(&self, signature: SiteSignature) -> bool {
        signature == SiteSignature::Instagram
    }

    fn try_handle(&self, transcript: &str) -> Option<Command> {
        let t = normalize(transcript);

        if t.contains("open reels") || t.contains("show reels") {
            return Some(Command::navigate_url("https://www.instagram.com/reels/"));
        }
        if t.contains("open messages") || t.contains("open direct") {
            return Some(Command::navigate_url(
                "https://www.instagram.com/direct/inbox/",
            ));
        }
        if t.contains("open explore") {
            return Some(Command::navigate_url("https://www.instagram.com/explore/"));
        }

        if has_word(&t, "like") && (has_word(&t, "post") || has_word(&t, "posts")) {
            return Some(Command::Click {
                by_text: Some("like".into()),
                which_index: find_ordinal(&t),
            });
        }

        if let Some(text) = extract_after(&t, &["comment"]) {
            return Some(Command::Type {
                text,
                target: Some("comment".into()),
            });
        }

        if t.contains("post it") || has_word(&t, "share") {
            return Some(Command::click_text("post"));
        }

        None
    }
}
