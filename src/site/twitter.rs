//! Twitter/X phrase table
//!
//! Both hostnames map to the same signature; the phrase table accepts
//! both "tweet" and "post" vocabulary.

use crate::command::fallback::{extract_after, has_word, normalize};
use crate::command::model::Command;
use crate::command::ordinal::find_ordinal;
use crate::site::{SiteSignature, SiteStrategy};

pub struct TwitterStrategy;

impl SiteStrategy for TwitterStrategy {
    fn name(&self) -> &'static str {
        "twitter"
    }

    fn matches(&self, signature: SiteSignature) -> bool {
        signature == SiteSignature::Twitter
    }

    fn try_handle(&self, transcript: &str) -> Option<Command> {
        let t = normalize(transcript);

        if t.contains("notifications") {
            return Some(Command::navigate_url("https://x.com/notifications"));
        }
        if t.contains("open messages") {
            return Some(Command::navigate_url("https://x.com/messages"));
        }
        if t.contains("compose") || t.contains("new tweet") || t.contains("new post") {
            return Some(Command::navigate_url("https://x.com/compose/post"));
        }

        if has_word(&t, "like") && mentions_tweet(&t) {
            return Some(Command::Click {
                by_text: Some("like".into()),
                which_index: find_ordinal(&t),
            });
        }

        if has_word(&t, "retweet") || has_word(&t, "repost") {
            return Some(Command::click_text("repost"));
        }

        if let Some(text) = extract_after(&t, &["reply with", "reply"]) {
            return Some(Command::Type {
                text,
                target: Some("reply".into()),
            });
        }

        if t.contains("post it") || t.contains("send tweet") || t.contains("send the tweet") {
            return Some(Command::click_text("post"));
        }

        None
    }
}

fn mentions_tweet(t: &str) -> bool {
    ["tweet", "tweets", "post", "posts"]
        .iter()
        .any(|w| has_word(t, w))
}
