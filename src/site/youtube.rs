//! YouTube phrase table
//!
//! Covers the requests people actually speak on YouTube: section
//! navigation, player control, and picking a video by position.

use crate::command::fallback::{has_word, normalize};
use crate::command::model::Command;
use crate::command::ordinal::find_ordinal;
use crate::site::{SiteSignature, SiteStrategy};

pub struct YoutubeStrategy;

impl SiteStrategy for YoutubeStrategy {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn matches(&self, signature: SiteSignature) -> bool {
        signature == SiteSignature::Youtube
    }

    fn try_handle(&self, transcript: &str) -> Option<Command> {
        let t = normalize(transcript);

        if t.contains("open shorts") || t.contains("show shorts") {
            return Some(Command::navigate_url("https://www.youtube.com/shorts"));
        }
        if t.contains("subscriptions") {
            return Some(Command::navigate_url(
                "https://www.youtube.com/feed/subscriptions",
            ));
        }
        if t.contains("open history") || t.contains("watch history") {
            return Some(Command::navigate_url(
                "https://www.youtube.com/feed/history",
            ));
        }

        // "open the third video" before player control, so the ordinal is
        // not shadowed by the play rule
        if t.contains("video") {
            if let Some(index) = find_ordinal(&t) {
                return Some(Command::click_index(index));
            }
        }

        if has_word(&t, "dislike") {
            return Some(Command::click_text("dislike"));
        }
        if has_word(&t, "like") && t.contains("video") {
            return Some(Command::click_text("like"));
        }
        if has_word(&t, "subscribe") {
            return Some(Command::click_text("subscribe"));
        }
        if has_word(&t, "pause") && t.contains("video") {
            return Some(Command::click_text("pause"));
        }
        if has_word(&t, "play") && t.contains("video") {
            return Some(Command::click_text("play"));
        }

        None
    }
}
