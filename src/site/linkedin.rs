//! LinkedIn phrase table
//!
//! Feed interaction (like, comment, publish) and section navigation.

use crate::command::fallback::{extract_after, has_word, normalize};
use crate::command::model::Command;
use crate::command::ordinal::find_ordinal;
use crate::site::{SiteSignature, SiteStrategy};

pub struct LinkedinStrategy;

impl SiteStrategy for LinkedinStrategy {
    fn name(&self) -> &'static str {
        "linkedin"
    }

    fn matches(&self, signature: SiteSignature) -> bool {
        signature == SiteSignature::Linkedin
    }

    fn try_handle(&self, transcript: &str) -> Option<Command> {
        let t = normalize(transcript);

        if t.contains("notifications") {
            return Some(Command::navigate_url(
                "https://www.linkedin.com/notifications/",
            ));
        }
        if t.contains("my network") {
            return Some(Command::navigate_url("https://www.linkedin.com/mynetwork/"));
        }
        if t.contains("open messages") || t.contains("open messaging") {
            return Some(Command::navigate_url("https://www.linkedin.com/messaging/"));
        }
        if t.contains("start a post") {
            return Some(Command::click_text("start a post"));
        }

        // "like the second post" filters like-labeled elements, then
        // indexes into them
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
        if has_word(&t, "comment") {
            return Some(Command::click_text("comment"));
        }

        if t.contains("post it") || has_word(&t, "publish") {
            return Some(Command::click_text("post"));
        }
        if has_word(&t, "connect") {
            return Some(Command::click_text("connect"));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_nth_post() {
        assert_eq!(
            LinkedinStrategy.try_handle("like the second post"),
            Some(Command::Click {
                by_text: Some("like".into()),
                which_index: Some(1),
            })
        );
        assert_eq!(
            LinkedinStrategy.try_handle("like the post"),
            Some(Command::Click {
                by_text: Some("like".into()),
                which_index: None,
            })
        );
    }

    #[test]
    fn test_comment_flow() {
        assert_eq!(
            LinkedinStrategy.try_handle("comment great write-up"),
            Some(Command::Type {
                text: "great write-up".into(),
                target: Some("comment".into()),
            })
        );
        assert_eq!(
            LinkedinStrategy.try_handle("post it"),
            Some(Command::click_text("post"))
        );
    }

    #[test]
    fn test_section_navigation() {
        assert_eq!(
            LinkedinStrategy.try_handle("open notifications"),
            Some(Command::navigate_url(
                "https://www.linkedin.com/notifications/"
            ))
        );
        assert_eq!(
            LinkedinStrategy.try_handle("open my network"),
            Some(Command::navigate_url("https://www.linkedin.com/mynetwork/"))
        );
    }

    #[test]
    fn test_unrelated_transcripts_fall_through() {
        assert_eq!(LinkedinStrategy.try_handle("scroll down"), None);
        assert_eq!(LinkedinStrategy.try_handle("go back"), None);
    }
}
