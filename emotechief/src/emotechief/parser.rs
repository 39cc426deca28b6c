//! Emote link extraction from free-form redemption input.

use std::sync::LazyLock;

use emote_db::RewardType;
use regex::Regex;

const EMOTE_ID_LEN: usize = 24;

static RE_SEVENTV_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://(?:www\.)?7tv\.app/emotes/").unwrap());
static RE_BTTV_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://(?:www\.)?betterttv\.com/emotes/").unwrap());

fn link_pattern(provider: RewardType) -> &'static Regex {
    match provider {
        RewardType::Seventv => &RE_SEVENTV_LINK,
        RewardType::Bttv => &RE_BTTV_LINK,
    }
}

/// The id segment runs until the first character that cannot be part of it,
/// so trailing punctuation such as `,` `.` `)` or `!` ends it.
fn is_terminator(c: char) -> bool {
    !c.is_ascii_alphanumeric()
}

/// Return the emote id from the first `provider` emote link in `message`.
///
/// Only the first link counts: if its id segment is not exactly 24 hex
/// characters the result is `None`, even when a later link is valid.
pub fn extract_emote_id(message: &str, provider: RewardType) -> Option<&str> {
    let link = link_pattern(provider).find(message)?;
    let rest = &message[link.end()..];
    let end = rest.find(is_terminator).unwrap_or(rest.len());
    let id = &rest[..end];

    if id.len() == EMOTE_ID_LEN && id.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(id)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_seventv_id_in_message() {
        let cases = [
            (
                "some message https://7tv.app/emotes/60ccf4479f5edeff9938fa77 some more message",
                Some("60ccf4479f5edeff9938fa77"),
            ),
            (
                "https://7tv.app/emotes/60aed4fe423a803ccae373d3",
                Some("60aed4fe423a803ccae373d3"),
            ),
            ("some message", None),
        ];
        for (message, expected) in cases {
            assert_eq!(extract_emote_id(message, RewardType::Seventv), expected, "{message}");
        }
    }

    #[test]
    fn finds_bttv_id_with_www_and_trailing_path() {
        assert_eq!(
            extract_emote_id(
                "pls add https://www.betterttv.com/emotes/5f1b0186cf6d2144653d2970/ thx",
                RewardType::Bttv
            ),
            Some("5f1b0186cf6d2144653d2970")
        );
        assert_eq!(
            extract_emote_id(
                "http://betterttv.com/emotes/5f1b0186cf6d2144653d2970?ref=x",
                RewardType::Bttv
            ),
            Some("5f1b0186cf6d2144653d2970")
        );
    }

    #[test]
    fn punctuation_after_the_id_ends_it() {
        for message in [
            "add https://7tv.app/emotes/60aed4fe423a803ccae373d3, thanks",
            "(https://7tv.app/emotes/60aed4fe423a803ccae373d3)",
            "https://7tv.app/emotes/60aed4fe423a803ccae373d3!",
            "https://7tv.app/emotes/60aed4fe423a803ccae373d3.",
        ] {
            assert_eq!(
                extract_emote_id(message, RewardType::Seventv),
                Some("60aed4fe423a803ccae373d3"),
                "{message}"
            );
        }
    }

    #[test]
    fn provider_links_do_not_cross_match() {
        let seventv = "https://7tv.app/emotes/60aed4fe423a803ccae373d3";
        assert_eq!(extract_emote_id(seventv, RewardType::Bttv), None);
        let bttv = "https://betterttv.com/emotes/5f1b0186cf6d2144653d2970";
        assert_eq!(extract_emote_id(bttv, RewardType::Seventv), None);
    }

    #[test]
    fn malformed_ids_are_not_found() {
        for message in [
            "https://7tv.app/emotes/",
            "https://7tv.app/emotes/ 60aed4fe423a803ccae373d3",
            "https://7tv.app/emotes/60aed4fe423a803ccae373d",
            "https://7tv.app/emotes/60aed4fe423a803ccae373d3a",
            "https://7tv.app/emotes/60aed4fe423a803ccae373zz",
        ] {
            assert_eq!(extract_emote_id(message, RewardType::Seventv), None, "{message}");
        }
    }

    #[test]
    fn only_first_link_is_used() {
        let message = "https://7tv.app/emotes/bad https://7tv.app/emotes/60aed4fe423a803ccae373d3";
        assert_eq!(extract_emote_id(message, RewardType::Seventv), None);

        let message = "https://7tv.app/emotes/60ccf4479f5edeff9938fa77 https://7tv.app/emotes/60aed4fe423a803ccae373d3";
        assert_eq!(
            extract_emote_id(message, RewardType::Seventv),
            Some("60ccf4479f5edeff9938fa77")
        );
    }

    #[test]
    fn extraction_is_deterministic() {
        let message = "look https://7tv.app/emotes/60aed4fe423a803ccae373d3#top";
        let first = extract_emote_id(message, RewardType::Seventv);
        for _ in 0..3 {
            assert_eq!(extract_emote_id(message, RewardType::Seventv), first);
        }
        assert_eq!(first, Some("60aed4fe423a803ccae373d3"));
    }
}
