//! YouTube URL validation

use regex::Regex;
use std::sync::OnceLock;

const YOUTUBE_URL: &str = r"(?x)
    ^(?:https?://)?
    (?:
        (?:(?:www|m|music)\.)?youtube\.com/
        (?:
            watch\?(?:[^\s\#]*&)?v=[A-Za-z0-9_-]+
          | (?:shorts|live|embed)/[A-Za-z0-9_-]+
        )
      | youtu\.be/[A-Za-z0-9_-]+
    )
    (?:[?&\#/]\S*)?$
";

fn youtube_url() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(YOUTUBE_URL).ok()).as_ref()
}

/// Check that a string looks like a YouTube video URL.
///
/// Surrounding whitespace is ignored; anything else that does not match a
/// known watch, shorts, live, embed or youtu.be shape is rejected.
pub fn validate(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && youtube_url().is_some_and(|re| re.is_match(url))
}
