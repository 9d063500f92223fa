//! Output file naming

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Byte budget for a stem; leaves room for " (n).mp3" under the 255-byte NAME_MAX
const MAX_STEM_BYTES: usize = 200;

/// Sanitize filename for filesystem
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => ' ',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .trim_end_matches('.')
        .trim()
        .to_string()
}

/// Pick the file stem for a job's MP3: the title, else the video id, else a fresh id
pub fn output_stem(title: Option<&str>, video_id: Option<&str>) -> String {
    [title, video_id]
        .into_iter()
        .flatten()
        .map(|s| truncate_bytes(&sanitize_filename(s), MAX_STEM_BYTES))
        .find(|s| !s.is_empty() && s.chars().any(|c| c != '_'))
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}

/// Cut `s` to at most `max` bytes without splitting a character
fn truncate_bytes(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let end = (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0);
    s[..end].trim_end().trim_end_matches('.').trim_end().to_string()
}

/// `<dir>/<stem>.mp3`, or `<dir>/<stem> (n).mp3` if earlier names are taken
pub fn unique_output_path(dir: &Path, stem: &str) -> PathBuf {
    let first = dir.join(format!("{}.mp3", stem));
    if !first.exists() {
        return first;
    }

    (1u32..)
        .map(|n| dir.join(format!("{} ({}).mp3", stem, n)))
        .find(|p| !p.exists())
        .unwrap_or(first)
}
