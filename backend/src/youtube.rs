//! YouTube id extraction for admin video submissions.
//!
//! Admins paste whatever they have on the clipboard: a bare id, a
//! `watch?v=` URL, a `youtu.be` short link or an embed URL. Only the
//! id is stored.

use url::Url;

/// Pulls the video id out of a bare id or any common YouTube URL
/// form. Returns `None` when no plausible id is found.
pub fn extract_youtube_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if is_plausible_id(trimmed) {
        return Some(trimmed.to_string());
    }

    let parsed = Url::parse(trimmed).ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.");

    let candidate = match host {
        "youtu.be" => parsed.path_segments()?.next().map(str::to_string),
        "youtube.com" | "m.youtube.com" | "youtube-nocookie.com" => {
            let mut segments = parsed.path_segments()?;
            match segments.next() {
                Some("watch") => parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("embed") | Some("shorts") | Some("v") => {
                    segments.next().map(str::to_string)
                },
                _ => None,
            }
        },
        _ => None,
    };

    candidate.filter(|id| is_plausible_id(id))
}

fn is_plausible_id(candidate: &str) -> bool {
    (6..=20).contains(&candidate.len())
        && candidate
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::extract_youtube_id;

    #[test]
    fn accepts_a_bare_id() {
        assert_eq!(
            extract_youtube_id("dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn extracts_from_watch_urls() {
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn extracts_from_short_links_and_embeds() {
        assert_eq!(
            extract_youtube_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/embed/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/shorts/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn rejects_foreign_hosts_and_garbage() {
        assert_eq!(extract_youtube_id("https://vimeo.com/12345678"), None);
        assert_eq!(extract_youtube_id("not a video at all"), None);
        assert_eq!(extract_youtube_id(""), None);
        assert_eq!(extract_youtube_id("https://www.youtube.com/"), None);
    }
}
