use std::sync::LazyLock;

use regex::Regex;
use url::form_urlencoded;

use crate::types::Clip;

pub const VIDEO_ID_LEN: usize = 11;

const EMBED_BASE_URL: &str = "https://www.youtube.com/embed/";

// Greedy prefix: the last recognised link shape wins, the id runs to the next `#`, `&` or `?`.
static VIDEO_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu.be/|v/|u/[A-Za-z0-9_]/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .expect("video id pattern is valid")
});

/// Extract the 11-character video identifier from a YouTube link.
///
/// Accepts `youtu.be/<id>`, `/v/<id>`, `/u/<x>/<id>`, `/embed/<id>`, `watch?v=<id>` and
/// `&v=<id>` shapes. Returns `None` when the token after the prefix is not exactly
/// 11 characters long.
pub fn extract_video_id(input: &str) -> Option<String> {
    let captures = VIDEO_ID_PATTERN.captures(input)?;
    let id = captures.get(2)?.as_str();
    (id.chars().count() == VIDEO_ID_LEN).then(|| id.to_string())
}

/// Embeddable player URL; with an active clip the player starts, stops and loops on it.
pub fn embed_url(video_id: &str, active_clip: Option<&Clip>) -> String {
    let mut params = vec![
        ("autoplay", "1".to_string()),
        ("rel", "0".to_string()),
        ("modestbranding", "1".to_string()),
    ];

    if let Some(clip) = active_clip {
        if let Some(start) = clip.start_seconds() {
            params.push(("start", whole_seconds(start)));
        }
        if let Some(end) = clip.end_seconds() {
            params.push(("end", whole_seconds(end)));
        }
        params.push(("loop", "1".to_string()));
        params.push(("playlist", video_id.to_string()));
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{EMBED_BASE_URL}{video_id}?{query}")
}

fn whole_seconds(seconds: f64) -> String {
    format!("{}", seconds.floor() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn recognises_every_link_shape() {
        let links = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=30",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ?version=3",
            "https://www.youtube.com/u/w/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ#comments",
            "youtu.be/dQw4w9WgXcQ",
        ];

        for link in links {
            assert_eq!(extract_video_id(link).as_deref(), Some(ID), "link: {link}");
        }
    }

    #[test]
    fn rejects_input_without_token() {
        let inputs = [
            "",
            "not a url",
            "https://example.com/",
            "https://www.youtube.com/",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQX",
            "https://youtu.be/",
        ];

        for input in inputs {
            assert_eq!(extract_video_id(input), None, "input: {input}");
        }
    }

    #[test]
    fn last_prefix_wins() {
        // `v/` inside the path is shadowed by the later `watch?v=`.
        assert_eq!(
            extract_video_id("https://host/v/aaaaaaaaaaa/watch?v=bbbbbbbbbbb").as_deref(),
            Some("bbbbbbbbbbb")
        );
    }

    #[test]
    fn embed_url_without_clip() {
        assert_eq!(
            embed_url(ID, None),
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&rel=0&modestbranding=1"
        );
    }

    #[test]
    fn embed_url_loops_active_clip() {
        let clip = Clip::new(10.9, 20.2, "", "");
        assert_eq!(
            embed_url(ID, Some(&clip)),
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&rel=0&modestbranding=1\
             &start=10&end=20&loop=1&playlist=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn embed_url_skips_non_numeric_bounds() {
        let clip = Clip::from_value(&serde_json::json!({"start": "12", "end": "outro"}));
        assert_eq!(
            embed_url(ID, Some(&clip)),
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&rel=0&modestbranding=1\
             &start=12&loop=1&playlist=dQw4w9WgXcQ"
        );
    }
}
