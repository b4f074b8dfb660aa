//! Validation of free-text model output into an [`AnalysisResult`].

use serde_json::Value;
use tracing::warn;

use crate::{error::ResponseFormatError, types::AnalysisResult};

const FENCE: &str = "```";

/// Parse raw model text into an analysis result.
///
/// Surrounding whitespace and an optional code fence (with or without a language tag) are
/// removed first. Only the shape of `clips` is checked; individual clip fields are read
/// leniently.
pub fn parse(raw: &str) -> Result<AnalysisResult, ResponseFormatError> {
    let text = strip_code_fence(raw.trim());

    let value: Value = serde_json::from_str(text).map_err(|e| {
        warn!(error = %e, raw = %raw, "model response is not valid JSON");
        ResponseFormatError::NotJson(e)
    })?;

    if !matches!(value.get("clips"), Some(Value::Array(_))) {
        warn!(raw = %raw, "model response has no clips array");
        return Err(ResponseFormatError::MalformedClips);
    }

    serde_json::from_value(value).map_err(|_| ResponseFormatError::MalformedClips)
}

/// Remove a leading fence with its optional tag and a trailing fence. Text that does not
/// start with a fence is returned as is.
pub fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || "_-+.".contains(c));
    let rest = rest.trim_end();
    rest.strip_suffix(FENCE).unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let result = parse(
            r#"{"clips":[{"start":10,"end":20,"title":"T","description":"D"}],"peakMoment":"P"}"#,
        )
        .unwrap();
        assert_eq!(result.clips.len(), 1);
        assert_eq!(result.clips[0].title_text(), "T");
        assert_eq!(result.peak_moment.as_deref(), Some("P"));
    }

    #[test]
    fn strips_tagged_and_untagged_fences() {
        let inputs = [
            "```json\n{\"clips\":[{\"start\":10,\"end\":20,\"title\":\"T\",\"description\":\"D\"}]}\n```",
            "```JSON\n{\"clips\":[{\"start\":10,\"end\":20,\"title\":\"T\",\"description\":\"D\"}]}```",
            "```\n{\"clips\":[{\"start\":10,\"end\":20,\"title\":\"T\",\"description\":\"D\"}]}\n```",
            "  ```{\"clips\":[{\"start\":10,\"end\":20,\"title\":\"T\",\"description\":\"D\"}]}```  \n",
        ];

        for input in inputs {
            let result = parse(input).unwrap_or_else(|e| panic!("{input:?}: {e}"));
            assert_eq!(result.clips.len(), 1);
            assert_eq!(result.clips[0].start_seconds(), Some(10.0));
        }
    }

    #[test]
    fn keeps_clip_order_and_length() {
        let result = parse(
            r#"{"clips":[{"title":"a"},{"title":"b"},7,{"title":"c"}]}"#,
        )
        .unwrap();
        let titles: Vec<_> = result.clips.iter().map(|c| c.title_text()).collect();
        assert_eq!(titles, ["a", "b", "", "c"]);
    }

    #[test]
    fn empty_clips_are_valid() {
        let result = parse(r#"{"clips":[]}"#).unwrap();
        assert!(result.clips.is_empty());
    }

    #[test]
    fn rejects_invalid_json() {
        for input in ["not json at all", "", "```json\n{\"clips\": [\n```", "{\"clips\": [}"] {
            assert!(
                matches!(parse(input), Err(ResponseFormatError::NotJson(_))),
                "input: {input:?}"
            );
        }
    }

    #[test]
    fn rejects_missing_or_wrong_clips() {
        for input in [
            r#"{}"#,
            r#"{"clips": null}"#,
            r#"{"clips": {"start": 1}}"#,
            r#"{"clips": "none"}"#,
            r#"[{"start": 1}]"#,
            "42",
        ] {
            assert!(
                matches!(parse(input), Err(ResponseFormatError::MalformedClips)),
                "input: {input:?}"
            );
        }
    }

    #[test]
    fn unfenced_text_is_untouched() {
        assert_eq!(strip_code_fence("{\"clips\":[]}"), "{\"clips\":[]}");
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
    }
}
