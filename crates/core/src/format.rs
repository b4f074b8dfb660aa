use crate::types::{AnalysisResult, Clip, field_text};

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

const UNKNOWN_TIMESTAMP: &str = "--:--";

/// Clip length with one decimal, e.g. `15.0`; `?` when either end is not a number.
pub fn format_clip_duration(clip: &Clip) -> String {
    clip.duration()
        .map(|d| format!("{:.1}", d))
        .unwrap_or_else(|| "?".to_string())
}

/// Raw second range as the model reported it, e.g. `120s - 135s`.
pub fn format_clip_range(clip: &Clip) -> String {
    format!("{}s - {}s", field_text(&clip.start), field_text(&clip.end))
}

fn clip_timestamp(seconds: Option<f64>) -> String {
    seconds
        .map(format_timestamp)
        .unwrap_or_else(|| UNKNOWN_TIMESTAMP.to_string())
}

pub fn format_result_readable(result: &AnalysisResult, active_clip: Option<usize>) -> String {
    let mut output = String::new();
    output.push_str("# Detected viral moments\n\n");

    if result.clips.is_empty() {
        output.push_str("No viral moments were suggested for this video.\n\n");
    }

    for (i, clip) in result.clips.iter().enumerate() {
        let marker = if active_clip == Some(i) { " ▶" } else { "" };
        output.push_str(&format!(
            "### #{} [{}–{}] {}{}\n\n",
            i + 1,
            clip_timestamp(clip.start_seconds()),
            clip_timestamp(clip.end_seconds()),
            clip.title_text(),
            marker
        ));
        output.push_str(&format!("{}\n\n", clip.description_text()));
        output.push_str(&format!(
            "**Duration:** {} s | **Range:** {}\n\n",
            format_clip_duration(clip),
            format_clip_range(clip)
        ));
        if let Some(reason) = &clip.reason {
            output.push_str(&format!("**Why:** {}\n\n", reason));
        }
    }

    if let Some(peak) = &result.peak_moment {
        output.push_str("## AI insight: peak engagement moment\n\n");
        output.push_str(peak);
        output.push_str("\n\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::ClipValue;

    fn clip() -> Clip {
        Clip {
            reason: Some(ClipValue::Text("Comments point here".into())),
            ..Clip::new(120.0, 135.0, "Viral", "Desc")
        }
    }

    #[test]
    fn timestamps() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(135.7), "02:15");
        assert_eq!(format_timestamp(3600.0), "60:00");
        assert_eq!(format_timestamp(-5.0), "00:00");
    }

    #[test]
    fn clip_card_labels() {
        let clip = clip();
        assert_eq!(format_clip_duration(&clip), "15.0");
        assert_eq!(format_clip_range(&clip), "120s - 135s");
    }

    #[test]
    fn clip_labels_keep_values_as_sent() {
        let clip = Clip::from_value(&json!({"start": "12", "end": "20", "title": 7}));
        assert_eq!(format_clip_range(&clip), "12s - 20s");
        assert_eq!(format_clip_duration(&clip), "8.0");

        let clip = Clip::from_value(&json!({"start": "intro", "end": 20}));
        assert_eq!(format_clip_range(&clip), "intros - 20s");
        assert_eq!(format_clip_duration(&clip), "?");
    }

    #[test]
    fn readable_output_marks_active_clip_and_peak() {
        let result = AnalysisResult {
            clips: vec![clip(), Clip::default()],
            peak_moment: Some("Peak".into()),
        };

        let text = format_result_readable(&result, Some(0));
        assert!(text.contains("### #1 [02:00–02:15] Viral ▶"));
        assert!(text.contains("### #2 [--:--–--:--] \n"));
        assert!(text.contains("**Why:** Comments point here"));
        assert!(text.contains("## AI insight: peak engagement moment\n\nPeak"));
    }

    #[test]
    fn readable_output_for_empty_result() {
        let text = format_result_readable(&AnalysisResult::default(), None);
        assert!(text.contains("No viral moments"));
        assert!(!text.contains("AI insight"));
    }
}
