//! Plain-text clip report offered as a download.

use std::path::Path;

use tokio::fs;

use crate::{
    error::Result,
    types::{AnalysisResult, field_text},
};

pub const REPORT_FILE_NAME: &str = "metadata_output.txt";

const SEPARATOR_WIDTH: usize = 40;

/// Render the report: one block per clip, blocks joined by a newline.
///
/// The layout is consumed by tools downstream and must stay byte-for-byte stable.
pub fn format_report(result: &AnalysisResult) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    result
        .clips
        .iter()
        .enumerate()
        .map(|(i, clip)| {
            format!(
                "\nClip #{}: {}\nTimestamp: {}s - {}s\nDescription: {}\n{}\n    ",
                i + 1,
                field_text(&clip.title),
                field_text(&clip.start),
                field_text(&clip.end),
                field_text(&clip.description),
                separator
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the report to a file
pub async fn save_report(result: &AnalysisResult, path: &Path) -> Result<()> {
    fs::write(path, format_report(result)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::Clip;

    fn clip(start: f64, end: f64, title: &str, description: &str) -> Clip {
        Clip::new(start, end, title, description)
    }

    #[test]
    fn report_layout_is_exact() {
        let result = AnalysisResult {
            clips: vec![clip(10.0, 20.0, "T", "D"), clip(65.5, 80.25, "İkinci", "Açıklama")],
            peak_moment: Some("not part of the report".into()),
        };

        let expected = "\nClip #1: T\nTimestamp: 10s - 20s\nDescription: D\n\
                        ----------------------------------------\n    \n\
                        \nClip #2: İkinci\nTimestamp: 65.5s - 80.25s\nDescription: Açıklama\n\
                        ----------------------------------------\n    ";
        assert_eq!(format_report(&result), expected);
    }

    #[test]
    fn report_prints_mistyped_fields_as_sent() {
        let result = AnalysisResult {
            clips: vec![Clip::from_value(
                &json!({"start": "12", "end": "20", "title": 7, "description": "D"}),
            )],
            peak_moment: None,
        };

        assert_eq!(
            format_report(&result),
            "\nClip #1: 7\nTimestamp: 12s - 20s\nDescription: D\n\
             ----------------------------------------\n    "
        );
    }

    #[test]
    fn empty_result_gives_empty_report() {
        assert_eq!(format_report(&AnalysisResult::default()), "");
    }

    #[tokio::test]
    async fn save_writes_report_file() {
        let result = AnalysisResult {
            clips: vec![clip(1.0, 2.0, "a", "b")],
            peak_moment: None,
        };
        let path = std::env::temp_dir().join(format!("kesit-report-{}.txt", uuid::Uuid::new_v4()));

        save_report(&result, &path).await.unwrap();
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(written, format_report(&result));
    }
}
