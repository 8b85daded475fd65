use std::path::Path;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::error::{Result, SublateError};

/// A single SRT cue: 1-based index, `[start, end)` interval in seconds,
/// and caption text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Split text into sentence-like segments on terminal punctuation.
///
/// A segment is flushed at `.`, `!` or `?` once it contains at least one
/// alphanumeric character, so ellipses and stacked punctuation stay attached
/// to the preceding sentence. When no delimiter yields a segment, the whole
/// trimmed input is returned as a single segment.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?')
            && current.chars().any(|c| c.is_alphanumeric())
            && !matches!(chars.peek(), Some('.' | '!' | '?'))
        {
            segments.push(current.trim().to_string());
            current.clear();
        }
    }

    let tail = current.trim();
    if !tail.is_empty() && tail.chars().any(|c| c.is_alphanumeric()) {
        segments.push(tail.to_string());
    }

    if segments.is_empty() {
        let whole = text.trim();
        if !whole.is_empty() {
            segments.push(whole.to_string());
        }
    }

    segments
}

/// Synthesize cues from plain text and a total duration.
///
/// Each sentence receives an equal share of the duration as sequential,
/// non-overlapping intervals; the final cue's end is clamped to the total
/// duration to absorb rounding. Empty input yields no cues.
pub fn proportional_cues(text: &str, duration_secs: f64) -> Vec<Cue> {
    let duration_secs = duration_secs.max(0.0);
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return Vec::new();
    }

    let count = sentences.len();
    let share = duration_secs / count as f64;

    sentences
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let start = i as f64 * share;
            let end = if i + 1 == count {
                duration_secs
            } else {
                (i + 1) as f64 * share
            };
            Cue {
                index: i + 1,
                start,
                end,
                text,
            }
        })
        .collect()
}

/// Render cues to SRT text.
pub fn render(cues: &[Cue]) -> String {
    let mut srt_content = String::new();

    for cue in cues {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            format_srt_time(cue.start),
            format_srt_time(cue.end),
            cue.text.trim()
        ));
    }

    srt_content
}

/// Parse SRT text into cues.
///
/// Tolerates CRLF line endings, a UTF-8 BOM, and multi-line caption text.
pub fn parse(content: &str) -> Result<Vec<Cue>> {
    let content = content.trim_start_matches('\u{feff}');
    let mut cues = Vec::new();

    for block in content.replace("\r\n", "\n").split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        let mut lines = block.lines();
        let index_line = lines
            .next()
            .ok_or_else(|| SublateError::Subtitle("Empty subtitle block".to_string()))?;
        let index: usize = index_line.trim().parse().map_err(|_| {
            SublateError::Subtitle(format!("Invalid cue index: {}", index_line.trim()))
        })?;

        let time_line = lines.next().ok_or_else(|| {
            SublateError::Subtitle(format!("Cue {} is missing a timestamp line", index))
        })?;
        let (start, end) = parse_time_line(time_line)?;

        let text = lines.collect::<Vec<_>>().join("\n").trim().to_string();
        if text.is_empty() {
            continue;
        }

        cues.push(Cue {
            index,
            start,
            end,
            text,
        });
    }

    // Skipped textless cues leave gaps in the numbering
    renumber(&mut cues);
    Ok(cues)
}

/// Reassign sequential 1-based indices after cues were merged or dropped.
pub fn renumber(cues: &mut [Cue]) {
    for (i, cue) in cues.iter_mut().enumerate() {
        cue.index = i + 1;
    }
}

/// Generate an SRT subtitle file from cues.
pub async fn write_srt<P: AsRef<Path>>(cues: &[Cue], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    fs::write(output_path, render(cues))
        .await
        .map_err(SublateError::Io)?;

    Ok(())
}

/// Read and parse an SRT subtitle file.
pub async fn read_srt<P: AsRef<Path>>(path: P) -> Result<Vec<Cue>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SublateError::FileNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path).await.map_err(SublateError::Io)?;
    parse(&content)
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
pub fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Parse SRT time format (HH:MM:SS,mmm) into seconds.
pub fn parse_srt_time(value: &str) -> Result<f64> {
    let value = value.trim();
    let (clock, millis) = value
        .split_once(',')
        .or_else(|| value.split_once('.'))
        .ok_or_else(|| SublateError::Subtitle(format!("Invalid SRT timestamp: {}", value)))?;

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 {
        return Err(SublateError::Subtitle(format!(
            "Invalid SRT timestamp: {}",
            value
        )));
    }

    let hours: u64 = parts[0]
        .parse()
        .map_err(|_| SublateError::Subtitle(format!("Invalid hours in timestamp: {}", value)))?;
    let minutes: u64 = parts[1]
        .parse()
        .map_err(|_| SublateError::Subtitle(format!("Invalid minutes in timestamp: {}", value)))?;
    let secs: u64 = parts[2]
        .parse()
        .map_err(|_| SublateError::Subtitle(format!("Invalid seconds in timestamp: {}", value)))?;
    let millis: u64 = millis
        .parse()
        .map_err(|_| SublateError::Subtitle(format!("Invalid milliseconds in timestamp: {}", value)))?;

    Ok((hours * 3600 + minutes * 60 + secs) as f64 + millis as f64 / 1000.0)
}

fn parse_time_line(line: &str) -> Result<(f64, f64)> {
    let (start, end) = line
        .split_once("-->")
        .ok_or_else(|| SublateError::Subtitle(format!("Invalid timestamp line: {}", line)))?;
    Ok((parse_srt_time(start)?, parse_srt_time(end)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(65.123), "00:01:05,123");
        assert_eq!(format_srt_time(3661.500), "01:01:01,500");
    }

    #[test]
    fn test_parse_srt_time() {
        assert_eq!(parse_srt_time("00:00:00,000").unwrap(), 0.0);
        assert_eq!(parse_srt_time("00:01:05,123").unwrap(), 65.123);
        assert_eq!(parse_srt_time("01:01:01,500").unwrap(), 3661.5);
        assert!(parse_srt_time("not a timestamp").is_err());
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("Hello world. How are you? Fine!");
        assert_eq!(
            sentences,
            vec!["Hello world.", "How are you?", "Fine!"]
        );
    }

    #[test]
    fn test_split_sentences_no_delimiter_is_single_segment() {
        let sentences = split_sentences("just one run of words with no punctuation");
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0], "just one run of words with no punctuation");
    }

    #[test]
    fn test_split_sentences_ellipsis_stays_attached() {
        let sentences = split_sentences("Wait... here it comes.");
        assert_eq!(sentences[0], "Wait...");
        assert_eq!(sentences.last().unwrap(), "here it comes.");
        assert!(sentences.iter().all(|s| s.chars().any(|c| c.is_alphanumeric())));
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n  ").is_empty());
    }

    #[test]
    fn test_proportional_cues_equal_shares() {
        let cues = proportional_cues("One. Two. Three. Four.", 100.0);
        assert_eq!(cues.len(), 4);
        assert_eq!(cues[0].start, 0.0);
        assert_eq!(cues[0].end, 25.0);
        assert_eq!(cues[1].start, 25.0);
        assert_eq!(cues[3].end, 100.0);
        // Sequential and non-overlapping
        for pair in cues.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        // 1-based indices in order
        for (i, cue) in cues.iter().enumerate() {
            assert_eq!(cue.index, i + 1);
        }
    }

    #[test]
    fn test_proportional_cues_final_end_clamped() {
        let cues = proportional_cues("A. B. C.", 10.0);
        assert_eq!(cues.last().unwrap().end, 10.0);

        let cues = proportional_cues("One sentence only", 7.5);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].start, 0.0);
        assert_eq!(cues[0].end, 7.5);
    }

    #[test]
    fn test_proportional_cues_empty_input() {
        assert!(proportional_cues("", 60.0).is_empty());
        assert_eq!(render(&proportional_cues("", 60.0)), "");
    }

    #[test]
    fn test_proportional_cues_zero_duration() {
        let cues = proportional_cues("A. B.", 0.0);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].start, 0.0);
        assert_eq!(cues[1].end, 0.0);
    }

    #[test]
    fn test_render_format() {
        let cues = proportional_cues("Hello there. General Kenobi.", 10.0);
        let srt = render(&cues);
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:05,000\nHello there.\n\n\
             2\n00:00:05,000 --> 00:00:10,000\nGeneral Kenobi.\n\n"
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let cues = proportional_cues("First. Second? Third!", 90.0);
        let parsed = parse(&render(&cues)).unwrap();
        assert_eq!(parsed, cues);
    }

    #[test]
    fn test_parse_crlf_and_multiline_text() {
        let content = "1\r\n00:00:00,000 --> 00:00:02,000\r\nline one\r\nline two\r\n\r\n\
                       2\r\n00:00:02,000 --> 00:00:04,000\r\nsecond cue\r\n";
        let cues = parse(content).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "line one\nline two");
        assert_eq!(cues[1].start, 2.0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("1\nnot a timestamp\ntext\n").is_err());
    }

    #[test]
    fn test_renumber() {
        let mut cues = proportional_cues("A. B. C.", 30.0);
        cues.remove(1);
        renumber(&mut cues);
        assert_eq!(cues[0].index, 1);
        assert_eq!(cues[1].index, 2);
    }

    #[test]
    fn test_parse_renumbers_after_skipping_textless_cues() {
        let content = "1\n00:00:00,000 --> 00:00:02,000\n\n\n\
                       2\n00:00:02,000 --> 00:00:04,000\nkept\n";
        let cues = parse(content).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].index, 1);
        assert_eq!(cues[0].text, "kept");
    }
}
