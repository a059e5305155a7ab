//! Recorded landmark streams played back as a frame source.
//!
//! Two on-disk formats are understood:
//!
//! * JSON Lines, one `{"t": secs, "landmarks": [{x, y, z, visibility}, ...]}` per line
//! * CSV with a header row, `t,x0,y0,z0,v0,x1,...`; a row with no landmark
//!   columns (or only empty ones) is a frame where no pose was detected

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::SourceError;
use crate::exercise::SourceMode;
use crate::landmark::{Landmark, LandmarkFrame};
use crate::runtime::{DeliveredFrame, FrameSource, SourceEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Seconds from the start of the recording
    pub t: f64,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingFormat {
    JsonLines,
    Csv,
}

impl RecordingFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => RecordingFormat::Csv,
            _ => RecordingFormat::JsonLines,
        }
    }
}

fn malformed(line: usize, reason: impl ToString) -> SourceError {
    SourceError::Malformed {
        line,
        reason: reason.to_string(),
    }
}

fn check_time(line: usize, t: f64) -> Result<f64, SourceError> {
    if t.is_finite() && t >= 0.0 {
        Ok(t)
    } else {
        Err(malformed(line, format!("invalid timestamp {t}")))
    }
}

pub fn parse_json_lines<R: BufRead>(reader: R) -> Result<Vec<RecordedFrame>, SourceError> {
    let mut frames = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|err| malformed(line_no, err))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: RecordedFrame =
            serde_json::from_str(&line).map_err(|err| malformed(line_no, err))?;
        check_time(line_no, frame.t)?;
        frames.push(frame);
    }
    Ok(frames)
}

pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<RecordedFrame>, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut frames = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        // header is line 1
        let line_no = idx + 2;
        let record = record.map_err(|err| malformed(line_no, err))?;
        let mut fields = record.iter();

        let t = fields
            .next()
            .ok_or_else(|| malformed(line_no, "missing timestamp"))?
            .parse::<f64>()
            .map_err(|err| malformed(line_no, err))?;
        let t = check_time(line_no, t)?;

        let values: Vec<&str> = fields.collect();
        if values.iter().all(|v| v.is_empty()) {
            frames.push(RecordedFrame {
                t,
                landmarks: Vec::new(),
            });
            continue;
        }
        if values.len() % 4 != 0 {
            return Err(malformed(
                line_no,
                format!("{} landmark columns is not a multiple of 4", values.len()),
            ));
        }

        let numbers = values
            .iter()
            .map(|v| v.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| malformed(line_no, err))?;
        let landmarks = numbers
            .into_iter()
            .tuples()
            .map(|(x, y, z, visibility)| Landmark::new(x, y, z, visibility))
            .collect();
        frames.push(RecordedFrame { t, landmarks });
    }
    Ok(frames)
}

/// Read a whole recording, picking the format from the file extension
pub fn load(path: &Path) -> Result<Vec<RecordedFrame>, SourceError> {
    let io_err = |source: std::io::Error| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let frames = match RecordingFormat::from_path(path) {
        RecordingFormat::JsonLines => parse_json_lines(BufReader::new(file))?,
        RecordingFormat::Csv => parse_csv(file)?,
    };
    if frames.is_empty() {
        return Err(SourceError::Empty(path.to_path_buf()));
    }
    Ok(frames)
}

/// Plays back a recording file. Timestamps come from the file, not the wall clock.
#[derive(Debug)]
pub struct ReplaySource {
    path: PathBuf,
    mode: SourceMode,
    frames: Vec<RecordedFrame>,
    cursor: usize,
    last_at: Duration,
    closed: bool,
}

impl ReplaySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: SourceMode::File,
            frames: Vec::new(),
            cursor: 0,
            last_at: Duration::ZERO,
            closed: false,
        }
    }

    /// Report a different source mode, e.g. to replay a camera capture as if live
    pub fn with_mode(mut self, mode: SourceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ReplaySource {
    fn mode(&self) -> SourceMode {
        self.mode
    }

    fn open(&mut self) -> Result<(), SourceError> {
        self.frames = load(&self.path)?;
        self.cursor = 0;
        self.closed = false;
        info!(path = %self.path.display(), frames = self.frames.len(), "recording loaded");
        Ok(())
    }

    fn next_frame(&mut self) -> SourceEvent {
        if self.closed {
            return SourceEvent::Exhausted;
        }
        loop {
            let Some(recorded) = self.frames.get(self.cursor) else {
                return SourceEvent::Exhausted;
            };
            self.cursor += 1;

            let at = Duration::from_secs_f64(recorded.t);
            if at < self.last_at {
                warn!(t = recorded.t, sequence = self.cursor, "out-of-order frame dropped");
                continue;
            }
            self.last_at = at;
            return SourceEvent::Frame(DeliveredFrame {
                frame: LandmarkFrame::new(recorded.landmarks.clone()),
                at,
                sequence: self.cursor as u64,
            });
        }
    }

    fn now(&self) -> Duration {
        self.last_at
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RecordingFormat::from_path(Path::new("a.csv")), RecordingFormat::Csv);
        assert_eq!(RecordingFormat::from_path(Path::new("a.CSV")), RecordingFormat::Csv);
        assert_eq!(
            RecordingFormat::from_path(Path::new("a.jsonl")),
            RecordingFormat::JsonLines
        );
        assert_eq!(RecordingFormat::from_path(Path::new("a")), RecordingFormat::JsonLines);
    }

    #[test]
    fn test_parse_json_lines() {
        let input = r#"{"t":0.0,"landmarks":[{"x":0.1,"y":0.2,"z":0.0,"visibility":0.9}]}

{"t":0.5,"landmarks":[]}
{"t":1.0,"landmarks":[{"x":0.3,"y":0.4}]}
"#;
        let frames = parse_json_lines(input.as_bytes()).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].landmarks[0], Landmark::new(0.1, 0.2, 0.0, 0.9));
        assert!(frames[1].landmarks.is_empty());
        // missing z and visibility take their defaults
        assert_eq!(frames[2].landmarks[0], Landmark::new(0.3, 0.4, 0.0, 1.0));
    }

    #[test]
    fn test_json_lines_reports_bad_line() {
        let input = "{\"t\":0.0,\"landmarks\":[]}\nnot json\n";
        assert_matches!(
            parse_json_lines(input.as_bytes()),
            Err(SourceError::Malformed { line: 2, .. })
        );
        let negative = "{\"t\":-1.0,\"landmarks\":[]}\n";
        assert_matches!(
            parse_json_lines(negative.as_bytes()),
            Err(SourceError::Malformed { line: 1, .. })
        );
    }

    #[test]
    fn test_parse_csv() {
        let input = "t,x0,y0,z0,v0,x1,y1,z1,v1\n\
                     0.0,0.1,0.2,0.0,0.9,0.3,0.4,0.0,0.8\n\
                     0.5,,,,,,,,\n\
                     1.0\n";
        let frames = parse_csv(input.as_bytes()).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(
            frames[0].landmarks,
            vec![
                Landmark::new(0.1, 0.2, 0.0, 0.9),
                Landmark::new(0.3, 0.4, 0.0, 0.8)
            ]
        );
        assert!(frames[1].landmarks.is_empty());
        assert!(frames[2].landmarks.is_empty());
        assert_eq!(frames[2].t, 1.0);
    }

    #[test]
    fn test_csv_rejects_partial_landmark() {
        let input = "t,x0,y0,z0,v0\n0.0,0.1,0.2,0.0\n";
        assert_matches!(
            parse_csv(input.as_bytes()),
            Err(SourceError::Malformed { line: 2, .. })
        );
        let input = "t,x0,y0,z0,v0\n0.0,0.1,abc,0.0,1.0\n";
        assert_matches!(parse_csv(input.as_bytes()), Err(SourceError::Malformed { .. }));
    }

    #[test]
    fn test_missing_file_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ReplaySource::new(dir.path().join("nope.jsonl"));
        assert_matches!(source.open(), Err(SourceError::Io { .. }));
    }

    #[test]
    fn test_empty_file_fails_open() {
        let file = write_temp(".jsonl", "\n\n");
        let mut source = ReplaySource::new(file.path());
        assert_matches!(source.open(), Err(SourceError::Empty(_)));
    }

    #[test]
    fn test_replay_delivers_in_order_and_drops_stale_frames() {
        let file = write_temp(
            ".jsonl",
            "{\"t\":0.0,\"landmarks\":[]}\n\
             {\"t\":1.0,\"landmarks\":[]}\n\
             {\"t\":0.5,\"landmarks\":[]}\n\
             {\"t\":2.0,\"landmarks\":[]}\n",
        );
        let mut source = ReplaySource::new(file.path());
        source.open().unwrap();
        assert_eq!(source.len(), 4);
        assert_eq!(source.mode(), SourceMode::File);

        let mut stamps = Vec::new();
        while let SourceEvent::Frame(delivered) = source.next_frame() {
            stamps.push(delivered.at.as_secs_f64());
        }
        assert_eq!(stamps, vec![0.0, 1.0, 2.0]);
        assert_eq!(source.now(), Duration::from_secs(2));
    }

    #[test]
    fn test_closed_replay_is_exhausted() {
        let file = write_temp(".csv", "t,x0,y0,z0,v0\n0.0,0.5,0.5,0.0,1.0\n");
        let mut source = ReplaySource::new(file.path()).with_mode(SourceMode::Live);
        source.open().unwrap();
        assert_eq!(source.mode(), SourceMode::Live);
        source.close();
        assert_eq!(source.next_frame(), SourceEvent::Exhausted);
    }
}
