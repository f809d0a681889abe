use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use nom::{
    bytes::complete::take_till,
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map_res},
    sequence::{delimited, separated_pair},
    IResult,
    Parser,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    core::timeline::{Timeline, TimelineError},
    models::{Breakpoint, Label, LabelSet},
};

pub const DEFAULT_INDEX_COLUMN: &str = "frame";
pub const DEFAULT_LABEL_COLUMN: &str = "label";

/// A two-column CSV file holding one `index,label` row per breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationFile {
    path:         PathBuf,
    index_column: String,
    label_column: String,
}

impl AnnotationFile {
    #[inline]
    pub fn new(path: &Path) -> Self {
        Self {
            path:         path.to_path_buf(),
            index_column: DEFAULT_INDEX_COLUMN.to_owned(),
            label_column: DEFAULT_LABEL_COLUMN.to_owned(),
        }
    }

    #[inline]
    pub fn with_columns(mut self, index_column: &str, label_column: &str) -> Self {
        index_column.clone_into(&mut self.index_column);
        label_column.clone_into(&mut self.label_column);
        self
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the breakpoints to a sibling temporary file and renames it over
    /// the annotation file, so readers never observe a partial file.
    #[inline]
    pub fn save(&self, breakpoints: &[Breakpoint]) -> Result<(), PersistError> {
        if let Some(pair) = breakpoints.windows(2).find(|pair| pair[0].index >= pair[1].index) {
            return Err(PersistError::Unsorted {
                path:  self.path.clone(),
                index: pair[1].index,
            });
        }

        let mut buffer = String::with_capacity(16 * (breakpoints.len() + 1));
        buffer.push_str(&self.index_column);
        buffer.push(',');
        buffer.push_str(&self.label_column);
        buffer.push('\n');
        for breakpoint in breakpoints {
            buffer.push_str(&breakpoint.index.to_string());
            buffer.push(',');
            buffer.push_str(&breakpoint.label.to_string());
            buffer.push('\n');
        }

        let temp_path = self.temp_path();
        let write = |path: &Path| -> io::Result<()> {
            let mut file = File::create(path)?;
            file.write_all(buffer.as_bytes())?;
            file.sync_all()
        };
        write(&temp_path)
            .and_then(|()| fs::rename(&temp_path, &self.path))
            .map_err(|cause| {
                let _ = fs::remove_file(&temp_path);
                PersistError::Write {
                    path: self.path.clone(),
                    cause,
                }
            })?;
        debug!("Saved {} breakpoints to {}", breakpoints.len(), self.path.display());

        Ok(())
    }

    /// Loads the timeline, falling back to an empty one when the file is
    /// missing or cannot be used.
    #[inline]
    pub fn load(&self, frame_count: usize, labels: &LabelSet) -> Timeline {
        match self.try_load(frame_count, labels) {
            Ok(timeline) => timeline,
            Err(PersistError::Missing(path)) => {
                debug!("No annotations at {}, starting empty", path.display());
                Timeline::new(frame_count, labels.clone())
            },
            Err(error) => {
                warn!("Ignoring annotations: {}", error);
                Timeline::new(frame_count, labels.clone())
            },
        }
    }

    #[inline]
    pub fn try_load(&self, frame_count: usize, labels: &LabelSet) -> Result<Timeline, PersistError> {
        let breakpoints = self.read_breakpoints()?;
        Timeline::from_breakpoints(frame_count, labels.clone(), breakpoints).map_err(|cause| {
            PersistError::Invalid {
                path: self.path.clone(),
                cause,
            }
        })
    }

    /// Parses the rows of the file without checking them against a video.
    #[inline]
    pub fn read_breakpoints(&self) -> Result<Vec<Breakpoint>, PersistError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(PersistError::Missing(self.path.clone()));
            },
            Err(cause) => {
                return Err(PersistError::Read {
                    path: self.path.clone(),
                    cause,
                });
            },
        };
        let contents = contents.strip_prefix('\u{feff}').unwrap_or(&contents);

        let malformed = |line: usize, reason: String| PersistError::Malformed {
            path: self.path.clone(),
            line,
            reason,
        };

        let mut lines = contents
            .lines()
            .enumerate()
            .map(|(n, l)| (n + 1, l))
            .filter(|(_, l)| !l.trim().is_empty());
        let Some((line_number, header_line)) = lines.next() else {
            return Err(malformed(1, "missing header row".to_owned()));
        };
        match parse_header(header_line) {
            Ok((_, (index_column, _))) if index_column.trim().parse::<usize>().is_err() => (),
            Ok(_) => return Err(malformed(line_number, "missing header row".to_owned())),
            Err(_) => return Err(malformed(line_number, "expected two columns".to_owned())),
        }

        let mut breakpoints: Vec<Breakpoint> = Vec::new();
        for (line_number, line) in lines {
            let (_, (index, value)) = parse_row(line).map_err(|_| {
                malformed(line_number, format!("expected two integers, found \"{}\"", line))
            })?;
            let label = Label::new(value)
                .ok_or_else(|| malformed(line_number, "label 0 is reserved".to_owned()))?;
            if let Some(previous) = breakpoints.last()
                && previous.index >= index
            {
                return Err(malformed(
                    line_number,
                    format!("frame {} does not follow frame {}", index, previous.index),
                ));
            }
            breakpoints.push(Breakpoint::new(index, label));
        }

        Ok(breakpoints)
    }

    fn temp_path(&self) -> PathBuf {
        let extension = self.path.extension().map_or_else(
            || "tmp".to_owned(),
            |extension| format!("{}.tmp", extension.to_string_lossy()),
        );
        self.path.with_extension(extension)
    }
}

fn parse_header(input: &str) -> IResult<&str, (&str, &str)> {
    all_consuming(separated_pair(
        take_till(|c| c == ','),
        char(','),
        take_till(|c| c == ','),
    ))
    .parse(input)
}

fn parse_row(input: &str) -> IResult<&str, (usize, u8)> {
    all_consuming(separated_pair(
        map_res(delimited(space0, digit1, space0), |digits: &str| digits.parse::<usize>()),
        char(','),
        map_res(delimited(space0, digit1, space0), |digits: &str| digits.parse::<u8>()),
    ))
    .parse(input)
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Annotation file {0} does not exist")]
    Missing(PathBuf),
    #[error("Failed to read annotation file {path}: {cause}")]
    Read { path: PathBuf, cause: io::Error },
    #[error("Failed to write annotation file {path}: {cause}")]
    Write { path: PathBuf, cause: io::Error },
    #[error("Annotation file {path} line {line}: {reason}")]
    Malformed {
        path:   PathBuf,
        line:   usize,
        reason: String,
    },
    #[error("Annotation file {path} does not fit the video: {cause}")]
    Invalid { path: PathBuf, cause: TimelineError },
    #[error("Refusing to write {path}: breakpoints are not ascending at frame {index}")]
    Unsorted { path: PathBuf, index: usize },
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn label(value: u8) -> Label {
        Label::new(value).expect("non-zero label")
    }

    fn bp(index: usize, value: u8) -> Breakpoint {
        Breakpoint::new(index, label(value))
    }

    fn file_with(contents: &str) -> (AnnotationFile, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("clip.csv");
        fs::write(&path, contents).expect("write annotations");
        (AnnotationFile::new(&path), temp_dir)
    }

    #[test]
    fn save_writes_header_and_rows() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("clip.csv");
        let file = AnnotationFile::new(&path);
        file.save(&[bp(5, 1), bp(20, 2)]).expect("saved");

        let contents = fs::read_to_string(&path).expect("read back");
        assert_eq!(contents, "frame,label\n5,1\n20,2\n");
        assert!(!path.with_extension("csv.tmp").exists());
    }

    #[test]
    fn save_uses_configured_column_names() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("clip.csv");
        let file = AnnotationFile::new(&path).with_columns("index", "group");
        file.save(&[]).expect("saved");
        assert_eq!(fs::read_to_string(&path).expect("read back"), "index,group\n");
    }

    #[test]
    fn saved_timeline_loads_back_identically() {
        let temp_dir = TempDir::new().expect("temp dir");
        let file = AnnotationFile::new(&temp_dir.path().join("clip.csv"));
        let mut timeline = Timeline::new(500, LabelSet::default());
        for (index, value) in [(0, 2), (40, 1), (41, 3), (300, 1), (499, 2)] {
            timeline.insert(index, label(value)).expect("valid insert");
        }
        file.save(timeline.breakpoints()).expect("saved");

        let loaded = file.try_load(500, &LabelSet::default()).expect("loads");
        assert_eq!(loaded, timeline);
    }

    #[test]
    fn save_replaces_previous_contents() {
        let (file, _temp_dir) = file_with("frame,label\n1,1\n2,2\n3,3\n");
        file.save(&[bp(7, 3)]).expect("saved");
        assert_eq!(file.read_breakpoints().expect("parses"), vec![bp(7, 3)]);
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let temp_dir = TempDir::new().expect("temp dir");
        let file = AnnotationFile::new(&temp_dir.path().join("missing").join("clip.csv"));
        let error = file.save(&[bp(1, 1)]).expect_err("directory does not exist");
        assert!(matches!(error, PersistError::Write { .. }));
    }

    #[test]
    fn save_refuses_unsorted_rows() {
        let (file, _temp_dir) = file_with("");
        let error = file.save(&[bp(9, 1), bp(3, 2)]).expect_err("unsorted");
        assert!(matches!(error, PersistError::Unsorted { index: 3, .. }));
    }

    #[test]
    fn reads_any_two_column_header_and_tolerates_whitespace() {
        let (file, _temp_dir) = file_with("\u{feff}帧序号,组别\r\n 5 , 1\r\n20,2\r\n\r\n");
        assert_eq!(file.read_breakpoints().expect("parses"), vec![bp(5, 1), bp(20, 2)]);
    }

    #[test]
    fn load_coalesces_redundant_rows() {
        let (file, _temp_dir) = file_with("frame,label\n0,1\n10,1\n20,2\n");
        let timeline = file.load(100, &LabelSet::default());
        assert_eq!(timeline.breakpoints(), &[bp(0, 1), bp(20, 2)]);
    }

    #[test]
    fn missing_file_loads_empty() {
        let temp_dir = TempDir::new().expect("temp dir");
        let file = AnnotationFile::new(&temp_dir.path().join("nothing.csv"));
        assert!(matches!(
            file.try_load(100, &LabelSet::default()),
            Err(PersistError::Missing(_))
        ));
        assert!(file.load(100, &LabelSet::default()).is_empty());
    }

    #[test]
    fn malformed_files_load_empty() {
        let cases = [
            "",
            "frame\n1,1\n",
            "frame,label,extra\n1,1\n",
            "5,1\n6,2\n",
            "frame,label\n1,1,1\n",
            "frame,label\n1\n",
            "frame,label\nx,1\n",
            "frame,label\n1,-2\n",
            "frame,label\n1.5,2\n",
            "frame,label\n1,0\n",
            "frame,label\n10,1\n5,2\n",
            "frame,label\n10,1\n10,2\n",
            "frame,label\n1,9\n",
            "frame,label\n1000,1\n",
        ];
        for contents in cases {
            let (file, _temp_dir) = file_with(contents);
            assert!(
                file.try_load(100, &LabelSet::default()).is_err(),
                "expected {:?} to be rejected",
                contents
            );
            assert!(file.load(100, &LabelSet::default()).is_empty());
        }
    }

    #[test]
    fn malformed_rows_report_their_line() {
        let (file, _temp_dir) = file_with("frame,label\n1,1\n\nabc\n");
        let error = file.read_breakpoints().expect_err("malformed");
        assert!(matches!(error, PersistError::Malformed { line: 4, .. }));
    }
}
