//! Landmark input.
//!
//! The hand detector runs outside this process and streams one JSON
//! `FrameObservation` per line, either live (stdout of a detector process)
//! or recorded to a file.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use steer_shared::FrameObservation;

/// Anything that yields one frame of hand landmarks at a time
pub trait LandmarkSource {
    /// Next frame, or `None` once the stream has ended
    fn next_frame(&mut self) -> Result<Option<FrameObservation>>;
}

/// Reads line-delimited JSON frames
pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    line_number: usize,
    malformed_lines: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
            malformed_lines: 0,
        }
    }

    /// Number of lines that could not be parsed so far
    pub fn malformed_lines(&self) -> usize {
        self.malformed_lines
    }
}

impl JsonLinesSource<Box<dyn BufRead>> {
    /// Open a recorded session, or stdin for `-`
    pub fn open(input: &str) -> Result<Self> {
        let reader: Box<dyn BufRead> = if input == "-" {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let file = File::open(Path::new(input))
                .with_context(|| format!("Failed to open landmark input {}", input))?;
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(reader))
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<FrameObservation>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .context("Failed to read landmark stream")?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }

            return match FrameObservation::from_json_line(line) {
                Ok(frame) => Ok(Some(frame)),
                Err(e) => {
                    // A bad reading counts as a frame without hands
                    self.malformed_lines += 1;
                    log::warn!("Malformed frame on line {}: {}", self.line_number, e);
                    Ok(Some(FrameObservation::empty()))
                }
            };
        }
    }
}

/// External detector process whose stdout is the landmark stream
pub struct DetectorProcess {
    child: Child,
    frames: JsonLinesSource<BufReader<ChildStdout>>,
}

impl DetectorProcess {
    /// Start `command` through the shell
    pub fn spawn(command: &str) -> Result<Self> {
        log::info!("Starting hand detector: {}", command);
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start detector command `{}`", command))?;

        let stdout = child
            .stdout
            .take()
            .context("Detector process has no stdout")?;

        Ok(Self {
            child,
            frames: JsonLinesSource::new(BufReader::new(stdout)),
        })
    }
}

impl LandmarkSource for DetectorProcess {
    fn next_frame(&mut self) -> Result<Option<FrameObservation>> {
        self.frames.next_frame()
    }
}

impl Drop for DetectorProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            if let Err(e) = self.child.kill() {
                log::warn!("Failed to stop detector process: {}", e);
            }
        }
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_frames_and_skips_blank_lines() -> Result<()> {
        let input = "{\"hands\":[]}\n\n{\"hands\":[{\"landmarks\":[{\"x\":0.5,\"y\":0.5}]}]}\n";
        let mut source = JsonLinesSource::new(Cursor::new(input));

        assert_eq!(source.next_frame()?, Some(FrameObservation::empty()));
        let frame = source.next_frame()?.expect("second frame");
        assert_eq!(frame.hands.len(), 1);
        assert_eq!(source.next_frame()?, None);
        assert_eq!(source.malformed_lines(), 0);
        Ok(())
    }

    #[test]
    fn test_malformed_line_becomes_empty_frame() -> Result<()> {
        let input = "not json\n{\"hands\":[{\"landmarks\":[]}]}\n";
        let mut source = JsonLinesSource::new(Cursor::new(input));

        assert_eq!(source.next_frame()?, Some(FrameObservation::empty()));
        assert_eq!(source.malformed_lines(), 1);
        assert_eq!(source.next_frame()?.map(|f| f.hands.len()), Some(1));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(JsonLinesSource::open("/nonexistent/session.jsonl").is_err());
    }

    #[test]
    fn test_detector_process_stream() -> Result<()> {
        let mut detector = DetectorProcess::spawn("printf '{\"hands\":[]}\\n'")?;
        assert_eq!(detector.next_frame()?, Some(FrameObservation::empty()));
        assert_eq!(detector.next_frame()?, None);
        Ok(())
    }
}
