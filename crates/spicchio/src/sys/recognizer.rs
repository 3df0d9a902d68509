use crate::config::RecognizerConfig;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use wedge::ink::InkSample;
use wedge::recognizer::{Candidate, NullRecognizer, Recognizer, RecognizerError};

/// External handwriting program: the sample goes in as JSON on stdin, a JSON
/// array of `{"text", "score"}` comes back on stdout.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    argv: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(argv: Vec<String>) -> Result<Self, RecognizerError> {
        if argv.is_empty() {
            return Err(RecognizerError::Unavailable("empty command".to_string()));
        }
        Ok(Self { argv })
    }

    pub fn from_command_line(line: &str) -> Result<Self, RecognizerError> {
        let argv =
            shell_words::split(line).map_err(|e| RecognizerError::Unavailable(e.to_string()))?;
        Self::new(argv)
    }
}

impl Recognizer for CommandRecognizer {
    fn recognize(&self, sample: &InkSample) -> Result<Vec<Candidate>, RecognizerError> {
        let input =
            serde_json::to_vec(sample).map_err(|e| RecognizerError::Malformed(e.to_string()))?;

        let mut child = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RecognizerError::Unavailable(format!("{}: {}", self.argv[0], e)))?;

        // feed stdin while stdout drains, so neither pipe can fill up and stall
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|scope| {
            let writer = stdin.map(|mut stdin| scope.spawn(move || stdin.write_all(&input)));
            let output = child.wait_with_output();
            (writer.map(|w| w.join()), output)
        });
        match written {
            // the program may answer without reading everything
            Some(Ok(Err(e))) if e.kind() != ErrorKind::BrokenPipe => return Err(e.into()),
            Some(Err(_)) => {
                return Err(RecognizerError::Unavailable(
                    "stdin writer panicked".to_string(),
                ));
            }
            _ => {}
        }

        let output = output?;
        if !output.status.success() {
            return Err(RecognizerError::Unavailable(format!(
                "{} exited with {}",
                self.argv[0], output.status
            )));
        }
        serde_json::from_slice(&output.stdout)
            .map_err(|e| RecognizerError::Malformed(e.to_string()))
    }
}

/// The configured recognizer, or one that never answers.
pub fn from_config(config: &RecognizerConfig) -> Arc<dyn Recognizer> {
    let Some(line) = config.command.as_deref() else {
        log::info!("No recognizer configured; drawings will not filter items");
        return Arc::new(NullRecognizer);
    };
    match CommandRecognizer::from_command_line(line) {
        Ok(recognizer) => Arc::new(recognizer),
        Err(e) => {
            log::error!("Invalid recognizer command '{}': {}", line, e);
            Arc::new(NullRecognizer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wedge::geom::{Point, Size};
    use wedge::ink::{ExclusionZones, StrokeCapture, UpOutcome};
    use wedge::recognizer::recognize_or_empty;

    fn shell(script: &str) -> CommandRecognizer {
        CommandRecognizer::new(vec!["sh".into(), "-c".into(), script.into()]).unwrap()
    }

    #[test]
    fn test_reads_candidates_from_stdout() {
        let recognizer = shell(
            r#"cat >/dev/null; echo '[{"text":"b","score":0.2},{"text":"a","score":0.9}]'"#,
        );
        let recognition = recognize_or_empty(&recognizer, &InkSample::default());
        assert_eq!(recognition.top_char(), Some('a'));
        assert_eq!(recognition.candidates().len(), 2);
    }

    #[test]
    fn test_large_reply_before_reading_input() {
        let mut capture =
            StrokeCapture::new(ExclusionZones::default(), Size::new(1000.0, 2000.0), 800);
        capture.pointer_down(0, Point::new(100.0, 1600.0), 0);
        for t in 1..5000 {
            capture.pointer_move(0, Point::new(100.0 + (t % 50) as f64, 1600.0), t);
        }
        let UpOutcome::Finished { sample, .. } =
            capture.pointer_up(0, Point::new(150.0, 1700.0), 5000)
        else {
            panic!("gesture did not finish");
        };
        assert!(serde_json::to_vec(&sample).unwrap().len() > 100_000);

        // both pipes overflow unless stdin is written while stdout is read
        let recognizer = shell(
            r#"head -c 200000 /dev/zero | tr '\0' ' '; echo '[{"text":"z"}]'; cat >/dev/null"#,
        );
        assert_eq!(recognizer.recognize(&sample).unwrap(), vec![Candidate::new("z", None)]);
    }

    #[test]
    fn test_failures() {
        let garbage = shell("cat >/dev/null; echo nope");
        assert!(matches!(
            garbage.recognize(&InkSample::default()),
            Err(RecognizerError::Malformed(_))
        ));

        let failing = shell("exit 3");
        assert!(matches!(
            failing.recognize(&InkSample::default()),
            Err(RecognizerError::Unavailable(_))
        ));

        let missing = CommandRecognizer::from_command_line("/nonexistent/recognizer").unwrap();
        assert!(matches!(
            missing.recognize(&InkSample::default()),
            Err(RecognizerError::Unavailable(_))
        ));

        assert!(CommandRecognizer::from_command_line("").is_err());
    }
}
