//! Per-job logger with file output and console sink.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::types::{LogConfig, LogLevel, LogSink, MessagePrefix};

/// Logger for a single pipeline job.
///
/// Writes all messages to `job.log` inside the job state directory and
/// forwards level-filtered lines to an optional sink (the CLI console).
/// In compact mode, raw tool output is buffered and only the tail is
/// shown when a tool fails.
pub struct JobLogger {
    config: LogConfig,
    job_name: String,
    log_path: PathBuf,
    writer: Arc<Mutex<Option<BufWriter<File>>>>,
    sink: Option<LogSink>,
    tail_buffer: Arc<Mutex<VecDeque<String>>>,
    last_progress: Arc<Mutex<Option<u32>>>,
}

impl JobLogger {
    /// Create a new job logger writing to `job.log` in the given directory.
    pub fn new(
        job_name: &str,
        job_dir: &Path,
        config: LogConfig,
        sink: Option<LogSink>,
    ) -> std::io::Result<Self> {
        std::fs::create_dir_all(job_dir)?;
        let log_path = job_dir.join("job.log");
        let file = File::create(&log_path)?;
        let writer = BufWriter::new(file);

        Ok(Self {
            config,
            job_name: job_name.to_string(),
            log_path,
            writer: Arc::new(Mutex::new(Some(writer))),
            sink,
            tail_buffer: Arc::new(Mutex::new(VecDeque::new())),
            last_progress: Arc::new(Mutex::new(None)),
        })
    }

    /// Path of the log file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Name of the job this logger belongs to.
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// Core logging method.
    fn log(&self, level: LogLevel, prefix: MessagePrefix, message: &str) {
        let formatted = prefix.format(message);
        let line = if self.config.show_timestamps {
            let ts = chrono::Local::now().format("%H:%M:%S");
            format!("[{}] {}", ts, formatted)
        } else {
            formatted
        };

        // The file gets everything; the sink is level-filtered.
        {
            let mut guard = self.writer.lock();
            if let Some(writer) = guard.as_mut() {
                let _ = writeln!(writer, "{}", line);
                if level >= LogLevel::Warn {
                    let _ = writer.flush();
                }
            }
        }

        if level >= self.config.level {
            if let Some(sink) = &self.sink {
                sink(&line);
            }
        }
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, MessagePrefix::None, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, MessagePrefix::Debug, message);
    }

    /// Log a warning.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, MessagePrefix::Warning, message);
    }

    /// Log an error.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, MessagePrefix::Error, message);
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        self.log(LogLevel::Info, MessagePrefix::Success, message);
    }

    /// Log a phase marker.
    pub fn phase(&self, name: &str) {
        self.log(LogLevel::Info, MessagePrefix::Phase, name);
    }

    /// Log a progress update, collapsed to `progress_step` buckets in
    /// compact mode.
    pub fn progress(&self, percent: u32, message: &str) {
        if self.config.compact {
            let step = self.config.progress_step.max(1);
            let bucket = percent / step;
            let mut last = self.last_progress.lock();
            if *last == Some(bucket) && percent != 100 {
                return;
            }
            *last = Some(bucket);
        }
        self.log(
            LogLevel::Info,
            MessagePrefix::None,
            &format!("[{:>3}%] {}", percent, message),
        );
    }

    /// Record a line of raw output from an external tool.
    ///
    /// In compact mode the line is buffered so the tail can be shown if
    /// the tool fails; otherwise it is logged at debug level.
    pub fn output_line(&self, line: &str, is_stderr: bool) {
        let line = if is_stderr {
            format!("! {}", line)
        } else {
            line.to_string()
        };

        if self.config.compact {
            let mut buffer = self.tail_buffer.lock();
            buffer.push_back(line);
            while buffer.len() > self.config.error_tail {
                buffer.pop_front();
            }
        } else {
            self.log(LogLevel::Debug, MessagePrefix::None, &line);
        }
    }

    /// Show the buffered output tail, then clear it.
    pub fn show_tail(&self, context: &str) {
        let lines: Vec<String> = {
            let mut buffer = self.tail_buffer.lock();
            buffer.drain(..).collect()
        };
        if lines.is_empty() {
            return;
        }
        self.log(
            LogLevel::Warn,
            MessagePrefix::Section,
            &format!("last {} lines of {}", lines.len(), context),
        );
        for line in &lines {
            self.log(LogLevel::Warn, MessagePrefix::None, line);
        }
    }

    /// Snapshot of the buffered tail.
    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Flush buffered output to disk.
    pub fn flush(&self) {
        let mut guard = self.writer.lock();
        if let Some(writer) = guard.as_mut() {
            let _ = writer.flush();
        }
    }

    /// Close the log file, flushing remaining output.
    pub fn close(&self) {
        let mut guard = self.writer.lock();
        if let Some(mut writer) = guard.take() {
            let _ = writer.flush();
        }
    }
}

impl Drop for JobLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Builder for [`JobLogger`].
pub struct JobLoggerBuilder {
    job_name: String,
    job_dir: PathBuf,
    config: LogConfig,
    sink: Option<LogSink>,
}

impl JobLoggerBuilder {
    /// Start building a logger for the given job and state directory.
    pub fn new(job_name: impl Into<String>, job_dir: impl Into<PathBuf>) -> Self {
        Self {
            job_name: job_name.into(),
            job_dir: job_dir.into(),
            config: LogConfig::default(),
            sink: None,
        }
    }

    /// Set the log configuration.
    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a console sink.
    pub fn sink(mut self, sink: LogSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the logger.
    pub fn build(self) -> std::io::Result<JobLogger> {
        JobLogger::new(&self.job_name, &self.job_dir, self.config, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn collecting_sink() -> (LogSink, Arc<Mutex<Vec<String>>>) {
        let collected = Arc::new(Mutex::new(Vec::new()));
        let handle = Arc::clone(&collected);
        let sink: LogSink = Box::new(move |line| {
            handle.lock().push(line.to_string());
        });
        (sink, collected)
    }

    #[test]
    fn creates_log_file_in_job_dir() {
        let dir = tempdir().unwrap();
        let logger = JobLogger::new("test-job", dir.path(), LogConfig::default(), None).unwrap();
        assert_eq!(logger.job_name(), "test-job");
        assert_eq!(logger.log_path(), dir.path().join("job.log"));
        assert!(logger.log_path().exists());
    }

    #[test]
    fn writes_messages_to_file() {
        let dir = tempdir().unwrap();
        let logger = JobLogger::new("test-job", dir.path(), LogConfig::default(), None).unwrap();
        logger.info("hello from the pipeline");
        logger.close();

        let contents = std::fs::read_to_string(dir.path().join("job.log")).unwrap();
        assert!(contents.contains("hello from the pipeline"));
    }

    #[test]
    fn sink_receives_formatted_lines() {
        let dir = tempdir().unwrap();
        let (sink, collected) = collecting_sink();
        let logger =
            JobLogger::new("test-job", dir.path(), LogConfig::default(), Some(sink)).unwrap();
        logger.success("all done");

        let lines = collected.lock();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[SUCCESS] all done"));
    }

    #[test]
    fn sink_is_level_filtered_but_file_is_not() {
        let dir = tempdir().unwrap();
        let (sink, collected) = collecting_sink();
        let logger =
            JobLogger::new("test-job", dir.path(), LogConfig::default(), Some(sink)).unwrap();
        logger.debug("probe output");
        logger.close();

        assert!(collected.lock().is_empty());
        let contents = std::fs::read_to_string(dir.path().join("job.log")).unwrap();
        assert!(contents.contains("[DEBUG] probe output"));
    }

    #[test]
    fn compact_mode_collapses_progress_updates() {
        let dir = tempdir().unwrap();
        let (sink, collected) = collecting_sink();
        let logger =
            JobLogger::new("test-job", dir.path(), LogConfig::default(), Some(sink)).unwrap();
        logger.progress(5, "downloading");
        logger.progress(7, "downloading");
        logger.progress(45, "downloading");

        assert_eq!(collected.lock().len(), 2);
    }

    #[test]
    fn tail_buffer_is_capped_at_error_tail() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            error_tail: 5,
            ..LogConfig::default()
        };
        let logger = JobLogger::new("test-job", dir.path(), config, None).unwrap();
        for i in 0..20 {
            logger.output_line(&format!("line {}", i), false);
        }

        let tail = logger.get_tail();
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0], "line 15");
        assert_eq!(tail[4], "line 19");
    }

    #[test]
    fn show_tail_drains_the_buffer() {
        let dir = tempdir().unwrap();
        let (sink, collected) = collecting_sink();
        let logger =
            JobLogger::new("test-job", dir.path(), LogConfig::default(), Some(sink)).unwrap();
        logger.output_line("something broke", true);
        logger.show_tail("tool output");

        assert!(logger.get_tail().is_empty());
        let lines = collected.lock();
        assert!(lines.iter().any(|l| l.contains("last 1 lines of tool output")));
        assert!(lines.iter().any(|l| l.contains("! something broke")));
    }

    #[test]
    fn non_compact_mode_logs_output_directly() {
        let dir = tempdir().unwrap();
        let logger = JobLogger::new("test-job", dir.path(), LogConfig::debug(), None).unwrap();
        logger.output_line("verbose line", false);
        logger.close();

        assert!(logger.get_tail().is_empty());
        let contents = std::fs::read_to_string(dir.path().join("job.log")).unwrap();
        assert!(contents.contains("verbose line"));
    }
}
