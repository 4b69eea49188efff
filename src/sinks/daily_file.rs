//! Daily rotating file sink
//!
//! Writes to `<dir>/<prefix>-YYYY-MM-DD.log`, switching to a new file the
//! first time a line is written on a new local date. A stable
//! `<dir>/<prefix>.log` link always names the current file (unix only), and
//! dated files older than the retention window are deleted on rotation.

use crate::core::{LogLevel, LoggerError, Result, Sink};
use chrono::{Local, NaiveDate};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of "today"; replaceable so rotation can be driven in tests
pub type DateSource = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_PREFIX: &str = "server";
const DEFAULT_MAX_AGE_DAYS: u32 = 30;

/// Daily rotating file sink
///
/// # Examples
///
/// ```no_run
/// use rust_log_facade::sinks::DailyFileSink;
///
/// // ./logs/server-2025-01-08.log, linked from ./logs/server.log, kept 30 days
/// let sink = DailyFileSink::new("./logs").unwrap();
///
/// let sink = DailyFileSink::builder("./logs")
///     .prefix("api")
///     .max_age_days(7)
///     .compress(true)
///     .build()
///     .unwrap();
/// ```
pub struct DailyFileSink {
    dir: PathBuf,
    prefix: String,
    max_age_days: u32,
    compress: bool,
    today: DateSource,
    writer: Option<BufWriter<File>>,
    current_date: NaiveDate,
    current_path: PathBuf,
}

pub struct DailyFileSinkBuilder {
    dir: PathBuf,
    prefix: String,
    max_age_days: u32,
    compress: bool,
    today: DateSource,
}

impl DailyFileSinkBuilder {
    #[must_use = "builder methods return a new value"]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Dated files older than this many days are deleted on rotation
    #[must_use = "builder methods return a new value"]
    pub fn max_age_days(mut self, days: u32) -> Self {
        self.max_age_days = days;
        self
    }

    /// Gzip each finished day's file when rotating away from it
    #[must_use = "builder methods return a new value"]
    pub fn compress(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn date_source(mut self, today: DateSource) -> Self {
        self.today = today;
        self
    }

    /// Create the directory and open today's file
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created
    pub fn build(self) -> Result<DailyFileSink> {
        if self.prefix.is_empty() {
            return Err(LoggerError::config("DailyFileSink", "prefix must not be empty"));
        }

        fs::create_dir_all(&self.dir).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", self.dir.display()),
                e,
            )
        })?;

        let current_date = (self.today)();
        let mut sink = DailyFileSink {
            current_path: PathBuf::new(),
            dir: self.dir,
            prefix: self.prefix,
            max_age_days: self.max_age_days,
            compress: self.compress,
            today: self.today,
            writer: None,
            current_date,
        };
        sink.open_for(current_date)?;
        sink.purge_expired();
        Ok(sink)
    }
}

impl DailyFileSink {
    /// Daily sink with the default prefix (`server`) and 30-day retention
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        Self::builder(dir).build()
    }

    pub fn builder(dir: impl AsRef<Path>) -> DailyFileSinkBuilder {
        DailyFileSinkBuilder {
            dir: dir.as_ref().to_path_buf(),
            prefix: DEFAULT_PREFIX.to_string(),
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            compress: false,
            today: Arc::new(|| Local::now().date_naive()),
        }
    }

    /// File currently being written
    #[must_use]
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Stable name pointing at the current file
    #[must_use]
    pub fn link_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.prefix))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}-{}.log", self.prefix, date.format(DATE_FORMAT)))
    }

    fn open_for(&mut self, date: NaiveDate) -> Result<()> {
        let path = self.path_for(date);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::file_sink(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        self.writer = Some(BufWriter::new(file));
        self.current_date = date;
        self.current_path = path;
        self.update_link();
        Ok(())
    }

    #[cfg(unix)]
    fn update_link(&self) {
        let link = self.link_path();
        if fs::symlink_metadata(&link).is_ok() {
            let _ = fs::remove_file(&link);
        }
        // Relative target keeps the link valid if the directory moves
        if let Some(target) = self.current_path.file_name() {
            if let Err(e) = std::os::unix::fs::symlink(target, &link) {
                eprintln!(
                    "[WARN] Failed to link {} -> {}: {}",
                    link.display(),
                    self.current_path.display(),
                    e
                );
            }
        }
    }

    #[cfg(not(unix))]
    fn update_link(&self) {}

    fn rotate(&mut self, date: NaiveDate) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_sink(
                    self.current_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let finished = self.current_path.clone();
        self.open_for(date)?;

        if self.compress && finished.exists() {
            if let Err(e) = compress_file(&finished) {
                eprintln!("[WARN] Failed to compress {}: {}", finished.display(), e);
            }
        }

        self.purge_expired();
        Ok(())
    }

    /// Delete dated files (plain or gzipped) older than the retention window
    fn purge_expired(&self) {
        let today = (self.today)();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("[WARN] Failed to scan {}: {}", self.dir.display(), e);
                return;
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(date) = name.to_str().and_then(|n| self.date_of(n)) else {
                continue;
            };
            if (today - date).num_days() > i64::from(self.max_age_days) {
                if let Err(e) = fs::remove_file(entry.path()) {
                    eprintln!(
                        "[WARN] Failed to remove expired log {}: {}",
                        entry.path().display(),
                        e
                    );
                }
            }
        }
    }

    /// Date embedded in a file name produced by this sink, if any
    fn date_of(&self, file_name: &str) -> Option<NaiveDate> {
        let rest = file_name.strip_prefix(&self.prefix)?.strip_prefix('-')?;
        let date = rest
            .strip_suffix(".log")
            .or_else(|| rest.strip_suffix(".log.gz"))?;
        NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
    }
}

/// Gzip `path` to `path.gz`, removing the original only after success.
///
/// Streams through a temporary file so a failed compression never loses the
/// original.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, Read};

    let gz_path = path.with_extension("log.gz");
    let temp_gz_path = path.with_extension("log.gz.tmp");

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary file: {}", temp_gz_path.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let mut buffer = vec![0u8; 64 * 1024];
    let streamed: std::io::Result<()> = (|| {
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            encoder.write_all(&buffer[..bytes_read])?;
        }
        encoder.finish()?.flush()
    })();

    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[WARN] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }

    Ok(())
}

impl Sink for DailyFileSink {
    fn write_line(&mut self, _level: LogLevel, text: &str) -> Result<()> {
        let today = (self.today)();
        if today != self.current_date {
            self.rotate(today)?;
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Daily file writer not initialized"))?;
        writer.write_all(text.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "daily_file"
    }
}

impl Drop for DailyFileSink {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
