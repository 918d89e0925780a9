//! CSV result log

use csv::{Writer, WriterBuilder};
use esperf_core::{RecordError, Recorder, RequestRecord};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Append-only CSV log shared by all workers
///
/// Every row is written and flushed while holding one lock, so rows from
/// concurrent workers never interleave and each one is on disk before
/// `record` returns.
pub struct CsvRecorder<W: Write + Send = File> {
    writer: Mutex<Writer<W>>,
    written: AtomicU64,
}

impl CsvRecorder<File> {
    /// Create (or truncate) the log file at `path`
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        tracing::info!(path = %path.display(), "Opened result log");
        Ok(Self::from_writer(file))
    }
}

impl<W: Write + Send> CsvRecorder<W> {
    /// Wrap an arbitrary writer
    pub fn from_writer(writer: W) -> Self {
        let writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_writer(writer);
        Self {
            writer: Mutex::new(writer),
            written: AtomicU64::new(0),
        }
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W, RecordError> {
        let writer = self
            .writer
            .into_inner()
            .map_err(|_| RecordError::Poisoned)?;
        writer
            .into_inner()
            .map_err(|e| RecordError::Io(e.into_error()))
    }
}

impl<W: Write + Send> Recorder for CsvRecorder<W> {
    fn record(&self, record: &RequestRecord) -> Result<(), RecordError> {
        let row = record.to_row();
        let mut writer = self.writer.lock().map_err(|_| RecordError::Poisoned)?;
        writer.write_record(&row).map_err(io::Error::from)?;
        writer.flush()?;
        self.written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }
}

impl<W: Write + Send> std::fmt::Debug for CsvRecorder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvRecorder")
            .field("records_written", &self.records_written())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use esperf_core::{ROW_COLUMNS, TIME_FORMAT};
    use std::sync::Arc;
    use std::thread;

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_owned).collect())
            .collect()
    }

    fn success_record() -> RequestRecord {
        let start = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        RequestRecord {
            started_at: Some(start),
            ended_at: Some(start + chrono::Duration::milliseconds(150)),
            condition_id: Some(4),
            error: None,
            status_code: Some(200),
            hits: 99,
        }
    }

    #[test]
    fn test_writes_one_row_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("esperf.log");
        let recorder = CsvRecorder::create(&path).unwrap();

        let record = success_record();
        recorder.record(&record).unwrap();
        recorder.record(&record).unwrap();

        assert_eq!(recorder.records_written(), 2);

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 2);
        let start = record.started_at.unwrap().format(TIME_FORMAT).to_string();
        let end = record.ended_at.unwrap().format(TIME_FORMAT).to_string();
        assert_eq!(
            rows[0],
            vec![start.as_str(), end.as_str(), "150", "4", "0", "", "200", "99"]
        );
    }

    #[test]
    fn test_missing_values_are_empty_fields() {
        let mut buf = Vec::new();
        {
            let recorder = CsvRecorder::from_writer(&mut buf);
            recorder
                .record(&RequestRecord {
                    error: Some("connection refused".into()),
                    ..Default::default()
                })
                .unwrap();
        }

        assert_eq!(String::from_utf8(buf).unwrap(), ",,,,1,connection refused,,0\n");
    }

    #[test]
    fn test_error_message_is_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("esperf.log");
        let recorder = CsvRecorder::create(&path).unwrap();

        let message = "bad \"thing\", then\nanother line";
        recorder
            .record(&RequestRecord {
                error: Some(message.into()),
                status_code: Some(200),
                ..success_record()
            })
            .unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), ROW_COLUMNS);
        assert_eq!(rows[0][4], "1");
        assert_eq!(rows[0][5], message);
        assert_eq!(rows[0][6], "200");
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("esperf.log");
        std::fs::write(&path, "stale,row\n").unwrap();

        let recorder = CsvRecorder::create(&path).unwrap();
        recorder.record(&success_record()).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][3], "4");
    }

    #[test]
    fn test_concurrent_writers_never_interleave() {
        const THREADS: usize = 16;
        const PER_THREAD: usize = 200;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("esperf.log");
        let recorder = Arc::new(CsvRecorder::create(&path).unwrap());

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let recorder = Arc::clone(&recorder);
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        let record = RequestRecord {
                            condition_id: Some(t as i64),
                            error: Some(format!("worker {t}, attempt {i}\n\"quoted\"")),
                            hits: i as u64,
                            ..success_record()
                        };
                        recorder.record(&record).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(recorder.records_written(), (THREADS * PER_THREAD) as u64);

        let rows = read_rows(&path);
        assert_eq!(rows.len(), THREADS * PER_THREAD);
        for row in &rows {
            assert_eq!(row.len(), ROW_COLUMNS);
            let t: usize = row[3].parse().unwrap();
            let i: usize = row[7].parse().unwrap();
            assert_eq!(row[5], format!("worker {t}, attempt {i}\n\"quoted\""));
        }
    }

    #[test]
    fn test_into_inner_returns_writer() {
        let recorder = CsvRecorder::from_writer(Vec::new());
        recorder.record(&success_record()).unwrap();

        let buf = recorder.into_inner().unwrap();
        assert!(String::from_utf8(buf).unwrap().ends_with(",200,99\n"));
    }
}
