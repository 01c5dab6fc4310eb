/// Where decoded samples go. Each successfully decoded broadcast is handed to
/// the sink exactly once.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::info;

use crate::{broadcast::DecodedSample, Result};

pub trait SampleSink: Send {
    fn record(&mut self, sample: DecodedSample) -> Result<()>;
}

/// Keeps the latest heart rate in a text file, overwriting it on every
/// sample so readers always see a single value.
#[derive(Clone, Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileSink {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleSink for FileSink {
    fn record(&mut self, sample: DecodedSample) -> Result<()> {
        fs::write(&self.path, sample.heart_rate.to_string())?;
        Ok(())
    }
}

/// Shows each heart rate in the log while display is on. Clones share the
/// display switch, so a console can keep one to toggle it.
#[derive(Clone, Debug)]
pub struct LogSink {
    display: Arc<AtomicBool>,
}

impl LogSink {
    pub fn new() -> Self {
        LogSink {
            display: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_displaying(&self) -> bool {
        self.display.load(Ordering::SeqCst)
    }

    /// Flips the display switch and returns the new setting.
    pub fn toggle_display(&self) -> bool {
        !self.display.fetch_xor(true, Ordering::SeqCst)
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSink for LogSink {
    fn record(&mut self, sample: DecodedSample) -> Result<()> {
        if self.is_displaying() {
            info!("Heart rate: {}", sample.heart_rate);
        }
        Ok(())
    }
}

/// Hands every sample to both sinks. The second sink still sees a sample the
/// first one failed on; the first error is returned.
#[derive(Clone, Debug)]
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: SampleSink, B: SampleSink> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Tee { first, second }
    }
}

impl<A: SampleSink, B: SampleSink> SampleSink for Tee<A, B> {
    fn record(&mut self, sample: DecodedSample) -> Result<()> {
        let first = self.first.record(sample);
        let second = self.second.record(sample);
        first.and(second)
    }
}

impl<S: SampleSink + ?Sized> SampleSink for Box<S> {
    fn record(&mut self, sample: DecodedSample) -> Result<()> {
        (**self).record(sample)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn file_sink_overwrites_latest_value() {
        let path = std::env::temp_dir().join(format!("antchannel-hr-{}.txt", std::process::id()));
        let mut sink = FileSink::new(&path);
        sink.record(DecodedSample { heart_rate: 128 }).unwrap();
        sink.record(DecodedSample { heart_rate: 72 }).unwrap();
        assert_eq!(fs::read_to_string(sink.path()).unwrap(), "72");
        fs::remove_file(&path).unwrap();
    }

    #[derive(Clone, Default)]
    struct Collect(Arc<std::sync::Mutex<Vec<u8>>>);

    impl SampleSink for Collect {
        fn record(&mut self, sample: DecodedSample) -> Result<()> {
            self.0.lock().unwrap().push(sample.heart_rate);
            Ok(())
        }
    }

    #[test]
    fn display_toggle_is_shared_between_clones() {
        let sink = LogSink::new();
        let console = sink.clone();
        assert!(sink.is_displaying());
        assert!(!console.toggle_display());
        assert!(!sink.is_displaying());
        assert!(console.toggle_display());
        assert!(sink.is_displaying());
    }

    #[test]
    fn tee_records_into_both_sinks() {
        let path = std::env::temp_dir().join(format!("antchannel-tee-{}.txt", std::process::id()));
        let collect = Collect::default();
        let mut sink = Tee::new(FileSink::new(&path), collect.clone());
        sink.record(DecodedSample { heart_rate: 90 }).unwrap();
        sink.record(DecodedSample { heart_rate: 91 }).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "91");
        assert_eq!(*collect.0.lock().unwrap(), vec![90, 91]);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn tee_keeps_recording_after_a_failure() {
        let missing = std::env::temp_dir()
            .join("antchannel-missing-dir")
            .join("tee.txt");
        let collect = Collect::default();
        let mut sink = Tee::new(FileSink::new(&missing), collect.clone());
        assert!(sink.record(DecodedSample { heart_rate: 70 }).is_err());
        assert_eq!(*collect.0.lock().unwrap(), vec![70]);
    }

    #[test]
    fn file_sink_reports_io_errors() {
        let path = std::env::temp_dir()
            .join("antchannel-missing-dir")
            .join("nested")
            .join("hr.txt");
        let mut sink = FileSink::new(&path);
        assert!(sink.record(DecodedSample { heart_rate: 60 }).is_err());
    }
}
