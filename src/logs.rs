use std::{
    path::Path,
    sync::{LazyLock, Mutex},
};

use anyhow::Result;
use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    {ContentLimit, FileRotate},
};
use log::Log;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

type LogSink = Box<dyn Fn(&str) + Send>;

/// Optional host callback that gets a copy of every log line.
static LOG_SINK: LazyLock<Mutex<Option<LogSink>>> = LazyLock::new(|| Mutex::new(None));

struct MainLogger {
    write_logger: Box<WriteLogger<FileRotate<AppendTimestamp>>>,
}

impl Log for MainLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.write_logger.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        self.write_logger.log(record);

        if !self.enabled(record.metadata()) {
            return;
        }
        // `try_lock` so a sink that logs by itself cannot deadlock
        if let Ok(guard) = LOG_SINK.try_lock() {
            if let Some(sink) = guard.as_ref() {
                sink(&format!(
                    "{}:{} -- {}",
                    record.level(),
                    record.target(),
                    record.args()
                ));
            }
        }
    }

    fn flush(&self) {
        self.write_logger.flush();
    }
}

pub fn init(cache_dir: &str) -> Result<()> {
    let path = Path::new(cache_dir).join("logs/main.log");
    let log = FileRotate::new(
        path,
        AppendTimestamp::default(FileLimit::MaxFiles(3)),
        ContentLimit::Lines(1000),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let write_logger = WriteLogger::new(LevelFilter::Info, config, log);
    log::set_boxed_logger(Box::new(MainLogger { write_logger }))?;
    log::set_max_level(LevelFilter::Info);
    Ok(())
}

pub fn set_sink<F>(sink: F)
where
    F: Fn(&str) + Send + 'static,
{
    let mut guard = LOG_SINK.lock().unwrap();
    *guard = Some(Box::new(sink));
}
