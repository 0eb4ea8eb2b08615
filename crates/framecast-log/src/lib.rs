use chrono::Local;
use log::{set_boxed_logger, set_max_level, Level, Log, SetLoggerError};
use std::io::{stdout, BufWriter, Write};
use std::sync::{mpsc, OnceLock};
use std::thread;

pub enum LogCommand {
    Record(String),
    Flush,
    Terminate,
}

static SHUTDOWN_SENDER: OnceLock<mpsc::SyncSender<LogCommand>> = OnceLock::new();

/// A `log::Log` implementor that hands formatted records to a dedicated
/// background thread, so logging never blocks the receive/send loop.
pub struct FramecastLogger {
    max_level: Level,
    sender: mpsc::SyncSender<LogCommand>,
}

impl FramecastLogger {
    fn new(max_level: Level, buffer_size: usize) -> (Self, mpsc::Receiver<LogCommand>) {
        let (sender, receiver) = mpsc::sync_channel(buffer_size);
        (FramecastLogger { max_level, sender }, receiver)
    }

    /// Spawns the writer thread and installs this logger as the global `log` sink.
    pub fn init(max_level: Level) -> Result<(), SetLoggerError> {
        Self::init_with_buffer(max_level, 1024)
    }

    pub fn init_with_buffer(max_level: Level, buffer_size: usize) -> Result<(), SetLoggerError> {
        let (logger, receiver) = FramecastLogger::new(max_level, buffer_size);
        let _ = SHUTDOWN_SENDER.set(logger.sender.clone());

        thread::Builder::new()
            .name("framecast-log-writer".into())
            .spawn(move || {
                let mut writer = BufWriter::new(stdout());
                while let Ok(command) = receiver.recv() {
                    match command {
                        LogCommand::Record(message) => {
                            if let Err(e) = writer.write_all(message.as_bytes()) {
                                eprintln!("[framecast-log] failed to write record: {e}");
                            }
                        }
                        LogCommand::Flush => {
                            if let Err(e) = writer.flush() {
                                eprintln!("[framecast-log] failed to flush: {e}");
                            }
                        }
                        LogCommand::Terminate => {
                            let _ = writer.flush();
                            break;
                        }
                    }
                }
                // Channel closed or termination requested. Ensure final flush.
                let _ = writer.flush();
            })
            .expect("failed to spawn log writer thread");

        set_boxed_logger(Box::new(logger))?;
        set_max_level(max_level.to_level_filter());
        Ok(())
    }

    /// Asks the writer thread to flush and exit cleanly. Unlike `flush()`
    /// (which can be called through the `log::Log` trait object `log`
    /// hands back), this needs the sender stashed at `init` time since
    /// shutting down isn't part of the `Log` trait.
    pub fn shutdown() {
        if let Some(sender) = SHUTDOWN_SENDER.get() {
            let _ = sender.send(LogCommand::Terminate);
        }
    }
}

impl Log for FramecastLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let now = Local::now();
        let message = format!(
            "{} {} [{}] {}\n",
            now.format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );
        if let Err(e) = self.sender.try_send(LogCommand::Record(message)) {
            eprintln!("[framecast-log] failed to send record: {e}");
        }
    }

    fn flush(&self) {
        let _ = self.sender.send(LogCommand::Flush);
    }
}
