//! Logging (SPEC_FULL §2 "Ambient stack"): `log` facade + `log4rs` file
//! appender initialized from `--logfile`/`--loglevel`, console messages
//! mirrored to the log file with ANSI stripped, and a `catch_fatal!` panic
//! hook, all grounded on the reference implementation's `cli::logger`
//! (trimmed of its file-formatting-specific prefixes, which have no
//! counterpart here).

use std::{
    error::Error,
    fmt,
    io::{self, Cursor, Read, Seek, SeekFrom, Write},
    panic,
    sync::Mutex,
};

use backtrace::Backtrace;
use clap::ArgMatches;
use colored::{ColoredString, Colorize};
use log::{LevelFilter, Record};
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::{pattern::PatternEncoder, Encode, Write as LogWrite},
    Handle,
};

static DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

lazy_static! {
    static ref PREFIX_ERR: ColoredString = "error".bright_red();
    static ref PREFIX_FATAL: ColoredString = "fatal".on_bright_red();
    static ref LOGGER_HANDLE: Mutex<Option<Handle>> = Mutex::new(None);
}

/// Runs `$body`, installing a panic hook that logs a backtrace for any
/// *unexpected* panic (one not carrying a `Fatal` payload, i.e. not raised
/// by `logger::fatal`); `$catch` runs when the body panicked via `fatal`.
#[macro_export]
macro_rules! catch_fatal {
    ($body: block, $catch: block) => {
        std::panic::set_hook(Box::new(|info| {
            if !info.payload().is::<$crate::cli::logger::Fatal>() {
                let backtrace = backtrace::Backtrace::new();
                println!("{}", info);
                log::error!("{}", info);
                println!("{:?}", backtrace);
                log::error!("{:?}", backtrace);
            }
        }));

        if let Err(err) = std::panic::catch_unwind(|| $body) {
            if err.is::<$crate::cli::logger::Fatal>() {
                $catch
                let _ = std::panic::take_hook();
            } else {
                std::panic::resume_unwind(err)
            }
        }
    };
}

#[derive(Debug)]
pub struct Fatal;

impl fmt::Display for Fatal {
    fn fmt(&self, _f: &mut fmt::Formatter) -> fmt::Result {
        Ok(())
    }
}

impl Error for Fatal {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

pub fn init(matches: &ArgMatches) {
    if let Some(log_file) = matches.value_of("logfile") {
        let log_level = match matches.value_of("loglevel") {
            Some("error") => LevelFilter::Error,
            Some("warn") => LevelFilter::Warn,
            Some("info") => LevelFilter::Info,
            Some("debug") => LevelFilter::Debug,
            Some("trace") => LevelFilter::Trace,
            _ => DEFAULT_LOG_LEVEL,
        };

        let pattern_encoder = PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {l} - {m}{n}");
        let sanitized_encoder = SanitizedEncoder::wrap(pattern_encoder);

        let file_appender = match FileAppender::builder().encoder(Box::new(sanitized_encoder)).build(log_file) {
            Ok(appender) => appender,
            Err(err) => panic!("failed to build log file appender: {}", err),
        };

        let config = match Config::builder()
            .appender(Appender::builder().build("file", Box::new(file_appender)))
            .build(Root::builder().appender("file").build(log_level))
        {
            Ok(config) => config,
            Err(err) => panic!("failed to build logger configuration: {}", err),
        };

        let mut handle_opt = LOGGER_HANDLE.lock().unwrap();
        if handle_opt.is_none() {
            match log4rs::init_config(config) {
                Ok(handle) => *handle_opt = Some(handle),
                Err(err) => panic!("failed to initialize logger: {}", err),
            }
        } else if let Some(ref handle) = *handle_opt {
            handle.set_config(config);
        }
    }
}

pub fn info(string: &str) {
    println!("{}", string);
    log::info!("{}", string);
}

pub fn err(string: &str) {
    println!("{}: {}", *PREFIX_ERR, string);
    log::error!("{}", string);
}

/// Logs `string` as a fatal error and unwinds with a `Fatal` payload,
/// letting `catch_fatal!` stop that unwind without printing a backtrace
/// (this is an expected, already-reported failure, not a bug).
pub fn fatal(string: &str) -> ! {
    println!("{}: {}", *PREFIX_FATAL, string);
    log::error!("{}", string);
    panic::panic_any(Fatal)
}

#[derive(Debug)]
struct SanitizedEncoder {
    encoder: Box<dyn Encode>,
}

impl SanitizedEncoder {
    fn wrap(encoder: impl Encode) -> Self {
        SanitizedEncoder { encoder: Box::new(encoder) }
    }
}

impl Encode for SanitizedEncoder {
    fn encode(&self, w: &mut dyn LogWrite, record: &Record) -> Result<(), Box<dyn Error + Sync + Send>> {
        let mut writer = SanitizedLogWriter::new();
        self.encoder.encode(&mut writer, record)?;
        writer.sanitize_write(w)?;
        Ok(())
    }
}

struct SanitizedLogWriter {
    cursor: Cursor<Vec<u8>>,
}

impl SanitizedLogWriter {
    fn new() -> Self {
        SanitizedLogWriter { cursor: Cursor::new(Vec::new()) }
    }

    fn sanitize_write(&mut self, w: &mut dyn LogWrite) -> io::Result<usize> {
        let mut buf = Vec::new();
        self.cursor.seek(SeekFrom::Start(0))?;
        self.cursor.read_to_end(&mut buf)?;

        let sanitized = strip_ansi_escapes::strip(buf)?;
        w.write(&sanitized)
    }
}

impl Write for SanitizedLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.cursor.flush()
    }
}

impl LogWrite for SanitizedLogWriter {}
