//! Logger
//!
//! Logs to stderr, filtered by `RUST_LOG` (`info` by default), and optionally
//! to a file, filtered by `RUST_LOG_FILE` (`debug` by default).

// Imports
use {
	std::{fs, io, path::Path, sync::Arc},
	tracing::metadata::LevelFilter,
	tracing_subscriber::{prelude::*, EnvFilter},
};

/// Logging before the logger is initialized.
///
/// Messages are buffered and replayed by [`init`](super::init).
pub mod pre_init {
	// Imports
	use std::sync::Mutex;

	/// Buffered message level
	#[derive(Clone, Copy, Debug)]
	pub(super) enum Level {
		Debug,
		Warn,
	}

	/// Buffered messages
	static MESSAGES: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

	/// Buffers a debug message
	pub fn debug(message: impl Into<String>) {
		self::push(Level::Debug, message.into());
	}

	/// Buffers a warning message
	pub fn warn(message: impl Into<String>) {
		self::push(Level::Warn, message.into());
	}

	fn push(level: Level, message: String) {
		// Note: A poisoned lock only means another thread panicked while pushing
		let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
		messages.push((level, message));
	}

	/// Takes all buffered messages
	pub(super) fn take() -> Vec<(Level, String)> {
		let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
		std::mem::take(&mut *messages)
	}
}

/// Initializes the logger.
///
/// If `log_file` is given, logs are also written to it, appending if `log_file_append` is set.
pub fn init(log_file: Option<&Path>, log_file_append: bool) {
	let term_layer = tracing_subscriber::fmt::layer()
		.with_writer(io::stderr)
		.with_filter(self::env_filter("RUST_LOG", LevelFilter::INFO));

	let file_layer = log_file.and_then(|path| {
		let file = fs::OpenOptions::new()
			.create(true)
			.write(true)
			.append(log_file_append)
			.truncate(!log_file_append)
			.open(path);

		match file {
			Ok(file) => Some(
				tracing_subscriber::fmt::layer()
					.with_ansi(false)
					.with_writer(Arc::new(file))
					.with_filter(self::env_filter("RUST_LOG_FILE", LevelFilter::DEBUG)),
			),
			Err(err) => {
				pre_init::warn(format!("Unable to open log file {path:?}: {err}"));
				None
			},
		}
	});

	if let Err(err) = tracing_subscriber::registry()
		.with(term_layer)
		.with(file_layer)
		.try_init()
	{
		eprintln!("Unable to initialize logger: {err}");
	}

	for (level, message) in pre_init::take() {
		match level {
			pre_init::Level::Debug => tracing::debug!("{message}"),
			pre_init::Level::Warn => tracing::warn!("{message}"),
		}
	}
}

/// Creates an env filter from `var`, falling back to `default`
fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
	EnvFilter::builder()
		.with_default_directive(default.into())
		.with_env_var(var)
		.from_env_lossy()
}
