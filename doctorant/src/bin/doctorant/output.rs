//! Output files

// Imports
use {
	anyhow::Context,
	std::{
		io::BufWriter,
		path::{Path, PathBuf},
	},
	tempfile::NamedTempFile,
};

/// Output file.
///
/// Written to a temporary file next to `path`, which only replaces
/// `path` once [`persist`](Self::persist) is called. If dropped before,
/// nothing is left behind.
#[derive(Debug)]
pub struct OutputFile {
	/// Final path
	path: PathBuf,

	/// Temporary file
	file: BufWriter<NamedTempFile>,
}

impl OutputFile {
	/// Creates a new output file for `path`
	pub fn create(path: &Path) -> Result<Self, anyhow::Error> {
		let dir = match path.parent() {
			Some(dir) if !dir.as_os_str().is_empty() => dir,
			_ => Path::new("."),
		};
		let file = NamedTempFile::new_in(dir).with_context(|| format!("Unable to create temporary file in {dir:?}"))?;

		Ok(Self {
			path: path.to_owned(),
			file: BufWriter::new(file),
		})
	}

	/// Returns the writer
	pub fn writer(&mut self) -> &mut BufWriter<NamedTempFile> {
		&mut self.file
	}

	/// Flushes and moves the file to its final path
	pub fn persist(self) -> Result<(), anyhow::Error> {
		let file = self
			.file
			.into_inner()
			.map_err(|err| err.into_error())
			.with_context(|| format!("Unable to flush {:?}", self.path))?;
		file.persist(&self.path)
			.with_context(|| format!("Unable to write {:?}", self.path))?;

		Ok(())
	}
}
