use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::builder::ModelBuilder;
use crate::model::ngram_model::NGramModel;

/// Extension of stored models (JSON wire form).
pub const MODEL_EXTENSION: &str = "json";

/// Extension of the binary cache written next to a corpus file.
pub const CACHE_EXTENSION: &str = "bin";

/// Extension of the [`ModelInfo`] sidecar of a stored model.
pub const INFO_EXTENSION: &str = "meta";

/// Description and creation time of a stored model, kept in `<name>.meta`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
	pub description: String,
	pub created_at: DateTime<Utc>,
}

/// Reads a whole corpus file into memory.
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	fs::read_to_string(filename)
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `corpus/fables.txt` + `"bin"` → `corpus/fables.bin`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./corpus/fables.txt"` → `"fables"`
/// - `"fables.txt"` → `"fables"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	Ok(files)
}

/// Loads the model of a corpus file, building it on first use.
///
/// - If `<stem>.bin` exists next to the corpus, it is decoded with `postcard`.
/// - Otherwise the corpus is read, built with `config`, and the cache written.
///
/// The cache is not invalidated when the corpus or the config changes,
/// delete the `.bin` file to rebuild.
pub fn load_or_build<P: AsRef<Path>>(corpus_path: P, config: &Config) -> Result<NGramModel> {
	let cache_path = build_output_path(&corpus_path, CACHE_EXTENSION)?;
	if cache_path.exists() {
		info!("loading cached model {}", cache_path.display());
		return NGramModel::from_bytes(&fs::read(&cache_path)?);
	}

	let text = read_corpus(&corpus_path)?;
	let model = ModelBuilder::from_config(config)?.build_from_text(&text, &config.tokenizer())?;
	fs::write(&cache_path, model.to_bytes()?)?;
	info!("wrote model cache {}", cache_path.display());
	Ok(model)
}

/// Directory of named models, one `<name>.json` file per model and its
/// `<name>.meta` sidecar.
#[derive(Clone, Debug)]
pub struct ModelStore {
	root: PathBuf,
}

impl ModelStore {
	/// Opens a store rooted at `root`, creating the directory if needed.
	pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
		let root = root.as_ref().to_path_buf();
		fs::create_dir_all(&root)?;
		Ok(Self { root })
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Sorted names of the stored models.
	pub fn list(&self) -> Result<Vec<String>> {
		let mut names = list_files(&self.root, MODEL_EXTENSION)?
			.iter()
			.map(get_filename)
			.collect::<io::Result<Vec<_>>>()?;
		names.sort();
		Ok(names)
	}

	pub fn contains(&self, name: &str) -> Result<bool> {
		Ok(self.path(name)?.is_file())
	}

	/// Saves `model` under `name`, replacing any previous model of that name.
	///
	/// A replaced model keeps its description and creation time.
	pub fn save(&self, name: &str, model: &NGramModel) -> Result<()> {
		let path = self.path(name)?;
		fs::write(&path, model.to_json()?)?;
		if !self.info_path(name).is_file() {
			self.write_info(
				name,
				&ModelInfo {
					description: String::new(),
					created_at: Utc::now(),
				},
			)?;
		}
		info!("saved {model} as '{name}'");
		Ok(())
	}

	/// Returns the description and creation time of a stored model.
	///
	/// A model without sidecar gets an empty description and the
	/// modification time of its file.
	pub fn info(&self, name: &str) -> Result<ModelInfo> {
		let path = self.path(name)?;
		if !path.is_file() {
			return Err(Error::ModelNotFound(name.to_owned()));
		}
		match fs::read_to_string(self.info_path(name)) {
			Ok(json) => Ok(serde_json::from_str(&json)?),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ModelInfo {
				description: String::new(),
				created_at: fs::metadata(&path)?.modified()?.into(),
			}),
			Err(e) => Err(e.into()),
		}
	}

	/// Replaces the description of a stored model.
	pub fn describe(&self, name: &str, description: &str) -> Result<()> {
		let mut info = self.info(name)?;
		info.description = description.trim().to_owned();
		self.write_info(name, &info)?;
		debug!("described '{name}'");
		Ok(())
	}

	/// Loads the model stored under `name`.
	///
	/// # Errors
	/// - [`Error::ModelNotFound`] if there is no such model
	/// - [`Error::CorruptModel`] if the file is not a valid wire form
	pub fn load(&self, name: &str) -> Result<NGramModel> {
		let path = self.path(name)?;
		let json = match fs::read_to_string(&path) {
			Ok(json) => json,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::ModelNotFound(name.to_owned())),
			Err(e) => return Err(e.into()),
		};
		let model = NGramModel::from_json(&json)?;
		debug!("loaded '{name}': {model}");
		Ok(model)
	}

	/// Deletes the model stored under `name`, returns `false` if absent.
	pub fn delete(&self, name: &str) -> Result<bool> {
		match fs::remove_file(self.path(name)?) {
			Ok(()) => {
				remove_if_present(&self.info_path(name))?;
				info!("deleted '{name}'");
				Ok(true)
			}
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
			Err(e) => Err(e.into()),
		}
	}

	/// Moves a stored model to a new name.
	///
	/// # Errors
	/// [`Error::InvalidInput`] if `to` is already taken.
	pub fn rename(&self, from: &str, to: &str) -> Result<()> {
		let source = self.path(from)?;
		let target = self.path(to)?;
		if !source.is_file() {
			return Err(Error::ModelNotFound(from.to_owned()));
		}
		if target.exists() {
			return Err(Error::InvalidInput(format!("model '{to}' already exists")));
		}
		fs::rename(source, target)?;
		let info = self.info_path(from);
		if info.is_file() {
			fs::rename(info, self.info_path(to))?;
		}
		info!("renamed '{from}' to '{to}'");
		Ok(())
	}

	fn path(&self, name: &str) -> Result<PathBuf> {
		validate_name(name)?;
		Ok(self.root.join(format!("{name}.{MODEL_EXTENSION}")))
	}

	/// Only called with names already checked by `path`.
	fn info_path(&self, name: &str) -> PathBuf {
		self.root.join(format!("{name}.{INFO_EXTENSION}"))
	}

	fn write_info(&self, name: &str, info: &ModelInfo) -> Result<()> {
		fs::write(self.info_path(name), serde_json::to_string_pretty(info)?)?;
		Ok(())
	}
}

fn remove_if_present(path: &Path) -> io::Result<()> {
	match fs::remove_file(path) {
		Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
		_ => Ok(()),
	}
}

/// Model names become file names: only alphanumerics, `-` and `_`.
fn validate_name(name: &str) -> Result<()> {
	if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
		return Err(Error::InvalidInput(format!("invalid model name {name:?}")));
	}
	Ok(())
}
