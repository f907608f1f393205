pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read config from {}.", path.display())]
	ReadConfig { path: std::path::PathBuf, source: std::io::Error },
	#[error("Config at {} is not valid TOML.", path.display())]
	ParseConfig { path: std::path::PathBuf, source: toml::de::Error },
	#[error("Invalid config: {message}")]
	Validation { message: String },
}
