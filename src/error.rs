//! Error types for the trainer's I/O boundaries (config, bank files, session store).
//!
//! Engine operations never fail and do not use this type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainerError {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("TOML error: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("Invalid question {id}: {reason}")]
  InvalidQuestion { id: String, reason: String },

  #[error("Config error: {0}")]
  Config(String),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
