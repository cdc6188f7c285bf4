// src/error.rs
//
// Failures of the collaborators around the renderer. Rendering itself never
// fails.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read input file {path}: {source}")]
    ReadInput { path: PathBuf, source: io::Error },

    #[error("failed to read standard input: {0}")]
    ReadStdin(#[source] io::Error),

    #[error("failed to read template {path}: {source}")]
    ReadTemplate { path: PathBuf, source: io::Error },

    #[error("failed to read stylesheet {path}: {source}")]
    ReadStylesheet { path: PathBuf, source: io::Error },

    #[error("template error at byte {offset}: {message}")]
    Template { offset: usize, message: String },

    #[error("failed to write output to {target}: {source}")]
    WriteOutput { target: String, source: io::Error },

    #[error("failed to listen on port {port}: {source}")]
    Bind { port: u16, source: io::Error },
}
