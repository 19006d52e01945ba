use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

/// Face embedding produced by the external recognition model.
///
/// A fixed-length vector; the dimensionality is decided by whichever model
/// the embedder command wraps (128 for the common dlib-style models).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(pub Vec<f32>);

impl Embedding {
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Source of face embeddings for images.
///
/// `Ok(None)` means the image was processed but contained no detectable
/// face; callers surface that to the user and skip matching.
pub trait EmbeddingSource {
    fn embed(&self, image: &Path) -> Result<Option<Embedding>>;
}

/// Embedder that shells out to an external command.
///
/// The configured command string is split on whitespace into program and
/// arguments, the image path is appended, and stdout is expected to be a
/// JSON array of numbers, or `null` when no face was found.
pub struct CommandSource {
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    pub fn new(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .context("embedder command is empty; set `embedder` in the config")?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl EmbeddingSource for CommandSource {
    fn embed(&self, image: &Path) -> Result<Option<Embedding>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(image)
            .output()
            .with_context(|| format!("running embedder `{}`", self.program))?;

        if !output.status.success() {
            anyhow::bail!(
                "embedder `{}` failed on {}: {}",
                self.program,
                image.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_embedder_output(&output.stdout)
            .with_context(|| format!("parsing embedder output for {}", image.display()))
    }
}

fn parse_embedder_output(stdout: &[u8]) -> Result<Option<Embedding>> {
    let text = std::str::from_utf8(stdout)?.trim();
    if text.is_empty() || text == "null" {
        return Ok(None);
    }
    let vector: Vec<f32> = serde_json::from_str(text)?;
    Ok(Some(Embedding(vector)))
}
