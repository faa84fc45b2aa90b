//! External-tool-driven backends.
//!
//! Source text is handed to a [`TreeConverter`] together with a language
//! discriminator; the returned exchange tree is walked for function
//! elements. One implementation serves every language the converter
//! understands, instances differ only in their discriminator.

pub mod converter;
pub mod tree;

pub use converter::{ProcessConverter, TreeConverter};
pub use tree::TreeNode;

use crate::error::{Result, ScanError};
use crate::ingest::detect::Language;
use crate::ingest::{extract_batch, Backend, BackendFamily, ExtractOptions, FileBatch};
use crate::record::FunctionRecord;
use std::sync::Arc;

/// Discriminator passed to the converter for `language`, if it handles it.
pub fn discriminator_for(language: Language) -> Option<&'static str> {
    match language {
        Language::C => Some("C"),
        Language::Cpp => Some("C++"),
        Language::Java => Some("Java"),
        Language::CSharp => Some("C#"),
        _ => None,
    }
}

/// Backend that delegates structural analysis to an external converter.
pub struct ExternalToolBackend {
    language: Language,
    discriminator: String,
    converter: Arc<dyn TreeConverter>,
    options: ExtractOptions,
}

impl ExternalToolBackend {
    /// Create a backend for `language` using `converter`.
    pub fn new(
        language: Language,
        discriminator: impl Into<String>,
        converter: Arc<dyn TreeConverter>,
        options: ExtractOptions,
    ) -> Self {
        Self {
            language,
            discriminator: discriminator.into(),
            converter,
            options,
        }
    }

    /// Backend for a language with a built-in discriminator.
    pub fn for_language(
        language: Language,
        converter: Arc<dyn TreeConverter>,
        options: ExtractOptions,
    ) -> Option<Self> {
        let discriminator = discriminator_for(language)?;
        Some(Self::new(language, discriminator, converter, options))
    }
}

impl Backend for ExternalToolBackend {
    fn language(&self) -> Language {
        self.language
    }

    fn family(&self) -> BackendFamily {
        BackendFamily::ExternalTool
    }

    fn parse(&self, batch: FileBatch) -> Result<Vec<FunctionRecord>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        self.converter.ensure_available()?;

        let policy = self.options.policy;
        extract_batch(batch, &self.options, |file, source| {
            let text = std::str::from_utf8(source).map_err(|e| ScanError::Parse {
                file: file.path.clone(),
                message: e.to_string(),
            })?;
            let tree = self.converter.convert(text, &self.discriminator)?;
            let lines: Vec<&str> = text.lines().collect();
            Ok(tree::collect_functions(&tree, &lines, policy))
        })
    }
}
