//! Language → backend dispatch table.
//!
//! Built once and shared by every run. Tests substitute their own
//! backends per language through [`BackendRegistry::register`].

use crate::config::ScanConfig;
use crate::ingest::detect::Language;
use crate::ingest::external::{ExternalToolBackend, ProcessConverter, TreeConverter};
use crate::ingest::grammar::GrammarBackend;
use crate::ingest::Backend;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Fixed mapping from language tag to one backend instance.
#[derive(Default, Clone)]
pub struct BackendRegistry {
    backends: BTreeMap<Language, Arc<dyn Backend>>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in backend for every language.
    ///
    /// Grammar-driven: Rust, Python, JavaScript, TypeScript.
    /// External-tool-driven (one shared converter): C, C++, Java, C#.
    pub fn with_defaults(config: &ScanConfig) -> Self {
        let converter: Arc<dyn TreeConverter> =
            Arc::new(ProcessConverter::from_config(&config.external_tool));
        Self::with_converter(config, converter)
    }

    /// Like [`BackendRegistry::with_defaults`] but with a caller-supplied converter.
    pub fn with_converter(config: &ScanConfig, converter: Arc<dyn TreeConverter>) -> Self {
        let options = config.extract_options();
        let mut registry = Self::new();

        for language in Language::ALL {
            if let Some(backend) = GrammarBackend::for_language(language, options) {
                registry.register(backend);
            } else if let Some(backend) =
                ExternalToolBackend::for_language(language, Arc::clone(&converter), options)
            {
                registry.register(backend);
            }
        }

        registry
    }

    /// Register `backend` under its own language, replacing any previous one.
    pub fn register(&mut self, backend: impl Backend + 'static) {
        self.register_shared(Arc::new(backend));
    }

    /// Register an already shared backend.
    pub fn register_shared(&mut self, backend: Arc<dyn Backend>) {
        let language = backend.language();
        if self.backends.insert(language, backend).is_some() {
            log::debug!("replaced {} backend", language);
        }
    }

    /// Remove the backend for `language`.
    pub fn unregister(&mut self, language: Language) -> Option<Arc<dyn Backend>> {
        self.backends.remove(&language)
    }

    /// Backend for `language`.
    pub fn get(&self, language: Language) -> Option<&Arc<dyn Backend>> {
        self.backends.get(&language)
    }

    /// Registered languages in tag order.
    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.backends.keys().copied()
    }

    /// Registered backends in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (Language, &Arc<dyn Backend>)> {
        self.backends.iter().map(|(language, backend)| (*language, backend))
    }

    /// Number of registered backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether no backend is registered.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
