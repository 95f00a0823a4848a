pub mod checker;
pub mod cli;
pub mod client;
pub mod config;
pub mod dict;
pub mod editor;
pub mod parser;
pub mod storage;

pub use checker::orchestrator::SpellCheckOrchestrator;
pub use checker::SpellChecker;
pub use client::ApiClient;
pub use config::Config;
pub use editor::EditorSession;
pub use storage::ClientStore;

#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub error_count: usize,
    pub fixed_count: usize,
    pub errors: Vec<SpellError>,
}

#[derive(Debug, Clone)]
pub struct SpellError {
    pub word: String,
    pub line: usize,
    pub column: usize,
    pub context: String,
    pub suggestions: Vec<String>,
}
