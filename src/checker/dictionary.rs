use anyhow::{Context, Result};
use fst::{Automaton, IntoStreamer, Set, SetBuilder, Streamer};
use memmap2::Mmap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Mutex;
use std::thread;

enum DictBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl AsRef<[u8]> for DictBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            DictBytes::Mapped(map) => map.as_ref(),
            DictBytes::Owned(bytes) => bytes.as_ref(),
        }
    }
}

pub struct Dictionary {
    set: Set<DictBytes>,
}

impl Dictionary {
    /// Load the built dictionary for a language, bootstrapping a minimal
    /// embedded one when nothing has been downloaded yet.
    pub fn load(language: &str) -> Result<Self> {
        let dict_path = Self::dictionary_path(language)?;

        if !dict_path.exists() {
            return Self::create_embedded(language);
        }

        Self::load_from_path(&dict_path)
    }

    /// Load a dictionary from a specific `.dict` file, memory-mapped.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open dictionary: {}", path.display()))?;

        // Safety: the dictionary file is written once by the builder and
        // only read afterwards.
        let map = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to map dictionary: {}", path.display()))?;

        let set = Set::new(DictBytes::Mapped(map)).context("Failed to parse dictionary")?;

        Ok(Self { set })
    }

    /// Build an in-memory dictionary from a word list. Used for hunspell
    /// `.dic` contents and in tests.
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        sorted.sort();
        sorted.dedup();

        let mut builder = SetBuilder::memory();
        for word in sorted {
            builder
                .insert(word.as_bytes())
                .context("Failed to insert word into dictionary")?;
        }
        let bytes = builder.into_inner().context("Failed to finalize dictionary")?;
        let set = Set::new(DictBytes::Owned(bytes)).context("Failed to parse dictionary")?;

        Ok(Self { set })
    }

    /// Parse hunspell `.dic` content into plain words: the leading count
    /// line is dropped and affix flags after `/` are stripped.
    pub fn words_from_dic(content: &str) -> Vec<String> {
        content
            .lines()
            .skip_while(|line| line.trim().parse::<usize>().is_ok())
            .filter_map(|line| {
                let word = line.split('/').next().unwrap_or("").trim();
                if word.is_empty() || word.starts_with('#') {
                    None
                } else {
                    Some(word.to_lowercase())
                }
            })
            .collect()
    }

    /// Check if a word exists in the dictionary.
    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word.as_bytes())
    }

    /// Get all words with a given prefix.
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut results = Vec::new();
        let mut stream = self
            .set
            .search(fst::automaton::Str::new(prefix).starts_with())
            .into_stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                results.push(word);
            }
        }

        results
    }

    /// Build an on-disk dictionary file from a word list.
    pub fn build_from_words(words: &[String], output_path: &Path) -> Result<()> {
        let mut sorted_words = words.to_vec();
        sorted_words.sort();
        sorted_words.dedup();

        let file = File::create(output_path)
            .with_context(|| format!("Failed to create dictionary: {}", output_path.display()))?;

        let writer = BufWriter::new(file);
        let mut builder = SetBuilder::new(writer).context("Failed to create FST builder")?;

        for word in sorted_words {
            builder
                .insert(word.as_bytes())
                .context("Failed to insert word into dictionary")?;
        }

        builder.finish().context("Failed to finalize dictionary")?;

        Ok(())
    }

    pub fn dictionary_path(language: &str) -> Result<PathBuf> {
        let data_dir = crate::config::Config::data_dir().context("Failed to get data directory")?;

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        Ok(data_dir.join(format!("{}.dict", language)))
    }

    /// Create a minimal embedded dictionary for bootstrapping before any
    /// real dictionary has been downloaded.
    fn create_embedded(language: &str) -> Result<Self> {
        let basic_words = Self::basic_wordlist();

        let dict_path = Self::dictionary_path(language)?;
        Self::build_from_words(&basic_words, &dict_path)?;

        Self::load_from_path(&dict_path)
    }

    fn basic_wordlist() -> Vec<String> {
        // Common English plus manuscript vocabulary; enough for first runs,
        // replaced by `texscribe dict download`.
        [
            "the", "be", "to", "of", "and", "a", "in", "that", "have", "it", "for", "not", "on",
            "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they",
            "we", "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there",
            "their", "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me",
            "when", "make", "can", "like", "time", "no", "just", "him", "know", "take", "people",
            "into", "year", "your", "good", "some", "could", "them", "see", "other", "than",
            "then", "now", "look", "only", "come", "its", "over", "think", "also", "back",
            "after", "use", "two", "how", "our", "work", "first", "well", "way", "even", "new",
            "want", "because", "any", "these", "give", "day", "most", "us", "is", "was", "are",
            "were", "been", "has", "had", "brown", "fox", "quick",
            // Manuscript vocabulary
            "figure", "table", "equation", "section", "abstract", "introduction", "methods",
            "results", "discussion", "conclusion", "references", "manuscript", "supplementary",
            "appendix", "hypothesis", "analysis", "data", "model", "sample", "significant",
            "experiment", "control", "measurement", "coefficient", "parameter", "variance",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryState {
    Loading,
    Ready,
    Failed,
}

/// A dictionary that may still be loading on a background thread. The word
/// checker runs in heuristic mode until `poll` observes the loaded set; a
/// failed load leaves the checker in heuristic mode permanently.
pub struct DictionaryHandle {
    state: DictionaryState,
    dict: Option<Dictionary>,
    // Mutex keeps the handle Sync so checkers can be shared across rayon
    // workers; it is only ever locked from `poll`/`wait`.
    rx: Mutex<Option<Receiver<Result<Dictionary>>>>,
}

impl DictionaryHandle {
    /// Start loading the language's dictionary off-thread.
    pub fn load_in_background(language: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        let language = language.to_string();
        thread::spawn(move || {
            let _ = tx.send(Dictionary::load(&language));
        });

        Self {
            state: DictionaryState::Loading,
            dict: None,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Wrap an already-loaded dictionary.
    pub fn ready(dict: Dictionary) -> Self {
        Self {
            state: DictionaryState::Ready,
            dict: Some(dict),
            rx: Mutex::new(None),
        }
    }

    /// A handle that never produces a dictionary. Heuristic mode forever.
    pub fn unavailable() -> Self {
        Self {
            state: DictionaryState::Failed,
            dict: None,
            rx: Mutex::new(None),
        }
    }

    /// Drive the pending load forward. Returns true exactly once, on the
    /// transition to ready, so callers can trigger a full re-check.
    pub fn poll(&mut self) -> bool {
        let Ok(slot) = self.rx.get_mut() else {
            return false;
        };
        let Some(rx) = slot.take() else {
            return false;
        };

        match rx.try_recv() {
            Ok(Ok(dict)) => {
                self.dict = Some(dict);
                self.state = DictionaryState::Ready;
                true
            }
            Ok(Err(err)) => {
                eprintln!("Warning: dictionary load failed, spell check degraded: {err:#}");
                self.state = DictionaryState::Failed;
                false
            }
            Err(TryRecvError::Empty) => {
                *slot = Some(rx);
                false
            }
            Err(TryRecvError::Disconnected) => {
                eprintln!("Warning: dictionary loader stopped, spell check degraded");
                self.state = DictionaryState::Failed;
                false
            }
        }
    }

    /// Block until the pending load settles. CLI-only convenience.
    pub fn wait(&mut self) {
        let pending = self.rx.get_mut().ok().and_then(|slot| slot.take());
        if let Some(rx) = pending {
            match rx.recv() {
                Ok(Ok(dict)) => {
                    self.dict = Some(dict);
                    self.state = DictionaryState::Ready;
                }
                Ok(Err(err)) => {
                    eprintln!("Warning: dictionary load failed, spell check degraded: {err:#}");
                    self.state = DictionaryState::Failed;
                }
                Err(_) => {
                    self.state = DictionaryState::Failed;
                }
            }
        }
    }

    /// A handle fed from an explicit channel, for exercising load
    /// transitions without touching the filesystem.
    #[cfg(test)]
    pub(crate) fn loading_for_tests(rx: Receiver<Result<Dictionary>>) -> Self {
        Self {
            state: DictionaryState::Loading,
            dict: None,
            rx: Mutex::new(Some(rx)),
        }
    }

    pub fn state(&self) -> DictionaryState {
        self.state
    }

    pub fn get(&self) -> Option<&Dictionary> {
        self.dict.as_ref()
    }
}
