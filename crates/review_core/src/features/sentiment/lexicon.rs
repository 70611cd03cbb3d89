//! Sentiment lexicon resources and loaders
//!
//! Two plain-text resources back the analyzers:
//!
//! - `vader_lexicon.txt`: `token<TAB>mean_valence<TAB>...`, extra columns ignored
//! - `polarity_lexicon.tsv`: `word<TAB>polarity<TAB>subjectivity<TAB>intensity`
//!
//! Blank lines and lines starting with `#` are skipped. A missing file, a
//! malformed line or an empty resource is an error: the extractor must not
//! start with silently zeroed sentiment.

use crate::errors::LexiconError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const VALENCE_RESOURCE: &str = "vader_lexicon.txt";
pub const POLARITY_RESOURCE: &str = "polarity_lexicon.tsv";

const EMBEDDED_VALENCE: &str = include_str!("../../../resources/vader_lexicon.txt");
const EMBEDDED_POLARITY: &str = include_str!("../../../resources/polarity_lexicon.tsv");

/// Token to mean valence, roughly in [-4, 4].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValenceLexicon {
    entries: HashMap<String, f64>,
}

impl ValenceLexicon {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, token: &str) -> Option<f64> {
        self.entries.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse the tab-separated valence format.
    pub fn parse(resource: &str, contents: &str) -> Result<Self, LexiconError> {
        let mut entries = HashMap::new();
        for (idx, line) in data_lines(contents) {
            let mut fields = line.split('\t');
            let token = fields.next().unwrap_or_default().trim();
            let value = fields
                .next()
                .ok_or_else(|| malformed(resource, idx, "missing valence column"))?;
            if token.is_empty() {
                return Err(malformed(resource, idx, "empty token"));
            }
            let value = parse_number(resource, idx, value)?;
            entries.insert(token.to_string(), value);
        }
        if entries.is_empty() {
            return Err(LexiconError::Empty(resource.to_string()));
        }
        Ok(Self { entries })
    }
}

/// One adjective or adverb of the polarity lexicon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarityEntry {
    pub polarity: f64,
    pub subjectivity: f64,
    /// Multiplier applied to the next word when used as a modifier
    pub intensity: f64,
}

impl PolarityEntry {
    pub fn is_modifier(&self) -> bool {
        (self.intensity - 1.0).abs() > f64::EPSILON
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolarityLexicon {
    entries: HashMap<String, PolarityEntry>,
}

impl PolarityLexicon {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, PolarityEntry)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, word: &str) -> Option<&PolarityEntry> {
        self.entries.get(word)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn parse(resource: &str, contents: &str) -> Result<Self, LexiconError> {
        let mut entries = HashMap::new();
        for (idx, line) in data_lines(contents) {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 4 {
                return Err(malformed(
                    resource,
                    idx,
                    &format!("expected 4 columns, found {}", fields.len()),
                ));
            }
            let word = fields[0].trim();
            if word.is_empty() {
                return Err(malformed(resource, idx, "empty word"));
            }
            let entry = PolarityEntry {
                polarity: parse_number(resource, idx, fields[1])?,
                subjectivity: parse_number(resource, idx, fields[2])?,
                intensity: parse_number(resource, idx, fields[3])?,
            };
            entries.insert(word.to_string(), entry);
        }
        if entries.is_empty() {
            return Err(LexiconError::Empty(resource.to_string()));
        }
        Ok(Self { entries })
    }
}

/// Both lexicons, ready to hand to the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexicons {
    pub valence: ValenceLexicon,
    pub polarity: PolarityLexicon,
}

/// Source of lexicon resources, invoked once at startup.
pub trait LexiconLoader {
    fn load(&self) -> Result<Lexicons, LexiconError>;
}

/// Lexicons compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedLexicons;

impl LexiconLoader for EmbeddedLexicons {
    fn load(&self) -> Result<Lexicons, LexiconError> {
        Ok(Lexicons {
            valence: ValenceLexicon::parse(VALENCE_RESOURCE, EMBEDDED_VALENCE)?,
            polarity: PolarityLexicon::parse(POLARITY_RESOURCE, EMBEDDED_POLARITY)?,
        })
    }
}

/// Lexicons read from a directory holding both resource files.
#[derive(Debug, Clone)]
pub struct DirectoryLexicons {
    dir: PathBuf,
}

impl DirectoryLexicons {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read(&self, name: &str) -> Result<String, LexiconError> {
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(LexiconError::Missing { path });
        }
        Ok(fs::read_to_string(&path)?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl LexiconLoader for DirectoryLexicons {
    fn load(&self) -> Result<Lexicons, LexiconError> {
        let valence = self.read(VALENCE_RESOURCE)?;
        let polarity = self.read(POLARITY_RESOURCE)?;
        Ok(Lexicons {
            valence: ValenceLexicon::parse(VALENCE_RESOURCE, &valence)?,
            polarity: PolarityLexicon::parse(POLARITY_RESOURCE, &polarity)?,
        })
    }
}

fn data_lines(contents: &str) -> impl Iterator<Item = (usize, &str)> {
    contents
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
}

fn parse_number(resource: &str, line: usize, raw: &str) -> Result<f64, LexiconError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| malformed(resource, line, &format!("bad number {:?}: {e}", raw.trim())))
}

fn malformed(resource: &str, line: usize, reason: &str) -> LexiconError {
    LexiconError::Malformed {
        resource: resource.to_string(),
        line,
        reason: reason.to_string(),
    }
}
