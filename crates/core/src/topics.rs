//! Keyword index and chapter selection.
//!
//! Maps a free-text question to at most [`MAX_SELECTED_TOPICS`] course
//! chapters using plain substring containment against lowercase trigger
//! phrases. Containment is intentionally loose: "resin" also fires on
//! "resins" and "resinous".
//!
//! Topics are visited in declaration order and that order is the only
//! tie-break, so the first declared topics win when more than three match.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on the number of chapters one question can pull in.
pub const MAX_SELECTED_TOPICS: usize = 3;

/// Built-in dental materials chapters. The first entry is the default topic.
const BUILTIN_TOPICS: &[(&str, &[&str])] = &[
    (
        "Ch01",
        &["overview", "introduction", "history of dental", "ada specification", "iso standard"],
    ),
    (
        "Ch02",
        &["physical propert", "thermal conductivity", "thermal expansion", "shade", "translucen", "density"],
    ),
    (
        "Ch03",
        &["mechanical propert", "stress", "strain", "modulus", "hardness", "fracture toughness", "fatigue", "creep"],
    ),
    (
        "Ch04",
        &["adhesion", "wetting", "contact angle", "surface energy", "bond strength"],
    ),
    (
        "Ch05",
        &["biocompatib", "toxic", "allerg", "pulp response", "hypersensitiv"],
    ),
    (
        "Ch06",
        &["polymer", "resin", "monomer", "bis-gma", "initiator"],
    ),
    (
        "Ch07",
        &["composite", "filler", "microfill", "nanofill", "bulk fill", "light cur"],
    ),
    (
        "Ch08",
        &["bonding agent", "etch", "primer", "smear layer", "hybrid layer", "dentin bond"],
    ),
    (
        "Ch09",
        &["glass ionomer", "ionomer", "compomer", "fluoride release", "giomer"],
    ),
    (
        "Ch10",
        &["cement", "zinc phosphate", "zinc oxide", "eugenol", "luting", "polycarboxylate"],
    ),
    (
        "Ch11",
        &["amalgam", "mercury", "gamma 2", "trituration"],
    ),
    (
        "Ch12",
        &["impression", "alginate", "hydrocolloid", "polyvinyl siloxane", "polyether", "elastomer"],
    ),
    (
        "Ch13",
        &["gypsum", "plaster", "dental stone", "die stone", "setting expansion"],
    ),
    (
        "Ch14",
        &["wax", "baseplate"],
    ),
    (
        "Ch15",
        &["investment", "casting", "sprue", "crucible"],
    ),
    (
        "Ch16",
        &["alloy", "noble metal", "base metal", "titanium", "cobalt-chromium", "gold"],
    ),
    (
        "Ch17",
        &["ceramic", "porcelain", "zirconia", "lithium disilicate", "feldspathic", "glaze"],
    ),
    (
        "Ch18",
        &["cad/cam", "cad-cam", "milling", "3d print", "digital", "intraoral scan"],
    ),
    (
        "Ch19",
        &["denture", "acrylic", "pmma", "reline"],
    ),
    (
        "Ch20",
        &["implant", "osseointegration", "abutment", "endodontic", "gutta-percha", "sealant"],
    ),
];

/// A course chapter and the phrases that pull it into context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Chapter identifier, also used to recognise its documents (e.g. "Ch06")
    pub id: String,

    /// Lowercase trigger phrases in declaration order
    pub keywords: Vec<String>,
}

impl Topic {
    pub fn new<I, S>(id: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// First-hit containment test against already-lowercased text.
    fn matches(&self, normalized: &str) -> bool {
        self.keywords.iter().any(|kw| normalized.contains(kw.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeywordIndexError {
    #[error("keyword index has no topics")]
    Empty,

    #[error("topic #{0} has an empty id")]
    EmptyId(usize),

    #[error("topic '{0}' has no keywords")]
    NoKeywords(String),

    #[error("topic '{0}' is declared more than once")]
    Duplicate(String),
}

/// Immutable topic → keywords mapping, iterated in declaration order.
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    topics: Vec<Topic>,
}

impl KeywordIndex {
    /// Build an index, lowercasing keywords and dropping blank ones.
    pub fn new(topics: Vec<Topic>) -> Result<Self, KeywordIndexError> {
        if topics.is_empty() {
            return Err(KeywordIndexError::Empty);
        }

        let mut normalized: Vec<Topic> = Vec::with_capacity(topics.len());
        for (i, topic) in topics.into_iter().enumerate() {
            let id = topic.id.trim().to_string();
            if id.is_empty() {
                return Err(KeywordIndexError::EmptyId(i));
            }
            if normalized.iter().any(|t| t.id.eq_ignore_ascii_case(&id)) {
                return Err(KeywordIndexError::Duplicate(id));
            }

            let keywords: Vec<String> = topic
                .keywords
                .iter()
                .map(|kw| kw.trim().to_lowercase())
                .filter(|kw| !kw.is_empty())
                .collect();
            if keywords.is_empty() {
                return Err(KeywordIndexError::NoKeywords(id));
            }

            normalized.push(Topic { id, keywords });
        }

        Ok(Self { topics: normalized })
    }

    /// The built-in dental materials index.
    pub fn builtin() -> Self {
        Self {
            topics: BUILTIN_TOPICS
                .iter()
                .map(|(id, kws)| Topic::new(*id, kws.iter().copied()))
                .collect(),
        }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// The topic used when nothing matches: the first one declared.
    pub fn default_topic(&self) -> &str {
        // `new` and `builtin` both guarantee at least one topic.
        self.topics.first().map(|t| t.id.as_str()).unwrap_or_default()
    }

    /// Pick the chapters relevant to `text`.
    ///
    /// Always returns between 1 and [`MAX_SELECTED_TOPICS`] distinct ids.
    pub fn select(&self, text: &str) -> Selection {
        let normalized = text.to_lowercase();

        let mut ids: Vec<String> = Vec::with_capacity(MAX_SELECTED_TOPICS);
        for topic in &self.topics {
            if ids.len() == MAX_SELECTED_TOPICS {
                break;
            }
            if topic.matches(&normalized) && !ids.contains(&topic.id) {
                ids.push(topic.id.clone());
            }
        }

        if ids.is_empty() {
            return Selection {
                ids: vec![self.default_topic().to_string()],
                fallback: true,
            };
        }

        Selection {
            ids,
            fallback: false,
        }
    }
}

impl Default for KeywordIndex {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Ordered, de-duplicated chapter ids chosen for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    ids: Vec<String>,
    fallback: bool,
}

impl Selection {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// True when no keyword matched and the default topic was used.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Whether a document name carries any selected id (case-insensitive).
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.ids
            .iter()
            .any(|id| name.contains(id.to_lowercase().as_str()))
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ids.join(", "))
    }
}
