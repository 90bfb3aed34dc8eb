use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag of a lesson content block.
///
/// Known kinds form a closed set. Tags that are not recognized are kept in
/// `Unknown` instead of failing, so lessons authored against a newer content
/// schema still load and callers can decide how to treat the extra blocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockKind {
    Text,
    SectionTitle,
    Bullet,
    Ayah,
    Hadith,
    Reassurance,
    Reflection,
    Action,
    Unknown(String),
}

impl BlockKind {
    /// Every kind the renderer knows about, in declaration order.
    pub const KNOWN: [BlockKind; 8] = [
        BlockKind::Text,
        BlockKind::SectionTitle,
        BlockKind::Bullet,
        BlockKind::Ayah,
        BlockKind::Hadith,
        BlockKind::Reassurance,
        BlockKind::Reflection,
        BlockKind::Action,
    ];

    /// Parse a wire tag. Never fails.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "text" => Self::Text,
            "section_title" => Self::SectionTitle,
            "bullet" => Self::Bullet,
            "ayah" => Self::Ayah,
            "hadith" => Self::Hadith,
            "reassurance" => Self::Reassurance,
            "reflection" => Self::Reflection,
            "action" => Self::Action,
            other => Self::Unknown(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_tag(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::SectionTitle => "section_title",
            Self::Bullet => "bullet",
            Self::Ayah => "ayah",
            Self::Hadith => "hadith",
            Self::Reassurance => "reassurance",
            Self::Reflection => "reflection",
            Self::Action => "action",
            Self::Unknown(tag) => tag,
        }
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for BlockKind {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Unknown(tag) => tag,
            known => known.as_tag().to_string(),
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A single read-only piece of lesson content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    kind: BlockKind,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
}

impl Block {
    #[must_use]
    pub fn new(kind: BlockKind, content: impl Into<String>, reference: Option<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            reference: reference
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Unknown blocks are ignored by renderers.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.kind.is_known()
    }
}
