use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::ids::LessonId;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompletionCodecError {
    #[error("completion set is not a JSON array of lesson ids: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode completion set: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Set of lesson ids the learner has completed.
///
/// This is the only mutable progress state. Members are added or removed one
/// at a time; nothing is pruned except by an explicit reset. The persisted form
/// is a JSON array of id strings whose order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSet {
    ids: BTreeSet<LessonId>,
}

impl CompletionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, lesson_id: &LessonId) -> bool {
        self.ids.contains(lesson_id)
    }

    /// Returns `true` if the id was not already present.
    pub fn insert(&mut self, lesson_id: LessonId) -> bool {
        self.ids.insert(lesson_id)
    }

    /// Returns `true` if the id was present.
    pub fn remove(&mut self, lesson_id: &LessonId) -> bool {
        self.ids.remove(lesson_id)
    }

    /// Flip membership of `lesson_id` and return whether it is now complete.
    pub fn toggle(&mut self, lesson_id: LessonId) -> bool {
        if self.ids.remove(&lesson_id) {
            false
        } else {
            self.ids.insert(lesson_id);
            true
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LessonId> {
        self.ids.iter()
    }

    /// Encode as a JSON array of lesson id strings.
    ///
    /// # Errors
    ///
    /// Returns `CompletionCodecError::Encode` if serialization fails.
    pub fn encode(&self) -> Result<String, CompletionCodecError> {
        serde_json::to_string(&self.ids).map_err(CompletionCodecError::Encode)
    }

    /// Decode a persisted JSON array. Duplicate ids collapse; entries that are
    /// not non-blank strings are skipped.
    ///
    /// # Errors
    ///
    /// Returns `CompletionCodecError::Decode` if `raw` is not a JSON array.
    pub fn decode(raw: &str) -> Result<Self, CompletionCodecError> {
        Self::decode_salvaged(raw).map(|(set, _)| set)
    }

    /// Like [`CompletionSet::decode`], also returning how many array entries
    /// were skipped.
    ///
    /// # Errors
    ///
    /// Returns `CompletionCodecError::Decode` if `raw` is not a JSON array.
    pub fn decode_salvaged(raw: &str) -> Result<(Self, usize), CompletionCodecError> {
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(raw).map_err(CompletionCodecError::Decode)?;

        let mut set = Self::new();
        let mut skipped = 0;
        for entry in entries {
            match entry {
                serde_json::Value::String(raw) => match LessonId::new(raw) {
                    Ok(id) => {
                        set.insert(id);
                    }
                    Err(_) => skipped += 1,
                },
                _ => skipped += 1,
            }
        }
        Ok((set, skipped))
    }

    /// Decode persisted data, treating absent or malformed input as empty.
    #[must_use]
    pub fn decode_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|raw| Self::decode(raw).ok()).unwrap_or_default()
    }
}

impl FromIterator<LessonId> for CompletionSet {
    fn from_iter<I: IntoIterator<Item = LessonId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl Extend<LessonId> for CompletionSet {
    fn extend<I: IntoIterator<Item = LessonId>>(&mut self, iter: I) {
        self.ids.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> LessonId {
        LessonId::new(raw).unwrap()
    }

    fn set_of(ids: &[&str]) -> CompletionSet {
        ids.iter().map(|raw| id(raw)).collect()
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut set = CompletionSet::new();
        assert!(set.toggle(id("a")));
        assert!(set.contains(&id("a")));
        assert!(!set.toggle(id("a")));
        assert!(set.is_empty());
    }

    #[test]
    fn toggling_twice_restores_encoding() {
        let mut set = set_of(&["b", "a"]);
        let before = set.encode().unwrap();
        set.toggle(id("c"));
        set.toggle(id("c"));
        assert_eq!(set.encode().unwrap(), before);
    }

    #[test]
    fn decode_accepts_unordered_array_with_duplicates() {
        let set = CompletionSet::decode(r#"["c","a","c"]"#).unwrap();
        assert_eq!(set, set_of(&["a", "c"]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn decode_rejects_wrong_shapes() {
        assert!(CompletionSet::decode("not json").is_err());
        assert!(CompletionSet::decode(r#"{"a":true}"#).is_err());
        assert!(CompletionSet::decode(r#""a""#).is_err());
    }

    #[test]
    fn decode_keeps_valid_ids_next_to_bad_entries() {
        let (set, skipped) =
            CompletionSet::decode_salvaged(r#"["a","b","",null,7,"  ","b"]"#).unwrap();
        assert_eq!(set, set_of(&["a", "b"]));
        assert_eq!(skipped, 4);

        assert!(CompletionSet::decode("[1,2]").unwrap().is_empty());
        assert_eq!(
            CompletionSet::decode(r#"["ok",""]"#).unwrap(),
            set_of(&["ok"])
        );
    }

    #[test]
    fn decode_lenient_falls_back_to_empty() {
        assert!(CompletionSet::decode_lenient(None).is_empty());
        assert!(CompletionSet::decode_lenient(Some("not json")).is_empty());
        assert_eq!(
            CompletionSet::decode_lenient(Some(r#"["x1"]"#)),
            set_of(&["x1"])
        );
    }

    #[test]
    fn encode_is_a_json_array_of_strings() {
        let set = set_of(&["lesson-2", "lesson-1"]);
        assert_eq!(set.encode().unwrap(), r#"["lesson-1","lesson-2"]"#);
    }
}
