use thiserror::Error;

use crate::model::block::Block;
use crate::model::ids::{LessonId, PathId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,
}

/// A single lesson belonging to exactly one path.
///
/// `order` positions the lesson inside its path. Lessons are read-only
/// projections of the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    path_id: PathId,
    order: i64,
    title: String,
    blocks: Vec<Block>,
}

impl Lesson {
    /// Build a lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the title is blank.
    pub fn new(
        id: LessonId,
        path_id: PathId,
        order: i64,
        title: impl Into<String>,
        blocks: Vec<Block>,
    ) -> Result<Self, LessonError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(LessonError::EmptyTitle);
        }

        Ok(Self {
            id,
            path_id,
            order,
            title,
            blocks,
        })
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn path_id(&self) -> &PathId {
        &self.path_id
    }

    #[must_use]
    pub fn order(&self) -> i64 {
        self.order
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Blocks a renderer should display, skipping unknown kinds.
    pub fn renderable_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|block| block.is_renderable())
    }
}
