use thiserror::Error;

use crate::model::ids::PathId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PathError {
    #[error("path title cannot be empty")]
    EmptyTitle,
}

/// A named curriculum section grouping lessons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    id: PathId,
    title: String,
    description: String,
    order: i64,
}

impl Path {
    /// Build a path, trimming the title and description.
    ///
    /// # Errors
    ///
    /// Returns `PathError::EmptyTitle` if the title is blank.
    pub fn new(
        id: PathId,
        title: impl Into<String>,
        description: impl Into<String>,
        order: i64,
    ) -> Result<Self, PathError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(PathError::EmptyTitle);
        }

        Ok(Self {
            id,
            title,
            description: description.into().trim().to_string(),
            order,
        })
    }

    #[must_use]
    pub fn id(&self) -> &PathId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn order(&self) -> i64 {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_title() {
        let err = Path::new(PathId::new("p").unwrap(), "  ", "", 1).unwrap_err();
        assert_eq!(err, PathError::EmptyTitle);
    }

    #[test]
    fn trims_fields() {
        let path = Path::new(
            PathId::new("essentials").unwrap(),
            " The Essentials ",
            " Start here. ",
            0,
        )
        .unwrap();
        assert_eq!(path.title(), "The Essentials");
        assert_eq!(path.description(), "Start here.");
        assert_eq!(path.order(), 0);
    }
}
