use thiserror::Error;

use crate::model::{CompletionCodecError, IdError, LessonError, PathError, ThemeModeError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Completion(#[from] CompletionCodecError),
    #[error(transparent)]
    Theme(#[from] ThemeModeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompletionSet, Lesson, LessonId, PathId, ThemeMode};

    fn lesson_from_raw(id: &str, path: &str, title: &str) -> Result<Lesson, Error> {
        Ok(Lesson::new(
            LessonId::new(id)?,
            PathId::new(path)?,
            1,
            title,
            Vec::new(),
        )?)
    }

    #[test]
    fn domain_errors_convert_with_question_mark() {
        assert!(lesson_from_raw("a", "p", "Wudu").is_ok());
        assert!(matches!(lesson_from_raw(" ", "p", "Wudu"), Err(Error::Id(_))));
        assert!(matches!(lesson_from_raw("a", "p", ""), Err(Error::Lesson(_))));

        let theme: Result<ThemeMode, Error> = "auto".parse::<ThemeMode>().map_err(Error::from);
        assert!(matches!(theme, Err(Error::Theme(_))));

        let set: Result<CompletionSet, Error> = CompletionSet::decode("{").map_err(Error::from);
        assert!(matches!(set, Err(Error::Completion(_))));
    }
}
