mod block;
mod completion;
mod ids;
mod lesson;
mod path;
mod theme;

pub use ids::{IdError, LessonId, PathId};

pub use block::{Block, BlockKind};
pub use completion::{CompletionCodecError, CompletionSet};
pub use lesson::{Lesson, LessonError};
pub use path::{Path, PathError};
pub use theme::{ColorScheme, ThemeMode, ThemeModeError};
