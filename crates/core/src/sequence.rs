//! Lesson sequencing: which lesson the learner should see next.
//!
//! Ordering rule used everywhere in this module:
//!
//! 1. the `order` of the lesson's path (paths with equal `order` fall back to
//!    path id); lessons whose path is not in the supplied catalog come after
//!    every known path,
//! 2. the lesson's own `order`,
//! 3. the lesson id, lexicographically.
//!
//! When no paths are supplied every lesson shares the same path rank, so the
//! ordering reduces to lesson `order` then id.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{CompletionSet, Lesson, LessonId, Path, PathId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PathRank<'a> {
    Known { order: i64, id: &'a PathId },
    Unlisted,
}

/// Sort key giving lessons a strict total order across paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SequenceKey<'a> {
    path: PathRank<'a>,
    order: i64,
    lesson: &'a LessonId,
}

struct PathCatalog<'a> {
    orders: HashMap<&'a PathId, i64>,
}

impl<'a> PathCatalog<'a> {
    fn new(paths: &'a [Path]) -> Self {
        Self {
            orders: paths.iter().map(|path| (path.id(), path.order())).collect(),
        }
    }

    fn key<'l>(&self, lesson: &'l Lesson) -> SequenceKey<'l> {
        let path = match self.orders.get(lesson.path_id()) {
            Some(order) => PathRank::Known {
                order: *order,
                id: lesson.path_id(),
            },
            None => PathRank::Unlisted,
        };
        SequenceKey {
            path,
            order: lesson.order(),
            lesson: lesson.id(),
        }
    }
}

fn within_path(a: &Lesson, b: &Lesson) -> Ordering {
    a.order().cmp(&b.order()).then_with(|| a.id().cmp(b.id()))
}

/// All lessons in global curriculum order.
#[must_use]
pub fn global_sequence<'l>(paths: &[Path], lessons: &'l [Lesson]) -> Vec<&'l Lesson> {
    let catalog = PathCatalog::new(paths);
    let mut ordered: Vec<&Lesson> = lessons.iter().collect();
    ordered.sort_by_cached_key(|lesson| catalog.key(*lesson));
    ordered
}

/// "Continue learning": first lesson in global order that is not completed.
///
/// `None` means the learner has finished all content.
#[must_use]
pub fn next_incomplete<'l>(
    paths: &[Path],
    lessons: &'l [Lesson],
    completed: &CompletionSet,
) -> Option<&'l Lesson> {
    global_sequence(paths, lessons)
        .into_iter()
        .find(|lesson| !completed.contains(lesson.id()))
}

/// Lessons of a single path ordered by `order`, then id.
#[must_use]
pub fn path_sequence(path_lessons: &[Lesson]) -> Vec<&Lesson> {
    let mut ordered: Vec<&Lesson> = path_lessons.iter().collect();
    ordered.sort_by(|a, b| within_path(a, b));
    ordered
}

fn position(ordered: &[&Lesson], current: &LessonId) -> Option<usize> {
    ordered.iter().position(|lesson| lesson.id() == current)
}

/// Lesson following `current` in its path.
///
/// Returns `None` when `current` is last, or when it is not part of
/// `path_lessons` at all; the list is authoritative for membership.
#[must_use]
pub fn next_in_path<'l>(path_lessons: &'l [Lesson], current: &LessonId) -> Option<&'l Lesson> {
    let ordered = path_sequence(path_lessons);
    let index = position(&ordered, current)?;
    ordered.get(index + 1).copied()
}

/// Lesson preceding `current` in its path.
#[must_use]
pub fn previous_in_path<'l>(path_lessons: &'l [Lesson], current: &LessonId) -> Option<&'l Lesson> {
    let ordered = path_sequence(path_lessons);
    let index = position(&ordered, current)?;
    index.checked_sub(1).and_then(|prev| ordered.get(prev).copied())
}

/// First lesson of a path that is not completed yet.
#[must_use]
pub fn next_incomplete_in_path<'l>(
    path_lessons: &'l [Lesson],
    completed: &CompletionSet,
) -> Option<&'l Lesson> {
    path_sequence(path_lessons)
        .into_iter()
        .find(|lesson| !completed.contains(lesson.id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: &str, path: &str, order: i64) -> Lesson {
        Lesson::new(
            LessonId::new(id).unwrap(),
            PathId::new(path).unwrap(),
            order,
            format!("Lesson {id}"),
            Vec::new(),
        )
        .unwrap()
    }

    fn path(id: &str, order: i64) -> Path {
        Path::new(PathId::new(id).unwrap(), id, "", order).unwrap()
    }

    fn lid(id: &str) -> LessonId {
        LessonId::new(id).unwrap()
    }

    fn set_of(ids: &[&str]) -> CompletionSet {
        ids.iter().map(|id| lid(id)).collect()
    }

    fn ids(lessons: &[&Lesson]) -> Vec<String> {
        lessons.iter().map(|l| l.id().to_string()).collect()
    }

    #[test]
    fn continue_picks_first_incomplete() {
        let lessons = vec![lesson("c", "p", 3), lesson("a", "p", 1), lesson("b", "p", 2)];
        let next = next_incomplete(&[], &lessons, &set_of(&["a"])).unwrap();
        assert_eq!(next.id(), &lid("b"));
    }

    #[test]
    fn continue_returns_none_when_everything_is_done() {
        let lessons = vec![lesson("a", "p", 1), lesson("b", "p", 2), lesson("c", "p", 3)];
        assert!(next_incomplete(&[], &lessons, &set_of(&["a", "b", "c"])).is_none());
        assert!(next_incomplete(&[], &[], &CompletionSet::new()).is_none());
    }

    #[test]
    fn equal_order_breaks_ties_by_id() {
        let lessons = vec![lesson("beta", "p", 1), lesson("alpha", "p", 1)];
        let next = next_incomplete(&[], &lessons, &CompletionSet::new()).unwrap();
        assert_eq!(next.id(), &lid("alpha"));
    }

    #[test]
    fn path_order_dominates_lesson_order() {
        let paths = vec![path("second", 2), path("first", 1)];
        let lessons = vec![
            lesson("s1", "second", 1),
            lesson("f1", "first", 1),
            lesson("f2", "first", 2),
            lesson("orphan", "gone", 0),
        ];
        let ordered = global_sequence(&paths, &lessons);
        assert_eq!(ids(&ordered), vec!["f1", "f2", "s1", "orphan"]);

        let next = next_incomplete(&paths, &lessons, &set_of(&["f1", "f2"])).unwrap();
        assert_eq!(next.id(), &lid("s1"));
    }

    #[test]
    fn paths_with_equal_order_fall_back_to_path_id() {
        let paths = vec![path("b-path", 1), path("a-path", 1)];
        let lessons = vec![lesson("b1", "b-path", 1), lesson("a9", "a-path", 9)];
        let ordered = global_sequence(&paths, &lessons);
        assert_eq!(ids(&ordered), vec!["a9", "b1"]);
    }

    #[test]
    fn next_in_path_steps_forward() {
        let lessons = vec![lesson("x3", "p", 3), lesson("x1", "p", 1), lesson("x2", "p", 2)];
        assert_eq!(next_in_path(&lessons, &lid("x1")).unwrap().id(), &lid("x2"));
        assert_eq!(next_in_path(&lessons, &lid("x2")).unwrap().id(), &lid("x3"));
        assert!(next_in_path(&lessons, &lid("x3")).is_none());
    }

    #[test]
    fn next_in_path_for_missing_lesson_is_none() {
        let lessons = vec![lesson("x1", "p", 1), lesson("x2", "p", 2)];
        assert!(next_in_path(&lessons, &lid("elsewhere")).is_none());
    }

    #[test]
    fn previous_in_path_steps_back() {
        let lessons = vec![lesson("x1", "p", 1), lesson("x2", "p", 2)];
        assert_eq!(
            previous_in_path(&lessons, &lid("x2")).unwrap().id(),
            &lid("x1")
        );
        assert!(previous_in_path(&lessons, &lid("x1")).is_none());
    }

    #[test]
    fn next_incomplete_in_path_skips_finished() {
        let lessons = vec![lesson("x1", "p", 1), lesson("x2", "p", 2), lesson("x3", "p", 3)];
        let next = next_incomplete_in_path(&lessons, &set_of(&["x1", "x3"])).unwrap();
        assert_eq!(next.id(), &lid("x2"));
    }
}
