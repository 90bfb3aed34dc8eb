//! Pure progress calculations over a lesson list and a completion set.

use crate::model::{CompletionSet, Lesson, Path, PathId};

/// Number of lessons in `lessons` whose id is in `completed`.
#[must_use]
pub fn count(lessons: &[Lesson], completed: &CompletionSet) -> usize {
    lessons
        .iter()
        .filter(|lesson| completed.contains(lesson.id()))
        .count()
}

/// Fraction of `lessons` completed, in `[0, 1]`. Zero for an empty list.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(lessons: &[Lesson], completed: &CompletionSet) -> f64 {
    if lessons.is_empty() {
        return 0.0;
    }
    count(lessons, completed) as f64 / lessons.len() as f64
}

/// True when the list is non-empty and every lesson is completed.
#[must_use]
pub fn is_fully_complete(lessons: &[Lesson], completed: &CompletionSet) -> bool {
    !lessons.is_empty() && count(lessons, completed) == lessons.len()
}

/// Aggregated view of completion, useful for progress bars and badges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub ratio: f64,
    pub is_complete: bool,
}

impl Progress {
    #[must_use]
    pub fn of(lessons: &[Lesson], completed: &CompletionSet) -> Self {
        Self {
            completed: count(lessons, completed),
            total: lessons.len(),
            ratio: ratio(lessons, completed),
            is_complete: is_fully_complete(lessons, completed),
        }
    }

    /// Build from raw counts. `completed` is clamped to `total`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(completed: usize, total: usize) -> Self {
        let completed = completed.min(total);
        Self {
            completed,
            total,
            ratio: if total == 0 {
                0.0
            } else {
                completed as f64 / total as f64
            },
            is_complete: total > 0 && completed == total,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::from_counts(0, 0)
    }

    /// Ratio as a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        (self.ratio.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}

/// Progress per path, in path order (`order`, then id).
///
/// Lessons whose path is not listed are ignored.
#[must_use]
pub fn by_path(
    paths: &[Path],
    lessons: &[Lesson],
    completed: &CompletionSet,
) -> Vec<(PathId, Progress)> {
    let mut ordered: Vec<&Path> = paths.iter().collect();
    ordered.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.id().cmp(b.id())));

    ordered
        .into_iter()
        .map(|path| {
            let (done, total) = lessons
                .iter()
                .filter(|lesson| lesson.path_id() == path.id())
                .fold((0, 0), |(done, total), lesson| {
                    (done + usize::from(completed.contains(lesson.id())), total + 1)
                });
            (path.id().clone(), Progress::from_counts(done, total))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LessonId;

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

    fn set_of(ids: &[&str]) -> CompletionSet {
        ids.iter().map(|id| LessonId::new(*id).unwrap()).collect()
    }

    #[test]
    fn remaining_never_underflows() {
        let odd = Progress {
            completed: 5,
            total: 3,
            ratio: 1.0,
            is_complete: true,
        };
        assert_eq!(odd.remaining(), 0);
        assert_eq!(Progress::from_counts(1, 4).remaining(), 3);
    }

    fn abc() -> Vec<Lesson> {
        vec![lesson("a", "p", 1), lesson("b", "p", 2), lesson("c", "p", 3)]
    }

    #[test]
    fn empty_list_has_zero_ratio() {
        let completed = set_of(&["a"]);
        assert_eq!(count(&[], &completed), 0);
        assert_eq!(ratio(&[], &completed), 0.0);
        assert!(!is_fully_complete(&[], &completed));
    }

    #[test]
    fn counts_only_listed_lessons() {
        let completed = set_of(&["a", "zzz"]);
        let lessons = abc();
        assert_eq!(count(&lessons, &completed), 1);
        assert!((ratio(&lessons, &completed) - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn full_completion() {
        let lessons = abc();
        let completed = set_of(&["a", "b", "c"]);
        let progress = Progress::of(&lessons, &completed);
        assert!(progress.is_complete);
        assert_eq!(progress.ratio, 1.0);
        assert_eq!(progress.percent(), 100);
        assert_eq!(progress.remaining(), 0);
    }

    #[test]
    fn count_never_exceeds_length() {
        let lessons = abc();
        for ids in [&[][..], &["a"][..], &["a", "b", "c", "d", "e"][..]] {
            let completed = set_of(ids);
            let n = count(&lessons, &completed);
            assert!(n <= lessons.len());
            assert!((ratio(&lessons, &completed) - n as f64 / 3.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn percent_rounds() {
        let lessons = abc();
        let progress = Progress::of(&lessons, &set_of(&["a", "b"]));
        assert_eq!(progress.percent(), 67);
    }

    #[test]
    fn by_path_follows_path_order() {
        let paths = vec![
            Path::new(PathId::new("later").unwrap(), "Later", "", 2).unwrap(),
            Path::new(PathId::new("first").unwrap(), "First", "", 1).unwrap(),
        ];
        let lessons = vec![
            lesson("f1", "first", 1),
            lesson("f2", "first", 2),
            lesson("l1", "later", 1),
        ];
        let rows = by_path(&paths, &lessons, &set_of(&["f1", "f2"]));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0.as_str(), "first");
        assert!(rows[0].1.is_complete);
        assert_eq!(rows[1].0.as_str(), "later");
        assert_eq!(rows[1].1.completed, 0);
    }
}
