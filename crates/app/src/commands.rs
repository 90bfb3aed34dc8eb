use std::fmt;

use essentials_core::model::{Block, BlockKind, ColorScheme, Lesson, LessonId, PathId};
use services::AppServices;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Paths,
    Path(PathId),
    Lesson(LessonId),
    Toggle(LessonId),
    Complete(LessonId),
    Continue,
    Next(LessonId),
    Reset,
    Theme(Option<String>),
}

#[derive(Debug)]
pub enum CommandError {
    LessonNotFound(LessonId),
    PathNotFound(PathId),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::LessonNotFound(id) => write!(f, "lesson not found: {id}"),
            CommandError::PathNotFound(id) => write!(f, "path not found: {id}"),
        }
    }
}

impl std::error::Error for CommandError {}

pub async fn execute(
    services: &AppServices,
    platform: ColorScheme,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    let lessons = services.lessons();
    let completion = services.completion();

    match command {
        Command::Status => {
            lessons.refresh(platform).await;
            let Some(snapshot) = lessons.latest_snapshot() else {
                return Ok(());
            };
            let progress = snapshot.progress();
            println!(
                "Progress: {}/{} lessons ({}%)",
                snapshot.completed_count,
                snapshot.total_count,
                progress.percent()
            );
            match &snapshot.next_lesson_id {
                Some(next) => println!("Continue: {}", lesson_label(services, next).await),
                None => println!("{}", nothing_left(snapshot.total_count)),
            }
            println!(
                "Theme: {} (showing {})",
                services.theme().current(),
                snapshot.effective_theme
            );
        }
        Command::Paths => {
            for (path, progress) in lessons.paths_with_progress().await {
                let badge = if progress.is_complete {
                    "  Section Completed"
                } else {
                    ""
                };
                println!(
                    "{:>3}. {} [{}]  {}/{}{badge}",
                    path.order(),
                    path.title(),
                    path.id(),
                    progress.completed,
                    progress.total
                );
            }
        }
        Command::Path(path_id) => {
            let overview = lessons.path_overview(&path_id).await;
            let Some(path) = &overview.path else {
                return Err(CommandError::PathNotFound(path_id).into());
            };
            println!("{}", path.title());
            if !path.description().is_empty() {
                println!("{}", path.description());
            }
            println!();
            for entry in &overview.entries {
                let mark = if entry.is_complete { "x" } else { " " };
                println!(
                    "[{mark}] {:>3}. {} ({})",
                    entry.order, entry.title, entry.lesson_id
                );
            }
            println!();
            println!(
                "{}/{} complete ({}%)",
                overview.progress.completed,
                overview.progress.total,
                overview.progress.percent()
            );
            if overview.progress.is_complete {
                println!("Section Completed");
            } else if let Some(next) = &overview.next_lesson_id {
                println!("Up next: {next}");
            }
        }
        Command::Lesson(lesson_id) => {
            let Some(lesson) = lessons.lesson(&lesson_id).await else {
                return Err(CommandError::LessonNotFound(lesson_id).into());
            };
            print_lesson(&lesson);
            let done = completion.load().await.contains(&lesson_id);
            println!();
            println!("Status: {}", if done { "completed" } else { "not completed" });
            if let Some(prev) = lessons.previous_lesson_before(&lesson_id).await {
                println!("Previous: {prev}");
            }
            if let Some(next) = lessons.next_lesson_after(&lesson_id).await {
                println!("Next: {next}");
            }
        }
        Command::Toggle(lesson_id) => {
            if lessons.lesson(&lesson_id).await.is_none() {
                tracing::warn!(lesson_id = %lesson_id, "toggling a lesson that is not in the content store");
            }
            let outcome = completion.toggle(&lesson_id).await?;
            let state = if outcome.now_complete {
                "complete"
            } else {
                "incomplete"
            };
            println!("Marked {lesson_id} {state} ({} completed)", outcome.set.len());
        }
        Command::Complete(lesson_id) => {
            if lessons.lesson(&lesson_id).await.is_none() {
                return Err(CommandError::LessonNotFound(lesson_id).into());
            }
            completion.mark_complete(&lesson_id).await?;
            println!("Marked {lesson_id} complete");
            match lessons.next_lesson_after(&lesson_id).await {
                Some(next) => println!("Next: {}", lesson_label(services, &next).await),
                None => println!("That was the last lesson in this path"),
            }
        }
        Command::Continue => println!("{}", continue_line(services).await),
        Command::Next(lesson_id) => {
            if lessons.lesson(&lesson_id).await.is_none() {
                return Err(CommandError::LessonNotFound(lesson_id).into());
            }
            match lessons.next_lesson_after(&lesson_id).await {
                Some(next) => println!("{}", lesson_label(services, &next).await),
                None => println!("That is the last lesson in this path"),
            }
        }
        Command::Reset => {
            completion.reset().await?;
            println!("Progress reset");
        }
        Command::Theme(None) => {
            let theme = services.theme();
            let mode = theme.load().await;
            println!("{mode} (showing {})", mode.effective(platform));
        }
        Command::Theme(Some(raw)) => {
            let mode = services.theme().set_str(&raw).await?;
            println!("Theme set to {mode} (showing {})", mode.effective(platform));
        }
    }

    Ok(())
}

async fn continue_line(services: &AppServices) -> String {
    let lessons = services.lessons();
    match lessons.continue_learning().await {
        Some(next) => lesson_label(services, &next).await,
        None => nothing_left(lessons.overall_progress().await.total).to_owned(),
    }
}

fn nothing_left(total_lessons: usize) -> &'static str {
    if total_lessons > 0 {
        "All lessons completed"
    } else {
        "No lessons yet; run the seed tool first"
    }
}

async fn lesson_label(services: &AppServices, lesson_id: &LessonId) -> String {
    match services.lessons().lesson(lesson_id).await {
        Some(lesson) => format!("{} ({lesson_id})", lesson.title()),
        None => lesson_id.to_string(),
    }
}

fn print_lesson(lesson: &Lesson) {
    println!("{}", lesson.title());
    for block in lesson.renderable_blocks() {
        println!();
        println!("{}", render_block(block));
    }
}

fn render_block(block: &Block) -> String {
    let content = block.content();
    let mut rendered = match block.kind() {
        BlockKind::SectionTitle => format!("## {content}"),
        BlockKind::Bullet => format!("  * {content}"),
        BlockKind::Ayah | BlockKind::Hadith => format!("  \"{content}\""),
        BlockKind::Reassurance => format!("  > {content}"),
        BlockKind::Reflection => format!("Reflection\n  {content}"),
        BlockKind::Action => format!("Try This Today\n  {content}"),
        BlockKind::Text | BlockKind::Unknown(_) => content.to_owned(),
    };
    if let Some(reference) = block.reference() {
        rendered.push_str("\n    (");
        rendered.push_str(reference);
        rendered.push(')');
    }
    rendered
}
