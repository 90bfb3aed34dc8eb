use essentials_core::model::{Lesson, LessonId, Path, PathId};

use super::SqliteRepository;
use super::mapping::{encode_blocks, map_lesson_row, map_path_row};
use crate::repository::{ContentRepository, ContentWriter, StorageError};

#[async_trait::async_trait]
impl ContentRepository for SqliteRepository {
    async fn list_paths(&self) -> Result<Vec<Path>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description, sort_order
            FROM paths
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_path_row).collect()
    }

    async fn list_lessons(&self, path_id: Option<&PathId>) -> Result<Vec<Lesson>, StorageError> {
        let rows = match path_id {
            Some(path_id) => {
                sqlx::query(
                    r"
                    SELECT id, path_id, sort_order, title, blocks_json
                    FROM lessons
                    WHERE path_id = ?1
                    ORDER BY sort_order ASC, id ASC
                    ",
                )
                .bind(path_id.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r"
                    SELECT id, path_id, sort_order, title, blocks_json
                    FROM lessons
                    ORDER BY sort_order ASC, id ASC
                    ",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_lesson_row).collect()
    }

    async fn get_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, path_id, sort_order, title, blocks_json
            FROM lessons
            WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_lesson_row).transpose()
    }
}

#[async_trait::async_trait]
impl ContentWriter for SqliteRepository {
    async fn upsert_path(&self, path: &Path) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO paths (id, title, description, sort_order)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                sort_order = excluded.sort_order
            ",
        )
        .bind(path.id().as_str())
        .bind(path.title())
        .bind(path.description())
        .bind(path.order())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let blocks_json = encode_blocks(lesson.blocks())?;

        sqlx::query(
            r"
            INSERT INTO lessons (id, path_id, sort_order, title, blocks_json)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                path_id = excluded.path_id,
                sort_order = excluded.sort_order,
                title = excluded.title,
                blocks_json = excluded.blocks_json
            ",
        )
        .bind(lesson.id().as_str())
        .bind(lesson.path_id().as_str())
        .bind(lesson.order())
        .bind(lesson.title())
        .bind(blocks_json)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
