use essentials_core::model::{Block, Lesson, Path};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{LessonRecord, PathRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn encode_blocks(blocks: &[Block]) -> Result<String, StorageError> {
    serde_json::to_string(blocks).map_err(ser)
}

pub(crate) fn decode_blocks(raw: &str) -> Result<Vec<Block>, StorageError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_path_row(row: &SqliteRow) -> Result<Path, StorageError> {
    PathRecord {
        id: row.try_get("id").map_err(ser)?,
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        order: row.try_get("sort_order").map_err(ser)?,
    }
    .into_path()
}

pub(crate) fn map_lesson_row(row: &SqliteRow) -> Result<Lesson, StorageError> {
    let blocks_json: String = row.try_get("blocks_json").map_err(ser)?;
    LessonRecord {
        id: row.try_get("id").map_err(ser)?,
        path_id: row.try_get("path_id").map_err(ser)?,
        order: row.try_get("sort_order").map_err(ser)?,
        title: row.try_get("title").map_err(ser)?,
        blocks: decode_blocks(&blocks_json)?,
    }
    .into_lesson()
}

#[cfg(test)]
mod tests {
    use super::*;
    use essentials_core::model::BlockKind;

    #[test]
    fn blocks_round_trip_including_unknown_kinds() {
        let blocks = vec![
            Block::new(BlockKind::Hadith, "Actions are by intentions", Some("Bukhari 1".into())),
            Block::new(BlockKind::Unknown("poll".into()), "?", None),
        ];
        let json = encode_blocks(&blocks).unwrap();
        assert_eq!(decode_blocks(&json).unwrap(), blocks);
    }

    #[test]
    fn empty_blocks_column_decodes_to_empty_list() {
        assert!(decode_blocks("").unwrap().is_empty());
        assert!(decode_blocks("[]").unwrap().is_empty());
    }

    #[test]
    fn corrupt_blocks_column_is_a_serialization_error() {
        assert!(matches!(
            decode_blocks("{oops"),
            Err(StorageError::Serialization(_))
        ));
    }
}
