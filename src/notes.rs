use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::storage::{current_timestamp, Collection, Record, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u32,
    pub title: String,
    pub content: String,
    pub timestamp: String,
}

impl Record for Note {
    fn id(&self) -> u32 {
        self.id
    }
}

fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation(
            "Note title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub struct NoteManager {
    notes: Collection<Note>,
}

impl NoteManager {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        NoteManager {
            notes: Collection::open(path),
        }
    }

    pub fn create(&mut self, title: &str, content: &str) -> Result<u32, StoreError> {
        validate_title(title)?;

        let id = self.notes.allocate_id();
        self.notes.push(Note {
            id,
            title: title.to_string(),
            content: content.to_string(),
            timestamp: current_timestamp(),
        });
        self.notes.save()?;
        Ok(id)
    }

    pub fn list(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn get(&self, id: u32) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn edit(&mut self, id: u32, title: &str, content: &str) -> Result<(), StoreError> {
        validate_title(title)?;

        let note = self.notes.get_mut(id).ok_or(StoreError::NotFound(id))?;
        note.title = title.to_string();
        note.content = content.to_string();
        note.timestamp = current_timestamp();

        self.notes.save()
    }

    pub fn delete(&mut self, id: u32) -> Result<(), StoreError> {
        self.notes.remove(id).map(|_| ())
    }

    /// Loads notes from a CSV file with `title`, `content` and optional
    /// `timestamp` columns. Rows without a title are skipped with a
    /// warning; the batch never aborts on a bad row.
    pub fn import_csv(&mut self, path: &Path) -> Result<usize, StoreError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut imported = 0;

        for row in reader.deserialize::<NoteRow>() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping unreadable note row: {e}");
                    continue;
                }
            };

            let title = row.title.unwrap_or_default().trim().to_string();
            if title.is_empty() {
                warn!("Skipping note row without a title");
                continue;
            }

            let timestamp = match row.timestamp {
                Some(t) if !t.trim().is_empty() => t.trim().to_string(),
                _ => current_timestamp(),
            };

            let id = self.notes.allocate_id();
            self.notes.push(Note {
                id,
                title,
                content: row.content.unwrap_or_default().trim().to_string(),
                timestamp,
            });
            imported += 1;
        }

        self.notes.save()?;
        Ok(imported)
    }

    pub fn export_csv(&self, path: &Path) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(path)?;
        for note in self.notes.iter() {
            writer.serialize(note)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct NoteRow {
    title: Option<String>,
    content: Option<String>,
    timestamp: Option<String>,
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("daybook-notes-{}-{name}", std::process::id()))
    }

    #[test]
    fn create_and_get() {
        let path = temp_path("create.json");
        let mut notes = NoteManager::open(&path);

        let id = notes.create("Groceries", "milk, eggs").unwrap();
        let note = notes.get(id).unwrap();
        assert_eq!("Groceries", note.title);
        assert_eq!("milk, eggs", note.content);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn empty_title_rejected() {
        let path = temp_path("empty-title.json");
        let mut notes = NoteManager::open(&path);

        assert!(matches!(
            notes.create("   ", "content"),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(0, notes.list().count());
    }

    #[test]
    fn edit_refreshes_timestamp_fields() {
        let path = temp_path("edit.json");
        let mut notes = NoteManager::open(&path);

        let id = notes.create("Old", "old").unwrap();
        notes.edit(id, "New", "new").unwrap();

        let note = notes.get(id).unwrap();
        assert_eq!(("New", "new"), (note.title.as_str(), note.content.as_str()));

        assert!(matches!(
            notes.edit(999, "New", "new"),
            Err(StoreError::NotFound(999))
        ));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn delete_missing_note() {
        let path = temp_path("delete.json");
        let mut notes = NoteManager::open(&path);

        assert!(matches!(notes.delete(1), Err(StoreError::NotFound(1))));
    }

    #[test]
    fn import_skips_rows_without_title() {
        let json = temp_path("import.json");
        let csv_path = temp_path("import.csv");
        fs::write(
            &csv_path,
            "title,content,timestamp\nKeep,kept,01-02-2026 10:00:00\n,dropped,\n",
        )
        .unwrap();

        let mut notes = NoteManager::open(&json);
        let imported = notes.import_csv(&csv_path).unwrap();

        assert_eq!(1, imported);
        assert_eq!(1, notes.list().count());
        assert_eq!("Keep", notes.get(1).unwrap().title);
        assert_eq!("01-02-2026 10:00:00", notes.get(1).unwrap().timestamp);

        fs::remove_file(&json).unwrap();
        fs::remove_file(&csv_path).unwrap();
    }

    #[test]
    fn export_writes_headers_and_rows() {
        let json = temp_path("export.json");
        let csv_path = temp_path("export.csv");

        let mut notes = NoteManager::open(&json);
        notes.create("One", "first").unwrap();

        notes.export_csv(&csv_path).unwrap();
        let text = fs::read_to_string(&csv_path).unwrap();
        assert!(text.starts_with("id,title,content,timestamp\n"));
        assert!(text.contains("1,One,first,"));

        fs::remove_file(&json).unwrap();
        fs::remove_file(&csv_path).unwrap();
    }
}
