use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate};
use log::error;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%d-%m-%Y";
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

pub fn current_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Record {0} not found")]
    NotFound(u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub trait Record: Serialize + DeserializeOwned {
    fn id(&self) -> u32;
}

/// An ordered record collection persisted as a JSON array at a fixed path.
pub struct Collection<T> {
    path: PathBuf,
    items: Vec<T>,
    next_id: u32,
}

impl<T: Record> Collection<T> {
    /// Opens the collection at `path`. A missing file yields an empty
    /// collection; an unreadable or corrupt one is logged and treated
    /// as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let items: Vec<T> = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(items) => items,
                Err(e) => {
                    error!("Failed to parse {}: {e}", path.display());
                    Vec::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                error!("Failed to read {}: {e}", path.display());
                Vec::new()
            }
        };

        let next_id = items.iter().map(Record::id).max().unwrap_or(0) + 1;

        Collection {
            path,
            items,
            next_id,
        }
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.items)?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Ids only ever grow; deleting the newest record does not free its id.
    pub fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn remove(&mut self, id: u32) -> Result<T, StoreError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(StoreError::NotFound(id))?;

        let item = self.items.remove(index);
        self.save()?;
        Ok(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod test {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u32,
        name: String,
    }

    impl Record for Item {
        fn id(&self) -> u32 {
            self.id
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("daybook-storage-{}-{name}", std::process::id()))
    }

    #[test]
    fn missing_file_is_empty() {
        let collection: Collection<Item> = Collection::open(temp_path("missing.json"));
        assert!(collection.is_empty());
        assert_eq!(1, collection.next_id);
    }

    #[test]
    fn ids_are_not_reused() {
        let mut collection: Collection<Item> = Collection::open(temp_path("ids.json"));

        let a = collection.allocate_id();
        collection.push(Item {
            id: a,
            name: "a".to_string(),
        });
        let b = collection.allocate_id();
        collection.push(Item {
            id: b,
            name: "b".to_string(),
        });

        assert_eq!((1, 2), (a, b));

        collection.remove(b).unwrap();
        assert_eq!(3, collection.allocate_id());

        fs::remove_file(collection.path()).unwrap();
    }

    #[test]
    fn round_trip() {
        let path = temp_path("round-trip.json");

        let mut collection: Collection<Item> = Collection::open(&path);
        let id = collection.allocate_id();
        collection.push(Item {
            id,
            name: "kept".to_string(),
        });
        collection.save().unwrap();

        let reopened: Collection<Item> = Collection::open(&path);
        assert_eq!(
            Some(&Item {
                id: 1,
                name: "kept".to_string()
            }),
            reopened.get(1)
        );
        assert_eq!(2, reopened.next_id);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn corrupt_file_is_empty() {
        let path = temp_path("corrupt.json");
        fs::write(&path, "not json").unwrap();

        let collection: Collection<Item> = Collection::open(&path);
        assert!(collection.is_empty());

        fs::remove_file(&path).unwrap();
    }
}
