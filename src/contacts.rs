use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::storage::{Collection, Record, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: u32,
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl Record for Contact {
    fn id(&self) -> u32 {
        self.id
    }
}

fn validate(name: &str, phone: &str, email: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::Validation(
            "Contact name cannot be empty".to_string(),
        ));
    }
    if !phone.is_empty() && !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(StoreError::Validation(
            "Phone number must contain digits only".to_string(),
        ));
    }
    if !email.is_empty() && !email.contains('@') {
        return Err(StoreError::Validation(
            "Invalid email address".to_string(),
        ));
    }
    Ok(())
}

pub struct ContactManager {
    contacts: Collection<Contact>,
}

impl ContactManager {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        ContactManager {
            contacts: Collection::open(path),
        }
    }

    pub fn add(&mut self, name: &str, phone: &str, email: &str) -> Result<u32, StoreError> {
        validate(name, phone, email)?;

        let id = self.contacts.allocate_id();
        self.contacts.push(Contact {
            id,
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
        });
        self.contacts.save()?;
        Ok(id)
    }

    pub fn list(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }

    /// Matches the keyword case-insensitively against names and as a
    /// plain substring against phone numbers.
    pub fn search(&self, keyword: &str) -> Vec<&Contact> {
        let lowered = keyword.to_lowercase();
        self.contacts
            .iter()
            .filter(|contact| {
                contact.name.to_lowercase().contains(&lowered) || contact.phone.contains(keyword)
            })
            .collect()
    }

    pub fn get(&self, id: u32) -> Option<&Contact> {
        self.contacts.get(id)
    }

    pub fn edit(&mut self, id: u32, name: &str, phone: &str, email: &str) -> Result<(), StoreError> {
        validate(name, phone, email)?;

        let contact = self.contacts.get_mut(id).ok_or(StoreError::NotFound(id))?;
        contact.name = name.to_string();
        contact.phone = phone.to_string();
        contact.email = email.to_string();

        self.contacts.save()
    }

    pub fn delete(&mut self, id: u32) -> Result<(), StoreError> {
        self.contacts.remove(id).map(|_| ())
    }

    /// Loads contacts from a CSV file, skipping rows that fail any
    /// field rule with a warning instead of aborting the batch.
    pub fn import_csv(&mut self, path: &Path) -> Result<usize, StoreError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut imported = 0;

        for row in reader.deserialize::<ContactRow>() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping unreadable contact row: {e}");
                    continue;
                }
            };

            let name = row.name.unwrap_or_default().trim().to_string();
            let phone = row.phone.unwrap_or_default().trim().to_string();
            let email = row.email.unwrap_or_default().trim().to_string();

            if let Err(e) = validate(&name, &phone, &email) {
                warn!("Skipping contact row ({name:?}): {e}");
                continue;
            }

            let id = self.contacts.allocate_id();
            self.contacts.push(Contact {
                id,
                name,
                phone,
                email,
            });
            imported += 1;
        }

        self.contacts.save()?;
        Ok(imported)
    }

    pub fn export_csv(&self, path: &Path) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(path)?;
        for contact in self.contacts.iter() {
            writer.serialize(contact)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ContactRow {
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("daybook-contacts-{}-{name}", std::process::id()))
    }

    #[test]
    fn field_validation() {
        let path = temp_path("validation.json");
        let mut contacts = ContactManager::open(&path);

        assert!(matches!(
            contacts.add("", "123", "a@b.c"),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            contacts.add("Ada", "12a3", "a@b.c"),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            contacts.add("Ada", "123", "not-an-email"),
            Err(StoreError::Validation(_))
        ));

        // Phone and email are both optional.
        assert!(contacts.add("Ada", "", "").is_ok());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn search_by_name_and_phone() {
        let path = temp_path("search.json");
        let mut contacts = ContactManager::open(&path);

        contacts.add("Ada Lovelace", "12345", "ada@example.org").unwrap();
        contacts.add("Charles Babbage", "67890", "").unwrap();

        assert_eq!(1, contacts.search("ada").len());
        assert_eq!(1, contacts.search("678").len());
        assert_eq!(0, contacts.search("turing").len());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn import_skips_invalid_rows() {
        let json = temp_path("import.json");
        let csv_path = temp_path("import.csv");
        fs::write(
            &csv_path,
            "name,phone,email\n\
             Ada,12345,ada@example.org\n\
             ,123,\n\
             Bad Phone,12x45,\n\
             Bad Email,,nope\n",
        )
        .unwrap();

        let mut contacts = ContactManager::open(&json);
        assert_eq!(1, contacts.import_csv(&csv_path).unwrap());
        assert_eq!("Ada", contacts.get(1).unwrap().name);

        fs::remove_file(&json).unwrap();
        fs::remove_file(&csv_path).unwrap();
    }
}
