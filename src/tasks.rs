use std::fmt;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::storage::{parse_date, Collection, Record, StoreError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn parse(s: &str) -> Option<Priority> {
        match s {
            "High" => Some(Priority::High),
            "Medium" => Some(Priority::Medium),
            "Low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub done: bool,
    pub priority: Priority,
    pub due_date: Option<String>,
}

impl Record for Task {
    fn id(&self) -> u32 {
        self.id
    }
}

pub enum TaskFilter {
    Status(bool),
    Priority(Priority),
    DueDate(String),
}

fn validate(title: &str, due_date: Option<&str>) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation(
            "Task title cannot be empty".to_string(),
        ));
    }
    if let Some(date) = due_date {
        if parse_date(date).is_none() {
            return Err(StoreError::Validation(
                "Invalid date format, expected DD-MM-YYYY".to_string(),
            ));
        }
    }
    Ok(())
}

pub struct TaskManager {
    tasks: Collection<Task>,
}

impl TaskManager {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        TaskManager {
            tasks: Collection::open(path),
        }
    }

    pub fn add(
        &mut self,
        title: &str,
        description: &str,
        priority: Priority,
        due_date: Option<&str>,
    ) -> Result<u32, StoreError> {
        validate(title, due_date)?;

        let id = self.tasks.allocate_id();
        self.tasks.push(Task {
            id,
            title: title.to_string(),
            description: description.to_string(),
            done: false,
            priority,
            due_date: due_date.map(str::to_string),
        });
        self.tasks.save()?;
        Ok(id)
    }

    pub fn list(&self, filter: Option<&TaskFilter>) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| match filter {
                None => true,
                Some(TaskFilter::Status(done)) => task.done == *done,
                Some(TaskFilter::Priority(priority)) => task.priority == *priority,
                Some(TaskFilter::DueDate(date)) => task.due_date.as_deref() == Some(date.as_str()),
            })
            .collect()
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn mark_done(&mut self, id: u32) -> Result<(), StoreError> {
        let task = self.tasks.get_mut(id).ok_or(StoreError::NotFound(id))?;
        task.done = true;
        self.tasks.save()
    }

    pub fn edit(
        &mut self,
        id: u32,
        title: &str,
        description: &str,
        priority: Priority,
        due_date: Option<&str>,
    ) -> Result<(), StoreError> {
        validate(title, due_date)?;

        let task = self.tasks.get_mut(id).ok_or(StoreError::NotFound(id))?;
        task.title = title.to_string();
        task.description = description.to_string();
        task.priority = priority;
        task.due_date = due_date.map(str::to_string);

        self.tasks.save()
    }

    pub fn delete(&mut self, id: u32) -> Result<(), StoreError> {
        self.tasks.remove(id).map(|_| ())
    }

    /// Loads tasks from a CSV file. Unknown priorities fall back to
    /// Medium, unparseable due dates are dropped, rows without a title
    /// are skipped with a warning.
    pub fn import_csv(&mut self, path: &Path) -> Result<usize, StoreError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut imported = 0;

        for row in reader.deserialize::<TaskRow>() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping unreadable task row: {e}");
                    continue;
                }
            };

            let title = row.title.unwrap_or_default().trim().to_string();
            if title.is_empty() {
                warn!("Skipping task row without a title");
                continue;
            }

            let priority = row
                .priority
                .as_deref()
                .map(str::trim)
                .and_then(Priority::parse)
                .unwrap_or_default();

            let due_date = row
                .due_date
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .filter(|d| parse_date(d).is_some());

            let done = row
                .done
                .map(|d| d.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false);

            let id = self.tasks.allocate_id();
            self.tasks.push(Task {
                id,
                title,
                description: row.description.unwrap_or_default().trim().to_string(),
                done,
                priority,
                due_date,
            });
            imported += 1;
        }

        self.tasks.save()?;
        Ok(imported)
    }

    pub fn export_csv(&self, path: &Path) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(path)?;
        for task in self.tasks.iter() {
            writer.serialize(task)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    title: Option<String>,
    description: Option<String>,
    done: Option<String>,
    priority: Option<String>,
    due_date: Option<String>,
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("daybook-tasks-{}-{name}", std::process::id()))
    }

    #[test]
    fn add_and_mark_done() {
        let path = temp_path("done.json");
        let mut tasks = TaskManager::open(&path);

        let id = tasks
            .add("Ship report", "quarterly numbers", Priority::High, None)
            .unwrap();
        assert!(!tasks.get(id).unwrap().done);

        tasks.mark_done(id).unwrap();
        assert!(tasks.get(id).unwrap().done);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn bad_due_date_rejected() {
        let path = temp_path("bad-date.json");
        let mut tasks = TaskManager::open(&path);

        assert!(matches!(
            tasks.add("Task", "", Priority::Medium, Some("2026-01-31")),
            Err(StoreError::Validation(_))
        ));
        assert!(tasks
            .add("Task", "", Priority::Medium, Some("31-01-2026"))
            .is_ok());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn filters() {
        let path = temp_path("filters.json");
        let mut tasks = TaskManager::open(&path);

        let a = tasks.add("A", "", Priority::High, Some("01-03-2026")).unwrap();
        tasks.add("B", "", Priority::Low, None).unwrap();
        tasks.mark_done(a).unwrap();

        assert_eq!(1, tasks.list(Some(&TaskFilter::Status(true))).len());
        assert_eq!(1, tasks.list(Some(&TaskFilter::Status(false))).len());
        assert_eq!(
            "A",
            tasks.list(Some(&TaskFilter::Priority(Priority::High)))[0].title
        );
        assert_eq!(
            "A",
            tasks.list(Some(&TaskFilter::DueDate("01-03-2026".to_string())))[0].title
        );
        assert_eq!(2, tasks.list(None).len());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn import_applies_fallbacks() {
        let json = temp_path("import.json");
        let csv_path = temp_path("import.csv");
        fs::write(
            &csv_path,
            "title,description,done,priority,due_date\n\
             Pay rent,monthly,true,High,01-02-2026\n\
             Water plants,,false,Urgent,someday\n\
             ,missing title,false,Low,\n",
        )
        .unwrap();

        let mut tasks = TaskManager::open(&json);
        let imported = tasks.import_csv(&csv_path).unwrap();

        assert_eq!(2, imported);

        let rent = tasks.get(1).unwrap();
        assert!(rent.done);
        assert_eq!(Priority::High, rent.priority);
        assert_eq!(Some("01-02-2026"), rent.due_date.as_deref());

        let plants = tasks.get(2).unwrap();
        assert_eq!(Priority::Medium, plants.priority);
        assert_eq!(None, plants.due_date);

        fs::remove_file(&json).unwrap();
        fs::remove_file(&csv_path).unwrap();
    }
}
