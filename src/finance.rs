use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::storage::{parse_date, Collection, Record, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceRecord {
    pub id: u32,
    pub amount: f64,
    pub category: String,
    pub date: String,
    pub description: String,
}

impl Record for FinanceRecord {
    fn id(&self) -> u32 {
        self.id
    }
}

impl FinanceRecord {
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }
}

pub enum RecordFilter {
    Date(String),
    Category(String),
}

/// Totals over an inclusive date range, with per-category sums.
#[derive(Debug, PartialEq)]
pub struct FinanceReport {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub by_category: BTreeMap<String, f64>,
}

fn validate(amount: f64, category: &str, date: &str) -> Result<(), StoreError> {
    if amount == 0.0 {
        return Err(StoreError::Validation(
            "Amount cannot be zero".to_string(),
        ));
    }
    if category.trim().is_empty() {
        return Err(StoreError::Validation(
            "Category cannot be empty".to_string(),
        ));
    }
    if parse_date(date).is_none() {
        return Err(StoreError::Validation(
            "Invalid date format, expected DD-MM-YYYY".to_string(),
        ));
    }
    Ok(())
}

pub struct FinanceManager {
    records: Collection<FinanceRecord>,
}

impl FinanceManager {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        FinanceManager {
            records: Collection::open(path),
        }
    }

    pub fn add(
        &mut self,
        amount: f64,
        category: &str,
        date: &str,
        description: &str,
    ) -> Result<u32, StoreError> {
        validate(amount, category, date)?;

        let id = self.records.allocate_id();
        self.records.push(FinanceRecord {
            id,
            amount,
            category: category.to_string(),
            date: date.to_string(),
            description: description.to_string(),
        });
        self.records.save()?;
        Ok(id)
    }

    pub fn list(&self, filter: Option<&RecordFilter>) -> Vec<&FinanceRecord> {
        self.records
            .iter()
            .filter(|record| match filter {
                None => true,
                Some(RecordFilter::Date(date)) => record.date == *date,
                Some(RecordFilter::Category(category)) => {
                    record.category.eq_ignore_ascii_case(category)
                }
            })
            .collect()
    }

    pub fn get(&self, id: u32) -> Option<&FinanceRecord> {
        self.records.get(id)
    }

    pub fn edit(
        &mut self,
        id: u32,
        amount: f64,
        category: &str,
        date: &str,
        description: &str,
    ) -> Result<(), StoreError> {
        validate(amount, category, date)?;

        let record = self.records.get_mut(id).ok_or(StoreError::NotFound(id))?;
        record.amount = amount;
        record.category = category.to_string();
        record.date = date.to_string();
        record.description = description.to_string();

        self.records.save()
    }

    pub fn delete(&mut self, id: u32) -> Result<(), StoreError> {
        self.records.remove(id).map(|_| ())
    }

    /// Builds a report over the inclusive `start..=end` date range.
    /// Dates are compared as calendar dates, not as strings.
    pub fn report(&self, start: &str, end: &str) -> Result<FinanceReport, StoreError> {
        let start = parse_date(start).ok_or_else(|| {
            StoreError::Validation("Invalid date format, expected DD-MM-YYYY".to_string())
        })?;
        let end = parse_date(end).ok_or_else(|| {
            StoreError::Validation("Invalid date format, expected DD-MM-YYYY".to_string())
        })?;
        if start > end {
            return Err(StoreError::Validation(
                "Start date cannot be after end date".to_string(),
            ));
        }

        let mut report = FinanceReport {
            total_income: 0.0,
            total_expense: 0.0,
            balance: 0.0,
            by_category: BTreeMap::new(),
        };

        for record in self.records.iter() {
            let Some(date) = parse_date(&record.date) else {
                continue;
            };
            if date < start || date > end {
                continue;
            }

            if record.is_income() {
                report.total_income += record.amount;
            } else {
                report.total_expense += record.amount;
            }
            *report.by_category.entry(record.category.clone()).or_insert(0.0) += record.amount;
        }

        report.balance = report.total_income + report.total_expense;
        Ok(report)
    }

    pub fn balance(&self) -> f64 {
        self.records.iter().map(|record| record.amount).sum()
    }

    /// Loads records from a CSV file. Rows with a missing amount or
    /// category, an unparseable number, or a bad date are skipped with
    /// a warning.
    pub fn import_csv(&mut self, path: &Path) -> Result<usize, StoreError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut imported = 0;

        for row in reader.deserialize::<FinanceRow>() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping unreadable finance row: {e}");
                    continue;
                }
            };

            let amount = match row.amount.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => match text.parse::<f64>() {
                    Ok(amount) => amount,
                    Err(_) => {
                        warn!("Skipping finance row with bad amount: {text:?}");
                        continue;
                    }
                },
                _ => {
                    warn!("Skipping finance row without an amount");
                    continue;
                }
            };

            let category = row.category.unwrap_or_default().trim().to_string();
            let date = row.date.unwrap_or_default().trim().to_string();
            if let Err(e) = validate(amount, &category, &date) {
                warn!("Skipping finance row: {e}");
                continue;
            }

            let id = self.records.allocate_id();
            self.records.push(FinanceRecord {
                id,
                amount,
                category,
                date,
                description: row.description.unwrap_or_default().trim().to_string(),
            });
            imported += 1;
        }

        self.records.save()?;
        Ok(imported)
    }

    pub fn export_csv(&self, path: &Path) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in self.records.iter() {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct FinanceRow {
    amount: Option<String>,
    category: Option<String>,
    date: Option<String>,
    description: Option<String>,
}
