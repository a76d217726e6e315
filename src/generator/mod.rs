//! Fake record source.
//!
//! Produces a lazy stream of [`Record`]s whose columns are described by a
//! [`Schema`]. Values come from the `fake` crate (file names, people, words)
//! or from `chrono` (dates), all driven by one seeded RNG so a given seed
//! and end date always give the same records.

use crate::error::{Error, Result};
use crate::record::Record;
use chrono::{Days, NaiveDate};
use fake::faker::filesystem::en::FileName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// What kind of fake value a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// e.g. `report.pdf`
    FileName,
    /// ISO date `YYYY-MM-DD`
    Date,
    Name,
    Email,
    Word,
}

impl std::str::FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file_name" | "filename" | "file" => Ok(FieldKind::FileName),
            "date" => Ok(FieldKind::Date),
            "name" => Ok(FieldKind::Name),
            "email" => Ok(FieldKind::Email),
            "word" => Ok(FieldKind::Word),
            _ => Err(format!(
                "Unknown field kind: {}. Valid options: file_name, date, name, email, word",
                s
            )),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::FileName => write!(f, "file_name"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::Name => write!(f, "name"),
            FieldKind::Email => write!(f, "email"),
            FieldKind::Word => write!(f, "word"),
        }
    }
}

/// One column of generated output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered, non-empty set of uniquely named columns.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    names: Arc<[String]>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::invalid_argument("schema needs at least one field"));
        }
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(Error::invalid_argument(format!(
                    "duplicate field name in schema: {}",
                    field.name
                )));
            }
        }
        let names: Arc<[String]> = fields.iter().map(|f| f.name.clone()).collect();
        Ok(Self { fields, names })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_names(&self) -> &[String] {
        &self.names
    }
}

impl Default for Schema {
    /// `file,date`
    fn default() -> Self {
        let fields = vec![
            FieldSpec::new("file", FieldKind::FileName),
            FieldSpec::new("date", FieldKind::Date),
        ];
        let names: Arc<[String]> = fields.iter().map(|f| f.name.clone()).collect();
        Self { fields, names }
    }
}

/// Lazy iterator over exactly `count` fake records.
pub struct FakeRecords {
    schema: Schema,
    remaining: u64,
    rng: StdRng,
    date_start: NaiveDate,
    date_span_days: u64,
}

impl FakeRecords {
    /// Records dated between 1970-01-01 and today.
    pub fn new(schema: Schema, count: u64, seed: u64) -> Self {
        let today = chrono::Local::now().date_naive();
        let mut records = Self {
            schema,
            remaining: count,
            rng: StdRng::seed_from_u64(seed),
            date_start: NaiveDate::default(),
            date_span_days: 0,
        };
        records.set_end_date(today);
        records
    }

    /// Pin the latest generated date, making output independent of the clock.
    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.set_end_date(end);
        self
    }

    fn set_end_date(&mut self, end: NaiveDate) {
        // NaiveDate::default() is the Unix epoch.
        self.date_start = NaiveDate::default();
        self.date_span_days = (end - self.date_start).num_days().max(0) as u64;
    }
}

fn fake_value(
    rng: &mut StdRng,
    kind: FieldKind,
    date_start: NaiveDate,
    date_span_days: u64,
) -> String {
    match kind {
        FieldKind::FileName => FileName().fake_with_rng(rng),
        FieldKind::Date => {
            let offset = rng.random_range(0..=date_span_days);
            date_start
                .checked_add_days(Days::new(offset))
                .unwrap_or(date_start)
                .format("%Y-%m-%d")
                .to_string()
        }
        FieldKind::Name => Name().fake_with_rng(rng),
        FieldKind::Email => SafeEmail().fake_with_rng(rng),
        FieldKind::Word => Word().fake_with_rng(rng),
    }
}

impl Iterator for FakeRecords {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let (start, span) = (self.date_start, self.date_span_days);
        let rng = &mut self.rng;
        let values = self
            .schema
            .fields
            .iter()
            .map(|field| fake_value(rng, field.kind, start, span))
            .collect();
        Record::new(Arc::clone(&self.schema.names), values)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}
