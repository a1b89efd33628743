use chrono::NaiveTime;
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::booking::{ListingDraft, UserId, WeekDay, WeeklySlot};

use super::{CatalogImportError, ListingSeed};

pub(crate) fn parse_seeds<R: Read>(reader: R) -> Result<Vec<ListingSeed>, CatalogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut seeds = Vec::new();

    for (index, record) in csv_reader.deserialize::<SeedRow>().enumerate() {
        let row = record?;
        // Header is line 1, the first data row line 2.
        let line = index as u64 + 2;
        seeds.push(row.into_seed(line)?);
    }

    Ok(seeds)
}

#[derive(Debug, Deserialize)]
struct SeedRow {
    owner: String,
    title: String,
    description: String,
    category: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    price: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    radius_km: Option<String>,
    days: String,
    start: String,
    end: String,
}

impl SeedRow {
    fn into_seed(self, line: u64) -> Result<ListingSeed, CatalogImportError> {
        let price = self
            .price
            .as_deref()
            .map(|value| parse_number(value, line, "price"))
            .transpose()?;
        let radius_km = self
            .radius_km
            .as_deref()
            .map(|value| parse_number(value, line, "radius_km"))
            .transpose()?;
        let start = parse_time(&self.start, line, "start")?;
        let end = parse_time(&self.end, line, "end")?;

        let mut slots = Vec::new();
        for day in parse_days(&self.days, line)? {
            slots.push(WeeklySlot { day, start, end });
        }

        Ok(ListingSeed {
            draft: ListingDraft {
                owner_id: UserId(self.owner),
                title: self.title,
                description: self.description,
                category: self.category,
                price,
                radius_km,
            },
            slots,
        })
    }
}

fn parse_days(value: &str, line: u64) -> Result<Vec<WeekDay>, CatalogImportError> {
    let mut days = Vec::new();
    for part in value.split('|') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let number: u8 = trimmed.parse().map_err(|_| CatalogImportError::Row {
            line,
            message: format!("'{trimmed}' is not a weekday number"),
        })?;
        let day = WeekDay::try_from(number).map_err(|err| CatalogImportError::Row {
            line,
            message: err.to_string(),
        })?;
        days.push(day);
    }

    if days.is_empty() {
        return Err(CatalogImportError::Row {
            line,
            message: "no weekday listed in 'days'".to_string(),
        });
    }

    Ok(days)
}

fn parse_number(value: &str, line: u64, field: &str) -> Result<u32, CatalogImportError> {
    value.parse().map_err(|_| CatalogImportError::Row {
        line,
        message: format!("'{value}' is not a number for '{field}'"),
    })
}

fn parse_time(value: &str, line: u64, field: &str) -> Result<NaiveTime, CatalogImportError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| CatalogImportError::Row {
            line,
            message: format!("'{value}' is not an HH:MM time for '{field}'"),
        })
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
