use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::apis::PaperType;

/// Filter fields that participate in the server-side listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Subject,
    Year,
    Region,
    PaperType,
}

impl FromStr for FilterField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subject" | "subject_id" => Ok(FilterField::Subject),
            "year" | "year_id" => Ok(FilterField::Year),
            "region" | "region_id" => Ok(FilterField::Region),
            "type" | "paper_type" => Ok(FilterField::PaperType),
            other => Err(FilterError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter field: {0}")]
    UnknownField(String),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// The active query. `search` is applied client side only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub subject_id: Option<u64>,
    pub year_id: Option<u64>,
    pub region_id: Option<u64>,
    pub paper_type: Option<PaperType>,
    pub search: String,
}

impl FilterSelection {
    /// Set or clear one server-side filter. A blank value clears the field.
    pub fn set(&mut self, field: FilterField, value: Option<&str>) -> Result<(), FilterError> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        match field {
            FilterField::Subject => self.subject_id = parse_id("subject_id", value)?,
            FilterField::Year => self.year_id = parse_id("year_id", value)?,
            FilterField::Region => self.region_id = parse_id("region_id", value)?,
            FilterField::PaperType => {
                self.paper_type = match value {
                    None => None,
                    Some(v) => Some(PaperType::parse(v).ok_or_else(|| {
                        FilterError::InvalidValue {
                            field: "paper_type",
                            value: v.to_string(),
                        }
                    })?),
                }
            }
        }
        Ok(())
    }
}

fn parse_id(field: &'static str, value: Option<&str>) -> Result<Option<u64>, FilterError> {
    value
        .map(|v| {
            v.parse::<u64>().map_err(|_| FilterError::InvalidValue {
                field,
                value: v.to_string(),
            })
        })
        .transpose()
}

/// Build the listing query: only set fields are included, in a fixed order.
pub fn build_query(filters: &FilterSelection) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(id) = filters.subject_id {
        query.push(("subject_id", id.to_string()));
    }
    if let Some(id) = filters.year_id {
        query.push(("year_id", id.to_string()));
    }
    if let Some(id) = filters.region_id {
        query.push(("region_id", id.to_string()));
    }
    if let Some(t) = filters.paper_type {
        query.push(("paper_type", t.as_str().to_string()));
    }
    query
}
