use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dates::CalendarDate;

/// A field value borrowed from a record.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Integer(i64),
    Decimal(f64),
    Date(CalendarDate),
}

impl<'a> FieldValue<'a> {
    /// The string form used for equality, search and rendering.
    pub fn to_text(&self) -> Cow<'a, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Integer(n) => Cow::Owned(n.to_string()),
            FieldValue::Decimal(n) => Cow::Owned(n.to_string()),
            FieldValue::Date(d) => Cow::Owned(d.to_string()),
        }
    }
}

/// One row of domain data. Fields are looked up by name so filters and
/// report columns can be declared as data.
pub trait Record {
    /// All field names, in declaration order.
    const FIELDS: &'static [&'static str];

    /// List key only. Never used for filtering or ordering.
    fn record_id(&self) -> &str;

    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanStatus {
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "In progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl PlanStatus {
    pub const CYCLE: [PlanStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    pub fn label(&self) -> &'static str {
        match self {
            PlanStatus::Pending => "Pending",
            PlanStatus::InProgress => "In progress",
            PlanStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassLetter {
    A,
    B,
    C,
    D,
    E,
}

impl ClassLetter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "E" => Some(Self::E),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLetter::A => "A",
            ClassLetter::B => "B",
            ClassLetter::C => "C",
            ClassLetter::D => "D",
            ClassLetter::E => "E",
        }
    }
}

impl fmt::Display for ClassLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        };
        f.write_str(label)
    }
}

/// A scheduled patching task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    pub id: String,
    pub date: CalendarDate,
    pub item: String,
    pub product: String,
    pub status: PlanStatus,
    pub owner: String,
    pub notes: String,
    pub category: String,
}

impl Record for PlanItem {
    const FIELDS: &'static [&'static str] = &[
        "id", "date", "item", "product", "status", "owner", "notes", "category",
    ];

    fn record_id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::Text(&self.id),
            "date" => FieldValue::Date(self.date),
            "item" => FieldValue::Text(&self.item),
            "product" => FieldValue::Text(&self.product),
            "status" => FieldValue::Text(self.status.label()),
            "owner" => FieldValue::Text(&self.owner),
            "notes" => FieldValue::Text(&self.notes),
            "category" => FieldValue::Text(&self.category),
            _ => return None,
        };
        Some(value)
    }
}

/// Support ranking row for a product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: String,
    pub item: String,
    pub absolute_support: u32,
    /// Percent, two decimals.
    pub relative_support: f64,
    pub description: String,
    pub category: String,
}

impl Record for ProductRow {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "item",
        "absolute_support",
        "relative_support",
        "description",
        "category",
    ];

    fn record_id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::Text(&self.id),
            "item" => FieldValue::Text(&self.item),
            "absolute_support" => FieldValue::Integer(i64::from(self.absolute_support)),
            "relative_support" => FieldValue::Decimal(self.relative_support),
            "description" => FieldValue::Text(&self.description),
            "category" => FieldValue::Text(&self.category),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRow {
    pub id: String,
    pub item_code: String,
    pub class: ClassLetter,
}

impl Record for ClassificationRow {
    const FIELDS: &'static [&'static str] = &["id", "item_code", "class"];

    fn record_id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::Text(&self.id),
            "item_code" => FieldValue::Text(&self.item_code),
            "class" => FieldValue::Text(self.class.as_str()),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: Severity,
    pub message: String,
}

/// One bucket of the day-granularity support feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailySupport {
    pub date: CalendarDate,
    pub support: i64,
}

impl Record for DailySupport {
    const FIELDS: &'static [&'static str] = &["date", "support"];

    fn record_id(&self) -> &str {
        ""
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "date" => Some(FieldValue::Date(self.date)),
            "support" => Some(FieldValue::Integer(self.support)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_items: usize,
    pub total_support: u64,
    pub share_a: f64,
    pub share_b: f64,
    pub alerts: usize,
    pub coverage: f64,
}
