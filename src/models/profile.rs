use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Isolation boundary between the two households' records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Bride,
    Groom,
}

impl Profile {
    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Bride => "bride",
            Profile::Groom => "groom",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bride" => Ok(Profile::Bride),
            "groom" => Ok(Profile::Groom),
            other => Err(format!("Unknown profile '{}'. Use 'bride' or 'groom'.", other)),
        }
    }
}

/// The four record collections kept per profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Income,
    Expense,
    PendingIncome,
    Budget,
}

impl RecordKind {
    pub fn table(self) -> &'static str {
        match self {
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
            RecordKind::PendingIncome => "pending_income",
            RecordKind::Budget => "budget",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordKind::Income => "Income",
            RecordKind::Expense => "Expense",
            RecordKind::PendingIncome => "Pending income",
            RecordKind::Budget => "Budget",
        };
        f.write_str(label)
    }
}
