use crate::{errors::WhoisError, parser::display_date, whois::WhoisResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column order of every output file.
pub const FIELDNAMES: [&str; 8] = [
    "domain",
    "registrar",
    "creation_date",
    "expiration_date",
    "updated_date",
    "status",
    "name_servers",
    "error_message",
];

pub const NOT_AVAILABLE: &str = "N/A";
pub const STATUS_REGISTERED: &str = "REGISTERED";
pub const STATUS_NOT_FOUND: &str = "NOT FOUND";
pub const STATUS_RESERVED: &str = "NOT FOUND / RESERVED";
pub const STATUS_ERROR: &str = "ERROR";

/// One domain's lookup outcome, flattened to display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisRecord {
    pub domain: String,
    pub registrar: String,
    pub creation_date: String,
    pub expiration_date: String,
    pub updated_date: String,
    pub status: String,
    pub name_servers: String,
    pub error_message: String,
}

impl WhoisRecord {
    /// Record with every field `N/A` and no error.
    pub fn blank(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            registrar: NOT_AVAILABLE.to_string(),
            creation_date: NOT_AVAILABLE.to_string(),
            expiration_date: NOT_AVAILABLE.to_string(),
            updated_date: NOT_AVAILABLE.to_string(),
            status: NOT_AVAILABLE.to_string(),
            name_servers: NOT_AVAILABLE.to_string(),
            error_message: String::new(),
        }
    }

    pub fn from_lookup(domain: &str, lookup: Result<WhoisResult, WhoisError>) -> Self {
        match lookup {
            Ok(result) => Self::from_result(domain, &result),
            Err(e) => Self::from_error(domain, &e),
        }
    }

    pub fn from_result(domain: &str, result: &WhoisResult) -> Self {
        let mut record = Self::blank(domain);
        let parsed = &result.parsed_data;

        if parsed.domain_name.is_none() && !parsed.has_registration_data() {
            record.status = STATUS_RESERVED.to_string();
            return record;
        }

        let date = |value: &Option<String>| value.as_deref().map(display_date).unwrap_or_else(|| NOT_AVAILABLE.to_string());

        if let Some(registrar) = &parsed.registrar {
            record.registrar = registrar.clone();
        }
        record.creation_date = date(&parsed.creation_date);
        record.expiration_date = date(&parsed.expiration_date);
        record.updated_date = date(&parsed.updated_date);

        record.status = if parsed.status.is_empty() {
            STATUS_REGISTERED.to_string()
        } else {
            parsed.status.join(" | ")
        };

        let name_servers: Vec<&str> = parsed
            .name_servers
            .iter()
            .map(String::as_str)
            .filter(|ns| !ns.is_empty())
            .collect();
        if !name_servers.is_empty() {
            record.name_servers = name_servers.join(", ");
        }

        record
    }

    pub fn from_error(domain: &str, error: &WhoisError) -> Self {
        let mut record = Self::blank(domain);

        match error {
            WhoisError::NotFound(line) => {
                record.status = STATUS_NOT_FOUND.to_string();
                record.error_message = line.lines().next().unwrap_or_default().to_string();
            }
            other => {
                record.status = STATUS_ERROR.to_string();
                record.error_message = format!("Unexpected Error: {}", other);
            }
        }

        record
    }

    /// Values in [`FIELDNAMES`] order.
    pub fn values(&self) -> [&str; 8] {
        [
            self.domain.as_str(),
            self.registrar.as_str(),
            self.creation_date.as_str(),
            self.expiration_date.as_str(),
            self.updated_date.as_str(),
            self.status.as_str(),
            self.name_servers.as_str(),
            self.error_message.as_str(),
        ]
    }

    pub fn log_tag(&self) -> LogTag {
        let status = self.status.to_uppercase();
        if status.contains(STATUS_NOT_FOUND) || status.contains(STATUS_ERROR) {
            LogTag::Error
        } else {
            LogTag::Success
        }
    }
}

/// Colour class of a results-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTag {
    Info,
    Success,
    Error,
}

impl fmt::Display for LogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogTag::Info => write!(f, "info"),
            LogTag::Success => write!(f, "success"),
            LogTag::Error => write!(f, "error"),
        }
    }
}
