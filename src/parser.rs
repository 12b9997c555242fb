use crate::{errors::WhoisError, ParsedWhoisData};
use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::RegexSet;
use tracing::debug;

/// Phrases registries use to say the domain has no record.
static NOT_FOUND_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)\bno match\b",
        r"(?i)\bnot found\b",
        r"(?i)\bno data found\b",
        r"(?i)\bno entries found\b",
        r"(?i)\bno matching (record|entry)\b",
        r"(?i)\bstatus:\s*(free|available)\b",
        r"(?i)\bnot registered\b",
        r"(?i)\bno object found\b",
        r"(?i)\bobject does not exist\b",
        r"(?i)\bhas not been registered\b",
        r"(?i)\bdomain (is )?available\b",
    ])
    .expect("not-found patterns are valid")
});

/// Display format for normalised dates.
pub const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default, Clone, Copy)]
pub struct WhoisParser;

impl WhoisParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a raw whois answer.
    ///
    /// Fails with [`WhoisError::NotFound`] when the answer carries no
    /// registration data and reads like a "no match" reply.
    pub fn parse(&self, data: &str) -> Result<ParsedWhoisData, WhoisError> {
        let parsed = self.parse_whois_data(data);

        if !parsed.has_registration_data() && NOT_FOUND_PATTERNS.is_match(data) {
            return Err(WhoisError::NotFound(first_line(data)));
        }

        Ok(parsed)
    }

    pub fn parse_whois_data(&self, data: &str) -> ParsedWhoisData {
        let mut parsed = ParsedWhoisData::default();

        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') || line.starts_with('#') || line.starts_with(">>>") {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            if value.is_empty() {
                continue;
            }

            // Order matters: "Registrar Registration Expiration Date" must land
            // on the expiry arm, not the registrar one.
            match key.as_str() {
                "domain name" | "domain" => {
                    if parsed.domain_name.is_none() {
                        parsed.domain_name = Some(value.to_string());
                    }
                }

                k if k.contains("expir") || k.contains("paid-till") => {
                    if parsed.expiration_date.is_none() {
                        parsed.expiration_date = Some(value.to_string());
                    }
                }

                k if k.contains("creation") || k.contains("created") || k == "registered" || k == "registered on" => {
                    if parsed.creation_date.is_none() {
                        parsed.creation_date = Some(value.to_string());
                    }
                }

                k if k.contains("updated") || k.contains("modified") || k == "changed" => {
                    if parsed.updated_date.is_none() {
                        parsed.updated_date = Some(value.to_string());
                    }
                }

                k if is_registrar_key(k) => {
                    if parsed.registrar.is_none() {
                        parsed.registrar = Some(value.to_string());
                    }
                }

                k if k.contains("name server") || k == "nserver" || k == "nameserver" || k == "nameservers" || k == "ns" => {
                    // Hostname only, drop glue addresses
                    let server = value.split_whitespace().next().unwrap_or(value).trim_end_matches('.');
                    if !parsed.name_servers.iter().any(|s| s.eq_ignore_ascii_case(server)) {
                        parsed.name_servers.push(server.to_string());
                    }
                }

                k if k.contains("status") => {
                    if !parsed.status.iter().any(|s| s == value) {
                        parsed.status.push(value.to_string());
                    }
                }

                _ => {}
            }
        }

        parsed
    }
}

fn is_registrar_key(key: &str) -> bool {
    match key {
        "registrar" | "registrar name" | "sponsoring registrar" | "registrar organization" => true,
        k => {
            k.starts_with("registrar")
                && ["whois", "url", "abuse", "iana", "id", "phone", "email", "fax", "registration", "address", "country"]
                    .iter()
                    .all(|excluded| !k.contains(excluded))
        }
    }
}

fn first_line(data: &str) -> String {
    data.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Normalise a whois date to [`DATE_DISPLAY_FORMAT`]; unknown formats are
/// passed through untouched.
pub fn display_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(dt) => dt.format(DATE_DISPLAY_FORMAT).to_string(),
        None => raw.trim().to_string(),
    }
}

/// Parse various date formats commonly found in whois data
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt.with_timezone(&Utc));
    }

    let zoned_formats = [
        "%Y-%m-%dT%H:%M:%S%z",   // 2025-05-18T13:36:06+0000
        "%Y-%m-%d %H:%M:%S%z",   // 2025-05-18 13:36:06+0000
        "%Y-%m-%d %H:%M:%S %z",  // 2025-05-18 13:36:06 +0000
    ];
    for format in &zoned_formats {
        if let Ok(dt) = DateTime::parse_from_str(date_str, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive_formats = [
        "%Y-%m-%dT%H:%M:%S%.fZ", // 2025-05-18T13:36:06.0Z
        "%Y-%m-%dT%H:%M:%SZ",    // 2025-05-18T13:36:06Z
        "%Y-%m-%dT%H:%M:%S",     // 2025-05-18T13:36:06
        "%Y-%m-%d %H:%M:%S",     // 2025-05-18 13:36:06
        "%Y.%m.%d %H:%M:%S",     // 2025.05.18 13:36:06
        "%d-%b-%Y %H:%M:%S",     // 18-May-2025 13:36:06
    ];
    for format in &naive_formats {
        if let Ok(naive_dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Some(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
        }
    }

    let date_only_formats = [
        "%Y-%m-%d",
        "%d-%b-%Y",
        "%d %b %Y",
        "%Y/%m/%d",
        "%Y.%m.%d",
        "%d.%m.%Y",
        "%d/%m/%Y",
    ];
    for format in &date_only_formats {
        if let Ok(naive_date) = chrono::NaiveDate::parse_from_str(date_str, format) {
            if let Some(naive_dt) = naive_date.and_hms_opt(0, 0, 0) {
                return Some(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
            }
        }
    }

    debug!("Failed to parse date: {}", date_str);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERISIGN_SAMPLE: &str = "   Domain Name: GOOGLE.COM
   Registry Domain ID: 2138514_DOMAIN_COM-VRSN
   Registrar WHOIS Server: whois.markmonitor.com
   Registrar URL: http://www.markmonitor.com
   Updated Date: 2019-09-09T15:39:04Z
   Creation Date: 1997-09-15T04:00:00Z
   Registry Expiry Date: 2028-09-14T04:00:00Z
   Registrar: MarkMonitor Inc.
   Registrar IANA ID: 292
   Registrar Abuse Contact Email: abusecomplaints@markmonitor.com
   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited
   Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited
   Name Server: NS1.GOOGLE.COM
   Name Server: NS2.GOOGLE.COM
   Name Server: ns1.google.com
   DNSSEC: unsigned
>>> Last update of whois database: 2024-01-01T00:00:00Z <<<
";

    #[test]
    fn test_parse_registry_answer() {
        let parsed = WhoisParser::new().parse(VERISIGN_SAMPLE).unwrap();

        assert_eq!(parsed.domain_name.as_deref(), Some("GOOGLE.COM"));
        assert_eq!(parsed.registrar.as_deref(), Some("MarkMonitor Inc."));
        assert_eq!(parsed.creation_date.as_deref(), Some("1997-09-15T04:00:00Z"));
        assert_eq!(parsed.expiration_date.as_deref(), Some("2028-09-14T04:00:00Z"));
        assert_eq!(parsed.updated_date.as_deref(), Some("2019-09-09T15:39:04Z"));
        assert_eq!(parsed.name_servers, vec!["NS1.GOOGLE.COM", "NS2.GOOGLE.COM"]);
        assert_eq!(parsed.status.len(), 2);
    }

    #[test]
    fn test_registrar_ignores_contact_fields() {
        let data = "Registrar IANA ID: 292\nRegistrar Abuse Contact Phone: +1.2083895740\nRegistrar: Example Registrar, LLC\n";
        let parsed = WhoisParser::new().parse_whois_data(data);
        assert_eq!(parsed.registrar.as_deref(), Some("Example Registrar, LLC"));
    }

    #[test]
    fn test_cctld_style_keys() {
        let data = "domain:        example.ru\nnserver:       a.iana-servers.net.\nnserver:       b.iana-servers.net.\nstate:         REGISTERED, DELEGATED\ncreated:       1999-06-23T20:00:00Z\npaid-till:     2025-07-01T21:00:00Z\n";
        let parsed = WhoisParser::new().parse(data).unwrap();

        assert_eq!(parsed.domain_name.as_deref(), Some("example.ru"));
        assert_eq!(parsed.name_servers, vec!["a.iana-servers.net", "b.iana-servers.net"]);
        assert_eq!(parsed.expiration_date.as_deref(), Some("2025-07-01T21:00:00Z"));
        assert_eq!(parsed.creation_date.as_deref(), Some("1999-06-23T20:00:00Z"));
    }

    #[test]
    fn test_no_match_is_not_found() {
        let data = "No match for \"SURELY-UNREGISTERED-123.COM\".\n>>> Last update of whois database: 2024-01-01T00:00:00Z <<<\n";
        match WhoisParser::new().parse(data) {
            Err(WhoisError::NotFound(line)) => {
                assert_eq!(line, "No match for \"SURELY-UNREGISTERED-123.COM\".");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_phrase_inside_real_record_is_ignored() {
        let data = format!("{}NOTICE: if a contact is not found, contact the registrar.\n", VERISIGN_SAMPLE);
        assert!(WhoisParser::new().parse(&data).is_ok());
    }

    #[test]
    fn test_unrecognised_answer_parses_empty() {
        let parsed = WhoisParser::new().parse("Terms of use apply.\n").unwrap();
        assert!(parsed.domain_name.is_none());
        assert!(!parsed.has_registration_data());
    }

    #[test]
    fn test_display_date_normalises_known_formats() {
        assert_eq!(display_date("1997-09-15T04:00:00Z"), "1997-09-15 04:00:00");
        assert_eq!(display_date("2028-09-13T07:00:00.0Z"), "2028-09-13 07:00:00");
        assert_eq!(display_date("2024-03-01T10:00:00+02:00"), "2024-03-01 08:00:00");
        assert_eq!(display_date("15-Sep-1997"), "1997-09-15 00:00:00");
        assert_eq!(display_date("2020/01/02"), "2020-01-02 00:00:00");
    }

    #[test]
    fn test_display_date_passes_unknown_text_through() {
        assert_eq!(display_date(" before Aug-1996 "), "before Aug-1996");
    }
}
