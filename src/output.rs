use crate::{
    errors::WhoisError,
    record::{WhoisRecord, FIELDNAMES},
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Writes each record to `<output_folder>/<sanitized domain>.csv`.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    output_folder: PathBuf,
}

impl ResultWriter {
    pub fn new(output_folder: impl Into<PathBuf>) -> Self {
        Self {
            output_folder: output_folder.into(),
        }
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    pub fn path_for(&self, domain: &str) -> PathBuf {
        self.output_folder.join(format!("{}.csv", sanitize_file_stem(domain)))
    }

    /// Create the output folder if needed and write the record, replacing any
    /// earlier file for the same domain.
    pub fn save(&self, record: &WhoisRecord) -> Result<PathBuf, WhoisError> {
        let path = self.path_for(&record.domain);

        fs::create_dir_all(&self.output_folder).map_err(|source| WhoisError::Output {
            path: self.output_folder.clone(),
            source,
        })?;

        fs::write(&path, render_csv(record)).map_err(|source| WhoisError::Output {
            path: path.clone(),
            source,
        })?;

        debug!("Saved {} to {}", record.domain, path.display());
        Ok(path)
    }
}

/// File-system friendly stem: dots become underscores, and so does anything
/// that is not portable in a file name.
pub fn sanitize_file_stem(domain: &str) -> String {
    let stem: String = domain
        .trim()
        .chars()
        .map(|c| match c {
            '.' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect();

    if stem.is_empty() {
        "_".to_string()
    } else {
        stem
    }
}

/// Header row plus one data row, CRLF line endings.
pub fn render_csv(record: &WhoisRecord) -> String {
    let mut out = String::new();
    push_row(&mut out, FIELDNAMES.iter().copied());
    push_row(&mut out, record.values().into_iter());
    out
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field));
    }
    out.push_str("\r\n");
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
