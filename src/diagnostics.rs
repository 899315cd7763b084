//! Offline views of what the client would send upstream.

use std::fmt;

use serde::Serialize;

use crate::registry::DataType;
use crate::request::{DocumentType, ProcessType, RequestContext, TimeRange};

/// One upstream call a request would make.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewEntry {
    /// Cross-border fallback variant, for flow previews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<&'static str>,
    pub params: RequestContext,
    /// Full URL with the token masked.
    pub url: String,
}

/// Parameters a request would use, without touching the network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestPreview {
    pub data_type: DataType,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_country: Option<String>,
    pub window: TimeRange,
    pub requests: Vec<PreviewEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl fmt::Display for RequestPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--- preview {} {}", self.data_type, self.country)?;
        if let Some(to) = &self.to_country {
            write!(f, " -> {to}")?;
        }
        writeln!(f, " ---")?;
        writeln!(f, "Window: {} UTC", self.window)?;
        for note in &self.notes {
            writeln!(f, "Note:   {note}")?;
        }
        for entry in &self.requests {
            if let Some(variant) = entry.variant {
                write!(f, "[{variant}] ")?;
            }
            writeln!(f, "{}", entry.url)?;
        }
        Ok(())
    }
}

/// An upstream code and its meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodeEntry {
    pub code: &'static str,
    pub description: &'static str,
}

/// Static facts about the client and the upstream catalogue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiInfo {
    pub base_url: String,
    pub token_configured: bool,
    pub data_types: Vec<DataType>,
    pub document_types: Vec<CodeEntry>,
    pub process_types: Vec<CodeEntry>,
    pub countries: Vec<&'static str>,
}

impl ApiInfo {
    pub(crate) fn document_catalogue() -> Vec<CodeEntry> {
        DocumentType::ALL
            .iter()
            .map(|d| CodeEntry {
                code: d.code(),
                description: d.description(),
            })
            .collect()
    }

    pub(crate) fn process_catalogue() -> Vec<CodeEntry> {
        ProcessType::ALL
            .iter()
            .map(|p| CodeEntry {
                code: p.code(),
                description: p.description(),
            })
            .collect()
    }
}

impl fmt::Display for ApiInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- ENTSO-E Transparency Platform ---")?;
        writeln!(f, "Endpoint:   {}", self.base_url)?;
        writeln!(
            f,
            "Token:      {}",
            if self.token_configured { "configured" } else { "missing" }
        )?;
        writeln!(f, "Countries:  {}", self.countries.join(" "))?;
        writeln!(f, "Documents:")?;
        for d in &self.document_types {
            writeln!(f, "  {}  {}", d.code, d.description)?;
        }
        writeln!(f, "Processes:")?;
        for p in &self.process_types {
            writeln!(f, "  {}  {}", p.code, p.description)?;
        }
        write!(f, "Data types: ")?;
        let names: Vec<&str> = self.data_types.iter().map(|t| t.as_str()).collect();
        write!(f, "{}", names.join(", "))
    }
}
