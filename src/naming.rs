//! Node identity and label helpers
//!
//! Node identifiers are load-bearing: two records that should collapse into
//! one node on the graph must produce byte-identical identifiers, so every
//! formula lives here next to the grouping mode that selects it.

use std::fmt;

use serde::Serialize;

use crate::record::CouplingRecord;

/// Replace the characters that are significant in HTML with entities.
pub fn escape_html(unsafe_text: &str) -> String {
    let mut escaped = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Simple name of a fully qualified Java class.
///
/// The returned slice starts at the last `.` and keeps it, so
/// `com.expedia.jarviz.Hello` becomes `.Hello`. Names without a package are
/// returned unchanged, as is an absent name.
pub fn simple_class_name(class_name: Option<&str>) -> Option<&str> {
    let name = class_name?;
    match name.rfind('.') {
        Some(idx) => Some(&name[idx..]),
        None => Some(name),
    }
}

/// How records are clustered into nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GroupBy {
    /// One node per source artifact, one per application/target method.
    #[serde(rename = "sourceClass")]
    SourceClass,
    /// Source artifacts are split per target class they call into.
    #[serde(rename = "sourceClass-targetClass")]
    SourceAndTargetClass,
}

impl GroupBy {
    pub const ALL: [GroupBy; 2] = [GroupBy::SourceClass, GroupBy::SourceAndTargetClass];

    /// Key used for this projection in the exported data
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::SourceClass => "sourceClass",
            GroupBy::SourceAndTargetClass => "sourceClass-targetClass",
        }
    }

    /// Identifier of the node standing for the calling side of `record`.
    ///
    /// `names` must already be escaped for display.
    pub fn source_node_id(&self, record: &CouplingRecord, names: &DisplayNames) -> String {
        match self {
            GroupBy::SourceClass => {
                format!("{}_{}", record.artifact_group, record.artifact_id)
            }
            GroupBy::SourceAndTargetClass => format!(
                "{}_{}_{}",
                names.target_class, record.artifact_group, record.artifact_id
            ),
        }
    }

    /// Identifier of the node standing for the called side of `record`.
    pub fn target_node_id(&self, record: &CouplingRecord, names: &DisplayNames) -> String {
        match self {
            GroupBy::SourceClass => format!(
                "{}_{}_{}",
                record.application_name, names.target_class, names.target_method
            ),
            GroupBy::SourceAndTargetClass => {
                format!("{}_{}", names.target_class, names.target_method)
            }
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class and method names of a record, escaped for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNames {
    pub source_class: String,
    pub source_method: String,
    pub target_class: String,
    pub target_method: String,
}

impl DisplayNames {
    pub fn from_record(record: &CouplingRecord) -> Self {
        Self {
            source_class: escape_html(&record.source_class),
            source_method: escape_html(&record.source_method),
            target_class: escape_html(&record.target_class),
            target_method: escape_html(&record.target_method),
        }
    }

    /// `Class#method` usage entry for the source node
    pub fn source_usage(&self) -> String {
        format!("{}#{}", self.source_class, self.source_method)
    }

    /// `Class#method` usage entry for the target node
    pub fn target_usage(&self) -> String {
        format!("{}#{}", self.target_class, self.target_method)
    }
}
