//! Threat pattern classification for command text.
//!
//! A fixed, ordered list of regular expressions grouped by [`ThreatCategory`].
//! Classification stops at the first matching rule, so results are
//! deterministic for a given input.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Threat categories, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    /// `eval`, `exec`, `Function(`, dynamic `import`/`require`.
    CodeExecution,
    /// `process.`, `window.`, `document.`, `__dirname`.
    HostAccess,
    /// `fetch(`, `XMLHttpRequest`, `http(s):`, `ws(s):`.
    Network,
    /// `DELETE FROM`, `DROP TABLE`, `UNION SELECT`.
    Database,
    /// `../`, `/etc/`, `~/`.
    Filesystem,
    /// `bash`, `powershell`, `spawn(`.
    Shell,
    /// Hex and unicode escapes, `btoa`/`atob`.
    Encoding,
    /// `javascript:`, `data:`, `vbscript:`.
    ProtocolHandler,
    /// `.env`, `SECRET`, `API_KEY`.
    Secrets,
    /// `<script>`, inline `on*=` handlers, `<iframe>`.
    Markup,
}

impl ThreatCategory {
    /// All categories in evaluation order.
    pub const ALL: [Self; 10] = [
        Self::CodeExecution,
        Self::HostAccess,
        Self::Network,
        Self::Database,
        Self::Filesystem,
        Self::Shell,
        Self::Encoding,
        Self::ProtocolHandler,
        Self::Secrets,
        Self::Markup,
    ];

    /// Stable snake_case name used in audit reasons and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CodeExecution => "code_execution",
            Self::HostAccess => "host_access",
            Self::Network => "network",
            Self::Database => "database",
            Self::Filesystem => "filesystem",
            Self::Shell => "shell",
            Self::Encoding => "encoding",
            Self::ProtocolHandler => "protocol_handler",
            Self::Secrets => "secrets",
            Self::Markup => "markup",
        }
    }
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    /// Whether any rule matched.
    pub matched: bool,
    /// Category of the first matching rule.
    pub category: Option<ThreatCategory>,
}

impl PatternMatch {
    const fn clean() -> Self {
        Self {
            matched: false,
            category: None,
        }
    }

    const fn hit(category: ThreatCategory) -> Self {
        Self {
            matched: true,
            category: Some(category),
        }
    }
}

const RULE_SOURCES: &[(ThreatCategory, &str)] = &[
    (ThreatCategory::CodeExecution, r"(?i)\beval\s*\("),
    (ThreatCategory::CodeExecution, r"(?i)\bexec\s*\("),
    (ThreatCategory::CodeExecution, r"\bFunction\s*\("),
    (ThreatCategory::CodeExecution, r"(?i)\bimport\s*\("),
    (ThreatCategory::CodeExecution, r"(?i)\brequire\s*\("),
    (ThreatCategory::HostAccess, r"(?i)\bprocess\.\w"),
    (ThreatCategory::HostAccess, r"(?i)\bwindow\.\w"),
    (ThreatCategory::HostAccess, r"(?i)\bdocument\.\w"),
    (ThreatCategory::HostAccess, r"__dirname"),
    (ThreatCategory::Network, r"(?i)\bfetch\s*\("),
    (ThreatCategory::Network, r"(?i)XMLHttpRequest"),
    (ThreatCategory::Network, r"(?i)\bhttps?:"),
    (ThreatCategory::Network, r"(?i)\bwss?:"),
    (ThreatCategory::Database, r"(?i)\bDELETE\s+FROM\b"),
    (ThreatCategory::Database, r"(?i)\bDROP\s+TABLE\b"),
    (ThreatCategory::Database, r"(?i)\bUNION\s+(?:ALL\s+)?SELECT\b"),
    (ThreatCategory::Filesystem, r"\.\./"),
    (ThreatCategory::Filesystem, r"\.\.\\"),
    (ThreatCategory::Filesystem, r"/etc/"),
    (ThreatCategory::Filesystem, r"~/"),
    (ThreatCategory::Shell, r"(?i)\bbash\b"),
    (ThreatCategory::Shell, r"(?i)\bpowershell\b"),
    (ThreatCategory::Shell, r"(?i)\bspawn\s*\("),
    (ThreatCategory::Encoding, r"(?i)\\x[0-9a-f]{2}"),
    (ThreatCategory::Encoding, r"(?i)\\u[0-9a-f]{4}"),
    (ThreatCategory::Encoding, r"(?i)\b(?:btoa|atob)\b"),
    (ThreatCategory::ProtocolHandler, r"(?i)\bjavascript\s*:"),
    (ThreatCategory::ProtocolHandler, r"(?i)\bdata\s*:"),
    (ThreatCategory::ProtocolHandler, r"(?i)\bvbscript\s*:"),
    (ThreatCategory::Secrets, r"(?i)\.env\b"),
    (ThreatCategory::Secrets, r"SECRET"),
    (ThreatCategory::Secrets, r"(?i)\bAPI_KEY\b"),
    (ThreatCategory::Markup, r"(?i)<\s*script"),
    (ThreatCategory::Markup, r"(?i)\bon\w+\s*="),
    (ThreatCategory::Markup, r"(?i)<\s*iframe"),
];

// Sources are literals exercised by the tests below.
#[allow(clippy::expect_used)]
static RULES: LazyLock<Vec<(ThreatCategory, Regex)>> = LazyLock::new(|| {
    RULE_SOURCES
        .iter()
        .map(|(category, source)| (*category, Regex::new(source).expect("valid threat pattern")))
        .collect()
});

/// Ordered, categorized threat detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternClassifier;

impl PatternClassifier {
    /// Create a classifier over the built-in rule list.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Classify `text`, stopping at the first matching rule.
    #[must_use]
    pub fn classify(&self, text: &str) -> PatternMatch {
        RULES
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map_or_else(PatternMatch::clean, |(category, _)| {
                PatternMatch::hit(*category)
            })
    }

    /// Number of rules in the list.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        RULES.len()
    }

    /// Category names in evaluation order.
    #[must_use]
    pub fn categories(&self) -> Vec<&'static str> {
        ThreatCategory::ALL.iter().map(|c| c.as_str()).collect()
    }
}
