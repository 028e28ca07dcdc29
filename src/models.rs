//! Data models for the quality reporter.
//!
//! This module contains the core data structures shared by the analysis
//! pipeline, the claims query and the report writer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Complaint metadata entered by the user.
///
/// All fields are free-form and may be empty; nothing here blocks a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintDetails {
    /// The complaint text itself.
    pub complaint: String,
    /// Customer name.
    pub customer: String,
    /// Complaint subject.
    pub subject: String,
    /// Related part code.
    pub part_code: String,
}

/// Problem-solving method used to structure the analysis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Method {
    /// Eight Disciplines
    #[serde(rename = "8D")]
    #[value(name = "8D", alias = "8d")]
    EightD,
    /// A3 Problem Solving
    #[serde(rename = "A3")]
    #[value(name = "A3", alias = "a3")]
    A3,
    /// Ishikawa (fishbone) diagram
    #[serde(rename = "Ishikawa")]
    #[value(name = "Ishikawa", alias = "ishikawa")]
    Ishikawa,
    /// 5N1K (5W1H) questioning
    #[serde(rename = "5N1K")]
    #[value(name = "5N1K", alias = "5n1k")]
    FiveN1K,
    /// Define, Measure, Analyze, Improve, Control
    #[serde(rename = "DMAIC")]
    #[value(name = "DMAIC", alias = "dmaic")]
    Dmaic,
}

/// Static description of a method.
#[derive(Debug, Clone, Copy)]
pub struct MethodInfo {
    pub method: Method,
    pub name: &'static str,
    pub guide_text: &'static str,
}

/// Every supported method with its guide text, in menu order.
pub static METHOD_CATALOG: &[MethodInfo] = &[
    MethodInfo {
        method: Method::EightD,
        name: "8D",
        guide_text: "8D (Eight Disciplines) metodu, ürün ve süreç kaynaklı problemleri sistematik şekilde çözmek için geliştirilmiş etkili bir problem çözme tekniğidir.",
    },
    MethodInfo {
        method: Method::A3,
        name: "A3",
        guide_text: "A3 Problem Solving, problemi sistematik biçimde tanımlamak, analiz etmek ve çözüm geliştirmek için kullanılan yalın düşünce temelli bir yaklaşımdır.",
    },
    MethodInfo {
        method: Method::Ishikawa,
        name: "Ishikawa",
        guide_text: "Ishikawa (Balık Kılçığı) Diyagramı, problemin kök nedenlerini sistematik olarak analiz etmeye yarayan neden-sonuç diyagramıdır.",
    },
    MethodInfo {
        method: Method::FiveN1K,
        name: "5N1K",
        guide_text: "5N1K (5W1H) yöntemi, bir problemi tüm yönleriyle incelemek için kullanılan klasik sorgulama metodudur.",
    },
    MethodInfo {
        method: Method::Dmaic,
        name: "DMAIC",
        guide_text: "DMAIC, süreç iyileştirme için kullanılan sistematik bir problem çözme metodudur.",
    },
];

impl Method {
    /// All methods, in menu order.
    pub fn all() -> impl Iterator<Item = Method> {
        METHOD_CATALOG.iter().map(|info| info.method)
    }

    /// Catalog entry for this method.
    pub fn info(&self) -> &'static MethodInfo {
        METHOD_CATALOG
            .iter()
            .find(|info| info.method == *self)
            .unwrap_or(&METHOD_CATALOG[0])
    }

    /// Wire name, as used in `/guide/{method}`.
    pub fn as_str(&self) -> &'static str {
        self.info().name
    }

    /// Human-readable description shown next to the method picker.
    pub fn guide_text(&self) -> &'static str {
        self.info().guide_text
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        METHOD_CATALOG
            .iter()
            .find(|info| info.name.eq_ignore_ascii_case(s.trim()))
            .map(|info| info.method)
            .ok_or_else(|| format!("Unknown method: {}", s))
    }
}

/// Field with server-side autocomplete values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OptionField {
    Customer,
    Subject,
    #[value(name = "part_code", alias = "part-code")]
    PartCode,
}

impl OptionField {
    /// Path segment used in `/options/{field}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionField::Customer => "customer",
            OptionField::Subject => "subject",
            OptionField::PartCode => "part_code",
        }
    }
}

impl fmt::Display for OptionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Absolute download links for the generated report artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLinks {
    /// PDF report URL.
    pub pdf: String,
    /// Excel report URL, when the server produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excel: Option<String>,
}

/// Metadata about a completed analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Base URL of the analysis service.
    pub api_base: String,
    /// Date and time the run finished.
    pub generated_at: DateTime<Utc>,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// Everything a successful analysis run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub details: ComplaintDetails,
    pub method: Method,
    pub directives: String,
    /// Full analysis text extracted from the analyze stage.
    pub analysis_text: String,
    /// Review/critique returned by the review stage.
    pub review_text: String,
    pub links: ReportLinks,
}
