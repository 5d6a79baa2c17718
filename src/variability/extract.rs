//! Pharmacokinetic parameter mining from article text
//!
//! Scans titles and abstracts for reported CVintra, Cmax, AUC, Tmax and
//! half-life values using ordered regular expression lists. This is a
//! heuristic: patterns are tried in order and the first plausible match in
//! each article is taken.
//!
//! CVintra is averaged over every article that reports a value in the sane
//! range (5–100%). The other parameters keep the first value found across
//! all articles.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::resolver::is_sane_extracted_cv;

/// A literature record as returned by a search collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub pmid: Option<String>,
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    pub url: String,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.abstract_text).to_lowercase()
    }
}

/// A mined parameter value with its unit and provenance URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedValue {
    pub value: Option<f64>,
    pub unit: String,
    pub sources: Vec<String>,
}

impl ExtractedValue {
    fn empty(unit: &str) -> Self {
        Self {
            value: None,
            unit: unit.to_string(),
            sources: Vec::new(),
        }
    }
}

/// Parameters mined from a set of articles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PkParameters {
    pub cmax: ExtractedValue,
    pub auc: ExtractedValue,
    pub tmax: ExtractedValue,
    pub t_half: ExtractedValue,
    pub cvintra: ExtractedValue,
}

impl Default for PkParameters {
    fn default() -> Self {
        Self {
            cmax: ExtractedValue::empty("ng/mL"),
            auc: ExtractedValue::empty("ng·h/mL"),
            tmax: ExtractedValue::empty("h"),
            t_half: ExtractedValue::empty("h"),
            cvintra: ExtractedValue::empty("%"),
        }
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| Regex::new(&format!("(?i){}", p)).ok())
        .collect()
}

lazy_static! {
    static ref CV_PATTERNS: Vec<Regex> = compile(&[
        r"cv\s*intra[-\s]?subject[:\s]+(\d+\.?\d*)\s*%",
        r"intra[-\s]?subject\s+cv[:\s]+(\d+\.?\d*)\s*%",
        r"cv\s*intra[:\s]+(\d+\.?\d*)\s*%",
        r"intra[-\s]?individual\s+cv[:\s]+(\d+\.?\d*)\s*%",
        r"within[-\s]?subject\s+cv[:\s]+(\d+\.?\d*)\s*%",
        r"cv\s*intra[-\s]?subject\s*[=:]\s*(\d+\.?\d*)\s*%",
        r"intra[-\s]?subject\s+coefficient\s+of\s+variation[:\s]+(\d+\.?\d*)\s*%",
        r"cv\s*intra[:\s]*(\d+\.?\d*)\s*%",
        r"cv\s*intra[-\s]?subject[:\s]*(\d+\.?\d*)",
        r"intra[-\s]?subject\s+cv[:\s]*(\d+\.?\d*)",
    ]);
    static ref CMAX_PATTERNS: Vec<Regex> = compile(&[
        r"cmax[:\s]*(\d+\.?\d*)\s*(ng/ml|mg/l|μg/ml|mcg/ml|ng·ml[-1]|mg·l[-1])",
        r"maximum\s+concentration[:\s]*(\d+\.?\d*)\s*(ng/ml|mg/l|μg/ml|mcg/ml|ng·ml[-1]|mg·l[-1])",
        r"c\s*max[:\s]*(\d+\.?\d*)\s*(ng/ml|mg/l|μg/ml|mcg/ml)",
        r"peak\s+concentration[:\s]*(\d+\.?\d*)\s*(ng/ml|mg/l|μg/ml|mcg/ml)",
    ]);
    static ref AUC_PATTERNS: Vec<Regex> = compile(&[
        r"auc[:\s]*(\d+\.?\d*)\s*(ng·h/ml|ng\s*h/ml|mg·h/l|μg·h/ml|mcg·h/ml|ng·h·ml[-1]|mg·h·l[-1])",
        r"area\s+under\s+curve[:\s]*(\d+\.?\d*)\s*(ng·h/ml|ng\s*h/ml|mg·h/l|μg·h/ml|mcg·h/ml)",
        r"auc0[-\s]?t[:\s]*(\d+\.?\d*)\s*(ng·h/ml|ng\s*h/ml|mg·h/l)",
        r"auc0[-\s]?∞[:\s]*(\d+\.?\d*)\s*(ng·h/ml|ng\s*h/ml|mg·h/l)",
        r"auc\s*\(0[-\s]?t\)[:\s]*(\d+\.?\d*)\s*(ng·h/ml|ng\s*h/ml)",
    ]);
    static ref TMAX_PATTERNS: Vec<Regex> = compile(&[
        r"tmax[:\s]*(\d+\.?\d*)\s*(h|hours|hr|hour)",
        r"time\s+to\s+cmax[:\s]*(\d+\.?\d*)\s*(h|hours|hr|hour)",
        r"time\s+to\s+maximum\s+concentration[:\s]*(\d+\.?\d*)\s*(h|hours|hr)",
        r"t\s*max[:\s]*(\d+\.?\d*)\s*(h|hours|hr)",
    ]);
    static ref T_HALF_PATTERNS: Vec<Regex> = compile(&[
        r"t1/2[:\s]*(\d+\.?\d*)\s*(h|hours|hr|hour)",
        r"t\s*1/2[:\s]*(\d+\.?\d*)\s*(h|hours|hr)",
        r"hal[fv][-\s]?life[:\s]*(\d+\.?\d*)\s*(h|hours|hr|hour)",
        r"elimination\s+half[-\s]?life[:\s]*(\d+\.?\d*)\s*(h|hours|hr)",
        r"terminal\s+half[-\s]?life[:\s]*(\d+\.?\d*)\s*(h|hours|hr)",
        r"apparent\s+half[-\s]?life[:\s]*(\d+\.?\d*)\s*(h|hours|hr)",
    ]);
}

/// First sane CVintra reported in a piece of text
///
/// # Example
///
/// ```rust
/// use bedesign::variability::extract_cvintra;
///
/// assert_eq!(extract_cvintra("The intra-subject CV: 27.4% for Cmax"), Some(27.4));
/// assert_eq!(extract_cvintra("CV intra 2%"), None);
/// ```
pub fn extract_cvintra(text: &str) -> Option<f64> {
    CV_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|&v| is_sane_extracted_cv(v))
    })
}

/// Mine pharmacokinetic parameters from a set of articles
pub fn extract_pk_parameters(articles: &[Article]) -> PkParameters {
    let mut pk = PkParameters::default();
    let mut cv_values = Vec::new();

    for article in articles {
        let text = article.searchable_text();

        if let Some(cv) = extract_cvintra(&text) {
            cv_values.push(cv);
            pk.cvintra.sources.push(article.url.clone());
        }

        fill_first(&mut pk.cmax, &CMAX_PATTERNS, &text, &article.url, true);
        fill_first(&mut pk.auc, &AUC_PATTERNS, &text, &article.url, true);
        fill_first(&mut pk.tmax, &TMAX_PATTERNS, &text, &article.url, false);
        fill_first(&mut pk.t_half, &T_HALF_PATTERNS, &text, &article.url, false);
    }

    if !cv_values.is_empty() {
        let mean = cv_values.iter().sum::<f64>() / cv_values.len() as f64;
        pk.cvintra.value = Some((mean * 100.0).round() / 100.0);
    }

    pk
}

fn fill_first(
    target: &mut ExtractedValue,
    patterns: &[Regex],
    text: &str,
    url: &str,
    capture_unit: bool,
) {
    if target.value.is_some() {
        return;
    }
    for re in patterns {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        let Some(value) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
            continue;
        };
        target.value = Some(value);
        if capture_unit {
            if let Some(unit) = caps.get(2) {
                target.unit = unit.as_str().to_string();
            }
        }
        target.sources.push(url.to_string());
        return;
    }
}
