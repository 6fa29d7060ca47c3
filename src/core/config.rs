//! Configuration for a grouping run

use crate::bio::fragment::NUCLEOTIDES;
use crate::bio::sites::{DEFAULT_SITE1, DEFAULT_SITE2, DEFAULT_SITE3};
use crate::FragGroupError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub sites: SiteConfig,
    #[serde(default)]
    pub padding: PaddingConfig,
    #[serde(default)]
    pub io: IoConfig,
}

/// Diagonal value of the similarity matrix.
///
/// `Auto` uses the median off-diagonal similarity. Lower values give fewer,
/// larger clusters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "PreferenceValue", into = "PreferenceValue")]
pub enum Preference {
    #[default]
    Auto,
    Fixed(f64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PreferenceValue {
    Number(f64),
    Keyword(String),
}

impl TryFrom<PreferenceValue> for Preference {
    type Error = String;

    fn try_from(value: PreferenceValue) -> Result<Self, Self::Error> {
        match value {
            PreferenceValue::Number(v) => Ok(Preference::Fixed(v)),
            PreferenceValue::Keyword(s) => s.parse(),
        }
    }
}

impl From<Preference> for PreferenceValue {
    fn from(preference: Preference) -> Self {
        match preference {
            Preference::Auto => PreferenceValue::Keyword("auto".to_string()),
            Preference::Fixed(v) => PreferenceValue::Number(v),
        }
    }
}

impl FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Preference::Auto);
        }
        s.parse::<f64>()
            .map(Preference::Fixed)
            .map_err(|_| format!("Invalid preference '{}': expected \"auto\" or a number", s))
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preference::Auto => write!(f, "auto"),
            Preference::Fixed(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusteringConfig {
    #[serde(default)]
    pub preference: Preference,
    #[serde(default = "default_damping")]
    pub damping: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_convergence_window")]
    pub convergence_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupingConfig {
    /// Pair up leftover single-fragment groups
    #[serde(default)]
    pub aggressive: bool,
    #[serde(default = "default_max_group_size")]
    pub max_group_size: usize,
    /// Upper bound on the summed fragment length of one group
    #[serde(default)]
    pub max_group_length: Option<usize>,
    /// Fragments at least this long skip clustering and get their own group
    #[serde(default)]
    pub standalone_length: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
    #[serde(default = "default_site1")]
    pub site1: String,
    #[serde(default = "default_site2")]
    pub site2: String,
    #[serde(default = "default_site3")]
    pub site3: String,
    /// Also substitute reverse-complement occurrences of `site1`
    #[serde(default = "default_reverse_complement")]
    pub reverse_complement: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PaddingConfig {
    /// Assembled sequences shorter than this are padded up to it
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IoConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

// Default value functions
fn default_damping() -> f64 { 0.75 }
fn default_max_iterations() -> usize { 200 }
fn default_convergence_window() -> usize { 15 }
fn default_max_group_size() -> usize { 3 }
fn default_site1() -> String { DEFAULT_SITE1.to_string() }
fn default_site2() -> String { DEFAULT_SITE2.to_string() }
fn default_site3() -> String { DEFAULT_SITE3.to_string() }
fn default_reverse_complement() -> bool { true }
fn default_delimiter() -> char { ';' }

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            preference: Preference::Auto,
            damping: default_damping(),
            max_iterations: default_max_iterations(),
            convergence_window: default_convergence_window(),
        }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            aggressive: false,
            max_group_size: default_max_group_size(),
            max_group_length: None,
            standalone_length: None,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site1: default_site1(),
            site2: default_site2(),
            site3: default_site3(),
            reverse_complement: default_reverse_complement(),
        }
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

impl Config {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), FragGroupError> {
        let invalid = |msg: String| Err(FragGroupError::Configuration(msg));
        let clustering = &self.clustering;

        if !(clustering.damping > 0.0 && clustering.damping < 1.0) {
            return invalid(format!(
                "damping must be in (0, 1), got {}",
                clustering.damping
            ));
        }
        if clustering.max_iterations == 0 {
            return invalid("max_iterations must be at least 1".to_string());
        }
        if clustering.convergence_window == 0 {
            return invalid("convergence_window must be at least 1".to_string());
        }
        if clustering.convergence_window > clustering.max_iterations {
            return invalid(format!(
                "convergence_window ({}) cannot exceed max_iterations ({})",
                clustering.convergence_window, clustering.max_iterations
            ));
        }
        if let Preference::Fixed(p) = clustering.preference {
            if !p.is_finite() {
                return invalid(format!("preference must be finite, got {}", p));
            }
        }

        let grouping = &self.grouping;
        if !(1..=3).contains(&grouping.max_group_size) {
            return invalid(format!(
                "max_group_size must be between 1 and 3, got {}",
                grouping.max_group_size
            ));
        }
        if grouping.max_group_length == Some(0) {
            return invalid("max_group_length must be positive".to_string());
        }
        if grouping.standalone_length == Some(0) {
            return invalid("standalone_length must be positive".to_string());
        }

        let sites = [
            ("site1", &self.sites.site1),
            ("site2", &self.sites.site2),
            ("site3", &self.sites.site3),
        ];
        for (label, site) in sites {
            if site.is_empty() {
                return invalid(format!("{} must not be empty", label));
            }
            if let Some(c) = site
                .bytes()
                .find(|b| !NUCLEOTIDES.contains(&b.to_ascii_uppercase()))
            {
                return invalid(format!(
                    "{} contains non-nucleotide character '{}'",
                    label, c as char
                ));
            }
        }
        let upper: Vec<String> = sites.iter().map(|(_, s)| s.to_ascii_uppercase()).collect();
        if upper[0] == upper[1] || upper[0] == upper[2] || upper[1] == upper[2] {
            return invalid("site1, site2 and site3 must be distinct".to_string());
        }

        if self.padding.min_length == Some(0) {
            return invalid("padding min_length must be positive".to_string());
        }

        if !self.io.delimiter.is_ascii() || self.io.delimiter.is_ascii_alphanumeric() {
            return invalid(format!(
                "delimiter must be an ASCII punctuation or whitespace character, got '{}'",
                self.io.delimiter
            ));
        }

        Ok(())
    }

    /// Delimiter as the byte the CSV reader/writer expects.
    pub fn delimiter_byte(&self) -> u8 {
        self.io.delimiter as u8
    }

    pub fn to_toml_string(&self) -> Result<String, FragGroupError> {
        toml::to_string_pretty(self)
            .map_err(|e| FragGroupError::Serialization(format!("Failed to serialize config: {}", e)))
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, FragGroupError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| FragGroupError::Configuration(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), FragGroupError> {
    std::fs::write(path, config.to_toml_string()?)?;
    Ok(())
}
