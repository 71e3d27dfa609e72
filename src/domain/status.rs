use serde::{Deserialize, Serialize};
use std::fmt;

/// How citizenship did or did not pass along one link of the chain.
///
/// Produced by rule effects and by fact derivation for individual links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransmissionStatus {
    /// Nothing interrupted transmission
    #[default]
    Intact,
    /// Parent naturalized abroad before the child was born
    BrokenNaturalization,
    /// Pre-1948 maternal line, recognisable only in court
    #[serde(rename = "COURT_ONLY_1948")]
    CourtOnly1948,
    /// Parent naturalized while the child was a minor
    BlockedAdminMinorIssue,
    /// Disputed fact pattern that needs specialist review
    ContestedEdgeCase,
    /// Born after the reform date without an exemption
    BlockedReformNoExemption,
    /// Residence-based acquisition is available instead
    AlternativePath,
    /// No Italian-born person anywhere in the chain
    NoItalianLineageAnchor,
}

impl TransmissionStatus {
    /// Parse the exact wire name; case and surrounding whitespace matter.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "INTACT" => Some(TransmissionStatus::Intact),
            "BROKEN_NATURALIZATION" => Some(TransmissionStatus::BrokenNaturalization),
            "COURT_ONLY_1948" => Some(TransmissionStatus::CourtOnly1948),
            "BLOCKED_ADMIN_MINOR_ISSUE" => Some(TransmissionStatus::BlockedAdminMinorIssue),
            "CONTESTED_EDGE_CASE" => Some(TransmissionStatus::ContestedEdgeCase),
            "BLOCKED_REFORM_NO_EXEMPTION" => Some(TransmissionStatus::BlockedReformNoExemption),
            "ALTERNATIVE_PATH" => Some(TransmissionStatus::AlternativePath),
            "NO_ITALIAN_LINEAGE_ANCHOR" => Some(TransmissionStatus::NoItalianLineageAnchor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransmissionStatus::Intact => "INTACT",
            TransmissionStatus::BrokenNaturalization => "BROKEN_NATURALIZATION",
            TransmissionStatus::CourtOnly1948 => "COURT_ONLY_1948",
            TransmissionStatus::BlockedAdminMinorIssue => "BLOCKED_ADMIN_MINOR_ISSUE",
            TransmissionStatus::ContestedEdgeCase => "CONTESTED_EDGE_CASE",
            TransmissionStatus::BlockedReformNoExemption => "BLOCKED_REFORM_NO_EXEMPTION",
            TransmissionStatus::AlternativePath => "ALTERNATIVE_PATH",
            TransmissionStatus::NoItalianLineageAnchor => "NO_ITALIAN_LINEAGE_ANCHOR",
        }
    }

    /// Overall verdict this status maps to, if it has an entry in the
    /// aggregation table. Statuses without an entry leave the verdict alone.
    pub fn overall(&self) -> Option<OverallStatus> {
        match self {
            TransmissionStatus::BlockedReformNoExemption => {
                Some(OverallStatus::BlockedReformNoExemption)
            }
            TransmissionStatus::BlockedAdminMinorIssue => Some(OverallStatus::BlockedAdminMinorIssue),
            TransmissionStatus::CourtOnly1948 => Some(OverallStatus::CourtOnly1948),
            TransmissionStatus::AlternativePath => Some(OverallStatus::PotentialViaResidence),
            TransmissionStatus::ContestedEdgeCase | TransmissionStatus::BrokenNaturalization => {
                Some(OverallStatus::IndeterminateComplexCase)
            }
            TransmissionStatus::NoItalianLineageAnchor => {
                Some(OverallStatus::NotEligibleNoItalianLineage)
            }
            TransmissionStatus::Intact => None,
        }
    }

    /// Returns true if this status makes a court case viable.
    #[inline]
    pub fn opens_court_path(&self) -> bool {
        matches!(
            self,
            TransmissionStatus::CourtOnly1948
                | TransmissionStatus::BlockedAdminMinorIssue
                | TransmissionStatus::ContestedEdgeCase
        )
    }
}

impl fmt::Display for TransmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregated eligibility verdict for the whole chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    #[default]
    ClearAdminEligible,
    #[serde(rename = "COURT_ONLY_1948")]
    CourtOnly1948,
    BlockedAdminMinorIssue,
    BlockedReformNoExemption,
    PotentialViaResidence,
    IndeterminateComplexCase,
    NotEligibleNoItalianLineage,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::ClearAdminEligible => "CLEAR_ADMIN_ELIGIBLE",
            OverallStatus::CourtOnly1948 => "COURT_ONLY_1948",
            OverallStatus::BlockedAdminMinorIssue => "BLOCKED_ADMIN_MINOR_ISSUE",
            OverallStatus::BlockedReformNoExemption => "BLOCKED_REFORM_NO_EXEMPTION",
            OverallStatus::PotentialViaResidence => "POTENTIAL_VIA_RESIDENCE",
            OverallStatus::IndeterminateComplexCase => "INDETERMINATE_COMPLEX_CASE",
            OverallStatus::NotEligibleNoItalianLineage => "NOT_ELIGIBLE_NO_ITALIAN_LINEAGE",
        }
    }

    /// All verdicts, in declaration order.
    pub const ALL: [OverallStatus; 7] = [
        OverallStatus::ClearAdminEligible,
        OverallStatus::CourtOnly1948,
        OverallStatus::BlockedAdminMinorIssue,
        OverallStatus::BlockedReformNoExemption,
        OverallStatus::PotentialViaResidence,
        OverallStatus::IndeterminateComplexCase,
        OverallStatus::NotEligibleNoItalianLineage,
    ];
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence in a verdict, ordered from most to least certain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl Confidence {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "HIGH" => Some(Confidence::High),
            "MEDIUM" => Some(Confidence::Medium),
            "LOW" => Some(Confidence::Low),
            _ => None,
        }
    }

    /// Fold another outcome's confidence into the running value.
    ///
    /// Only ever lowers: LOW overrides anything, MEDIUM lowers HIGH.
    #[inline]
    pub fn downgrade(self, other: Self) -> Self {
        match (self, other) {
            (_, Confidence::Low) => Confidence::Low,
            (Confidence::High, Confidence::Medium) => Confidence::Medium,
            (current, _) => current,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "HIGH"),
            Confidence::Medium => write!(f, "MEDIUM"),
            Confidence::Low => write!(f, "LOW"),
        }
    }
}

/// Likelihood that a court case would succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourtViability {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for CourtViability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourtViability::None => write!(f, "NONE"),
            CourtViability::Low => write!(f, "LOW"),
            CourtViability::Medium => write!(f, "MEDIUM"),
            CourtViability::High => write!(f, "HIGH"),
        }
    }
}

/// Legal mechanism through which the applicant would hold citizenship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcquisitionMode {
    #[default]
    AutomaticByBlood,
    NotAutomaticPostReform,
    BenefitOfLaw,
    ByResidence,
    Unknown,
}

impl AcquisitionMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "AUTOMATIC_BY_BLOOD" => Some(AcquisitionMode::AutomaticByBlood),
            "NOT_AUTOMATIC_POST_REFORM" => Some(AcquisitionMode::NotAutomaticPostReform),
            "BENEFIT_OF_LAW" => Some(AcquisitionMode::BenefitOfLaw),
            "BY_RESIDENCE" => Some(AcquisitionMode::ByResidence),
            "UNKNOWN" => Some(AcquisitionMode::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionMode::AutomaticByBlood => write!(f, "AUTOMATIC_BY_BLOOD"),
            AcquisitionMode::NotAutomaticPostReform => write!(f, "NOT_AUTOMATIC_POST_REFORM"),
            AcquisitionMode::BenefitOfLaw => write!(f, "BENEFIT_OF_LAW"),
            AcquisitionMode::ByResidence => write!(f, "BY_RESIDENCE"),
            AcquisitionMode::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
