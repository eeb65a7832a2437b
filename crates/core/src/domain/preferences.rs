use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const CHOICES: [(RiskLevel, &'static str); 3] = [
        (RiskLevel::Low, "Low Risk"),
        (RiskLevel::Medium, "Medium Risk"),
        (RiskLevel::High, "High Risk"),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::CHOICES
            .iter()
            .map(|(v, _)| *v)
            .find(|v| v.as_str() == s.trim())
    }

    /// Inclusive beta band a security must fall into for this risk level.
    pub fn beta_band(self) -> (f64, f64) {
        match self {
            RiskLevel::Low => (f64::NEG_INFINITY, 1.1),
            RiskLevel::Medium => (0.7, 1.4),
            RiskLevel::High => (0.9, f64::INFINITY),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Tech,
    Healthcare,
    Finance,
    Energy,
    Consumer,
    RealEstate,
    Utilities,
}

impl Sector {
    pub const ALL: [Sector; 7] = [
        Sector::Tech,
        Sector::Healthcare,
        Sector::Finance,
        Sector::Energy,
        Sector::Consumer,
        Sector::RealEstate,
        Sector::Utilities,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Sector::Tech => "tech",
            Sector::Healthcare => "healthcare",
            Sector::Finance => "finance",
            Sector::Energy => "energy",
            Sector::Consumer => "consumer",
            Sector::RealEstate => "real_estate",
            Sector::Utilities => "utilities",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sector::Tech => "Technology",
            Sector::Healthcare => "Healthcare",
            Sector::Finance => "Financial",
            Sector::Energy => "Energy",
            Sector::Consumer => "Consumer Goods",
            Sector::RealEstate => "Real Estate",
            Sector::Utilities => "Utilities",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|v| v.slug() == s)
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DividendPriority {
    #[serde(rename = "0")]
    NotImportant,
    #[serde(rename = "1")]
    Somewhat,
    #[serde(rename = "2")]
    Very,
}

impl DividendPriority {
    pub const CHOICES: [(DividendPriority, &'static str); 3] = [
        (DividendPriority::NotImportant, "Not Important"),
        (DividendPriority::Somewhat, "Somewhat Important"),
        (DividendPriority::Very, "Very Important"),
    ];

    pub fn code(self) -> &'static str {
        match self {
            DividendPriority::NotImportant => "0",
            DividendPriority::Somewhat => "1",
            DividendPriority::Very => "2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::CHOICES
            .iter()
            .map(|(v, _)| *v)
            .find(|v| v.code() == s.trim())
    }

    /// Minimum dividend yield (percent) a security needs to pass screening.
    pub fn min_yield(self) -> Option<f64> {
        match self {
            DividendPriority::NotImportant => None,
            DividendPriority::Somewhat => Some(0.3),
            DividendPriority::Very => Some(1.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EthicalConsideration {
    Esg,
    Green,
    Social,
    Governance,
}

impl EthicalConsideration {
    pub const CHOICES: [(EthicalConsideration, &'static str); 4] = [
        (EthicalConsideration::Esg, "ESG Focused"),
        (EthicalConsideration::Green, "Green Energy"),
        (EthicalConsideration::Social, "Social Impact"),
        (EthicalConsideration::Governance, "Good Governance"),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EthicalConsideration::Esg => "esg",
            EthicalConsideration::Green => "green",
            EthicalConsideration::Social => "social",
            EthicalConsideration::Governance => "governance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::CHOICES
            .iter()
            .map(|(v, _)| *v)
            .find(|v| v.as_str() == s.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentType {
    Stocks,
    Etf,
    MutualFunds,
    Bonds,
}

impl InvestmentType {
    pub const CHOICES: [(InvestmentType, &'static str); 4] = [
        (InvestmentType::Stocks, "Individual Stocks"),
        (InvestmentType::Etf, "ETFs"),
        (InvestmentType::MutualFunds, "Mutual Funds"),
        (InvestmentType::Bonds, "Bonds"),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InvestmentType::Stocks => "stocks",
            InvestmentType::Etf => "etf",
            InvestmentType::MutualFunds => "mutual_funds",
            InvestmentType::Bonds => "bonds",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::CHOICES
            .iter()
            .map(|(v, _)| *v)
            .find(|v| v.as_str() == s.trim())
    }
}

/// Validated investment profile kept in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentPreferences {
    pub risk_level: RiskLevel,
    pub desired_return: f64,
    pub duration: u32,
    pub sectors: Vec<Sector>,
    pub budget: f64,
    pub dividend_priority: DividendPriority,
    pub ethical_considerations: Vec<EthicalConsideration>,
    pub investment_types: Vec<InvestmentType>,
}

impl InvestmentPreferences {
    /// Preferred investment types, `stocks` when none were selected.
    pub fn effective_investment_types(&self) -> Vec<InvestmentType> {
        if self.investment_types.is_empty() {
            vec![InvestmentType::Stocks]
        } else {
            self.investment_types.clone()
        }
    }

    pub fn wants(&self, ty: InvestmentType) -> bool {
        self.effective_investment_types().contains(&ty)
    }
}

/// Raw investment profile form as submitted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvestmentForm {
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub desired_return: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub dividend_priority: Option<String>,
    #[serde(default)]
    pub ethical_considerations: Vec<String>,
    #[serde(default)]
    pub investment_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub label: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.message)
    }
}

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Not a valid choice.";

impl InvestmentForm {
    pub fn validate(&self) -> Result<InvestmentPreferences, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut err = |field: &'static str, label: &'static str, message: String| {
            errors.push(FieldError {
                field,
                label,
                message,
            })
        };

        let risk_level = match non_empty(&self.risk_level) {
            None => {
                err("risk_level", "Risk Level", REQUIRED.to_string());
                None
            }
            Some(s) => {
                let parsed = RiskLevel::parse(s);
                if parsed.is_none() {
                    err("risk_level", "Risk Level", INVALID_CHOICE.to_string());
                }
                parsed
            }
        };

        let desired_return = match parse_number::<f64>(&self.desired_return) {
            Err(message) => {
                err("desired_return", "Desired Annual Return (%)", message);
                None
            }
            Ok(v) if !(0.0..=100.0).contains(&v) => {
                err(
                    "desired_return",
                    "Desired Annual Return (%)",
                    "Number must be between 0 and 100.".to_string(),
                );
                None
            }
            Ok(v) => Some(v),
        };

        let duration = match parse_number::<u32>(&self.duration) {
            Err(message) => {
                err("duration", "Investment Duration (Years)", message);
                None
            }
            Ok(v) if !(1..=30).contains(&v) => {
                err(
                    "duration",
                    "Investment Duration (Years)",
                    "Number must be between 1 and 30.".to_string(),
                );
                None
            }
            Ok(v) => Some(v),
        };

        let budget = match parse_number::<f64>(&self.budget) {
            Err(message) => {
                err("budget", "Investment Budget ($)", message);
                None
            }
            Ok(v) if !v.is_finite() || v < 1000.0 => {
                err(
                    "budget",
                    "Investment Budget ($)",
                    "Number must be at least 1000.".to_string(),
                );
                None
            }
            Ok(v) => Some(v),
        };

        let dividend_priority = match non_empty(&self.dividend_priority).and_then(DividendPriority::parse) {
            Some(p) => Some(p),
            None => {
                err("dividend_priority", "Dividend Priority", INVALID_CHOICE.to_string());
                None
            }
        };

        let sectors = parse_multi(&self.sectors, Sector::from_slug);
        if sectors.is_none() {
            err("sectors", "Preferred Sectors", INVALID_CHOICE.to_string());
        }

        let ethical_considerations =
            parse_multi(&self.ethical_considerations, EthicalConsideration::parse);
        if ethical_considerations.is_none() {
            err(
                "ethical_considerations",
                "Ethical Considerations",
                INVALID_CHOICE.to_string(),
            );
        }

        let investment_types = parse_multi(&self.investment_types, InvestmentType::parse);
        if investment_types.is_none() {
            err("investment_types", "Investment Types", INVALID_CHOICE.to_string());
        }

        match (
            risk_level,
            desired_return,
            duration,
            sectors,
            budget,
            dividend_priority,
            ethical_considerations,
            investment_types,
        ) {
            (
                Some(risk_level),
                Some(desired_return),
                Some(duration),
                Some(sectors),
                Some(budget),
                Some(dividend_priority),
                Some(ethical_considerations),
                Some(mut investment_types),
            ) if errors.is_empty() => {
                if investment_types.is_empty() {
                    investment_types.push(InvestmentType::Stocks);
                }
                Ok(InvestmentPreferences {
                    risk_level,
                    desired_return,
                    duration,
                    sectors,
                    budget,
                    dividend_priority,
                    ethical_considerations,
                    investment_types,
                })
            }
            _ => Err(errors),
        }
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_number<T: std::str::FromStr>(v: &Option<String>) -> Result<T, String> {
    let s = non_empty(v).ok_or_else(|| REQUIRED.to_string())?;
    s.parse::<T>()
        .map_err(|_| "Not a valid number.".to_string())
}

/// Parses a multi-select field, keeping first-seen order and dropping duplicates.
/// `None` when any submitted value is not a known choice.
fn parse_multi<T: PartialEq>(values: &[String], parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    let mut out = Vec::with_capacity(values.len());
    for v in values {
        let parsed = parse(v)?;
        if !out.contains(&parsed) {
            out.push(parsed);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> InvestmentForm {
        InvestmentForm {
            risk_level: Some("medium".to_string()),
            desired_return: Some("8".to_string()),
            duration: Some("10".to_string()),
            sectors: vec!["tech".to_string(), "healthcare".to_string()],
            budget: Some("5000".to_string()),
            dividend_priority: Some("1".to_string()),
            ethical_considerations: vec!["esg".to_string()],
            investment_types: vec![],
        }
    }

    #[test]
    fn valid_form_defaults_investment_types_to_stocks() {
        let prefs = valid_form().validate().unwrap();
        assert_eq!(prefs.risk_level, RiskLevel::Medium);
        assert_eq!(prefs.sectors, vec![Sector::Tech, Sector::Healthcare]);
        assert_eq!(prefs.investment_types, vec![InvestmentType::Stocks]);
        assert_eq!(prefs.dividend_priority, DividendPriority::Somewhat);
    }

    #[test]
    fn out_of_range_numbers_are_reported_per_field() {
        let mut form = valid_form();
        form.desired_return = Some("150".to_string());
        form.duration = Some("0".to_string());
        form.budget = Some("999".to_string());

        let errors = form.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["desired_return", "duration", "budget"]);
        assert_eq!(
            errors[2].to_string(),
            "Investment Budget ($): Number must be at least 1000."
        );
    }

    #[test]
    fn missing_and_unknown_choices_are_rejected() {
        let mut form = valid_form();
        form.risk_level = None;
        form.sectors = vec!["crypto".to_string()];

        let errors = form.validate().unwrap_err();
        assert_eq!(errors[0].to_string(), "Risk Level: This field is required.");
        assert!(errors.iter().any(|e| e.field == "sectors"));
    }

    #[test]
    fn serializes_with_form_codes() {
        let prefs = valid_form().validate().unwrap();
        let v = serde_json::to_value(&prefs).unwrap();
        assert_eq!(v["risk_level"], "medium");
        assert_eq!(v["dividend_priority"], "1");
        assert_eq!(v["sectors"][1], "healthcare");
        assert_eq!(v["investment_types"][0], "stocks");
    }
}
