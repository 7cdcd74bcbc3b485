use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two metals this service tracks. Internal logic always works with
/// this enum; the free-form string form only exists at the wire boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetalSymbol {
    Gold,
    Silver,
}

impl MetalSymbol {
    /// Every tracked metal, in display order
    pub const ALL: [MetalSymbol; 2] = [MetalSymbol::Gold, MetalSymbol::Silver];

    /// Wire form used by the history provider ("GOLD", "SILVER")
    pub fn as_str(&self) -> &'static str {
        match self {
            MetalSymbol::Gold => "GOLD",
            MetalSymbol::Silver => "SILVER",
        }
    }

    /// Human-facing label
    pub fn label(&self) -> &'static str {
        match self {
            MetalSymbol::Gold => "Gold",
            MetalSymbol::Silver => "Silver",
        }
    }

    /// Series color the dashboard renders this metal with
    pub fn chart_color(&self) -> &'static str {
        match self {
            MetalSymbol::Gold => "#d4af37",
            MetalSymbol::Silver => "#9ea7ad",
        }
    }

    /// Cache file name for this metal's persisted series
    pub fn cache_filename(&self) -> &'static str {
        match self {
            MetalSymbol::Gold => "series_gold.json",
            MetalSymbol::Silver => "series_silver.json",
        }
    }
}

impl FromStr for MetalSymbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GOLD" => Ok(MetalSymbol::Gold),
            "SILVER" => Ok(MetalSymbol::Silver),
            _ => Err(format!("Invalid metal: {}. Valid options: GOLD, SILVER", s)),
        }
    }
}

impl fmt::Display for MetalSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("gold".parse::<MetalSymbol>().unwrap(), MetalSymbol::Gold);
        assert_eq!("SILVER".parse::<MetalSymbol>().unwrap(), MetalSymbol::Silver);
        assert!("platinum".parse::<MetalSymbol>().is_err());
    }

    #[test]
    fn serializes_to_wire_form() {
        assert_eq!(
            serde_json::to_string(&MetalSymbol::Gold).unwrap(),
            "\"GOLD\""
        );
        let parsed: MetalSymbol = serde_json::from_str("\"SILVER\"").unwrap();
        assert_eq!(parsed, MetalSymbol::Silver);
    }
}
