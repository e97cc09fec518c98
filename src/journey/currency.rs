/// Currency ledger: the three named counters shown in the header of the quest log.
use serde::{Deserialize, Serialize};

use super::reward::format_quantity;

// ============================================================================
// Reserved names and baselines (configurable under [currencies])
// ============================================================================

/// Which of the three counters a reward name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurrencyKind {
    Experience,
    Premium,
    Soft,
}

/// Reserved reward names routed to the ledger. Comparison is case-sensitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CurrencyNames {
    pub experience: String,
    pub premium: String,
    pub soft: String,
}

impl Default for CurrencyNames {
    fn default() -> Self {
        Self {
            experience: "Adventure EXP".to_string(),
            premium: "Primogems".to_string(),
            soft: "Mora".to_string(),
        }
    }
}

impl CurrencyNames {
    pub fn classify(&self, name: &str) -> Option<CurrencyKind> {
        if name == self.experience {
            Some(CurrencyKind::Experience)
        } else if name == self.premium {
            Some(CurrencyKind::Premium)
        } else if name == self.soft {
            Some(CurrencyKind::Soft)
        } else {
            None
        }
    }

    pub fn name_of(&self, kind: CurrencyKind) -> &str {
        match kind {
            CurrencyKind::Experience => &self.experience,
            CurrencyKind::Premium => &self.premium,
            CurrencyKind::Soft => &self.soft,
        }
    }
}

/// Baseline balances for new accounts and factory resets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CurrencyDefaults {
    pub adventure_exp: u64,
    pub primogems: u64,
    pub mora: u64,
}

impl Default for CurrencyDefaults {
    fn default() -> Self {
        Self {
            adventure_exp: 1250,
            primogems: 1280,
            mora: 50_000,
        }
    }
}

impl CurrencyDefaults {
    pub fn ledger(&self) -> CurrencyLedger {
        CurrencyLedger {
            adventure_exp: self.adventure_exp,
            primogems: self.primogems,
            mora: self.mora,
        }
    }
}

/// `[currencies]` configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CurrencyConfig {
    #[serde(default)]
    pub names: CurrencyNames,
    #[serde(default)]
    pub defaults: CurrencyDefaults,
}

// ============================================================================
// Ledger
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyLedger {
    pub adventure_exp: u64,
    pub primogems: u64,
    pub mora: u64,
}

/// Saved currencies as stored remotely; any counter may be absent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PartialLedger {
    #[serde(default)]
    pub adventure_exp: Option<u64>,
    #[serde(default)]
    pub primogems: Option<u64>,
    #[serde(default)]
    pub mora: Option<u64>,
}

impl CurrencyLedger {
    /// Resolve each counter independently: saved value if present, else its default.
    pub fn resolve(saved: Option<&PartialLedger>, defaults: &CurrencyDefaults) -> Self {
        let saved = saved.copied().unwrap_or_default();
        Self {
            adventure_exp: saved.adventure_exp.unwrap_or(defaults.adventure_exp),
            primogems: saved.primogems.unwrap_or(defaults.primogems),
            mora: saved.mora.unwrap_or(defaults.mora),
        }
    }

    pub fn get(&self, kind: CurrencyKind) -> u64 {
        match kind {
            CurrencyKind::Experience => self.adventure_exp,
            CurrencyKind::Premium => self.primogems,
            CurrencyKind::Soft => self.mora,
        }
    }

    /// Add to one counter, returning the new total.
    pub fn credit(&mut self, kind: CurrencyKind, quantity: u64) -> u64 {
        let slot = match kind {
            CurrencyKind::Experience => &mut self.adventure_exp,
            CurrencyKind::Premium => &mut self.primogems,
            CurrencyKind::Soft => &mut self.mora,
        };
        *slot = slot.saturating_add(quantity);
        *slot
    }

    /// Credit the counter whose reserved name equals `name`. Returns the new total, or
    /// `None` (and changes nothing) when the name is not a reserved currency.
    pub fn apply_named_delta(
        &mut self,
        names: &CurrencyNames,
        name: &str,
        quantity: u64,
    ) -> Option<u64> {
        let kind = names.classify(name)?;
        Some(self.credit(kind, quantity))
    }

    pub fn to_partial(&self) -> PartialLedger {
        PartialLedger {
            adventure_exp: Some(self.adventure_exp),
            primogems: Some(self.primogems),
            mora: Some(self.mora),
        }
    }
}

/// One-line ledger summary for the quest log header.
pub fn format_ledger(ledger: &CurrencyLedger, names: &CurrencyNames) -> String {
    format!(
        "{}: {} | {}: {} | {}: {}",
        names.experience,
        format_quantity(ledger.adventure_exp),
        names.premium,
        format_quantity(ledger.primogems),
        names.soft,
        format_quantity(ledger.mora)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_delta_routes_reserved_names() {
        let names = CurrencyNames::default();
        let mut ledger = CurrencyDefaults::default().ledger();

        assert_eq!(ledger.apply_named_delta(&names, "Primogems", 60), Some(1340));
        assert_eq!(ledger.apply_named_delta(&names, "Mora", 20_000), Some(70_000));
        assert_eq!(ledger.apply_named_delta(&names, "Adventure EXP", 500), Some(1750));
    }

    #[test]
    fn named_delta_is_case_sensitive_and_ignores_others() {
        let names = CurrencyNames::default();
        let mut ledger = CurrencyDefaults::default().ledger();
        let before = ledger;

        assert_eq!(ledger.apply_named_delta(&names, "primogems", 60), None);
        assert_eq!(ledger.apply_named_delta(&names, "Hero's Wit", 3), None);
        assert_eq!(ledger, before);
    }

    #[test]
    fn renamed_currencies_are_honored() {
        let names = CurrencyNames {
            experience: "Journey XP".to_string(),
            premium: "Starshards".to_string(),
            soft: "Coins".to_string(),
        };
        let mut ledger = CurrencyLedger::resolve(None, &CurrencyDefaults::default());
        assert_eq!(ledger.apply_named_delta(&names, "Starshards", 10), Some(1290));
        assert_eq!(ledger.apply_named_delta(&names, "Primogems", 10), None);
    }

    #[test]
    fn resolve_falls_back_per_field() {
        let defaults = CurrencyDefaults::default();
        let saved = PartialLedger {
            adventure_exp: None,
            primogems: Some(7),
            mora: None,
        };
        let ledger = CurrencyLedger::resolve(Some(&saved), &defaults);
        assert_eq!(ledger.adventure_exp, defaults.adventure_exp);
        assert_eq!(ledger.primogems, 7);
        assert_eq!(ledger.mora, defaults.mora);
    }

    #[test]
    fn credit_saturates() {
        let mut ledger = CurrencyLedger {
            adventure_exp: u64::MAX - 1,
            primogems: 0,
            mora: 0,
        };
        assert_eq!(ledger.credit(CurrencyKind::Experience, 10), u64::MAX);
    }

    #[test]
    fn ledger_wire_shape() {
        let ledger = CurrencyDefaults::default().ledger();
        let json = serde_json::to_value(ledger).unwrap();
        assert_eq!(json["adventureExp"], 1250);
        assert_eq!(json["primogems"], 1280);
        assert_eq!(json["mora"], 50_000);

        let partial: PartialLedger = serde_json::from_str(r#"{"mora": 5}"#).unwrap();
        assert_eq!(partial.mora, Some(5));
        assert_eq!(partial.primogems, None);
    }

    #[test]
    fn formats_ledger_line() {
        let line = format_ledger(&CurrencyDefaults::default().ledger(), &CurrencyNames::default());
        assert_eq!(line, "Adventure EXP: 1,250 | Primogems: 1,280 | Mora: 50,000");
    }
}
