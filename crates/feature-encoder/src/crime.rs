//! Borough Crime-Rate Table
//!
//! Offences per 1,000 population, keyed by borough name exactly as the
//! source dataset spells it. Keys are matched byte-for-byte: the table
//! carries `"Ealing "` with a trailing space and a `"Sutton"` entry no
//! form offers. Both are kept as-is; `audit` reports them.

use serde::Serialize;

/// Static crime-rate entries, reproduced verbatim
pub const LONDON_CRIME_RATES: &[(&str, f64)] = &[
    ("Barking and Dagenham", 115.58),
    ("Barnet", 89.86),
    ("Bexley", 86.95),
    ("Brent", 117.59),
    ("Bromley", 88.26),
    ("Camden", 108.07),
    ("City of London", 28.93),
    ("Croydon", 111.91),
    ("Ealing ", 103.37),
    ("Enfield", 104.58),
    ("Greenwich", 121.4),
    ("Hackney", 140.13),
    ("Hammersmith and Fulham", 103.14),
    ("Haringey", 133.11),
    ("Harrow", 79.15),
    ("Havering", 99.07),
    ("Hillingdon", 95.3),
    ("Hounslow", 102.7),
    ("Islington", 114.9),
    ("Kensington and Chelsea", 118.02),
    ("Kingston upon Thames", 75.43),
    ("Lambeth", 137.98),
    ("Lewisham", 134.35),
    ("Merton", 82.49),
    ("Newham", 142.35),
    ("Redbridge", 101.74),
    ("Richmond upon Thames", 71.78),
    ("Southwark", 116.55),
    ("Sutton", 79.67),
    ("Tower Hamlets", 98.6),
    ("Waltham Forest", 112.25),
    ("Wandsworth", 106.6),
    ("Westminster", 132.94),
];

/// Exact-key crime-rate lookup
#[derive(Debug, Clone, Copy)]
pub struct CrimeRateTable {
    entries: &'static [(&'static str, f64)],
}

impl CrimeRateTable {
    /// The embedded London table
    pub const fn london() -> Self {
        Self {
            entries: LONDON_CRIME_RATES,
        }
    }

    /// Rate for an exact key; no trimming, no case folding
    pub fn lookup(&self, borough: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| *key == borough)
            .map(|(_, rate)| *rate)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compare the table's keys against a list of selectable boroughs
    pub fn audit(&self, boroughs: &[&str]) -> TableAudit {
        let unmatched = boroughs
            .iter()
            .filter(|b| self.lookup(b).is_none())
            .map(|b| b.to_string())
            .collect();

        let unreachable = self
            .entries
            .iter()
            .filter(|(key, _)| !boroughs.contains(key))
            .map(|(key, _)| key.to_string())
            .collect();

        TableAudit {
            unmatched,
            unreachable,
        }
    }
}

/// Key inconsistencies between the table and a borough list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableAudit {
    /// Selectable boroughs with no exact table key
    pub unmatched: Vec<String>,
    /// Table keys no selectable borough reaches
    pub unreachable: Vec<String>,
}

impl TableAudit {
    pub fn is_clean(&self) -> bool {
        self.unmatched.is_empty() && self.unreachable.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LONDON_BOROUGHS;

    #[test]
    fn test_table_size() {
        assert_eq!(CrimeRateTable::london().len(), 33);
    }

    #[test]
    fn test_exact_lookup() {
        let table = CrimeRateTable::london();
        assert_eq!(table.lookup("Camden"), Some(108.07));
        assert_eq!(table.lookup("Kensington and Chelsea"), Some(118.02));
        assert_eq!(table.lookup("Ealing "), Some(103.37));
        assert_eq!(table.lookup("Ealing"), None);
        assert_eq!(table.lookup("camden"), None);
        assert_eq!(table.lookup("Kensington_and_Chelsea"), None);
    }

    #[test]
    fn test_audit_flags_known_inconsistencies() {
        let audit = CrimeRateTable::london().audit(LONDON_BOROUGHS);
        assert_eq!(audit.unmatched, vec!["Ealing".to_string()]);
        assert_eq!(
            audit.unreachable,
            vec!["Ealing ".to_string(), "Sutton".to_string()]
        );
        assert!(!audit.is_clean());
    }
}
