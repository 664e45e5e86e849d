use std::collections::BTreeMap;

use serde::Serialize;

use crate::wrap_mode::WrapPair;

/// Material name to declared (wrapS, wrapT). Read-only once built; iterates
/// in material name order.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct WrapModeTable {
    entries: BTreeMap<String, WrapPair>,
}

impl WrapModeTable {
    /// Builds a table from (material, pair) entries. A repeated material name
    /// takes the last pair given for it.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, WrapPair)>,
        S: Into<String>,
    {
        let mut table = BTreeMap::new();
        for (name, pair) in entries {
            table.insert(name.into(), pair);
        }
        Self { entries: table }
    }

    pub fn get(&self, material: &str) -> Option<WrapPair> {
        self.entries.get(material).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, WrapPair)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrap_mode::WrapMode;

    #[test]
    fn last_entry_wins() {
        let table = WrapModeTable::from_entries([
            ("Rock", WrapPair::new(WrapMode::Clamp, WrapMode::Clamp)),
            ("Grass", WrapPair::default()),
            ("Rock", WrapPair::new(WrapMode::Mirror, WrapMode::Repeat)),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get("Rock"),
            Some(WrapPair::new(WrapMode::Mirror, WrapMode::Repeat))
        );
        assert_eq!(table.get("Sand"), None);
        let names: Vec<_> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Grass", "Rock"]);
    }

    #[test]
    fn serializes_as_object() {
        let table = WrapModeTable::from_entries([(
            "Rock",
            WrapPair::new(WrapMode::Mirror, WrapMode::Border),
        )]);
        assert_eq!(
            serde_json::to_value(&table).unwrap(),
            serde_json::json!({ "Rock": { "s": "MIRROR", "t": "BORDER" } })
        );
    }
}
