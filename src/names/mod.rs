// Item id <-> localized display name

use std::path::Path;

use crate::Result;

/// Display names for item ids, kept in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameMap {
    entries: Vec<(String, String)>,
}

impl NameMap {
    /// Load a JSON object of `{ "item id": "display name" }`
    ///
    /// Entries whose value is not a string are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)?;

        let mut entries = Vec::with_capacity(map.len());
        for (id, value) in map {
            match value.as_str() {
                Some(name) => entries.push((id, name.to_string())),
                None => tracing::warn!("Skipping name map entry {} (not a string)", id),
            }
        }

        tracing::info!("Loaded {} item names from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display name for an id, the id itself when unmapped
    pub fn display_name<'a>(&'a self, item_id: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(id, _)| id == item_id)
            .map(|(_, name)| name.as_str())
            .unwrap_or(item_id)
    }

    /// Turn user input into an item id
    ///
    /// First id whose display name matches exactly; otherwise the input is
    /// taken to already be an id.
    pub fn resolve_item_id(&self, input: &str) -> String {
        let input = input.trim();
        self.entries
            .iter()
            .find(|(_, name)| name == input)
            .map(|(id, _)| id.clone())
            .unwrap_or_else(|| input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> NameMap {
        NameMap::from_entries([("Milk", "牛奶"), ("Iron Bar", "铁锭"), ("Iron Ore", "铁锭")])
    }

    #[test]
    fn test_display_name() {
        let map = names();
        assert_eq!(map.display_name("Milk"), "牛奶");
        assert_eq!(map.display_name("Unknown"), "Unknown");
    }

    #[test]
    fn test_reverse_lookup_first_match() {
        let map = names();
        assert_eq!(map.resolve_item_id("铁锭"), "Iron Bar");
        assert_eq!(map.resolve_item_id(" 牛奶 "), "Milk");
    }

    #[test]
    fn test_reverse_lookup_falls_back_to_input() {
        assert_eq!(names().resolve_item_id("Cheese"), "Cheese");
    }

    #[test]
    fn test_load_keeps_file_order() {
        let dir = std::env::temp_dir().join(format!("mwimarket-names-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("names.json");
        std::fs::write(&path, r#"{"b": "same", "a": "same", "c": 3}"#).unwrap();

        let map = NameMap::load(&path).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.resolve_item_id("same"), "b");

        std::fs::remove_dir_all(&dir).ok();
    }
}
