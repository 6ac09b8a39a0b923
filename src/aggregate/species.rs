//! Species id → display name table, loaded once at startup

use std::collections::HashMap;
use std::path::Path;

#[derive(Debug)]
pub enum SpeciesError {
    Io(std::io::Error),
    Parse(String),
}

impl From<std::io::Error> for SpeciesError {
    fn from(err: std::io::Error) -> Self {
        SpeciesError::Io(err)
    }
}

impl From<serde_json::Error> for SpeciesError {
    fn from(err: serde_json::Error) -> Self {
        SpeciesError::Parse(err.to_string())
    }
}

impl std::fmt::Display for SpeciesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeciesError::Io(e) => write!(f, "IO error: {}", e),
            SpeciesError::Parse(msg) => write!(f, "Invalid species table: {}", msg),
        }
    }
}

impl std::error::Error for SpeciesError {}

#[derive(Debug, Clone, Default)]
pub struct SpeciesNames {
    names: HashMap<u32, String>,
}

impl SpeciesNames {
    /// Load a JSON object of the form `{"1": "Bulbasaur", ...}`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SpeciesError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let table: HashMap<String, String> = serde_json::from_str(&raw)?;

        let mut names = HashMap::with_capacity(table.len());
        for (key, name) in table {
            let id = key
                .trim()
                .parse::<u32>()
                .map_err(|_| SpeciesError::Parse(format!("non-numeric species id '{}'", key)))?;
            names.insert(id, name);
        }

        log::info!("Loaded {} species names from {}", names.len(), path.as_ref().display());
        Ok(Self { names })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            names: pairs.into_iter().map(|(id, name)| (id, name.into())).collect(),
        }
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Name for display; unknown ids render as `#<id>`
    pub fn display_name(&self, id: u32) -> String {
        match self.get(id) {
            Some(name) => name.to_string(),
            None => {
                log::warn!("⚠️  No species name for id {}", id);
                format!("#{}", id)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"1": "Bulbasaur", "16": "Pidgey"}}"#).unwrap();

        let names = SpeciesNames::load(file.path()).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names.get(16), Some("Pidgey"));
        assert_eq!(names.display_name(1), "Bulbasaur");
    }

    #[test]
    fn test_unknown_id_falls_back() {
        let names = SpeciesNames::from_pairs([(1, "Bulbasaur")]);
        assert_eq!(names.display_name(999), "#999");
    }

    #[test]
    fn test_bad_table_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"one": "Bulbasaur"}}"#).unwrap();
        assert!(matches!(
            SpeciesNames::load(file.path()),
            Err(SpeciesError::Parse(_))
        ));

        assert!(matches!(
            SpeciesNames::load("/nonexistent/pokenames.json"),
            Err(SpeciesError::Io(_))
        ));
    }
}
