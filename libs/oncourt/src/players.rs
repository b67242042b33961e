//! Feed-name → OnCourt id maps.
//!
//! The upstream feed spells player names its own way, so each tour ships a
//! hand-maintained translation file under the players directory: `atp.txt`
//! and `wta.txt`, one `name|id` pair per line, `#` opening a comment line.

use std::fs;
use std::path::Path;

use mbet_feed::Category;
use tracing::{debug, warn};

use crate::Result;

/// One tour's map, sorted by name for binary search.
pub struct PlayersMap {
    entries: Vec<(String, i32)>,
}

impl PlayersMap {
    pub fn load(path: &Path) -> Result<PlayersMap> {
        let text = fs::read_to_string(path)?;
        let mut entries = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, id)) = line.split_once('|') else {
                warn!(line, "players map line without a separator");
                continue;
            };
            let Ok(id) = id.trim().parse::<i32>() else {
                warn!(line, "players map line with a malformed id");
                continue;
            };
            entries.push((name.trim().to_string(), id));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        debug!(path = %path.display(), count = entries.len(), "players map loaded");
        Ok(PlayersMap { entries })
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<i32> {
        self.entries
            .binary_search_by(|(entry, _)| entry.as_str().cmp(name))
            .ok()
            .map(|idx| self.entries[idx].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Both tour maps with the lookup order the resolver uses: ATP first, then
/// WTA; a hit fixes the player's category.
pub struct PlayersDirectory {
    atp: PlayersMap,
    wta: PlayersMap,
}

impl PlayersDirectory {
    /// Loads `atp.txt` and `wta.txt` from the configured directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<PlayersDirectory> {
        let dir = dir.as_ref();
        Ok(PlayersDirectory {
            atp: PlayersMap::load(&dir.join("atp.txt"))?,
            wta: PlayersMap::load(&dir.join("wta.txt"))?,
        })
    }

    pub fn lookup(&self, name: &str) -> Option<(i32, Category)> {
        if let Some(id) = self.atp.get(name) {
            return Some((id, Category::ATP));
        }
        self.wta.get(name).map(|id| (id, Category::WTA))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_maps(dir: &Path, atp: &str, wta: &str) {
        fs::write(dir.join("atp.txt"), atp).unwrap();
        fs::write(dir.join("wta.txt"), wta).unwrap();
    }

    #[test]
    fn looks_up_atp_before_wta() {
        let dir = tempfile::tempdir().unwrap();
        write_maps(dir.path(), "Эрлер Д.|35081\n", "Эрлер Д.|90001\n");
        let maps = PlayersDirectory::load(dir.path()).unwrap();
        assert_eq!(maps.lookup("Эрлер Д."), Some((35081, Category::ATP)));
    }

    #[test]
    fn falls_back_to_wta() {
        let dir = tempfile::tempdir().unwrap();
        write_maps(dir.path(), "Джокович Н.|677\n", "Соболенко А.|12331\n");
        let maps = PlayersDirectory::load(dir.path()).unwrap();
        assert_eq!(maps.lookup("Соболенко А."), Some((12331, Category::WTA)));
        assert_eq!(maps.lookup("Джокович Н."), Some((677, Category::ATP)));
    }

    #[test]
    fn unknown_name_misses() {
        let dir = tempfile::tempdir().unwrap();
        write_maps(dir.path(), "Джокович Н.|677\n", "");
        let maps = PlayersDirectory::load(dir.path()).unwrap();
        assert_eq!(maps.lookup("Надаль Р."), None);
    }

    #[test]
    fn skips_comments_blanks_and_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let atp = "# translation map\n\nДжокович Н.|677\nno separator here\nБублик А.|not a number\n";
        write_maps(dir.path(), atp, "");
        let maps = PlayersDirectory::load(dir.path()).unwrap();
        assert_eq!(maps.atp.len(), 1);
        assert_eq!(maps.lookup("Джокович Н."), Some((677, Category::ATP)));
    }

    #[test]
    fn trims_names_around_the_separator() {
        let dir = tempfile::tempdir().unwrap();
        write_maps(dir.path(), "  Надаль Р.  | 4789 \n", "");
        let maps = PlayersDirectory::load(dir.path()).unwrap();
        assert_eq!(maps.lookup("Надаль Р."), Some((4789, Category::ATP)));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("atp.txt"), "Джокович Н.|677\n").unwrap();
        assert!(PlayersDirectory::load(dir.path()).is_err());
    }
}
