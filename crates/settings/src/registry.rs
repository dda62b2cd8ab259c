use core_types::DictCode;

/// One entry of the built-in dictionary catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub code: &'static str,
    pub label: &'static str,
    pub category: &'static str,
}

const fn entry(code: &'static str, label: &'static str, category: &'static str) -> DictionaryEntry {
    DictionaryEntry {
        code,
        label,
        category,
    }
}

const SA_EN: &str = "SA -> EN";
const SA_FR: &str = "SA -> FR";
const SA_SA: &str = "SA -> SA";
const SA_DE: &str = "SA -> DE";
const EN_SA: &str = "EN -> SA";
const SA_LA: &str = "SA -> LA";

static DICTIONARIES: [DictionaryEntry; 36] = [
    entry("ap90", "Apte Practical Sanskrit-English Dictionary - 1890", SA_EN),
    entry("acc", "Aufrecht's Catalogus Catalogorum - 1962", SA_EN),
    entry("ben", "Benfey Sanskrit-English Dictionary - 1866", SA_EN),
    entry("cae", "Cappeller Sanskrit-English Dictionary - 1891", SA_EN),
    entry("bhs", "Edgerton Buddhist Hybrid Sanskrit Dictionary - 1953", SA_EN),
    entry("gst", "Goldstücker Sanskrit-English Dictionary - 1856", SA_EN),
    entry("inm", "Index to the Names in the Mahabharata - 1904", SA_EN),
    entry("ieg", "Indian Epigraphical Glossary - 1966", SA_EN),
    entry("lan", "Lanman's Sanskrit Reader Vocabulary - 1884", SA_EN),
    entry("md", "Macdonell Sanskrit-English Dictionary - 1893", SA_EN),
    entry("mci", "Mahabharata Cultural Index - 1993", SA_EN),
    entry("mw72", "Monier-Williams Sanskrit-English Dictionary - 1872", SA_EN),
    entry("mw", "Monier-Williams Sanskrit-English Dictionary - 1899", SA_EN),
    entry(
        "pgn",
        "Personal and Geographical Names in the Gupta Inscriptions - 1978",
        SA_EN,
    ),
    entry("pe", "Puranic Encyclopedia - 1975", SA_EN),
    entry("shs", "Shabda-Sagara Sanskrit-English Dictionary - 1900", SA_EN),
    entry("pui", "The Purana Index - 1951", SA_EN),
    entry("vei", "The Vedic Index of Names and Subjects - 1912", SA_EN),
    entry("wil", "Wilson Sanskrit-English Dictionary - 1832", SA_EN),
    entry("yat", "Yates Sanskrit-English Dictionary - 1846", SA_EN),
    entry("bur", "Burnouf Dictionnaire Sanscrit-Français - 1866", SA_FR),
    entry("stc", "Stchoupak Dictionnaire Sanscrit-Français - 1932", SA_FR),
    entry("armh", "Abhidhānaratnamālā of Halāyudha - 1861", SA_SA),
    entry("krm", "Kṛdantarūpamālā - 1965", SA_SA),
    entry("skd", "Sabda-kalpadruma - 1886", SA_SA),
    entry("vcp", "Vacaspatyam", SA_SA),
    entry("pw", "Böhtlingk Sanskrit-Wörterbuch in kürzerer Fassung - 1879", SA_DE),
    entry("pwg", "Böhtlingk and Roth Grosses Petersburger Wörterbuch - 1855", SA_DE),
    entry("ccs", "Cappeller Sanskrit Wörterbuch - 1887", SA_DE),
    entry("gra", "Grassmann Wörterbuch zum Rig Veda", SA_DE),
    entry("sch", "Schmidt Nachträge zum Sanskrit-Wörterbuch - 1928", SA_DE),
    entry("ae", "Apte Student's English-Sanskrit Dictionary - 1920", EN_SA),
    entry("bor", "Borooah English-Sanskrit Dictionary - 1877", EN_SA),
    entry("mwe", "Monier-Williams English-Sanskrit Dictionary - 1851", EN_SA),
    entry("bop", "Bopp Glossarium Sanscritum - 1847", SA_LA),
    entry("snp", "Meulenbeld's Sanskrit Names of Plants - 1974", SA_LA),
];

/// Label terms that mark a dictionary as preselected by default.
const PRESELECT_TERMS: [&str; 2] = ["dictionary", "wörterbuch"];

/// Read-only dictionary catalog in display order.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    entries: &'static [DictionaryEntry],
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    pub fn builtin() -> Self {
        Self {
            entries: &DICTIONARIES,
        }
    }

    pub fn entries(&self) -> &'static [DictionaryEntry] {
        self.entries
    }

    pub fn get(&self, code: &DictCode) -> Option<&'static DictionaryEntry> {
        self.entries.iter().find(|e| e.code == code.as_str())
    }

    pub fn codes(&self) -> Vec<DictCode> {
        self.entries
            .iter()
            .filter_map(|e| DictCode::parse(e.code))
            .collect()
    }

    /// Categories in first-appearance order, each with its entries.
    pub fn categories(&self) -> Vec<(&'static str, Vec<&'static DictionaryEntry>)> {
        let mut out: Vec<(&'static str, Vec<&'static DictionaryEntry>)> = Vec::new();
        for e in self.entries {
            match out.iter_mut().find(|(name, _)| *name == e.category) {
                Some((_, list)) => list.push(e),
                None => out.push((e.category, vec![e])),
            }
        }
        out
    }

    /// Codes whose label names a dictionary ("dictionary"/"wörterbuch", any case).
    pub fn default_preselection(&self) -> Vec<DictCode> {
        self.entries
            .iter()
            .filter(|e| {
                let label = e.label.to_lowercase();
                PRESELECT_TERMS.iter().any(|term| label.contains(term))
            })
            .filter_map(|e| DictCode::parse(e.code))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_codes_are_unique_and_normalized() {
        let registry = Registry::builtin();
        let codes = registry.codes();
        assert_eq!(codes.len(), 36);
        let unique: HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
        for (code, entry) in codes.iter().zip(registry.entries()) {
            assert_eq!(code.as_str(), entry.code);
        }
    }

    #[test]
    fn categories_keep_catalog_order() {
        let names: Vec<_> = Registry::builtin()
            .categories()
            .into_iter()
            .map(|(name, list)| (name, list.len()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("SA -> EN", 20),
                ("SA -> FR", 2),
                ("SA -> SA", 4),
                ("SA -> DE", 5),
                ("EN -> SA", 3),
                ("SA -> LA", 2),
            ]
        );
    }

    #[test]
    fn default_preselection_matches_dictionary_labels() {
        let pre = Registry::builtin().default_preselection();
        let codes: Vec<&str> = pre.iter().map(DictCode::as_str).collect();
        assert!(codes.contains(&"mw"));
        assert!(codes.contains(&"ap90"));
        assert!(codes.contains(&"pw"));
        assert!(codes.contains(&"gra"));
        assert!(!codes.contains(&"acc"));
        assert!(!codes.contains(&"vcp"));
        assert!(!codes.contains(&"bop"));
    }
}
