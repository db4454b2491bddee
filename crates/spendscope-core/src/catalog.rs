//! Category catalog - display metadata for categories and subcategories
//!
//! The catalog is loaded once at startup, either from the built-in table or
//! from a YAML file, and is read-only afterwards. Lookups never fail: ids
//! that are not in the catalog resolve to the configured fallback entry.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use spendscope_config::CatalogConfig;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Id of the built-in "Other" category
pub const OTHER_CATEGORY_KEY: &str = "other";

/// Bucket key for transactions without a category; never a catalog id
pub const UNCATEGORIZED_KEY: &str = "__uncategorized";

/// Bucket key for transactions without a subcategory
pub const UNKNOWN_SUBCATEGORY_KEY: &str = "unknown";

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").expect("valid hex color pattern")
});

/// Check a `#RGB`, `#RRGGBB` or `#RRGGBBAA` color
pub fn is_hex_color(color: &str) -> bool {
    HEX_COLOR.is_match(color)
}

/// Apply an alpha channel to a hex color, producing `#RRGGBBAA`
///
/// Colors that are not valid hex are returned unchanged.
pub fn apply_alpha(color: &str, alpha: f64) -> String {
    if !is_hex_color(color) {
        return color.to_string();
    }
    let digits = &color[1..];
    let rgb = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
        _ => digits[..6].to_string(),
    };
    let alpha_byte = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{}{:02X}", rgb.to_uppercase(), alpha_byte)
}

/// Catalog entry for a category or subcategory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_localized: Option<String>,
    pub color: String,
    pub icon_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<CatalogEntry>,
}

impl CatalogEntry {
    fn new(id: &str, name: &str, color: &str, icon_name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            name_localized: None,
            color: color.to_string(),
            icon_name: icon_name.to_string(),
            subcategories: Vec::new(),
        }
    }

    fn with_subcategories(mut self, subcategories: Vec<CatalogEntry>) -> Self {
        self.subcategories = subcategories;
        self
    }

    /// Localized name when available, otherwise the plain name
    pub fn display_name(&self) -> &str {
        self.name_localized
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.name)
    }

    /// Look up a subcategory by id
    pub fn subcategory(&self, id: &str) -> Option<&CatalogEntry> {
        self.subcategories.iter().find(|s| s.id == id)
    }
}

/// Result of a catalog lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CatalogMatch<'a> {
    /// The id is in the catalog
    Known(&'a CatalogEntry),
    /// The id is missing or unknown; the fallback entry applies
    Fallback(&'a CatalogEntry),
}

impl<'a> CatalogMatch<'a> {
    /// The entry to display
    pub fn entry(&self) -> &'a CatalogEntry {
        match self {
            CatalogMatch::Known(entry) | CatalogMatch::Fallback(entry) => entry,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, CatalogMatch::Known(_))
    }
}

/// Categories shipped with the built-in catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownCategory {
    Food,
    Shopping,
    Transport,
    Housing,
    Bills,
    Entertainment,
    Health,
    Travel,
    Education,
    Salary,
    Transfers,
    Other,
}

impl KnownCategory {
    /// Every built-in category in display order
    pub const ALL: [KnownCategory; 12] = [
        KnownCategory::Food,
        KnownCategory::Shopping,
        KnownCategory::Transport,
        KnownCategory::Housing,
        KnownCategory::Bills,
        KnownCategory::Entertainment,
        KnownCategory::Health,
        KnownCategory::Travel,
        KnownCategory::Education,
        KnownCategory::Salary,
        KnownCategory::Transfers,
        KnownCategory::Other,
    ];

    /// Catalog id
    pub fn id(&self) -> &'static str {
        match self {
            KnownCategory::Food => "food",
            KnownCategory::Shopping => "shopping",
            KnownCategory::Transport => "transport",
            KnownCategory::Housing => "housing",
            KnownCategory::Bills => "bills",
            KnownCategory::Entertainment => "entertainment",
            KnownCategory::Health => "health",
            KnownCategory::Travel => "travel",
            KnownCategory::Education => "education",
            KnownCategory::Salary => "salary",
            KnownCategory::Transfers => "transfers",
            KnownCategory::Other => OTHER_CATEGORY_KEY,
        }
    }

    fn entry(&self) -> CatalogEntry {
        let sub = |id: &str, name: &str, color: &str, icon: &str| CatalogEntry::new(id, name, color, icon);
        match self {
            KnownCategory::Food => CatalogEntry::new("food", "Food & Drink", "#FF7043", "utensils")
                .with_subcategories(vec![
                    sub("restaurant", "Restaurants", "#F4511E", "chef-hat"),
                    sub("groceries", "Groceries", "#FF8A65", "shopping-basket"),
                    sub("coffee", "Coffee", "#8D6E63", "coffee"),
                    sub("delivery", "Delivery", "#FFAB91", "bike"),
                ]),
            KnownCategory::Shopping => CatalogEntry::new("shopping", "Shopping", "#AB47BC", "shopping-bag")
                .with_subcategories(vec![
                    sub("clothing", "Clothing", "#8E24AA", "shirt"),
                    sub("electronics", "Electronics", "#BA68C8", "smartphone"),
                    sub("home", "Home", "#CE93D8", "sofa"),
                ]),
            KnownCategory::Transport => CatalogEntry::new("transport", "Transport", "#42A5F5", "car")
                .with_subcategories(vec![
                    sub("fuel", "Fuel", "#1E88E5", "fuel"),
                    sub("public_transport", "Public transport", "#64B5F6", "train"),
                    sub("taxi", "Taxi", "#90CAF9", "car-taxi-front"),
                    sub("parking", "Parking", "#BBDEFB", "square-parking"),
                ]),
            KnownCategory::Housing => CatalogEntry::new("housing", "Housing", "#26A69A", "home")
                .with_subcategories(vec![
                    sub("rent", "Rent", "#00897B", "key"),
                    sub("utilities", "Utilities", "#4DB6AC", "plug"),
                    sub("maintenance", "Maintenance", "#80CBC4", "wrench"),
                ]),
            KnownCategory::Bills => CatalogEntry::new("bills", "Bills", "#FFCA28", "receipt")
                .with_subcategories(vec![
                    sub("phone", "Phone", "#FFB300", "phone"),
                    sub("internet", "Internet", "#FFD54F", "wifi"),
                    sub("insurance", "Insurance", "#FFE082", "shield"),
                    sub("subscriptions", "Subscriptions", "#FFECB3", "repeat"),
                ]),
            KnownCategory::Entertainment => CatalogEntry::new("entertainment", "Entertainment", "#EC407A", "ticket")
                .with_subcategories(vec![
                    sub("streaming", "Streaming", "#D81B60", "tv"),
                    sub("events", "Events", "#F06292", "party-popper"),
                    sub("games", "Games", "#F48FB1", "gamepad"),
                ]),
            KnownCategory::Health => CatalogEntry::new("health", "Health", "#66BB6A", "heart-pulse")
                .with_subcategories(vec![
                    sub("pharmacy", "Pharmacy", "#43A047", "pill"),
                    sub("doctor", "Doctor", "#81C784", "stethoscope"),
                    sub("fitness", "Fitness", "#A5D6A7", "dumbbell"),
                ]),
            KnownCategory::Travel => CatalogEntry::new("travel", "Travel", "#5C6BC0", "plane")
                .with_subcategories(vec![
                    sub("flights", "Flights", "#3949AB", "plane-takeoff"),
                    sub("lodging", "Lodging", "#7986CB", "bed"),
                ]),
            KnownCategory::Education => CatalogEntry::new("education", "Education", "#8D6E63", "graduation-cap"),
            KnownCategory::Salary => CatalogEntry::new("salary", "Salary", "#2E7D32", "briefcase")
                .with_subcategories(vec![
                    sub("payroll", "Payroll", "#1B5E20", "banknote"),
                    sub("bonus", "Bonus", "#4CAF50", "gift"),
                ]),
            KnownCategory::Transfers => CatalogEntry::new("transfers", "Transfers", "#78909C", "arrow-left-right")
                .with_subcategories(vec![
                    sub("incoming", "Incoming", "#546E7A", "arrow-down-left"),
                    sub("outgoing", "Outgoing", "#90A4AE", "arrow-up-right"),
                ]),
            KnownCategory::Other => CatalogEntry::new(OTHER_CATEGORY_KEY, "Other", "#BDBDBD", "circle-ellipsis"),
        }
    }
}

impl std::str::FromStr for KnownCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownCategory::ALL
            .iter()
            .copied()
            .find(|c| c.id() == s)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for KnownCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    categories: Vec<CatalogEntry>,
}

/// Read-only lookup table of category display metadata
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    fallback: CatalogEntry,
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::builtin(&CatalogConfig::default())
    }
}

impl CategoryCatalog {
    /// Catalog built from the shipped category table
    pub fn builtin(config: &CatalogConfig) -> Self {
        let entries = KnownCategory::ALL.iter().map(KnownCategory::entry).collect();
        Self::from_entries(entries, config)
    }

    /// Load the catalog named in config, or the built-in one
    pub fn load(config: &CatalogConfig) -> CoreResult<Self> {
        match &config.path {
            Some(path) => Self::from_file(path, config),
            None => Ok(Self::builtin(config)),
        }
    }

    /// Load a YAML catalog file
    pub fn from_file(path: &Path, config: &CatalogConfig) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml(&content, config)?;
        log::info!(
            "Loaded {} categories from {}",
            catalog.entries.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a YAML catalog
    pub fn from_yaml(content: &str, config: &CatalogConfig) -> CoreResult<Self> {
        let file: CatalogFile = serde_yaml::from_str(content).map_err(|e| CoreError::Catalog {
            message: e.to_string(),
        })?;

        let mut seen = std::collections::HashSet::new();
        for entry in &file.categories {
            if !seen.insert(entry.id.as_str()) {
                return Err(CoreError::Catalog {
                    message: format!("Duplicate category id '{}'", entry.id),
                });
            }
            validate_entry(entry)?;
            for sub in &entry.subcategories {
                validate_entry(sub)?;
                if !sub.subcategories.is_empty() {
                    return Err(CoreError::Catalog {
                        message: format!("Subcategory '{}' must not have children", sub.id),
                    });
                }
            }
        }

        Ok(Self::from_entries(file.categories, config))
    }

    fn from_entries(entries: Vec<CatalogEntry>, config: &CatalogConfig) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        let color = if is_hex_color(&config.fallback_color) {
            config.fallback_color.clone()
        } else {
            log::warn!("Invalid fallback color '{}', using gray", config.fallback_color);
            "#9E9E9E".to_string()
        };
        let fallback = CatalogEntry {
            id: UNCATEGORIZED_KEY.to_string(),
            name: config.uncategorized_label.clone(),
            name_localized: None,
            color,
            icon_name: config.fallback_icon.clone(),
            subcategories: Vec::new(),
        };
        Self { entries, index, fallback }
    }

    /// All categories in catalog order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entry used for unknown ids
    pub fn fallback(&self) -> &CatalogEntry {
        &self.fallback
    }

    /// Look up a category entry by id
    pub fn category(&self, id: &str) -> Option<&CatalogEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    /// Look up a built-in category
    pub fn known(&self, category: KnownCategory) -> Option<&CatalogEntry> {
        self.category(category.id())
    }

    /// Resolve display metadata for a category id
    pub fn resolve_category(&self, id: Option<&str>) -> CatalogMatch<'_> {
        match id.and_then(|id| self.category(id)) {
            Some(entry) => CatalogMatch::Known(entry),
            None => CatalogMatch::Fallback(&self.fallback),
        }
    }

    /// Resolve display metadata for a subcategory of `category_id`
    pub fn resolve_subcategory(&self, category_id: &str, id: Option<&str>) -> CatalogMatch<'_> {
        let found = id.and_then(|id| self.category(category_id).and_then(|c| c.subcategory(id)));
        match found {
            Some(entry) => CatalogMatch::Known(entry),
            None => CatalogMatch::Fallback(&self.fallback),
        }
    }
}

fn validate_entry(entry: &CatalogEntry) -> CoreResult<()> {
    if entry.id.trim().is_empty() {
        return Err(CoreError::Catalog {
            message: format!("Entry '{}' has an empty id", entry.name),
        });
    }
    if !is_hex_color(&entry.color) {
        return Err(CoreError::Catalog {
            message: format!("Entry '{}' has invalid color '{}'", entry.id, entry.color),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contains_all_known() {
        let catalog = CategoryCatalog::default();
        for known in KnownCategory::ALL {
            let entry = catalog.known(known).unwrap();
            assert_eq!(entry.id, known.id());
            assert!(is_hex_color(&entry.color), "bad color for {}", entry.id);
        }
        assert_eq!("food".parse::<KnownCategory>().unwrap(), KnownCategory::Food);
        assert!("fod".parse::<KnownCategory>().is_err());
    }

    #[test]
    fn test_unknown_ids_fall_back() {
        let catalog = CategoryCatalog::default();
        let m = catalog.resolve_category(Some("crypto"));
        assert!(!m.is_known());
        assert_eq!(m.entry().name, "Uncategorized");
        assert_eq!(m.entry().color, "#9E9E9E");

        assert!(!catalog.resolve_category(None).is_known());
        assert!(catalog.resolve_subcategory("food", Some("restaurant")).is_known());
        assert!(!catalog.resolve_subcategory("food", Some("fuel")).is_known());
        assert!(!catalog.resolve_subcategory("food", None).is_known());
    }

    #[test]
    fn test_custom_fallback_label() {
        let config = CatalogConfig {
            uncategorized_label: "Sin categoría".to_string(),
            ..CatalogConfig::default()
        };
        let catalog = CategoryCatalog::builtin(&config);
        assert_eq!(catalog.fallback().display_name(), "Sin categoría");
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r##"
categories:
  - id: food
    name: Food
    name_localized: Comida
    color: "#FF7043"
    icon_name: utensils
    subcategories:
      - id: restaurant
        name: Restaurants
        color: "#F4511E"
        icon_name: chef-hat
"##;
        let catalog = CategoryCatalog::from_yaml(yaml, &CatalogConfig::default()).unwrap();
        let food = catalog.category("food").unwrap();
        assert_eq!(food.display_name(), "Comida");
        assert_eq!(food.subcategory("restaurant").unwrap().name, "Restaurants");
        assert!(catalog.category("shopping").is_none());
    }

    #[test]
    fn test_from_yaml_rejects_bad_color_and_duplicates() {
        let bad_color = "categories:\n  - {id: food, name: Food, color: orange, icon_name: x}\n";
        assert!(matches!(
            CategoryCatalog::from_yaml(bad_color, &CatalogConfig::default()),
            Err(CoreError::Catalog { .. })
        ));

        let dup = "categories:\n  - {id: a, name: A, color: '#fff', icon_name: x}\n  - {id: a, name: B, color: '#000', icon_name: y}\n";
        assert!(CategoryCatalog::from_yaml(dup, &CatalogConfig::default()).is_err());
    }

    #[test]
    fn test_load_without_path_is_builtin() {
        let catalog = CategoryCatalog::load(&CatalogConfig::default()).unwrap();
        assert_eq!(catalog.entries().len(), KnownCategory::ALL.len());
    }

    #[test]
    fn test_apply_alpha() {
        assert_eq!(apply_alpha("#ff7043", 0.3), "#FF70434D");
        assert_eq!(apply_alpha("#abc", 1.0), "#AABBCCFF");
        assert_eq!(apply_alpha("#11223380", 0.0), "#11223300");
        assert_eq!(apply_alpha("tomato", 0.3), "tomato");
    }
}
