use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Content categories known to the ledger.
///
/// A category names both a directory under the entities root and a directory
/// under the registry root. Some categories only ever appear in the registry
/// (art with no gameplay record, audio).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    // Categories with entity records
    Enemies,
    Bosses,
    Npcs,
    Equipment,
    Items,
    Resources,
    Environment,
    Nodes,
    Ui,
    Hero,

    // Registry-only categories
    Buildings,
    Props,
    Vfx,
    Loot,
    Audio,
}

/// All category variants in listing order.
const ALL_CATEGORIES: &[Category] = &[
    Category::Enemies,
    Category::Bosses,
    Category::Npcs,
    Category::Equipment,
    Category::Items,
    Category::Resources,
    Category::Environment,
    Category::Nodes,
    Category::Ui,
    Category::Hero,
    Category::Buildings,
    Category::Props,
    Category::Vfx,
    Category::Loot,
    Category::Audio,
];

impl Category {
    /// Canonical short name, used as the directory name on disk.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Enemies => "enemies",
            Self::Bosses => "bosses",
            Self::Npcs => "npcs",
            Self::Equipment => "equipment",
            Self::Items => "items",
            Self::Resources => "resources",
            Self::Environment => "environment",
            Self::Nodes => "nodes",
            Self::Ui => "ui",
            Self::Hero => "hero",
            Self::Buildings => "buildings",
            Self::Props => "props",
            Self::Vfx => "vfx",
            Self::Loot => "loot",
            Self::Audio => "audio",
        }
    }

    /// Human-readable name for listings.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Enemies => "Enemies",
            Self::Bosses => "Bosses",
            Self::Npcs => "NPCs",
            Self::Equipment => "Equipment",
            Self::Items => "Items",
            Self::Resources => "Resources",
            Self::Environment => "Environment",
            Self::Nodes => "Nodes",
            Self::Ui => "UI",
            Self::Hero => "Hero",
            Self::Buildings => "Buildings",
            Self::Props => "Props",
            Self::Vfx => "VFX",
            Self::Loot => "Loot",
            Self::Audio => "Audio",
        }
    }

    /// All accepted names for this category (case-insensitive matching).
    ///
    /// The canonical short name is always the first alias.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Enemies => &["enemies", "enemy"],
            Self::Bosses => &["bosses", "boss"],
            Self::Npcs => &["npcs", "npc"],
            Self::Equipment => &["equipment", "gear", "weapons"],
            Self::Items => &["items", "item"],
            Self::Resources => &["resources", "resource"],
            Self::Environment => &["environment", "env"],
            Self::Nodes => &["nodes", "node"],
            Self::Ui => &["ui"],
            Self::Hero => &["hero"],
            Self::Buildings => &["buildings", "building"],
            Self::Props => &["props", "prop"],
            Self::Vfx => &["vfx"],
            Self::Loot => &["loot"],
            Self::Audio => &["audio", "sfx"],
        }
    }

    /// Records for this category may live in nested subfolders
    /// (e.g. `equipment/weapons/sword/`).
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Equipment)
    }

    /// Whether registry records of this category describe audio rather than images.
    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio)
    }

    /// Whether the category has gameplay entity records.
    pub fn has_entities(&self) -> bool {
        matches!(
            self,
            Self::Enemies
                | Self::Bosses
                | Self::Npcs
                | Self::Equipment
                | Self::Items
                | Self::Resources
                | Self::Environment
                | Self::Nodes
                | Self::Ui
                | Self::Hero
        )
    }

    /// Prefix that generation tooling adds to ids in this category, if any.
    ///
    /// Lookups by an unprefixed id also try the prefixed form.
    pub fn id_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Enemies | Self::Bosses => Some("enemy_"),
            _ => None,
        }
    }

    /// Category searched when an id is not found in this one.
    pub fn fallback(&self) -> Option<Category> {
        match self {
            Self::Enemies => Some(Self::Bosses),
            _ => None,
        }
    }

    /// All 15 category variants.
    pub fn all() -> &'static [Category] {
        ALL_CATEGORIES
    }

    /// Categories with gameplay entity records, in listing order.
    pub fn entity_categories() -> impl Iterator<Item = Category> {
        ALL_CATEGORIES.iter().copied().filter(|c| c.has_entities())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Error returned when a string cannot be parsed into a `Category`.
#[derive(Debug, Clone)]
pub struct CategoryParseError(pub String);

impl std::fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown category: '{}'", self.0)
    }
}

impl std::error::Error for CategoryParseError {}

impl std::str::FromStr for Category {
    type Err = CategoryParseError;

    /// Parse a category from any recognized name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ALL_CATEGORIES
            .iter()
            .copied()
            .find(|c| c.aliases().contains(&lower.as_str()))
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.short_name())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
