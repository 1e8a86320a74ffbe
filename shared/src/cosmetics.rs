//! Cosmetic skin catalog. A closed enum with a static data table, so an
//! unknown skin tag is a parse error instead of a silent default.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Skin {
    #[default]
    Default,
    Crimson,
    Azure,
    Stealth,
    Gold,
}

/// Display and shop data for one skin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkinInfo {
    pub name: &'static str,
    pub price: u32,
    pub primary_color: &'static str,
    pub secondary_color: &'static str,
    pub special: bool,
}

impl Skin {
    pub const ALL: [Skin; 5] = [
        Skin::Default,
        Skin::Crimson,
        Skin::Azure,
        Skin::Stealth,
        Skin::Gold,
    ];

    pub fn info(&self) -> SkinInfo {
        match self {
            Skin::Default => SkinInfo {
                name: "Commercial White",
                price: 0,
                primary_color: "#ffffff",
                secondary_color: "#334155",
                special: false,
            },
            Skin::Crimson => SkinInfo {
                name: "Crimson Baron",
                price: 9999,
                primary_color: "#db2777",
                secondary_color: "#be185d",
                special: true,
            },
            Skin::Azure => SkinInfo {
                name: "Azure King",
                price: 9999,
                primary_color: "#06b6d4",
                secondary_color: "#0891b2",
                special: true,
            },
            Skin::Stealth => SkinInfo {
                name: "Ghost Executive",
                price: 2000,
                primary_color: "#1e293b",
                secondary_color: "#0f172a",
                special: false,
            },
            Skin::Gold => SkinInfo {
                name: "Royal Gold",
                price: 5000,
                primary_color: "#fbbf24",
                secondary_color: "#b45309",
                special: true,
            },
        }
    }

    /// Parses a CLI/config tag. Returns None for unknown tags so callers can
    /// fail at startup.
    pub fn parse(tag: &str) -> Option<Skin> {
        match tag {
            "default" => Some(Skin::Default),
            "crimson" => Some(Skin::Crimson),
            "azure" => Some(Skin::Azure),
            "stealth" => Some(Skin::Stealth),
            "gold" => Some(Skin::Gold),
            _ => None,
        }
    }
}
