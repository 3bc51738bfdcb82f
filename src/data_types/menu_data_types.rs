use serde::{Deserialize, Serialize};

/// One selectable menu line item. Identity is the `id` string, stable within
/// a single menu version.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<bool>,
}

/// A curated combo: selecting it replaces the working selection wholesale.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: String,
    pub item_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub menu: Vec<Ingredient>,
    #[serde(default)]
    pub presets: Vec<Preset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_apps: Option<Vec<String>>,
}

impl Restaurant {
    /// Whether this restaurant ships hardcoded default menu data.
    pub fn has_default_menu(&self) -> bool {
        !self.menu.is_empty()
    }
}

/// One immutable snapshot of a restaurant's menu/preset list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedMenu {
    pub id: String,
    pub restaurant_id: String,
    /// unix millis
    pub timestamp: i64,
    pub menu: Vec<Ingredient>,
    pub presets: Vec<Preset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

/// A saved, immutable order snapshot. Item ids were valid against whichever
/// menu version was active at save time; no integrity is enforced afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub creator: String,
    pub items: Vec<String>,
    #[serde(default)]
    pub custom_items: Vec<String>,
    /// unix millis
    pub timestamp: i64,
}

/// Resolved menu data for whatever version is currently active.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct MenuBundle {
    pub menu: Vec<Ingredient>,
    pub presets: Vec<Preset>,
}

/// Which menu snapshot a session is looking at. Replaces the stringly
/// 'SYSTEM'/'NEW' sentinels of the storage format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuVersion {
    /// hardcoded default data
    System,
    /// nothing selected yet, show the acquisition flow
    Pending,
    /// a stored SavedMenu, by id
    Saved(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScrapeMode {
    Standard,
    Deep,
}

/// Optional restaurant metadata the structuring stage may return alongside
/// the menu. Only merged into user-added restaurant records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_apps: Option<Vec<String>>,
}

impl ScrapeInfo {
    pub fn is_empty(&self) -> bool {
        self.phone_number.is_none() && self.rating.is_none() && self.delivery_apps.is_none()
    }
}

/// Result of the schema-constrained structuring stage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedMenu {
    pub menu: Vec<Ingredient>,
    pub presets: Vec<Preset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ScrapeInfo>,
}

/// Structured output of the natural-language order mapper.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSuggestion {
    pub order_name: String,
    pub item_ids: Vec<String>,
    pub reasoning: String,
}
