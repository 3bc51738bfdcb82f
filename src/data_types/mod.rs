pub mod menu_data_types;

use menu_data_types::{
    MenuBundle, MenuVersion, Order, OrderSuggestion, Restaurant, ScrapeMode, ScrapedMenu,
};
use teloxide::{
    dispatching::dialogue::InMemStorage, prelude::Dialogue, utils::command::BotCommands,
};
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "restaurant hub")]
    Start,
    #[command(description = "current menu & selection")]
    Menu,
    #[command(description = "describe an order in plain words\n")]
    Wish,
    #[command(description = "add a free-text item")]
    Custom,
    #[command(description = "save the current order")]
    Save,
    #[command(description = "saved orders")]
    Orders,
    #[command(description = "random pick from favorites")]
    Random,
    #[command(description = "fetch menu with AI (optional URL)")]
    Scrape,
    #[command(description = "off")]
    Deepscrape,
    #[command(description = "off")]
    Versions,
    #[command(description = "off")]
    Add,
    #[command(description = "off")]
    Fav,
    #[command(description = "off")]
    Mods,
}

#[derive(Clone, Default)]
pub enum DialogueState {
    #[default]
    Default,
    AwaitOrderName,
}

pub type DialogueType = Dialogue<DialogueState, InMemStorage<DialogueState>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub type AppTaskType = (broadcast::Sender<AppTask>, broadcast::Receiver<AppTask>);
pub type SessionViewType = (
    broadcast::Sender<SessionView>,
    broadcast::Receiver<SessionView>,
);

/// Everything the task loop can be asked to do. Command handlers never touch
/// application state directly, they send one of these and (where a re-render
/// is needed) await a [`SessionView`] reply.
#[derive(Debug, Clone)]
pub enum AppTask {
    SelectRestaurant {
        chat_id: i64,
        restaurant_id: String,
    },
    ToggleItem {
        chat_id: i64,
        item_id: String,
    },
    ApplyPreset {
        chat_id: i64,
        preset_index: usize,
    },
    AddCustomItem {
        chat_id: i64,
        text: String,
    },
    RemoveCustomItem {
        chat_id: i64,
        index: usize,
    },
    ClearSelection {
        chat_id: i64,
    },
    SetActiveVersion {
        chat_id: i64,
        version: MenuVersion,
    },
    SetCategoryFilter {
        chat_id: i64,
        filter: CategoryFilter,
    },
    ApplySuggestion {
        chat_id: i64,
        suggestion: OrderSuggestion,
    },
    QuerySession {
        chat_id: i64,
    },
    SaveOrder {
        chat_id: i64,
        name: String,
        creator: String,
    },
    DeleteOrder {
        chat_id: i64,
        order_id: String,
    },
    LoadOrder {
        chat_id: i64,
        order_id: String,
    },
    AddRestaurant {
        chat_id: i64,
        name: String,
        address: Option<String>,
    },
    ToggleFavorite {
        chat_id: i64,
        restaurant_id: String,
    },
    StartScrape {
        chat_id: i64,
        restaurant_id: String,
        hint: String,
        mode: ScrapeMode,
    },
    ScrapeFinished {
        chat_id: i64,
        restaurant_id: String,
        source_url: Option<String>,
        result: Result<ScrapedMenu, AiError>,
    },
}

/// Which slice of the active menu the builder message is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    Presets,
    All,
    Category(String),
}

/// One selectable menu version entry for the versions keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionOption {
    pub version: MenuVersion,
    pub label: String,
}

/// Snapshot of one chat's session plus the derived views the handlers render
/// from. Produced only by the task loop.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub chat_id: i64,
    pub restaurant: Option<Restaurant>,
    pub version: MenuVersion,
    pub bundle: MenuBundle,
    pub selected_ids: Vec<String>,
    pub custom_items: Vec<String>,
    pub category_filter: CategoryFilter,
    pub total_calories: u32,
    pub version_options: Vec<VersionOption>,
    pub is_scraping: bool,
    pub favorites: Vec<Restaurant>,
    pub explore: Vec<Restaurant>,
    pub orders: Vec<Order>,
}

/// Failures of the Gemini-backed features. All degrade to a user-visible
/// notice; state stays untouched.
#[derive(Error, Debug, Clone)]
pub enum AiError {
    #[error("Gemini API is not configured")]
    Unconfigured,
    #[error("Gemini API is unreachable: {0}")]
    Unavailable(String),
    #[error("the model returned no usable text")]
    EmptyResponse,
    #[error("not enough menu text could be gathered")]
    InsufficientText,
    #[error("the model response did not match the expected schema: {0}")]
    BadSchema(String),
    #[error("the model suggested items that are not on this menu")]
    ForeignItemIds,
}

#[derive(Error, Debug, Clone)]
pub enum OrderError {
    #[error("Order is empty. Select items or add manual entries first.")]
    EmptyOrder,
    #[error("No restaurant selected. Use /start to pick one.")]
    NoActiveRestaurant,
}
