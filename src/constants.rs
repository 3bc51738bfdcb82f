use std::sync::OnceLock;

pub const HICKORY_DB: &str = "hickory.sqlite";

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Acquired menu text shorter than this is considered unusable and fails the
/// scrape instead of producing a hallucinated three-item menu.
pub const MIN_MENU_TEXT_LEN: usize = 80;

/// Structuring-stage input is clipped to this many chars so a huge
/// search dump cannot blow past the model's context window.
pub const MAX_STRUCTURE_INPUT_LEN: usize = 30_000;

pub const NO_RESTAURANT_MSG: &str = "No restaurant selected. Use /start to pick one.";

pub static DB_FILENAME: OnceLock<String> = OnceLock::new();
pub static GEMINI_API_KEY: OnceLock<Option<String>> = OnceLock::new();
pub static GEMINI_MODEL: OnceLock<String> = OnceLock::new();
