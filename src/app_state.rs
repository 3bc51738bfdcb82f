//! In-memory application state. One [`AppState`] lives inside the task loop;
//! nothing else mutates it. Persistence happens in the loop after the
//! corresponding state change succeeded.

use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::data_backend::system_menus;
use crate::data_types::{
    menu_data_types::{
        MenuBundle, MenuVersion, Order, OrderSuggestion, Restaurant, SavedMenu, ScrapedMenu,
    },
    CategoryFilter, OrderError, SessionView, VersionOption,
};

/// Per-chat working state: what the user is looking at and building.
#[derive(Debug, Clone)]
pub struct Session {
    pub restaurant_id: Option<String>,
    pub version: MenuVersion,
    pub selected_ids: Vec<String>,
    pub custom_items: Vec<String>,
    pub category_filter: CategoryFilter,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            restaurant_id: None,
            version: MenuVersion::Pending,
            selected_ids: Vec::new(),
            custom_items: Vec::new(),
            category_filter: CategoryFilter::Presets,
        }
    }
}

pub struct AppState {
    restaurants: Vec<Restaurant>,
    favorites: Vec<String>,
    /// per restaurant, newest first
    saved_versions: HashMap<String, Vec<SavedMenu>>,
    /// newest first
    orders: Vec<Order>,
    scraping: HashSet<String>,
    sessions: HashMap<i64, Session>,
}

impl AppState {
    pub fn new(
        custom_restaurants: Vec<Restaurant>,
        saved_versions: HashMap<String, Vec<SavedMenu>>,
        orders: Vec<Order>,
    ) -> Self {
        let mut restaurants = system_menus::system_restaurants();
        let favorites = restaurants.iter().map(|r| r.id.clone()).collect();
        restaurants.extend(system_menus::explore_restaurants());
        restaurants.extend(custom_restaurants);

        AppState {
            restaurants,
            favorites,
            saved_versions,
            orders,
            scraping: HashSet::new(),
            sessions: HashMap::new(),
        }
    }

    pub fn find_restaurant(&self, id: &str) -> Option<&Restaurant> {
        self.restaurants.iter().find(|r| r.id == id)
    }

    fn session(&self, chat_id: i64) -> Session {
        self.sessions.get(&chat_id).cloned().unwrap_or_default()
    }

    fn session_mut(&mut self, chat_id: i64) -> &mut Session {
        self.sessions.entry(chat_id).or_default()
    }

    /// Initial version when a restaurant becomes active: a scrape already
    /// running wins, then the newest saved snapshot, then hardcoded data,
    /// otherwise the acquisition flow.
    fn initial_version(&self, restaurant_id: &str) -> MenuVersion {
        if self.scraping.contains(restaurant_id) {
            return MenuVersion::Pending;
        }
        if let Some(newest) = self
            .saved_versions
            .get(restaurant_id)
            .and_then(|v| v.first())
        {
            return MenuVersion::Saved(newest.id.clone());
        }
        match self.find_restaurant(restaurant_id) {
            Some(r) if r.has_default_menu() => MenuVersion::System,
            _ => MenuVersion::Pending,
        }
    }

    /// Switching restaurants resets the working order.
    pub fn select_restaurant(&mut self, chat_id: i64, restaurant_id: &str) {
        if self.find_restaurant(restaurant_id).is_none() {
            log::warn!("select for unknown restaurant '{restaurant_id}'");
            return;
        }
        let version = self.initial_version(restaurant_id);
        let session = self.session_mut(chat_id);
        session.restaurant_id = Some(restaurant_id.to_string());
        session.version = version;
        session.selected_ids.clear();
        session.custom_items.clear();

        // presets tab only when the active menu actually has presets
        let has_presets = !self.resolve_active_menu(&self.session(chat_id)).presets.is_empty();
        self.session_mut(chat_id).category_filter = if has_presets {
            CategoryFilter::Presets
        } else {
            CategoryFilter::All
        };
    }

    pub fn toggle_item(&mut self, chat_id: i64, item_id: &str) {
        let session = self.session_mut(chat_id);
        if let Some(pos) = session.selected_ids.iter().position(|id| id == item_id) {
            session.selected_ids.remove(pos);
        } else {
            session.selected_ids.push(item_id.to_string());
        }
    }

    /// A preset replaces the whole working order, manual entries included.
    pub fn apply_preset(&mut self, chat_id: i64, preset_index: usize) {
        let bundle = self.resolve_active_menu(&self.session(chat_id));
        let Some(preset) = bundle.presets.get(preset_index) else {
            log::warn!("preset index {preset_index} out of range");
            return;
        };
        let item_ids = preset.item_ids.clone();
        let session = self.session_mut(chat_id);
        session.selected_ids = item_ids;
        session.custom_items.clear();
        // jump to the full item list so the picked items are visible
        session.category_filter = CategoryFilter::All;
    }

    pub fn add_custom_item(&mut self, chat_id: i64, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.session_mut(chat_id).custom_items.push(text.to_string());
    }

    pub fn remove_custom_item(&mut self, chat_id: i64, index: usize) {
        let session = self.session_mut(chat_id);
        if index < session.custom_items.len() {
            session.custom_items.remove(index);
        }
    }

    pub fn clear_selection(&mut self, chat_id: i64) {
        let session = self.session_mut(chat_id);
        session.selected_ids.clear();
        session.custom_items.clear();
    }

    /// Version switches never touch the selection. Ids missing from the new
    /// version stay selected and simply resolve to nothing.
    pub fn set_active_version(&mut self, chat_id: i64, version: MenuVersion) {
        self.session_mut(chat_id).version = version;
    }

    pub fn set_category_filter(&mut self, chat_id: i64, filter: CategoryFilter) {
        self.session_mut(chat_id).category_filter = filter;
    }

    /// Applies a validated mapper suggestion. Like a preset, it replaces the
    /// whole working order, manual entries included.
    pub fn apply_suggestion(&mut self, chat_id: i64, suggestion: &OrderSuggestion) {
        let session = self.session_mut(chat_id);
        session.selected_ids = suggestion.item_ids.clone();
        session.custom_items.clear();
        session.category_filter = CategoryFilter::All;
    }

    /// Menu data the session's active version resolves to. Verbatim, no
    /// dedup or filtering.
    pub fn resolve_active_menu(&self, session: &Session) -> MenuBundle {
        let Some(restaurant_id) = session.restaurant_id.as_deref() else {
            return MenuBundle::default();
        };
        match &session.version {
            MenuVersion::Pending => MenuBundle::default(),
            MenuVersion::System => self
                .find_restaurant(restaurant_id)
                .map(|r| MenuBundle {
                    menu: r.menu.clone(),
                    presets: r.presets.clone(),
                })
                .unwrap_or_default(),
            MenuVersion::Saved(id) => self
                .saved_versions
                .get(restaurant_id)
                .and_then(|versions| versions.iter().find(|v| &v.id == id))
                .map(|v| MenuBundle {
                    menu: v.menu.clone(),
                    presets: v.presets.clone(),
                })
                .unwrap_or_default(),
        }
    }

    /// Unresolvable ids contribute zero. Duplicate selections count twice.
    pub fn total_calories(&self, session: &Session) -> u32 {
        let bundle = self.resolve_active_menu(session);
        session
            .selected_ids
            .iter()
            .filter_map(|id| bundle.menu.iter().find(|i| &i.id == id))
            .filter_map(|i| i.calories)
            .sum()
    }

    /// Snapshots the working order. The caller persists the returned record.
    pub fn save_order(
        &mut self,
        chat_id: i64,
        name: &str,
        creator: &str,
    ) -> Result<Order, OrderError> {
        let session = self.session(chat_id);
        let Some(restaurant_id) = session.restaurant_id.clone() else {
            return Err(OrderError::NoActiveRestaurant);
        };
        if session.selected_ids.is_empty() && session.custom_items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let order = Order {
            id: Uuid::new_v4().to_string(),
            restaurant_id,
            name: name.trim().to_string(),
            creator: creator.to_string(),
            items: session.selected_ids.clone(),
            custom_items: session.custom_items.clone(),
            timestamp: Utc::now().timestamp_millis(),
        };
        self.orders.insert(0, order.clone());
        Ok(order)
    }

    pub fn delete_order(&mut self, order_id: &str) {
        self.orders.retain(|o| o.id != order_id);
    }

    /// Loads a saved order back into the working state. The restaurant is
    /// re-selected first, so the active version follows the usual precedence;
    /// items saved against an older version may no longer resolve.
    pub fn load_order(&mut self, chat_id: i64, order_id: &str) -> bool {
        let Some(order) = self.orders.iter().find(|o| o.id == order_id).cloned() else {
            return false;
        };
        self.select_restaurant(chat_id, &order.restaurant_id);
        let session = self.session_mut(chat_id);
        if session.restaurant_id.is_none() {
            // restaurant disappeared from the catalog
            return false;
        }
        session.selected_ids = order.items;
        session.custom_items = order.custom_items;
        session.category_filter = CategoryFilter::All;
        true
    }

    pub fn toggle_favorite(&mut self, restaurant_id: &str) {
        if let Some(pos) = self.favorites.iter().position(|id| id == restaurant_id) {
            self.favorites.remove(pos);
        } else if self.find_restaurant(restaurant_id).is_some() {
            self.favorites.push(restaurant_id.to_string());
        }
    }

    pub fn favorite_restaurants(&self) -> Vec<Restaurant> {
        self.favorites
            .iter()
            .filter_map(|id| self.find_restaurant(id))
            .cloned()
            .collect()
    }

    /// Creates a user-added restaurant. The caller persists it.
    pub fn add_restaurant(&mut self, name: &str, address: Option<String>) -> Restaurant {
        let restaurant = Restaurant {
            id: format!("custom-{}", Utc::now().timestamp_millis()),
            name: name.trim().to_string(),
            logo: "🍽️".to_string(),
            color: "stone".to_string(),
            url: None,
            menu: Vec::new(),
            presets: Vec::new(),
            address,
            phone_number: None,
            rating: None,
            delivery_apps: None,
        };
        self.restaurants.push(restaurant.clone());
        restaurant
    }

    /// Merges structuring-stage metadata into a user-added restaurant.
    /// Hardcoded restaurants keep their verified data untouched.
    pub fn merge_scrape_info(&mut self, restaurant_id: &str, scraped: &ScrapedMenu) -> Option<Restaurant> {
        let info = scraped.info.as_ref().filter(|i| !i.is_empty())?;
        if !restaurant_id.starts_with("custom-") {
            return None;
        }
        let restaurant = self.restaurants.iter_mut().find(|r| r.id == restaurant_id)?;
        if restaurant.phone_number.is_none() {
            restaurant.phone_number = info.phone_number.clone();
        }
        if restaurant.rating.is_none() {
            restaurant.rating = info.rating;
        }
        if restaurant.delivery_apps.is_none() {
            restaurant.delivery_apps = info.delivery_apps.clone();
        }
        Some(restaurant.clone())
    }

    pub fn is_scraping(&self, restaurant_id: &str) -> bool {
        self.scraping.contains(restaurant_id)
    }

    /// Marks a scrape as running. Returns false when one is already in
    /// flight for this restaurant.
    pub fn begin_scrape(&mut self, restaurant_id: &str) -> bool {
        self.scraping.insert(restaurant_id.to_string())
    }

    pub fn finish_scrape(&mut self, restaurant_id: &str) {
        self.scraping.remove(restaurant_id);
    }

    pub fn insert_saved_version(&mut self, version: SavedMenu) {
        self.saved_versions
            .entry(version.restaurant_id.clone())
            .or_default()
            .insert(0, version);
    }

    /// Registers a finished scrape: stores the snapshot and flips every
    /// session currently viewing this restaurant onto it.
    pub fn on_scrape_success(&mut self, scraped: &ScrapedMenu, version: SavedMenu) -> Option<Restaurant> {
        let restaurant_id = version.restaurant_id.clone();
        let version_id = version.id.clone();
        self.insert_saved_version(version);
        let updated = self.merge_scrape_info(&restaurant_id, scraped);
        self.finish_scrape(&restaurant_id);

        for session in self.sessions.values_mut() {
            if session.restaurant_id.as_deref() == Some(&restaurant_id) {
                session.version = MenuVersion::Saved(version_id.clone());
                session.category_filter = CategoryFilter::All;
            }
        }
        updated
    }

    fn version_options(&self, restaurant_id: &str) -> Vec<VersionOption> {
        let mut options = Vec::new();
        for saved in self.saved_versions.get(restaurant_id).into_iter().flatten() {
            let label = Utc
                .timestamp_millis_opt(saved.timestamp)
                .single()
                .map(|t| format!("Scraped: {}", t.format("%d.%m.%Y %H:%M")))
                .unwrap_or_else(|| "Scraped".to_string());
            options.push(VersionOption {
                version: MenuVersion::Saved(saved.id.clone()),
                label,
            });
        }
        if self
            .find_restaurant(restaurant_id)
            .is_some_and(|r| r.has_default_menu())
        {
            options.push(VersionOption {
                version: MenuVersion::System,
                label: "System Default".to_string(),
            });
        }
        options
    }

    /// Derived render snapshot for one chat.
    pub fn session_view(&self, chat_id: i64) -> SessionView {
        let session = self.session(chat_id);
        let restaurant = session
            .restaurant_id
            .as_deref()
            .and_then(|id| self.find_restaurant(id))
            .cloned();
        let bundle = self.resolve_active_menu(&session);
        let total_calories = self.total_calories(&session);

        let favorites = self.favorite_restaurants();
        let explore = self
            .restaurants
            .iter()
            .filter(|r| !self.favorites.contains(&r.id))
            .cloned()
            .collect();

        SessionView {
            chat_id,
            version_options: restaurant
                .as_ref()
                .map(|r| self.version_options(&r.id))
                .unwrap_or_default(),
            is_scraping: session
                .restaurant_id
                .as_deref()
                .is_some_and(|id| self.is_scraping(id)),
            restaurant,
            version: session.version.clone(),
            bundle,
            selected_ids: session.selected_ids,
            custom_items: session.custom_items,
            category_filter: session.category_filter,
            total_calories,
            favorites,
            explore,
            orders: self.orders.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::menu_data_types::{Ingredient, ScrapeInfo};

    fn empty_state() -> AppState {
        AppState::new(Vec::new(), HashMap::new(), Vec::new())
    }

    fn saved(id: &str, restaurant_id: &str, timestamp: i64) -> SavedMenu {
        SavedMenu {
            id: id.to_string(),
            restaurant_id: restaurant_id.to_string(),
            timestamp,
            menu: vec![Ingredient {
                id: format!("{id}-item"),
                name: "Scraped Thing".to_string(),
                category: "Mains".to_string(),
                calories: Some(400),
                price: None,
                description: None,
                premium: None,
            }],
            presets: Vec::new(),
            source_url: None,
        }
    }

    #[test]
    fn select_prefers_newest_saved_over_system() {
        let mut state = empty_state();
        state.insert_saved_version(saved("old", "cava", 1));
        state.insert_saved_version(saved("new", "cava", 2));

        state.select_restaurant(1, "cava");
        let view = state.session_view(1);
        assert_eq!(view.version, MenuVersion::Saved("new".to_string()));
        assert_eq!(view.bundle.menu[0].id, "new-item");
    }

    #[test]
    fn select_falls_back_system_then_pending() {
        let mut state = empty_state();

        state.select_restaurant(1, "cava");
        assert_eq!(state.session_view(1).version, MenuVersion::System);

        state.select_restaurant(1, "ff-popeyes");
        let view = state.session_view(1);
        assert_eq!(view.version, MenuVersion::Pending);
        assert!(view.bundle.menu.is_empty());
    }

    #[test]
    fn in_flight_scrape_wins_selection_precedence() {
        let mut state = empty_state();
        state.insert_saved_version(saved("v", "cava", 1));
        assert!(state.begin_scrape("cava"));

        state.select_restaurant(1, "cava");
        let view = state.session_view(1);
        assert_eq!(view.version, MenuVersion::Pending);
        assert!(view.is_scraping);
    }

    #[test]
    fn switching_restaurants_resets_working_order() {
        let mut state = empty_state();
        state.select_restaurant(1, "cava");
        state.toggle_item(1, "cava-prot-chicken");
        state.add_custom_item(1, "extra pita");
        state.set_category_filter(1, CategoryFilter::All);

        state.select_restaurant(1, "chipotle");
        let view = state.session_view(1);
        assert!(view.selected_ids.is_empty());
        assert!(view.custom_items.is_empty());
        assert_eq!(view.category_filter, CategoryFilter::Presets);
    }

    #[test]
    fn toggle_is_self_inverse() {
        let mut state = empty_state();
        state.select_restaurant(1, "cava");

        state.toggle_item(1, "cava-prot-chicken");
        assert_eq!(state.session_view(1).selected_ids, vec!["cava-prot-chicken"]);
        state.toggle_item(1, "cava-prot-chicken");
        assert!(state.session_view(1).selected_ids.is_empty());
    }

    #[test]
    fn preset_replaces_selection_and_custom_items() {
        let mut state = empty_state();
        state.select_restaurant(1, "cava");
        state.toggle_item(1, "cava-side-x");
        state.add_custom_item(1, "napkins");

        state.apply_preset(1, 0);
        let view = state.session_view(1);
        assert_eq!(view.selected_ids, view.bundle.presets[0].item_ids);
        assert!(view.custom_items.is_empty());
        assert_eq!(view.category_filter, CategoryFilter::All);

        // out-of-range index leaves everything alone
        state.apply_preset(1, 99);
        assert_eq!(state.session_view(1).selected_ids, view.selected_ids);
    }

    #[test]
    fn stale_ids_survive_version_switch_and_count_zero() {
        let mut state = empty_state();
        state.insert_saved_version(saved("v", "cava", 1));
        state.select_restaurant(1, "cava");
        state.toggle_item(1, "v-item");
        assert_eq!(state.total_calories(&state.session(1)), 400);

        state.set_active_version(1, MenuVersion::System);
        let view = state.session_view(1);
        assert_eq!(view.selected_ids, vec!["v-item"]);
        assert_eq!(view.total_calories, 0);
    }

    #[test]
    fn duplicate_selection_counts_twice() {
        let mut state = empty_state();
        state.select_restaurant(1, "cava");
        let session = Session {
            restaurant_id: Some("cava".to_string()),
            version: MenuVersion::System,
            selected_ids: vec!["cava-dip-hummus".to_string(), "cava-dip-hummus".to_string()],
            custom_items: Vec::new(),
            category_filter: CategoryFilter::All,
        };
        assert_eq!(state.total_calories(&session), 90);
    }

    #[test]
    fn empty_order_is_rejected_custom_only_is_not() {
        let mut state = empty_state();
        assert!(matches!(
            state.save_order(1, "x", "Sam"),
            Err(OrderError::NoActiveRestaurant)
        ));

        state.select_restaurant(1, "cava");
        assert!(matches!(
            state.save_order(1, "x", "Sam"),
            Err(OrderError::EmptyOrder)
        ));

        state.add_custom_item(1, "mystery special");
        let order = state.save_order(1, "friday", "Sam").unwrap();
        assert_eq!(order.restaurant_id, "cava");
        assert_eq!(order.custom_items, vec!["mystery special"]);
        assert!(order.items.is_empty());
    }

    #[test]
    fn load_order_restores_restaurant_and_items() {
        let mut state = empty_state();
        state.select_restaurant(1, "cava");
        state.toggle_item(1, "cava-prot-falafel");
        state.add_custom_item(1, "baklava");
        let order = state.save_order(1, "veggie", "Sam").unwrap();

        // a different chat loads it later
        state.select_restaurant(2, "chipotle");
        assert!(state.load_order(2, &order.id));
        let view = state.session_view(2);
        assert_eq!(view.restaurant.unwrap().id, "cava");
        assert_eq!(view.selected_ids, vec!["cava-prot-falafel"]);
        assert_eq!(view.custom_items, vec!["baklava"]);

        assert!(!state.load_order(2, "no-such-order"));
    }

    #[test]
    fn delete_order_removes_it() {
        let mut state = empty_state();
        state.select_restaurant(1, "cava");
        state.toggle_item(1, "cava-base-pita");
        let order = state.save_order(1, "n", "Sam").unwrap();
        assert_eq!(state.session_view(1).orders.len(), 1);

        state.delete_order(&order.id);
        assert!(state.session_view(1).orders.is_empty());
    }

    #[test]
    fn system_restaurants_start_as_favorites() {
        let mut state = empty_state();
        let favs = state.favorite_restaurants();
        assert!(favs.iter().all(|r| r.has_default_menu()));
        assert_eq!(favs.len(), 3);

        state.toggle_favorite("ff-popeyes");
        assert_eq!(state.favorite_restaurants().len(), 4);
        state.toggle_favorite("cava");
        assert!(!state
            .favorite_restaurants()
            .iter()
            .any(|r| r.id == "cava"));

        // unknown ids never become favorites
        state.toggle_favorite("nowhere");
        assert_eq!(state.favorite_restaurants().len(), 3);
    }

    #[test]
    fn added_restaurant_lands_in_explore() {
        let mut state = empty_state();
        let r = state.add_restaurant("Lucy's Kitchen", Some("12 Main St".to_string()));
        assert!(r.id.starts_with("custom-"));

        let view = state.session_view(1);
        assert!(view.explore.iter().any(|e| e.id == r.id));
        assert!(!view.favorites.iter().any(|f| f.id == r.id));
    }

    #[test]
    fn scrape_gating_is_per_restaurant() {
        let mut state = empty_state();
        assert!(state.begin_scrape("cava"));
        assert!(!state.begin_scrape("cava"));
        assert!(state.begin_scrape("chipotle"));
        state.finish_scrape("cava");
        assert!(state.begin_scrape("cava"));
    }

    #[test]
    fn duplicate_scrape_request_is_visible_up_front() {
        let mut state = empty_state();
        state.select_restaurant(1, "cava");
        state.begin_scrape("cava");

        // a second /scrape sees the fetch in flight before it even tries,
        // so the handler can skip its own "fetching" notice
        assert!(state.session_view(1).is_scraping);
        assert!(!state.begin_scrape("cava"));
        assert!(state.session_view(1).is_scraping);
    }

    #[test]
    fn scrape_success_switches_viewing_sessions_only() {
        let mut state = empty_state();
        state.select_restaurant(1, "ff-popeyes");
        state.select_restaurant(2, "cava");
        state.begin_scrape("ff-popeyes");

        let scraped = ScrapedMenu {
            menu: saved("s", "ff-popeyes", 5).menu,
            presets: Vec::new(),
            info: None,
        };
        state.on_scrape_success(&scraped, saved("s", "ff-popeyes", 5));

        let watching = state.session_view(1);
        assert_eq!(watching.version, MenuVersion::Saved("s".to_string()));
        assert_eq!(watching.category_filter, CategoryFilter::All);
        assert!(!watching.is_scraping);

        assert_eq!(state.session_view(2).version, MenuVersion::System);
    }

    #[test]
    fn scrape_info_merges_into_custom_restaurants_only() {
        let mut state = empty_state();
        let custom = state.add_restaurant("Lucy's", None);

        let scraped = ScrapedMenu {
            menu: Vec::new(),
            presets: Vec::new(),
            info: Some(ScrapeInfo {
                phone_number: Some("(973) 555-0123".to_string()),
                rating: Some(4.2),
                delivery_apps: None,
            }),
        };

        assert!(state.merge_scrape_info("cava", &scraped).is_none());

        let updated = state.merge_scrape_info(&custom.id, &scraped).unwrap();
        assert_eq!(updated.phone_number.as_deref(), Some("(973) 555-0123"));
        assert_eq!(updated.rating, Some(4.2));
    }

    #[test]
    fn version_options_list_saved_then_system() {
        let mut state = empty_state();
        state.insert_saved_version(saved("a", "cava", 1_700_000_000_000));
        state.insert_saved_version(saved("b", "cava", 1_700_000_100_000));
        state.select_restaurant(1, "cava");

        let options = state.session_view(1).version_options;
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].version, MenuVersion::Saved("b".to_string()));
        assert!(options[0].label.starts_with("Scraped:"));
        assert_eq!(options[2].version, MenuVersion::System);
        assert_eq!(options[2].label, "System Default");
    }

    #[test]
    fn suggestion_replaces_selection_and_custom_items() {
        let mut state = empty_state();
        state.select_restaurant(1, "cava");
        state.toggle_item(1, "cava-base-pita");
        state.add_custom_item(1, "side of olives");

        let suggestion = OrderSuggestion {
            order_name: "light lunch".to_string(),
            item_ids: vec!["cava-base-greens".to_string(), "cava-prot-falafel".to_string()],
            reasoning: "light and vegetarian".to_string(),
        };
        state.apply_suggestion(1, &suggestion);

        let view = state.session_view(1);
        assert_eq!(view.selected_ids, suggestion.item_ids);
        assert!(view.custom_items.is_empty());
        assert_eq!(view.category_filter, CategoryFilter::All);
    }
}
