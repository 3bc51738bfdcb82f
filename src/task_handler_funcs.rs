//! The task loop owns the [`AppState`]; command and callback handlers only
//! talk to it through [`AppTask`]s and read back [`SessionView`] snapshots.

use chrono::Utc;
use teloxide::{requests::Requester, types::ChatId, Bot};
use tokio::sync::broadcast::{Receiver, Sender};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    constants::{DB_FILENAME, MIN_MENU_TEXT_LEN},
    data_backend::{gemini, looks_like_url},
    data_types::{
        menu_data_types::{Restaurant, SavedMenu, ScrapeMode, ScrapedMenu},
        AiError, AppTask, SessionView,
    },
    db_operations,
};

/// Deep mode and URL hints justify the search-grounded stage; plain names
/// go straight to the general-knowledge fallback.
pub fn wants_search_stage(hint: &str, mode: ScrapeMode) -> bool {
    mode == ScrapeMode::Deep || looks_like_url(hint)
}

/// Builds the immutable snapshot a successful scrape gets stored as.
pub fn make_saved_menu(
    restaurant_id: &str,
    scraped: &ScrapedMenu,
    source_url: Option<String>,
) -> SavedMenu {
    SavedMenu {
        id: Uuid::new_v4().to_string(),
        restaurant_id: restaurant_id.to_string(),
        timestamp: Utc::now().timestamp_millis(),
        menu: scraped.menu.clone(),
        presets: scraped.presets.clone(),
        source_url,
    }
}

/// Stage 1 gathers menu text (search-grounded, then general knowledge as
/// fallback), stage 2 structures it. Fails instead of structuring scraps.
pub async fn run_scrape_pipeline(
    restaurant: &Restaurant,
    hint: &str,
    mode: ScrapeMode,
) -> Result<ScrapedMenu, AiError> {
    let mut text = String::new();

    if wants_search_stage(hint, mode) {
        match gemini::search_menu_text(restaurant, hint).await {
            Ok(t) => text = t,
            Err(AiError::Unconfigured) => return Err(AiError::Unconfigured),
            Err(e) => log::warn!("search stage failed for {}: {}", restaurant.id, e),
        }
    }

    if text.trim().len() < MIN_MENU_TEXT_LEN {
        text = gemini::fallback_menu_text(restaurant, hint).await?;
    }
    if text.trim().len() < MIN_MENU_TEXT_LEN {
        return Err(AiError::InsufficientText);
    }

    gemini::structure_menu_text(&restaurant.name, &text).await
}

async fn handle_start_scrape(
    bot: &Bot,
    state: &mut AppState,
    task_tx: Sender<AppTask>,
    chat_id: i64,
    restaurant_id: String,
    hint: String,
    mode: ScrapeMode,
) {
    let Some(restaurant) = state.find_restaurant(&restaurant_id).cloned() else {
        bot.send_message(ChatId(chat_id), "Unknown restaurant.")
            .await
            .unwrap();
        return;
    };

    if !state.begin_scrape(&restaurant_id) {
        bot.send_message(
            ChatId(chat_id),
            format!("A menu fetch for {} is already running.", restaurant.name),
        )
        .await
        .unwrap();
        return;
    }

    log::info!("scrape started: {} ({:?})", restaurant_id, mode);

    let source_url = if looks_like_url(&hint) {
        Some(hint.trim().to_string())
    } else {
        None
    };

    tokio::spawn(async move {
        let result = run_scrape_pipeline(&restaurant, &hint, mode).await;
        // completion re-enters the loop as a task, so all state changes
        // happen in one place
        _ = task_tx.send(AppTask::ScrapeFinished {
            chat_id,
            restaurant_id: restaurant.id,
            source_url,
            result,
        });
    });
}

async fn handle_scrape_finished(
    bot: &Bot,
    state: &mut AppState,
    chat_id: i64,
    restaurant_id: String,
    source_url: Option<String>,
    result: Result<ScrapedMenu, AiError>,
) {
    let db = DB_FILENAME.get().unwrap();
    let name = state
        .find_restaurant(&restaurant_id)
        .map(|r| r.name.clone())
        .unwrap_or_else(|| restaurant_id.clone());

    match result {
        Ok(scraped) => {
            let version = make_saved_menu(&restaurant_id, &scraped, source_url);
            if let Err(e) = db_operations::insert_menu_version(db, &version) {
                log::error!("failed to persist menu version: {e}");
            }

            let item_count = scraped.menu.len();
            if let Some(updated) = state.on_scrape_success(&scraped, version) {
                if let Err(e) = db_operations::upsert_custom_restaurant(db, &updated) {
                    log::error!("failed to persist restaurant info: {e}");
                }
            }
            log::info!("scrape finished: {restaurant_id} ({item_count} items)");

            bot.send_message(
                ChatId(chat_id),
                format!("Menu for {name} is ready ({item_count} items). /menu to browse it."),
            )
            .await
            .unwrap();
        }
        Err(e) => {
            state.finish_scrape(&restaurant_id);
            log::warn!("scrape failed: {restaurant_id}: {e}");

            bot.send_message(ChatId(chat_id), format!("Menu fetch for {name} failed: {e}"))
                .await
                .unwrap();
        }
    }
}

pub async fn run_task_loop(
    bot: Bot,
    mut state: AppState,
    mut task_rx: Receiver<AppTask>,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) {
    let db = DB_FILENAME.get().unwrap();
    log::info!("Task loop ready.");

    while let Ok(task) = task_rx.recv().await {
        match task {
            AppTask::SelectRestaurant {
                chat_id,
                restaurant_id,
            } => {
                state.select_restaurant(chat_id, &restaurant_id);
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::ToggleItem { chat_id, item_id } => {
                state.toggle_item(chat_id, &item_id);
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::ApplyPreset {
                chat_id,
                preset_index,
            } => {
                state.apply_preset(chat_id, preset_index);
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::AddCustomItem { chat_id, text } => {
                state.add_custom_item(chat_id, &text);
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::RemoveCustomItem { chat_id, index } => {
                state.remove_custom_item(chat_id, index);
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::ClearSelection { chat_id } => {
                state.clear_selection(chat_id);
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::SetActiveVersion { chat_id, version } => {
                state.set_active_version(chat_id, version);
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::SetCategoryFilter { chat_id, filter } => {
                state.set_category_filter(chat_id, filter);
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::ApplySuggestion {
                chat_id,
                suggestion,
            } => {
                state.apply_suggestion(chat_id, &suggestion);
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::QuerySession { chat_id } => {
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::SaveOrder {
                chat_id,
                name,
                creator,
            } => {
                match state.save_order(chat_id, &name, &creator) {
                    Ok(order) => {
                        log::info!("{chat_id} saved order '{}'", order.name);
                        if let Err(e) = db_operations::insert_order(db, &order) {
                            log::error!("failed to persist order: {e}");
                        }
                        bot.send_message(
                            ChatId(chat_id),
                            format!("Saved \"{}\". /orders to see all.", order.name),
                        )
                        .await
                        .unwrap();
                    }
                    Err(e) => {
                        bot.send_message(ChatId(chat_id), e.to_string()).await.unwrap();
                    }
                }
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::DeleteOrder { chat_id, order_id } => {
                state.delete_order(&order_id);
                if let Err(e) = db_operations::delete_order(db, &order_id) {
                    log::error!("failed to delete order: {e}");
                }
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::LoadOrder { chat_id, order_id } => {
                if !state.load_order(chat_id, &order_id) {
                    bot.send_message(ChatId(chat_id), "That order no longer exists.")
                        .await
                        .unwrap();
                }
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::AddRestaurant {
                chat_id,
                name,
                address,
            } => {
                let restaurant = state.add_restaurant(&name, address);
                log::info!("{chat_id} added restaurant '{}'", restaurant.name);
                if let Err(e) = db_operations::upsert_custom_restaurant(db, &restaurant) {
                    log::error!("failed to persist restaurant: {e}");
                }
                bot.send_message(
                    ChatId(chat_id),
                    format!(
                        "Added {}. Select it in /start and run /scrape to fetch a menu.",
                        restaurant.name
                    ),
                )
                .await
                .unwrap();
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::ToggleFavorite {
                chat_id,
                restaurant_id,
            } => {
                state.toggle_favorite(&restaurant_id);
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::StartScrape {
                chat_id,
                restaurant_id,
                hint,
                mode,
            } => {
                handle_start_scrape(
                    &bot,
                    &mut state,
                    task_tx.clone(),
                    chat_id,
                    restaurant_id,
                    hint,
                    mode,
                )
                .await;
                _ = view_tx.send(state.session_view(chat_id));
            }
            AppTask::ScrapeFinished {
                chat_id,
                restaurant_id,
                source_url,
                result,
            } => {
                handle_scrape_finished(&bot, &mut state, chat_id, restaurant_id, source_url, result)
                    .await;
                _ = view_tx.send(state.session_view(chat_id));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::menu_data_types::Ingredient;

    #[test]
    fn search_stage_gating() {
        assert!(wants_search_stage("https://example.com/menu", ScrapeMode::Standard));
        assert!(wants_search_stage("www.example.com", ScrapeMode::Standard));
        assert!(wants_search_stage("", ScrapeMode::Deep));
        assert!(wants_search_stage("a diner on route 46", ScrapeMode::Deep));
        assert!(!wants_search_stage("", ScrapeMode::Standard));
        assert!(!wants_search_stage("mostly sandwiches", ScrapeMode::Standard));
    }

    #[test]
    fn saved_menu_carries_scrape_result_verbatim() {
        let scraped = ScrapedMenu {
            menu: vec![
                Ingredient {
                    id: "dup".to_string(),
                    name: "First".to_string(),
                    category: "A".to_string(),
                    calories: Some(100),
                    price: None,
                    description: None,
                    premium: None,
                },
                Ingredient {
                    id: "dup".to_string(),
                    name: "Second".to_string(),
                    category: "A".to_string(),
                    calories: Some(200),
                    price: None,
                    description: None,
                    premium: None,
                },
            ],
            presets: Vec::new(),
            info: None,
        };

        let version = make_saved_menu("ff-popeyes", &scraped, Some("www.x.com".to_string()));
        assert_eq!(version.restaurant_id, "ff-popeyes");
        // duplicate ids from the structuring stage are stored untouched
        assert_eq!(version.menu.len(), 2);
        assert_eq!(version.menu[0].id, version.menu[1].id);
        assert_eq!(version.source_url.as_deref(), Some("www.x.com"));
        assert!(version.timestamp > 0);
    }
}
