//! Rendering and plumbing shared by the command and callback handlers:
//! keyboard builders, message formatting, and the session query helper.

use chrono::{TimeZone, Utc};
use std::{env, error::Error};
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
    utils::markdown,
};
use tokio::sync::broadcast::Sender;

use crate::{
    data_backend::{escape_markdown_v2, gemini},
    data_types::{
        menu_data_types::{MenuVersion, Restaurant},
        AppTask, CategoryFilter, SessionView,
    },
};

pub fn logger_init(module_path: &'static str, verbose: bool) {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module(
            module_path,
            if verbose
                || env::var(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV).unwrap_or_default()
                    == "debug"
            {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        )
        .init();
}

/// Sends a task and waits for the loop's reply snapshot. Replies carry the
/// chat id so concurrent chats never steal each other's snapshot.
pub async fn query_session(
    task_tx: &Sender<AppTask>,
    view_tx: &Sender<SessionView>,
    chat_id: i64,
    task: AppTask,
) -> SessionView {
    // subscribe before sending, otherwise the reply can slip past
    let mut view_rx = view_tx.subscribe();
    task_tx.send(task).unwrap();

    loop {
        let view = view_rx.recv().await.unwrap();
        if view.chat_id == chat_id {
            return view;
        }
    }
}

fn restaurant_button(restaurant: &Restaurant) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(
        format!("{} {}", restaurant.logo, restaurant.name),
        format!("r:{}", restaurant.id),
    )
}

pub fn make_home_keyboard(view: &SessionView) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    for pair in view.favorites.chunks(2) {
        keyboard.push(pair.iter().map(restaurant_button).collect());
    }
    for pair in view.explore.chunks(2) {
        keyboard.push(pair.iter().map(restaurant_button).collect());
    }

    InlineKeyboardMarkup::new(keyboard)
}

/// Distinct categories of the active menu, first-seen order.
fn menu_categories(view: &SessionView) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for item in &view.bundle.menu {
        if !categories.contains(&item.category) {
            categories.push(item.category.clone());
        }
    }
    categories
}

pub fn make_builder_keyboard(view: &SessionView) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    keyboard.push(vec![
        InlineKeyboardButton::callback(
            if view.category_filter == CategoryFilter::Presets {
                "• Presets"
            } else {
                "Presets"
            },
            "c:presets",
        ),
        InlineKeyboardButton::callback(
            if view.category_filter == CategoryFilter::All {
                "• All"
            } else {
                "All"
            },
            "c:all",
        ),
    ]);

    for pair in menu_categories(view).chunks(3) {
        keyboard.push(
            pair.iter()
                .map(|category| {
                    let label = if view.category_filter == CategoryFilter::Category(category.clone())
                    {
                        format!("• {category}")
                    } else {
                        category.clone()
                    };
                    InlineKeyboardButton::callback(label, format!("c:{category}"))
                })
                .collect(),
        );
    }

    match &view.category_filter {
        CategoryFilter::Presets => {
            for (idx, preset) in view.bundle.presets.iter().enumerate() {
                keyboard.push(vec![InlineKeyboardButton::callback(
                    format!("🍽 {}", preset.name),
                    format!("p:{idx}"),
                )]);
            }
        }
        filter => {
            let items = view.bundle.menu.iter().filter(|i| match filter {
                CategoryFilter::All => true,
                CategoryFilter::Category(c) => &i.category == c,
                CategoryFilter::Presets => unreachable!(),
            });
            let buttons: Vec<InlineKeyboardButton> = items
                .map(|item| {
                    let marker = if view.selected_ids.contains(&item.id) {
                        "✅ "
                    } else {
                        ""
                    };
                    InlineKeyboardButton::callback(
                        format!("{marker}{}", item.name),
                        format!("i:{}", item.id),
                    )
                })
                .collect();
            for pair in buttons.chunks(2) {
                keyboard.push(pair.to_vec());
            }
        }
    }

    let mut bottom = Vec::new();
    if !view.selected_ids.is_empty() || !view.custom_items.is_empty() {
        bottom.push(InlineKeyboardButton::callback("🗑 Clear", "x:-"));
    }
    if view.version_options.len() > 1 {
        bottom.push(InlineKeyboardButton::callback("🕓 Versions", "vk:-"));
    }
    if !bottom.is_empty() {
        keyboard.push(bottom);
    }

    InlineKeyboardMarkup::new(keyboard)
}

pub fn make_versions_keyboard(view: &SessionView) -> InlineKeyboardMarkup {
    let mut keyboard = Vec::new();
    for option in &view.version_options {
        let data = match &option.version {
            MenuVersion::System => "v:sys".to_string(),
            MenuVersion::Saved(id) => format!("v:{id}"),
            MenuVersion::Pending => continue,
        };
        let marker = if option.version == view.version {
            "• "
        } else {
            ""
        };
        keyboard.push(vec![InlineKeyboardButton::callback(
            format!("{marker}{}", option.label),
            data,
        )]);
    }
    InlineKeyboardMarkup::new(keyboard)
}

pub fn make_orders_keyboard(view: &SessionView) -> InlineKeyboardMarkup {
    let mut keyboard = Vec::new();
    for order in &view.orders {
        keyboard.push(vec![
            InlineKeyboardButton::callback(format!("📋 {}", order.name), format!("ol:{}", order.id)),
            InlineKeyboardButton::callback("🗑", format!("od:{}", order.id)),
        ]);
    }
    InlineKeyboardMarkup::new(keyboard)
}

pub fn format_home_message(view: &SessionView) -> String {
    let mut msg = format!("{}\n", markdown::bold("Where are we ordering from?"));
    if !view.favorites.is_empty() {
        msg.push_str(&format!(
            "\n{}\n",
            markdown::underline(&escape_markdown_v2("Favorites"))
        ));
        for r in &view.favorites {
            msg.push_str(&escape_markdown_v2(&format!("{} {}\n", r.logo, r.name)));
        }
    }
    if let Some(latest) = view.orders.first() {
        msg.push_str(&escape_markdown_v2(&format!(
            "\nLast saved order: \"{}\" - /orders\n",
            latest.name
        )));
    }
    msg.push_str(&escape_markdown_v2(
        "\nEverything else is below. /add <name> to add your own.",
    ));
    msg
}

fn version_label(view: &SessionView) -> String {
    match &view.version {
        MenuVersion::Pending => "No menu yet".to_string(),
        version => view
            .version_options
            .iter()
            .find(|o| &o.version == version)
            .map(|o| o.label.clone())
            .unwrap_or_else(|| "Unknown version".to_string()),
    }
}

pub fn format_builder_message(view: &SessionView) -> String {
    let Some(restaurant) = &view.restaurant else {
        return escape_markdown_v2("No restaurant selected. Use /start to pick one.");
    };

    let mut msg = format!(
        "{} {}\n{}\n",
        restaurant.logo,
        markdown::bold(&escape_markdown_v2(&restaurant.name)),
        markdown::italic(&escape_markdown_v2(&version_label(view)))
    );

    if view.is_scraping {
        msg.push_str(&escape_markdown_v2(
            "\n⏳ Fetching the menu, this takes a moment...\n",
        ));
        return msg;
    }

    if view.version == MenuVersion::Pending {
        msg.push_str(&escape_markdown_v2(
            "\nNo menu data for this place yet.\n\
             /scrape - fetch it with AI (add a URL for better results)\n\
             /deepscrape - slower, search-grounded fetch",
        ));
        return msg;
    }

    if view.selected_ids.is_empty() && view.custom_items.is_empty() {
        msg.push_str(&escape_markdown_v2("\nNothing picked yet."));
    } else {
        msg.push_str(&markdown::underline(&escape_markdown_v2("\nYour order:")));
        msg.push('\n');
        for id in &view.selected_ids {
            match view.bundle.menu.iter().find(|i| &i.id == id) {
                Some(item) => {
                    let calories = item
                        .calories
                        .map(|c| format!(" ({c} cal)"))
                        .unwrap_or_default();
                    msg.push_str(&escape_markdown_v2(&format!(
                        "· {}{}\n",
                        item.name, calories
                    )));
                }
                // stale id from another menu version
                None => msg.push_str(&escape_markdown_v2(&format!("· {id} (?)\n"))),
            }
        }
        for (idx, custom) in view.custom_items.iter().enumerate() {
            msg.push_str(&escape_markdown_v2(&format!("· {custom} ✏️ ({})\n", idx + 1)));
        }
        msg.push_str(&escape_markdown_v2(&format!(
            "\nTotal: ~{} cal",
            view.total_calories
        )));
    }

    msg.push_str(&escape_markdown_v2("\n\n/save to save, /wish to let AI pick."));
    msg
}

pub fn format_orders_message(view: &SessionView) -> String {
    if view.orders.is_empty() {
        return escape_markdown_v2("No saved orders yet. Build one and /save it.");
    }

    let mut msg = format!("{}\n", markdown::bold(&escape_markdown_v2("Saved orders")));
    for order in &view.orders {
        let date = Utc
            .timestamp_millis_opt(order.timestamp)
            .single()
            .map(|t| t.format("%d.%m.%Y").to_string())
            .unwrap_or_default();
        let total = order.items.len() + order.custom_items.len();
        msg.push_str(&escape_markdown_v2(&format!(
            "\n📋 {} - {} item(s)\nby {}, {}\n",
            order.name, total, order.creator, date
        )));
    }
    msg.push_str(&escape_markdown_v2("\nTap to load, 🗑 to delete."));
    msg
}

pub async fn send_builder(
    bot: &Bot,
    chat_id: ChatId,
    view: &SessionView,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    bot.send_message(chat_id, format_builder_message(view))
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(make_builder_keyboard(view))
        .await?;
    Ok(())
}

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(q_data) = q.data else {
        return Ok(());
    };

    // acknowledge callback query to remove the loading alert
    bot.answer_callback_query(q.id).await?;

    let Some(Message { id, chat, .. }) = q.message else {
        return Ok(());
    };
    let chat_id = chat.id.0;

    let Some((cmd, arg)) = q_data.split_once(':') else {
        log::error!("malformed callback data: {q_data}");
        return Ok(());
    };

    let task = match cmd {
        "r" => AppTask::SelectRestaurant {
            chat_id,
            restaurant_id: arg.to_string(),
        },
        "i" => AppTask::ToggleItem {
            chat_id,
            item_id: arg.to_string(),
        },
        "p" => AppTask::ApplyPreset {
            chat_id,
            preset_index: arg.parse().unwrap_or(usize::MAX),
        },
        "c" => AppTask::SetCategoryFilter {
            chat_id,
            filter: match arg {
                "presets" => CategoryFilter::Presets,
                "all" => CategoryFilter::All,
                category => CategoryFilter::Category(category.to_string()),
            },
        },
        "x" => AppTask::ClearSelection { chat_id },
        "v" => AppTask::SetActiveVersion {
            chat_id,
            version: if arg == "sys" {
                MenuVersion::System
            } else {
                MenuVersion::Saved(arg.to_string())
            },
        },
        "vk" => {
            let view =
                query_session(&task_tx, &view_tx, chat_id, AppTask::QuerySession { chat_id }).await;
            bot.send_message(chat.id, escape_markdown_v2("Pick a menu version:"))
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(make_versions_keyboard(&view))
                .await?;
            return Ok(());
        }
        "ol" => AppTask::LoadOrder {
            chat_id,
            order_id: arg.to_string(),
        },
        "od" => AppTask::DeleteOrder {
            chat_id,
            order_id: arg.to_string(),
        },
        "f" => AppTask::ToggleFavorite {
            chat_id,
            restaurant_id: arg.to_string(),
        },
        unknown => {
            log::error!("unknown callback command: {unknown}");
            return Ok(());
        }
    };

    let view = query_session(&task_tx, &view_tx, chat_id, task).await;

    match cmd {
        "od" => {
            bot.edit_message_text(chat.id, id, format_orders_message(&view))
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(make_orders_keyboard(&view))
                .await?;
        }
        "ol" | "r" => {
            // fresh builder message below the menu the user tapped in
            send_builder(&bot, chat.id, &view).await?;
        }
        "f" => {
            bot.edit_message_text(chat.id, id, format_home_message(&view))
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(make_home_keyboard(&view))
                .await?;
        }
        _ => {
            bot.edit_message_text(chat.id, id, format_builder_message(&view))
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(make_builder_keyboard(&view))
                .await?;
        }
    }

    Ok(())
}

/// `/mods <item name>`: asks the model for common tweaks to one item.
pub async fn send_item_modifications(
    bot: &Bot,
    chat_id: ChatId,
    view: &SessionView,
    item_query: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(restaurant) = &view.restaurant else {
        bot.send_message(chat_id, crate::constants::NO_RESTAURANT_MSG)
            .await?;
        return Ok(());
    };

    let needle = item_query.to_lowercase();
    let Some(item) = view
        .bundle
        .menu
        .iter()
        .find(|i| i.name.to_lowercase().contains(&needle))
    else {
        bot.send_message(chat_id, "No such item on the current menu.")
            .await?;
        return Ok(());
    };

    match gemini::item_modifications(&restaurant.name, &item.name).await {
        Ok(mods) if !mods.is_empty() => {
            let mut msg = format!("Common tweaks for {}:\n", item.name);
            for m in mods {
                msg.push_str(&format!("· {m}\n"));
            }
            msg.push_str("\nAdd one with /custom.");
            bot.send_message(chat_id, msg).await?;
        }
        Ok(_) => {
            bot.send_message(chat_id, "No suggestions for this one.")
                .await?;
        }
        Err(e) => {
            bot.send_message(chat_id, e.to_string()).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::menu_data_types::{Ingredient, MenuBundle, Order};

    fn test_view() -> SessionView {
        SessionView {
            chat_id: 1,
            restaurant: Some(Restaurant {
                id: "cava".to_string(),
                name: "Cava".to_string(),
                logo: "🥙".to_string(),
                color: "orange".to_string(),
                url: None,
                menu: Vec::new(),
                presets: Vec::new(),
                address: None,
                phone_number: None,
                rating: None,
                delivery_apps: None,
            }),
            version: MenuVersion::System,
            bundle: MenuBundle {
                menu: vec![
                    Ingredient {
                        id: "a".to_string(),
                        name: "Rice".to_string(),
                        category: "Base".to_string(),
                        calories: Some(190),
                        price: None,
                        description: None,
                        premium: None,
                    },
                    Ingredient {
                        id: "b".to_string(),
                        name: "Chicken".to_string(),
                        category: "Protein".to_string(),
                        calories: Some(230),
                        price: None,
                        description: None,
                        premium: None,
                    },
                ],
                presets: Vec::new(),
            },
            selected_ids: vec!["a".to_string(), "ghost".to_string()],
            custom_items: vec!["extra pita".to_string()],
            category_filter: CategoryFilter::All,
            total_calories: 190,
            version_options: Vec::new(),
            is_scraping: false,
            favorites: Vec::new(),
            explore: Vec::new(),
            orders: Vec::new(),
        }
    }

    #[test]
    fn builder_message_lists_selection_and_flags_stale_ids() {
        let msg = format_builder_message(&test_view());
        assert!(msg.contains("Rice"));
        assert!(msg.contains("ghost"));
        assert!(msg.contains("extra pita"));
        assert!(msg.contains("190"));
    }

    #[test]
    fn builder_message_shows_acquisition_flow_when_pending() {
        let mut view = test_view();
        view.version = MenuVersion::Pending;
        let msg = format_builder_message(&view);
        assert!(msg.contains("scrape"));

        view.is_scraping = true;
        let msg = format_builder_message(&view);
        assert!(msg.contains("Fetching"));
    }

    #[test]
    fn builder_keyboard_marks_selected_items() {
        let keyboard = make_builder_keyboard(&test_view());
        let labels: Vec<String> = keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|b| b.text.clone())
            .collect();
        assert!(labels.iter().any(|l| l == "✅ Rice"));
        assert!(labels.iter().any(|l| l == "Chicken"));
        assert!(labels.iter().any(|l| l == "🗑 Clear"));
    }

    #[test]
    fn category_row_covers_each_category_once() {
        let view = test_view();
        let categories = menu_categories(&view);
        assert_eq!(categories, vec!["Base", "Protein"]);
    }

    #[test]
    fn orders_message_counts_custom_items() {
        let mut view = test_view();
        view.orders = vec![Order {
            id: "o1".to_string(),
            restaurant_id: "cava".to_string(),
            name: "friday".to_string(),
            creator: "Sam".to_string(),
            items: vec!["a".to_string()],
            custom_items: vec!["napkins".to_string()],
            timestamp: 1_700_000_000_000,
        }];
        let msg = format_orders_message(&view);
        assert!(msg.contains("friday"));
        assert!(msg.contains("2 item"));
    }
}
