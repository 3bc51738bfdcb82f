//! One endpoint per bot command, plus the order-name dialogue step. Every
//! handler talks to the task loop through [`query_session`] and renders the
//! returned snapshot.

use rand::seq::SliceRandom;
use std::time::Duration;
use teloxide::{prelude::*, types::ParseMode};
use tokio::{sync::broadcast::Sender, time::sleep};

use crate::{
    constants::NO_RESTAURANT_MSG,
    data_backend::gemini,
    data_types::{
        menu_data_types::ScrapeMode, AppTask, DialogueState, DialogueType, HandlerResult,
        SessionView,
    },
    shared_main::{
        format_home_message, format_orders_message, make_home_keyboard, make_orders_keyboard,
        make_versions_keyboard, query_session, send_builder, send_item_modifications,
    },
};

/// Text after the command itself, `/wish something light` -> `something light`.
fn command_arg(text: &str) -> &str {
    text.split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .unwrap_or("")
}

pub async fn start(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let view = query_session(&task_tx, &view_tx, chat_id, AppTask::QuerySession { chat_id }).await;

    bot.send_message(msg.chat.id, format_home_message(&view))
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(make_home_keyboard(&view))
        .await?;
    Ok(())
}

pub async fn menu(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let view = query_session(&task_tx, &view_tx, chat_id, AppTask::QuerySession { chat_id }).await;
    send_builder(&bot, msg.chat.id, &view).await
}

pub async fn wish(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let wish_text = command_arg(msg.text().unwrap_or_default()).to_string();
    if wish_text.is_empty() {
        bot.send_message(
            msg.chat.id,
            "Describe what you want, e.g.\n/wish something light, no dairy",
        )
        .await?;
        return Ok(());
    }

    let view = query_session(&task_tx, &view_tx, chat_id, AppTask::QuerySession { chat_id }).await;
    let Some(restaurant) = &view.restaurant else {
        bot.send_message(msg.chat.id, NO_RESTAURANT_MSG).await?;
        return Ok(());
    };
    if view.bundle.menu.is_empty() {
        bot.send_message(msg.chat.id, "This place has no menu yet. /scrape first.")
            .await?;
        return Ok(());
    }

    let oracle_msgid = bot
        .send_message(msg.chat.id, "Consulting the menu oracle...")
        .await?
        .id;

    match gemini::parse_natural_language_order(&restaurant.name, &view.bundle.menu, &wish_text).await
    {
        Ok(suggestion) => {
            bot.edit_message_text(
                msg.chat.id,
                oracle_msgid,
                format!("💡 {}\n{}", suggestion.order_name, suggestion.reasoning),
            )
            .await?;

            // only a validated suggestion ever reaches the session
            let view = query_session(
                &task_tx,
                &view_tx,
                chat_id,
                AppTask::ApplySuggestion {
                    chat_id,
                    suggestion,
                },
            )
            .await;
            send_builder(&bot, msg.chat.id, &view).await?;
        }
        Err(e) => {
            bot.edit_message_text(msg.chat.id, oracle_msgid, e.to_string())
                .await?;
        }
    }
    Ok(())
}

pub async fn custom_item(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let text = command_arg(msg.text().unwrap_or_default()).to_string();
    if text.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /custom extra garlic sauce")
            .await?;
        return Ok(());
    }

    let view = query_session(&task_tx, &view_tx, chat_id, AppTask::QuerySession { chat_id }).await;
    if view.restaurant.is_none() {
        bot.send_message(msg.chat.id, NO_RESTAURANT_MSG).await?;
        return Ok(());
    }

    let view = query_session(
        &task_tx,
        &view_tx,
        chat_id,
        AppTask::AddCustomItem { chat_id, text },
    )
    .await;
    send_builder(&bot, msg.chat.id, &view).await
}

pub async fn save(
    bot: Bot,
    msg: Message,
    dialogue: DialogueType,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let view = query_session(&task_tx, &view_tx, chat_id, AppTask::QuerySession { chat_id }).await;

    if view.restaurant.is_none() {
        bot.send_message(msg.chat.id, NO_RESTAURANT_MSG).await?;
        return Ok(());
    }
    if view.selected_ids.is_empty() && view.custom_items.is_empty() {
        bot.send_message(
            msg.chat.id,
            "Order is empty. Select items or add manual entries first.",
        )
        .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, "Name for this order?").await?;
    dialogue.update(DialogueState::AwaitOrderName).await?;
    Ok(())
}

pub async fn reply_order_name(
    bot: Bot,
    msg: Message,
    dialogue: DialogueType,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let Some(name) = msg.text().map(str::trim).filter(|t| !t.is_empty()) else {
        bot.send_message(msg.chat.id, "Please reply with a name:")
            .await?;
        return Ok(());
    };

    let creator = msg
        .from()
        .map(|user| user.first_name.clone())
        .unwrap_or_else(|| "Guest".to_string());

    // the loop persists and confirms
    query_session(
        &task_tx,
        &view_tx,
        chat_id,
        AppTask::SaveOrder {
            chat_id,
            name: name.to_string(),
            creator,
        },
    )
    .await;

    dialogue.exit().await?;
    Ok(())
}

pub async fn orders(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let view = query_session(&task_tx, &view_tx, chat_id, AppTask::QuerySession { chat_id }).await;

    bot.send_message(msg.chat.id, format_orders_message(&view))
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(make_orders_keyboard(&view))
        .await?;
    Ok(())
}

pub async fn random_pick(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let view = query_session(&task_tx, &view_tx, chat_id, AppTask::QuerySession { chat_id }).await;

    if view.favorites.len() < 2 {
        bot.send_message(
            msg.chat.id,
            "Mark at least two favorites first (/fav <name>), otherwise there is nothing to roll.",
        )
        .await?;
        return Ok(());
    }

    let roll_msgid = bot.send_message(msg.chat.id, "🎲 Rolling...").await?.id;

    // a few fake ticks before the reveal
    let mut winner = None;
    for _ in 0..5 {
        let pick = {
            let mut rng = rand::thread_rng();
            view.favorites.choose(&mut rng).cloned()
        };
        if let Some(pick) = pick {
            _ = bot
                .edit_message_text(
                    msg.chat.id,
                    roll_msgid,
                    format!("🎲 {} {}", pick.logo, pick.name),
                )
                .await;
            winner = Some(pick);
        }
        sleep(Duration::from_millis(350)).await;
    }

    if let Some(winner) = winner {
        bot.edit_message_text(
            msg.chat.id,
            roll_msgid,
            format!("🎉 {} {} it is!", winner.logo, winner.name),
        )
        .await?;

        let view = query_session(
            &task_tx,
            &view_tx,
            chat_id,
            AppTask::SelectRestaurant {
                chat_id,
                restaurant_id: winner.id,
            },
        )
        .await;
        send_builder(&bot, msg.chat.id, &view).await?;
    }
    Ok(())
}

pub async fn scrape(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
    mode: ScrapeMode,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let hint = command_arg(msg.text().unwrap_or_default()).to_string();

    let view = query_session(&task_tx, &view_tx, chat_id, AppTask::QuerySession { chat_id }).await;
    let already_scraping = view.is_scraping;
    let Some(restaurant) = view.restaurant else {
        bot.send_message(msg.chat.id, NO_RESTAURANT_MSG).await?;
        return Ok(());
    };

    let view = query_session(
        &task_tx,
        &view_tx,
        chat_id,
        AppTask::StartScrape {
            chat_id,
            restaurant_id: restaurant.id,
            hint,
            mode,
        },
    )
    .await;

    // the loop already answers when a fetch was in flight
    if view.is_scraping && !already_scraping {
        bot.send_message(
            msg.chat.id,
            format!(
                "⏳ Fetching the menu for {}. You'll get a message when it's ready.",
                restaurant.name
            ),
        )
        .await?;
    }
    Ok(())
}

pub async fn scrape_standard(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    scrape(bot, msg, task_tx, view_tx, ScrapeMode::Standard).await
}

pub async fn scrape_deep(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    scrape(bot, msg, task_tx, view_tx, ScrapeMode::Deep).await
}

pub async fn versions(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let view = query_session(&task_tx, &view_tx, chat_id, AppTask::QuerySession { chat_id }).await;

    if view.version_options.is_empty() {
        bot.send_message(msg.chat.id, "No stored menu versions for this place.")
            .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, "Pick a menu version:")
        .reply_markup(make_versions_keyboard(&view))
        .await?;
    Ok(())
}

pub async fn add_restaurant(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let arg = command_arg(msg.text().unwrap_or_default());
    if arg.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /add Lucy's Kitchen; 12 Main St")
            .await?;
        return Ok(());
    }

    // everything after a semicolon is treated as the address
    let (name, address) = match arg.split_once(';') {
        Some((name, address)) => (name.trim(), Some(address.trim().to_string())),
        None => (arg, None),
    };

    query_session(
        &task_tx,
        &view_tx,
        chat_id,
        AppTask::AddRestaurant {
            chat_id,
            name: name.to_string(),
            address,
        },
    )
    .await;
    Ok(())
}

pub async fn toggle_favorite(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let needle = command_arg(msg.text().unwrap_or_default()).to_lowercase();
    if needle.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /fav popeyes").await?;
        return Ok(());
    }

    let view = query_session(&task_tx, &view_tx, chat_id, AppTask::QuerySession { chat_id }).await;
    let Some(restaurant) = view
        .favorites
        .iter()
        .chain(view.explore.iter())
        .find(|r| r.name.to_lowercase().contains(&needle))
        .cloned()
    else {
        bot.send_message(msg.chat.id, "No restaurant by that name.")
            .await?;
        return Ok(());
    };

    let view = query_session(
        &task_tx,
        &view_tx,
        chat_id,
        AppTask::ToggleFavorite {
            chat_id,
            restaurant_id: restaurant.id.clone(),
        },
    )
    .await;

    let is_favorite = view.favorites.iter().any(|r| r.id == restaurant.id);
    bot.send_message(
        msg.chat.id,
        if is_favorite {
            format!("⭐ {} added to favorites.", restaurant.name)
        } else {
            format!("{} removed from favorites.", restaurant.name)
        },
    )
    .await?;
    Ok(())
}

pub async fn item_mods(
    bot: Bot,
    msg: Message,
    task_tx: Sender<AppTask>,
    view_tx: Sender<SessionView>,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let query = command_arg(msg.text().unwrap_or_default()).to_string();
    if query.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /mods falafel").await?;
        return Ok(());
    }

    let view = query_session(&task_tx, &view_tx, chat_id, AppTask::QuerySession { chat_id }).await;
    send_item_modifications(&bot, msg.chat.id, &view, &query).await
}

pub async fn invalid_cmd(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, "Unknown command, see /start.")
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_arg_strips_command_and_whitespace() {
        assert_eq!(command_arg("/wish something light"), "something light");
        assert_eq!(command_arg("/scrape  https://x.com/menu "), "https://x.com/menu");
        assert_eq!(command_arg("/save"), "");
        assert_eq!(command_arg(""), "");
    }
}
