use anyhow::Context;
use clap::Parser;
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
};
use tokio::sync::broadcast;

use hickory_telegram_rs::{
    app_state::AppState,
    bot_command_handlers,
    constants::{DB_FILENAME, DEFAULT_GEMINI_MODEL, GEMINI_API_KEY, GEMINI_MODEL, HICKORY_DB},
    data_types::{AppTaskType, Command, DialogueState, SessionViewType},
    db_operations, shared_main,
    task_handler_funcs::run_task_loop,
};

/// Telegram bot for group food ordering: pick a restaurant, build an order
/// from its menu, let AI fetch menus for places it doesn't know.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Telegram bot token
    #[arg(short, long, env = "TELOXIDE_TOKEN", hide_env_values = true)]
    token: String,
    /// Gemini API key. AI features degrade gracefully without it.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_key: Option<String>,
    /// Gemini model id
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    gemini_model: String,
    /// SQLite database file
    #[arg(long, default_value = HICKORY_DB)]
    db: String,
    /// Debug logging for this crate
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    shared_main::logger_init("hickory_telegram_rs", args.verbose);
    log::info!("Starting order bot...");

    DB_FILENAME.set(args.db.clone()).unwrap();
    GEMINI_API_KEY.set(args.gemini_key).unwrap();
    GEMINI_MODEL.set(args.gemini_model).unwrap();

    if GEMINI_API_KEY.get().unwrap().is_none() {
        log::warn!("No Gemini API key set, /wish and /scrape will be unavailable");
    }

    db_operations::check_or_create_db_tables(&args.db)
        .with_context(|| format!("failed to open database '{}'", args.db))?;

    // best-effort loads, a broken db should not keep the bot down
    let custom_restaurants = db_operations::get_custom_restaurants(&args.db).unwrap_or_else(|e| {
        log::warn!("could not load custom restaurants: {e}");
        Vec::new()
    });
    let saved_versions = db_operations::get_all_menu_versions(&args.db).unwrap_or_else(|e| {
        log::warn!("could not load menu versions: {e}");
        Default::default()
    });
    let orders = db_operations::get_orders(&args.db).unwrap_or_else(|e| {
        log::warn!("could not load orders: {e}");
        Vec::new()
    });
    log::info!(
        "Loaded {} custom restaurant(s), {} order(s)",
        custom_restaurants.len(),
        orders.len()
    );

    let state = AppState::new(custom_restaurants, saved_versions, orders);

    let (task_tx, task_rx): AppTaskType = broadcast::channel(64);
    let (view_tx, _): SessionViewType = broadcast::channel(64);

    let bot = Bot::new(args.token);

    {
        let bot = bot.clone();
        let task_tx = task_tx.clone();
        let view_tx = view_tx.clone();
        tokio::spawn(async move {
            run_task_loop(bot, state, task_rx, task_tx, view_tx).await;
        });
    }

    let command_branch = dptree::entry()
        .filter_command::<Command>()
        .branch(dptree::case![Command::Start].endpoint(bot_command_handlers::start))
        .branch(dptree::case![Command::Menu].endpoint(bot_command_handlers::menu))
        .branch(dptree::case![Command::Wish].endpoint(bot_command_handlers::wish))
        .branch(dptree::case![Command::Custom].endpoint(bot_command_handlers::custom_item))
        .branch(dptree::case![Command::Save].endpoint(bot_command_handlers::save))
        .branch(dptree::case![Command::Orders].endpoint(bot_command_handlers::orders))
        .branch(dptree::case![Command::Random].endpoint(bot_command_handlers::random_pick))
        .branch(dptree::case![Command::Scrape].endpoint(bot_command_handlers::scrape_standard))
        .branch(dptree::case![Command::Deepscrape].endpoint(bot_command_handlers::scrape_deep))
        .branch(dptree::case![Command::Versions].endpoint(bot_command_handlers::versions))
        .branch(dptree::case![Command::Add].endpoint(bot_command_handlers::add_restaurant))
        .branch(dptree::case![Command::Fav].endpoint(bot_command_handlers::toggle_favorite))
        .branch(dptree::case![Command::Mods].endpoint(bot_command_handlers::item_mods));

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .enter_dialogue::<Message, InMemStorage<DialogueState>, DialogueState>()
                .branch(command_branch)
                .branch(
                    dptree::case![DialogueState::AwaitOrderName]
                        .endpoint(bot_command_handlers::reply_order_name),
                )
                .branch(
                    dptree::filter(|msg: Message| {
                        msg.text().is_some_and(|t| t.starts_with('/'))
                    })
                    .endpoint(bot_command_handlers::invalid_cmd),
                ),
        )
        .branch(Update::filter_callback_query().endpoint(shared_main::callback_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            task_tx,
            view_tx,
            InMemStorage::<DialogueState>::new()
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
