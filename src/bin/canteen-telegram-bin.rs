use canteen_telegram_rs::app_state::{spawn_state_task, AppState};
use canteen_telegram_rs::bot_command_handlers::{
    admin, admin_photo, coupon, help, history, invalid_cmd, logout, menu_edit_cmd, plate_cmd,
    receive_email, receive_phone, report, show_menu, special, start,
};
use canteen_telegram_rs::constants::{DEFAULT_TOTAL_EMPLOYEES, HISTORY_DAYS, SEEDED_TODAY_USERS};
use canteen_telegram_rs::cutoff::order_date;
use canteen_telegram_rs::data_types::{canteen_data_types::Employee, Command, DialogueState};
use canteen_telegram_rs::gemini::GeminiClient;
use canteen_telegram_rs::menu::Menu;
use canteen_telegram_rs::shared_main::{callback_handler, logger_init};
use canteen_telegram_rs::simulation::{create_dummy_selections, dummy_employees, seed_history};
use canteen_telegram_rs::task_scheduler_funcs::run_task_scheduler;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::log_enabled;
use rand::{rngs::StdRng, SeedableRng};
use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        UpdateHandler,
    },
    prelude::*,
};

/// Telegram bot for ordering tomorrow's canteen meals.
/// {n}Selections lock every day at 21:00 local time.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// The telegram bot token to be used
    #[arg(short, long, env = "TELOXIDE_TOKEN")]
    token: String,
    /// Gemini API key for the chef's special and image edits{n}Without it the house special is served
    #[arg(short, long, env = "API_KEY")]
    api_key: Option<String>,
    /// Head count used for the opt-out rate and the dummy employees
    #[arg(short, long, env = "CANTEEN_EMPLOYEES", default_value_t = DEFAULT_TOTAL_EMPLOYEES)]
    employees: usize,
    /// Inject a synthetic order every 4 seconds until every dummy employee answered
    #[arg(short, long)]
    simulate: bool,
    /// Start without seeded history and orders
    #[arg(long)]
    no_demo_data: bool,
    /// Enable verbose logging{n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    verbose: bool,
}

fn seeded_state(employees: &[Employee], total: usize) -> Result<AppState> {
    let menu = Menu::default();
    let mut state = AppState::new(menu.clone(), total);

    let now = chrono::Local::now().naive_local();
    let date = order_date(now);
    let mut rng = StdRng::from_entropy();

    let history = seed_history(employees, &menu, now.date(), HISTORY_DAYS, &mut rng);
    let today_users = &employees[..SEEDED_TODAY_USERS.min(employees.len())];
    let current = create_dummy_selections(today_users, &menu, date, &mut rng);

    log::info!(
        "Seeded {} past selections and {} for {}",
        history.len(),
        current.len(),
        date
    );
    state.seed(history, current)?;

    Ok(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    //// Args setup
    let args = Args::parse();

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    logger_init(module_path!());
    log::info!("Starting bot...");

    if !(log_enabled!(log::Level::Debug) || log_enabled!(log::Level::Trace)) {
        log::info!("Enable verbose logging for state transitions");
    }

    let gemini = GeminiClient::new(args.api_key);
    if !gemini.is_configured() {
        log::warn!("API_KEY is not set, the chef's special falls back to the house dish");
    }

    //// State setup
    let employees = Arc::new(dummy_employees(args.employees));
    let state = if args.no_demo_data {
        AppState::new(Menu::default(), args.employees)
    } else {
        seeded_state(&employees, args.employees)?
    };
    let state_handle = spawn_state_task(state);

    let bot = Bot::new(args.token);

    // keep the scheduler alive for the whole run
    let _sched = {
        log::info!("Starting task scheduler...");
        run_task_scheduler(
            bot.clone(),
            state_handle.clone(),
            args.simulate.then(|| employees.clone()),
        )
        .await?
    };

    let command_handler_deps = dptree::deps![
        InMemStorage::<DialogueState>::new(),
        state_handle,
        gemini
    ];
    Dispatcher::builder(bot, schema())
        .dependencies(command_handler_deps)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(start))
        .branch(case![Command::Admin].endpoint(admin))
        .branch(case![Command::Logout].endpoint(logout))
        .branch(case![Command::Menu].endpoint(show_menu))
        .branch(case![Command::Plate].endpoint(plate_cmd))
        .branch(case![Command::Confirm].endpoint(plate_cmd))
        .branch(case![Command::Optout].endpoint(plate_cmd))
        .branch(case![Command::Modify].endpoint(plate_cmd))
        .branch(case![Command::Coupon].endpoint(coupon))
        .branch(case![Command::Special].endpoint(special))
        .branch(case![Command::Report].endpoint(report))
        .branch(case![Command::History].endpoint(history))
        .branch(case![Command::MenuAdd(arg)].endpoint(menu_edit_cmd))
        .branch(case![Command::MenuEdit(arg)].endpoint(menu_edit_cmd))
        .branch(case![Command::MenuDelete(arg)].endpoint(menu_edit_cmd))
        .branch(case![Command::Help].endpoint(help));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![DialogueState::AwaitEmail].endpoint(receive_email))
        .branch(case![DialogueState::AwaitPhone { email }].endpoint(receive_phone))
        .branch(dptree::filter(|msg: Message| msg.photo().is_some()).endpoint(admin_photo))
        .branch(dptree::endpoint(invalid_cmd));

    let callback_query_handler = Update::filter_callback_query().endpoint(callback_handler);

    dialogue::enter::<Update, InMemStorage<DialogueState>, DialogueState, _>()
        .branch(message_handler)
        .branch(callback_query_handler)
}
