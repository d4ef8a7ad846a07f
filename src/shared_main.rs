use std::env;

use teloxide::prelude::*;
use teloxide_core::Bot;

use crate::app_state::{ActionOutcome, StateHandle, StoreAction};
use crate::bot_command_handlers::handle_plate_action;
use crate::data_types::{HandlerResult, PlateCallback};

pub fn logger_init(module: &str) {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module(
            module,
            if env::var(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV).unwrap_or_default()
                == "debug"
            {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        )
        .init();
}

pub async fn callback_handler(bot: Bot, q: CallbackQuery, state: StateHandle) -> HandlerResult {
    let Some(q_data) = q.data else {
        return Ok(());
    };

    let action = match q_data.parse::<PlateCallback>() {
        Ok(action) => action,
        Err(e) => {
            log::warn!("Ignoring callback query: {}", e);
            bot.answer_callback_query(q.id).await?;
            return Ok(());
        }
    };

    let Some(message) = q.message else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let chat_id = message.chat.id;

    let chat = chat_id.0;
    let plate_action = match action {
        // picks come from the menu message, which stays as it is
        PlateCallback::Pick(item_id) => {
            let pick = StoreAction::PickItem {
                chat_id: chat,
                item_id,
            };
            match state.dispatch(pick).await? {
                Ok(ActionOutcome::Plate(view)) => {
                    let added = view
                        .plate
                        .items
                        .iter()
                        .find(|i| i.id == item_id)
                        .map(|i| i.name.as_str())
                        .unwrap_or("Item");
                    bot.answer_callback_query(q.id)
                        .text(format!("{} is on your plate (/plate)", added))
                        .await?;
                }
                Ok(other) => {
                    log::error!("Unexpected outcome for a pick: {:?}", other);
                    bot.answer_callback_query(q.id).await?;
                }
                Err(e) => {
                    bot.answer_callback_query(q.id)
                        .text(e.to_string())
                        .show_alert(true)
                        .await?;
                }
            }
            return Ok(());
        }
        PlateCallback::Drop(item_id) => StoreAction::DropItem {
            chat_id: chat,
            item_id,
        },
        PlateCallback::Confirm => StoreAction::Confirm { chat_id: chat },
        PlateCallback::OptOut => StoreAction::OptOut { chat_id: chat },
        PlateCallback::Modify => StoreAction::Modify { chat_id: chat },
    };

    // acknowledge callback query to remove the loading alert
    bot.answer_callback_query(q.id).await?;
    handle_plate_action(&bot, chat_id, &state, plate_action, Some(message.id)).await?;

    Ok(())
}
