use teloxide::{
    net::Download,
    prelude::*,
    types::{InputFile, MessageId, ParseMode},
    utils::command::BotCommands,
};

use crate::app_state::{ActionOutcome, StateHandle, StoreAction};
use crate::bot_command_helpers::{
    make_admin_keyrow, make_commands_keyrow, make_menu_keyboard, make_plate_keyboard,
    parse_menu_add, parse_menu_delete, parse_menu_edit,
};
use crate::coupon::Coupon;
use crate::data_types::{Command, DialogueState, DialogueType, HandlerResult};
use crate::gemini::GeminiClient;
use crate::login::{admin_identity, employee_login, validate_email};
use crate::message_builder::{
    daily_report_msg, history_msg, menu_item_saved_msg, menu_msg, plate_msg, special_msg,
};
use crate::notifications::{notify_confirmed, notify_opted_out};

/// Applies the action; rejections are answered in the chat and come back as `None`
async fn dispatch_or_reply(
    bot: &Bot,
    chat_id: ChatId,
    state: &StateHandle,
    action: StoreAction,
) -> Result<Option<ActionOutcome>, Box<dyn std::error::Error + Send + Sync>> {
    match state.dispatch(action).await? {
        Ok(outcome) => Ok(Some(outcome)),
        Err(e) => {
            bot.send_message(chat_id, e.to_string()).await?;
            Ok(None)
        }
    }
}

pub async fn send_coupon(bot: &Bot, chat_id: ChatId, coupon: &Coupon) -> HandlerResult {
    let caption = format!(
        "Meal coupon for {}\n{}\n{}",
        coupon.name,
        coupon.date.format("%A, %d.%m.%Y"),
        coupon.items.join(", ")
    );

    match coupon.fetch_qr().await {
        Ok(png) => {
            bot.send_photo(chat_id, InputFile::memory(png).file_name("coupon.png"))
                .caption(caption)
                .await?;
        }
        Err(e) => {
            log::warn!("QR code for {} failed: {}", coupon.email, e);
            bot.send_message(chat_id, format!("{}\n\nThe QR code could not be generated: {}", caption, e))
                .await?;
        }
    }

    Ok(())
}

/// Shared by the plate commands and the inline plate buttons.
/// With `edit` set, the plate message is updated in place.
pub async fn handle_plate_action(
    bot: &Bot,
    chat_id: ChatId,
    state: &StateHandle,
    action: StoreAction,
    edit: Option<MessageId>,
) -> HandlerResult {
    let opting_out = matches!(action, StoreAction::OptOut { .. });

    let Some(outcome) = dispatch_or_reply(bot, chat_id, state, action).await? else {
        return Ok(());
    };

    let (view, coupon) = match outcome {
        ActionOutcome::Plate(view) => (view, None),
        ActionOutcome::Confirmed { view, coupon } => (view, Some(coupon)),
        other => {
            log::error!("Unexpected outcome for a plate action: {:?}", other);
            return Ok(());
        }
    };

    let text = plate_msg(&view);
    let keyboard = make_plate_keyboard(&view);
    match edit {
        Some(message_id) => {
            let mut req = bot
                .edit_message_text(chat_id, message_id, text)
                .parse_mode(ParseMode::MarkdownV2);
            if let Some(keyboard) = keyboard {
                req = req.reply_markup(keyboard);
            }
            req.await?;
        }
        None => {
            let mut req = bot.send_message(chat_id, text).parse_mode(ParseMode::MarkdownV2);
            if let Some(keyboard) = keyboard {
                req = req.reply_markup(keyboard);
            }
            req.await?;
        }
    }

    if let Some(coupon) = coupon {
        notify_confirmed(&view.employee);
        send_coupon(bot, chat_id, &coupon).await?;
    } else if opting_out {
        notify_opted_out(&view.employee);
    }

    Ok(())
}

pub async fn start(bot: Bot, msg: Message, dialogue: DialogueType) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Welcome to the canteen!\nPlease send your @gmail.com email address:",
    )
    .await?;
    dialogue.update(DialogueState::AwaitEmail).await?;
    Ok(())
}

pub async fn receive_email(bot: Bot, msg: Message, dialogue: DialogueType) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "That is not text.\nPlease send your email address:")
            .await?;
        return Ok(());
    };

    match validate_email(text) {
        Ok(email) => {
            bot.send_message(msg.chat.id, "Thanks! Now your phone number:")
                .await?;
            dialogue.update(DialogueState::AwaitPhone { email }).await?;
        }
        Err(e) => {
            bot.send_message(msg.chat.id, format!("{}\nPlease try again:", e))
                .await?;
        }
    }

    Ok(())
}

pub async fn receive_phone(
    bot: Bot,
    msg: Message,
    dialogue: DialogueType,
    email: String,
    state: StateHandle,
) -> HandlerResult {
    let phone = msg.text().unwrap_or_default();

    let employee = match employee_login(&email, phone) {
        Ok(employee) => employee,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("{}\nPlease try again:", e))
                .await?;
            return Ok(());
        }
    };
    dialogue.exit().await?;

    let name = employee.name.clone();
    let Some(ActionOutcome::LoggedIn(view)) = dispatch_or_reply(
        &bot,
        msg.chat.id,
        &state,
        StoreAction::Login {
            chat_id: msg.chat.id.0,
            employee,
        },
    )
    .await?
    else {
        return Ok(());
    };

    bot.send_message(
        msg.chat.id,
        format!(
            "Hello {}! Pick tomorrow's meals from the /menu before 9:00 PM.",
            name
        ),
    )
    .reply_markup(make_commands_keyrow())
    .await?;

    let mut req = bot
        .send_message(msg.chat.id, plate_msg(&view))
        .parse_mode(ParseMode::MarkdownV2);
    if let Some(keyboard) = make_plate_keyboard(&view) {
        req = req.reply_markup(keyboard);
    }
    req.await?;

    Ok(())
}

pub async fn admin(bot: Bot, msg: Message, state: StateHandle) -> HandlerResult {
    let action = StoreAction::AdminLogin {
        chat_id: msg.chat.id.0,
    };
    if dispatch_or_reply(&bot, msg.chat.id, &state, action)
        .await?
        .is_some()
    {
        bot.send_message(
            msg.chat.id,
            format!(
                "Logged in as {}.\n\nSend a photo with a caption to have it edited.",
                admin_identity().name
            ),
        )
        .reply_markup(make_admin_keyrow())
        .await?;
    }
    Ok(())
}

pub async fn logout(bot: Bot, msg: Message, state: StateHandle) -> HandlerResult {
    let action = StoreAction::Logout {
        chat_id: msg.chat.id.0,
    };
    if dispatch_or_reply(&bot, msg.chat.id, &state, action)
        .await?
        .is_some()
    {
        bot.send_message(msg.chat.id, "Logged out. /start to log in again.")
            .await?;
    }
    Ok(())
}

pub async fn show_menu(bot: Bot, msg: Message, state: StateHandle) -> HandlerResult {
    if let Some(ActionOutcome::Menu { menu, date, locked }) =
        dispatch_or_reply(&bot, msg.chat.id, &state, StoreAction::ShowMenu).await?
    {
        let mut req = bot
            .send_message(msg.chat.id, menu_msg(&menu, date, locked))
            .parse_mode(ParseMode::MarkdownV2);
        if !locked {
            req = req.reply_markup(make_menu_keyboard(&menu));
        }
        req.await?;
    }
    Ok(())
}

pub async fn plate_cmd(bot: Bot, msg: Message, cmd: Command, state: StateHandle) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let action = match cmd {
        Command::Plate => StoreAction::ShowPlate { chat_id },
        Command::Confirm => StoreAction::Confirm { chat_id },
        Command::Optout => StoreAction::OptOut { chat_id },
        Command::Modify => StoreAction::Modify { chat_id },
        _ => unreachable!("plate_cmd is only routed plate commands"),
    };

    handle_plate_action(&bot, msg.chat.id, &state, action, None).await
}

pub async fn coupon(bot: Bot, msg: Message, state: StateHandle) -> HandlerResult {
    let action = StoreAction::ShowCoupon {
        chat_id: msg.chat.id.0,
    };
    if let Some(ActionOutcome::Coupon(coupon)) =
        dispatch_or_reply(&bot, msg.chat.id, &state, action).await?
    {
        send_coupon(&bot, msg.chat.id, &coupon).await?;
    }
    Ok(())
}

pub async fn special(bot: Bot, msg: Message, gemini: GeminiClient) -> HandlerResult {
    let pending = bot
        .send_message(msg.chat.id, "The chef is thinking...")
        .await?;

    let special = gemini.get_chefs_special().await;

    bot.edit_message_text(msg.chat.id, pending.id, special_msg(&special))
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

pub async fn report(bot: Bot, msg: Message, state: StateHandle) -> HandlerResult {
    let action = StoreAction::DailyReport {
        chat_id: msg.chat.id.0,
    };
    if let Some(ActionOutcome::DailyReport {
        date,
        summary,
        tally,
    }) = dispatch_or_reply(&bot, msg.chat.id, &state, action).await?
    {
        bot.send_message(msg.chat.id, daily_report_msg(date, &summary, &tally))
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
    }
    Ok(())
}

pub async fn history(bot: Bot, msg: Message, state: StateHandle) -> HandlerResult {
    let action = StoreAction::HistoricalReport {
        chat_id: msg.chat.id.0,
    };
    if let Some(ActionOutcome::Historical(insights)) =
        dispatch_or_reply(&bot, msg.chat.id, &state, action).await?
    {
        bot.send_message(msg.chat.id, history_msg(insights.as_ref()))
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
    }
    Ok(())
}

pub async fn menu_edit_cmd(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: StateHandle,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let parsed = match cmd {
        Command::MenuAdd(arg) => {
            parse_menu_add(&arg).map(|draft| StoreAction::AddMenuItem { chat_id, draft })
        }
        Command::MenuEdit(arg) => {
            parse_menu_edit(&arg).map(|item| StoreAction::UpdateMenuItem { chat_id, item })
        }
        Command::MenuDelete(arg) => {
            parse_menu_delete(&arg).map(|item_id| StoreAction::DeleteMenuItem { chat_id, item_id })
        }
        _ => unreachable!("menu_edit_cmd is only routed menu commands"),
    };

    let action = match parsed {
        Ok(action) => action,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("{}\n\n{}", e, Command::descriptions()))
                .await?;
            return Ok(());
        }
    };

    match dispatch_or_reply(&bot, msg.chat.id, &state, action).await? {
        Some(ActionOutcome::MenuItemSaved(item)) => {
            bot.send_message(msg.chat.id, menu_item_saved_msg(&item))
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
        }
        Some(ActionOutcome::MenuItemDeleted(item)) => {
            bot.send_message(msg.chat.id, format!("Deleted '{}' from the menu.", item.name))
                .await?;
        }
        _ => {}
    }
    Ok(())
}

pub async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// A photo from the admin, edited by Gemini with the caption as instruction
pub async fn admin_photo(
    bot: Bot,
    msg: Message,
    state: StateHandle,
    gemini: GeminiClient,
) -> HandlerResult {
    let action = StoreAction::RequireAdmin {
        chat_id: msg.chat.id.0,
    };
    if dispatch_or_reply(&bot, msg.chat.id, &state, action)
        .await?
        .is_none()
    {
        return Ok(());
    }

    let Some(prompt) = msg.caption().map(str::trim).filter(|c| !c.is_empty()) else {
        bot.send_message(
            msg.chat.id,
            "Please add a caption describing the edit, e.g. 'Add a retro filter'.",
        )
        .await?;
        return Ok(());
    };

    // the last size is the largest
    let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) else {
        return Ok(());
    };

    let file = bot.get_file(&photo.file.id).await?;
    let mut image: Vec<u8> = Vec::new();
    bot.download_file(&file.path, &mut image).await?;

    let pending = bot.send_message(msg.chat.id, "Editing image...").await?;

    match gemini.edit_image(&image, "image/jpeg", prompt).await {
        Ok(edited) => {
            let extension = edited.mime_type.rsplit('/').next().unwrap_or("png");
            bot.send_photo(
                msg.chat.id,
                InputFile::memory(edited.bytes).file_name(format!("edited.{}", extension)),
            )
            .caption(prompt.to_string())
            .await?;
            bot.delete_message(msg.chat.id, pending.id).await?;
        }
        Err(e) => {
            log::warn!("Image edit failed: {}", e);
            bot.edit_message_text(msg.chat.id, pending.id, format!("Image edit failed: {}", e))
                .await?;
        }
    }

    Ok(())
}

pub async fn invalid_cmd(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, "That is not a command. See /help.")
        .await?;
    Ok(())
}
