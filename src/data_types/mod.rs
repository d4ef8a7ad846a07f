pub mod canteen_data_types;
pub mod gemini_data_types;

use std::str::FromStr;

use canteen_data_types::MenuItemId;
use teloxide::{
    dispatching::dialogue::InMemStorage, prelude::Dialogue, utils::command::BotCommands,
};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "log in as employee")]
    Start,
    #[command(description = "log in as canteen admin (demo)")]
    Admin,
    #[command(description = "log out\n")]
    Logout,
    #[command(description = "tomorrow's menu")]
    Menu,
    #[command(description = "your selection for tomorrow")]
    Plate,
    #[command(description = "confirm your selection")]
    Confirm,
    #[command(description = "not eating tomorrow")]
    Optout,
    #[command(description = "change a confirmed selection")]
    Modify,
    #[command(description = "show your meal coupon")]
    Coupon,
    #[command(description = "chef's special of the day\n")]
    Special,
    #[command(description = "daily meal report (admin)")]
    Report,
    #[command(description = "historical insights (admin)")]
    History,
    #[command(description = "<category> | <name> | <description> | <price> (admin)")]
    MenuAdd(String),
    #[command(description = "<id> | <category> | <name> | <description> | <price> (admin)")]
    MenuEdit(String),
    #[command(description = "<id> (admin)")]
    MenuDelete(String),
    #[command(description = "show this text")]
    Help,
}

#[derive(Clone, Default, Debug)]
pub enum DialogueState {
    #[default]
    Default,
    AwaitEmail,
    AwaitPhone {
        email: String,
    },
}

pub type DialogueType = Dialogue<DialogueState, InMemStorage<DialogueState>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Inline keyboard actions, encoded as `cmd:arg` in the callback data
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlateCallback {
    Pick(MenuItemId),
    Drop(MenuItemId),
    Confirm,
    OptOut,
    Modify,
}

impl PlateCallback {
    pub fn encode(&self) -> String {
        match self {
            PlateCallback::Pick(id) => format!("pick:{}", id),
            PlateCallback::Drop(id) => format!("drop:{}", id),
            PlateCallback::Confirm => "confirm:".to_string(),
            PlateCallback::OptOut => "optout:".to_string(),
            PlateCallback::Modify => "modify:".to_string(),
        }
    }
}

impl FromStr for PlateCallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (cmd, arg) = s
            .split_once(':')
            .ok_or_else(|| format!("malformed callback data: {}", s))?;

        let parse_id = |arg: &str| {
            arg.parse::<MenuItemId>()
                .map_err(|_| format!("malformed item id: {}", arg))
        };

        match cmd {
            "pick" => Ok(PlateCallback::Pick(parse_id(arg)?)),
            "drop" => Ok(PlateCallback::Drop(parse_id(arg)?)),
            "confirm" => Ok(PlateCallback::Confirm),
            "optout" => Ok(PlateCallback::OptOut),
            "modify" => Ok(PlateCallback::Modify),
            _ => Err(format!("unknown callback command: {}", cmd)),
        }
    }
}
