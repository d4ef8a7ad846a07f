// local wall clock hour after which tomorrow's selections lock
pub const CUTOFF_HOUR: u32 = 21;
pub const REMINDER_HOUR: u32 = 20;

pub const DEFAULT_TOTAL_EMPLOYEES: usize = 25;
pub const SEEDED_TODAY_USERS: usize = 10;
pub const HISTORY_DAYS: i64 = 30;

pub const ADMIN_NAME: &str = "Canteen Admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const GEMINI_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

pub const CHEF_PROMPT: &str = "You are a world-class chef. Create a unique, delicious-sounding, \
and healthy vegetarian or vegan dish of the day for a corporate canteen menu. Provide a name \
for the dish and a short, enticing description (max 20 words).";

pub const FALLBACK_SPECIAL_NAME: &str = "Palak Paneer Delight";
pub const FALLBACK_SPECIAL_DESCRIPTION: &str = "Creamy spinach curry with soft paneer cubes, \
spiced to perfection. A comforting and healthy choice.";
pub const EMPTY_SPECIAL_NAME: &str = "Chef's Surprise";
pub const EMPTY_SPECIAL_DESCRIPTION: &str =
    "A delightful dish prepared with the freshest ingredients.";

pub const QR_API_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";
pub const QR_SIZE: &str = "200x200";

pub const REMINDER_MSG: &str = "Just a friendly reminder to confirm your meal selection for \
tomorrow before the 9:00 PM deadline!";
pub const CONFIRMATION_MSG: &str =
    "Your meal coupon is ready! You can view it again any time with /coupon.";
pub const OPT_OUT_MSG: &str = "Your choice to opt out for tomorrow's meal has been saved.";
pub const DEADLINE_MSG: &str =
    "The 9:00 PM deadline has passed. You can no longer make a selection for tomorrow.";
