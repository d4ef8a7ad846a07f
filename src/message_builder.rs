//! MarkdownV2 message texts. Dynamic text always goes through `markdown::escape`.

use chrono::NaiveDate;
use rand::Rng;
use teloxide::utils::markdown::{bold, escape, italic, underline};

use crate::app_state::PlateView;
use crate::data_types::canteen_data_types::{Category, MenuItem};
use crate::data_types::gemini_data_types::ChefSpecial;
use crate::menu::Menu;
use crate::plate::PlateState;
use crate::report::{DailySummary, HistoricalInsights, ItemTally};

const EMOJIS: [&str; 6] = ["🥗", "🍲", "🥦", "☕️", "🍊", "🌤️"];
const BAR_WIDTH: usize = 12;

pub fn date_fmt(date: NaiveDate) -> String {
    date.format("%A, %d.%m.%Y").to_string()
}

fn item_line(item: &MenuItem) -> String {
    format!(
        " • {} {}\n",
        underline(&escape(&item.name)),
        escape(&format!("({:.2})", item.price))
    )
}

pub fn menu_msg(menu: &Menu, date: NaiveDate, locked: bool) -> String {
    let emoji = EMOJIS[rand::thread_rng().gen_range(0..EMOJIS.len())];
    let mut msg = format!("{} {} {}\n", emoji, bold(&escape(&date_fmt(date))), emoji);

    if locked {
        msg += &italic(&escape("Ordering for this day is closed.\n"));
    }

    for (category, items) in menu.by_category() {
        if items.is_empty() {
            continue;
        }
        msg += &format!("\n{}\n", bold(&escape(category.as_str())));
        for item in items {
            msg += &item_line(item);
            if !item.description.is_empty() {
                msg += &format!("     {}\n", italic(&escape(&item.description)));
            }
        }
    }

    msg
}

pub fn plate_msg(view: &PlateView) -> String {
    let mut msg = format!(
        "{}\n{}\n",
        bold(&escape(&format!("{}'s plate", view.employee.name))),
        escape(&date_fmt(view.plate.date))
    );

    // past the deadline an unsettled plate no longer counts, the store does
    let (items, status) = match (&view.recorded, view.locked && !view.plate.is_settled()) {
        (Some(recorded), true) if recorded.opted_out => {
            (&[][..], "Your earlier opt-out stands.")
        }
        (Some(recorded), true) => (
            &recorded.items[..],
            "Your earlier confirmation stands, these changes were not saved.",
        ),
        (None, true) => (&[][..], "No meal was confirmed for tomorrow."),
        (_, false) => (
            &view.plate.items[..],
            match view.plate.state {
                PlateState::Empty => "Nothing picked yet. Choose items from the /menu.",
                PlateState::Building => "Not confirmed yet.",
                PlateState::Confirmed => "Confirmed. Your coupon is available with /coupon.",
                PlateState::OptedOut => "You opted out of tomorrow's meal.",
            },
        ),
    };

    msg += "\n";
    for item in items {
        msg += &format!("{} ", escape(&format!("[{}]", item.category)));
        msg += item_line(item).trim_start_matches(' ');
    }
    msg += &format!("\n{}\n", italic(&escape(status)));

    if view.locked {
        msg += &format!("{}\n", bold(&escape("The 9:00 PM deadline has passed.")));
    }

    msg
}

pub fn special_msg(special: &ChefSpecial) -> String {
    format!(
        "👨‍🍳 {}\n\n{}\n{}\n",
        bold(&escape("Chef's Special")),
        underline(&escape(&special.name)),
        italic(&escape(&special.description))
    )
}

pub fn daily_report_msg(date: NaiveDate, summary: &DailySummary, tally: &[ItemTally]) -> String {
    let mut msg = format!(
        "{}\n{}\n\n",
        bold(&escape("Daily meal report")),
        escape(&date_fmt(date))
    );

    msg += &escape(&format!(
        "Responses: {}\nItems ordered: {}\nOpted out: {}\n",
        summary.responses, summary.items, summary.opted_out
    ));

    if tally.is_empty() {
        msg += &format!("\n{}\n", italic("No meals ordered yet\\."));
        return msg;
    }

    msg += &format!("\n{}\n", bold("Kitchen tally"));
    for t in tally {
        msg += &escape(&format!(" {:>3} × {} ({})\n", t.count, t.item.name, t.item.category));
    }

    msg
}

fn bar(count: usize, max_count: usize) -> String {
    let len = if max_count == 0 {
        0
    } else {
        (count * BAR_WIDTH + max_count - 1) / max_count
    };
    "█".repeat(len)
}

pub fn history_msg(insights: Option<&HistoricalInsights>) -> String {
    let Some(insights) = insights else {
        return format!(
            "{}\n{}",
            bold(&escape("Data-driven planning")),
            escape("No historical data available to generate insights.")
        );
    };

    let mut msg = format!(
        "{}\n\n",
        bold(&escape(&format!(
            "Data-driven planning (last {} days)",
            insights.days
        )))
    );

    for category in [Category::Lunch, Category::EveningSnack] {
        let name = insights
            .most_popular_in(category)
            .map(|t| t.item.name.as_str())
            .unwrap_or("N/A");
        msg += &format!(
            "{} {}\n",
            escape(&format!("Most popular {}:", category.as_str().to_lowercase())),
            bold(&escape(name))
        );
    }
    msg += &escape(&format!(
        "Average opt-out rate: {:.1}%\n",
        insights.opt_out_rate * 100.0
    ));

    msg += &format!("\n{}\n", underline(&escape("Item popularity")));
    for t in &insights.ranked_items {
        msg += &format!(
            "{} {}\n",
            escape(&format!("{} {}", bar(t.count, insights.max_count), t.count)),
            escape(&t.item.name)
        );
    }

    msg
}

pub fn menu_item_saved_msg(item: &MenuItem) -> String {
    format!(
        "{}\n{}{}",
        bold(&escape(&format!("Saved as item {}", item.id))),
        escape(&format!("[{}] ", item.category)),
        item_line(item).trim_start_matches(' ')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::canteen_data_types::{Employee, Selection};
    use crate::plate::Plate;
    use rust_decimal::Decimal;

    fn burger() -> MenuItem {
        MenuItem {
            id: 1,
            name: "Veggie Burger".to_string(),
            description: "Plant-based patty (vegan).".to_string(),
            price: Decimal::new(800, 2),
            category: Category::Lunch,
        }
    }

    #[test]
    fn test_menu_msg_escapes_text() {
        let msg = menu_msg(
            &Menu::new(vec![burger()]),
            NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
            false,
        );

        assert!(msg.contains("Tuesday, 11\\.03\\.2025"));
        assert!(msg.contains("\\(8\\.00\\)"));
        assert!(msg.contains("Plant\\-based patty \\(vegan\\)\\."));
        assert!(!msg.contains("Breakfast"));
    }

    fn jane() -> Employee {
        Employee {
            name: "Jane Doe".to_string(),
            email: "jane.doe@gmail.com".to_string(),
            phone_number: "555".to_string(),
        }
    }

    #[test]
    fn test_plate_msg_states() {
        let mut plate = Plate::new(NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
        plate.pick(burger(), false).unwrap();

        let mut view = PlateView {
            employee: jane(),
            plate,
            locked: false,
            recorded: None,
        };

        let msg = plate_msg(&view);
        assert!(msg.contains("Jane Doe's plate"));
        assert!(msg.contains("Not confirmed yet\\."));
        assert!(msg.contains("Veggie Burger"));

        view.locked = true;
        let msg = plate_msg(&view);
        assert!(msg.contains("No meal was confirmed"));
        assert!(!msg.contains("Veggie Burger"));
        assert!(msg.contains("deadline has passed"));
    }

    #[test]
    fn test_locked_plate_shows_earlier_confirmation() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        let mut pizza = burger();
        pizza.id = 2;
        pizza.name = "Margherita Pizza".to_string();

        // confirmed the burger, then modified to the pizza without confirming again
        let mut plate = Plate::new(date);
        plate.pick(pizza, false).unwrap();
        let view = PlateView {
            employee: jane(),
            plate,
            locked: true,
            recorded: Some(Selection {
                employee: jane(),
                items: vec![burger()],
                date,
                opted_out: false,
            }),
        };

        let msg = plate_msg(&view);
        assert!(msg.contains("Veggie Burger"));
        assert!(!msg.contains("Margherita Pizza"));
        assert!(msg.contains("earlier confirmation stands"));
        assert!(!msg.contains("Not confirmed yet"));
    }

    #[test]
    fn test_bar_scales_to_max() {
        assert_eq!(bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(bar(1, 10).chars().count(), 2);
        assert_eq!(bar(0, 0), "");
    }

    #[test]
    fn test_history_without_data() {
        assert!(history_msg(None).contains("No historical data"));
    }
}
