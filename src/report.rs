//! Kitchen planning numbers over recorded selections.
//!
//! Everything in here is a pure function of its input.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::data_types::canteen_data_types::{Category, MenuItem, MenuItemId, Selection};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTally {
    pub item: MenuItem,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub responses: usize,
    pub items: usize,
    pub opted_out: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalInsights {
    pub days: usize,
    /// fraction in 0.0..=1.0
    pub opt_out_rate: f64,
    pub most_popular: Vec<(Category, Option<ItemTally>)>,
    pub ranked_items: Vec<ItemTally>,
    pub max_count: usize,
}

impl HistoricalInsights {
    pub fn most_popular_in(&self, category: Category) -> Option<&ItemTally> {
        self.most_popular
            .iter()
            .find(|(c, _)| *c == category)
            .and_then(|(_, tally)| tally.as_ref())
    }
}

/// Counts per item id, highest first; ties keep the order of first appearance
pub fn tally_by_item(selections: &[Selection]) -> Vec<ItemTally> {
    let mut tallies: Vec<ItemTally> = Vec::new();
    let mut index: HashMap<MenuItemId, usize> = HashMap::new();

    for item in selections.iter().flat_map(|s| s.items.iter()) {
        match index.get(&item.id) {
            Some(&i) => tallies[i].count += 1,
            None => {
                index.insert(item.id, tallies.len());
                tallies.push(ItemTally {
                    item: item.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable
    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    tallies
}

pub fn summarize(selections: &[Selection]) -> DailySummary {
    DailySummary {
        responses: selections.len(),
        items: selections.iter().map(|s| s.items.len()).sum(),
        opted_out: selections.iter().filter(|s| s.opted_out).count(),
    }
}

pub fn historical_insights(
    selections: &[Selection],
    total_employees: usize,
) -> Option<HistoricalInsights> {
    if selections.is_empty() || total_employees == 0 {
        return None;
    }

    let days = selections
        .iter()
        .map(|s| s.date)
        .collect::<BTreeSet<_>>()
        .len();
    let opted_out = selections.iter().filter(|s| s.opted_out).count();
    // logins beyond the configured head count can push the raw ratio past 1
    let opt_out_rate = (opted_out as f64 / (days * total_employees) as f64).min(1.0);

    let ranked_items = tally_by_item(selections);
    let most_popular = Category::ALL
        .iter()
        .map(|category| {
            (
                *category,
                ranked_items
                    .iter()
                    .find(|t| t.item.category == *category)
                    .cloned(),
            )
        })
        .collect();
    let max_count = ranked_items.first().map(|t| t.count).unwrap_or(0);

    Some(HistoricalInsights {
        days,
        opt_out_rate,
        most_popular,
        ranked_items,
        max_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::canteen_data_types::Employee;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn item(id: u32, name: &str, category: Category) -> MenuItem {
        MenuItem {
            id,
            name: name.to_string(),
            description: format!("{} description", name),
            price: Decimal::new(350, 2),
            category,
        }
    }

    fn selection(n: u32, items: Vec<MenuItem>, day: u32, opted_out: bool) -> Selection {
        Selection {
            employee: Employee {
                name: format!("Employee {}", n),
                email: format!("employee{}@example.com", n),
                phone_number: "555-555-5500".to_string(),
            },
            items,
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            opted_out,
        }
    }

    #[test]
    fn test_tally_counts_and_ranks() {
        let burger = item(1, "Burger", Category::Lunch);
        let fries = item(4, "Fries", Category::EveningSnack);
        let selections = vec![
            selection(1, vec![burger.clone()], 1, false),
            selection(2, vec![burger.clone(), fries.clone()], 1, false),
        ];

        let tally = tally_by_item(&selections);

        assert_eq!(
            tally,
            vec![
                ItemTally {
                    item: burger,
                    count: 2
                },
                ItemTally {
                    item: fries,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_tally_ties_keep_first_seen_order() {
        let juice = item(7, "Juice", Category::Beverage);
        let salad = item(3, "Salad", Category::Lunch);
        let rings = item(5, "Onion Rings", Category::EveningSnack);
        let selections = vec![
            selection(1, vec![juice.clone()], 1, false),
            selection(2, vec![salad.clone(), rings.clone()], 1, false),
            selection(3, vec![rings.clone()], 1, false),
        ];

        let names: Vec<_> = tally_by_item(&selections)
            .into_iter()
            .map(|t| t.item.name)
            .collect();

        assert_eq!(names, vec!["Onion Rings", "Juice", "Salad"]);
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(
            summarize(&[]),
            DailySummary {
                responses: 0,
                items: 0,
                opted_out: 0
            }
        );
    }

    #[test]
    fn test_summarize_counts_opt_outs() {
        let selections = vec![
            selection(1, vec![], 1, true),
            selection(
                2,
                vec![
                    item(1, "A", Category::Lunch),
                    item(6, "B", Category::Beverage),
                ],
                1,
                false,
            ),
        ];

        assert_eq!(
            summarize(&selections),
            DailySummary {
                responses: 2,
                items: 2,
                opted_out: 1
            }
        );
    }

    #[test]
    fn test_historical_insights_empty() {
        assert_eq!(historical_insights(&[], 25), None);
        let one = vec![selection(1, vec![], 1, true)];
        assert_eq!(historical_insights(&one, 0), None);
    }

    #[test]
    fn test_historical_insights() {
        let pizza = item(2, "Margherita Pizza", Category::Lunch);
        let salad = item(3, "Greek Salad", Category::Lunch);
        let fries = item(4, "French Fries", Category::EveningSnack);

        let selections = vec![
            selection(1, vec![pizza.clone(), fries.clone()], 1, false),
            selection(2, vec![salad.clone()], 1, false),
            selection(3, vec![], 1, true),
            selection(1, vec![pizza.clone()], 2, false),
            selection(2, vec![], 2, true),
        ];

        let insights = historical_insights(&selections, 5).unwrap();

        assert_eq!(insights.days, 2);
        assert!((insights.opt_out_rate - 0.2).abs() < f64::EPSILON);
        assert_eq!(
            insights.most_popular_in(Category::Lunch).unwrap().item,
            pizza
        );
        assert_eq!(
            insights
                .most_popular_in(Category::EveningSnack)
                .unwrap()
                .item,
            fries
        );
        assert!(insights.most_popular_in(Category::Breakfast).is_none());
        assert_eq!(insights.max_count, 2);
        assert_eq!(insights.ranked_items.len(), 3);
    }

    #[test]
    fn test_opt_out_rate_stays_a_fraction() {
        // more people answered than the configured head count
        let selections: Vec<Selection> = (1..=4).map(|n| selection(n, vec![], 1, true)).collect();

        let insights = historical_insights(&selections, 2).unwrap();
        assert_eq!(insights.opt_out_rate, 1.0);
    }
}
