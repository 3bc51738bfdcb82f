//! Hardcoded default restaurant data. Restaurants in [`system_restaurants`]
//! ship a verified menu; the ones in [`explore_restaurants`] have no data and
//! go through the AI acquisition flow on first visit.

use crate::data_types::menu_data_types::{Ingredient, Preset, Restaurant};

fn item(id: &str, name: &str, category: &str, calories: u32) -> Ingredient {
    Ingredient {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        calories: Some(calories),
        price: None,
        description: None,
        premium: None,
    }
}

fn premium_item(id: &str, name: &str, category: &str, calories: u32) -> Ingredient {
    Ingredient {
        premium: Some(true),
        ..item(id, name, category, calories)
    }
}

fn preset(name: &str, description: &str, item_ids: &[&str]) -> Preset {
    Preset {
        name: name.to_string(),
        item_ids: item_ids.iter().map(|s| s.to_string()).collect(),
        calories: None,
        price: None,
        description: Some(description.to_string()),
    }
}

fn place(id: &str, name: &str, logo: &str, dist_hint: &str) -> Restaurant {
    Restaurant {
        id: id.to_string(),
        name: name.to_string(),
        logo: logo.to_string(),
        color: "stone".to_string(),
        url: None,
        menu: Vec::new(),
        presets: Vec::new(),
        address: Some(format!("Fairfield, NJ ({dist_hint})")),
        phone_number: None,
        rating: None,
        delivery_apps: None,
    }
}

fn cava() -> Restaurant {
    Restaurant {
        id: "cava".to_string(),
        name: "Cava".to_string(),
        logo: "🥙".to_string(),
        color: "orange".to_string(),
        url: Some("https://order.cava.com/".to_string()),
        menu: vec![
            item("cava-base-saffron", "Saffron Basmati Rice", "Grains", 190),
            item("cava-base-brown", "Brown Basmati Rice", "Grains", 180),
            item("cava-base-lentils", "Black Lentils", "Grains", 130),
            item("cava-base-greens", "SuperGreens Mix", "Greens", 30),
            item("cava-base-arugula", "Arugula", "Greens", 15),
            item("cava-base-pita", "Pita", "Base", 200),
            item("cava-prot-chicken", "Grilled Chicken", "Protein", 230),
            item("cava-prot-honey-chicken", "Harissa Honey Chicken", "Protein", 240),
            premium_item("cava-prot-steak", "Grilled Steak", "Protein", 260),
            premium_item("cava-prot-lamb", "Braised Lamb", "Protein", 280),
            item("cava-prot-falafel", "Falafel", "Protein", 240),
            item("cava-dip-tzatziki", "Tzatziki", "Dips", 30),
            item("cava-dip-hummus", "Hummus", "Dips", 45),
            item("cava-dip-crazy-feta", "Crazy Feta", "Dips", 110),
            item("cava-dip-harissa", "Harissa", "Dips", 60),
            item("cava-top-onion", "Pickled Onions", "Toppings", 15),
            item("cava-top-tomato", "Tomato + Cucumber", "Toppings", 15),
            item("cava-top-olives", "Kalamata Olives", "Toppings", 45),
            item("cava-top-corn", "Fire Roasted Corn", "Toppings", 60),
            item("cava-dress-greek", "Greek Vinaigrette", "Dressings", 120),
            item("cava-dress-lemon", "Lemon Herb Tahini", "Dressings", 90),
        ],
        presets: vec![
            preset(
                "Greens & Grains Classic",
                "Half rice, half greens, chicken, the works",
                &[
                    "cava-base-saffron",
                    "cava-base-greens",
                    "cava-prot-chicken",
                    "cava-dip-tzatziki",
                    "cava-top-tomato",
                    "cava-dress-greek",
                ],
            ),
            preset(
                "Spicy Lamb Bowl",
                "For the heat tolerant",
                &[
                    "cava-base-brown",
                    "cava-prot-lamb",
                    "cava-dip-harissa",
                    "cava-dip-crazy-feta",
                    "cava-top-onion",
                ],
            ),
            preset(
                "Falafel Pita",
                "Vegetarian, no regrets",
                &[
                    "cava-base-pita",
                    "cava-prot-falafel",
                    "cava-dip-hummus",
                    "cava-top-tomato",
                    "cava-dress-lemon",
                ],
            ),
        ],
        address: Some("400 US-46, Wayne, NJ 07470".to_string()),
        phone_number: Some("(973) 785-0010".to_string()),
        rating: Some(4.7),
        delivery_apps: Some(vec!["DoorDash".to_string(), "UberEats".to_string()]),
    }
}

fn chipotle() -> Restaurant {
    Restaurant {
        id: "chipotle".to_string(),
        name: "Chipotle".to_string(),
        logo: "🌯".to_string(),
        color: "red".to_string(),
        url: Some("https://www.chipotle.com/order".to_string()),
        menu: vec![
            item("chip-base-white", "White Rice", "Base", 210),
            item("chip-base-brown", "Brown Rice", "Base", 210),
            item("chip-base-black", "Black Beans", "Base", 130),
            item("chip-base-pinto", "Pinto Beans", "Base", 130),
            item("chip-prot-chicken", "Chicken", "Protein", 180),
            item("chip-prot-steak", "Steak", "Protein", 150),
            item("chip-prot-barbacoa", "Barbacoa", "Protein", 170),
            item("chip-prot-carnitas", "Carnitas", "Protein", 210),
            item("chip-prot-sofritas", "Sofritas", "Protein", 150),
            item("chip-top-mild", "Fresh Tomato Salsa", "Salsas", 25),
            item("chip-top-medium", "Roasted Chili-Corn Salsa", "Salsas", 80),
            item("chip-top-hot", "Tomatillo-Red Chili Salsa", "Salsas", 30),
            item("chip-top-sourcream", "Sour Cream", "Toppings", 110),
            item("chip-top-cheese", "Cheese", "Toppings", 110),
            premium_item("chip-top-guac", "Guacamole", "Toppings", 230),
            item("chip-top-lettuce", "Romaine Lettuce", "Toppings", 5),
            item("chip-side-chips", "Chips", "Sides", 540),
        ],
        presets: vec![
            preset(
                "Classic Chicken Bowl",
                "The default for a reason",
                &[
                    "chip-base-white",
                    "chip-base-black",
                    "chip-prot-chicken",
                    "chip-top-mild",
                    "chip-top-cheese",
                    "chip-top-lettuce",
                ],
            ),
            preset(
                "Steak & Guac",
                "Worth the upcharge",
                &[
                    "chip-base-brown",
                    "chip-prot-steak",
                    "chip-top-medium",
                    "chip-top-guac",
                ],
            ),
        ],
        address: Some("387 US-46, Fairfield, NJ 07004".to_string()),
        phone_number: Some("(973) 882-9696".to_string()),
        rating: Some(4.1),
        delivery_apps: Some(vec![
            "DoorDash".to_string(),
            "Grubhub".to_string(),
            "UberEats".to_string(),
        ]),
    }
}

fn shake_shack() -> Restaurant {
    Restaurant {
        id: "shakeshack".to_string(),
        name: "Shake Shack".to_string(),
        logo: "🍔".to_string(),
        color: "green".to_string(),
        url: Some("https://shakeshack.com/order".to_string()),
        menu: vec![
            item("ss-burger-shack", "ShackBurger", "Burgers", 550),
            item("ss-burger-smoke", "SmokeShack", "Burgers", 700),
            item("ss-burger-shroom", "'Shroom Burger", "Burgers", 510),
            item("ss-chicken-shack", "Chicken Shack", "Chicken", 590),
            item("ss-dog-shack", "Shack-cago Dog", "Hot Dogs", 320),
            item("ss-fries", "Crinkle Cut Fries", "Sides", 470),
            item("ss-fries-cheese", "Cheese Fries", "Sides", 620),
            item("ss-shake-vanilla", "Vanilla Shake", "Shakes", 680),
            item("ss-shake-chocolate", "Chocolate Shake", "Shakes", 730),
            item("ss-lemonade", "Shack-made Lemonade", "Drinks", 200),
            item("ss-soda", "Fountain Soda", "Drinks", 150),
        ],
        presets: vec![
            preset(
                "The Standard",
                "Burger, fries, shake",
                &["ss-burger-shack", "ss-fries", "ss-shake-vanilla"],
            ),
            preset(
                "Smoke Show",
                "Bacon cherry-pepper everything",
                &["ss-burger-smoke", "ss-fries-cheese", "ss-lemonade"],
            ),
        ],
        address: Some("479 US-46, Wayne, NJ 07470".to_string()),
        phone_number: Some("(862) 210-9150".to_string()),
        rating: Some(4.4),
        delivery_apps: Some(vec!["Grubhub".to_string(), "UberEats".to_string()]),
    }
}

/// Restaurants with a verified (hardcoded) menu. These default to favorites.
pub fn system_restaurants() -> Vec<Restaurant> {
    vec![cava(), chipotle(), shake_shack()]
}

/// Data-less places around Fairfield, NJ. Selecting one shows the
/// acquisition flow.
pub fn explore_restaurants() -> Vec<Restaurant> {
    vec![
        place("ff-manhattan", "Manhattan Bagel", "🥯", "0.3 mi"),
        place("ff-johnny", "Jersey Johnny's Grill", "🌭", "0.5 mi"),
        place("ff-popeyes", "Popeyes", "🍗", "0.6 mi"),
        place("ff-doubles", "Double S Diner", "🍳", "1.1 mi"),
        place("ff-nolas", "Nola's Osteria", "🍝", "2.2 mi"),
        place("ff-nikko", "Nikko Hibachi", "🍣", "3.0 mi"),
        place("ff-bellanapoli", "Bella Napoli", "🍕", "2.5 mi"),
        place("ff-beyondpita", "Beyond Pita", "🥙", "2.3 mi"),
        place("ff-thatcher", "Thatcher McGhee's", "🍺", "1.0 mi"),
        place("ff-cheesecake", "The Cheesecake Factory", "🍰", "3.5 mi"),
        place("ff-pfchang", "P.F. Chang's", "🥢", "3.4 mi"),
        place("ff-subway", "Subway", "🥪", "1.1 mi"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn system_restaurants_have_menus_and_unique_item_ids() {
        for r in system_restaurants() {
            assert!(r.has_default_menu(), "{} ships no menu", r.id);
            let ids: HashSet<_> = r.menu.iter().map(|i| i.id.as_str()).collect();
            assert_eq!(ids.len(), r.menu.len(), "duplicate item id in {}", r.id);
        }
    }

    #[test]
    fn presets_reference_known_items() {
        for r in system_restaurants() {
            let ids: HashSet<_> = r.menu.iter().map(|i| i.id.as_str()).collect();
            for p in &r.presets {
                for id in &p.item_ids {
                    assert!(ids.contains(id.as_str()), "{}: {} unknown", r.id, id);
                }
            }
        }
    }

    #[test]
    fn explore_restaurants_are_data_less() {
        for r in explore_restaurants() {
            assert!(!r.has_default_menu());
        }
    }
}
