use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

use crate::data_types::menu_data_types::{Order, Restaurant, SavedMenu};

pub fn check_or_create_db_tables(db: &str) -> rusqlite::Result<()> {
    let conn = Connection::open(db)?;

    // seq gives strict insertion order even when two versions share a
    // timestamp millisecond
    conn.prepare(
        "create table if not exists menu_versions (
            seq integer primary key autoincrement,
            id text not null unique,
            restaurant_id text not null,
            json_text text not null
        )",
    )?
    .execute([])?;

    conn.prepare(
        "create table if not exists orders (
            seq integer primary key autoincrement,
            id text not null unique,
            json_text text not null
        )",
    )?
    .execute([])?;

    // user-added restaurants only; the hardcoded ones never touch the db
    conn.prepare(
        "create table if not exists restaurants (
            id text not null unique primary key,
            json_text text not null
        )",
    )?
    .execute([])?;

    Ok(())
}

pub fn insert_menu_version(db: &str, version: &SavedMenu) -> rusqlite::Result<()> {
    let conn = Connection::open(db)?;
    let mut stmt = conn.prepare_cached(
        "insert into menu_versions (id, restaurant_id, json_text)
            values (?1, ?2, ?3)",
    )?;

    let json_text = serde_json::to_string(version).unwrap();
    stmt.execute(params![version.id, version.restaurant_id, json_text])?;

    Ok(())
}

/// Saved menu versions of one restaurant, newest first.
pub fn get_menu_versions(db: &str, restaurant_id: &str) -> rusqlite::Result<Vec<SavedMenu>> {
    let conn = Connection::open(db)?;
    let mut stmt = conn.prepare_cached(
        "SELECT json_text FROM menu_versions WHERE restaurant_id = ?1 ORDER BY seq DESC",
    )?;

    let rows = stmt.query_map(params![restaurant_id], |row| row.get::<_, String>(0))?;

    let mut versions = Vec::new();
    for row in rows {
        let json_text = row?;
        match serde_json::from_str(&json_text) {
            Ok(version) => versions.push(version),
            Err(e) => log::warn!("skipping corrupt menu version row: {e}"),
        }
    }

    Ok(versions)
}

/// All saved menu versions grouped by restaurant, each group newest first.
pub fn get_all_menu_versions(db: &str) -> rusqlite::Result<HashMap<String, Vec<SavedMenu>>> {
    let conn = Connection::open(db)?;
    let mut stmt = conn
        .prepare_cached("SELECT restaurant_id, json_text FROM menu_versions ORDER BY seq DESC")?;

    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut map: HashMap<String, Vec<SavedMenu>> = HashMap::new();
    for row in rows {
        let (restaurant_id, json_text) = row?;
        match serde_json::from_str(&json_text) {
            Ok(version) => map.entry(restaurant_id).or_default().push(version),
            Err(e) => log::warn!("skipping corrupt menu version row: {e}"),
        }
    }

    Ok(map)
}

pub fn insert_order(db: &str, order: &Order) -> rusqlite::Result<()> {
    let conn = Connection::open(db)?;
    let mut stmt = conn.prepare_cached(
        "insert into orders (id, json_text)
            values (?1, ?2)",
    )?;

    let json_text = serde_json::to_string(order).unwrap();
    stmt.execute(params![order.id, json_text])?;

    Ok(())
}

pub fn delete_order(db: &str, order_id: &str) -> rusqlite::Result<()> {
    let conn = Connection::open(db)?;
    let mut stmt = conn.prepare_cached("delete from orders where id = ?1")?;

    stmt.execute(params![order_id])?;

    Ok(())
}

/// All saved orders, newest first.
pub fn get_orders(db: &str) -> rusqlite::Result<Vec<Order>> {
    let conn = Connection::open(db)?;
    let mut stmt = conn.prepare_cached("SELECT json_text FROM orders ORDER BY seq DESC")?;

    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut orders = Vec::new();
    for row in rows {
        let json_text = row?;
        match serde_json::from_str(&json_text) {
            Ok(order) => orders.push(order),
            Err(e) => log::warn!("skipping corrupt order row: {e}"),
        }
    }

    Ok(orders)
}

/// Inserts or replaces a user-added restaurant record.
pub fn upsert_custom_restaurant(db: &str, restaurant: &Restaurant) -> rusqlite::Result<()> {
    let conn = Connection::open(db)?;
    let mut stmt = conn.prepare_cached(
        "replace into restaurants (id, json_text)
            values (?1, ?2)",
    )?;

    let json_text = serde_json::to_string(restaurant).unwrap();
    stmt.execute(params![restaurant.id, json_text])?;

    Ok(())
}

pub fn get_custom_restaurant(db: &str, id: &str) -> rusqlite::Result<Option<Restaurant>> {
    let conn = Connection::open(db)?;
    let mut stmt = conn.prepare_cached("SELECT json_text FROM restaurants WHERE id = ?1")?;

    let json_text: Option<String> = stmt
        .query_row(params![id], |row| row.get(0))
        .optional()?;

    Ok(json_text.and_then(|t| match serde_json::from_str(&t) {
        Ok(r) => Some(r),
        Err(e) => {
            log::warn!("skipping corrupt restaurant row: {e}");
            None
        }
    }))
}

pub fn get_custom_restaurants(db: &str) -> rusqlite::Result<Vec<Restaurant>> {
    let conn = Connection::open(db)?;
    let mut stmt = conn.prepare_cached("SELECT json_text FROM restaurants")?;

    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut restaurants = Vec::new();
    for row in rows {
        let json_text = row?;
        match serde_json::from_str(&json_text) {
            Ok(restaurant) => restaurants.push(restaurant),
            Err(e) => log::warn!("skipping corrupt restaurant row: {e}"),
        }
    }

    Ok(restaurants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::menu_data_types::Ingredient;

    fn temp_db() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sqlite").to_str().unwrap().to_string();
        check_or_create_db_tables(&path).unwrap();
        (dir, path)
    }

    fn version(id: &str, restaurant_id: &str, timestamp: i64) -> SavedMenu {
        SavedMenu {
            id: id.to_string(),
            restaurant_id: restaurant_id.to_string(),
            timestamp,
            menu: vec![Ingredient {
                id: format!("{id}-item"),
                name: "Test Item".to_string(),
                category: "Test".to_string(),
                calories: Some(100),
                price: None,
                description: None,
                premium: None,
            }],
            presets: Vec::new(),
            source_url: None,
        }
    }

    #[test]
    fn menu_versions_round_trip_newest_first() {
        let (_dir, db) = temp_db();

        // same timestamp on purpose, insertion order must still win
        insert_menu_version(&db, &version("v1", "cava", 1000)).unwrap();
        insert_menu_version(&db, &version("v2", "cava", 1000)).unwrap();
        insert_menu_version(&db, &version("v3", "chipotle", 2000)).unwrap();

        let cava = get_menu_versions(&db, "cava").unwrap();
        assert_eq!(
            cava.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(),
            vec!["v2", "v1"]
        );
        assert_eq!(cava[0].menu[0].id, "v2-item");

        let all = get_all_menu_versions(&db).unwrap();
        assert_eq!(all["cava"].len(), 2);
        assert_eq!(all["cava"][0].id, "v2");
        assert_eq!(all["chipotle"].len(), 1);
    }

    #[test]
    fn corrupt_version_rows_are_skipped() {
        let (_dir, db) = temp_db();
        insert_menu_version(&db, &version("ok", "cava", 1)).unwrap();

        let conn = Connection::open(&db).unwrap();
        conn.execute(
            "insert into menu_versions (id, restaurant_id, json_text) values ('bad', 'cava', '{nope')",
            [],
        )
        .unwrap();

        let versions = get_menu_versions(&db, "cava").unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].id, "ok");
    }

    #[test]
    fn orders_round_trip_and_delete() {
        let (_dir, db) = temp_db();

        let order = |id: &str| Order {
            id: id.to_string(),
            restaurant_id: "cava".to_string(),
            name: "lunch".to_string(),
            creator: "Sam".to_string(),
            items: vec!["cava-prot-chicken".to_string()],
            custom_items: vec!["extra napkins".to_string()],
            timestamp: 42,
        };

        insert_order(&db, &order("o1")).unwrap();
        insert_order(&db, &order("o2")).unwrap();

        let orders = get_orders(&db).unwrap();
        assert_eq!(
            orders.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["o2", "o1"]
        );
        assert_eq!(orders[0].custom_items, vec!["extra napkins"]);

        delete_order(&db, "o2").unwrap();
        let orders = get_orders(&db).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, "o1");

        // deleting a ghost id is a no-op
        delete_order(&db, "o9").unwrap();
    }

    #[test]
    fn custom_restaurant_upsert_replaces() {
        let (_dir, db) = temp_db();

        let mut r = Restaurant {
            id: "custom-1".to_string(),
            name: "Lucy's".to_string(),
            logo: "🍽️".to_string(),
            color: "stone".to_string(),
            url: None,
            menu: Vec::new(),
            presets: Vec::new(),
            address: None,
            phone_number: None,
            rating: None,
            delivery_apps: None,
        };
        upsert_custom_restaurant(&db, &r).unwrap();
        assert!(get_custom_restaurant(&db, "custom-1").unwrap().is_some());
        assert!(get_custom_restaurant(&db, "custom-2").unwrap().is_none());

        r.phone_number = Some("(973) 555-0199".to_string());
        upsert_custom_restaurant(&db, &r).unwrap();

        let loaded = get_custom_restaurants(&db).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].phone_number.as_deref(), Some("(973) 555-0199"));
    }
}
