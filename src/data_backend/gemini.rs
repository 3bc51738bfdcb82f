//! Gemini API client. Two concerns live here: the two-stage menu acquisition
//! pipeline (search-grounded text gathering, then schema-constrained
//! structuring) and the natural-language order mapper.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::constants::{GEMINI_API_BASE, GEMINI_API_KEY, GEMINI_MODEL, MAX_STRUCTURE_INPUT_LEN};
use crate::data_types::menu_data_types::{Ingredient, OrderSuggestion, Restaurant, ScrapedMenu};
use crate::data_types::AiError;

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize, Debug)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// POSTs a generateContent body and returns the raw response text.
async fn generate(body: Value) -> Result<String, AiError> {
    let Some(api_key) = GEMINI_API_KEY.get().and_then(|k| k.as_ref()) else {
        log::warn!("Gemini API is unconfigured, AI features disabled");
        return Err(AiError::Unconfigured);
    };
    let model = GEMINI_MODEL.get().unwrap();

    let client = reqwest::Client::new();
    let res = client
        .post(format!(
            "{GEMINI_API_BASE}/{model}:generateContent?key={api_key}"
        ))
        .json(&body)
        .send()
        .await
        .map_err(|e| AiError::Unavailable(e.to_string()))?;

    if !res.status().is_success() {
        return Err(AiError::Unavailable(format!("HTTP {}", res.status())));
    }

    let envelope: GenerateResponse = res
        .json()
        .await
        .map_err(|e| AiError::BadSchema(e.to_string()))?;

    envelope.text().ok_or(AiError::EmptyResponse)
}

fn order_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "orderName": { "type": "STRING" },
            "itemIds": { "type": "ARRAY", "items": { "type": "STRING" } },
            "reasoning": { "type": "STRING" }
        },
        "required": ["orderName", "itemIds", "reasoning"]
    })
}

fn menu_schema() -> Value {
    let ingredient = json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING" },
            "name": { "type": "STRING" },
            "category": { "type": "STRING" },
            "calories": { "type": "INTEGER" },
            "price": { "type": "NUMBER" },
            "description": { "type": "STRING" }
        },
        "required": ["id", "name", "category"]
    });
    json!({
        "type": "OBJECT",
        "properties": {
            "menu": { "type": "ARRAY", "items": ingredient },
            "presets": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "itemIds": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "description": { "type": "STRING" }
                    },
                    "required": ["name", "itemIds"]
                }
            },
            "info": {
                "type": "OBJECT",
                "properties": {
                    "phoneNumber": { "type": "STRING" },
                    "rating": { "type": "NUMBER" },
                    "deliveryApps": { "type": "ARRAY", "items": { "type": "STRING" } }
                }
            }
        },
        "required": ["menu", "presets"]
    })
}

fn mods_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "modifications": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["modifications"]
    })
}

/// A plain-text menu digest the mapper prompt embeds, one line per item.
fn menu_digest(menu: &[Ingredient]) -> String {
    menu.iter()
        .map(|i| {
            let cal = i
                .calories
                .map(|c| format!(" ({c} cal)"))
                .unwrap_or_default();
            format!("- id={} | {} | {}{}", i.id, i.name, i.category, cal)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every suggested id must come from the menu; anything else is rejected
/// outright rather than silently filtered.
pub fn validate_suggestion(
    suggestion: &OrderSuggestion,
    menu: &[Ingredient],
) -> Result<(), AiError> {
    for id in &suggestion.item_ids {
        if !menu.iter().any(|i| &i.id == id) {
            log::warn!("order mapper invented item id '{id}'");
            return Err(AiError::ForeignItemIds);
        }
    }
    Ok(())
}

/// Maps a free-text wish ("something light, no dairy") onto the active menu.
pub async fn parse_natural_language_order(
    restaurant_name: &str,
    menu: &[Ingredient],
    wish: &str,
) -> Result<OrderSuggestion, AiError> {
    let prompt = format!(
        "You compose food orders at {restaurant_name}. Pick items from the \
         menu below that satisfy the request. Use ONLY the listed ids, never \
         invent one.\n\n\
         Menu:\n{}\n\nRequest: {}",
        menu_digest(menu),
        wish
    );

    let body = json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "temperature": 0.3,
            "responseMimeType": "application/json",
            "responseSchema": order_schema()
        }
    });

    let text = generate(body).await?;
    let suggestion: OrderSuggestion =
        serde_json::from_str(&text).map_err(|e| AiError::BadSchema(e.to_string()))?;

    validate_suggestion(&suggestion, menu)?;
    Ok(suggestion)
}

/// Stage 1a: search-grounded gathering. Used when the hint is a URL or the
/// scrape runs in deep mode.
pub async fn search_menu_text(restaurant: &Restaurant, hint: &str) -> Result<String, AiError> {
    let subject = if hint.trim().is_empty() {
        format!(
            "{}{}",
            restaurant.name,
            restaurant
                .address
                .as_deref()
                .map(|a| format!(" ({a})"))
                .unwrap_or_default()
        )
    } else {
        format!("{} - {}", restaurant.name, hint.trim())
    };

    let prompt = format!(
        "Find the current menu of the restaurant below using web search. \
         Transcribe every item you find with its name, category, price and \
         calories where available. Plain text only, no commentary.\n\n{subject}"
    );

    let body = json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "tools": [{ "googleSearch": {} }]
    });

    generate(body).await
}

/// Stage 1b: general-knowledge fallback when search came up short.
pub async fn fallback_menu_text(restaurant: &Restaurant, hint: &str) -> Result<String, AiError> {
    let context = if hint.trim().is_empty() || crate::data_backend::looks_like_url(hint) {
        String::new()
    } else {
        format!("\nExtra context from the user: {}", hint.trim())
    };

    let prompt = format!(
        "List the typical menu of '{}' from what you know about this kind of \
         restaurant. Item name, category, estimated calories per line. Plain \
         text only.{context}",
        restaurant.name
    );

    let body = json!({
        "contents": [{ "parts": [{ "text": prompt }] }]
    });

    generate(body).await
}

/// Stage 2: turns gathered plain text into a [`ScrapedMenu`]. Input is
/// clipped; item ids come back exactly as the model chose them.
pub async fn structure_menu_text(
    restaurant_name: &str,
    raw: &str,
) -> Result<ScrapedMenu, AiError> {
    let clipped: String = raw.chars().take(MAX_STRUCTURE_INPUT_LEN).collect();

    let prompt = format!(
        "Convert this menu text for {restaurant_name} into the requested \
         JSON. Invent a short kebab-case id for every item, group items into \
         sensible categories, and build 2-5 presets (popular combos) \
         referencing those ids.\n\n{clipped}"
    );

    let body = json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "temperature": 0.2,
            "responseMimeType": "application/json",
            "responseSchema": menu_schema()
        }
    });

    let text = generate(body).await?;
    let scraped: ScrapedMenu =
        serde_json::from_str(&text).map_err(|e| AiError::BadSchema(e.to_string()))?;

    if scraped.menu.is_empty() {
        return Err(AiError::InsufficientText);
    }
    Ok(scraped)
}

/// Suggests common modifications for one item ("no onions", "extra feta").
pub async fn item_modifications(
    restaurant_name: &str,
    item_name: &str,
) -> Result<Vec<String>, AiError> {
    let prompt = format!(
        "Suggest up to 6 short, common modifications people order for \
         '{item_name}' at {restaurant_name}. Two or three words each."
    );

    let body = json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "temperature": 0.4,
            "responseMimeType": "application/json",
            "responseSchema": mods_schema()
        }
    });

    #[derive(Deserialize)]
    struct Mods {
        modifications: Vec<String>,
    }

    let text = generate(body).await?;
    let mods: Mods = serde_json::from_str(&text).map_err(|e| AiError::BadSchema(e.to_string()))?;
    Ok(mods.modifications)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_backend::system_menus;

    #[test]
    fn envelope_text_concatenates_parts() {
        let raw = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "hello " }, { "text": "world" }] }
            }]
        }"#;
        let env: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(env.text().unwrap(), "hello world");
    }

    #[test]
    fn envelope_without_candidates_is_empty() {
        let env: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(env.text().is_none());

        let raw = r#"{ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] }"#;
        let env: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert!(env.text().is_none());
    }

    #[test]
    fn scraped_menu_parses_model_shaped_json() {
        let raw = r#"{
            "menu": [
                { "id": "bagel-plain", "name": "Plain Bagel", "category": "Bagels", "calories": 280 },
                { "id": "bagel-everything", "name": "Everything Bagel", "category": "Bagels", "price": 2.5 }
            ],
            "presets": [
                { "name": "Morning Classic", "itemIds": ["bagel-plain"] }
            ],
            "info": { "phoneNumber": "(973) 555-0101", "deliveryApps": ["DoorDash"] }
        }"#;
        let scraped: ScrapedMenu = serde_json::from_str(raw).unwrap();
        assert_eq!(scraped.menu.len(), 2);
        assert_eq!(scraped.menu[0].calories, Some(280));
        assert_eq!(scraped.presets[0].item_ids, vec!["bagel-plain"]);
        assert!(!scraped.info.unwrap().is_empty());
    }

    #[test]
    fn foreign_ids_are_rejected() {
        let menu = system_menus::system_restaurants()[0].menu.clone();
        let bad = OrderSuggestion {
            order_name: "test".into(),
            item_ids: vec!["cava-prot-chicken".into(), "not-a-real-id".into()],
            reasoning: String::new(),
        };
        assert!(matches!(
            validate_suggestion(&bad, &menu),
            Err(AiError::ForeignItemIds)
        ));

        let good = OrderSuggestion {
            order_name: "test".into(),
            item_ids: vec!["cava-prot-chicken".into()],
            reasoning: String::new(),
        };
        assert!(validate_suggestion(&good, &menu).is_ok());
    }

    #[test]
    fn duplicate_ids_pass_validation() {
        let menu = system_menus::system_restaurants()[0].menu.clone();
        let dup = OrderSuggestion {
            order_name: "double chicken".into(),
            item_ids: vec!["cava-prot-chicken".into(), "cava-prot-chicken".into()],
            reasoning: String::new(),
        };
        assert!(validate_suggestion(&dup, &menu).is_ok());
    }
}
