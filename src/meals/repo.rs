use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Meal record in the recommendation catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: i64,
    pub name: String,
    pub calories: i32,
    pub nutrients: Option<serde_json::Value>,
    pub category: String,
    pub description: Option<String>,
}

const VEGETARIAN_CATEGORIES: &[&str] = &["vegetarian", "vegan", "salad"];
const RESULT_LIMIT: i64 = 10;

/// Catalog filter derived from the `preferences`/`calories` query
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MealFilter {
    pub categories: Option<Vec<String>>,
    pub max_calories: Option<i32>,
}

impl MealFilter {
    pub fn new(preferences: Option<&str>, calories: Option<i32>) -> Self {
        let prefs = preferences.unwrap_or("").to_lowercase();

        // "vegetarian" wins over "vegan" when both appear, and widens to
        // adjacent categories.
        let categories = if prefs.contains("vegetarian") {
            Some(VEGETARIAN_CATEGORIES.iter().map(|s| s.to_string()).collect())
        } else if prefs.contains("vegan") {
            Some(vec!["vegan".to_string()])
        } else if prefs.contains("low-carb") {
            Some(vec!["low-carb".to_string()])
        } else if prefs.contains("high-protein") {
            Some(vec!["high-protein".to_string()])
        } else {
            None
        };

        // Strict cap for weight-loss goals and small budgets; everyone else
        // gets 200 kcal of slack.
        let max_calories = calories.filter(|&c| c != 0).map(|c| {
            if prefs.contains("weight-loss") || c < 500 {
                c
            } else {
                c + 200
            }
        });

        Self {
            categories,
            max_calories,
        }
    }
}

impl Meal {
    pub async fn list_filtered(db: &PgPool, filter: &MealFilter) -> anyhow::Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, name, calories, nutrients, category, description
            FROM meals
            WHERE ($1::text[] IS NULL OR category = ANY($1))
              AND ($2::int IS NULL OR calories <= $2)
            ORDER BY id
            LIMIT $3
            "#,
        )
        .bind(filter.categories.as_deref())
        .bind(filter.max_calories)
        .bind(RESULT_LIMIT)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
