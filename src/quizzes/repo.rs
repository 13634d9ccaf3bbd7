use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Quiz record; `questions` holds the question list as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub questions: serde_json::Value,
}

impl Quiz {
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Quiz>> {
        let rows = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, title, description, questions
            FROM quizzes
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: i64) -> anyhow::Result<Option<Quiz>> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, title, description, questions
            FROM quizzes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(quiz)
    }
}
