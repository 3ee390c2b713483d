use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

/// One classification job: owner, label, stored image name and the
/// client-supplied sample timestamp.
#[derive(Debug, Clone, FromRow)]
pub struct MushroomInstance {
    pub id: i64,
    pub user_id: i64,
    pub classification_result: Option<String>,
    pub image_name: String,
    pub sample_taken_at: PrimitiveDateTime,
}

impl MushroomInstance {
    pub async fn create(
        db: &PgPool,
        user_id: i64,
        classification_result: Option<&str>,
        image_name: &str,
        sample_taken_at: PrimitiveDateTime,
    ) -> anyhow::Result<MushroomInstance> {
        let instance = sqlx::query_as::<_, MushroomInstance>(
            r#"
            INSERT INTO mushroom_instances (user_id, classification_result, image_name, sample_taken_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, classification_result, image_name, sample_taken_at
            "#,
        )
        .bind(user_id)
        .bind(classification_result)
        .bind(image_name)
        .bind(sample_taken_at)
        .fetch_one(db)
        .await?;
        Ok(instance)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<MushroomInstance>> {
        let instance = sqlx::query_as::<_, MushroomInstance>(
            r#"
            SELECT id, user_id, classification_result, image_name, sample_taken_at
            FROM mushroom_instances
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(instance)
    }

    /// All of a user's jobs, in insertion order.
    pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<MushroomInstance>> {
        let instances = sqlx::query_as::<_, MushroomInstance>(
            r#"
            SELECT id, user_id, classification_result, image_name, sample_taken_at
            FROM mushroom_instances
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(instances)
    }
}
