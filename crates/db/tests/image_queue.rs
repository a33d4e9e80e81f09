//! Integration tests for the `image_generations` queue.

use sqlx::PgPool;
use dramagen_core::image_generation::{GenerationStatus, ImageRequest};
use dramagen_core::providers::{GenerationStatusStore, ImageSubmitter};
use dramagen_db::adapters::PgImageQueue;
use dramagen_db::models::drama::CreateDrama;
use dramagen_db::repositories::{DramaRepo, ImageGenerationRepo};

async fn request(pool: &PgPool) -> ImageRequest {
    let drama = DramaRepo::create(
        pool,
        &CreateDrama {
            title: "Queue".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    ImageRequest {
        drama_id: drama.id,
        image_type: "pose".to_string(),
        prompt: "arm raised, standard motion-capture skeleton diagram".to_string(),
        size: "1024x1024".to_string(),
        provider: "openai".to_string(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_then_complete(pool: PgPool) {
    let queue = PgImageQueue::new(pool.clone());
    let id = queue.submit(&request(&pool).await).await.unwrap();

    let pending = queue.load(id).await.unwrap();
    assert_eq!(pending.status, GenerationStatus::Pending);
    assert!(pending.completed_url().is_none());

    let claimed = ImageGenerationRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(claimed.id, id);
    assert!(claimed.claimed_at.is_some());
    assert!(ImageGenerationRepo::claim_next(&pool).await.unwrap().is_none());

    assert!(ImageGenerationRepo::complete(&pool, id, "https://img/1.png")
        .await
        .unwrap());
    let done = queue.load(id).await.unwrap();
    assert_eq!(done.completed_url(), Some("https://img/1.png"));

    // Terminal rows are not rewritten.
    assert!(!ImageGenerationRepo::fail(&pool, id, "late").await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fail_records_error(pool: PgPool) {
    let queue = PgImageQueue::new(pool.clone());
    let id = queue.submit(&request(&pool).await).await.unwrap();

    assert!(ImageGenerationRepo::fail(&pool, id, "content policy").await.unwrap());
    let failed = queue.load(id).await.unwrap();
    assert_eq!(failed.status, GenerationStatus::Failed);
    assert_eq!(failed.error_message.as_deref(), Some("content policy"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_load_missing_record_is_not_found(pool: PgPool) {
    let queue = PgImageQueue::new(pool);
    assert!(matches!(
        queue.load(404).await,
        Err(dramagen_core::error::CoreError::NotFound { .. })
    ));
}
