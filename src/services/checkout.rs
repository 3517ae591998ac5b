use chrono::Utc;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{CheckoutResult, DeleteResult, InsertResult, NewPayment};

/// Payment recording and cart settlement
pub struct CheckoutService;

impl CheckoutService {
    /// Record a payment and delete the paid cart rows as one transaction.
    ///
    /// Either both the payment row and the cart deletions are committed or
    /// neither is. A `transaction_id` that was already recorded is refused.
    pub async fn record_payment(db: &Database, payment: &NewPayment) -> AppResult<CheckoutResult> {
        let mut tx = db.pool().begin().await?;

        let insert_result = Self::insert_payment(&mut tx, payment).await?;
        let delete_result = Self::delete_cart_items(&mut tx, &payment.cart_items).await?;

        tx.commit().await?;

        tracing::info!(
            "Recorded payment {} for {} ({} cart items cleared)",
            insert_result.inserted_id,
            payment.email,
            delete_result.deleted_count
        );

        Ok(CheckoutResult {
            insert_result,
            delete_result,
        })
    }

    /// Append a payment record without touching the cart
    pub async fn append_payment(db: &Database, payment: &NewPayment) -> AppResult<InsertResult> {
        let mut conn = db.pool().acquire().await?;
        let result = Self::insert_payment(&mut conn, payment).await?;

        tracing::info!("Appended payment {} for {}", result.inserted_id, payment.email);
        Ok(result)
    }

    /// Must stay the first statement of the checkout transaction: a deferred
    /// SQLite transaction that reads before writing cannot wait for the write
    /// lock and fails with SQLITE_BUSY instead.
    async fn insert_payment(
        conn: &mut SqliteConnection,
        payment: &NewPayment,
    ) -> AppResult<InsertResult> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO payments (id, email, price, cart_items, course_ids, transaction_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(payment.email.trim())
        .bind(payment.price)
        .bind(Json(&payment.cart_items))
        .bind(Json(&payment.course_ids))
        .bind(&payment.transaction_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .map_err(|e| match e {
            // transaction_id already recorded, possibly by a concurrent request
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::PaymentAlreadyRecorded(
                    payment.transaction_id.clone().unwrap_or_default(),
                )
            }
            other => AppError::Database(other),
        })?;

        Ok(InsertResult::new(id))
    }

    async fn delete_cart_items(
        conn: &mut SqliteConnection,
        cart_items: &[String],
    ) -> AppResult<DeleteResult> {
        if cart_items.is_empty() {
            return Ok(DeleteResult::new(0));
        }

        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM carts WHERE id IN (");
        let mut ids = query.separated(", ");
        for id in cart_items {
            ids.push_bind(id);
        }
        ids.push_unseparated(")");

        let deleted = query.build().execute(&mut *conn).await?.rows_affected();
        Ok(DeleteResult::new(deleted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Payment;

    async fn setup() -> Database {
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    async fn add_cart_row(db: &Database, id: &str, email: &str) {
        sqlx::query(
            "INSERT INTO carts (id, email, course_id, price, created_at) VALUES (?, ?, 'course-1', 10.0, ?)",
        )
        .bind(id)
        .bind(email)
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn cart_ids(db: &Database) -> Vec<String> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT id FROM carts ORDER BY id")
            .fetch_all(db.pool())
            .await
            .unwrap();
        rows.into_iter().map(|(id,)| id).collect()
    }

    fn payment(cart_items: &[&str], transaction_id: Option<&str>) -> NewPayment {
        NewPayment {
            email: "ana@example.com".to_string(),
            price: 20.0,
            cart_items: cart_items.iter().map(|s| s.to_string()).collect(),
            course_ids: vec!["course-1".to_string()],
            transaction_id: transaction_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn record_removes_only_paid_rows() {
        let db = setup().await;
        for id in ["a", "b", "c"] {
            add_cart_row(&db, id, "ana@example.com").await;
        }

        let result = CheckoutService::record_payment(&db, &payment(&["a", "b"], None))
            .await
            .unwrap();

        assert_eq!(result.delete_result.deleted_count, 2);
        assert_eq!(cart_ids(&db).await, vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_transaction_rolls_back_cart_changes() {
        let db = setup().await;
        add_cart_row(&db, "a", "ana@example.com").await;
        add_cart_row(&db, "b", "ana@example.com").await;

        CheckoutService::record_payment(&db, &payment(&["a"], Some("pi_1")))
            .await
            .unwrap();
        let err = CheckoutService::record_payment(&db, &payment(&["b"], Some("pi_1")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PaymentAlreadyRecorded(ref t) if t == "pi_1"));
        assert_eq!(cart_ids(&db).await, vec!["b".to_string()]);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn stored_payment_keeps_id_lists() {
        let db = setup().await;
        add_cart_row(&db, "a", "ana@example.com").await;

        let result = CheckoutService::record_payment(&db, &payment(&["a"], Some("pi_lists")))
            .await
            .unwrap();

        let stored: Payment = sqlx::query_as("SELECT * FROM payments WHERE id = ?")
            .bind(&result.insert_result.inserted_id)
            .fetch_one(db.pool())
            .await
            .unwrap();

        assert_eq!(stored.cart_items.0, vec!["a".to_string()]);
        assert_eq!(stored.course_ids.0, vec!["course-1".to_string()]);
        assert_eq!(stored.transaction_id.as_deref(), Some("pi_lists"));

        let body = serde_json::to_value(&stored).unwrap();
        assert_eq!(body["cartItems"], serde_json::json!(["a"]));
        assert_eq!(body["transactionId"], "pi_lists");
    }

    async fn file_backed(dir: &tempfile::TempDir) -> Database {
        let url = format!("sqlite:{}", dir.path().join("checkout.db").display());
        let db = Database::connect(&url, 8).await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    async fn concurrent_checkouts(
        db: &Database,
        transaction_ids: Vec<String>,
    ) -> Vec<AppResult<CheckoutResult>> {
        let mut handles = Vec::new();
        for (i, transaction_id) in transaction_ids.into_iter().enumerate() {
            let cart_id = format!("cart-{i}");
            add_cart_row(db, &cart_id, "ana@example.com").await;

            let db = db.clone();
            handles.push(tokio::spawn(async move {
                let payment = payment(&[cart_id.as_str()], Some(transaction_id.as_str()));
                CheckoutService::record_payment(&db, &payment).await
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        results
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_replays_of_one_intent_record_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_backed(&dir).await;

        let results = concurrent_checkouts(&db, vec!["pi_shared".to_string(); 8]).await;

        let recorded = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::PaymentAlreadyRecorded(t)) if t == "pi_shared"))
            .count();
        assert_eq!(recorded, 1, "{results:?}");
        assert_eq!(conflicts, 7, "{results:?}");

        // Only the winning checkout cleared its cart row
        assert_eq!(cart_ids(&db).await.len(), 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_distinct_intents_all_record() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_backed(&dir).await;

        let ids = (0..8).map(|i| format!("pi_{i}")).collect();
        let results = concurrent_checkouts(&db, ids).await;

        assert!(results.iter().all(Result::is_ok), "{results:?}");
        assert!(cart_ids(&db).await.is_empty());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 8);
    }

    #[tokio::test]
    async fn append_leaves_cart_untouched() {
        let db = setup().await;
        add_cart_row(&db, "a", "ana@example.com").await;

        let result = CheckoutService::append_payment(&db, &payment(&["a"], None))
            .await
            .unwrap();

        assert!(result.acknowledged);
        assert_eq!(cart_ids(&db).await, vec!["a".to_string()]);
    }
}
