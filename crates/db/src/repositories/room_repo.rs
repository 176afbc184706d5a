//! Repository for the `rooms` table.

use chrono::NaiveDate;
use lodge_core::booking::{status_names, BLOCKING_STATUSES};
use lodge_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::room::{CreateRoom, Room, UpdateRoom};

const COLUMNS: &str = "id, name, room_number, room_type, description, capacity, base_price, \
                       amenities, images, is_active, created_at, updated_at";

/// Rooms are never hard-deleted; see [`RoomRepo::deactivate`].
pub struct RoomRepo;

impl RoomRepo {
    pub async fn create(pool: &PgPool, input: &CreateRoom) -> Result<Room, sqlx::Error> {
        let query = format!(
            "INSERT INTO rooms \
                (name, room_number, room_type, description, capacity, base_price, amenities, images) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(&input.name)
            .bind(&input.room_number)
            .bind(&input.room_type)
            .bind(&input.description)
            .bind(input.capacity)
            .bind(input.base_price)
            .bind(&input.amenities)
            .bind(&input.images)
            .fetch_one(pool)
            .await
    }

    /// Insert unless a room with the same number exists. `None` when skipped.
    pub async fn create_if_absent(
        pool: &PgPool,
        input: &CreateRoom,
    ) -> Result<Option<Room>, sqlx::Error> {
        let query = format!(
            "INSERT INTO rooms \
                (name, room_number, room_type, description, capacity, base_price, amenities, images) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT ON CONSTRAINT uq_rooms_room_number DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(&input.name)
            .bind(&input.room_number)
            .bind(&input.room_type)
            .bind(&input.description)
            .bind(input.capacity)
            .bind(input.base_price)
            .bind(&input.amenities)
            .bind(&input.images)
            .fetch_optional(pool)
            .await
    }

    /// Find a room by id, active or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms WHERE id = $1");
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load several rooms at once, in no particular order.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms WHERE id = ANY($1)");
        sqlx::query_as::<_, Room>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Lock a room row for the rest of the transaction.
    ///
    /// Concurrent bookings of the same room queue up behind this lock, so the
    /// overlap check that follows sees every committed reservation.
    pub async fn lock_for_booking(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Active rooms ordered by category, then price.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Room>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rooms WHERE is_active = true \
             ORDER BY room_type ASC, base_price ASC"
        );
        sqlx::query_as::<_, Room>(&query).fetch_all(pool).await
    }

    /// Active rooms with no blocking reservation in `[check_in, check_out)`.
    pub async fn list_available(
        pool: &PgPool,
        check_in: NaiveDate,
        check_out: NaiveDate,
        min_capacity: Option<i32>,
    ) -> Result<Vec<Room>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rooms rm \
             WHERE rm.is_active = true \
               AND ($3::INT IS NULL OR rm.capacity >= $3) \
               AND NOT EXISTS ( \
                   SELECT 1 FROM reservations r \
                   WHERE r.room_id = rm.id \
                     AND r.status = ANY($4) \
                     AND r.check_in < $2 \
                     AND r.check_out > $1 \
               ) \
             ORDER BY rm.room_type ASC, rm.base_price ASC"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(check_in)
            .bind(check_out)
            .bind(min_capacity)
            .bind(status_names(&BLOCKING_STATUSES))
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if the room does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRoom,
    ) -> Result<Option<Room>, sqlx::Error> {
        let query = format!(
            "UPDATE rooms SET
                name = COALESCE($2, name),
                room_number = COALESCE($3, room_number),
                room_type = COALESCE($4, room_type),
                description = COALESCE($5, description),
                capacity = COALESCE($6, capacity),
                base_price = COALESCE($7, base_price),
                amenities = COALESCE($8, amenities),
                images = COALESCE($9, images),
                is_active = COALESCE($10, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.room_number)
            .bind(&input.room_type)
            .bind(&input.description)
            .bind(input.capacity)
            .bind(input.base_price)
            .bind(&input.amenities)
            .bind(&input.images)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Soft delete. Returns `false` if no room has this id.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE rooms SET is_active = false WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
