//! Repository for the `reservations` table.

use std::collections::HashMap;

use chrono::NaiveDate;
use lodge_core::booking::{status_names, ReservationStatus, BLOCKING_STATUSES};
use lodge_core::types::DbId;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use crate::models::reservation::{
    NewReservation, Reservation, ReservationDetail, ReservationFilter, UpdateReservation,
};
use crate::repositories::RoomRepo;

const COLUMNS: &str = "id, confirmation_code, guest_first_name, guest_last_name, guest_email, \
                       guest_phone, guest_street, guest_city, guest_state, guest_zip_code, \
                       room_id, check_in, check_out, guests, total_amount, status, \
                       special_requests, created_at, updated_at";

pub struct ReservationRepo;

impl ReservationRepo {
    /// Insert a new `PENDING` reservation inside an open transaction.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        input: &NewReservation,
    ) -> Result<Reservation, sqlx::Error> {
        let query = format!(
            "INSERT INTO reservations \
                (confirmation_code, guest_first_name, guest_last_name, guest_email, guest_phone, \
                 guest_street, guest_city, guest_state, guest_zip_code, room_id, check_in, \
                 check_out, guests, total_amount, special_requests, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(&input.confirmation_code)
            .bind(&input.guest_first_name)
            .bind(&input.guest_last_name)
            .bind(&input.guest_email)
            .bind(&input.guest_phone)
            .bind(&input.guest_street)
            .bind(&input.guest_city)
            .bind(&input.guest_state)
            .bind(&input.guest_zip_code)
            .bind(input.room_id)
            .bind(input.check_in)
            .bind(input.check_out)
            .bind(input.guests)
            .bind(input.total_amount)
            .bind(&input.special_requests)
            .bind(ReservationStatus::Pending.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Whether any `PENDING`/`CONFIRMED` reservation on the room overlaps
    /// `[check_in, check_out)`. `exclude` skips one reservation id, for
    /// re-checking an existing booking against its neighbours.
    pub async fn has_overlap<'e, E>(
        executor: E,
        room_id: DbId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude: Option<DbId>,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS ( \
                 SELECT 1 FROM reservations \
                 WHERE room_id = $1 \
                   AND status = ANY($2) \
                   AND check_in < $4 \
                   AND check_out > $3 \
                   AND ($5::BIGINT IS NULL OR id <> $5) \
             )",
        )
        .bind(room_id)
        .bind(status_names(&BLOCKING_STATUSES))
        .bind(check_in)
        .bind(check_out)
        .bind(exclude)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reservations WHERE id = $1");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reservations WHERE confirmation_code = $1");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Filtered list ordered by check-in, latest first.
    pub async fn list(
        pool: &PgPool,
        filter: &ReservationFilter,
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reservations
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::DATE IS NULL OR check_in >= $2)
               AND ($3::DATE IS NULL OR check_in <= $3)
               AND ($4::BIGINT IS NULL OR room_id = $4)
               AND ($5::TEXT IS NULL OR room_id IN (SELECT id FROM rooms WHERE room_type = $5))
             ORDER BY check_in DESC, id DESC"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(&filter.status)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.room_id)
            .bind(&filter.room_type)
            .fetch_all(pool)
            .await
    }

    /// Reservations in `statuses` that touch `[start, next)`: checking in
    /// before `next` and checking out on or after `start`.
    pub async fn list_touching(
        pool: &PgPool,
        start: NaiveDate,
        next: NaiveDate,
        statuses: &[ReservationStatus],
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reservations \
             WHERE check_in < $2 AND check_out >= $1 AND status = ANY($3) \
             ORDER BY check_in ASC, id ASC"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(start)
            .bind(next)
            .bind(status_names(statuses))
            .fetch_all(pool)
            .await
    }

    /// The most recently created reservations.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reservations ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if the reservation does not exist.
    pub async fn update<'e, E>(
        executor: E,
        id: DbId,
        input: &UpdateReservation,
    ) -> Result<Option<Reservation>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE reservations SET
                guest_first_name = COALESCE($2, guest_first_name),
                guest_last_name = COALESCE($3, guest_last_name),
                guest_email = COALESCE($4, guest_email),
                guest_phone = COALESCE($5, guest_phone),
                guest_street = COALESCE($6, guest_street),
                guest_city = COALESCE($7, guest_city),
                guest_state = COALESCE($8, guest_state),
                guest_zip_code = COALESCE($9, guest_zip_code),
                room_id = COALESCE($10, room_id),
                check_in = COALESCE($11, check_in),
                check_out = COALESCE($12, check_out),
                guests = COALESCE($13, guests),
                total_amount = COALESCE($14, total_amount),
                status = COALESCE($15, status),
                special_requests = COALESCE($16, special_requests)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(&input.guest_first_name)
            .bind(&input.guest_last_name)
            .bind(&input.guest_email)
            .bind(&input.guest_phone)
            .bind(&input.guest_street)
            .bind(&input.guest_city)
            .bind(&input.guest_state)
            .bind(&input.guest_zip_code)
            .bind(input.room_id)
            .bind(input.check_in)
            .bind(input.check_out)
            .bind(input.guests)
            .bind(input.total_amount)
            .bind(&input.status)
            .bind(&input.special_requests)
            .fetch_optional(executor)
            .await
    }

    /// Set the status of one reservation.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: ReservationStatus,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!("UPDATE reservations SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Hard delete. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Room embedding
    // -----------------------------------------------------------------------

    /// Attach the room to one reservation.
    pub async fn with_room(
        pool: &PgPool,
        reservation: Reservation,
    ) -> Result<ReservationDetail, sqlx::Error> {
        let room = RoomRepo::find_by_id(pool, reservation.room_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok(ReservationDetail { reservation, room })
    }

    /// Attach rooms to a batch of reservations with a single room query,
    /// preserving the input order.
    pub async fn with_rooms(
        pool: &PgPool,
        reservations: Vec<Reservation>,
    ) -> Result<Vec<ReservationDetail>, sqlx::Error> {
        let mut ids: Vec<DbId> = reservations.iter().map(|r| r.room_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let rooms: HashMap<DbId, _> = RoomRepo::find_by_ids(pool, &ids)
            .await?
            .into_iter()
            .map(|room| (room.id, room))
            .collect();

        reservations
            .into_iter()
            .map(|reservation| {
                let room = rooms
                    .get(&reservation.room_id)
                    .cloned()
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok(ReservationDetail { reservation, room })
            })
            .collect()
    }
}
