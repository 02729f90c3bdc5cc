//! Booking registration repository for database operations.
//!
//! Administrator decisions run as single transactions: the booking row is
//! locked, the inventory reservation is all-or-nothing, and the event is
//! materialized before the status flips to its terminal value. Two
//! administrators deciding the same booking serialize on the row lock; the
//! loser observes the terminal status and gets `AlreadyDecided`.

use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use domain::models::booking::{BookingStatus, CreateBookingRequest};
use domain::models::event::{RegistrationSource, RequiredField};
use domain::models::inventory::InventoryRequest;

use crate::entities::{
    BookingInventoryRequestEntity, BookingRegistrationEntity, BookingSource, BookingStatusDb,
};
use crate::metrics::QueryTimer;
use crate::repositories::inventory::ReserveError;
use crate::repositories::{EventRepository, GroupRepository, InventoryRepository};

const BOOKING_COLUMNS: &str = "id, requester_name, requester_email, title, description, location, \
                               starts_at, ends_at, all_day, label, group_id, status, \
                               decision_note, event_id, created_at, updated_at, decided_at";

/// Errors from submitting a booking.
#[derive(Debug, Error)]
pub enum CreateBookingError {
    #[error("Requested inventory item does not exist")]
    UnknownItem,

    #[error("Requested group does not exist")]
    UnknownGroup,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Errors from deciding a booking.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("Booking registration not found")]
    NotFound,

    /// The registration is terminal; the attempted transition is a no-op.
    #[error("Booking registration already {status}")]
    AlreadyDecided { status: BookingStatus },

    /// Approval needs resolvable event fields; the booking stays pending.
    #[error("Booking registration is incomplete")]
    Incomplete(Vec<RequiredField>),

    /// Reservation failed; nothing was allocated and the booking stays
    /// pending for the administrator to resolve.
    #[error("Insufficient inventory for item {item_id}: requested {requested}, available {available}")]
    InventoryUnavailable {
        item_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl From<ReserveError> for DecisionError {
    fn from(err: ReserveError) -> Self {
        match err {
            ReserveError::Insufficient {
                item_id,
                requested,
                available,
            } => DecisionError::InventoryUnavailable {
                item_id,
                requested,
                available,
            },
            ReserveError::Db(err) => DecisionError::Db(err),
        }
    }
}

/// Repository for booking registration database operations.
#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Creates a new BookingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a submitted booking with its inventory request rows.
    pub async fn create(
        &self,
        request: &CreateBookingRequest,
    ) -> Result<(BookingRegistrationEntity, Vec<InventoryRequest>), CreateBookingError> {
        let timer = QueryTimer::new("create_booking");

        let mut tx = self.pool.begin().await?;

        let booking = sqlx::query_as::<_, BookingRegistrationEntity>(&format!(
            r#"
            INSERT INTO booking_registrations
                (requester_name, requester_email, title, description, location,
                 starts_at, ends_at, all_day, label, group_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {BOOKING_COLUMNS}
            "#,
        ))
        .bind(&request.requester_name)
        .bind(&request.requester_email)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.location)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .bind(request.all_day)
        .bind(&request.label)
        .bind(request.group_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_create_error)?;

        for item in &request.inventory {
            sqlx::query(
                r#"
                INSERT INTO booking_inventory_requests (booking_id, item_id, quantity)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(booking.id)
            .bind(item.item_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(map_create_error)?;
        }

        tx.commit().await?;
        timer.record();

        Ok((booking, request.inventory.clone()))
    }

    /// Find a booking and its inventory requests by id.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<(BookingRegistrationEntity, Vec<InventoryRequest>)>, sqlx::Error> {
        let timer = QueryTimer::new("find_booking_by_id");
        let booking = sqlx::query_as::<_, BookingRegistrationEntity>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM booking_registrations
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        match booking {
            Some(booking) => {
                let requests = self.requests_for(booking.id).await?;
                Ok(Some((booking, requests)))
            }
            None => Ok(None),
        }
    }

    /// List bookings, newest first, with an optional status filter.
    ///
    /// Returns one page plus the unfiltered total for that status.
    pub async fn list(
        &self,
        status: Option<BookingStatusDb>,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<(BookingRegistrationEntity, Vec<InventoryRequest>)>, i64), sqlx::Error> {
        let timer = QueryTimer::new("list_bookings");
        let offset = (page.max(1) - 1) * per_page;

        let bookings = sqlx::query_as::<_, BookingRegistrationEntity>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM booking_registrations
            WHERE ($1::booking_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(status)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM booking_registrations
            WHERE ($1::booking_status IS NULL OR status = $1)
            "#,
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let ids: Vec<Uuid> = bookings.iter().map(|b| b.id).collect();
        let request_rows = sqlx::query_as::<_, BookingInventoryRequestEntity>(
            r#"
            SELECT booking_id, item_id, quantity
            FROM booking_inventory_requests
            WHERE booking_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        let paired = bookings
            .into_iter()
            .map(|booking| {
                let requests = request_rows
                    .iter()
                    .filter(|row| row.booking_id == booking.id)
                    .map(InventoryRequest::from)
                    .collect();
                (booking, requests)
            })
            .collect();

        Ok((paired, total))
    }

    /// Approve a pending booking.
    ///
    /// One transaction: lock the row, reserve the requested inventory
    /// all-or-nothing, materialize the event, flip the status to approved.
    /// Any failure rolls everything back and the booking stays pending.
    pub async fn approve(
        &self,
        id: Uuid,
        note: Option<&str>,
        fallback_group_name: &str,
        fallback_group_color: &str,
    ) -> Result<BookingRegistrationEntity, DecisionError> {
        let timer = QueryTimer::new("approve_booking");

        let mut tx = self.pool.begin().await.map_err(DecisionError::Db)?;

        let booking = Self::lock_for_decision(&mut tx, id).await?;

        let requests: Vec<InventoryRequest> = sqlx::query_as::<_, BookingInventoryRequestEntity>(
            r#"
            SELECT booking_id, item_id, quantity
            FROM booking_inventory_requests
            WHERE booking_id = $1
            "#,
        )
        .bind(booking.id)
        .fetch_all(&mut *tx)
        .await
        .map_err(DecisionError::Db)?
        .iter()
        .map(InventoryRequest::from)
        .collect();

        let source = BookingSource {
            booking: &booking,
            requests: &requests,
        };
        let fields = source.resolved_fields().map_err(DecisionError::Incomplete)?;

        let group_id = match booking.group_id {
            Some(group_id) => group_id,
            None => GroupRepository::ensure_by_name(
                &mut tx,
                fallback_group_name,
                fallback_group_color,
            )
            .await
            .map_err(DecisionError::Db)?,
        };

        InventoryRepository::reserve(&mut tx, &requests).await?;

        let event = EventRepository::materialize(&mut tx, &fields, group_id, &requests)
            .await
            .map_err(DecisionError::Db)?;

        let approved = sqlx::query_as::<_, BookingRegistrationEntity>(&format!(
            r#"
            UPDATE booking_registrations
            SET status = 'approved', event_id = $2, decision_note = $3,
                decided_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#,
        ))
        .bind(booking.id)
        .bind(event.id)
        .bind(note)
        .fetch_one(&mut *tx)
        .await
        .map_err(DecisionError::Db)?;

        tx.commit().await.map_err(DecisionError::Db)?;
        timer.record();

        Ok(approved)
    }

    /// Reject a pending booking. No inventory interaction.
    pub async fn reject(
        &self,
        id: Uuid,
        note: Option<&str>,
    ) -> Result<BookingRegistrationEntity, DecisionError> {
        let timer = QueryTimer::new("reject_booking");
        let rejected = sqlx::query_as::<_, BookingRegistrationEntity>(&format!(
            r#"
            UPDATE booking_registrations
            SET status = 'rejected', decision_note = $2,
                decided_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {BOOKING_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(note)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        match rejected {
            Some(entity) => Ok(entity),
            None => {
                let status: Option<BookingStatusDb> = sqlx::query_scalar(
                    r#"
                    SELECT status
                    FROM booking_registrations
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

                match status {
                    Some(status) => Err(DecisionError::AlreadyDecided {
                        status: status.into(),
                    }),
                    None => Err(DecisionError::NotFound),
                }
            }
        }
    }

    /// Helper: inventory requests attached to a booking.
    pub async fn requests_for(&self, booking_id: Uuid) -> Result<Vec<InventoryRequest>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BookingInventoryRequestEntity>(
            r#"
            SELECT booking_id, item_id, quantity
            FROM booking_inventory_requests
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(InventoryRequest::from).collect())
    }

    /// Lock a booking row for a decision, rejecting terminal registrations.
    async fn lock_for_decision(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<BookingRegistrationEntity, DecisionError> {
        let booking = sqlx::query_as::<_, BookingRegistrationEntity>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM booking_registrations
            WHERE id = $1
            FOR UPDATE
            "#,
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DecisionError::Db)?
        .ok_or(DecisionError::NotFound)?;

        if booking.is_terminal() {
            return Err(DecisionError::AlreadyDecided {
                status: booking.status.into(),
            });
        }

        Ok(booking)
    }
}

fn map_create_error(err: sqlx::Error) -> CreateBookingError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503") => {
            match db_err.constraint() {
                Some(c) if c.contains("item_id") => CreateBookingError::UnknownItem,
                Some(c) if c.contains("group_id") => CreateBookingError::UnknownGroup,
                _ => CreateBookingError::Db(err),
            }
        }
        _ => CreateBookingError::Db(err),
    }
}
