//! SeaORM implementation of BookingRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::debug;

use crate::domain::booking::pricing::{from_hundredths, to_hundredths};
use crate::domain::booking::{
    Booking, BookingRepository, BookingStatus, PaymentStatus, StatusChange, TimeWindow,
    VehicleInfo,
};
use crate::domain::{BookingId, DomainError, DomainResult, SpotId, UserId};
use crate::infrastructure::database::entities::{booking, booking_spot_guard};
use crate::shared::types::pagination::{Page, PageRequest};

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn page(
        &self,
        query: Select<booking::Entity>,
        page: PageRequest,
    ) -> DomainResult<Page<Booking>> {
        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(booking::Column::StartTime)
            .order_by_desc(booking::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items = models
            .into_iter()
            .map(model_to_domain)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Page::new(items, total, page))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking::Model) -> DomainResult<Booking> {
    let status = m
        .status
        .parse::<BookingStatus>()
        .map_err(|_| corrupt(m.id, "status", &m.status))?;
    let payment_status = m
        .payment_status
        .parse::<PaymentStatus>()
        .map_err(|_| corrupt(m.id, "payment_status", &m.payment_status))?;

    Ok(Booking {
        id: m.id,
        renter_id: m.renter_id,
        spot_id: m.spot_id,
        vehicle_id: m.vehicle_id,
        start_time: m.start_time,
        end_time: m.end_time,
        total_hours: from_hundredths(m.total_hours_hundredths),
        hourly_rate: from_hundredths(m.hourly_rate_cents),
        total_price: from_hundredths(m.total_price_cents),
        status,
        payment_status,
        vehicle_info: VehicleInfo {
            license_plate: m.license_plate,
            make: m.vehicle_make,
            model: m.vehicle_model,
            color: m.vehicle_color,
        },
        special_instructions: m.special_instructions,
        version: m.version,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(b: &Booking) -> DomainResult<booking::ActiveModel> {
    let hundredths = |value, field| {
        to_hundredths(value).ok_or_else(|| corrupt(b.id, field, &value.to_string()))
    };

    Ok(booking::ActiveModel {
        id: Set(b.id),
        renter_id: Set(b.renter_id),
        spot_id: Set(b.spot_id),
        vehicle_id: Set(b.vehicle_id),
        start_time: Set(b.start_time),
        end_time: Set(b.end_time),
        total_hours_hundredths: Set(hundredths(b.total_hours, "total_hours")?),
        hourly_rate_cents: Set(hundredths(b.hourly_rate, "hourly_rate")?),
        total_price_cents: Set(hundredths(b.total_price, "total_price")?),
        status: Set(b.status.as_str().to_string()),
        payment_status: Set(b.payment_status.as_str().to_string()),
        license_plate: Set(b.vehicle_info.license_plate.clone()),
        vehicle_make: Set(b.vehicle_info.make.clone()),
        vehicle_model: Set(b.vehicle_info.model.clone()),
        vehicle_color: Set(b.vehicle_info.color.clone()),
        special_instructions: Set(b.special_instructions.clone()),
        version: Set(b.version),
        created_at: Set(b.created_at),
        updated_at: Set(b.updated_at),
    })
}

fn corrupt(id: BookingId, field: &str, value: &str) -> DomainError {
    DomainError::Storage(format!("booking {id} has invalid {field} `{value}`"))
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

fn slot_taken() -> DomainError {
    DomainError::Conflict("Parking spot is not available for the selected time".to_string())
}

/// Confirmed/active bookings on `spot_id` with `start < window.end AND end > window.start`.
fn blocking_query(
    spot_id: SpotId,
    window: &TimeWindow,
    exclude: Option<BookingId>,
) -> Select<booking::Entity> {
    let blocking = BookingStatus::ALL
        .iter()
        .filter(|s| s.blocks_slot())
        .map(|s| s.as_str());

    let mut query = booking::Entity::find()
        .filter(booking::Column::SpotId.eq(spot_id))
        .filter(booking::Column::Status.is_in(blocking))
        .filter(booking::Column::StartTime.lt(window.end))
        .filter(booking::Column::EndTime.gt(window.start));
    if let Some(id) = exclude {
        query = query.filter(booking::Column::Id.ne(id));
    }
    query.order_by_asc(booking::Column::StartTime)
}

/// Upsert the spot's guard row. Holds a row lock (Postgres) or the write
/// lock (SQLite) until the surrounding transaction ends.
async fn lock_spot<C: ConnectionTrait>(conn: &C, spot_id: SpotId) -> Result<(), sea_orm::DbErr> {
    let guard = booking_spot_guard::ActiveModel {
        spot_id: Set(spot_id),
        version: Set(1),
    };
    booking_spot_guard::Entity::insert(guard)
        .on_conflict(
            OnConflict::column(booking_spot_guard::Column::SpotId)
                .value(
                    booking_spot_guard::Column::Version,
                    Expr::col((booking_spot_guard::Entity, booking_spot_guard::Column::Version))
                        .add(1),
                )
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn find_by_id(&self, id: BookingId) -> DomainResult<Option<Booking>> {
        booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_blocking(
        &self,
        spot_id: SpotId,
        window: &TimeWindow,
        exclude: Option<BookingId>,
    ) -> DomainResult<Vec<Booking>> {
        blocking_query(spot_id, window, exclude)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn insert_if_available(&self, b: Booking) -> DomainResult<Booking> {
        debug!(booking_id = %b.id, spot_id = %b.spot_id, "Inserting booking");
        let model = domain_to_active(&b)?;

        let txn = self.db.begin().await.map_err(db_err)?;
        lock_spot(&txn, b.spot_id).await.map_err(db_err)?;

        let blocking = blocking_query(b.spot_id, &b.window(), None)
            .count(&txn)
            .await
            .map_err(db_err)?;
        if blocking > 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(slot_taken());
        }

        model.insert(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(b)
    }

    async fn apply_change(&self, change: StatusChange) -> DomainResult<Booking> {
        debug!(
            booking_id = %change.booking_id,
            version = change.expected_version,
            claims_slot = change.claims_slot,
            "Applying booking change"
        );
        let id = change.booking_id;
        let txn = self.db.begin().await.map_err(db_err)?;

        if change.claims_slot {
            lock_spot(&txn, change.spot_id).await.map_err(db_err)?;
            let current = booking::Entity::find_by_id(id)
                .one(&txn)
                .await
                .map_err(db_err)?
                .ok_or_else(|| DomainError::not_found("Booking", id))?;

            let window = TimeWindow::new(current.start_time, current.end_time);
            let blocking = blocking_query(change.spot_id, &window, Some(id))
                .count(&txn)
                .await
                .map_err(db_err)?;
            if blocking > 0 {
                txn.rollback().await.map_err(db_err)?;
                return Err(DomainError::Conflict(
                    "Another booking already holds this time slot".to_string(),
                ));
            }
        }

        let mut update = booking::Entity::update_many()
            .col_expr(
                booking::Column::Version,
                Expr::col(booking::Column::Version).add(1),
            )
            .col_expr(booking::Column::UpdatedAt, Expr::value(change.at))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Version.eq(change.expected_version));
        if let Some(status) = change.status {
            update = update.col_expr(booking::Column::Status, Expr::value(status.as_str()));
        }
        if let Some(payment_status) = change.payment_status {
            update = update.col_expr(
                booking::Column::PaymentStatus,
                Expr::value(payment_status.as_str()),
            );
        }

        let result = update.exec(&txn).await.map_err(db_err)?;
        let stored = booking::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Booking", id))?;
        if result.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::ConcurrentModification(id));
        }

        txn.commit().await.map_err(db_err)?;
        model_to_domain(stored)
    }

    async fn list_by_renter(
        &self,
        renter_id: UserId,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> DomainResult<Page<Booking>> {
        let mut query = booking::Entity::find().filter(booking::Column::RenterId.eq(renter_id));
        if let Some(status) = status {
            query = query.filter(booking::Column::Status.eq(status.as_str()));
        }
        self.page(query, page).await
    }

    async fn list_by_spots(
        &self,
        spot_ids: &[SpotId],
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> DomainResult<Page<Booking>> {
        let mut query =
            booking::Entity::find().filter(booking::Column::SpotId.is_in(spot_ids.iter().copied()));
        if let Some(status) = status {
            query = query.filter(booking::Column::Status.eq(status.as_str()));
        }
        self.page(query, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::infrastructure::database::test_database;
    use crate::shared::testing::{at, booking, day_before};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn change(b: &Booking, status: BookingStatus) -> StatusChange {
        StatusChange {
            booking_id: b.id,
            spot_id: b.spot_id,
            expected_version: b.version,
            status: Some(status),
            payment_status: None,
            claims_slot: status.blocks_slot() && !b.status.blocks_slot(),
            at: day_before(),
        }
    }

    #[tokio::test]
    async fn stores_and_loads_every_field() {
        let repo = SeaOrmBookingRepository::new(test_database().await);
        let mut b = booking(Uuid::new_v4(), 10, 12, BookingStatus::Pending);
        b.special_instructions = Some("Gate code 1234".to_string());
        repo.insert_if_available(b.clone()).await.unwrap();

        let loaded = repo.find_by_id(b.id).await.unwrap().unwrap();
        assert_eq!(loaded, b);
        assert_eq!(loaded.total_price, Decimal::new(1000, 2));
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overlap_query_honours_status_and_bounds() {
        let repo = SeaOrmBookingRepository::new(test_database().await);
        let spot = Uuid::new_v4();
        let confirmed = booking(spot, 10, 12, BookingStatus::Confirmed);
        repo.insert_if_available(confirmed.clone()).await.unwrap();
        repo.insert_if_available(booking(spot, 13, 15, BookingStatus::Cancelled))
            .await
            .unwrap();

        let window = TimeWindow::new(at(11, 0), at(14, 0));
        let found = repo.find_blocking(spot, &window, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, confirmed.id);

        assert!(repo
            .find_blocking(spot, &window, Some(confirmed.id))
            .await
            .unwrap()
            .is_empty());
        assert!(repo
            .find_blocking(spot, &TimeWindow::new(at(12, 0), at(13, 0)), None)
            .await
            .unwrap()
            .is_empty());

        let err = repo
            .insert_if_available(booking(spot, 11, 13, BookingStatus::Pending))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn concurrent_inserts_admit_one() {
        let repo = Arc::new(SeaOrmBookingRepository::new(test_database().await));
        let spot = Uuid::new_v4();

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.insert_if_available(booking(spot, 10, 12, BookingStatus::Confirmed))
                        .await
                })
            })
            .collect();

        let mut ok = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert!(matches!(e, DomainError::Conflict(_))),
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn optimistic_update() {
        let repo = SeaOrmBookingRepository::new(test_database().await);
        let b = booking(Uuid::new_v4(), 10, 12, BookingStatus::Pending);
        repo.insert_if_available(b.clone()).await.unwrap();

        let confirmed = repo
            .apply_change(change(&b, BookingStatus::Confirmed))
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert_eq!(confirmed.version, 2);
        assert_eq!(confirmed.updated_at, day_before());

        let err = repo
            .apply_change(change(&b, BookingStatus::Cancelled))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ConcurrentModification(_)));

        let mut missing = change(&b, BookingStatus::Active);
        missing.booking_id = Uuid::new_v4();
        let err = repo.apply_change(missing).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn confirm_rechecks_under_guard() {
        let repo = SeaOrmBookingRepository::new(test_database().await);
        let spot = Uuid::new_v4();
        let first = booking(spot, 10, 12, BookingStatus::Pending);
        let second = booking(spot, 11, 13, BookingStatus::Pending);
        repo.insert_if_available(first.clone()).await.unwrap();
        repo.insert_if_available(second.clone()).await.unwrap();

        repo.apply_change(change(&first, BookingStatus::Confirmed))
            .await
            .unwrap();
        let err = repo
            .apply_change(change(&second, BookingStatus::Confirmed))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let untouched = repo.find_by_id(second.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, BookingStatus::Pending);
        assert_eq!(untouched.version, 1);
    }

    #[tokio::test]
    async fn paginated_listing() {
        let repo = SeaOrmBookingRepository::new(test_database().await);
        let renter = Uuid::new_v4();
        let spot_a = Uuid::new_v4();
        let spot_b = Uuid::new_v4();
        for (spot, start, status) in [
            (spot_a, 8, BookingStatus::Pending),
            (spot_a, 12, BookingStatus::Confirmed),
            (spot_b, 10, BookingStatus::Pending),
        ] {
            let mut b = booking(spot, start, start + 1, status);
            b.renter_id = renter;
            repo.insert_if_available(b).await.unwrap();
        }

        let first = repo
            .list_by_renter(renter, None, PageRequest::new(Some(1), Some(2)))
            .await
            .unwrap();
        assert_eq!(first.total, 3);
        assert_eq!(first.pages, 2);
        assert!(first.has_next);
        let starts: Vec<_> = first.items.iter().map(|b| b.start_time).collect();
        assert_eq!(starts, vec![at(12, 0), at(10, 0)]);

        let second = repo
            .list_by_renter(renter, None, PageRequest::new(Some(2), Some(2)))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(second.has_prev && !second.has_next);

        let on_a = repo
            .list_by_spots(&[spot_a], Some(BookingStatus::Pending), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(on_a.total, 1);
        assert_eq!(on_a.items[0].start_time, at(8, 0));
    }

    #[tokio::test]
    async fn page_far_past_the_end_is_empty() {
        let repo = SeaOrmBookingRepository::new(test_database().await);
        let b = booking(Uuid::new_v4(), 10, 12, BookingStatus::Pending);
        let renter = b.renter_id;
        repo.insert_if_available(b).await.unwrap();

        let page = repo
            .list_by_renter(renter, None, PageRequest::new(Some(u64::MAX / 50), Some(100)))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
        assert_eq!(page.pages, 1);
        assert!(page.has_prev && !page.has_next);
    }
}
