//! [`Booking`]-related definitions.

use std::future;

use common::{Date, DateTime, Handler as _, Money, Percent};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar,
};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// A booking of a room.
#[derive(Clone, Debug, From)]
pub struct Booking {
    /// ID of this [`Booking`].
    id: Id,

    /// Underlying [`domain::Booking`].
    booking: OnceCell<domain::Booking>,
}

impl From<domain::Booking> for Booking {
    fn from(booking: domain::Booking) -> Self {
        Self {
            id: booking.id.into(),
            booking: OnceCell::new_with(Some(booking)),
        }
    }
}

impl Booking {
    /// Creates a new [`Booking`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Booking`] with the provided ID exists,
    /// otherwise accessing this [`Booking`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            booking: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Booking`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Booking`] doesn't exist.
    async fn booking(&self, ctx: &Context) -> Result<&domain::Booking, Error> {
        let id = self.id.into();
        self.booking
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::booking::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|b| {
                        future::ready(b.ok_or_else(|| {
                            api::query::BookingError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A booking of a room.
#[graphql_object(context = Context)]
impl Booking {
    /// Unique identifier of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Human-facing sequential number of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.number",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn number(&self, ctx: &Context) -> Result<Number, Error> {
        Ok(self.booking(ctx).await?.number.into())
    }

    /// `Room` this `Booking` reserves.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.room",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn room(&self, ctx: &Context) -> Result<api::Room, Error> {
        let room_id = self.booking(ctx).await?.room_id;
        #[expect(
            unsafe_code,
            reason = "`Booking` existence guarantees its `Room` existence"
        )]
        let room = unsafe { api::Room::new_unchecked(room_id) };
        Ok(room)
    }

    /// Guest this `Booking` is made for.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.guest",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn guest(&self, ctx: &Context) -> Result<Guest, Error> {
        Ok(self.booking(ctx).await?.guest.clone().into())
    }

    /// Day the guest checks in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.checkIn",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn check_in(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.booking(ctx).await?.stay.check_in())
    }

    /// Day the guest checks out.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.checkOut",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn check_out(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.booking(ctx).await?.stay.check_out())
    }

    /// Number of nights of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.nights",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn nights(&self, ctx: &Context) -> Result<i32, Error> {
        i32::try_from(self.booking(ctx).await?.stay.nights())
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Indicator whether the guest is a tourist (VAT-exempt).
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.isTourist",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_tourist(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.booking(ctx).await?.is_tourist)
    }

    /// VAT rate applied when the prices of this `Booking` were derived.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.vatRate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn vat_rate(&self, ctx: &Context) -> Result<Percent, Error> {
        Ok(self.booking(ctx).await?.vat_rate)
    }

    /// Tax-exclusive nightly rate of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.basePrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn base_price(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.booking(ctx).await?.price.base)
    }

    /// Tax-inclusive nightly rate of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.pricePerNight",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn price_per_night(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.booking(ctx).await?.price.per_night)
    }

    /// Tax-inclusive total price of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.totalPrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn total_price(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.booking(ctx).await?.price.total)
    }

    /// Payment status of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.paymentStatus",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn payment_status(
        &self,
        ctx: &Context,
    ) -> Result<PaymentStatus, Error> {
        Ok(self.booking(ctx).await?.payment_status.into())
    }

    /// Stay status of this `Booking`, as of today.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.booking(ctx).await?.status(Date::today_utc()).into())
    }

    /// Reason provided on cancellation, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.cancellationReason",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn cancellation_reason(
        &self,
        ctx: &Context,
    ) -> Result<Option<CancellationReason>, Error> {
        Ok(self
            .booking(ctx)
            .await?
            .cancellation_reason
            .clone()
            .map(Into::into))
    }

    /// Fee charged on cancellation, if this `Booking` is cancelled.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.cancellationFee",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn cancellation_fee(
        &self,
        ctx: &Context,
    ) -> Result<Option<Money>, Error> {
        Ok(self.booking(ctx).await?.cancellation_fee)
    }

    /// `DateTime` when this `Booking` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.booking(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when this `Booking` was confirmed, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.confirmedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn confirmed_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.booking(ctx).await?.confirmed_at.map(|dt| dt.coerce()))
    }

    /// `DateTime` when this `Booking` was cancelled, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.cancelledAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn cancelled_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.booking(ctx).await?.cancelled_at.map(|dt| dt.coerce()))
    }
}

/// Unique identifier of a `Booking`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::booking::Id)]
#[into(domain::booking::Id)]
#[graphql(name = "BookingId", transparent)]
pub struct Id(Uuid);

/// Human-facing sequential number of a `Booking`.
#[derive(Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[from(domain::booking::Number)]
#[into(domain::booking::Number)]
#[graphql(name = "BookingNumber", transparent)]
pub struct Number(i32);

/// Stay status of a `Booking`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "BookingStatus")]
pub enum Status {
    /// The `Booking` awaits confirmation.
    Pending,

    /// The `Booking` is confirmed.
    Confirmed,

    /// The `Booking` is cancelled.
    Cancelled,

    /// The stay is over.
    Completed,
}

impl From<domain::booking::Status> for Status {
    fn from(status: domain::booking::Status) -> Self {
        use domain::booking::Status as S;

        match status {
            S::Pending => Self::Pending,
            S::Confirmed => Self::Confirmed,
            S::Cancelled => Self::Cancelled,
            S::Completed => Self::Completed,
        }
    }
}

/// Payment status of a `Booking`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "BookingPaymentStatus")]
pub enum PaymentStatus {
    /// Payment is awaited.
    Pending,

    /// Partially paid.
    Partial,

    /// Fully paid.
    Paid,

    /// Payment is canceled.
    Canceled,
}

impl From<domain::booking::PaymentStatus> for PaymentStatus {
    fn from(status: domain::booking::PaymentStatus) -> Self {
        use domain::booking::PaymentStatus as S;

        match status {
            S::Pending => Self::Pending,
            S::Partial => Self::Partial,
            S::Paid => Self::Paid,
            S::Canceled => Self::Canceled,
        }
    }
}

impl From<PaymentStatus> for domain::booking::PaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        use PaymentStatus as S;

        match status {
            S::Pending => Self::Pending,
            S::Partial => Self::Partial,
            S::Paid => Self::Paid,
            S::Canceled => Self::Canceled,
        }
    }
}

/// Guest a `Booking` is made for.
#[derive(Clone, Debug, From)]
pub struct Guest(domain::Guest);

/// Guest a `Booking` is made for.
#[graphql_object(name = "BookingGuest", context = Context)]
impl Guest {
    /// Name of this guest.
    #[must_use]
    pub fn name(&self) -> GuestName {
        self.0.name.clone().into()
    }

    /// Email address of this guest.
    #[must_use]
    pub fn email(&self) -> GuestEmail {
        self.0.email.clone().into()
    }

    /// Phone number of this guest.
    #[must_use]
    pub fn phone(&self) -> GuestPhone {
        self.0.phone.clone().into()
    }
}

/// Input describing the guest a `Booking` is made for.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct GuestInput {
    /// Name of the guest.
    pub name: GuestName,

    /// Email address of the guest.
    pub email: GuestEmail,

    /// Phone number of the guest.
    pub phone: GuestPhone,
}

impl From<GuestInput> for domain::Guest {
    fn from(input: GuestInput) -> Self {
        Self {
            name: input.name.into(),
            email: input.email.into(),
            phone: input.phone.into(),
        }
    }
}

/// Name of a `Booking` guest.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "GuestName",
    with = scalar::Via::<domain::guest::Name>,
)]
pub struct GuestName(domain::guest::Name);

/// Email address of a `Booking` guest.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "GuestEmail",
    with = scalar::Via::<domain::guest::Email>,
)]
pub struct GuestEmail(domain::guest::Email);

/// Phone number of a `Booking` guest.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "GuestPhone",
    with = scalar::Via::<domain::guest::Phone>,
)]
pub struct GuestPhone(domain::guest::Phone);

/// Reason provided when cancelling a `Booking`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BookingCancellationReason",
    with = scalar::Via::<domain::booking::CancellationReason>,
)]
pub struct CancellationReason(domain::booking::CancellationReason);

/// Availability of a `Room` over a requested period.
#[derive(Clone, Debug)]
pub struct Availability {
    /// Indicator whether the `Room` is available.
    pub available: bool,

    /// `Booking`s conflicting with the requested period.
    pub conflicts: Vec<Id>,
}

/// Availability of a `Room` over a requested period.
#[graphql_object(name = "RoomAvailability", context = Context)]
impl Availability {
    /// Indicator whether the `Room` is available over the whole requested
    /// period.
    #[must_use]
    pub fn available(&self) -> bool {
        self.available
    }

    /// `Booking`s conflicting with the requested period, if any.
    #[must_use]
    pub fn conflicts(&self) -> Vec<Id> {
        self.conflicts.clone()
    }
}

/// Outcome of a `Booking` cancellation.
#[derive(Clone, Debug)]
pub struct CancellationOutcome {
    /// Cancelled `Booking`.
    pub booking: Booking,

    /// Fee charged for the cancellation.
    pub fee: Money,

    /// Indicator whether the guest is refunded in full.
    pub is_full_refund: bool,
}

/// Outcome of a `Booking` cancellation.
#[graphql_object(name = "BookingCancellationOutcome", context = Context)]
impl CancellationOutcome {
    /// Cancelled `Booking`.
    #[must_use]
    pub fn booking(&self) -> &Booking {
        &self.booking
    }

    /// Fee charged for the cancellation.
    #[must_use]
    pub fn fee(&self) -> Money {
        self.fee
    }

    /// Indicator whether the guest is refunded in full.
    #[must_use]
    pub fn is_full_refund(&self) -> bool {
        self.is_full_refund
    }
}

pub mod list {
    //! Definitions related to [`Booking`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::{query, read, Query as _};

    use crate::{api::scalar, AsError, Context, Error};

    use super::{Booking, Id};

    /// Cursor for the `Booking` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::booking::list::Cursor)]
    #[graphql(
        name = "BookingListCursor",
        with = scalar::Via::<read::booking::list::Cursor>,
    )]
    pub struct Cursor(pub read::booking::list::Cursor);

    /// Edge in the [`Booking`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::booking::list::Edge);

    /// Edge in the `Booking` list.
    #[graphql_object(name = "BookingListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `BookingListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `BookingListEdge`.
        #[must_use]
        pub fn node(&self) -> Booking {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees `Booking` \
                          existence"
            )]
            unsafe {
                Booking::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`Booking`] list.
    #[derive(Clone, Debug, From, Into)]
    pub struct Connection(read::booking::list::Connection);

    /// Connection of the `Booking` list.
    #[graphql_object(name = "BookingListConnection", context = Context)]
    impl Connection {
        /// Edges in this `BookingListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.0.edges.iter().copied().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.0.page_info(),
                start_cursor: self.0.edges.first().map(|e| e.cursor.into()),
                end_cursor: self.0.edges.last().map(|e| e.cursor.into()),
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::booking::list::PageInfo`].
        info: read::booking::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,

        /// End cursor of the page.
        end_cursor: Option<Cursor>,
    }

    /// Information about a `BookingListConnection` page.
    #[graphql_object(name = "BookingListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> &Option<Cursor> {
            &self.start_cursor
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> &Option<Cursor> {
            &self.end_cursor
        }

        /// Total `Booking`s count.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            ctx.service()
                .execute(query::bookings::TotalCount::by(()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }
}
