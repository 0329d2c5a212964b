//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{domain::booking, query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Booking` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "booking",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn booking(
        id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        ctx.service()
            .execute(query::booking::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| BookingError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Booking`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "bookings",
            guest_name = ?guest_name.as_ref().map(ToString::to_string),
            last = ?last,
            room = ?room.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn bookings(
        first: Option<i32>,
        after: Option<api::booking::list::Cursor>,
        last: Option<i32>,
        before: Option<api::booking::list::Cursor>,
        room: Option<api::room::Id>,
        guest_name: Option<api::booking::GuestName>,
        ctx: &Context,
    ) -> Result<api::booking::list::Connection, Error> {
        const DEFAULT_PAGE_SIZE: i32 = 10;

        let arguments = read::booking::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;

        ctx.service()
            .execute(query::bookings::List::by(
                read::booking::list::Selector {
                    arguments,
                    filter: read::booking::list::Filter {
                        room_id: room.map(Into::into),
                        guest_name: guest_name.map(Into::into),
                    },
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Room` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROOM_NOT_EXISTS` - the `Room` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "room",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn room(
        id: api::room::Id,
        ctx: &Context,
    ) -> Result<api::Room, Error> {
        ctx.service()
            .execute(query::room::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| RoomError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Room`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "rooms",
            last = ?last,
            number = ?number.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn rooms(
        first: Option<i32>,
        after: Option<api::room::list::Cursor>,
        last: Option<i32>,
        before: Option<api::room::list::Cursor>,
        number: Option<api::room::Number>,
        ctx: &Context,
    ) -> Result<api::room::list::Connection, Error> {
        const DEFAULT_PAGE_SIZE: i32 = 10;

        let arguments = read::room::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;

        ctx.service()
            .execute(query::rooms::List::by(read::room::list::Selector {
                arguments,
                filter: read::room::list::Filter {
                    number: number.map(Into::into),
                },
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Checks whether the `Room` is free over the requested period.
    ///
    /// The check is evaluated against the live set of bookings: results are
    /// never cached, and mutations re-validate on their own anyway.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROOM_NOT_EXISTS` - the `Room` with the specified ID does not exist;
    /// - `INVALID_DATE_RANGE` - `check_out` is not after `check_in`.
    #[tracing::instrument(
        skip_all,
        fields(
            check_in = %check_in,
            check_out = %check_out,
            exclude_booking = ?exclude_booking.as_ref()
                .map(ToString::to_string),
            gql.name = "availability",
            room = %room,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn availability(
        room: api::room::Id,
        check_in: Date,
        check_out: Date,
        exclude_booking: Option<api::booking::Id>,
        ctx: &Context,
    ) -> Result<api::booking::Availability, Error> {
        let stay = booking::StayPeriod::new(check_in, check_out)
            .map_err(|_| DateRangeError::Invalid.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::room::ById::by(room.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| RoomError::NotExists.into())
            .map_err(ctx.error())
            .map(drop)?;

        let conflicts = ctx
            .service()
            .execute(query::availability::Conflicts::by(
                read::booking::ProposedStay {
                    room_id: room.into(),
                    stay,
                    exclude: exclude_booking.map(Into::into),
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(api::booking::Availability {
            available: conflicts.is_available(),
            conflicts: conflicts.0.into_iter().map(Into::into).collect(),
        })
    }
}

define_error! {
    enum BookingError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` with the provided ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum RoomError {
        #[code = "ROOM_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Room` with the provided ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum DateRangeError {
        #[code = "INVALID_DATE_RANGE"]
        #[status = BAD_REQUEST]
        #[message = "Check-out date must be strictly after check-in date"]
        Invalid,
    }
}
