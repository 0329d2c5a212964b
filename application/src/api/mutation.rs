//! GraphQL [`Mutation`]s definitions.

use common::{Date, DateTime, Money};
use juniper::graphql_object;
use service::{command, domain::booking::price, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `Booking` of the specified `Room`.
    ///
    /// Exactly one of `base_price`, `price_per_night` or `total_price` must
    /// be provided: the other two price fields are derived from it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROOM_NOT_EXISTS` - the `Room` with the specified ID does not exist;
    /// - `ROOM_UNAVAILABLE` - the `Room` is already booked over the
    ///                        requested period;
    /// - `INVALID_DATE_RANGE` - `check_out` is not after `check_in`;
    /// - `INVALID_PRICE_INPUT` - the provided price cannot be derived from;
    /// - `AMBIGUOUS_PRICE_INPUT` - not exactly one price field is provided;
    /// - `BOOKING_NUMBER_ASSIGNMENT_FAILED` - a unique booking number could
    ///                                        not be assigned, try again.
    #[tracing::instrument(
        skip_all,
        fields(
            check_in = %check_in,
            check_out = %check_out,
            gql.name = "createBooking",
            is_tourist = %is_tourist,
            room = %room,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "GraphQL field arguments")]
    pub async fn create_booking(
        room: api::room::Id,
        guest: api::booking::GuestInput,
        check_in: Date,
        check_out: Date,
        is_tourist: bool,
        base_price: Option<Money>,
        price_per_night: Option<Money>,
        total_price: Option<Money>,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let anchor = price_anchor(base_price, price_per_night, total_price)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateBooking {
                room_id: room.into(),
                guest: guest.into(),
                check_in,
                check_out,
                anchor,
                is_tourist,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Confirms the pending `Booking` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist;
    /// - `BOOKING_NOT_PENDING` - the `Booking` is not pending a confirmation.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "confirmBooking",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn confirm_booking(
        id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        ctx.service()
            .execute(command::ConfirmBooking {
                booking_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Re-derives the prices of the `Booking` from the single provided price
    /// field.
    ///
    /// The other two price fields are recomputed, so the three never get out
    /// of sync.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist;
    /// - `BOOKING_NOT_EDITABLE` - the `Booking` is cancelled or completed;
    /// - `INVALID_PRICE_INPUT` - the provided price cannot be derived from;
    /// - `AMBIGUOUS_PRICE_INPUT` - not exactly one price field is provided.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateBookingPrice",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_booking_price(
        id: api::booking::Id,
        base_price: Option<Money>,
        price_per_night: Option<Money>,
        total_price: Option<Money>,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let anchor = price_anchor(base_price, price_per_night, total_price)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::UpdateBookingPrice {
                booking_id: id.into(),
                anchor,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the payment status of the `Booking` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updatePaymentStatus",
            id = %id,
            payment_status = ?payment_status,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_payment_status(
        id: api::booking::Id,
        payment_status: api::booking::PaymentStatus,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        ctx.service()
            .execute(command::UpdatePaymentStatus {
                booking_id: id.into(),
                payment_status: payment_status.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the `Booking` with the specified ID.
    ///
    /// The cancellation is free of charge when at least the configured
    /// number of days (3 by default) remain until check-in; otherwise the
    /// whole total price is charged as the fee.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist;
    /// - `ALREADY_CANCELLED` - the `Booking` is already cancelled;
    /// - `BOOKING_NOT_CANCELLABLE` - the stay is already underway or over.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cancelBooking",
            id = %id,
            reason = ?reason.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_booking(
        id: api::booking::Id,
        reason: Option<api::booking::CancellationReason>,
        ctx: &Context,
    ) -> Result<api::booking::CancellationOutcome, Error> {
        let output = ctx
            .service()
            .execute(command::CancelBooking {
                booking_id: id.into(),
                reason: reason.map(Into::into),
                now: DateTime::now(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(api::booking::CancellationOutcome {
            booking: output.booking.into(),
            fee: output.fee,
            is_full_refund: output.is_full_refund,
        })
    }

    /// Moves the `Booking` to the specified `Room` and start day, keeping
    /// its number of nights.
    ///
    /// Nothing is written when the target `Room` is unavailable, so the
    /// calendar can revert the move on a conflict.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist;
    /// - `BOOKING_NOT_MOVABLE` - the `Booking` is cancelled or completed;
    /// - `ROOM_NOT_EXISTS` - the target `Room` does not exist;
    /// - `ROOM_UNAVAILABLE` - the target `Room` is already booked over the
    ///                        moved period.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "moveBooking",
            id = %id,
            target_date = %target_date,
            target_room = %target_room,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn move_booking(
        id: api::booking::Id,
        target_room: api::room::Id,
        target_date: Date,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        ctx.service()
            .execute(command::MoveBooking {
                booking_id: id.into(),
                target_room_id: target_room.into(),
                target_date,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Room` with the provided details.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROOM_NUMBER_OCCUPIED` - the provided number is occupied by another
    ///                            `Room`;
    /// - `INVALID_PRICE_INPUT` - a provided nightly rate is negative;
    /// - `INVALID_PRICE_KEY` - a special price key is neither a weekday name
    ///                         nor a date.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createRoom",
            kind = ?kind,
            max_occupancy = %max_occupancy,
            number = %number,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_room(
        number: api::room::Number,
        kind: api::room::Kind,
        base_price: Money,
        max_occupancy: i32,
        special_prices: Option<Vec<api::room::SpecialPriceInput>>,
        ctx: &Context,
    ) -> Result<api::Room, Error> {
        let special_prices = special_prices
            .unwrap_or_default()
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Error::from(PriceKeyError::Invalid))
            .map_err(ctx.error())?;
        let max_occupancy = u16::try_from(max_occupancy)
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateRoom {
                number: number.into(),
                kind: kind.into(),
                base_price,
                max_occupancy,
                special_prices,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the pricing of the `Room` with the specified ID.
    ///
    /// Prices of already existing `Booking`s are not touched.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROOM_NOT_EXISTS` - the `Room` with the specified ID does not exist;
    /// - `INVALID_PRICE_INPUT` - a provided nightly rate is negative;
    /// - `INVALID_PRICE_KEY` - a special price key is neither a weekday name
    ///                         nor a date.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateRoomPricing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_room_pricing(
        id: api::room::Id,
        base_price: Money,
        special_prices: Option<Vec<api::room::SpecialPriceInput>>,
        ctx: &Context,
    ) -> Result<api::Room, Error> {
        let special_prices = special_prices
            .unwrap_or_default()
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Error::from(PriceKeyError::Invalid))
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::UpdateRoomPricing {
                room_id: id.into(),
                base_price,
                special_prices,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

/// Builds a [`price::Anchor`] out of the mutually exclusive price arguments.
fn price_anchor(
    base_price: Option<Money>,
    price_per_night: Option<Money>,
    total_price: Option<Money>,
) -> Result<price::Anchor, Error> {
    match (base_price, price_per_night, total_price) {
        (Some(m), None, None) => Ok(price::Anchor::Base(m)),
        (None, Some(m), None) => Ok(price::Anchor::PerNight(m)),
        (None, None, Some(m)) => Ok(price::Anchor::Total(m)),
        (None, None, None)
        | (Some(_), Some(_), _)
        | (Some(_), _, Some(_))
        | (_, Some(_), Some(_)) => Err(PriceAnchorError::Ambiguous.into()),
    }
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_booking::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::InvalidDateRange(_) => {
                Some(api::query::DateRangeError::Invalid.into())
            }
            E::InvalidPriceInput(_) => Some(PriceInputError::Invalid.into()),
            E::NumberAssignment { .. } => {
                Some(BookingNumberError::AssignmentFailed.into())
            }
            E::RoomNotExists(_) => {
                Some(api::query::RoomError::NotExists.into())
            }
            E::RoomUnavailable { .. } => {
                Some(AvailabilityError::RoomUnavailable.into())
            }
        }
    }
}

impl AsError for command::confirm_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::confirm_booking::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::BookingNotExists(_) => {
                Some(api::query::BookingError::NotExists.into())
            }
            E::BookingNotPending(_) => {
                Some(ConfirmationError::NotPending.into())
            }
        }
    }
}

impl AsError for command::update_booking_price::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::update_booking_price::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::BookingNotExists(_) => {
                Some(api::query::BookingError::NotExists.into())
            }
            E::BookingNotEditable(_) => Some(EditError::NotEditable.into()),
            E::InvalidPriceInput(_) => Some(PriceInputError::Invalid.into()),
        }
    }
}

impl AsError for command::update_payment_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::update_payment_status::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::BookingNotExists(_) => {
                Some(api::query::BookingError::NotExists.into())
            }
        }
    }
}

impl AsError for command::cancel_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::cancel_booking::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::AlreadyCancelled(_) => {
                Some(CancellationError::AlreadyCancelled.into())
            }
            E::BookingNotExists(_) => {
                Some(api::query::BookingError::NotExists.into())
            }
            E::BookingNotCancellable(_) => {
                Some(CancellationError::NotCancellable.into())
            }
        }
    }
}

impl AsError for command::move_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::move_booking::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::BookingNotExists(_) => {
                Some(api::query::BookingError::NotExists.into())
            }
            E::BookingNotMovable(_) => Some(MoveError::NotMovable.into()),
            E::RoomNotExists(_) => {
                Some(api::query::RoomError::NotExists.into())
            }
            E::RoomUnavailable { .. } => {
                Some(AvailabilityError::RoomUnavailable.into())
            }
            E::TargetDateOutOfRange(_) => {
                Some(MoveError::TargetDateOutOfRange.into())
            }
        }
    }
}

impl AsError for command::create_room::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_room::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::NegativePrice(_) => Some(PriceInputError::Invalid.into()),
            E::NumberOccupied(_) => {
                Some(RoomNumberError::Occupied.into())
            }
        }
    }
}

impl AsError for command::update_room_pricing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::update_room_pricing::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::NegativePrice(_) => Some(PriceInputError::Invalid.into()),
            E::RoomNotExists(_) => {
                Some(api::query::RoomError::NotExists.into())
            }
        }
    }
}

define_error! {
    enum AvailabilityError {
        #[code = "ROOM_UNAVAILABLE"]
        #[status = CONFLICT]
        #[message = "These dates are already booked for this `Room`"]
        RoomUnavailable,
    }
}

define_error! {
    enum BookingNumberError {
        #[code = "BOOKING_NUMBER_ASSIGNMENT_FAILED"]
        #[status = CONFLICT]
        #[message = "Failed to assign a unique booking number, try again"]
        AssignmentFailed,
    }
}

define_error! {
    enum CancellationError {
        #[code = "ALREADY_CANCELLED"]
        #[status = CONFLICT]
        #[message = "`Booking` is already cancelled"]
        AlreadyCancelled,

        #[code = "BOOKING_NOT_CANCELLABLE"]
        #[status = CONFLICT]
        #[message = "`Booking` stay is already underway or over"]
        NotCancellable,
    }
}

define_error! {
    enum ConfirmationError {
        #[code = "BOOKING_NOT_PENDING"]
        #[status = CONFLICT]
        #[message = "`Booking` is not pending a confirmation"]
        NotPending,
    }
}

define_error! {
    enum EditError {
        #[code = "BOOKING_NOT_EDITABLE"]
        #[status = CONFLICT]
        #[message = "`Booking` is cancelled or completed and cannot be edited"]
        NotEditable,
    }
}

define_error! {
    enum MoveError {
        #[code = "BOOKING_NOT_MOVABLE"]
        #[status = CONFLICT]
        #[message = "`Booking` is cancelled or completed and cannot be moved"]
        NotMovable,

        #[code = "TARGET_DATE_OUT_OF_RANGE"]
        #[status = BAD_REQUEST]
        #[message = "Target date is out of the supported range"]
        TargetDateOutOfRange,
    }
}

define_error! {
    enum PriceAnchorError {
        #[code = "AMBIGUOUS_PRICE_INPUT"]
        #[status = BAD_REQUEST]
        #[message = "Exactly one price field must be provided"]
        Ambiguous,
    }
}

define_error! {
    enum PriceInputError {
        #[code = "INVALID_PRICE_INPUT"]
        #[status = BAD_REQUEST]
        #[message = "Provided price cannot be derived from"]
        Invalid,
    }
}

define_error! {
    enum PriceKeyError {
        #[code = "INVALID_PRICE_KEY"]
        #[status = BAD_REQUEST]
        #[message = "Special price key must be a weekday name or a date"]
        Invalid,
    }
}

define_error! {
    enum RoomNumberError {
        #[code = "ROOM_NUMBER_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Provided number is occupied by another `Room`"]
        Occupied,
    }
}
