//! [`Command`] for creating a new [`Room`].

use common::{
    operations::Insert,
    DateTime, Money,
};
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;

use crate::{
    domain::{room, Room},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Room`].
#[derive(Clone, Debug)]
pub struct CreateRoom {
    /// Human-facing [`room::Number`] of the new [`Room`].
    pub number: room::Number,

    /// [`room::Kind`] of the new [`Room`].
    pub kind: room::Kind,

    /// Tax-exclusive nightly rate of the new [`Room`].
    pub base_price: Money,

    /// Maximum number of guests the new [`Room`] accommodates.
    pub max_occupancy: room::MaxOccupancy,

    /// Nightly rate overrides of the new [`Room`].
    pub special_prices: Vec<room::SpecialPrice>,
}

impl<Db, N> Command<CreateRoom> for Service<Db, N>
where
    Db: Database<Insert<Room>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Room;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateRoom) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateRoom {
            number,
            kind,
            base_price,
            max_occupancy,
            special_prices,
        } = cmd;

        if base_price.is_negative() {
            return Err(tracerr::new!(E::NegativePrice(base_price)));
        }
        if let Some(special) =
            special_prices.iter().find(|s| s.price.is_negative())
        {
            return Err(tracerr::new!(E::NegativePrice(special.price)));
        }

        let room = Room {
            id: room::Id::new(),
            number,
            kind,
            base_price,
            max_occupancy,
            special_prices,
            created_at: DateTime::now().coerce(),
        };

        // The unique index on `rooms.number` arbitrates concurrent creations
        // of the same number.
        if let Err(e) = self.database().execute(Insert(room.clone())).await {
            if e.as_ref().is_unique_violation(Some("rooms_number_key")) {
                return Err(tracerr::new!(E::NumberOccupied(room.number)));
            }
            return Err(e).map_err(tracerr::map_from_and_wrap!(=> E));
        }

        Ok(room)
    }
}

/// Error of [`CreateRoom`] [`Command`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided nightly rate is negative.
    #[display("nightly rate cannot be negative: {_0}")]
    NegativePrice(#[error(not(source))] Money),

    /// [`room::Number`] is occupied by another [`Room`].
    #[display("`room::Number({_0})` is occupied by another `Room`")]
    NumberOccupied(#[error(not(source))] room::Number),
}
