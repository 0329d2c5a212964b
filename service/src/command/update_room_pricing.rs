//! [`Command`] for updating the pricing of a [`Room`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;

use crate::{
    domain::{room, Room},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating the pricing of a [`Room`].
///
/// Affects only future derivations: prices of already existing [`Booking`]s
/// are never touched retroactively.
///
/// [`Booking`]: crate::domain::Booking
#[derive(Clone, Debug)]
pub struct UpdateRoomPricing {
    /// ID of the [`Room`] to be updated.
    pub room_id: room::Id,

    /// New tax-exclusive nightly rate of the [`Room`].
    pub base_price: Money,

    /// New nightly rate overrides of the [`Room`].
    pub special_prices: Vec<room::SpecialPrice>,
}

impl<Db, N> Command<UpdateRoomPricing> for Service<Db, N>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<Lock<By<Room, room::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<Update<Room>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Room;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateRoomPricing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateRoomPricing {
            room_id,
            base_price,
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

        self.database()
            .execute(Select(By::<Option<Room>, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(room_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Room`.
        tx.execute(Lock(By::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut room = tx
            .execute(Select(By::<Option<Room>, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(room_id))
            .map_err(tracerr::wrap!())?;

        room.base_price = base_price;
        room.special_prices = special_prices;

        tx.execute(Update(room.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(room)
    }
}

/// Error of [`UpdateRoomPricing`] [`Command`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided nightly rate is negative.
    #[display("nightly rate cannot be negative: {_0}")]
    NegativePrice(#[error(not(source))] Money),

    /// [`Room`] with the provided ID does not exist.
    #[display("`Room(id: {_0})` does not exist")]
    RoomNotExists(#[error(not(source))] room::Id),
}
