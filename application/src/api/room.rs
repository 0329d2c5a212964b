//! [`Room`]-related definitions.

use std::future;

use common::{DateTime, Handler as _, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar,
};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// A hotel room.
#[derive(Clone, Debug, From)]
pub struct Room {
    /// ID of this [`Room`].
    id: Id,

    /// Underlying [`domain::Room`].
    room: OnceCell<domain::Room>,
}

impl From<domain::Room> for Room {
    fn from(room: domain::Room) -> Self {
        Self {
            id: room.id.into(),
            room: OnceCell::new_with(Some(room)),
        }
    }
}

impl Room {
    /// Creates a new [`Room`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Room`] with the provided ID exists,
    /// otherwise accessing this [`Room`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            room: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Room`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Room`] doesn't exist.
    async fn room(&self, ctx: &Context) -> Result<&domain::Room, Error> {
        let id = self.id.into();
        self.room
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::room::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|r| {
                        future::ready(r.ok_or_else(|| {
                            api::query::RoomError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A hotel room.
#[graphql_object(context = Context)]
impl Room {
    /// Unique identifier of this `Room`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Room.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Human-facing number of this `Room`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Room.number",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn number(&self, ctx: &Context) -> Result<Number, Error> {
        Ok(self.room(ctx).await?.number.clone().into())
    }

    /// Kind of this `Room`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Room.kind",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn kind(&self, ctx: &Context) -> Result<Kind, Error> {
        Ok(self.room(ctx).await?.kind.into())
    }

    /// Tax-exclusive nightly rate of this `Room`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Room.basePrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn base_price(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.room(ctx).await?.base_price)
    }

    /// Maximum number of guests this `Room` accommodates.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Room.maxOccupancy",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn max_occupancy(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(i32::from(self.room(ctx).await?.max_occupancy))
    }

    /// Nightly rate overrides of this `Room`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Room.specialPrices",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn special_prices(
        &self,
        ctx: &Context,
    ) -> Result<Vec<SpecialPrice>, Error> {
        Ok(self
            .room(ctx)
            .await?
            .special_prices
            .iter()
            .copied()
            .map(Into::into)
            .collect())
    }

    /// `DateTime` when this `Room` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Room.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.room(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Room`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::room::Id)]
#[into(domain::room::Id)]
#[graphql(name = "RoomId", transparent)]
pub struct Id(Uuid);

/// Human-facing number of a `Room`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "RoomNumber",
    with = scalar::Via::<domain::room::Number>,
)]
pub struct Number(domain::room::Number);

/// Kind of a `Room`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "RoomKind")]
pub enum Kind {
    /// A single room.
    Single,

    /// A double room.
    Double,

    /// A twin room.
    Twin,

    /// A suite.
    Suite,

    /// A family room.
    Family,
}

impl From<domain::room::Kind> for Kind {
    fn from(kind: domain::room::Kind) -> Self {
        use domain::room::Kind as K;

        match kind {
            K::Single => Self::Single,
            K::Double => Self::Double,
            K::Twin => Self::Twin,
            K::Suite => Self::Suite,
            K::Family => Self::Family,
        }
    }
}

impl From<Kind> for domain::room::Kind {
    fn from(kind: Kind) -> Self {
        use Kind as K;

        match kind {
            K::Single => Self::Single,
            K::Double => Self::Double,
            K::Twin => Self::Twin,
            K::Suite => Self::Suite,
            K::Family => Self::Family,
        }
    }
}

/// Nightly rate override of a `Room`.
#[derive(Clone, Copy, Debug, From)]
pub struct SpecialPrice(domain::room::SpecialPrice);

/// Nightly rate override of a `Room`.
#[graphql_object(name = "RoomSpecialPrice", context = Context)]
impl SpecialPrice {
    /// Key selecting the nights this override applies to: a weekday name
    /// (e.g. `FRIDAY`) or a concrete `YYYY-MM-DD` date.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.key.to_string()
    }

    /// Overridden tax-exclusive nightly rate.
    #[must_use]
    pub fn price(&self) -> Money {
        self.0.price
    }
}

/// Input describing a nightly rate override of a `Room`.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "RoomSpecialPriceInput")]
pub struct SpecialPriceInput {
    /// Key selecting the nights the override applies to: a weekday name
    /// (e.g. `FRIDAY`) or a concrete `YYYY-MM-DD` date.
    pub key: String,

    /// Overridden tax-exclusive nightly rate.
    pub price: Money,
}

impl TryFrom<SpecialPriceInput> for domain::room::SpecialPrice {
    type Error = &'static str;

    fn try_from(input: SpecialPriceInput) -> Result<Self, Self::Error> {
        Ok(Self {
            key: input.key.parse()?,
            price: input.price,
        })
    }
}

pub mod list {
    //! Definitions related to [`Room`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::{query, read, Query as _};

    use crate::{api::scalar, AsError, Context, Error};

    use super::{Id, Room};

    /// Cursor for the `Room` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::room::list::Cursor)]
    #[graphql(
        name = "RoomListCursor",
        with = scalar::Via::<read::room::list::Cursor>,
    )]
    pub struct Cursor(pub read::room::list::Cursor);

    /// Edge in the [`Room`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::room::list::Edge);

    /// Edge in the `Room` list.
    #[graphql_object(name = "RoomListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `RoomListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `RoomListEdge`.
        #[must_use]
        pub fn node(&self) -> Room {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees `Room` \
                          existence"
            )]
            unsafe {
                Room::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`Room`] list.
    #[derive(Clone, Debug, From, Into)]
    pub struct Connection(read::room::list::Connection);

    /// Connection of the `Room` list.
    #[graphql_object(name = "RoomListConnection", context = Context)]
    impl Connection {
        /// Edges in this `RoomListConnection`.
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
        /// Underlying [`read::room::list::PageInfo`].
        info: read::room::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,

        /// End cursor of the page.
        end_cursor: Option<Cursor>,
    }

    /// Information about a `RoomListConnection` page.
    #[graphql_object(name = "RoomListPageInfo", context = Context)]
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

        /// Total `Room`s count.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            ctx.service()
                .execute(query::rooms::TotalCount::by(()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }
}
