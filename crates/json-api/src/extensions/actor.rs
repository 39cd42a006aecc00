//! Authenticated caller stored in the depot.

use salvo::prelude::{Depot, StatusError};

use bookstore_app::domain::users::records::Actor;

pub(crate) trait ActorDepotExt {
    fn insert_actor(&mut self, actor: Actor);

    /// The authenticated caller, or 401 when the route ran without one.
    fn actor_or_401(&self) -> Result<Actor, StatusError>;

    /// The caller on routes where authentication is optional.
    fn optional_actor(&self) -> Option<Actor>;
}

impl ActorDepotExt for Depot {
    fn insert_actor(&mut self, actor: Actor) {
        self.inject(actor);
    }

    fn actor_or_401(&self) -> Result<Actor, StatusError> {
        self.optional_actor()
            .ok_or_else(|| StatusError::unauthorized().brief("Authentication required"))
    }

    fn optional_actor(&self) -> Option<Actor> {
        self.obtain::<Actor>().ok().copied()
    }
}
