mod payments;
mod settlements;

pub(crate) use payments::PgPaymentsRepository;
pub(crate) use settlements::PgSettlementsRepository;
