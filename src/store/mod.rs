/// Storage module
///
/// One unit of work per request: every query of a request runs on a single
/// transaction, and nothing becomes durable until `commit`.

mod uow;
mod users;

pub use uow::UnitOfWork;
pub use users::{UserFilter, UserStore};
