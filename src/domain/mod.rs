/// Domain entities
///
/// Plain data carried between the stores and the service layer. Rows map
/// onto these structs directly; no lazy loading, every field is present
/// once a value exists.

mod login_history;
mod user;

pub use login_history::LoginEvent;
pub use user::User;
