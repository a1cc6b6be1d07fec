mod auth;
mod health_check;

pub use auth::{
    account_overview, change_password, delete_user, login, refresh, register, update_user,
};
pub use health_check::health_check;
