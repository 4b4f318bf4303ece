mod auth;
mod groups;
mod health_check;
mod transactions;
mod users;

pub use auth::{login, logout, register, register_admin};
pub use groups::{create_group, get_group};
pub use health_check::health_check;
pub use transactions::{
    create_transaction, list_all_transactions, list_group_transactions, list_user_transactions,
};
pub use users::{get_user, list_users};
