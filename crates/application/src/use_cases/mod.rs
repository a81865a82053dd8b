//! Application use cases (storefront operations on top of the pipeline).

mod auth_session;
mod cart;
mod catalog;
mod dashboard;
mod orders;
mod recommend;

pub use auth_session::{AuthSession, LOGIN_PATH, PROFILE_PATH, REGISTER_PATH};
pub use cart::CartApi;
pub use catalog::BooksApi;
pub use dashboard::{AdminDashboard, CustomerDashboard};
pub use orders::OrdersApi;
pub use recommend::{NO_RECOMMENDATIONS, RecommendApi};
