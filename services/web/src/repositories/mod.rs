//! Entity store repositories.

pub mod category;
pub mod item;
pub mod user;

pub use category::CategoryRepository;
pub use item::ItemRepository;
pub use user::UserRepository;
