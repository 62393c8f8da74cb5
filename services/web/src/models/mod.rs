//! Domain entities and form payloads.

pub mod category;
pub mod item;
pub mod user;

pub use category::{Category, CategoryForm};
pub use item::{Item, ItemDetail, ItemForm, NewItem};
pub use user::{NewUser, User, UserForm};
