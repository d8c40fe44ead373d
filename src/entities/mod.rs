pub mod items;
pub mod users;

pub mod prelude {
    pub use super::items::Entity as Items;
    pub use super::users::Entity as Users;
}
