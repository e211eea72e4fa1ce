//! Persisted record kinds.
//!
//! Flat sea-orm models; one table per entity. Unique columns are also
//! covered by unique indexes in the migrations so the database backs the
//! application-level sibling scan.

pub mod article;
pub mod gallery;
pub mod image;
pub mod link;
pub mod order;
pub mod product;
pub mod project;
pub mod user;

pub use article::Entity as Article;
pub use gallery::Entity as Gallery;
pub use image::Entity as Image;
pub use link::Entity as Link;
pub use order::Entity as Order;
pub use product::Entity as Product;
pub use project::Entity as Project;
pub use user::Entity as User;
