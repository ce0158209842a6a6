//! Demo records served by the resource server and edited through the framework.

pub mod product;
pub mod user;

pub use product::*;
pub use user::*;
