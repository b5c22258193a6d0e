pub mod handle;
pub mod route;
