pub mod archive;
pub mod auth;
pub mod common;
pub mod draw_record;
pub mod prize;
pub mod reservation;

pub use archive::*;
pub use auth::*;
pub use common::*;
pub use draw_record::*;
pub use prize::*;
pub use reservation::*;
