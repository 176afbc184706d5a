//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` (or an open transaction) as the first argument.

pub mod report_repo;
pub mod reservation_repo;
pub mod room_repo;
pub mod user_repo;

pub use report_repo::ReportRepo;
pub use reservation_repo::ReservationRepo;
pub use room_repo::RoomRepo;
pub use user_repo::UserRepo;
