//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Absence is reported as `None` or
//! `false`; only backend failures are errors.

pub mod token_repo;
pub mod user_repo;
pub mod workout_repo;

pub use token_repo::TokenRepo;
pub use user_repo::UserRepo;
pub use workout_repo::WorkoutRepo;
