//! User/Progress store
//!
//! Row-level access to the `users` and `progress` tables created by
//! `tutor_common::db::init`. All functions take the shared pool and return
//! `tutor_common::Result`.

pub mod progress;
pub mod users;

pub use progress::{count_progress, create_progress, get_current_lesson, list_progress};
pub use users::{
    advance_onboarding, create_user, get_user_by_phone, list_users, set_onboarding_step,
    ProfileField,
};
