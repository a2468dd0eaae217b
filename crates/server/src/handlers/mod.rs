//! # API Route Handlers
//!
//! This module organizes the Axum handlers for the `askdb-server`.

pub mod ask;
pub mod general;

pub use self::{ask::*, general::*};
pub use crate::{errors::AppError, state::AppState};
