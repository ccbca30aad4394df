//! External service integrations.

pub mod portal_client {
    pub use crate::portal_client::*;
}
