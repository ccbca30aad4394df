// Domain-layer modules and shared errors/models
pub mod controller {
    pub use crate::controller::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
