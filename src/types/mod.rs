pub mod dest;
pub mod errors;
pub mod report;
pub mod status;
pub mod wspath;

pub use dest::*;
pub use errors::*;
pub use report::*;
pub use status::*;
pub use wspath::*;
