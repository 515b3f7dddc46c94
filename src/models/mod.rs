pub mod restaurant;
pub mod review;

pub use restaurant::*;
pub use review::*;
