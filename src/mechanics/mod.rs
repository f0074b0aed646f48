pub mod spread;
pub mod stoch;

pub use spread::*;
pub use stoch::*;
