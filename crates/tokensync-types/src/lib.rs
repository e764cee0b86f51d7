pub mod checkpoint;
pub mod parse;
pub mod record;
pub mod stats;
mod util;

pub use checkpoint::*;
pub use parse::*;
pub use record::*;
pub use stats::*;
pub use util::*;
