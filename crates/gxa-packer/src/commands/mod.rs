mod pack;
mod scan;

pub use pack::*;
pub use scan::*;
