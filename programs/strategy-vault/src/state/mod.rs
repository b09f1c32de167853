pub mod external;
pub mod price;
pub mod registry;
pub mod vault;

pub use external::*;
pub use price::*;
pub use registry::*;
pub use vault::*;
