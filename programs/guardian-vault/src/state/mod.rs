pub mod policy;
pub mod registry;
pub mod vault;
pub mod venue;

pub use policy::*;
pub use registry::*;
pub use vault::*;
pub use venue::*;
