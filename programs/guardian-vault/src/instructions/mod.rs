pub mod deposit;
pub mod exit_manager;
pub mod governance;
pub mod initialize_registry;
pub mod manage;
pub mod register_manager;
pub mod settlement;
pub mod venues;
pub mod withdraw;

pub use deposit::*;
pub use exit_manager::*;
pub use governance::*;
pub use initialize_registry::*;
pub use manage::*;
pub use register_manager::*;
pub use settlement::*;
pub use venues::*;
pub use withdraw::*;
