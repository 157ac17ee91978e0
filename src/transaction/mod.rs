pub mod contract;
pub mod model;

pub use contract::Contract;
pub use model::Transaction;
