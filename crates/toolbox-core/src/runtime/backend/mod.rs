pub mod admission;
pub mod pool;
pub mod protocol;
pub mod worker;
