pub mod pick;
pub mod pool;
pub mod rounds;
pub mod state;
