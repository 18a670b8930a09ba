pub mod amm_pool;
pub mod fees;
pub mod limit_order;
pub mod liquidity_quote;
pub mod position;
pub mod swap;
pub mod tick;
pub mod tick_array;

pub use amm_pool::{FeeRates, Pool, sort_mints};
pub use limit_order::LimitOrder;
pub use position::Position;
pub use tick::Tick;
pub use tick_array::{TickArray, TickArraySequence};
