pub mod math_helpers;
pub mod price_math;
pub mod swap_math;
pub mod tick_index;
pub mod tick_math;
pub mod token_math;

pub mod bundle;
pub mod limit_order_math;
pub mod liquidity_math;
pub mod position_math;
