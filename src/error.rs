use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - underflow")]
    Underflow,
    #[error("Math error - division by zero")]
    DivisionByZero,
    #[error("Math error - amount exceeds max u64")]
    AmountExceedsMaxU64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("State error - sqrtPrice out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("State error - tick out of bounds")]
    TickOutOfBounds,

    #[error("State error - tick {0} is not covered by the tick array")]
    TickNotInArray(i32),
    #[error("State error - tick {0} is not initialized")]
    TickNotInitialized(i32),
    #[error("State error - tick array start index {0} is not aligned to the array size")]
    InvalidTickArrayStart(i32),

    #[error("State error - tick array sequence is empty")]
    EmptyTickArraySequence,
    #[error("State error - tick arrays are not consecutive or belong to different pools")]
    InvalidTickArraySequence,
    #[error("State error - swap ran past the loaded tick arrays")]
    InsufficientTickArrays,

    #[error("State error - requested amount exceeds available liquidity")]
    InsufficientReserves,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    #[error("Range error - tick range [{lower}, {upper}) is empty or inverted")]
    InvertedRange { lower: i32, upper: i32 },
    #[error("Range error - tick {tick} is not a multiple of spacing {tick_spacing}")]
    UnalignedTick { tick: i32, tick_spacing: u16 },
    #[error("Range error - pool only supports full range positions")]
    FullRangeOnly,
    #[error("Range error - position still holds liquidity")]
    PositionNotEmpty,
    #[error("Range error - liquidity delta is zero")]
    ZeroLiquidityDelta,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("Pool error - token mints must be distinct and ordered")]
    InvalidMintOrder,
    #[error("Pool error - tick spacing must be non-zero")]
    ZeroTickSpacing,
    #[error("Pool error - fee rate {0} exceeds the maximum")]
    FeeRateExceedsMax(u16),
    #[error("Pool error - protocol fee rate {0} exceeds the maximum")]
    ProtocolFeeRateExceedsMax(u16),
    #[error("Pool error - order protocol fee rate {0} exceeds the maximum")]
    OrderProtocolFeeRateExceedsMax(u16),
    #[error("Pool error - CLP to OLP reward ratio {0} exceeds the maximum")]
    RewardRatioExceedsMax(u16),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SwapError {
    #[error("Swap error - amount specified is 0")]
    AmountSpecifiedIsZero,
    #[error("Swap error - sqrt price limit out of bounds")]
    SqrtPriceLimitOutOfBounds,
    #[error("Swap error - sqrt price limit is on the wrong side of the current price")]
    InvalidSqrtPriceLimitDirection,
    #[error("Swap error - realized amount {actual} violates the slippage threshold {threshold}")]
    SlippageExceeded { actual: u64, threshold: u64 },
    #[error("Swap error - first hop output is not the second hop input")]
    DisconnectedHops,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LimitOrderError {
    #[error("Limit order error - order at tick {0} is marketable at the current price")]
    TakerOrder(i32),
    #[error("Limit order error - amount exceeds limit order input amount")]
    AmountExceedsOrder,
    #[error("Limit order error - limit order and pool/ticks data are out of sync")]
    OutOfSync,
    #[error("Limit order error - order is already being filled")]
    AlreadyFilled,
    #[error("Limit order error - order amount is 0")]
    ZeroAmount,
    #[error("Limit order error - order still holds input")]
    NotEmpty,
    #[error("Limit order error - tick does not belong to the order")]
    TickMismatch,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Quote error - invalid slippage tolerance {0} bps")]
    InvalidSlippageTolerance(u16),
    #[error("Quote error - invalid transfer fee {0} bps")]
    InvalidTransferFee(u16),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Codec error - account discriminator does not match {0}")]
    InvalidDiscriminator(&'static str),
    #[error("Codec error - expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] crate::error::MathError),

    #[error(transparent)]
    StateError(#[from] crate::error::StateError),

    #[error(transparent)]
    RangeError(#[from] crate::error::RangeError),

    #[error(transparent)]
    PoolError(#[from] crate::error::PoolError),

    #[error(transparent)]
    SwapError(#[from] crate::error::SwapError),

    #[error(transparent)]
    LimitOrderError(#[from] crate::error::LimitOrderError),

    #[error(transparent)]
    QuoteError(#[from] crate::error::QuoteError),

    #[error(transparent)]
    CodecError(#[from] crate::error::CodecError),
}
