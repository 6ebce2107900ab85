/// Every way an exchange call can abort. A failed call leaves no state behind.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DexError {
    // input validation
    #[error("IDENTICAL_ADDRESSES")]
    IdenticalTokens,
    #[error("ZERO_ADDRESS")]
    ZeroIdentity,
    #[error("PAIR_EXISTS")]
    PairExists,
    #[error("PAIR_NOT_FOUND")]
    PairNotFound,
    #[error("FORBIDDEN")]
    Forbidden,
    #[error("ALREADY_INITIALIZED")]
    AlreadyInitialized,
    #[error("NOT_INITIALIZED")]
    NotInitialized,
    #[error("INVALID_TO")]
    InvalidRecipient,
    /// The zero identity holds the permanently locked shares and can never send them.
    #[error("INVALID_FROM")]
    InvalidSender,

    // liquidity math
    #[error("INSUFFICIENT_LIQUIDITY_MINTED")]
    InsufficientLiquidityMinted,
    #[error("INSUFFICIENT_LIQUIDITY_BURNED")]
    InsufficientLiquidityBurned,
    #[error("INSUFFICIENT_LIQUIDITY")]
    InsufficientLiquidity,
    #[error("INSUFFICIENT_AMOUNT")]
    InsufficientAmount,

    // swap bounds
    #[error("INSUFFICIENT_OUTPUT_AMOUNT")]
    InsufficientOutputAmount,
    #[error("EXCESSIVE_INPUT_AMOUNT")]
    ExcessiveInputAmount,
    #[error("INSUFFICIENT_INPUT_AMOUNT")]
    InsufficientInputAmount,

    /// The fee-adjusted constant product shrank.
    #[error("K")]
    InvariantViolation,

    // execution
    #[error("LOCKED")]
    Locked,
    #[error("TRANSFER_FAILED")]
    TransferFailed,
    #[error("INSUFFICIENT_BALANCE")]
    InsufficientBalance,
    #[error("INSUFFICIENT_ALLOWANCE")]
    InsufficientAllowance,
    #[error("OVERFLOW")]
    Overflow,
    #[error("UNDERFLOW")]
    Underflow,
}

pub type DexResult<T> = Result<T, DexError>;
