//! 핵심 타입.

pub mod symbol;
pub mod timeframe;

pub use symbol::*;
pub use timeframe::*;
