//! 도메인 모델.

pub mod crypto;
pub mod fundamentals;
pub mod listing;
pub mod macro_data;
pub mod market_data;
pub mod metrics;
pub mod pattern;
pub mod score;
pub mod technical;

pub use crypto::*;
pub use fundamentals::*;
pub use listing::*;
pub use macro_data::*;
pub use market_data::*;
pub use metrics::*;
pub use pattern::*;
pub use score::*;
pub use technical::*;
