pub mod user;
pub mod trade;
pub mod price;
pub mod portfolio;
pub mod session;

pub use user::{CurrentUser, User};
pub use trade::{Side, TradeRecord};
pub use price::PriceBar;
pub use portfolio::{AllocationSlice, PortfolioLine, PortfolioSnapshot};
pub use session::{Sessions, View};
