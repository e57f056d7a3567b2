pub mod acceptor;
pub mod debounce;

pub use acceptor::{Channel, ChannelTable, Denomination};
pub use debounce::{BudgetPolicy, DebounceConfig, DebounceResult, Debouncer, WaitMode};
