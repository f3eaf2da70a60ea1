// Driftwood state managers
// Managers handle stateful operations: open tabs, browsing history and the
// saved tab session.

pub mod history_manager;
pub mod session_manager;
pub mod tab_manager;
