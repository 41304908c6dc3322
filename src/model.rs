pub mod ledger;

pub use ledger::{CenteredLedger, WindowKey};
