mod accept;
mod report;
mod status;

pub use accept::{cmd_accept, cmd_unaccept};
pub use report::cmd_report;
pub use status::cmd_status;
