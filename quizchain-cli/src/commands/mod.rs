pub mod deploy;
pub mod game;
pub mod query;

pub use deploy::{handle_deploy_command, DeployCommands};
pub use game::{fund_account, init_instance, send_deposit, submit_guess};
pub use query::{list_instances, show_balance, show_events, show_hash, show_status};
