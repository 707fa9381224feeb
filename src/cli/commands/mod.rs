//! One module per subcommand.

pub mod activity_cmd;
pub mod delete_repo;
pub mod get;
pub mod import_cmd;
pub mod list;
pub mod reveal;
pub mod set;
