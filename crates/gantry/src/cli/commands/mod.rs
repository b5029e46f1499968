//! CLI commands

mod completions;
mod init;
mod publish;
mod status;
mod validate;
mod version;

pub use completions::CompletionsCommand;
pub use init::InitCommand;
pub use publish::PublishCommand;
pub use status::StatusCommand;
pub use validate::ValidateCommand;
pub use version::VersionCommand;
