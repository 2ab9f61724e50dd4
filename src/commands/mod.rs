//! Administrative commands run from the CLI

pub mod init;
pub mod list;
pub mod new;
