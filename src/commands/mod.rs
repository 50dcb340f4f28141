//! Command implementations for mnemos

pub mod archive;
pub mod compact;
pub mod dispatch;
pub mod format;
pub mod init;
pub mod investigation;
pub mod record;
pub mod reflect;
pub mod search;
pub mod status;
