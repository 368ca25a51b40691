//! MCIAudio Core - audio playback through the Windows Media Control Interface
//!
//! This crate wraps the MCI string-command API in an [`Audio`] handle:
//! open a file, play all or part of it, pause, resume, stop and close.
//! Commands travel through the [`MciBackend`] trait; on Windows the
//! [`WinMmBackend`] sends them to `winmm`.

pub mod alias;
pub mod audio;
pub mod backend;
pub mod command;
pub mod error;
pub mod protocol;
pub mod util;
#[cfg( windows )]
pub mod winmm;

pub use alias::AliasAllocator;
pub use audio::{ Audio, PlayOptions };
pub use backend::MciBackend;
pub use command::{ Command, CommandError, Outcome };
pub use error::MciError;
pub use protocol::{ MediaLength, PlaybackMode };
#[cfg( windows )]
pub use winmm::WinMmBackend;
