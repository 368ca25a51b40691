//! Error types for MCI operations.

use std::path::PathBuf;

use thiserror::Error;


/// Message used when the subsystem cannot describe its own failure.
pub const UNKNOWN_EXCEPTION: &str = "Unknown MCI Exception";


/// Errors that can occur while talking to the MCI subsystem.
#[derive( Debug, Clone, PartialEq, Eq, Error )]
pub enum MciError {
    /// The subsystem rejected a command with a nonzero error code.
    #[error( "MCI command `{command}` failed ({code}): {message}" )]
    Command {
        command: String,
        code: u32,
        message: String,
    },

    /// The subsystem could not translate an error code into text.
    #[error( "Unknown MCI Exception (code {code})" )]
    UnknownErrorCode { code: u32 },

    /// The path could not be converted to its short form.
    #[error( "Failed to get short path for {path:?} ({code}): {message}" )]
    ShortPath {
        path: PathBuf,
        code: u32,
        message: String,
    },

    /// The thread's last OS error could not be formatted.
    #[error( "Unknown MCI Exception (last error {code})" )]
    UnknownLastError { code: u32 },

    /// A query reply could not be interpreted.
    #[error( "Invalid reply to `{command}`: {reply:?}" )]
    InvalidReply { command: String, reply: String },

    /// The handle has no open session.
    #[error( "No audio is open" )]
    NotOpen,
}


impl MciError {
    /// Returns the numeric code carried by the error, if any.
    pub fn code( &self ) -> Option<u32> {
        match self {
            MciError::Command { code, .. }
            | MciError::UnknownErrorCode { code }
            | MciError::ShortPath { code, .. }
            | MciError::UnknownLastError { code } => Some( *code ),
            MciError::InvalidReply { .. } | MciError::NotOpen => None,
        }
    }


    /// True when the subsystem itself rejected a command, translated or not.
    pub fn is_command_failure( &self ) -> bool {
        matches!( self, MciError::Command { .. } | MciError::UnknownErrorCode { .. } )
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_command_error_display() {
        let err = MciError::Command {
            command: "play MCI_ALIAS_1 from 0 to 10".into(),
            code: 263,
            message: "The specified device is not open or is not recognized by MCI.".into(),
        };
        let text = err.to_string();
        assert!( text.contains( "play MCI_ALIAS_1" ) );
        assert!( text.contains( "263" ) );
        assert!( text.contains( "not open" ) );
    }


    #[test]
    fn test_unknown_messages() {
        assert!( MciError::UnknownErrorCode { code: 9 }.to_string().starts_with( UNKNOWN_EXCEPTION ) );
        assert!( MciError::UnknownLastError { code: 2 }.to_string().starts_with( UNKNOWN_EXCEPTION ) );
    }


    #[test]
    fn test_code_and_kind() {
        let err = MciError::ShortPath { path: PathBuf::from( "x" ), code: 2, message: "gone".into() };
        assert_eq!( err.code(), Some( 2 ) );
        assert!( !err.is_command_failure() );
        assert_eq!( MciError::NotOpen.code(), None );
        assert!( MciError::UnknownErrorCode { code: 1 }.is_command_failure() );
    }
}
