//! The seam between `Audio` and the OS multimedia subsystem.

use std::path::Path;

use crate::error::MciError;


/// Transport for MCI command strings.
///
/// On Windows the implementation is [`crate::winmm::WinMmBackend`]; tests
/// substitute a recording fake.
pub trait MciBackend: Send + Sync {
    /// Sends a command and discards any reply.
    fn send_command( &self, command: &str ) -> Result<(), MciError>;

    /// Sends a command and returns its text reply, at most
    /// [`crate::protocol::REPLY_BUFFER_LEN`] units long.
    fn send_command_for_result( &self, command: &str ) -> Result<String, MciError>;

    /// Converts `path` to the short form the command parser accepts.
    fn short_path( &self, path: &Path ) -> Result<String, MciError>;
}


#[cfg( test )]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    use super::MciBackend;
    use crate::error::MciError;


    /// Backend that records every command and answers from a script.
    #[derive( Default )]
    pub struct RecordingBackend {
        sent: Mutex<Vec<String>>,
        replies: Mutex<HashMap<&'static str, String>>,
        failures: Mutex<Vec<( String, u32 )>>,
    }


    impl RecordingBackend {
        /// A backend whose `status ... length` reply is `length_ms`.
        pub fn with_length( length_ms: u32 ) -> Self {
            let backend = Self::default();
            backend.reply( "length", length_ms.to_string() );
            backend
        }


        /// Sets the reply for `status <alias> <item>`.
        pub fn reply( &self, item: &'static str, text: impl Into<String> ) {
            self.replies.lock().unwrap().insert( item, text.into() );
        }


        /// Makes every command starting with `prefix` fail with `code`.
        pub fn fail_on( &self, prefix: &str, code: u32 ) {
            self.failures.lock().unwrap().push(( prefix.to_string(), code ));
        }


        pub fn sent( &self ) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }


        pub fn last( &self ) -> Option<String> {
            self.sent.lock().unwrap().last().cloned()
        }


        fn record( &self, command: &str ) -> Result<(), MciError> {
            self.sent.lock().unwrap().push( command.to_string() );
            let failures = self.failures.lock().unwrap();
            match failures.iter().find( |( prefix, _ )| command.starts_with( prefix.as_str() ) ) {
                Some(( _, code )) => Err( MciError::Command {
                    command: command.to_string(),
                    code: *code,
                    message: format!( "scripted failure {}", code ),
                }),
                None => Ok(()),
            }
        }
    }


    impl MciBackend for RecordingBackend {
        fn send_command( &self, command: &str ) -> Result<(), MciError> {
            self.record( command )
        }


        fn send_command_for_result( &self, command: &str ) -> Result<String, MciError> {
            self.record( command )?;
            let item = command.rsplit( ' ' ).next().unwrap_or( "" );
            Ok( self.replies.lock().unwrap().get( item ).cloned().unwrap_or_default() )
        }


        fn short_path( &self, path: &Path ) -> Result<String, MciError> {
            let text = path.to_string_lossy();
            if text.contains( "missing" ) {
                return Err( MciError::ShortPath {
                    path: path.to_path_buf(),
                    code: 2,
                    message: "The system cannot find the file specified.".into(),
                });
            }
            Ok( text.to_uppercase().replace( ' ', "~" ) )
        }
    }
}
