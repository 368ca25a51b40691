//! Control command parsing and execution.
//!
//! One line of user input becomes a `Command`, which can then be applied
//! to an open [`Audio`] handle.

use thiserror::Error;

use crate::audio::{ Audio, PlayOptions };
use crate::error::MciError;


/// Errors that can occur during command parsing or execution.
#[derive( Debug, Error )]
pub enum CommandError {
    #[error( "Unknown command: {0}" )]
    Unknown( String ),

    #[error( "Invalid argument: {0}" )]
    InvalidArgument( String ),

    #[error( "Missing argument: {0}" )]
    MissingArgument( String ),

    #[error( transparent )]
    Mci( #[from] MciError ),
}


/// Parsed control command.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum Command {
    Play,
    Range { from: u32, to: u32 },
    Pause,
    Resume,
    Stop,
    Repeat,
    Status,
    Help,
    Quit,
}


/// What the caller should do after a command ran.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum Outcome {
    Continue( Option<String> ),
    Quit,
}


impl Command {
    /// Parses a command line.
    ///
    /// @param input - The command string to parse
    ///
    /// @returns The parsed command or an error
    pub fn parse( input: &str ) -> Result<Self, CommandError> {
        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or( "" ).to_lowercase();

        match cmd.as_str() {
            "play" | "p" => Ok( Command::Play ),
            "range" | "from" => {
                let from = parts.next()
                    .ok_or_else( || CommandError::MissingArgument( "start time".into() ) )?;
                let to = parts.next()
                    .ok_or_else( || CommandError::MissingArgument( "end time".into() ) )?;
                Ok( Command::Range { from: parse_time( from )?, to: parse_time( to )? } )
            }
            "pause" | "pa" => Ok( Command::Pause ),
            "resume" | "r" => Ok( Command::Resume ),
            "stop" | "st" => Ok( Command::Stop ),
            "repeat" | "rep" => Ok( Command::Repeat ),
            "status" | "info" | "i" => Ok( Command::Status ),
            "help" | "h" | "?" => Ok( Command::Help ),
            "quit" | "q" | "exit" => Ok( Command::Quit ),

            "" => Err( CommandError::Unknown( "empty command".into() ) ),
            other => Err( CommandError::Unknown( other.to_string() ) ),
        }
    }


    /// Applies the command to `audio`.
    ///
    /// Playback started here never waits, so the prompt stays responsive.
    pub fn execute( &self, audio: &Audio, options: &mut PlayOptions ) -> Result<Outcome, CommandError> {
        let play = options.wait( false );
        let message = match self {
            Command::Play => {
                audio.play( play )?;
                None
            }
            Command::Range { from, to } => {
                audio.play_range( *from, *to, play )?;
                None
            }
            Command::Pause => {
                audio.pause()?;
                None
            }
            Command::Resume => {
                audio.resume()?;
                None
            }
            Command::Stop => {
                audio.stop()?;
                None
            }
            Command::Repeat => {
                options.repeat = !options.repeat;
                Some( format!( "Repeat {}", if options.repeat { "on" } else { "off" } ) )
            }
            Command::Status => {
                let length = audio.length().ok_or( MciError::NotOpen )?;
                let mode = audio.mode()?;
                let position = audio.position()?;
                Some( format!( "{} [{} / {}]", mode, format_millis( position ), length ) )
            }
            Command::Help => Some( help_text().to_string() ),
            Command::Quit => return Ok( Outcome::Quit ),
        };
        Ok( Outcome::Continue( message ) )
    }
}


/// Parses "1:30", "90s", "1500ms" or "1500" (milliseconds) into milliseconds.
pub fn parse_time( s: &str ) -> Result<u32, CommandError> {
    let s = s.trim();
    let invalid = || CommandError::InvalidArgument( format!( "Invalid time: {}", s ) );

    if let Some(( min, sec )) = s.split_once( ':' ) {
        let minutes: u32 = min.parse().map_err( |_| invalid() )?;
        let seconds: u32 = sec.parse().map_err( |_| invalid() )?;
        minutes.checked_mul( 60 )
            .and_then( |m| m.checked_add( seconds ) )
            .and_then( |total| total.checked_mul( 1000 ) )
            .ok_or_else( invalid )
    } else if let Some( ms ) = s.strip_suffix( "ms" ) {
        ms.parse().map_err( |_| invalid() )
    } else if let Some( sec ) = s.strip_suffix( 's' ) {
        let seconds: u32 = sec.parse().map_err( |_| invalid() )?;
        seconds.checked_mul( 1000 ).ok_or_else( invalid )
    } else {
        s.parse().map_err( |_| invalid() )
    }
}


fn format_millis( ms: u32 ) -> String {
    crate::protocol::MediaLength::from_millis( ms ).to_string()
}


/// Returns help text listing all available commands.
pub fn help_text() -> &'static str {
    r#"Playback Commands:
  play            Play the whole file        [p]
  range <a> <b>   Play from a to b (1:30, 90s, 1500)
  pause           Pause playback             [pa]
  resume          Resume playback            [r]
  stop            Stop playback              [st]
  repeat          Toggle looping             [rep]

Other Commands:
  status          Show mode and position     [i]
  help            Show this help             [?]
  quit            Close and exit             [q]"#
}


#[cfg( test )]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::alias::AliasAllocator;
    use crate::backend::fake::RecordingBackend;


    fn open( backend: &Arc<RecordingBackend> ) -> Audio {
        let mut audio = Audio::with_allocator( backend.clone(), Arc::new( AliasAllocator::default() ) );
        audio.open( r"C:\a.mp3" ).unwrap();
        audio
    }


    #[test]
    fn test_parse_simple() {
        assert_eq!( Command::parse( "p" ).unwrap(), Command::Play );
        assert_eq!( Command::parse( "  PAUSE " ).unwrap(), Command::Pause );
        assert_eq!( Command::parse( "q" ).unwrap(), Command::Quit );
    }


    #[test]
    fn test_parse_range() {
        assert_eq!( Command::parse( "range 1:30 95s" ).unwrap(), Command::Range { from: 90_000, to: 95_000 } );
        assert_eq!( Command::parse( "range 0 1500ms" ).unwrap(), Command::Range { from: 0, to: 1500 } );
    }


    #[test]
    fn test_parse_errors() {
        assert!( matches!( Command::parse( "foobar" ), Err( CommandError::Unknown( _ ) ) ) );
        assert!( matches!( Command::parse( "" ), Err( CommandError::Unknown( _ ) ) ) );
        assert!( matches!( Command::parse( "range 10" ), Err( CommandError::MissingArgument( _ ) ) ) );
        assert!( matches!( Command::parse( "range x 10" ), Err( CommandError::InvalidArgument( _ ) ) ) );
    }


    #[test]
    fn test_execute_play_never_waits() {
        let backend = Arc::new( RecordingBackend::with_length( 2000 ) );
        let audio = open( &backend );
        let mut options = PlayOptions { repeat: true, wait: true };

        Command::Play.execute( &audio, &mut options ).unwrap();
        assert_eq!( backend.last().unwrap(), "play MCI_ALIAS_1 from 0 to 2000 repeat" );
    }


    #[test]
    fn test_execute_repeat_toggles() {
        let backend = Arc::new( RecordingBackend::with_length( 2000 ) );
        let audio = open( &backend );
        let mut options = PlayOptions::default();

        let out = Command::Repeat.execute( &audio, &mut options ).unwrap();
        assert_eq!( out, Outcome::Continue( Some( "Repeat on".into() ) ) );
        assert!( options.repeat );
    }


    #[test]
    fn test_execute_status() {
        let backend = Arc::new( RecordingBackend::with_length( 61_000 ) );
        backend.reply( "mode", "playing" );
        backend.reply( "position", "1500" );
        let audio = open( &backend );

        let out = Command::Status.execute( &audio, &mut PlayOptions::default() ).unwrap();
        assert_eq!( out, Outcome::Continue( Some( "playing [0:01.500 / 1:01.000]".into() ) ) );
    }


    #[test]
    fn test_execute_quit_and_errors() {
        let backend = Arc::new( RecordingBackend::with_length( 2000 ) );
        backend.fail_on( "pause", 263 );
        let audio = open( &backend );

        assert_eq!( Command::Quit.execute( &audio, &mut PlayOptions::default() ).unwrap(), Outcome::Quit );
        let err = Command::Pause.execute( &audio, &mut PlayOptions::default() ).unwrap_err();
        assert!( matches!( err, CommandError::Mci( MciError::Command { code: 263, .. } ) ) );
    }
}
