//! Command-line argument parsing for mciaudio.

use std::path::PathBuf;

use clap::Parser;
use mciaudio_core::command::parse_time;


/// mciaudio - play an audio file through the Windows Media Control Interface.
#[derive( Parser, Debug )]
#[command( name = "mciaudio" )]
#[command( version, about, long_about = None )]
pub struct Args {
    /// Audio file to open.
    pub file: PathBuf,

    /// Start of the range to play (1:30, 90s, 1500ms or 1500).
    #[arg( long, value_parser = parse_time_arg )]
    pub from: Option<u32>,

    /// End of the range to play. Defaults to the end of the file.
    #[arg( long, value_parser = parse_time_arg )]
    pub to: Option<u32>,

    /// Loop playback (ignored for .wav files).
    #[arg( short, long )]
    pub repeat: bool,

    /// Block until playback finishes instead of opening the control prompt.
    #[arg( short, long )]
    pub wait: bool,

    /// Print file information and exit without playing.
    #[arg( short, long )]
    pub info: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg( short, long, action = clap::ArgAction::Count )]
    pub verbose: u8,
}


impl Args {
    /// Log level selected by the `-v` count.
    pub fn log_level( &self ) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}


fn parse_time_arg( s: &str ) -> Result<u32, String> {
    parse_time( s ).map_err( |e| e.to_string() )
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_parse_range_args() {
        let args = Args::try_parse_from([ "mciaudio", "song.mp3", "--from", "1:00", "--to", "90s", "-r" ]).unwrap();
        assert_eq!( args.file, PathBuf::from( "song.mp3" ) );
        assert_eq!( args.from, Some( 60_000 ) );
        assert_eq!( args.to, Some( 90_000 ) );
        assert!( args.repeat );
        assert!( !args.wait );
    }


    #[test]
    fn test_verbosity() {
        let args = Args::try_parse_from([ "mciaudio", "a.wav", "-vv" ]).unwrap();
        assert_eq!( args.log_level(), tracing::Level::TRACE );
        let args = Args::try_parse_from([ "mciaudio", "a.wav" ]).unwrap();
        assert_eq!( args.log_level(), tracing::Level::WARN );
    }


    #[test]
    fn test_bad_time_rejected() {
        assert!( Args::try_parse_from([ "mciaudio", "a.wav", "--from", "soon" ]).is_err() );
    }


    #[test]
    fn test_file_required() {
        assert!( Args::try_parse_from([ "mciaudio" ]).is_err() );
    }
}
