//! MCI command-string grammar.
//!
//! Every interaction with the multimedia subsystem is a single line of
//! text. `MciCommand` renders exactly the strings this crate sends, so
//! the grammar lives in one place.

use std::fmt;


/// Prefix for every session alias issued by this crate.
pub const ALIAS_PREFIX: &str = "MCI_ALIAS_";

/// Maximum length (in UTF-16 units, including the terminator) of a data
/// reply. MCI documents 128 as the upper bound for any string it returns;
/// a longer reply would be truncated by the subsystem.
pub const REPLY_BUFFER_LEN: usize = 128;

/// Maximum length of a translated error description.
pub const ERROR_BUFFER_LEN: usize = 128;

/// Extension of the one format that rejects `repeat`.
pub const WAVEFORM_EXTENSION: &str = "wav";


/// Item requested by a `status` query.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum StatusItem {
    Length,
    Position,
    Mode,
}


impl StatusItem {
    fn keyword( self ) -> &'static str {
        match self {
            StatusItem::Length => "length",
            StatusItem::Position => "position",
            StatusItem::Mode => "mode",
        }
    }
}


/// A single MCI command addressed to an alias.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum MciCommand<'a> {
    Open { short_path: &'a str, alias: &'a str },
    Close { alias: &'a str },
    Play { alias: &'a str, from: u32, to: u32, repeat: bool, wait: bool },
    Stop { alias: &'a str },
    Pause { alias: &'a str },
    Resume { alias: &'a str },
    Status { alias: &'a str, item: StatusItem },
}


impl fmt::Display for MciCommand<'_> {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
        match self {
            MciCommand::Open { short_path, alias } => write!( f, "open {} alias {}", short_path, alias ),
            MciCommand::Close { alias } => write!( f, "close {}", alias ),
            MciCommand::Play { alias, from, to, repeat, wait } => {
                write!( f, "play {} from {} to {}", alias, from, to )?;
                if *repeat {
                    f.write_str( " repeat" )?;
                }
                if *wait {
                    f.write_str( " wait" )?;
                }
                Ok(())
            }
            MciCommand::Stop { alias } => write!( f, "stop {}", alias ),
            MciCommand::Pause { alias } => write!( f, "pause {}", alias ),
            MciCommand::Resume { alias } => write!( f, "resume {}", alias ),
            MciCommand::Status { alias, item } => write!( f, "status {} {}", alias, item.keyword() ),
        }
    }
}


/// Length of a media file, split the way a player displays it.
#[derive( Debug, Clone, Copy, Default, PartialEq, Eq )]
pub struct MediaLength {
    pub total_ms: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
}


impl MediaLength {
    /// Decomposes a millisecond count into minutes, seconds and milliseconds.
    pub fn from_millis( total_ms: u32 ) -> Self {
        let minute = total_ms / 60_000;
        let second = total_ms / 1000 - minute * 60;
        Self {
            total_ms,
            minute,
            second,
            millisecond: total_ms % 1000,
        }
    }
}


impl fmt::Display for MediaLength {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
        write!( f, "{}:{:02}.{:03}", self.minute, self.second, self.millisecond )
    }
}


/// Playback state reported by `status <alias> mode`.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum PlaybackMode {
    NotReady,
    Paused,
    Playing,
    Stopped,
    Open,
    Recording,
    Seeking,
    /// Anything the device reports outside the documented set.
    Other( String ),
}


impl PlaybackMode {
    /// Parses a mode reply. Never fails; unknown words are kept verbatim.
    pub fn parse( reply: &str ) -> Self {
        match reply.trim().to_lowercase().as_str() {
            "not ready" => PlaybackMode::NotReady,
            "paused" => PlaybackMode::Paused,
            "playing" => PlaybackMode::Playing,
            "stopped" => PlaybackMode::Stopped,
            "open" => PlaybackMode::Open,
            "recording" => PlaybackMode::Recording,
            "seeking" => PlaybackMode::Seeking,
            _ => PlaybackMode::Other( reply.trim().to_string() ),
        }
    }
}


impl fmt::Display for PlaybackMode {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
        match self {
            PlaybackMode::NotReady => f.write_str( "not ready" ),
            PlaybackMode::Paused => f.write_str( "paused" ),
            PlaybackMode::Playing => f.write_str( "playing" ),
            PlaybackMode::Stopped => f.write_str( "stopped" ),
            PlaybackMode::Open => f.write_str( "open" ),
            PlaybackMode::Recording => f.write_str( "recording" ),
            PlaybackMode::Seeking => f.write_str( "seeking" ),
            PlaybackMode::Other( s ) => f.write_str( s ),
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_command_strings() {
        let alias = "MCI_ALIAS_7";
        assert_eq!(
            MciCommand::Open { short_path: r"C:\MUSIC~1\A.MP3", alias }.to_string(),
            r"open C:\MUSIC~1\A.MP3 alias MCI_ALIAS_7"
        );
        assert_eq!( MciCommand::Close { alias }.to_string(), "close MCI_ALIAS_7" );
        assert_eq!( MciCommand::Stop { alias }.to_string(), "stop MCI_ALIAS_7" );
        assert_eq!( MciCommand::Pause { alias }.to_string(), "pause MCI_ALIAS_7" );
        assert_eq!( MciCommand::Resume { alias }.to_string(), "resume MCI_ALIAS_7" );
        assert_eq!(
            MciCommand::Status { alias, item: StatusItem::Length }.to_string(),
            "status MCI_ALIAS_7 length"
        );
    }


    #[test]
    fn test_play_flags_order() {
        let alias = "MCI_ALIAS_1";
        let plain = MciCommand::Play { alias, from: 0, to: 1500, repeat: false, wait: false };
        assert_eq!( plain.to_string(), "play MCI_ALIAS_1 from 0 to 1500" );

        let both = MciCommand::Play { alias, from: 10, to: 20, repeat: true, wait: true };
        assert_eq!( both.to_string(), "play MCI_ALIAS_1 from 10 to 20 repeat wait" );

        let wait = MciCommand::Play { alias, from: 10, to: 20, repeat: false, wait: true };
        assert_eq!( wait.to_string(), "play MCI_ALIAS_1 from 10 to 20 wait" );
    }


    #[test]
    fn test_length_identity() {
        for total in [ 0, 999, 1000, 59_999, 60_000, 61_234, 3_723_456 ] {
            let len = MediaLength::from_millis( total );
            assert_eq!( len.minute * 60_000 + len.second * 1000 + len.millisecond, total );
            assert!( len.second < 60 );
        }
    }


    #[test]
    fn test_length_display() {
        assert_eq!( MediaLength::from_millis( 61_234 ).to_string(), "1:01.234" );
        assert_eq!( MediaLength::from_millis( 5 ).to_string(), "0:00.005" );
    }


    #[test]
    fn test_mode_parse() {
        assert_eq!( PlaybackMode::parse( "playing" ), PlaybackMode::Playing );
        assert_eq!( PlaybackMode::parse( "Not Ready " ), PlaybackMode::NotReady );
        assert_eq!( PlaybackMode::parse( "parked" ), PlaybackMode::Other( "parked".into() ) );
    }
}
