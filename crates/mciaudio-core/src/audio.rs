//! The audio handle.
//!
//! An `Audio` owns at most one live MCI session. It turns playback intents
//! into command strings, sends them through an [`MciBackend`] and keeps the
//! few facts learned at open time.

use std::path::{ Path, PathBuf };
use std::sync::Arc;

use crate::alias::AliasAllocator;
use crate::backend::MciBackend;
use crate::error::MciError;
use crate::protocol::{ MciCommand, MediaLength, PlaybackMode, StatusItem, WAVEFORM_EXTENSION };
use crate::util::extract_extension;


/// Flags for `play` and `play_range`.
#[derive( Debug, Clone, Copy, Default, PartialEq, Eq )]
pub struct PlayOptions {
    /// Loop the range. Ignored for `.wav`, which MCI cannot loop.
    pub repeat: bool,
    /// Block the calling thread until the range has played.
    pub wait: bool,
}


impl PlayOptions {
    pub fn repeat( mut self, repeat: bool ) -> Self {
        self.repeat = repeat;
        self
    }


    pub fn wait( mut self, wait: bool ) -> Self {
        self.wait = wait;
        self
    }
}


/// State of an open session.
#[derive( Debug )]
struct Session {
    path: PathBuf,
    short_path: String,
    extension: String,
    alias: String,
    length: MediaLength,
}


/// Handle to one media file opened through MCI.
///
/// The handle is move-only. Dropping an open handle closes its session on
/// a best-effort basis; call [`Audio::close`] to observe close failures.
pub struct Audio {
    backend: Arc<dyn MciBackend>,
    aliases: Arc<AliasAllocator>,
    session: Option<Session>,
}


impl Audio {
    /// Creates a closed handle that draws aliases from the global allocator.
    pub fn new( backend: Arc<dyn MciBackend> ) -> Self {
        Self::with_allocator( backend, AliasAllocator::global() )
    }


    /// Creates a closed handle with an explicit alias allocator.
    pub fn with_allocator( backend: Arc<dyn MciBackend>, aliases: Arc<AliasAllocator> ) -> Self {
        Self {
            backend,
            aliases,
            session: None,
        }
    }


    /// Creates a handle and immediately opens `path`.
    pub fn with_path( backend: Arc<dyn MciBackend>, path: impl AsRef<Path> ) -> Result<Self, MciError> {
        let mut audio = Self::new( backend );
        audio.open( path )?;
        Ok( audio )
    }


    /// Opens `path`, replacing any session this handle already holds.
    ///
    /// @param path - Absolute path of the media file
    ///
    /// @returns Error if the short path, the open command or the length
    /// query fails
    pub fn open( &mut self, path: impl AsRef<Path> ) -> Result<(), MciError> {
        let path = path.as_ref();
        if self.session.is_some() {
            self.close()?;
        }

        let short_path = self.backend.short_path( path )?;
        let alias = self.aliases.next_alias();

        self.send( &MciCommand::Open { short_path: &short_path, alias: &alias } )?;

        let length = match self.query_millis( &alias, StatusItem::Length ) {
            Ok( ms ) => MediaLength::from_millis( ms ),
            Err( e ) => {
                // The session is live even though we cannot use it.
                let close = MciCommand::Close { alias: &alias }.to_string();
                if let Err( close_err ) = self.backend.send_command( &close ) {
                    tracing::warn!( "Failed to close {} after length query error: {}", alias, close_err );
                }
                return Err( e );
            }
        };

        tracing::info!( "Opened {:?} as {} ({})", path, alias, length );

        self.session = Some( Session {
            path: path.to_path_buf(),
            extension: extract_extension( &path.to_string_lossy() ).to_string(),
            short_path,
            alias,
            length,
        });

        Ok(())
    }


    /// Closes the session. Closing a closed handle is a no-op.
    ///
    /// The handle is considered closed afterwards even if the command fails.
    pub fn close( &mut self ) -> Result<(), MciError> {
        let Some( session ) = self.session.take() else {
            return Ok(());
        };

        self.send( &MciCommand::Close { alias: &session.alias } )?;
        tracing::info!( "Closed {}", session.alias );
        Ok(())
    }


    /// Plays the whole file.
    pub fn play( &self, options: PlayOptions ) -> Result<(), MciError> {
        let total = self.session()?.length.total_ms;
        self.play_range( 0, total, options )
    }


    /// Plays from `from` to `to` milliseconds.
    ///
    /// `repeat` is dropped for waveform files; MCI fails the whole command
    /// when the two are combined.
    pub fn play_range( &self, from: u32, to: u32, options: PlayOptions ) -> Result<(), MciError> {
        let session = self.session()?;
        let repeat = options.repeat && !session.extension.eq_ignore_ascii_case( WAVEFORM_EXTENSION );
        if options.repeat && !repeat {
            tracing::debug!( "Ignoring repeat for waveform file {}", session.alias );
        }

        self.send( &MciCommand::Play {
            alias: &session.alias,
            from,
            to,
            repeat,
            wait: options.wait,
        })
    }


    pub fn stop( &self ) -> Result<(), MciError> {
        let alias = &self.session()?.alias;
        self.send( &MciCommand::Stop { alias } )
    }


    pub fn pause( &self ) -> Result<(), MciError> {
        let alias = &self.session()?.alias;
        self.send( &MciCommand::Pause { alias } )
    }


    pub fn resume( &self ) -> Result<(), MciError> {
        let alias = &self.session()?.alias;
        self.send( &MciCommand::Resume { alias } )
    }


    /// Current playback position in milliseconds.
    pub fn position( &self ) -> Result<u32, MciError> {
        let alias = &self.session()?.alias;
        self.query_millis( alias, StatusItem::Position )
    }


    /// Current device mode (playing, paused, stopped...).
    pub fn mode( &self ) -> Result<PlaybackMode, MciError> {
        let alias = &self.session()?.alias;
        let reply = self.query( alias, StatusItem::Mode )?;
        Ok( PlaybackMode::parse( &reply ) )
    }


    pub fn is_open( &self ) -> bool {
        self.session.is_some()
    }


    pub fn path( &self ) -> Option<&Path> {
        self.session.as_ref().map( |s| s.path.as_path() )
    }


    pub fn short_path( &self ) -> Option<&str> {
        self.session.as_ref().map( |s| s.short_path.as_str() )
    }


    pub fn extension( &self ) -> Option<&str> {
        self.session.as_ref().map( |s| s.extension.as_str() )
    }


    pub fn alias( &self ) -> Option<&str> {
        self.session.as_ref().map( |s| s.alias.as_str() )
    }


    /// Length learned at open time. Not re-queried.
    pub fn length( &self ) -> Option<MediaLength> {
        self.session.as_ref().map( |s| s.length )
    }


    fn session( &self ) -> Result<&Session, MciError> {
        self.session.as_ref().ok_or( MciError::NotOpen )
    }


    fn send( &self, command: &MciCommand<'_> ) -> Result<(), MciError> {
        let text = command.to_string();
        tracing::debug!( "MCI <- {}", text );
        self.backend.send_command( &text )
    }


    fn query( &self, alias: &str, item: StatusItem ) -> Result<String, MciError> {
        let text = MciCommand::Status { alias, item }.to_string();
        tracing::debug!( "MCI <- {}", text );
        let reply = self.backend.send_command_for_result( &text )?;
        tracing::trace!( "MCI -> {:?}", reply );
        Ok( reply )
    }


    fn query_millis( &self, alias: &str, item: StatusItem ) -> Result<u32, MciError> {
        let reply = self.query( alias, item )?;
        reply.trim().parse().map_err( |_| MciError::InvalidReply {
            command: MciCommand::Status { alias, item }.to_string(),
            reply,
        })
    }
}


impl std::fmt::Debug for Audio {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        f.debug_struct( "Audio" )
            .field( "session", &self.session )
            .finish_non_exhaustive()
    }
}


impl Drop for Audio {
    fn drop( &mut self ) {
        if let Err( e ) = self.close() {
            tracing::warn!( "Failed to close audio on drop: {}", e );
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::backend::fake::RecordingBackend;


    fn open_with( backend: &Arc<RecordingBackend>, path: &str ) -> Audio {
        let aliases = Arc::new( AliasAllocator::default() );
        let mut audio = Audio::with_allocator( backend.clone(), aliases );
        audio.open( path ).unwrap();
        audio
    }


    #[test]
    fn test_open_sends_open_then_length() {
        let backend = Arc::new( RecordingBackend::with_length( 61_234 ) );
        let audio = open_with( &backend, r"C:\Music\My Song.mp3" );

        assert_eq!( backend.sent(), vec![
            r"open C:\MUSIC\MY~SONG.MP3 alias MCI_ALIAS_1".to_string(),
            "status MCI_ALIAS_1 length".to_string(),
        ]);
        assert_eq!( audio.alias(), Some( "MCI_ALIAS_1" ) );
        assert_eq!( audio.extension(), Some( "mp3" ) );
        assert_eq!( audio.short_path(), Some( r"C:\MUSIC\MY~SONG.MP3" ) );
        assert_eq!( audio.path(), Some( Path::new( r"C:\Music\My Song.mp3" ) ) );

        let len = audio.length().unwrap();
        assert_eq!( ( len.minute, len.second, len.millisecond ), ( 1, 1, 234 ) );
        assert_eq!( len.minute * 60_000 + len.second * 1000 + len.millisecond, len.total_ms );
    }


    #[test]
    fn test_open_close_then_reopen() {
        let backend = Arc::new( RecordingBackend::with_length( 1000 ) );
        let aliases = Arc::new( AliasAllocator::default() );

        let mut first = Audio::with_allocator( backend.clone(), aliases.clone() );
        first.open( r"C:\a.mp3" ).unwrap();
        first.close().unwrap();
        assert!( !first.is_open() );

        let mut second = Audio::with_allocator( backend.clone(), aliases );
        second.open( r"C:\a.mp3" ).unwrap();

        let sent = backend.sent();
        assert_eq!( sent[ 2 ], "close MCI_ALIAS_1" );
        assert_eq!( sent[ 3 ], r"open C:\A.MP3 alias MCI_ALIAS_2" );
    }


    #[test]
    fn test_aliases_increase_across_handles() {
        let backend = Arc::new( RecordingBackend::with_length( 10 ) );
        let aliases = Arc::new( AliasAllocator::default() );

        let handles: Vec<Audio> = ( 0..5 )
            .map( |i| {
                let mut audio = Audio::with_allocator( backend.clone(), aliases.clone() );
                audio.open( format!( r"C:\t{}.mp3", i ) ).unwrap();
                audio
            })
            .collect();

        let suffixes: Vec<u64> = handles
            .iter()
            .map( |a| a.alias().unwrap().trim_start_matches( "MCI_ALIAS_" ).parse().unwrap() )
            .collect();
        assert_eq!( suffixes, vec![ 1, 2, 3, 4, 5 ] );
    }


    #[test]
    fn test_play_whole_file() {
        let backend = Arc::new( RecordingBackend::with_length( 4321 ) );
        let audio = open_with( &backend, r"C:\a.mp3" );

        audio.play( PlayOptions::default() ).unwrap();
        assert_eq!( backend.last().unwrap(), "play MCI_ALIAS_1 from 0 to 4321" );

        audio.play( PlayOptions::default().repeat( true ).wait( true ) ).unwrap();
        assert_eq!( backend.last().unwrap(), "play MCI_ALIAS_1 from 0 to 4321 repeat wait" );
    }


    #[test]
    fn test_wav_drops_repeat() {
        let backend = Arc::new( RecordingBackend::with_length( 500 ) );
        let audio = open_with( &backend, r"C:\sounds\beep.WAV" );

        audio.play_range( 100, 200, PlayOptions { repeat: true, wait: false } ).unwrap();
        assert_eq!( backend.last().unwrap(), "play MCI_ALIAS_1 from 100 to 200" );

        audio.play_range( 100, 200, PlayOptions { repeat: true, wait: true } ).unwrap();
        assert_eq!( backend.last().unwrap(), "play MCI_ALIAS_1 from 100 to 200 wait" );
    }


    #[test]
    fn test_non_wav_keeps_repeat() {
        let backend = Arc::new( RecordingBackend::with_length( 500 ) );
        let audio = open_with( &backend, r"C:\sounds\loop.mid" );

        audio.play_range( 100, 200, PlayOptions { repeat: true, wait: false } ).unwrap();
        assert_eq!( backend.last().unwrap(), "play MCI_ALIAS_1 from 100 to 200 repeat" );
    }


    #[test]
    fn test_transport_commands() {
        let backend = Arc::new( RecordingBackend::with_length( 500 ) );
        let audio = open_with( &backend, r"C:\a.mp3" );

        audio.pause().unwrap();
        audio.resume().unwrap();
        audio.stop().unwrap();

        let sent = backend.sent();
        assert_eq!( &sent[ 2.. ], &[
            "pause MCI_ALIAS_1".to_string(),
            "resume MCI_ALIAS_1".to_string(),
            "stop MCI_ALIAS_1".to_string(),
        ]);
    }


    #[test]
    fn test_position_and_mode() {
        let backend = Arc::new( RecordingBackend::with_length( 500 ) );
        backend.reply( "position", "250" );
        backend.reply( "mode", "paused" );
        let audio = open_with( &backend, r"C:\a.mp3" );

        assert_eq!( audio.position().unwrap(), 250 );
        assert_eq!( audio.mode().unwrap(), PlaybackMode::Paused );
        assert_eq!( backend.last().unwrap(), "status MCI_ALIAS_1 mode" );
    }


    #[test]
    fn test_closed_handle_rejects_operations() {
        let backend = Arc::new( RecordingBackend::default() );
        let audio = Audio::with_allocator( backend.clone(), Arc::new( AliasAllocator::default() ) );

        assert_eq!( audio.play( PlayOptions::default() ), Err( MciError::NotOpen ) );
        assert_eq!( audio.stop(), Err( MciError::NotOpen ) );
        assert_eq!( audio.pause(), Err( MciError::NotOpen ) );
        assert_eq!( audio.resume(), Err( MciError::NotOpen ) );
        assert!( backend.sent().is_empty() );
    }


    #[test]
    fn test_close_is_idempotent() {
        let backend = Arc::new( RecordingBackend::with_length( 500 ) );
        let mut audio = open_with( &backend, r"C:\a.mp3" );

        audio.close().unwrap();
        audio.close().unwrap();
        let closes = backend.sent().iter().filter( |c| c.starts_with( "close" ) ).count();
        assert_eq!( closes, 1 );
    }


    #[test]
    fn test_drop_closes_session() {
        let backend = Arc::new( RecordingBackend::with_length( 500 ) );
        {
            let _audio = open_with( &backend, r"C:\a.mp3" );
        }
        assert_eq!( backend.last().unwrap(), "close MCI_ALIAS_1" );
    }


    #[test]
    fn test_drop_swallows_close_failure() {
        let backend = Arc::new( RecordingBackend::with_length( 500 ) );
        backend.fail_on( "close", 263 );
        {
            let _audio = open_with( &backend, r"C:\a.mp3" );
        }
        assert_eq!( backend.last().unwrap(), "close MCI_ALIAS_1" );
    }


    #[test]
    fn test_open_reopens_over_existing_session() {
        let backend = Arc::new( RecordingBackend::with_length( 500 ) );
        let mut audio = open_with( &backend, r"C:\a.mp3" );
        audio.open( r"C:\b.mp3" ).unwrap();

        let sent = backend.sent();
        assert_eq!( sent[ 2 ], "close MCI_ALIAS_1" );
        assert_eq!( sent[ 3 ], r"open C:\B.MP3 alias MCI_ALIAS_2" );
        assert_eq!( audio.alias(), Some( "MCI_ALIAS_2" ) );
    }


    #[test]
    fn test_open_missing_file_reports_path_error() {
        let backend = Arc::new( RecordingBackend::with_length( 500 ) );
        let mut audio = Audio::with_allocator( backend.clone(), Arc::new( AliasAllocator::default() ) );

        let err = audio.open( r"C:\missing.mp3" ).unwrap_err();
        match err {
            MciError::ShortPath { message, .. } => assert!( message.contains( "cannot find" ) ),
            other => panic!( "unexpected error: {:?}", other ),
        }
        assert!( !audio.is_open() );
        assert!( backend.sent().is_empty() );
    }


    #[test]
    fn test_open_command_failure() {
        let backend = Arc::new( RecordingBackend::with_length( 500 ) );
        backend.fail_on( "open", 275 );
        let mut audio = Audio::with_allocator( backend.clone(), Arc::new( AliasAllocator::default() ) );

        let err = audio.open( r"C:\a.mp3" ).unwrap_err();
        assert!( err.is_command_failure() );
        assert_eq!( err.code(), Some( 275 ) );
        assert!( !audio.is_open() );
    }


    #[test]
    fn test_bad_length_reply_closes_session() {
        let backend = Arc::new( RecordingBackend::default() );
        backend.reply( "length", "soon" );
        let mut audio = Audio::with_allocator( backend.clone(), Arc::new( AliasAllocator::default() ) );

        let err = audio.open( r"C:\a.mp3" ).unwrap_err();
        assert!( matches!( err, MciError::InvalidReply { ref reply, .. } if reply == "soon" ) );
        assert_eq!( backend.last().unwrap(), "close MCI_ALIAS_1" );
        assert!( !audio.is_open() );
    }


    #[test]
    fn test_play_failure_propagates() {
        let backend = Arc::new( RecordingBackend::with_length( 500 ) );
        backend.fail_on( "play", 277 );
        let audio = open_with( &backend, r"C:\a.mp3" );

        let err = audio.play_range( 900, 100, PlayOptions::default() ).unwrap_err();
        assert_eq!( err.code(), Some( 277 ) );
    }
}
