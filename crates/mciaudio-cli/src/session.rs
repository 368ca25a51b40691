//! Playback session: start playback, then drive the control prompt.

use std::io::{ BufRead, Write };

use anyhow::Result;
use mciaudio_core::{ command, Audio, Command, Outcome, PlayOptions };

use crate::cli::Args;
use crate::settings::Settings;


/// Prints what we know about the open file.
pub fn print_info( audio: &Audio, out: &mut impl Write ) -> Result<()> {
    if let Some( path ) = audio.path() {
        writeln!( out, "File:      {}", path.display() )?;
    }
    writeln!( out, "Short:     {}", audio.short_path().unwrap_or( "" ) )?;
    writeln!( out, "Extension: {}", audio.extension().unwrap_or( "" ) )?;
    writeln!( out, "Alias:     {}", audio.alias().unwrap_or( "" ) )?;
    if let Some( length ) = audio.length() {
        writeln!( out, "Length:    {} ({} ms)", length, length.total_ms )?;
    }
    Ok(())
}


/// Starts playback as requested by `args`, then reads commands from `input`
/// until `quit` or end of input. Returns the new repeat preference if the
/// user toggled it.
pub fn run(
    audio: &Audio,
    args: &Args,
    settings: &Settings,
    input: impl BufRead,
    mut out: impl Write,
) -> Result<Option<bool>> {
    let mut options = PlayOptions::default()
        .repeat( args.repeat || settings.repeat )
        .wait( args.wait );

    let total = audio.length().map( |l| l.total_ms ).unwrap_or( 0 );
    let from = args.from.unwrap_or( 0 );
    let to = args.to.unwrap_or( total );
    tracing::debug!( "Starting playback {}..{} ms ({:?})", from, to, options );
    audio.play_range( from, to, options )?;

    if args.wait {
        return Ok( None );
    }

    writeln!( out, "Type 'help' for commands." )?;
    let initial_repeat = options.repeat;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let result = Command::parse( &line ).and_then( |cmd| {
            let outcome = cmd.execute( audio, &mut options )?;
            Ok(( cmd, outcome ))
        });

        match result {
            Ok(( _, Outcome::Quit )) => break,
            Ok(( cmd, Outcome::Continue( message ) )) => {
                if let Some( message ) = message {
                    writeln!( out, "{}", message )?;
                }
                if settings.show_status && is_transport( cmd ) {
                    if let Ok( Outcome::Continue( Some( status ) ) ) = Command::Status.execute( audio, &mut options ) {
                        writeln!( out, "{}", status )?;
                    }
                }
            }
            Err( e @ command::CommandError::Mci( _ ) ) => {
                tracing::warn!( "Command {:?} failed: {}", line.trim(), e );
                writeln!( out, "Error: {}", e )?;
            }
            Err( e ) => writeln!( out, "{}", e )?,
        }
    }

    Ok( ( options.repeat != initial_repeat ).then_some( options.repeat ) )
}


fn is_transport( cmd: Command ) -> bool {
    matches!(
        cmd,
        Command::Play | Command::Range { .. } | Command::Pause | Command::Resume | Command::Stop
    )
}


#[cfg( test )]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{ Arc, Mutex };

    use clap::Parser;
    use mciaudio_core::{ AliasAllocator, MciBackend, MciError };


    #[derive( Default )]
    struct ScriptBackend {
        sent: Mutex<Vec<String>>,
    }


    impl MciBackend for ScriptBackend {
        fn send_command( &self, command: &str ) -> Result<(), MciError> {
            self.sent.lock().unwrap().push( command.to_string() );
            if command.starts_with( "resume" ) {
                return Err( MciError::Command { command: command.into(), code: 263, message: "not open".into() } );
            }
            Ok(())
        }


        fn send_command_for_result( &self, command: &str ) -> Result<String, MciError> {
            self.sent.lock().unwrap().push( command.to_string() );
            Ok( match command.rsplit( ' ' ).next() {
                Some( "length" ) => "3000".into(),
                Some( "position" ) => "1000".into(),
                Some( "mode" ) => "playing".into(),
                _ => String::new(),
            })
        }


        fn short_path( &self, path: &Path ) -> Result<String, MciError> {
            Ok( path.to_string_lossy().into_owned() )
        }
    }


    fn open( backend: &Arc<ScriptBackend> ) -> Audio {
        let mut audio = Audio::with_allocator( backend.clone(), Arc::new( AliasAllocator::default() ) );
        audio.open( "song.mp3" ).unwrap();
        audio
    }


    #[test]
    fn test_wait_plays_once_and_returns() {
        let backend = Arc::new( ScriptBackend::default() );
        let audio = open( &backend );
        let args = Args::try_parse_from([ "mciaudio", "song.mp3", "--wait", "--to", "2s" ]).unwrap();

        let mut out = Vec::new();
        let changed = run( &audio, &args, &Settings::default(), "pause\n".as_bytes(), &mut out ).unwrap();

        assert_eq!( changed, None );
        assert!( out.is_empty() );
        assert_eq!( backend.sent.lock().unwrap().last().unwrap(), "play MCI_ALIAS_1 from 0 to 2000 wait" );
    }


    #[test]
    fn test_prompt_runs_commands() {
        let backend = Arc::new( ScriptBackend::default() );
        let audio = open( &backend );
        let args = Args::try_parse_from([ "mciaudio", "song.mp3" ]).unwrap();
        let settings = Settings { repeat: false, show_status: false };

        let mut out = Vec::new();
        let input = "pause\nbogus\nresume\nrepeat\nq\nstop\n";
        let changed = run( &audio, &args, &settings, input.as_bytes(), &mut out ).unwrap();
        assert_eq!( changed, Some( true ) );

        let text = String::from_utf8( out ).unwrap();
        assert!( text.contains( "Unknown command: bogus" ) );
        assert!( text.contains( "Error: MCI command `resume MCI_ALIAS_1` failed" ) );
        assert!( text.contains( "Repeat on" ) );

        let sent = backend.sent.lock().unwrap();
        assert_eq!( &sent[ 2.. ], &[
            "play MCI_ALIAS_1 from 0 to 3000".to_string(),
            "pause MCI_ALIAS_1".to_string(),
            "resume MCI_ALIAS_1".to_string(),
        ]);
    }


    #[test]
    fn test_status_after_transport() {
        let backend = Arc::new( ScriptBackend::default() );
        let audio = open( &backend );
        let args = Args::try_parse_from([ "mciaudio", "song.mp3" ]).unwrap();

        let mut out = Vec::new();
        run( &audio, &args, &Settings::default(), "stop\n".as_bytes(), &mut out ).unwrap();

        let text = String::from_utf8( out ).unwrap();
        assert!( text.contains( "playing [0:01.000 / 0:03.000]" ) );
    }


    #[test]
    fn test_print_info() {
        let backend = Arc::new( ScriptBackend::default() );
        let audio = open( &backend );

        let mut out = Vec::new();
        print_info( &audio, &mut out ).unwrap();
        let text = String::from_utf8( out ).unwrap();
        assert!( text.contains( "Alias:     MCI_ALIAS_1" ) );
        assert!( text.contains( "Length:    0:03.000 (3000 ms)" ) );
    }
}
