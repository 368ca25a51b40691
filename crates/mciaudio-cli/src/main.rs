//! mciaudio CLI - play audio files through the Windows Media Control Interface

mod cli;
mod session;
mod settings;

use std::io;
use std::sync::Arc;

use anyhow::{ Context, Result };
use clap::Parser;
use mciaudio_core::{ Audio, MciBackend };

use cli::Args;
use settings::Settings;


fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer( io::stderr )
        .with_max_level( args.log_level() )
        .init();

    let backend = system_backend()?;
    let mut settings = Settings::load();

    let mut audio = Audio::new( backend );
    audio.open( &args.file )
        .with_context( || format!( "Failed to open {}", args.file.display() ) )?;

    if args.info {
        session::print_info( &audio, &mut io::stdout() )?;
        audio.close()?;
        return Ok(());
    }

    let stdin = io::stdin();
    let repeat = session::run( &audio, &args, &settings, stdin.lock(), io::stdout() )?;
    audio.close().context( "Failed to close audio" )?;

    if let Some( repeat ) = repeat {
        settings.repeat = repeat;
        settings.save();
    }

    Ok(())
}


#[cfg( windows )]
fn system_backend() -> Result<Arc<dyn MciBackend>> {
    Ok( Arc::new( mciaudio_core::WinMmBackend::new() ) )
}


#[cfg( not( windows ) )]
fn system_backend() -> Result<Arc<dyn MciBackend>> {
    anyhow::bail!( "MCI playback is only available on Windows" )
}
