//! Tests against the real MCI subsystem.

#![cfg( windows )]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{ Duration, Instant };

use mciaudio_core::{ Audio, MciError, PlayOptions, WinMmBackend };


/// Writes a mono 8-bit PCM WAV of silence.
fn write_silent_wav( path: &Path, millis: u32 ) {
    const RATE: u32 = 8000;
    let samples = RATE * millis / 1000;

    let mut data = Vec::with_capacity( 44 + samples as usize );
    data.extend_from_slice( b"RIFF" );
    data.extend_from_slice( &( 36 + samples ).to_le_bytes() );
    data.extend_from_slice( b"WAVEfmt " );
    data.extend_from_slice( &16u32.to_le_bytes() );
    data.extend_from_slice( &1u16.to_le_bytes() );  // PCM
    data.extend_from_slice( &1u16.to_le_bytes() );  // mono
    data.extend_from_slice( &RATE.to_le_bytes() );
    data.extend_from_slice( &RATE.to_le_bytes() );  // byte rate
    data.extend_from_slice( &1u16.to_le_bytes() );  // block align
    data.extend_from_slice( &8u16.to_le_bytes() );  // bits per sample
    data.extend_from_slice( b"data" );
    data.extend_from_slice( &samples.to_le_bytes() );
    data.resize( 44 + samples as usize, 128 );

    fs::write( path, data ).unwrap();
}


#[test]
fn test_missing_file_reports_os_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join( "does not exist.mp3" );

    let err = Audio::with_path( Arc::new( WinMmBackend::new() ), &path ).unwrap_err();
    match err {
        MciError::ShortPath { code, message, .. } => {
            assert_ne!( code, 0 );
            assert!( !message.is_empty() );
        }
        other => panic!( "expected a short path error, got {:?}", other ),
    }
}


#[test]
#[ignore = "requires an audio output device"]
fn test_open_close_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join( "with space.wav" );
    write_silent_wav( &path, 500 );

    let mut first = Audio::with_path( Arc::new( WinMmBackend::new() ), &path ).unwrap();
    let len = first.length().unwrap();
    assert_eq!( len.minute * 60_000 + len.second * 1000 + len.millisecond, len.total_ms );
    let first_alias = first.alias().unwrap().to_string();
    first.close().unwrap();

    let second = Audio::with_path( Arc::new( WinMmBackend::new() ), &path ).unwrap();
    assert_ne!( second.alias(), Some( first_alias.as_str() ) );
}


#[test]
#[ignore = "requires an audio output device"]
fn test_play_wait_blocks_for_clip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join( "clip.wav" );
    write_silent_wav( &path, 1000 );

    let audio = Audio::with_path( Arc::new( WinMmBackend::new() ), &path ).unwrap();
    let start = Instant::now();
    audio.play( PlayOptions::default().repeat( true ).wait( true ) ).unwrap();
    let elapsed = start.elapsed();

    assert!( elapsed >= Duration::from_millis( 800 ), "returned after {:?}", elapsed );
    assert!( elapsed < Duration::from_secs( 5 ), "returned after {:?}", elapsed );
}
