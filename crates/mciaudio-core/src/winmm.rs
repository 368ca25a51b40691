//! The Windows backend, built on `winmm` through the `windows` crate.

use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use windows::core::{ PCWSTR, PWSTR };
use windows::Win32::Foundation::{ GetLastError, HWND, MAX_PATH };
use windows::Win32::Media::Multimedia::{ mciGetErrorStringW, mciSendStringW };
use windows::Win32::Storage::FileSystem::GetShortPathNameW;
use windows::Win32::System::Diagnostics::Debug::{
    FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS,
};

use crate::backend::MciBackend;
use crate::error::MciError;
use crate::protocol::{ ERROR_BUFFER_LEN, REPLY_BUFFER_LEN };


// MAKELANGID( LANG_NEUTRAL, SUBLANG_DEFAULT )
const LANG_USER_DEFAULT: u32 = 0x0400;


/// Backend that talks to the real MCI subsystem.
#[derive( Debug, Clone, Copy, Default )]
pub struct WinMmBackend;


impl WinMmBackend {
    pub fn new() -> Self {
        Self
    }
}


impl MciBackend for WinMmBackend {
    fn send_command( &self, command: &str ) -> Result<(), MciError> {
        let wide = to_wide( OsStr::new( command ) );
        let err = unsafe { mciSendStringW( PCWSTR( wide.as_ptr() ), None, HWND::default() ) };
        check( command, err )
    }


    fn send_command_for_result( &self, command: &str ) -> Result<String, MciError> {
        let wide = to_wide( OsStr::new( command ) );
        let mut buf = [ 0u16; REPLY_BUFFER_LEN ];
        let err = unsafe { mciSendStringW( PCWSTR( wide.as_ptr() ), Some( &mut buf ), HWND::default() ) };
        check( command, err )?;
        Ok( from_wide( &buf ) )
    }


    fn short_path( &self, path: &Path ) -> Result<String, MciError> {
        to_short_path( path )
    }
}


/// Maps an MCI error code to the subsystem's description of it.
pub fn translate_error_code( code: u32 ) -> Result<String, MciError> {
    let mut buf = [ 0u16; ERROR_BUFFER_LEN ];
    let ok = unsafe { mciGetErrorStringW( code, &mut buf ) };
    if ok.as_bool() {
        Ok( from_wide( &buf ) )
    } else {
        Err( MciError::UnknownErrorCode { code } )
    }
}


/// Converts `path` to its 8.3 short form.
///
/// The MCI command parser splits on whitespace, so long paths with spaces
/// fail with error 263 unless shortened first. The file must exist.
pub fn to_short_path( path: &Path ) -> Result<String, MciError> {
    let wide = to_wide( path.as_os_str() );
    let mut buf = vec![ 0u16; MAX_PATH as usize ];

    loop {
        let len = unsafe { GetShortPathNameW( PCWSTR( wide.as_ptr() ), Some( &mut buf ) ) } as usize;
        if len == 0 {
            // Reading the last error does not reset it.
            let code = unsafe { GetLastError() }.0;
            return Err( MciError::ShortPath {
                path: path.to_path_buf(),
                code,
                message: format_last_error()?,
            });
        }
        // On a short buffer the return value is the required size.
        if len >= buf.len() {
            buf.resize( len + 1, 0 );
            continue;
        }
        return Ok( String::from_utf16_lossy( &buf[ ..len ] ) );
    }
}


/// Formats the calling thread's last OS error.
pub fn format_last_error() -> Result<String, MciError> {
    let code = unsafe { GetLastError() }.0;
    format_error_message( code )
}


fn format_error_message( code: u32 ) -> Result<String, MciError> {
    let mut buf = vec![ 0u16; MAX_PATH as usize ];
    let len = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            None,
            code,
            LANG_USER_DEFAULT,
            PWSTR( buf.as_mut_ptr() ),
            buf.len() as u32,
            None,
        )
    } as usize;

    if len == 0 {
        return Err( MciError::UnknownLastError { code } );
    }
    Ok( String::from_utf16_lossy( &buf[ ..len ] ).trim_end().to_string() )
}


fn check( command: &str, err: u32 ) -> Result<(), MciError> {
    if err == 0 {
        return Ok(());
    }
    let message = translate_error_code( err )?;
    tracing::debug!( "MCI error {} for `{}`: {}", err, command, message );
    Err( MciError::Command {
        command: command.to_string(),
        code: err,
        message,
    })
}


fn to_wide( s: &OsStr ) -> Vec<u16> {
    s.encode_wide().chain( std::iter::once( 0 ) ).collect()
}


fn from_wide( buf: &[u16] ) -> String {
    let end = buf.iter().position( |&c| c == 0 ).unwrap_or( buf.len() );
    String::from_utf16_lossy( &buf[ ..end ] )
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_wide_round_trip() {
        let wide = to_wide( OsStr::new( "status MCI_ALIAS_1 length" ) );
        assert_eq!( wide.last(), Some( &0 ) );
        assert_eq!( from_wide( &wide ), "status MCI_ALIAS_1 length" );
    }


    #[test]
    fn test_translate_known_code() {
        // MCIERR_INVALID_DEVICE_ID
        let text = translate_error_code( 257 ).unwrap();
        assert!( !text.is_empty() );
    }


    #[test]
    fn test_format_file_not_found() {
        // ERROR_FILE_NOT_FOUND
        let text = format_error_message( 2 ).unwrap();
        assert!( !text.is_empty() );
        assert!( !text.ends_with( '\n' ) );
    }


    #[test]
    fn test_unknown_alias_is_command_failure() {
        let err = WinMmBackend::new().send_command( "pause MCI_ALIAS_NEVER_OPENED" ).unwrap_err();
        assert!( matches!( err, MciError::Command { .. } ) );
    }
}
