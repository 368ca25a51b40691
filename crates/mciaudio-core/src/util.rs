//! Small stateless helpers.

use std::io;
use std::path::PathBuf;


/// Returns the text after the final `.` of `path`, or `""` when there is none.
///
/// The whole string is searched, so a dot in a directory name counts when
/// the file name itself has no extension.
pub fn extract_extension( path: &str ) -> &str {
    match path.rfind( '.' ) {
        Some( pos ) => &path[ pos + 1.. ],
        None => "",
    }
}


/// Returns the directory containing the running executable.
pub fn current_executable_directory() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map( |p| p.to_path_buf() )
        .ok_or_else( || io::Error::new( io::ErrorKind::NotFound, "executable has no parent directory" ) )
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_extension() {
        assert_eq!( extract_extension( r"C:\a.b.mp3" ), "mp3" );
        assert_eq!( extract_extension( r"C:\music\Track.WAV" ), "WAV" );
        assert_eq!( extract_extension( r"C:\noext" ), "" );
        assert_eq!( extract_extension( "trailing." ), "" );
    }


    #[test]
    fn test_executable_directory() {
        let dir = current_executable_directory().unwrap();
        assert!( dir.is_dir() );
    }
}
