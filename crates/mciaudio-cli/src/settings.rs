//! Application settings management
//!
//! Persists playback preferences between runs.

use std::fs;
use std::path::{ Path, PathBuf };

use serde::{ Deserialize, Serialize };


/// Application settings.
#[derive( Debug, Clone, PartialEq, Eq, Serialize, Deserialize )]
#[serde( default )]
pub struct Settings {
    /// Loop playback unless told otherwise
    pub repeat: bool,

    /// Print mode and position after each playback command
    pub show_status: bool,
}


impl Default for Settings {
    fn default() -> Self {
        Self {
            repeat: false,
            show_status: true,
        }
    }
}


impl Settings {
    /// Returns the path to the settings file.
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map( |p| p.join( "mciaudio" ).join( "settings.json" ) )
    }


    /// Loads settings from disk, or returns defaults if not found.
    pub fn load() -> Self {
        match Self::settings_path() {
            Some( path ) => Self::load_from( &path ),
            None => Self::default(),
        }
    }


    /// Saves settings to disk.
    pub fn save( &self ) {
        if let Some( path ) = Self::settings_path() {
            self.save_to( &path );
        }
    }


    fn load_from( path: &Path ) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string( path ) {
            Ok( contents ) => serde_json::from_str( &contents ).unwrap_or_else( |e| {
                tracing::warn!( "Ignoring malformed settings {:?}: {}", path, e );
                Self::default()
            }),
            Err( e ) => {
                tracing::warn!( "Failed to read settings: {}", e );
                Self::default()
            }
        }
    }


    fn save_to( &self, path: &Path ) {
        if let Some( parent ) = path.parent() {
            if let Err( e ) = fs::create_dir_all( parent ) {
                tracing::warn!( "Failed to create settings directory: {}", e );
                return;
            }
        }

        match serde_json::to_string_pretty( self ) {
            Ok( json ) => {
                if let Err( e ) = fs::write( path, json ) {
                    tracing::warn!( "Failed to save settings: {}", e );
                }
            }
            Err( e ) => {
                tracing::warn!( "Failed to serialize settings: {}", e );
            }
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = Settings::load_from( Path::new( "/definitely/not/here/settings.json" ) );
        assert_eq!( settings, Settings::default() );
    }


    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str( r#"{ "repeat": true }"# ).unwrap();
        assert!( settings.repeat );
        assert!( settings.show_status );
    }


    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "mciaudio" ).join( "settings.json" );
        let settings = Settings { repeat: true, show_status: false };

        settings.save_to( &path );
        assert_eq!( Settings::load_from( &path ), settings );
    }


    #[test]
    fn test_malformed_json_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "settings.json" );
        fs::write( &path, "{ not json" ).unwrap();

        assert_eq!( Settings::load_from( &path ), Settings::default() );
    }
}
