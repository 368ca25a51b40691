fn main() {
    // Check TARGET (what we're compiling for), not HOST (where we're compiling)
    let target = std::env::var( "CARGO_CFG_TARGET_OS" ).unwrap_or_default();
    if target == "windows" {
        let mut res = winres::WindowsResource::new();

        // Cross-compiling from Linux needs the mingw windres
        if std::env::var( "CARGO_CFG_TARGET_ENV" ).unwrap_or_default() == "gnu"
            && std::env::var( "HOST" ).map( |h| !h.contains( "windows" ) ).unwrap_or( false )
        {
            res.set_windres_path( "x86_64-w64-mingw32-windres" );
        }

        res.set( "ProductName", "mciaudio" );
        res.set( "FileDescription", "MCI Audio Player" );
        res.set( "OriginalFilename", "mciaudio.exe" );
        res.compile().expect( "Failed to compile Windows resources" );
    }
}
