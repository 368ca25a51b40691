//! Session alias allocation.
//!
//! MCI addresses open devices by alias, and two live sessions in one
//! process must never share one. Aliases are `<prefix><n>` with `n`
//! starting at 1 and never reused.

use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::{ Arc, OnceLock };

use crate::protocol::ALIAS_PREFIX;


/// Hands out monotonically increasing aliases. Safe to share across threads.
#[derive( Debug )]
pub struct AliasAllocator {
    prefix: String,
    next: AtomicU64,
}


impl AliasAllocator {
    /// Creates an allocator whose first alias is `<prefix>1`.
    pub fn new( prefix: impl Into<String> ) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new( 1 ),
        }
    }


    /// The process-wide allocator using [`ALIAS_PREFIX`].
    pub fn global() -> Arc<AliasAllocator> {
        static GLOBAL: OnceLock<Arc<AliasAllocator>> = OnceLock::new();
        Arc::clone( GLOBAL.get_or_init( || Arc::new( AliasAllocator::new( ALIAS_PREFIX ) ) ) )
    }


    /// Returns the next alias.
    pub fn next_alias( &self ) -> String {
        let n = self.next.fetch_add( 1, Ordering::Relaxed );
        format!( "{}{}", self.prefix, n )
    }


    pub fn prefix( &self ) -> &str {
        &self.prefix
    }
}


impl Default for AliasAllocator {
    fn default() -> Self {
        Self::new( ALIAS_PREFIX )
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;


    fn suffix( alias: &str ) -> u64 {
        alias.trim_start_matches( ALIAS_PREFIX ).parse().unwrap()
    }


    #[test]
    fn test_starts_at_one() {
        let alloc = AliasAllocator::default();
        assert_eq!( alloc.next_alias(), "MCI_ALIAS_1" );
        assert_eq!( alloc.next_alias(), "MCI_ALIAS_2" );
    }


    #[test]
    fn test_strictly_increasing() {
        let alloc = AliasAllocator::default();
        let aliases: Vec<u64> = ( 0..50 ).map( |_| suffix( &alloc.next_alias() ) ).collect();
        assert!( aliases.windows( 2 ).all( |w| w[ 0 ] < w[ 1 ] ) );
    }


    #[test]
    fn test_unique_across_threads() {
        let alloc = Arc::new( AliasAllocator::default() );
        let handles: Vec<_> = ( 0..8 )
            .map( |_| {
                let alloc = Arc::clone( &alloc );
                thread::spawn( move || ( 0..100 ).map( |_| alloc.next_alias() ).collect::<Vec<_>>() )
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for alias in handle.join().unwrap() {
                assert!( seen.insert( alias ), "duplicate alias" );
            }
        }
        assert_eq!( seen.len(), 800 );
    }


    #[test]
    fn test_global_is_shared() {
        let a = AliasAllocator::global();
        let b = AliasAllocator::global();
        assert!( Arc::ptr_eq( &a, &b ) );
        assert!( suffix( &a.next_alias() ) < suffix( &b.next_alias() ) );
    }
}
