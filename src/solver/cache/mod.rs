pub mod inter_route;
pub mod star;

mod registry;
pub use self::registry::CacheRegistry;
