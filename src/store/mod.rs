// Concrete storage backends
//
// Each backend implements every repository trait over one shared state so
// the cross-aggregate transaction boundaries hold.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
