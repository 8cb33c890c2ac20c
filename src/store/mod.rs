/*!
 * Identity & Capability Store
 * Durable storage and query of the role/permission relation tables
 */

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::CapabilityStore;
