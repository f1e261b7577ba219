pub mod breaker;
pub mod evaluator;
pub mod state;
pub mod store;
pub mod store_memory;
pub mod store_redis;
pub mod transitions;

pub use breaker::CircuitBreaker;
pub use state::{CallOutcome, CircuitDecision, CircuitOverride, CircuitSnapshot, CircuitState, CommandKey, WindowStats};
pub use store::CircuitStore;
pub use store_memory::CircuitStoreMemory;
pub use store_redis::CircuitStoreRedis;
