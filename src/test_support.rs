use std::sync::Mutex;

/// Serializes tests that read or write JWT_SECRET. The secret is process
/// global, so env-mutating tests from any module must not interleave.
pub static ENV_LOCK: Mutex<()> = Mutex::new(());
