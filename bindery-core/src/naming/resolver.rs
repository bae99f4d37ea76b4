//! Numeric-suffix name resolution

/// Name used when the desired name is blank
pub const FALLBACK_NAME: &str = "Untitled";

/// Turns a desired name into one that does not collide under a predicate
#[derive(Debug, Clone, Copy, Default)]
pub struct NameCollisionResolver;

impl NameCollisionResolver {
    pub fn new() -> Self {
        Self
    }

    /// Return `desired` (trimmed) if free, otherwise the first free
    /// `"<desired> (n)"` for n = 2, 3, ...
    pub fn resolve<F>(&self, desired: &str, mut exists: F) -> String
    where
        F: FnMut(&str) -> bool,
    {
        let base = match desired.trim() {
            "" => FALLBACK_NAME,
            trimmed => trimmed,
        };

        if !exists(base) {
            return base.to_string();
        }

        let mut counter: u64 = 2;
        loop {
            let candidate = format!("{} ({})", base, counter);
            if !exists(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}
