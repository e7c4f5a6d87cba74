//! Dependency injection infrastructure.
//!
//! A type implementing `FromRef<T>` can be built from a `&T`. The
//! [`Context`](crate::context::Context) implements it for its shared
//! handles, and each repository implements it by pulling the graph from the
//! context:
//!
//! ```ignore
//! let players: PlayerRepository = ctx.resolve();
//! let matches = MatchRepository::from_ref(&ctx);
//! ```

/// Trait for extracting a value from a reference to another type.
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

/// Blanket implementation: any Clone type can be extracted from itself.
impl<T: Clone> FromRef<T> for T {
    fn from_ref(input: &T) -> Self {
        input.clone()
    }
}
