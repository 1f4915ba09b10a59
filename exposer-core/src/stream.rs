//! The optional "reactive unwrap" surface (§4.2 "Result handling", §9
//! "Reactive unwrap as an optional feature").
//!
//! The source system detects a reactive library at runtime and, if loaded,
//! unwraps single- and multi-valued reactive return types specially. §9
//! recommends making that a compile-time concern instead: a container
//! method that wants the multi-valued behavior declares its return type as
//! [`ExposedStream<T>`] (or `Result<ExposedStream<T>, E>`); `exposer-macros`
//! recognises the name at macro-expansion time (see
//! `exposer-macros::return_shape`) and generates a collect-then-serialise
//! tail instead of a direct-serialise one. A method that never names
//! `ExposedStream` pays nothing extra — the single-valued case needs no
//! special unwrap of its own, since every `async fn`'s future is already
//! awaited before its result reaches the dispatcher.

use std::pin::Pin;

use futures_core::Stream;

/// A boxed, type-erased stream of results (§4.2 "multi-valued reactive
/// stream... collect all items into a sequence, then yield").
pub type ExposedStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Collect every item off `stream` into a `Vec`, used by generated invoke
/// closures for methods declared `-> ExposedStream<T>` / `-> Result<ExposedStream<T>, E>`.
pub async fn collect<T>(stream: ExposedStream<T>) -> Vec<T> {
    use futures_util::StreamExt;
    stream.collect().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[tokio::test]
    async fn collects_every_item_in_order() {
        let s: ExposedStream<i32> = Box::pin(stream::iter(vec![1, 2, 3]));
        assert_eq!(collect(s).await, vec![1, 2, 3]);
    }
}
