//! Spawner adapter backed by the browser microtask queue.

use futures::future::LocalBoxFuture;

use chat_core::ports::SpawnPort;

pub struct BrowserSpawner;

impl SpawnPort for BrowserSpawner {
    fn spawn_local(&self, fut: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(fut);
    }
}
