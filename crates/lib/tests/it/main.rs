/*! Integration tests for Keepsake.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * Modules:
 * - documents: round trips of every field kind through the store
 * - migration: schema version chains, partial chains, and metadata isolation
 * - backends: the same document through every repository
 * - yaml_layout: what the file store puts on disk
 * - executor: worker pool backpressure and shutdown
 * - caching: static and keyed document caches
 * - events: broadcast notifications and validation reports
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("keepsake=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod backends;
mod caching;
mod documents;
mod events;
mod executor;
mod helpers;
mod migration;
mod yaml_layout;
