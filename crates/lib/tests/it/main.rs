/*! Integration tests for Spamscope.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - backend: Contract tests shared by every Backend implementation
 * - store: ConversationStore over real backends, including concurrent writers
 * - conversation: ConversationSession workflows end to end
 * - classifier: HttpClassifier against a stub HTTP service
 * - batch: Batch import from disk through classification and promotion
 * - connectivity: ConnectivityMonitor against live and dead endpoints
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("spamscope=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod backend;
mod batch;
mod classifier;
mod connectivity;
mod conversation;
mod helpers;
mod store;
