/* demos/basic.rs */

use live_policy::holder::{PolicyCell, PolicyTable};
use live_policy::policy::{LimiterConfig, RetryPolicy, TimeoutPolicy};
use live_policy::signal::{FileWatcher, WatchConfig};
use live_policy::suite::{ClientPolicySuite, ServerPolicySuite};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

const INITIAL: &str = r#"{
	"EchoService": {
		"timeout": { "Echo": { "conn_timeout_ms": 100, "rpc_timeout_ms": 2000 } },
		"retry": { "Echo": { "enable": true, "failure_policy": { "stop_policy": { "max_retry_times": 2 } } } }
	},
	"EchoServer": {
		"limit": { "connection_limit": 100, "qps_limit": 1000 }
	}
}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// 0. Prepare a real file
	let config_path = "example_policies.json";
	fs::write(config_path, INITIAL)?;
	println!("Created {}", config_path);

	// 1. One watcher per file, shared by every suite reading it
	let watcher = Arc::new(FileWatcher::with_config(
		config_path,
		WatchConfig {
			debounce: Duration::from_millis(50),
			..WatchConfig::default()
		},
	)?);

	// 2. Stores the RPC framework would consult on every call
	let timeouts = Arc::new(PolicyTable::new(TimeoutPolicy::new(500, 1000)));
	let retries = Arc::new(PolicyTable::<RetryPolicy>::default());
	let limiter = Arc::new(PolicyCell::new(LimiterConfig::default()));

	// 3. Wire them up; each store is primed from the file right away
	let client = ClientPolicySuite::builder()
		.service("EchoService")
		.watcher(Arc::clone(&watcher))
		.timeout(Arc::clone(&timeouts))
		.retry(Arc::clone(&retries))
		.build()?;
	let server = ServerPolicySuite::builder()
		.server("EchoServer")
		.watcher(Arc::clone(&watcher))
		.limiter(Arc::clone(&limiter))
		.build()?;

	println!("Echo timeout: {:?}", timeouts.get("Echo"));
	println!("Echo retry overridden: {}", retries.is_overridden("Echo"));
	println!("Server limit: {:?}", limiter.get());

	// 4. Start watching
	watcher.start_watching()?;
	println!(
		"Watching for changes on {}... (Edit the file to see updates)",
		config_path
	);
	println!("Waiting 20 seconds...");

	for _ in 0..10 {
		tokio::time::sleep(Duration::from_secs(2)).await;
		println!(
			"Echo timeout: {:?}, retry overridden: {}, limit: {:?}",
			timeouts.get("Echo"),
			retries.is_overridden("Echo"),
			limiter.get()
		);
	}

	// Cleanup
	client.close();
	server.close();
	watcher.stop_watching();
	fs::remove_file(config_path)?;
	println!("Done.");
	Ok(())
}
