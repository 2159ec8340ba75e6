/* tests/integration.rs */

#![cfg(feature = "json")]

use std::sync::Arc;
use std::time::Duration;

use live_policy::holder::{PolicyCell, PolicyTable};
use live_policy::monitor::MonitorError;
use live_policy::policy::{CircuitBreakerPolicy, LimiterConfig, RetryPolicy, TimeoutPolicy};
use live_policy::signal::{FileWatcher, WatchConfig};
use live_policy::suite::{ClientPolicySuite, ServerPolicySuite};

const INITIAL: &str = r#"{
	"EchoService": {
		"timeout": { "Echo": { "conn_timeout_ms": 100, "rpc_timeout_ms": 2000 } },
		"retry": { "Echo": { "enable": true, "failure_policy": { "stop_policy": { "max_retry_times": 2 } } } },
		"circuitbreaker": { "Echo": { "enable": true, "err_rate": 0.3, "min_sample": 100 } }
	},
	"EchoServer": { "limit": { "connection_limit": 100, "qps_limit": 1000 } }
}"#;

const UPDATED: &str = r#"{
	"EchoService": {
		"timeout": { "Echo": { "conn_timeout_ms": 50, "rpc_timeout_ms": 500 } }
	},
	"EchoServer": {}
}"#;

fn watcher_for(path: &std::path::Path) -> Arc<FileWatcher> {
	let config = WatchConfig {
		debounce: Duration::from_millis(20),
		..WatchConfig::default()
	};
	Arc::new(FileWatcher::with_config(path, config).unwrap())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_live_reload_reaches_policy_stores() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("policies.json");
	tokio::fs::write(&path, INITIAL).await?;
	let watcher = watcher_for(&path);

	let timeouts = Arc::new(PolicyTable::new(TimeoutPolicy::new(1, 1)));
	let retries = Arc::new(PolicyTable::<RetryPolicy>::default());
	let breakers = Arc::new(PolicyTable::<CircuitBreakerPolicy>::default());
	let limiter = Arc::new(PolicyCell::new(LimiterConfig::default()));

	let client = ClientPolicySuite::builder()
		.service("EchoService")
		.watcher(Arc::clone(&watcher))
		.timeout(Arc::clone(&timeouts))
		.retry(Arc::clone(&retries))
		.circuit_breaker(Arc::clone(&breakers))
		.build()?;
	let server = ServerPolicySuite::builder()
		.server("EchoServer")
		.watcher(Arc::clone(&watcher))
		.limiter(Arc::clone(&limiter))
		.build()?;
	assert_eq!(watcher.callback_count(), 2);

	// primed synchronously by build()
	assert_eq!(*timeouts.get("Echo"), TimeoutPolicy::new(100, 2000));
	assert!(retries.is_overridden("Echo"));
	assert!(breakers.is_overridden("Echo"));
	assert_eq!(*limiter.get(), LimiterConfig::new(100, 1000));

	watcher.start_watching()?;
	tokio::fs::write(&path, UPDATED).await?;

	// Wait for reload, 5 seconds max
	for _ in 0..50 {
		tokio::time::sleep(Duration::from_millis(100)).await;
		if *timeouts.get("Echo") == TimeoutPolicy::new(50, 500) && !limiter.is_overridden() {
			break;
		}
	}

	assert_eq!(*timeouts.get("Echo"), TimeoutPolicy::new(50, 500));
	assert!(!retries.is_overridden("Echo"));
	assert!(!breakers.is_overridden("Echo"));
	assert!(!limiter.is_overridden());
	assert_eq!(client.config().unwrap().timeout.len(), 1);

	client.close();
	server.close();
	watcher.stop_watching();
	Ok(())
}

#[test]
fn test_close_detaches_everything_once() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("policies.json");
	std::fs::write(&path, INITIAL).unwrap();
	let watcher = watcher_for(&path);

	let timeouts = Arc::new(PolicyTable::new(TimeoutPolicy::new(1, 1)));
	let client = ClientPolicySuite::builder()
		.service("EchoService")
		.watcher(Arc::clone(&watcher))
		.timeout(Arc::clone(&timeouts))
		.build()
		.unwrap();
	assert_eq!(client.monitor().subscriber_count(), 1);

	client.close();
	client.close();
	assert!(client.is_closed());
	assert_eq!(client.monitor().subscriber_count(), 0);
	assert!(!client.monitor().is_started());
	assert_eq!(watcher.callback_count(), 0);

	// the store keeps its last state but no longer follows the file
	std::fs::write(&path, UPDATED).unwrap();
	watcher.call_once_all().unwrap();
	assert_eq!(*timeouts.get("Echo"), TimeoutPolicy::new(100, 2000));
}

#[test]
fn test_dropping_suite_closes_it() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("policies.json");
	std::fs::write(&path, INITIAL).unwrap();
	let watcher = watcher_for(&path);

	{
		let _server = ServerPolicySuite::builder()
			.server("EchoServer")
			.watcher(Arc::clone(&watcher))
			.limiter(Arc::new(PolicyCell::new(LimiterConfig::default())))
			.build()
			.unwrap();
		assert_eq!(watcher.callback_count(), 1);
	}
	assert_eq!(watcher.callback_count(), 0);
}

#[test]
fn test_suite_builder_errors() {
	let err = ClientPolicySuite::builder().build().unwrap_err();
	assert!(matches!(err, MonitorError::Builder(msg) if msg.contains("service")));

	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("policies.json");
	std::fs::write(&path, INITIAL).unwrap();
	let watcher = watcher_for(&path);
	watcher.stop_watching();

	// a stopped watcher refuses the priming read
	let err = ClientPolicySuite::builder()
		.service("EchoService")
		.watcher(Arc::clone(&watcher))
		.build()
		.unwrap_err();
	assert!(matches!(err, MonitorError::Signal(_)));
	assert_eq!(watcher.callback_count(), 0);

	let err = ServerPolicySuite::builder()
		.server("EchoServer")
		.watcher(watcher)
		.build()
		.unwrap_err();
	assert!(matches!(err, MonitorError::Builder(msg) if msg.contains("limiter")));
}
