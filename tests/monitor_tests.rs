/* tests/monitor_tests.rs */

#![cfg(feature = "json")]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use live_policy::loader::{ConfigParser, ConfigType, DecodeError, DefaultParser, ParserParams};
use live_policy::monitor::{ClientFileManager, ConfigMonitor, MonitorError, ServerFileManager};
use live_policy::policy::TimeoutPolicy;
use live_policy::signal::FileWatcher;
use serde::de::DeserializeOwned;
use tempfile::TempDir;

const TWO_SERVICES: &str = r#"{
	"EchoService": { "timeout": { "Echo": { "conn_timeout_ms": 10, "rpc_timeout_ms": 20 } } },
	"PingService": { "timeout": { "Ping": { "conn_timeout_ms": 30, "rpc_timeout_ms": 40 } } }
}"#;

fn policy_file(body: &str) -> (TempDir, PathBuf, Arc<FileWatcher>) {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("policies.json");
	std::fs::write(&path, body).unwrap();
	let watcher = Arc::new(FileWatcher::new(&path).unwrap());
	(dir, path, watcher)
}

fn rewrite(path: &Path, watcher: &FileWatcher, body: &str) {
	std::fs::write(path, body).unwrap();
	watcher.call_once_all().unwrap();
}

fn client_monitor(key: &str, watcher: &Arc<FileWatcher>) -> ConfigMonitor<ClientFileManager> {
	ConfigMonitor::<ClientFileManager>::builder()
		.key(key)
		.watcher(Arc::clone(watcher))
		.manager(ClientFileManager)
		.build()
		.unwrap()
}

#[test]
fn test_construction_errors() {
	let (_dir, _path, watcher) = policy_file("{}");

	let err = ConfigMonitor::<ClientFileManager>::new("", Arc::clone(&watcher)).unwrap_err();
	assert!(matches!(err, MonitorError::EmptyKey));

	let err = ConfigMonitor::<ClientFileManager>::builder()
		.key("EchoService")
		.build()
		.unwrap_err();
	assert!(matches!(err, MonitorError::Builder(msg) if msg.contains("watcher")));

	let err = ConfigMonitor::<ClientFileManager>::builder()
		.watcher(watcher)
		.build()
		.unwrap_err();
	assert!(matches!(err, MonitorError::Builder(msg) if msg.contains("key")));
}

#[test]
fn test_start_requires_manager() {
	let (_dir, _path, watcher) = policy_file(TWO_SERVICES);
	let mut monitor = ConfigMonitor::<ClientFileManager>::new("EchoService", Arc::clone(&watcher)).unwrap();

	assert!(matches!(monitor.start(), Err(MonitorError::ManagerNotSet)));
	assert_eq!(watcher.callback_count(), 0);

	monitor.set_manager(ClientFileManager);
	monitor.start().unwrap();
	assert!(monitor.is_started());
	assert_eq!(watcher.callback_count(), 1);
}

#[test]
fn test_start_primes_snapshot_and_lifecycle() {
	let (_dir, _path, watcher) = policy_file(TWO_SERVICES);
	let monitor = client_monitor("EchoService", &watcher);
	assert!(monitor.config().is_none());

	monitor.start().unwrap();
	let config = monitor.config().unwrap();
	assert_eq!(config.timeout["Echo"], Some(TimeoutPolicy::new(10, 20)));
	assert!(!config.timeout.contains_key("Ping"));
	assert!(matches!(monitor.start(), Err(MonitorError::AlreadyStarted)));

	monitor.stop();
	monitor.stop();
	assert!(!monitor.is_started());
	assert_eq!(watcher.callback_count(), 0);
	assert!(matches!(monitor.start(), Err(MonitorError::Stopped)));

	// the last snapshot survives stop
	assert!(monitor.config().is_some());
}

#[test]
fn test_missing_key_and_malformed_file_keep_snapshot() {
	let (_dir, path, watcher) = policy_file("{ broken");
	let monitor = client_monitor("EchoService", &watcher);

	// a bad first read is logged, not returned
	monitor.start().unwrap();
	assert!(monitor.config().is_none());

	let notified = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&notified);
	monitor.register_callback(move || {
		counter.fetch_add(1, Ordering::SeqCst);
	});

	rewrite(&path, &watcher, TWO_SERVICES);
	assert_eq!(notified.load(Ordering::SeqCst), 1);
	let good = monitor.config().unwrap();

	rewrite(&path, &watcher, "[1, 2");
	rewrite(&path, &watcher, r#"{ "PingService": {} }"#);
	assert_eq!(notified.load(Ordering::SeqCst), 1);
	assert!(Arc::ptr_eq(&good, &monitor.config().unwrap()));
}

#[test]
fn test_subscribers() {
	let (_dir, path, watcher) = policy_file(TWO_SERVICES);
	let monitor = client_monitor("EchoService", &watcher);
	monitor.start().unwrap();

	let reader = monitor.reader();
	let seen = Arc::new(AtomicUsize::new(0));
	let sink = Arc::clone(&seen);
	let handle = monitor.register_callback(move || {
		let rpc = reader.get().unwrap().timeout["Echo"].unwrap().rpc_timeout_ms;
		sink.store(rpc as usize, Ordering::SeqCst);
	});
	assert_eq!(monitor.subscriber_count(), 1);

	monitor.call_once_specific(handle).unwrap();
	assert_eq!(seen.load(Ordering::SeqCst), 20);

	rewrite(
		&path,
		&watcher,
		r#"{ "EchoService": { "timeout": { "Echo": { "rpc_timeout_ms": 99 } } } }"#,
	);
	assert_eq!(seen.load(Ordering::SeqCst), 99);

	monitor.deregister_callback(handle);
	rewrite(&path, &watcher, TWO_SERVICES);
	assert_eq!(seen.load(Ordering::SeqCst), 99);
	assert!(matches!(
		monitor.call_once_specific(handle),
		Err(MonitorError::CallbackNotFound(_))
	));

	monitor.stop();
	assert_eq!(monitor.subscriber_count(), 0);
	assert!(matches!(
		monitor.call_once_specific(handle),
		Err(MonitorError::Stopped)
	));
}

#[test]
fn test_two_monitors_share_a_watcher() {
	let (_dir, path, watcher) = policy_file(TWO_SERVICES);
	let echo = client_monitor("EchoService", &watcher);
	let ping = client_monitor("PingService", &watcher);
	echo.start().unwrap();
	ping.start().unwrap();
	assert_eq!(watcher.callback_count(), 2);

	assert!(echo.config().unwrap().timeout.contains_key("Echo"));
	assert!(ping.config().unwrap().timeout.contains_key("Ping"));

	echo.stop();
	assert_eq!(watcher.callback_count(), 1);

	rewrite(
		&path,
		&watcher,
		r#"{ "PingService": { "timeout": { "Ping": { "rpc_timeout_ms": 7 } } } }"#,
	);
	assert_eq!(ping.config().unwrap().timeout["Ping"].unwrap().rpc_timeout_ms, 7);
	assert_eq!(echo.config().unwrap().timeout["Echo"].unwrap().rpc_timeout_ms, 20);
}

#[test]
fn test_dropping_monitor_detaches_it() {
	let (_dir, _path, watcher) = policy_file(TWO_SERVICES);
	{
		let monitor = client_monitor("EchoService", &watcher);
		monitor.start().unwrap();
		assert_eq!(watcher.callback_count(), 1);
	}
	assert_eq!(watcher.callback_count(), 0);
}

struct CountingParser {
	calls: Arc<AtomicUsize>,
}

impl ConfigParser for CountingParser {
	fn decode<T: DeserializeOwned>(&self, kind: ConfigType, data: &[u8]) -> Result<T, DecodeError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		DefaultParser.decode(kind, data)
	}
}

#[test]
fn test_custom_parser_is_used() {
	let (_dir, path, watcher) = policy_file(TWO_SERVICES);
	let calls = Arc::new(AtomicUsize::new(0));
	let monitor = ConfigMonitor::<ClientFileManager>::builder()
		.key("EchoService")
		.watcher(Arc::clone(&watcher))
		.manager(ClientFileManager)
		.parser(CountingParser {
			calls: Arc::clone(&calls),
		})
		.build()
		.unwrap();

	monitor.start().unwrap();
	rewrite(&path, &watcher, TWO_SERVICES);
	assert_eq!(calls.load(Ordering::SeqCst), 2);

	let doc: serde_json::Value = monitor.decode(ConfigType::Json, b"{\"a\": 1}").unwrap();
	assert_eq!(doc["a"], 1);
}

#[cfg(feature = "yaml")]
#[test]
fn test_yaml_server_file() {
	let (_dir, _path, watcher) =
		policy_file("EchoServer:\n  limit:\n    connection_limit: 3\n    qps_limit: 4\n");
	let monitor = ConfigMonitor::<ServerFileManager>::builder()
		.key("EchoServer")
		.watcher(watcher)
		.manager(ServerFileManager)
		.params(ParserParams::new(ConfigType::Yaml))
		.build()
		.unwrap();

	monitor.start().unwrap();
	let limit = monitor.config().unwrap().limit.unwrap();
	assert_eq!((limit.connection_limit, limit.qps_limit), (3, 4));
}
