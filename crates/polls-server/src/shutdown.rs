//! Graceful shutdown

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, broadcast};

/// Broadcasts a shutdown request and tracks open connections
///
/// Clones share state: any clone may call [`ShutdownCoordinator::shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
	sender: broadcast::Sender<()>,
	timeout: Duration,
	active: Arc<AtomicUsize>,
	idle: Arc<Notify>,
}

impl ShutdownCoordinator {
	/// `timeout` bounds how long in-flight connections may keep running
	pub fn new(timeout: Duration) -> Self {
		let (sender, _) = broadcast::channel(1);
		Self {
			sender,
			timeout,
			active: Arc::new(AtomicUsize::new(0)),
			idle: Arc::new(Notify::new()),
		}
	}

	pub fn subscribe(&self) -> broadcast::Receiver<()> {
		self.sender.subscribe()
	}

	pub fn shutdown(&self) {
		// No receivers just means nothing is listening yet.
		let _ = self.sender.send(());
	}

	pub fn active_connections(&self) -> usize {
		self.active.load(Ordering::SeqCst)
	}

	/// Count a connection as open until the guard drops
	pub fn track(&self) -> ConnectionGuard {
		self.active.fetch_add(1, Ordering::SeqCst);
		ConnectionGuard {
			active: self.active.clone(),
			idle: self.idle.clone(),
		}
	}

	/// Wait until no connection is open or the timeout elapses
	///
	/// Returns `false` when connections were still open at the deadline.
	pub async fn wait_for_connections(&self) -> bool {
		let drained = async {
			loop {
				let notified = self.idle.notified();
				if self.active.load(Ordering::SeqCst) == 0 {
					return;
				}
				notified.await;
			}
		};
		tokio::time::timeout(self.timeout, drained).await.is_ok()
	}
}

pub struct ConnectionGuard {
	active: Arc<AtomicUsize>,
	idle: Arc<Notify>,
}

impl Drop for ConnectionGuard {
	fn drop(&mut self) {
		if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
			self.idle.notify_waiters();
		}
	}
}

/// Resolves on Ctrl-C
pub async fn shutdown_signal() {
	if let Err(error) = tokio::signal::ctrl_c().await {
		tracing::error!(%error, "failed to listen for Ctrl-C");
		std::future::pending::<()>().await;
	}
	tracing::info!("received Ctrl-C, shutting down gracefully");
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_wait_returns_once_connections_close() {
		// Arrange
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
		let guard = coordinator.track();

		// Act
		let waiter = {
			let coordinator = coordinator.clone();
			tokio::spawn(async move { coordinator.wait_for_connections().await })
		};
		tokio::time::sleep(Duration::from_millis(20)).await;
		drop(guard);

		// Assert
		assert!(waiter.await.unwrap());
		assert_eq!(coordinator.active_connections(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_wait_times_out() {
		let coordinator = ShutdownCoordinator::new(Duration::from_millis(20));
		let _guard = coordinator.track();

		assert!(!coordinator.wait_for_connections().await);
	}

	#[rstest]
	#[tokio::test]
	async fn test_shutdown_reaches_subscribers() {
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
		let mut receiver = coordinator.subscribe();

		coordinator.clone().shutdown();

		assert!(receiver.recv().await.is_ok());
	}
}
