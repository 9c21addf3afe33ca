use std::time::Duration;

use reqwest::Client;
use tokio::sync::watch;

/// 网络连通状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Connected,
    Disconnected,
}

/// 连通状态的只读句柄
///
/// 对 watch 信道的封装：可订阅、可随时读取最新值。
/// 状态在请求进行中翻转不影响该请求已做出的分支决定
#[derive(Debug, Clone)]
pub struct ConnectivityHandle {
    rx: watch::Receiver<NetworkStatus>,
}

impl ConnectivityHandle {
    /// 固定状态的句柄，用于测试与嵌入场景
    pub fn fixed(status: NetworkStatus) -> Self {
        let (_tx, rx) = watch::channel(status);
        Self { rx }
    }

    /// 手动状态单元：返回发送端与句柄，发送端用于翻转状态
    pub fn cell(initial: NetworkStatus) -> (watch::Sender<NetworkStatus>, Self) {
        let (tx, rx) = watch::channel(initial);
        (tx, Self { rx })
    }

    pub fn status(&self) -> NetworkStatus {
        *self.rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.status() == NetworkStatus::Connected
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.rx.clone()
    }
}

/// 连通性监视器
///
/// 周期性向目录服务发 HEAD 探测并更新状态单元。
/// 服务器返回错误状态码也说明网络可达，只有传输层失败才视为断网
pub struct ConnectivityMonitor {
    client: Client,
    probe_url: String,
    interval: Duration,
    tx: watch::Sender<NetworkStatus>,
}

/// 单次探测超时
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

impl ConnectivityMonitor {
    pub fn new(probe_url: String, interval: Duration) -> Self {
        let (tx, _rx) = watch::channel(NetworkStatus::Connected);

        Self {
            client: Client::new(),
            probe_url,
            interval,
            tx,
        }
    }

    /// 从环境变量读取探测周期
    pub fn from_env(probe_url: String) -> Self {
        let secs = std::env::var("CONNECTIVITY_PROBE_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(15);

        Self::new(probe_url, Duration::from_secs(secs))
    }

    pub fn handle(&self) -> ConnectivityHandle {
        ConnectivityHandle {
            rx: self.tx.subscribe(),
        }
    }

    /// 启动探测循环，配合 tokio::spawn 使用
    pub async fn start(self) {
        tracing::info!(
            "Connectivity monitor started (probe: {}, interval: {:?})",
            self.probe_url,
            self.interval
        );

        let mut ticker = tokio::time::interval(self.interval);

        loop {
            ticker.tick().await;

            let status = match self
                .client
                .head(&self.probe_url)
                .timeout(PROBE_TIMEOUT)
                .send()
                .await
            {
                Ok(_) => NetworkStatus::Connected,
                Err(_) => NetworkStatus::Disconnected,
            };

            let changed = self.tx.send_if_modified(|current| {
                if *current != status {
                    *current = status;
                    true
                } else {
                    false
                }
            });

            if changed {
                tracing::info!("Network status changed: {:?}", status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_handle_keeps_status() {
        let handle = ConnectivityHandle::fixed(NetworkStatus::Disconnected);
        assert!(!handle.is_connected());
        assert_eq!(handle.status(), NetworkStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_cell_flip_is_observable() {
        let (tx, handle) = ConnectivityHandle::cell(NetworkStatus::Connected);
        assert!(handle.is_connected());

        let mut rx = handle.subscribe();
        tx.send(NetworkStatus::Disconnected).unwrap();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), NetworkStatus::Disconnected);
        assert!(!handle.is_connected());
    }
}
