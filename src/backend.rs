//! 后台网络线程
//!
//! UI 线程通过命令队列提交请求，后台线程在 tokio 运行时里为每个命令起一个任务，
//! 完成后把结果作为事件送回 UI。请求一旦发出就会跑完，不会被取消。

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};
use tracing::Instrument;
use uuid::Uuid;

use crate::api::CatalogApi;
use crate::models::{NewProduct, Product, ProductPatch};

const COMMAND_QUEUE_CAPACITY: usize = 64;
const EVENT_QUEUE_CAPACITY: usize = 256;

/// UI -> 后台
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    LoadAll,
    Update { id: i64, patch: ProductPatch },
    Create { product: NewProduct },
}

impl BackendCommand {
    fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadAll => "load_all",
            BackendCommand::Update { .. } => "update",
            BackendCommand::Create { .. } => "create",
        }
    }
}

/// 后台 -> UI
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    Loaded(Vec<Product>),
    LoadFailed(String),
    Updated { id: i64 },
    UpdateFailed { id: i64, reason: String },
    Created,
    CreateFailed(String),
}

/// 后台线程句柄
pub struct Backend {
    cmd_tx: Sender<BackendCommand>,
    event_rx: Receiver<BackendEvent>,
}

impl Backend {
    /// 启动后台线程
    pub fn start(api: Arc<dyn CatalogApi>) -> Self {
        let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(COMMAND_QUEUE_CAPACITY);
        let (event_tx, event_rx) = bounded::<BackendEvent>(EVENT_QUEUE_CAPACITY);
        spawn_worker(api, cmd_rx, event_tx);
        Self { cmd_tx, event_rx }
    }

    /// 提交命令；队列满或后台已退出时只记录日志
    pub fn submit(&self, cmd: BackendCommand) {
        let name = cmd.name();
        match self.cmd_tx.try_send(cmd) {
            Ok(()) => tracing::debug!(command = name, "queued backend command"),
            Err(TrySendError::Full(_)) => {
                tracing::warn!(command = name, "backend command queue is full; dropped")
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!(command = name, "backend worker disconnected")
            }
        }
    }

    /// 取出所有已到达的事件（不阻塞）
    pub fn drain_events(&self) -> Vec<BackendEvent> {
        let mut events = Vec::new();
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    #[cfg(test)]
    fn recv_timeout(&self, timeout: std::time::Duration) -> Option<BackendEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn spawn_worker(
    api: Arc<dyn CatalogApi>,
    cmd_rx: Receiver<BackendCommand>,
    event_tx: Sender<BackendEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                let span = tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    command = cmd.name()
                );
                let api = Arc::clone(&api);
                let event_tx = event_tx.clone();
                tokio::spawn(
                    async move {
                        let event = execute(api.as_ref(), cmd).await;
                        deliver(&event_tx, event);
                    }
                    .instrument(span),
                );
            }
            tracing::debug!("command queue closed; backend worker exiting");
        });
    });
}

/// 把事件送回 UI；在运行时任务里调用，所以不能阻塞。队列满时丢弃并告警
fn deliver(event_tx: &Sender<BackendEvent>, event: BackendEvent) -> bool {
    match event_tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::warn!("backend event queue is full; dropped");
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!("ui gone; dropping backend event");
            false
        }
    }
}

/// 执行单个命令，每个命令恰好发出一次请求
async fn execute(api: &dyn CatalogApi, cmd: BackendCommand) -> BackendEvent {
    match cmd {
        BackendCommand::LoadAll => match api.list_products().await {
            Ok(products) => {
                tracing::info!(count = products.len(), "loaded products");
                BackendEvent::Loaded(products)
            }
            Err(err) => {
                tracing::error!("failed to load products: {err}");
                BackendEvent::LoadFailed(err.to_string())
            }
        },
        BackendCommand::Update { id, patch } => match api.update_product(id, &patch).await {
            Ok(()) => {
                tracing::info!(id, "updated product");
                BackendEvent::Updated { id }
            }
            Err(err) => {
                tracing::warn!(id, "update rejected: {err}");
                BackendEvent::UpdateFailed {
                    id,
                    reason: err.to_string(),
                }
            }
        },
        BackendCommand::Create { product } => match api.create_product(&product).await {
            Ok(()) => {
                tracing::info!(title = %product.title, "created product");
                BackendEvent::Created
            }
            Err(err) => {
                tracing::warn!("create rejected: {err}");
                BackendEvent::CreateFailed(err.to_string())
            }
        },
    }
}
