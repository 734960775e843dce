// ==========================================
// 商城数据导入系统 - 队列层
// ==========================================
// 职责: 队列传输抽象、SQLite 队列实现与队列读取器
// ==========================================

// 模块声明
pub mod item_reader;
pub mod transport;

// 重导出核心类型
pub use item_reader::{QueueItemReader, ReaderState};
pub use transport::{build_queue_name, QueueJob, QueueTransport, SqliteQueueTransport};
