// Task-Modul: Enthält alle Embassy Tasks
//
// Der Status-Task besitzt LEDs und Display exklusiv. Der HTTP-Task
// übergibt setStatus Kommandos über ein Signal an ihn.

pub mod http;
pub mod mqtt;
pub mod status;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use http::http_server_task;
pub use status::{StatusSource, status_task};
pub use wifi::{connection_task, net_task, wait_for_network};
