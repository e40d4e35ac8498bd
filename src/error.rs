//! 错误类型
//!
//! 构建阶段的致命错误。任何一个出现，仿真都不会开始调度事件。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// 拓扑或参数不合法（自环、缺失类型/参数、数值越界）
    #[error("configuration error in {component}: {detail}")]
    Configuration { component: String, detail: String },

    /// 存在不可达的节点对
    #[error("routing error: no path from node '{from}' to node '{to}'")]
    Routing { from: String, to: String },

    /// 发包模式既不是 poisson 也不是 periodic
    #[error("node '{node}': packet generator '{mode}' is not implemented")]
    UnknownGenerationMode { node: String, mode: String },

    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn config(component: impl Into<String>, detail: impl Into<String>) -> Self {
        SimError::Configuration {
            component: component.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
