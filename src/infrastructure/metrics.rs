// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化 Prometheus 指标导出
///
/// 监听地址无效或端口被占用时只输出警告，不影响服务启动
pub fn init_metrics(listen: &str) {
    let addr: SocketAddr = match listen.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", listen, e);
            return;
        }
    };

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }

    describe_counter!(
        "orchestration_cycles_total",
        "Total number of orchestration cycles run"
    );
    describe_counter!(
        "orchestration_tasks_total",
        "Total number of dispatched orchestration tasks by outcome"
    );
    describe_histogram!(
        "orchestration_task_duration_seconds",
        "Duration of orchestration tasks in seconds"
    );
    describe_counter!(
        "feature_transitions_total",
        "Total number of feature request state transitions"
    );
    describe_counter!(
        "developer_agent_requests_total",
        "Total number of developer agent requests by outcome"
    );

    info!("Metrics exporter listening on {}", addr);
}
