use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

fn main() -> std::process::ExitCode {
    // 提前加载 .env，使得 RUST_LOG / CONFIG_PATH 等环境变量生效
    dotenv().ok();

    // 读取配置（优先 config.toml，其次环境变量）；日志格式依赖配置，因此先于日志初始化
    let loaded = configs::AppConfig::load_and_validate();
    let json_logs = match &loaded {
        Ok(cfg) => cfg.logging.json,
        Err(_) => std::env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false),
    };
    common::utils::logging::init_logging(json_logs);
    info!(service = "listener", event = "logger_init", json = json_logs, "tracing subscriber initialized");

    let cfg = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(service = "listener", event = "config_invalid", error = %e, "invalid configuration, using defaults");
            let mut cfg = configs::AppConfig::default();
            if let Err(e) = cfg.normalize_and_validate() {
                error!(service = "listener", event = "config_invalid", error = %e, "default configuration rejected");
                return std::process::ExitCode::FAILURE;
            }
            cfg
        }
    };

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：捕获异常并输出错误日志，便于排查问题
    std::panic::set_hook(Box::new({
        let service_id = service_id;
        move |info| {
            error!(
                service = "listener",
                event = "panic",
                %service_id,
                pid,
                message = %info,
                "unhandled panic occurred"
            );
        }
    }));

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "listener", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "listener",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        store = %cfg.store.path,
        "listener service starting"
    );

    // server::run 内部监听 Ctrl+C 并优雅停机
    rt.block_on(async move {
        match server::run(cfg).await {
            Ok(()) => {
                info!(service = "listener", event = "stop", %service_id, pid, "listener stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "listener", event = "run_failed", error = %e, "server::run returned error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
