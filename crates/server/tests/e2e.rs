use std::net::SocketAddr;
use std::path::PathBuf;

use configs::AppConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use uuid::Uuid;

struct TestApp {
    base_url: String,
    cfg_path: PathBuf,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = std::fs::remove_file(&self.cfg_path);
    }
}

async fn start_server(initial: serde_json::Value) -> anyhow::Result<TestApp> {
    // Use an isolated ServerCfg.json per test run
    let cfg_path = std::env::temp_dir().join(format!("ServerCfg_{}.json", Uuid::new_v4()));
    tokio::fs::write(&cfg_path, serde_json::to_vec_pretty(&initial)?).await?;

    let mut cfg = AppConfig::default();
    cfg.store.path = cfg_path.to_string_lossy().to_string();
    let app = server::startup::build_app(&cfg);

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        let shutdown = async move {
            let _ = rx.await;
        };
        if let Err(e) = server::serve(listener, app, shutdown).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, cfg_path, shutdown: Some(tx) })
}

#[tokio::test]
async fn e2e_rotate_then_lookup() -> anyhow::Result<()> {
    let app = start_server(json!({"alpha": {"GSLT": "tok1", "ConnString": "cs1"}})).await?;
    let c = reqwest::Client::new();

    let res = c.get(format!("{}/?server=alpha", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.text().await?, "cs1");

    let res = c
        .post(format!("{}/", app.base_url))
        .json(&json!({"GSLT": "tok1", "ConnString": "cs2"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.text().await?, "OK");

    let res = c.get(format!("{}/?server=alpha", app.base_url)).send().await?;
    assert_eq!(res.text().await?, "cs2");

    // file on disk carries the new mapping under the same short name
    let on_disk: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&app.cfg_path).await?)?;
    assert_eq!(on_disk, json!({"alpha": {"GSLT": "tok1", "ConnString": "cs2"}}));
    Ok(())
}

#[tokio::test]
async fn e2e_unknown_token_and_bad_body() -> anyhow::Result<()> {
    let initial = json!({"alpha": {"GSLT": "tok1", "ConnString": "cs1"}});
    let app = start_server(initial.clone()).await?;
    let c = reqwest::Client::new();

    let res = c
        .post(format!("{}/", app.base_url))
        .json(&json!({"GSLT": "nope", "ConnString": "x"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.text().await?, "Server not found");

    let res = c.post(format!("{}/", app.base_url)).body("not json").send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert!(res.text().await?.contains("Invalid data"));

    let on_disk: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&app.cfg_path).await?)?;
    assert_eq!(on_disk, initial);
    Ok(())
}

#[tokio::test]
async fn e2e_missing_file_and_method_not_allowed() -> anyhow::Result<()> {
    let app = start_server(json!({})).await?;
    let c = reqwest::Client::new();

    let res = c.put(format!("{}/", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.text().await?, "Method not allowed");

    tokio::fs::remove_file(&app.cfg_path).await?;
    let res = c.get(format!("{}/?server=alpha", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await?, "Failed to load configuration");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn e2e_concurrent_posts_keep_every_update() -> anyhow::Result<()> {
    let mut initial = serde_json::Map::new();
    for i in 0..8 {
        initial.insert(format!("srv{i}"), json!({"GSLT": format!("tok{i}"), "ConnString": "old"}));
    }
    let app = start_server(serde_json::Value::Object(initial)).await?;
    let c = reqwest::Client::new();

    let mut handles = Vec::new();
    for i in 0..8 {
        let c = c.clone();
        let url = format!("{}/", app.base_url);
        handles.push(tokio::spawn(async move {
            c.post(url)
                .json(&json!({"GSLT": format!("tok{i}"), "ConnString": format!("new{i}")}))
                .send()
                .await
        }));
    }
    for h in handles {
        let res = h.await??;
        assert_eq!(res.status(), HttpStatusCode::OK);
    }

    for i in 0..8 {
        let res = c.get(format!("{}/?server=srv{i}", app.base_url)).send().await?;
        assert_eq!(res.text().await?, format!("new{i}"));
    }
    Ok(())
}
