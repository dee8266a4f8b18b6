use std::path::Path;

use aquachain_cli::{App, BillsCommand, Commands, SessionCommand, Settings};
use aquachain_wallet::ViewerRole;
use serde_json::Value;

fn settings(dir: &Path) -> Settings {
    let mut settings = Settings {
        storage_path: dir.join("session.json"),
        payment_delay_ms: 3_000,
        analysis_delay_ms: 2_000,
        ..Settings::default()
    };
    settings.feed.sensor_interval_ms = 100;
    settings.feed.distribution_interval_ms = 100;
    settings
}

async fn run(app: &mut App, command: Commands) -> anyhow::Result<String> {
    console::set_colors_enabled(false);
    let mut out = Vec::new();
    app.run(command, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

fn session(action: SessionCommand) -> Commands {
    Commands::Session { action }
}

#[tokio::test(start_paused = true)]
async fn switch_persists_across_invocations() {
    let dir = tempfile::tempdir().unwrap();

    let mut app = App::open(settings(dir.path()), false);
    let out = run(&mut app, session(SessionCommand::Switch { id: "admin-001".into() }))
        .await
        .unwrap();
    assert!(out.contains("Sarah Johnson as Administrator"));

    let mut reopened = App::open(settings(dir.path()), false);
    assert_eq!(reopened.store().viewer_role(), ViewerRole::Admin);
    let out = run(&mut reopened, session(SessionCommand::Status)).await.unwrap();
    assert!(out.contains("Connected Sarah Johnson"));

    run(&mut reopened, session(SessionCommand::Disconnect)).await.unwrap();
    let fresh = App::open(settings(dir.path()), false);
    assert_eq!(fresh.store().viewer_role(), ViewerRole::Public);
}

#[tokio::test(start_paused = true)]
async fn unknown_identity_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::open(settings(dir.path()), false);
    run(&mut app, session(SessionCommand::Connect)).await.unwrap();

    let err = run(&mut app, session(SessionCommand::Switch { id: "nobody".into() }))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("cannot switch to `nobody`"));
    assert_eq!(app.store().active_identity().unwrap().id, "user-001");
}

#[tokio::test(start_paused = true)]
async fn json_status_and_users() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::open(settings(dir.path()), true);

    let status: Value = serde_json::from_str(&run(&mut app, session(SessionCommand::Status)).await.unwrap()).unwrap();
    assert_eq!(status["connected"], false);
    assert_eq!(status["role"], "public");
    assert!(status["identity"].is_null());
    assert_eq!(status["balance"], 0.0);

    let users: Value = serde_json::from_str(&run(&mut app, session(SessionCommand::Users)).await.unwrap()).unwrap();
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 11);
    assert_eq!(users.iter().filter(|u| u["role"] == "admin").count(), 1);
    assert_eq!(users[1]["walletAddress"], "0x2345678901234567890123456789012345678901");
}

#[tokio::test(start_paused = true)]
async fn bills_follow_the_viewer() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::open(settings(dir.path()), false);

    let out = run(&mut app, Commands::Bills { action: BillsCommand::List }).await.unwrap();
    assert!(out.contains("Public tariff: 0.003 ETH per litre"));
    let err = run(&mut app, Commands::Bills { action: BillsCommand::Pay { bill_id: "bill-user-001-001".into() } })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("connect a wallet"));

    run(&mut app, session(SessionCommand::Connect)).await.unwrap();
    let out = run(&mut app, Commands::Bills { action: BillsCommand::List }).await.unwrap();
    assert_eq!(out.lines().filter(|l| l.starts_with("bill-user-001-")).count(), 3);

    let out = run(&mut app, Commands::Bills { action: BillsCommand::Pay { bill_id: "bill-user-001-001".into() } })
        .await
        .unwrap();
    assert!(out.contains("Paid 3.7500 ETH"));

    let err = run(&mut app, Commands::Bills { action: BillsCommand::Pay { bill_id: "bill-user-009-001".into() } })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unknown or already paid"));
}

#[tokio::test(start_paused = true)]
async fn insights_need_an_administrator() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::open(settings(dir.path()), false);
    run(&mut app, session(SessionCommand::Switch { id: "user-002".into() })).await.unwrap();
    assert!(run(&mut app, Commands::Insights).await.is_err());

    run(&mut app, session(SessionCommand::Switch { id: "admin-001".into() })).await.unwrap();
    let out = run(&mut app, Commands::Insights).await.unwrap();
    assert!(out.contains("Model accuracy"));
    assert!(out.contains("Water Level Decline Predicted"));
    assert!(out.contains("Quality Threshold Alert"));
}

#[tokio::test(start_paused = true)]
async fn dashboard_renders_each_tick() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::open(settings(dir.path()), true);
    run(&mut app, session(SessionCommand::Switch { id: "user-003".into() })).await.unwrap();

    let out = run(&mut app, Commands::Dashboard { ticks: 3 }).await.unwrap();
    let frames: Vec<Value> = out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0]["role"], "user");
    assert!(frames[0]["transactions"].as_array().unwrap().is_empty());
    assert!(!frames[2]["transactions"].as_array().unwrap().is_empty());

    let panels = frames[0]["panels"].as_array().unwrap();
    assert!(panels.contains(&serde_json::json!(["analytics", "restricted"])));
    assert!(panels.contains(&serde_json::json!(["sensors", "visible"])));
    assert!(!panels.iter().any(|p| p[0] == "overview"));
}
