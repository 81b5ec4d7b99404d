use anyhow::Context;
use clap::Parser;
use prieval::core::placeholders;
use prieval::core::Storage;
use prieval::utils::error::{ErrorCategory, PriEvalError};
use prieval::utils::{logger, validation::Validate};
use prieval::{
    CliConfig, EvaluationOrchestrator, HttpEvaluationBackend, LocalStorage, SessionStore,
    TriggerOutcome, UploadHandler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting prieval");

    let config = match cli.validate().and_then(|_| cli.resolve()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    tracing::debug!("Resolved config: {:?}", config);

    let store = SessionStore::new();
    let storage = LocalStorage::new(".");
    let uploads = UploadHandler::new(store.clone(), config.preview);

    if let Err(e) = uploads.load_policy_file(&storage, &cli.policy).await {
        exit_with(&e);
    }
    if let Err(e) = uploads.load_data_file(&storage, &cli.data).await {
        exit_with(&e);
    }

    if cli.show_preview {
        let snapshot = store.snapshot();
        let previews = serde_json::json!({
            "policy": snapshot.policy_preview(),
            "data": snapshot.data_preview(),
        });
        println!("{}", serde_json::to_string_pretty(&previews)?);
    }

    let backend = match HttpEvaluationBackend::new(&config) {
        Ok(backend) => backend,
        Err(e) => exit_with(&e),
    };
    let orchestrator = EvaluationOrchestrator::new(
        store,
        backend,
        placeholders::provider_for(config.placeholder_mode),
    );
    orchestrator.set_privacy_settings(config.settings);

    let outcome = orchestrator
        .evaluate_then(|result| {
            tracing::info!("📝 {} feedback items", result.feedback_items.len());
        })
        .await;

    match outcome {
        TriggerOutcome::Succeeded(result) => {
            let json = match result.to_json() {
                Ok(json) => json,
                Err(e) => exit_with(&e),
            };
            match &cli.output {
                Some(path) => {
                    storage
                        .write_file(path, json.as_bytes())
                        .await
                        .with_context(|| format!("writing result to {}", path))?;
                    tracing::info!("📁 Result saved to: {}", path);
                    println!("✅ Evaluation complete: {}", path);
                }
                None => println!("{}", json),
            }
            Ok(())
        }
        TriggerOutcome::Failed(error) => {
            eprintln!("❌ {}", error);
            std::process::exit(exit_code(error.category));
        }
        TriggerOutcome::Skipped | TriggerOutcome::Discarded => {
            anyhow::bail!("evaluation did not run to completion")
        }
    }
}

fn exit_with(e: &PriEvalError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e.category()));
}

/// 0 成功；1 處理錯誤；2 服務或網路錯誤；3 配置或系統錯誤
fn exit_code(category: ErrorCategory) -> i32 {
    match category {
        ErrorCategory::Precondition | ErrorCategory::Parse => 1,
        ErrorCategory::Transport | ErrorCategory::Service => 2,
        ErrorCategory::Io | ErrorCategory::Configuration => 3,
    }
}
