//! Subcommand implementations

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context as _, bail};
use folio_ai::{CompletionService, Context, Message};
use folio_engine::{
    ActionKind, Catalog, ChatAccumulator, ChatOutcome, Document, DocumentSet, EngineConfig, Plan,
    Recommendation, TaskAction, parse_json, prompt,
};
use tokio_util::sync::CancellationToken;

/// Repair-parse model output from a file or stdin and print the plan
pub fn parse(file: Option<&Path>) -> anyhow::Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let Some(plan) = Plan::parse(&raw) else {
        bail!("no plan could be recovered from the input");
    };
    println!("{}", serde_json::to_string_pretty(&plan)?);
    print_checks(&plan, &Catalog::new());
    Ok(())
}

/// Plan an instruction without executing it, streaming the model's reply
pub async fn plan(
    service: &dyn CompletionService,
    config: &EngineConfig,
    instruction: &str,
    documents: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let catalog = Catalog::new();
    let context = Context::with_system(prompt::system_instruction(&catalog));

    let mut loaded = DocumentSet::new();
    for name in documents {
        loaded.push(Document::new(name.as_str(), Vec::new()));
    }
    let message = Message::user(prompt::operator_message(instruction, &loaded));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let stream = service
        .send_streaming(&context, message, cancel.clone())
        .await?;
    let mut accumulator = ChatAccumulator::new(config.chat_idle_timeout());
    let outcome = accumulator
        .drain(stream, &cancel, |delta| {
            if !json {
                eprint!("{}", delta);
                let _ = std::io::stderr().flush();
            }
        })
        .await?;
    if !json {
        eprintln!();
    }
    match outcome {
        ChatOutcome::Complete => {}
        ChatOutcome::Cancelled => bail!("interrupted"),
        ChatOutcome::TimedOut => bail!("the model stopped responding"),
    }

    let Some(plan) = Plan::parse(accumulator.text()) else {
        bail!("{}", prompt::REPHRASE_MESSAGE);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }
    if !plan.response_message.is_empty() {
        println!("{}", plan.response_message);
        println!();
    }
    print_checks(&plan, &catalog);
    Ok(())
}

/// Ask which single action fits a need
pub async fn recommend(service: &dyn CompletionService, query: &str) -> anyhow::Result<()> {
    let context = Context::with_system(prompt::recommend_instruction());
    let raw = service.send(&context, Message::user(query)).await?;
    let value = parse_json(&raw).context("the model did not return JSON")?;
    let recommendation: Recommendation = serde_json::from_value(value)?;
    println!("{}: {}", recommendation.action.as_str(), recommendation.reason);
    Ok(())
}

/// List the action vocabulary
pub fn actions() {
    for kind in ActionKind::ALL {
        println!("{:<18} {}", kind.as_str(), kind.description());
    }
}

/// One line per task: its action and whether the catalog accepts it
fn print_checks(plan: &Plan, catalog: &Catalog) {
    if plan.is_empty() {
        println!("(no tasks)");
        return;
    }
    for (index, task) in plan.tasks.iter().enumerate() {
        let status = match (&task.action, task.defect()) {
            (_, Some(defect)) => format!("invalid: {}", defect),
            (TaskAction::Known(kind), None) => match catalog.validate(*kind, &task.parameters) {
                Ok(()) => "ok".to_string(),
                Err(e) => format!("invalid: {}", e),
            },
            (TaskAction::Unknown(_), None) => "invalid: unknown action".to_string(),
        };
        println!(
            "{}. {} {} [{}]",
            index + 1,
            task.action.as_str(),
            serde_json::Value::Object(task.parameters.clone()),
            status
        );
    }
}
