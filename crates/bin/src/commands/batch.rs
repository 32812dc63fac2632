//! Batch command: classify many email files and optionally keep the spam.

use std::sync::Arc;

use spamscope::batch::{BatchSession, FileRow, SortState};
use spamscope::{Conversation, Settings, SystemClock};

use crate::backend::{classifier, open_store};
use crate::cli::BatchArgs;
use crate::output::{OutputFormat, print_json, print_table, truncate};

fn table_row(row: &FileRow) -> Vec<String> {
    vec![
        row.path.clone(),
        truncate(&row.preview, 60),
        row.status.as_str().to_uppercase(),
        row.confidence
            .map(|c| format!("{:.1}%", c * 100.0))
            .unwrap_or_else(|| "-".to_string()),
    ]
}

/// Run the batch command
pub async fn run(
    args: &BatchArgs,
    settings: &Settings,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings {
        batch_size: args.batch_size,
        classify_using: args.using,
        ..settings.clone()
    };
    settings.validate()?;

    let mut batch = BatchSession::load(args.paths.as_slice(), settings.batch_options()).await?;
    if batch.is_empty() {
        eprintln!("No files selected.");
        return Ok(());
    }
    tracing::info!("Selected {} files", batch.len());

    let api = Arc::new(classifier(&settings)?);
    let report = batch
        .classify_all_with_progress(api, |done, total| {
            if format == OutputFormat::Human {
                eprintln!("Classified {done}/{total}");
            }
        })
        .await;

    let mut promoted: Vec<Conversation> = Vec::new();
    if args.add_spam || !args.promote.is_empty() {
        let store = open_store(&settings).await?;
        let clock = SystemClock;
        if args.add_spam {
            promoted.extend(batch.promote_all_spam(&store, &clock).await?);
        }
        for path in &args.promote {
            let index = batch
                .position(path)
                .ok_or_else(|| format!("no selected file at '{path}'"))?;
            promoted.push(batch.promote(index, &store, &clock).await?);
        }
    }

    let state = SortState::new(args.sort, !args.desc);
    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = batch.sorted(state).into_iter().map(table_row).collect();
            print_table(&["PATH", "PREVIEW", "STATUS", "CONFIDENCE"], &rows);
            println!();
            println!(
                "{} files in {} groups: {} spam, {} ham, {} errors",
                batch.len(),
                report.groups,
                report.spam,
                report.ham,
                report.errors
            );
            for conversation in &promoted {
                println!("Added conversation {} ({})", conversation.id, conversation.title);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "rows": batch.sorted(state),
            "report": report,
            "promoted": promoted,
        }))?,
    }
    Ok(())
}
